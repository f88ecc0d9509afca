//! Channel tests shaped after the two collaborators: task queue and chunk staging
//!
//! 按两个协作方（任务队列与数据块暂存）设计的通道测试

use super::ItemTracker;
use crate::channel::{channel, channel_with_backoff};
use crate::chunk::Chunk;
use crate::error::RecvError;
use crate::wait::BackoffConfig;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

type Task = Box<dyn FnOnce() + Send>;

#[test]
fn test_task_queue_workers_run_every_task_once() {
    const TASKS: usize = 4000;

    let (tx, rx) = channel::<Task, 32>();
    let tracker = Arc::new(ItemTracker::new(TASKS));
    let ran = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let rx = rx.clone();
            thread::spawn(move || {
                let mut executed = 0usize;
                while let Ok(task) = rx.recv() {
                    task();
                    executed += 1;
                }
                executed
            })
        })
        .collect();
    drop(rx);

    let submitters: Vec<_> = (0..4)
        .map(|s| {
            let tx = tx.clone();
            let tracker = tracker.clone();
            let ran = ran.clone();
            thread::spawn(move || {
                for i in 1..=TASKS / 4 {
                    let id = s * (TASKS / 4) + i;
                    tracker.produce(id);
                    let tracker = tracker.clone();
                    let ran = ran.clone();
                    let task: Task = Box::new(move || {
                        tracker.consume(id);
                        ran.fetch_add(1, Ordering::SeqCst);
                    });
                    if tx.send(task).is_err() {
                        panic!("workers hung up early");
                    }
                }
            })
        })
        .collect();
    drop(tx);

    for submitter in submitters {
        submitter.join().unwrap();
    }
    let executed: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();

    assert_eq!(executed, TASKS);
    assert_eq!(ran.load(Ordering::SeqCst), TASKS);
    tracker.assert_all_consumed();
}

#[test]
fn test_chunk_staging_reassembles_stream() {
    let payload: Vec<u8> = (0..200_000u32).map(|i| (i * 31 % 251) as u8).collect();
    let (tx, rx) = channel::<Chunk<512>, 8>();

    let reader = {
        let payload = payload.clone();
        thread::spawn(move || {
            for chunk in Chunk::<512>::split(&payload) {
                tx.send(chunk).unwrap();
            }
        })
    };

    let writer = thread::spawn(move || {
        let mut written = Vec::new();
        loop {
            match rx.recv() {
                Ok(chunk) => written.extend_from_slice(chunk.as_bytes()),
                Err(RecvError::Disconnected) => break,
                Err(other) => panic!("unexpected receive error: {other}"),
            }
        }
        written
    });

    reader.join().unwrap();
    let written = writer.join().unwrap();
    assert_eq!(written, payload);
}

#[test]
fn test_recv_timeout_then_value() {
    let (tx, rx) = channel::<u32, 4>();

    assert_eq!(rx.recv_timeout(Duration::from_millis(2)), Err(RecvError::Timeout));

    let sender = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        tx.send(7).unwrap();
    });

    assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(7));
    sender.join().unwrap();
    assert_eq!(rx.recv(), Err(RecvError::Disconnected));
}

#[test]
fn test_custom_backoff_channel() {
    let config = BackoffConfig {
        spin_limit: 1,
        yield_limit: 2,
        max_sleep_micros: 50,
    };
    let (tx, rx) = channel_with_backoff::<usize, 4>(config);

    let producer = thread::spawn(move || {
        for i in 0..2000 {
            tx.send(i).unwrap();
        }
    });

    let mut sum = 0;
    while let Ok(value) = rx.recv() {
        sum += value;
    }
    producer.join().unwrap();
    assert_eq!(sum, (0..2000).sum::<usize>());
}
