//! Cloneable sender/receiver handles over a shared ring buffer
//!
//! 基于共享环形缓冲区的可克隆发送端/接收端句柄
//!
//! The worker pool feeds its task queue through these handles and the connection layer
//! hands chunks to the file writers through them. Waiting variants layer a [`Backoff`]
//! over the non-blocking ring operations; the ring itself never blocks.
//!
//! 工作线程池通过这些句柄提交任务，连接层通过它们把数据块交给文件写入者。
//! 等待型操作在非阻塞的环形操作之上叠加 [`Backoff`]；环形缓冲区本身从不阻塞。

use crate::error::{PopError, RecvError, SendError};
use crate::mpmc::RingBuffer;
use crate::shim::atomic::{AtomicUsize, Ordering};
use crate::shim::sync::Arc;
use crate::wait::{Backoff, BackoffConfig};
use std::fmt;
use std::time::{Duration, Instant};

/// Shared data between senders and receivers
///
/// 发送端与接收端之间的共享数据
struct Shared<T, const N: usize> {
    ring: RingBuffer<T, N>,
    senders: AtomicUsize,
    receivers: AtomicUsize,
    backoff: BackoffConfig,
}

/// Sending half of a channel
///
/// 通道的发送端
pub struct Sender<T, const N: usize> {
    shared: Arc<Shared<T, N>>,
}

/// Receiving half of a channel
///
/// 通道的接收端
pub struct Receiver<T, const N: usize> {
    shared: Arc<Shared<T, N>>,
}

/// Create a channel backed by a ring buffer of capacity `N`
///
/// 创建一个以容量为 `N` 的环形缓冲区为后端的通道
///
/// # Examples
///
/// ```
/// use seqring::channel;
/// use std::thread;
///
/// let (tx, rx) = channel::channel::<u64, 16>();
///
/// let handles: Vec<_> = (0..4)
///     .map(|p| {
///         let tx = tx.clone();
///         thread::spawn(move || {
///             for i in 0..100 {
///                 tx.send(p * 100 + i).unwrap();
///             }
///         })
///     })
///     .collect();
/// drop(tx);
///
/// let mut total = 0;
/// while let Ok(_) = rx.recv() {
///     total += 1;
/// }
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// assert_eq!(total, 400);
/// ```
pub fn channel<T, const N: usize>() -> (Sender<T, N>, Receiver<T, N>) {
    channel_with_backoff(BackoffConfig::default())
}

/// Create a channel whose waiting operations use `backoff`
///
/// 创建一个等待型操作使用 `backoff` 的通道
pub fn channel_with_backoff<T, const N: usize>(backoff: BackoffConfig) -> (Sender<T, N>, Receiver<T, N>) {
    let shared = Arc::new(Shared {
        ring: RingBuffer::new(),
        senders: AtomicUsize::new(1),
        receivers: AtomicUsize::new(1),
        backoff,
    });
    tracing::debug!(capacity = N, ?backoff, "ring channel created");

    (
        Sender {
            shared: shared.clone(),
        },
        Receiver { shared },
    )
}

impl<T, const N: usize> Sender<T, N> {
    /// Send without waiting
    ///
    /// 不等待地发送
    ///
    /// # Errors
    /// `Full(value)` if no slot is free, `Disconnected(value)` if every receiver is gone
    pub fn try_send(&self, value: T) -> Result<(), SendError<T>> {
        if self.shared.receivers.load(Ordering::Acquire) == 0 {
            return Err(SendError::Disconnected(value));
        }
        self.shared.ring.try_push(value).map_err(SendError::from)
    }

    /// Send, waiting until a slot frees up
    ///
    /// 发送，等待直到有空闲槽位
    ///
    /// # Errors
    /// `Disconnected(value)` if every receiver is gone
    pub fn send(&self, value: T) -> Result<(), SendError<T>> {
        self.send_until(value, None)
    }

    /// Send, waiting at most `timeout` for a slot to free up
    ///
    /// 发送，最多等待 `timeout` 直到有空闲槽位
    ///
    /// # Errors
    /// `Timeout(value)` once the timeout elapses, `Disconnected(value)` if every receiver is gone
    pub fn send_timeout(&self, value: T, timeout: Duration) -> Result<(), SendError<T>> {
        self.send_until(value, Some(Instant::now() + timeout))
    }

    fn send_until(&self, mut value: T, deadline: Option<Instant>) -> Result<(), SendError<T>> {
        let mut backoff = Backoff::with_config(self.shared.backoff);

        loop {
            match self.try_send(value) {
                Err(SendError::Full(rejected)) => value = rejected,
                other => return other,
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    tracing::trace!(capacity = N, "send timed out on full channel");
                    return Err(SendError::Timeout(value));
                }
            }
            backoff.snooze();
        }
    }

    /// Get the capacity of the underlying ring
    ///
    /// 获取底层环形缓冲区的容量
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.ring.capacity()
    }

    /// Get the number of values waiting, a snapshot under concurrency
    ///
    /// 获取等待中的值数量，并发时只是快照
    #[inline]
    pub fn len(&self) -> usize {
        self.shared.ring.len()
    }

    /// Check if no values are waiting
    ///
    /// 检查是否没有等待中的值
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shared.ring.is_empty()
    }

    /// Check if every slot is occupied
    ///
    /// 检查是否所有槽位都已占用
    #[inline]
    pub fn is_full(&self) -> bool {
        self.shared.ring.is_full()
    }
}

impl<T, const N: usize> Receiver<T, N> {
    /// Receive without waiting
    ///
    /// 不等待地接收
    ///
    /// # Errors
    /// `Empty` if nothing is published, `Disconnected` if additionally every sender is gone
    pub fn try_recv(&self) -> Result<T, RecvError> {
        match self.shared.ring.try_pop() {
            Ok(value) => Ok(value),
            Err(PopError::Empty) => {
                if self.shared.senders.load(Ordering::Acquire) == 0 {
                    // The last sender may have published right before hanging up
                    self.shared.ring.try_pop().map_err(|_| RecvError::Disconnected)
                } else {
                    Err(RecvError::Empty)
                }
            }
        }
    }

    /// Receive, waiting until a value is published
    ///
    /// 接收，等待直到有值发布
    ///
    /// # Errors
    /// `Disconnected` once the buffer is drained and every sender is gone
    pub fn recv(&self) -> Result<T, RecvError> {
        self.recv_until(None)
    }

    /// Receive, waiting at most `timeout` for a value
    ///
    /// 接收，最多等待 `timeout`
    ///
    /// # Errors
    /// `Timeout` once the timeout elapses, `Disconnected` once drained with every sender gone
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvError> {
        self.recv_until(Some(Instant::now() + timeout))
    }

    fn recv_until(&self, deadline: Option<Instant>) -> Result<T, RecvError> {
        let mut backoff = Backoff::with_config(self.shared.backoff);

        loop {
            match self.try_recv() {
                Err(RecvError::Empty) => {}
                other => return other,
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    tracing::trace!(capacity = N, "recv timed out on empty channel");
                    return Err(RecvError::Timeout);
                }
            }
            backoff.snooze();
        }
    }

    /// Iterate over the values published right now, without waiting
    ///
    /// 遍历当前已发布的值，不等待
    pub fn try_iter(&self) -> TryIter<'_, T, N> {
        TryIter { receiver: self }
    }

    /// Get the capacity of the underlying ring
    ///
    /// 获取底层环形缓冲区的容量
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.ring.capacity()
    }

    /// Get the number of values waiting, a snapshot under concurrency
    ///
    /// 获取等待中的值数量，并发时只是快照
    #[inline]
    pub fn len(&self) -> usize {
        self.shared.ring.len()
    }

    /// Check if no values are waiting
    ///
    /// 检查是否没有等待中的值
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shared.ring.is_empty()
    }
}

/// Non-waiting iterator returned by [`Receiver::try_iter`]
///
/// [`Receiver::try_iter`] 返回的非等待迭代器
pub struct TryIter<'a, T, const N: usize> {
    receiver: &'a Receiver<T, N>,
}

impl<T, const N: usize> Iterator for TryIter<'_, T, N> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.try_recv().ok()
    }
}

impl<T, const N: usize> Clone for Sender<T, N> {
    fn clone(&self) -> Self {
        self.shared.senders.fetch_add(1, Ordering::Relaxed);
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T, const N: usize> Clone for Receiver<T, N> {
    fn clone(&self) -> Self {
        self.shared.receivers.fetch_add(1, Ordering::Relaxed);
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T, const N: usize> Drop for Sender<T, N> {
    fn drop(&mut self) {
        if self.shared.senders.fetch_sub(1, Ordering::AcqRel) == 1 {
            tracing::debug!(pending = self.shared.ring.len(), "last sender disconnected");
        }
    }
}

impl<T, const N: usize> Drop for Receiver<T, N> {
    fn drop(&mut self) {
        if self.shared.receivers.fetch_sub(1, Ordering::AcqRel) == 1 {
            tracing::debug!(pending = self.shared.ring.len(), "last receiver disconnected");
        }
    }
}

impl<T, const N: usize> fmt::Debug for Sender<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender").field("ring", &self.shared.ring).finish()
    }
}

impl<T, const N: usize> fmt::Debug for Receiver<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver").field("ring", &self.shared.ring).finish()
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;

    #[test]
    fn test_basic_send_recv() {
        let (tx, rx) = channel::<i32, 4>();
        tx.try_send(1).unwrap();
        tx.send(2).unwrap();
        assert_eq!(rx.try_recv(), Ok(1));
        assert_eq!(rx.recv(), Ok(2));
        assert_eq!(rx.try_recv(), Err(RecvError::Empty));
        assert_eq!(tx.capacity(), 4);
        assert_eq!(rx.capacity(), 4);
    }

    #[test]
    fn test_try_send_full() {
        let (tx, _rx) = channel::<i32, 2>();
        tx.try_send(1).unwrap();
        tx.try_send(2).unwrap();
        assert!(tx.is_full());
        assert_eq!(tx.try_send(3), Err(SendError::Full(3)));
    }

    #[test]
    fn test_send_timeout_on_full() {
        let (tx, _rx) = channel::<i32, 2>();
        tx.send(1).unwrap();
        tx.send(2).unwrap();
        assert_eq!(
            tx.send_timeout(3, Duration::from_millis(5)),
            Err(SendError::Timeout(3))
        );
    }

    #[test]
    fn test_recv_timeout_on_empty() {
        let (_tx, rx) = channel::<i32, 2>();
        assert_eq!(rx.recv_timeout(Duration::from_millis(5)), Err(RecvError::Timeout));
    }

    #[test]
    fn test_disconnected_receivers() {
        let (tx, rx) = channel::<String, 4>();
        drop(rx);
        let err = tx.send("orphan".to_string()).unwrap_err();
        assert!(err.is_disconnected());
        assert_eq!(err.into_inner(), "orphan");
    }

    #[test]
    fn test_drain_after_senders_disconnect() {
        let (tx, rx) = channel::<i32, 8>();
        let tx2 = tx.clone();
        tx.send(1).unwrap();
        tx2.send(2).unwrap();
        drop(tx);
        assert_eq!(rx.try_recv(), Ok(1));
        drop(tx2);

        // Published values survive the senders
        // 已发布的值在发送端断开后依然保留
        assert_eq!(rx.recv(), Ok(2));
        assert_eq!(rx.recv(), Err(RecvError::Disconnected));
        assert_eq!(rx.try_recv(), Err(RecvError::Disconnected));
    }

    #[test]
    fn test_try_iter() {
        let (tx, rx) = channel::<u8, 8>();
        for i in 0..5 {
            tx.send(i).unwrap();
        }
        let got: Vec<u8> = rx.try_iter().collect();
        assert_eq!(got, vec![0, 1, 2, 3, 4]);
        assert!(rx.is_empty());
    }

    #[test]
    fn test_values_dropped_with_last_handle() {
        let payload = std::sync::Arc::new(());
        {
            let (tx, rx) = channel::<std::sync::Arc<()>, 4>();
            tx.send(payload.clone()).unwrap();
            tx.send(payload.clone()).unwrap();
            drop(tx);
            assert_eq!(std::sync::Arc::strong_count(&payload), 3);
            drop(rx);
        }
        assert_eq!(std::sync::Arc::strong_count(&payload), 1);
    }

    #[test]
    fn test_blocking_send_waits_for_consumer() {
        use std::thread;

        let (tx, rx) = channel::<u32, 2>();
        let producer = thread::spawn(move || {
            for i in 0..500 {
                tx.send(i).unwrap();
            }
        });

        let mut received = Vec::new();
        while let Ok(value) = rx.recv() {
            received.push(value);
        }
        producer.join().unwrap();

        // Single producer, single consumer: push order is preserved
        // 单生产者单消费者：保持推送顺序
        assert_eq!(received, (0..500).collect::<Vec<_>>());
    }
}
