//! # Bounded Lock-Free MPMC Ring Buffer
//!
//! 有界无锁 MPMC 环形缓冲区
//!
//! `seqring` is the concurrency core of a file synchronization tool: a fixed-capacity,
//! lock-free, multi-producer multi-consumer ring buffer. The worker pool uses it as its
//! task queue and the connection layer uses it to stage data chunks between socket I/O
//! and disk.
//!
//! `seqring` 是文件同步工具的并发核心：一个固定容量、无锁、多生产者多消费者的环形缓冲区。
//! 工作线程池将其用作任务队列，连接层用它在套接字 I/O 与磁盘之间暂存数据块。
//!
//! ## Features
//!
//! 特性
//!
//! - **Lock-Free** - Producers and consumers coordinate through CAS on two cursors
//! - **Per-Slot Sequencing** - Each slot carries a sequence number naming the lap that owns it
//! - **Wrap Tolerant** - Cursor comparisons survive `usize` overflow
//! - **No False Sharing** - Enqueue and dequeue cursors sit on separate cache lines
//! - **Never Blocks** - Full and empty are reported, callers choose how to wait
//!
//! - **无锁设计** - 生产者与消费者通过两个游标上的 CAS 协调
//! - **逐槽序列号** - 每个槽位携带一个标识所属圈的序列号
//! - **容忍回绕** - 游标比较在 `usize` 溢出后依然正确
//! - **无伪共享** - 入队与出队游标位于不同的缓存行
//! - **从不阻塞** - 满和空直接报告，由调用者决定如何等待
//!
//! ## Quick Start
//!
//! 快速开始
//!
//! ```rust
//! use seqring::RingBuffer;
//!
//! // Capacity is a const generic: a power of two, at least 2
//! // 容量是常量泛型：2 的幂次，至少为 2
//! let buf: RingBuffer<i32, 8> = RingBuffer::new();
//!
//! assert!(buf.push(42));
//! assert!(buf.push(100));
//!
//! let mut out = 0;
//! assert!(buf.get(&mut out));
//! assert_eq!(out, 42);
//! assert_eq!(buf.try_pop(), Ok(100));
//!
//! // Empty: `get` reports false and leaves `out` alone
//! // 空：`get` 返回 false 且不修改 `out`
//! assert!(!buf.get(&mut out));
//! assert_eq!(out, 42);
//! ```
//!
//! ## Multi-threaded Usage
//!
//! 多线程使用
//!
//! ```rust
//! use seqring::RingBuffer;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let buf = Arc::new(RingBuffer::<u64, 64>::new());
//!
//! let producers: Vec<_> = (0..4)
//!     .map(|p| {
//!         let buf = buf.clone();
//!         thread::spawn(move || {
//!             for i in 0..250 {
//!                 while !buf.push(p * 1000 + i) {
//!                     thread::yield_now();
//!                 }
//!             }
//!         })
//!     })
//!     .collect();
//!
//! let mut received = 0;
//! let mut out = 0;
//! while received < 1000 {
//!     if buf.get(&mut out) {
//!         received += 1;
//!     } else {
//!         thread::yield_now();
//!     }
//! }
//!
//! for producer in producers {
//!     producer.join().unwrap();
//! }
//! assert!(buf.is_empty());
//! ```
//!
//! ## Waiting
//!
//! 等待
//!
//! The buffer never waits. [`channel()`] wraps it in cloneable handles with waiting
//! `send`/`recv` built on [`Backoff`], and [`Backoff`] is available directly for callers
//! with their own retry loops.
//!
//! 缓冲区本身从不等待。[`channel()`] 将其包装为可克隆的句柄，并基于 [`Backoff`] 提供等待型
//! `send`/`recv`；有自己重试循环的调用者也可直接使用 [`Backoff`]。
//!
//! ## Notes
//!
//! 注意事项
//!
//! - Values from one producer reach one consumer in push order; with several consumers
//!   there is no global FIFO order
//! - `len()`, `is_empty()` and `is_full()` are snapshots under concurrency
//! - Remaining elements are dropped when the buffer is dropped
//!
//! - 单个生产者的值按推送顺序到达单个消费者；多消费者时不保证全局 FIFO
//! - 并发时 `len()`、`is_empty()` 与 `is_full()` 只是快照
//! - 缓冲区被 drop 时会清理剩余元素

pub mod channel;
pub mod chunk;
pub mod error;
pub mod mpmc;
pub mod wait;
mod core;
mod shim;

#[cfg(all(test, not(feature = "loom")))]
mod tests;

pub use channel::{Receiver, Sender, channel, channel_with_backoff};
pub use chunk::{Chunk, DEFAULT_CHUNK_SIZE, StagingBuffer};
pub use error::{PopError, PushError, RecvError, SendError};
pub use mpmc::RingBuffer;
pub use wait::{Backoff, BackoffConfig};
