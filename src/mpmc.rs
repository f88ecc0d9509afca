//! Bounded lock-free MPMC ring buffer
//!
//! 有界无锁多生产者多消费者环形缓冲区
//!
//! Producers and consumers coordinate through compare-and-swap on two cursors plus a
//! sequence number stored in every slot. The sequence number tells which lap currently
//! owns a slot, so a slot being reused by a later lap is never mistaken for the one a
//! thread just claimed.
//!
//! 生产者与消费者通过两个游标上的 CAS 以及每个槽位中的序列号进行协调。
//! 序列号指明当前哪一圈拥有该槽位，因此后续圈复用的槽位不会与线程刚占用的槽位混淆。
//!
//! Both `push` and `get` return immediately: full and empty are reported, never waited
//! on. Callers that need blocking layer it on top (see [`crate::wait`] and
//! [`crate::channel`]).

use crate::core::{RingCore, lap_diff};
use crate::error::{PopError, PushError};
use crate::shim::atomic::Ordering;
use std::fmt;

/// Bounded multi-producer multi-consumer ring buffer
///
/// 有界多生产者多消费者环形缓冲区
///
/// # Type Parameters
/// - `T`: Element type
/// - `N`: Capacity, a power of two and at least 2 (checked at compile time)
///
/// # 类型参数
/// - `T`: 元素类型
/// - `N`: 容量，2 的幂次且至少为 2（编译期检查）
///
/// # Examples
///
/// ```
/// use seqring::RingBuffer;
///
/// let buf: RingBuffer<u32, 4> = RingBuffer::new();
/// assert!(buf.push(1));
/// assert!(buf.push(2));
///
/// let mut out = 0;
/// assert!(buf.get(&mut out));
/// assert_eq!(out, 1);
/// assert_eq!(buf.capacity(), 4);
/// ```
///
/// An invalid capacity is rejected when the buffer type is instantiated:
///
/// ```compile_fail
/// use seqring::RingBuffer;
///
/// let buf: RingBuffer<u32, 3> = RingBuffer::new();
/// ```
pub struct RingBuffer<T, const N: usize> {
    core: RingCore<T, N>,
}

impl<T, const N: usize> RingBuffer<T, N> {
    const VALID_CAPACITY: () = assert!(
        N >= 2 && N.is_power_of_two(),
        "ring buffer capacity must be a power of two and at least 2"
    );

    /// Create an empty ring buffer
    ///
    /// 创建一个空的环形缓冲区
    ///
    /// Every slot starts writable for the first lap.
    ///
    /// 首圈中所有槽位都是可写的。
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a ring buffer whose cursors start at `start`
    ///
    /// Only used to drive the cursors through `usize` wraparound in tests.
    pub(crate) fn starting_at(start: usize) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_CAPACITY;

        Self {
            core: RingCore::starting_at(start),
        }
    }

    /// Get the capacity of the ring buffer
    ///
    /// 获取环形缓冲区的容量
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Push a value into the buffer
    ///
    /// 向缓冲区推送一个值
    ///
    /// Returns `false` if the buffer is full. The value is dropped in that case; use
    /// [`try_push`](Self::try_push) to get it back.
    ///
    /// 缓冲区满时返回 `false`，此时值会被丢弃；如需取回请使用 [`try_push`](Self::try_push)。
    #[inline]
    pub fn push(&self, value: T) -> bool {
        self.try_push(value).is_ok()
    }

    /// Move the next published value into `out`
    ///
    /// 将下一个已发布的值移入 `out`
    ///
    /// Returns `false` if the buffer is empty, leaving `out` untouched.
    ///
    /// 缓冲区为空时返回 `false`，`out` 保持不变。
    #[inline]
    pub fn get(&self, out: &mut T) -> bool {
        match self.try_pop() {
            Ok(value) => {
                *out = value;
                true
            }
            Err(PopError::Empty) => false,
        }
    }

    /// Push a value into the buffer
    ///
    /// 向缓冲区推送一个值
    ///
    /// # Errors
    /// Returns `PushError::Full` carrying the value back if the buffer is full
    ///
    /// # 错误
    /// 如果缓冲区满则返回携带原值的 `PushError::Full`
    pub fn try_push(&self, value: T) -> Result<(), PushError<T>> {
        let enqueue = self.core.enqueue_pos();
        let mut pos = enqueue.load(Ordering::Relaxed);

        loop {
            let slot = self.core.slot(pos);
            let seq = slot.sequence();
            let diff = lap_diff(seq, pos);

            if diff == 0 {
                // Writable for this lap: race the other producers for it
                match enqueue.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: winning the CAS grants exclusive write ownership of this
                        // slot for this lap, and the consumer of the previous lap has
                        // already moved its value out (seq == pos).
                        unsafe { slot.write(value) };
                        slot.publish(pos.wrapping_add(1));
                        return Ok(());
                    }
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                // Slot still holds the previous lap's value
                return Err(PushError::Full(value));
            } else {
                // Another producer already claimed this position
                pos = enqueue.load(Ordering::Relaxed);
            }
        }
    }

    /// Pop the next published value from the buffer
    ///
    /// 从缓冲区弹出下一个已发布的值
    ///
    /// # Errors
    /// Returns `PopError::Empty` if no slot holds a published value
    ///
    /// # 错误
    /// 如果没有已发布的值则返回 `PopError::Empty`
    pub fn try_pop(&self) -> Result<T, PopError> {
        let dequeue = self.core.dequeue_pos();
        let mut pos = dequeue.load(Ordering::Relaxed);

        loop {
            let slot = self.core.slot(pos);
            let seq = slot.sequence();
            let diff = lap_diff(seq, pos.wrapping_add(1));

            if diff == 0 {
                match dequeue.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: winning the CAS grants exclusive read ownership of this
                        // slot for this lap, and the Acquire load above synchronized with
                        // the producer's Release publish.
                        let value = unsafe { slot.take() };
                        // Writable again once the enqueue cursor comes back around
                        slot.publish(pos.wrapping_add(N));
                        return Ok(value);
                    }
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                return Err(PopError::Empty);
            } else {
                pos = dequeue.load(Ordering::Relaxed);
            }
        }
    }

    /// Get the number of elements currently in the buffer
    ///
    /// 获取缓冲区中当前的元素数量
    ///
    /// This is a snapshot: concurrent pushes and pops may change it before the caller
    /// looks at it. Claimed slots whose value is still in transit are counted.
    ///
    /// 这只是一个快照：并发的 push/pop 可能在调用者使用前改变它。
    #[inline]
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// Check if the buffer is empty (snapshot)
    ///
    /// 检查缓冲区是否为空（快照）
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the buffer is full (snapshot)
    ///
    /// 检查缓冲区是否已满（快照）
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == N
    }
}

impl<T, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Drop for RingBuffer<T, N> {
    fn drop(&mut self) {
        // Drop whatever is still published; nobody else can reach the slots now
        while self.try_pop().is_ok() {}
    }
}

impl<T, const N: usize> fmt::Debug for RingBuffer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &N)
            .field("len", &self.len())
            .finish()
    }
}

// Slots are only touched by the thread holding the CAS-granted ownership
unsafe impl<T: Send, const N: usize> Send for RingBuffer<T, N> {}
unsafe impl<T: Send, const N: usize> Sync for RingBuffer<T, N> {}
