//! Core ring storage - Sequenced slots and padded cursors
//!
//! 核心环形存储 - 带序列号的槽位与缓存行填充的游标
//!
//! This module owns the memory layout shared by every buffer in the crate:
//! - A boxed array of `N` slots, each pairing a sequence number with storage for one value
//! - The enqueue and dequeue cursors, each on its own cache line
//! - Index masking and wrap-tolerant sequence comparison
//!
//! 此模块负责 crate 内所有缓冲区共享的内存布局：
//! - 包含 `N` 个槽位的堆数组，每个槽位包含序列号与一个值的存储
//! - 入队与出队游标，各自独占一个缓存行
//! - 索引掩码与容忍回绕的序列号比较

use crate::shim::atomic::{AtomicUsize, Ordering};
use crate::shim::cell::UnsafeCell;
use crossbeam_utils::CachePadded;
use std::mem::MaybeUninit;

/// One cell of the ring: a sequence number plus storage for exactly one value
///
/// 环中的一个单元：序列号加上一个值的存储
///
/// The sequence number encodes which lap owns the slot. For a cursor position `pos`
/// mapping onto this slot:
/// - `seq == pos`: writable for the producer holding `pos`
/// - `seq == pos + 1`: readable by the consumer holding `pos`
/// - anything else: owned by another lap, or in transit
///
/// 序列号标识当前哪一圈拥有该槽位。对于映射到该槽位的游标位置 `pos`：
/// - `seq == pos`：持有 `pos` 的生产者可写
/// - `seq == pos + 1`：持有 `pos` 的消费者可读
/// - 其他：属于其他圈，或正在传输中
pub(crate) struct Slot<T> {
    sequence: AtomicUsize,
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    fn new(sequence: usize) -> Self {
        Self {
            sequence: AtomicUsize::new(sequence),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Load the sequence number with Acquire ordering
    ///
    /// 使用 Acquire 顺序加载序列号
    #[inline]
    pub(crate) fn sequence(&self) -> usize {
        self.sequence.load(Ordering::Acquire)
    }

    /// Publish a new sequence number with Release ordering
    ///
    /// 使用 Release 顺序发布新的序列号
    #[inline]
    pub(crate) fn publish(&self, sequence: usize) {
        self.sequence.store(sequence, Ordering::Release);
    }

    /// Move a value into the slot
    ///
    /// 将值移入槽位
    ///
    /// # Safety
    /// Caller must own the slot for writing in the current lap (won the enqueue CAS),
    /// and the slot must not hold an initialized value.
    ///
    /// # 安全性
    /// 调用者必须在当前圈拥有该槽位的写权限（赢得入队 CAS），且槽位中不能有已初始化的值。
    #[inline]
    pub(crate) unsafe fn write(&self, value: T) {
        self.value.with_mut(|ptr| unsafe {
            (*ptr).write(value);
        });
    }

    /// Move the value out of the slot
    ///
    /// 将值移出槽位
    ///
    /// # Safety
    /// Caller must own the slot for reading in the current lap (won the dequeue CAS),
    /// and the slot must hold an initialized value.
    ///
    /// # 安全性
    /// 调用者必须在当前圈拥有该槽位的读权限（赢得出队 CAS），且槽位中必须有已初始化的值。
    #[inline]
    pub(crate) unsafe fn take(&self) -> T {
        self.value.with_mut(|ptr| unsafe { (*ptr).assume_init_read() })
    }
}

/// Core ring storage structure
///
/// 核心环形存储结构
///
/// # Type Parameters
/// - `T`: Element type
/// - `N`: Capacity (power of two, at least 2)
///
/// # 类型参数
/// - `T`: 元素类型
/// - `N`: 容量（2 的幂次，至少为 2）
pub(crate) struct RingCore<T, const N: usize> {
    /// Slot array, allocated once and never resized
    ///
    /// 槽位数组，只分配一次且从不调整大小
    slots: Box<[Slot<T>]>,

    /// Next position a producer will try to claim
    ///
    /// 生产者将尝试占用的下一个位置
    enqueue_pos: CachePadded<AtomicUsize>,

    /// Next position a consumer will try to claim
    ///
    /// 消费者将尝试占用的下一个位置
    dequeue_pos: CachePadded<AtomicUsize>,
}

impl<T, const N: usize> RingCore<T, N> {
    /// Mask for fast modulo operation (N - 1)
    ///
    /// 快速取模运算的掩码（N - 1）
    pub(crate) const MASK: usize = N - 1;

    /// Create storage whose first lap starts at cursor position `start`
    ///
    /// 创建首圈从游标位置 `start` 开始的存储
    ///
    /// Slot `i` receives the sequence of the first position that maps onto it, so every
    /// slot reads as writable for the first lap. Production code always starts at 0;
    /// tests start near `usize::MAX` to force the counters through wraparound.
    ///
    /// 槽位 `i` 获得首个映射到它的位置作为序列号，因此首圈中所有槽位均可写。
    /// 生产代码总是从 0 开始；测试从接近 `usize::MAX` 处开始以强制计数器回绕。
    pub(crate) fn starting_at(start: usize) -> Self {
        let slots = (0..N)
            .map(|index| {
                let offset = index.wrapping_sub(start) & Self::MASK;
                Slot::new(start.wrapping_add(offset))
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            slots,
            enqueue_pos: CachePadded::new(AtomicUsize::new(start)),
            dequeue_pos: CachePadded::new(AtomicUsize::new(start)),
        }
    }

    /// Get the slot a cursor position maps onto
    ///
    /// 获取游标位置映射到的槽位
    #[inline]
    pub(crate) fn slot(&self, pos: usize) -> &Slot<T> {
        // SAFETY: masking keeps the index below N == slots.len()
        unsafe { self.slots.get_unchecked(pos & Self::MASK) }
    }

    #[inline]
    pub(crate) fn enqueue_pos(&self) -> &AtomicUsize {
        &self.enqueue_pos
    }

    #[inline]
    pub(crate) fn dequeue_pos(&self) -> &AtomicUsize {
        &self.dequeue_pos
    }

    /// Calculate the number of published-or-claimed elements
    ///
    /// 计算已发布或已占用的元素数量
    ///
    /// The dequeue cursor is loaded first: it can never pass the enqueue cursor, so the
    /// later enqueue load is never behind it. The result is clamped to `N` because both
    /// cursors may move between the two loads.
    ///
    /// 先加载出队游标：它不会超过入队游标，因此随后加载的入队游标不会落后于它。
    /// 由于两次加载之间游标可能移动，结果被限制在 `N` 以内。
    #[inline]
    pub(crate) fn len(&self) -> usize {
        let dequeue = self.dequeue_pos.load(Ordering::Acquire);
        let enqueue = self.enqueue_pos.load(Ordering::Acquire);
        let diff = lap_diff(enqueue, dequeue);
        diff.clamp(0, N as isize) as usize
    }
}

/// Signed distance between two wrapping counters
///
/// 两个回绕计数器之间的有符号距离
///
/// Interprets `a - b` (wrapping) as a signed value, so `a` one step past `usize::MAX`
/// still compares as ahead of `b`.
///
/// 将 `a - b`（回绕减法）解释为有符号值，因此越过 `usize::MAX` 一步的 `a` 仍被视为领先于 `b`。
#[inline]
pub(crate) fn lap_diff(a: usize, b: usize) -> isize {
    a.wrapping_sub(b) as isize
}
