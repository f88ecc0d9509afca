//! Wait policy for callers that block on top of the non-blocking buffer
//!
//! 为在非阻塞缓冲区之上实现阻塞的调用者提供的等待策略
//!
//! The ring buffer never waits. A caller that gets `Full` or `Empty` back decides how to
//! retry; [`Backoff`] is the escalating spin, yield, sleep sequence the channel handles
//! use, exposed so the worker pool and connection layer can share it.

use crate::shim::thread;
use std::time::Duration;

/// Backoff tuning
///
/// 退避参数
///
/// Step `s` spins `2^s` times while `s <= spin_limit`, yields the thread while
/// `s <= yield_limit`, and sleeps afterwards, doubling from 1µs up to `max_sleep_micros`.
///
/// 第 `s` 步：当 `s <= spin_limit` 时自旋 `2^s` 次；当 `s <= yield_limit` 时让出线程；
/// 之后进入休眠，从 1µs 开始翻倍直到 `max_sleep_micros`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BackoffConfig {
    pub spin_limit: u32,
    pub yield_limit: u32,
    pub max_sleep_micros: u64,
}

impl BackoffConfig {
    pub const DEFAULT_SPIN_LIMIT: u32 = 6;
    pub const DEFAULT_YIELD_LIMIT: u32 = 10;
    pub const DEFAULT_MAX_SLEEP_MICROS: u64 = 1000;

    /// Spin and yield only, never sleep
    ///
    /// 只自旋与让出，从不休眠
    pub const fn no_sleep() -> Self {
        Self {
            spin_limit: Self::DEFAULT_SPIN_LIMIT,
            yield_limit: u32::MAX,
            max_sleep_micros: 0,
        }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            spin_limit: Self::DEFAULT_SPIN_LIMIT,
            yield_limit: Self::DEFAULT_YIELD_LIMIT,
            max_sleep_micros: Self::DEFAULT_MAX_SLEEP_MICROS,
        }
    }
}

/// Exponential backoff between retries of a failed push or pop
///
/// push 或 pop 失败后重试之间的指数退避
///
/// # Examples
///
/// ```
/// use seqring::{Backoff, RingBuffer};
///
/// let buf: RingBuffer<u64, 8> = RingBuffer::new();
/// let mut backoff = Backoff::new();
/// let mut value = 17;
/// loop {
///     match buf.try_push(value) {
///         Ok(()) => break,
///         Err(err) => {
///             value = err.into_inner();
///             backoff.snooze();
///         }
///     }
/// }
/// assert_eq!(buf.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Backoff {
    config: BackoffConfig,
    step: u32,
    sleep_micros: u64,
}

impl Backoff {
    /// Create a backoff with the default configuration
    ///
    /// 使用默认配置创建退避
    pub fn new() -> Self {
        Self::with_config(BackoffConfig::default())
    }

    /// Create a backoff with a custom configuration
    ///
    /// 使用自定义配置创建退避
    pub fn with_config(config: BackoffConfig) -> Self {
        Self {
            config,
            step: 0,
            sleep_micros: 1,
        }
    }

    /// Get the configuration in use
    ///
    /// 获取当前使用的配置
    #[inline]
    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }

    /// Start over from the shortest wait, typically after a successful operation
    ///
    /// 从最短等待重新开始，通常在操作成功之后调用
    #[inline]
    pub fn reset(&mut self) {
        self.step = 0;
        self.sleep_micros = 1;
    }

    /// Wait once, escalating the next wait
    ///
    /// 等待一次，并升级下一次的等待
    pub fn snooze(&mut self) {
        if self.step <= self.config.spin_limit {
            for _ in 0..1u64 << self.step.min(31) {
                thread::spin_loop();
            }
        } else if self.step <= self.config.yield_limit || self.config.max_sleep_micros == 0 {
            thread::yield_now();
        } else {
            thread::sleep(Duration::from_micros(self.sleep_micros));
            self.sleep_micros = (self.sleep_micros * 2).min(self.config.max_sleep_micros);
        }

        self.step = self.step.saturating_add(1);
    }

    /// Whether the backoff has escalated past spinning and yielding
    ///
    /// 退避是否已越过自旋与让出阶段
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.step > self.config.yield_limit
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}
