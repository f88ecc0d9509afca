//! Shim module to abstract over std and loom primitives.
//!
//! This module provides a unified interface for synchronization primitives that transparently
//! switches between `std` implementation (for production) and `loom` implementation (for testing).
//!
//! 在 `std`（生产环境）与 `loom`（模型检查）之间切换同步原语的统一接口。

#[cfg(not(feature = "loom"))]
pub mod atomic {
    pub use std::sync::atomic::*;
}

#[cfg(feature = "loom")]
pub mod atomic {
    pub use loom::sync::atomic::*;
}

#[cfg(not(feature = "loom"))]
pub mod sync {
    pub use std::sync::Arc;
}

#[cfg(feature = "loom")]
pub mod sync {
    pub use loom::sync::Arc;
}

#[cfg(not(feature = "loom"))]
pub mod cell {
    /// `std::cell::UnsafeCell` with loom's closure-based access API
    ///
    /// 带有 loom 闭包访问 API 的 `std::cell::UnsafeCell`
    #[derive(Debug)]
    pub struct UnsafeCell<T>(std::cell::UnsafeCell<T>);

    impl<T> UnsafeCell<T> {
        #[inline]
        pub const fn new(data: T) -> Self {
            Self(std::cell::UnsafeCell::new(data))
        }

        #[inline]
        pub fn with_mut<R>(&self, f: impl FnOnce(*mut T) -> R) -> R {
            f(self.0.get())
        }
    }
}

#[cfg(feature = "loom")]
pub mod cell {
    pub use loom::cell::UnsafeCell;
}

#[cfg(not(feature = "loom"))]
pub mod thread {
    pub use std::hint::spin_loop;
    pub use std::thread::{sleep, yield_now};
}

#[cfg(feature = "loom")]
pub mod thread {
    pub use loom::hint::spin_loop;
    pub use loom::thread::yield_now;

    // loom cannot model wall-clock sleeping; hand the scheduler a switch point instead
    pub fn sleep(_dur: std::time::Duration) {
        yield_now();
    }
}
