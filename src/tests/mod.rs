//! Concurrent scenarios shared by the ring buffer and channel test suites
//!
//! 环形缓冲区与通道测试共用的并发场景

mod channel;

use std::sync::atomic::{AtomicU8, Ordering};

const UNPRODUCED: u8 = 0;
const PRODUCED: u8 = 1;
const CONSUMED: u8 = 2;

/// Per-value state machine: unproduced -> produced -> consumed
///
/// 每个值的状态机：未生产 -> 已生产 -> 已消费
///
/// Values are 1-based so that 0 never names a real item.
pub(crate) struct ItemTracker {
    states: Vec<AtomicU8>,
}

impl ItemTracker {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            states: (0..=total).map(|_| AtomicU8::new(UNPRODUCED)).collect(),
        }
    }

    /// Mark a value produced; must happen before it is pushed
    pub(crate) fn produce(&self, value: usize) {
        let prev = self.states[value].swap(PRODUCED, Ordering::SeqCst);
        assert_eq!(prev, UNPRODUCED, "value {value} produced twice");
    }

    /// Mark a value consumed, failing on duplicates and on values never produced
    pub(crate) fn consume(&self, value: usize) {
        assert!(value > 0 && value < self.states.len(), "value {value} out of range");
        if let Err(state) =
            self.states[value].compare_exchange(PRODUCED, CONSUMED, Ordering::SeqCst, Ordering::SeqCst)
        {
            match state {
                UNPRODUCED => panic!("value {value} was consumed but never produced"),
                CONSUMED => panic!("value {value} was consumed multiple times"),
                other => panic!("value {value} has unexpected state {other}"),
            }
        }
    }

    pub(crate) fn assert_all_consumed(&self) {
        for (value, state) in self.states.iter().enumerate().skip(1) {
            assert_eq!(
                state.load(Ordering::SeqCst),
                CONSUMED,
                "value {value} was not properly produced and consumed"
            );
        }
    }
}
