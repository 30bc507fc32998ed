//! Shared simulated time

use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;

use crate::time::{TimeSource, Timestamp};

/// Monotonic clock shared by every simulated device
///
/// Clones observe the same time. Resolution is one nanosecond.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    nanos: Rc<Cell<u64>>,
}

impl SimClock {
    /// Clock at t = 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Nanoseconds since boot
    pub fn now_ns(&self) -> u64 {
        self.nanos.get()
    }

    /// Microseconds since boot
    pub fn now_us(&self) -> u64 {
        self.nanos.get() / 1_000
    }

    /// Milliseconds since boot
    pub fn now_ms(&self) -> u64 {
        self.nanos.get() / 1_000_000
    }

    /// Move time forward
    pub fn advance_ns(&self, ns: u64) {
        self.nanos.set(self.nanos.get().saturating_add(ns));
    }

    /// Move time forward by whole milliseconds
    pub fn advance_ms(&self, ms: u64) {
        self.advance_ns(ms.saturating_mul(1_000_000));
    }

    /// A delay provider driving this clock
    pub fn delay(&self) -> SimDelay {
        SimDelay {
            clock: self.clone(),
        }
    }
}

impl TimeSource for SimClock {
    fn now(&self) -> Timestamp {
        self.now_ms()
    }
}

/// Busy-wait that advances the shared clock instead of spinning
#[derive(Debug, Clone)]
pub struct SimDelay {
    clock: SimClock,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance_ns(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.clock.advance_ns(u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance_ms(u64::from(ms));
    }
}
