//! Time management for the station loop
//!
//! Everything time-related in the loop reads one monotonic millisecond
//! counter that starts at 0 on boot:
//! - gating of the slow sensors ([`crate::gate`])
//! - the bounded load-cell ready wait ([`Deadline`])
//! - the uptime field of emitted records
//!
//! Busy waits and pulse timing use `embedded_hal::delay::DelayNs` instead;
//! the two are kept apart so a stuck sensor is bounded by the clock, not by
//! counting delay calls.

use fugit::MillisDurationU64;

use crate::constants::MS_PER_SECOND;

/// Milliseconds since device boot
pub type Timestamp = u64;

/// Source of monotonic time
pub trait TimeSource {
    /// Current timestamp in milliseconds since boot
    fn now(&self) -> Timestamp;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Whole seconds since boot, as reported in the `time` field of a record.
pub fn uptime_seconds(now: Timestamp) -> u64 {
    now / MS_PER_SECOND
}

/// A point in time after which a bounded wait gives up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    expires_at: Timestamp,
}

impl Deadline {
    /// Deadline `timeout` from the current reading of `clock`
    pub fn after<C: TimeSource + ?Sized>(clock: &C, timeout: MillisDurationU64) -> Self {
        Self {
            expires_at: clock.now().saturating_add(timeout.ticks()),
        }
    }

    /// True once the clock has reached or passed the deadline
    pub fn is_expired<C: TimeSource + ?Sized>(&self, clock: &C) -> bool {
        clock.now() >= self.expires_at
    }

    /// Timestamp at which the deadline expires
    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Time source stuck at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to `timestamp`
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `ms`
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_time_advances() {
        let mut time = FixedTime::new(1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);
    }

    #[test]
    fn deadline_expires_on_the_boundary() {
        let mut time = FixedTime::new(250);
        let deadline = Deadline::after(&time, MillisDurationU64::millis(100));
        assert_eq!(deadline.expires_at(), 350);

        time.set(349);
        assert!(!deadline.is_expired(&time));

        time.set(350);
        assert!(deadline.is_expired(&time));
    }

    #[test]
    fn uptime_truncates_to_whole_seconds() {
        assert_eq!(uptime_seconds(0), 0);
        assert_eq!(uptime_seconds(1999), 1);
        assert_eq!(uptime_seconds(2000), 2);
    }
}
