//! Elapsed-time gating for slow sensors
//!
//! The loop ticks at ~20 Hz but two sensors are too slow to read on every
//! tick. Each owns an [`IntervalGate`] holding the next timestamp at which
//! it may run again; a tick that arrives earlier skips the sensor and the
//! emitter reuses the value kept in the [`TimedSample`].
//!
//! ```text
//! t(ms)     0    1000   2000   2050        4000   4050
//! gate       .      .   FIRE     .    ...   FIRE     .
//! next     2000   2000  4000   4000         6000   6000
//! ```
//!
//! A gate first becomes eligible one interval after boot, so the first
//! climate read happens at 2 s and the first pressure pass at 5 s.

use fugit::MillisDurationU64;

use crate::time::Timestamp;

/// Next-eligible-tick timer for one component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalGate {
    interval: MillisDurationU64,
    next_eligible: Timestamp,
}

impl IntervalGate {
    /// Gate that first opens one `interval` after boot
    pub const fn new(interval: MillisDurationU64) -> Self {
        Self {
            interval,
            next_eligible: interval.ticks(),
        }
    }

    /// True if a poll at `now` would fire
    pub fn is_due(&self, now: Timestamp) -> bool {
        now >= self.next_eligible
    }

    /// Fire and re-arm if due; otherwise leave the gate untouched
    pub fn poll(&mut self, now: Timestamp) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.next_eligible = now.saturating_add(self.interval.ticks());
        true
    }

    /// Timestamp from which the next poll fires
    pub fn next_eligible(&self) -> Timestamp {
        self.next_eligible
    }

    /// Configured spacing between firings
    pub fn interval(&self) -> MillisDurationU64 {
        self.interval
    }
}

/// Last valid value of a slow sensor plus the gate deciding when to refresh it
#[derive(Debug, Clone, Copy)]
pub struct TimedSample<T> {
    value: T,
    last_update: Option<Timestamp>,
    gate: IntervalGate,
}

impl<T: Copy> TimedSample<T> {
    /// Sample holding `initial` until the first successful refresh
    pub const fn new(initial: T, interval: MillisDurationU64) -> Self {
        Self {
            value: initial,
            last_update: None,
            gate: IntervalGate::new(interval),
        }
    }

    /// Run `read` if the gate is open at `now`.
    ///
    /// Returns `None` when the gate is closed. When it fires, the gate
    /// re-arms whatever the outcome; only an `Ok` value replaces the stored
    /// one, so a failed read leaves the previous valid value in place.
    pub fn refresh<E, F>(&mut self, now: Timestamp, read: F) -> Option<Result<T, E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if !self.gate.poll(now) {
            return None;
        }
        let outcome = read();
        if let Ok(value) = outcome {
            self.value = value;
            self.last_update = Some(now);
        }
        Some(outcome)
    }

    /// Last valid value (the initial value until the first refresh)
    pub fn value(&self) -> T {
        self.value
    }

    /// When the value was last replaced, if ever
    pub fn last_update(&self) -> Option<Timestamp> {
        self.last_update
    }

    /// Gate controlling refreshes
    pub fn gate(&self) -> &IntervalGate {
        &self.gate
    }
}
