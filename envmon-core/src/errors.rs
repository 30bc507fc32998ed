//! Error Types for Sensor and Actuator Faults
//!
//! ## Design Philosophy
//!
//! Nothing in the station loop is fatal. Every fault is absorbed locally
//! and the loop keeps running, so errors here are small `Copy` values that
//! describe what went wrong without carrying heap data:
//!
//! 1. **Small Size**: one-byte enum, cheap to return from hot paths.
//! 2. **No Heap Allocation**: messages are `&'static str`.
//! 3. **Copy Semantics**: freely stored in tick reports.
//!
//! ## Error Taxonomy
//!
//! | Fault | Variant | Recovery |
//! |-------|---------|----------|
//! | Load cell never signalled ready | `Timeout` | sentinel `0`, excluded by averaging |
//! | Averaging pass saw only sentinels | `NoValidSamples` | degenerate `0` average |
//! | Temperature or humidity was NaN | `ClimateReadFailed` | error line on the serial link, state unchanged |
//! | DHT frame checksum mismatch | `Checksum` | reported as NaN, then as `ClimateReadFailed` |
//! | GPIO/ADC/PWM driver error | `Bus` | this tick's contribution skipped |
//!
//! Only `ClimateReadFailed` is ever reported on the serial link
//! ([`SensorError::wire_message`]).
//!
//! [`ConfigError`] is separate: it is raised once, when tuning values are
//! built, never from inside the loop.
//!
//! Servo overflow has no variant: the tracker clamps unconditionally, so
//! an out-of-range angle is unrepresentable at the actuator.

use thiserror_no_std::Error;

/// Result type for sensor operations
pub type SensorResult<T> = Result<T, SensorError>;

/// Sensor faults - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The converter did not signal data-ready before the deadline
    #[error("Sensor did not become ready before the deadline")]
    Timeout,

    /// Every sample in an averaging pass was the timeout sentinel
    #[error("No valid samples in averaging pass")]
    NoValidSamples,

    /// Temperature or humidity came back as NaN
    #[error("DHT sensor read failed")]
    ClimateReadFailed,

    /// Received frame failed its checksum
    #[error("Checksum mismatch in sensor frame")]
    Checksum,

    /// A pin, ADC or PWM driver reported an error
    #[error("Hardware bus error")]
    Bus,
}

impl SensorError {
    /// Text carried by the `{"error":...}` line on the serial link.
    ///
    /// Only a failed climate read is reported to the host; every other
    /// fault is absorbed inside the tick and has no wire text.
    pub const fn wire_message(&self) -> Option<&'static str> {
        match self {
            Self::ClimateReadFailed => Some("DHT sensor read failed"),
            Self::Timeout | Self::NoValidSamples | Self::Checksum | Self::Bus => None,
        }
    }
}

/// Configuration values the station refuses to run with
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Lower bound above the upper bound (or a bound is NaN)
    #[error("Inverted range: {field}")]
    InvertedRange {
        /// Offending setting
        field: &'static str,
    },

    /// Value that can never produce a usable result
    #[error("Invalid value: {field}")]
    Invalid {
        /// Offending setting
        field: &'static str,
    },
}

/// Map any embedded-hal driver error onto [`SensorError::Bus`].
///
/// Pin errors are `Infallible` on most HALs; where they are not, the cause
/// carries no information the loop could act on.
pub(crate) fn bus<E>(_: E) -> SensorError {
    SensorError::Bus
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Timeout => defmt::write!(fmt, "Timeout"),
            Self::NoValidSamples => defmt::write!(fmt, "No valid samples"),
            Self::ClimateReadFailed => defmt::write!(fmt, "Climate read failed"),
            Self::Checksum => defmt::write!(fmt, "Checksum"),
            Self::Bus => defmt::write!(fmt, "Bus"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvertedRange { field } => defmt::write!(fmt, "Inverted range: {=str}", field),
            Self::Invalid { field } => defmt::write!(fmt, "Invalid value: {=str}", field),
        }
    }
}
