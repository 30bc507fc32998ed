//! Time-Related Constants
//!
//! Intervals, deadlines and conversion factors for the cooperative loop.
//! Gating intervals are `fugit` durations so they cannot be confused with
//! raw tick counts.

use fugit::MillisDurationU64;

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

// ===== GATING INTERVALS =====

/// Minimum spacing between pressure averaging passes.
///
/// Five raw samples with 10 ms spacing cost ~50 ms plus conversion time,
/// too slow to run on every tick.
pub const PRESSURE_INTERVAL: MillisDurationU64 = MillisDurationU64::millis(5000);

/// Minimum spacing between temperature/humidity reads.
///
/// The DHT family must not be polled faster than once per 1-2 s, and its
/// read protocol takes ~20 ms of bit timing.
pub const CLIMATE_INTERVAL: MillisDurationU64 = MillisDurationU64::millis(2000);

// ===== DEADLINES =====

/// Bound on the load-cell data-ready wait.
///
/// A conversion at 10 SPS completes within 100 ms; beyond that the sensor
/// is treated as stuck and the sentinel is returned.
pub const LOAD_CELL_READY_TIMEOUT: MillisDurationU64 = MillisDurationU64::millis(100);

// ===== LOOP CADENCE =====

/// Pause at the end of each tick (milliseconds).
///
/// Together with the ~10 ms dust pulse this yields roughly 20 ticks per
/// second.
pub const TICK_PAUSE_MS: u32 = 40;
