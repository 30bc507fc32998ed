//! Constants for the envmon station core
//!
//! This module provides centralized, documented constants used throughout
//! the firmware loop. Every numeric value the drivers and controllers depend
//! on is defined here with its unit in the name and its source noted.
//!
//! ## Organization
//!
//! Constants are grouped by domain:
//! - **Sensors**: ADC ranges, pulse timings and conversion models
//! - **Time**: Gating intervals, timeouts and the tick pause
//! - **Tracker**: Servo geometry and hysteresis band
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Runtime-tunable values flow through [`crate::config::StationConfig`],
//!    whose `Default` impl reads from here
//! 3. Use descriptive names that include units

/// Sensor specifications: load cell, dust sensor, ADC and climate sensor.
pub mod sensors;

/// Intervals, timeouts and scheduling cadence.
pub mod time;

/// Solar tracker geometry and control gains.
pub mod tracker;

pub use sensors::{
    ADC_FULL_SCALE_COUNTS, ADC_REFERENCE_V, CALIBRATION_SAMPLES, DUST_DENSITY_OFFSET,
    DUST_DENSITY_SLOPE, PRESSURE_MAX_KPA, PRESSURE_MIN_KPA, PRESSURE_SCALE_COUNTS_PER_KPA,
    STEADY_STATE_SAMPLES,
};

pub use time::{
    CLIMATE_INTERVAL, LOAD_CELL_READY_TIMEOUT, MS_PER_SECOND, PRESSURE_INTERVAL, TICK_PAUSE_MS,
};

pub use tracker::{
    SERVO_CENTER_DEG, SERVO_MAX_DEG, SERVO_MIN_DEG, TRACKER_STEP_DEG, TRACKER_TOLERANCE,
};

/// Serial link baud rate shared with the host ingestion process.
pub const SERIAL_BAUD: u32 = 9600;
