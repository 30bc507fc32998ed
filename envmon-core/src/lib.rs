//! Sampling-and-control core for the envmon station
//!
//! One cooperative loop reads four sensors, drives the solar tracker servo
//! and streams line-delimited JSON to the host over serial.
//! Designed for small microcontrollers.
//!
//! Key constraints:
//! - Single thread, no interrupts used for sensor timing
//! - No heap allocation (lines are formatted into fixed buffers)
//! - No wait longer than the 100 ms load-cell ready bound
//!
//! ```no_run
//! use envmon_core::config::StationConfig;
//! use envmon_core::sim::SimBoard;
//! use envmon_core::station::Station;
//!
//! let (devices, _handles) = SimBoard::build().unwrap();
//! let station = Station::start(devices, StationConfig::default());
//!
//! // Never returns
//! station.run();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod logging;

pub mod board;
pub mod climate;
pub mod config;
pub mod constants;
pub mod dust;
pub mod errors;
pub mod gate;
pub mod hal;
pub mod loadcell;
pub mod pressure;
pub mod station;
pub mod time;
pub mod tracker;
pub mod wire;

#[cfg(feature = "sim")]
pub mod sim;

// Public API
pub use board::{Board, Devices};
pub use config::StationConfig;
pub use errors::{ConfigError, SensorError, SensorResult};
pub use station::{Emission, Station, StationState, TickReport};
pub use tracker::{TrackerAction, TrackerReading, TrackerStatus};
pub use wire::{Message, SensorFrame};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
