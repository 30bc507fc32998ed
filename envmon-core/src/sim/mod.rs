//! Simulated board for host testing
//!
//! Drivers in this crate talk to `embedded-hal` traits, so the whole
//! station loop runs unchanged on the host against the simulated
//! peripherals here. Every simulated device shares one [`SimClock`], and
//! the only thing that advances it is [`SimDelay`], so protocol timing and
//! gate intervals play out exactly as on hardware, just instantly.
//!
//! # Feature Gate
//!
//! Available with the `sim` feature (on by default, requires `std`).
//!
//! # Example
//!
//! ```
//! use envmon_core::config::StationConfig;
//! use envmon_core::sim::SimBoard;
//! use envmon_core::station::Station;
//!
//! let (devices, handles) = SimBoard::build().unwrap();
//! handles.load_cell.set_steady(Some(25_000));
//! handles.dht.respond_with_dht22(21.5, 40.0);
//!
//! let mut station = Station::start(devices, StationConfig::default());
//! while handles.clock.now_ms() < 2_100 {
//!     station.tick();
//! }
//! assert!(handles.serial.lines().iter().any(|l| l.starts_with("{\"temp\":21.5")));
//! ```

mod analog;
mod board;
mod clock;
mod dht;
mod hx710;
mod pins;
mod serial;

pub use analog::SimAnalog;
pub use board::{SimBoard, SimHandles};
pub use clock::{SimClock, SimDelay};
pub use dht::{SimDht, SimDhtPin};
pub use hx710::{SimHx710, SimHx710Clock, SimHx710Data};
pub use pins::{SimOutputPin, SimPwm};
pub use serial::SimSerial;
