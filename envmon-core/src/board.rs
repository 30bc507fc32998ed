//! Board abstraction
//!
//! A [`Board`] names one concrete driver type per hardware seam; a
//! [`Devices`] value owns one instance of each. The station is generic over
//! the board, so the same loop runs against real peripherals or the
//! simulated board in [`crate::sim`].

use embedded_hal::delay::DelayNs;

use crate::climate::ClimateSensor;
use crate::dust::DustSampler;
use crate::hal::{AnalogInput, Servo};
use crate::loadcell::LoadCellReader;
use crate::time::TimeSource;

/// Driver types making up one station
pub trait Board {
    /// Bridge ADC behind the pressure port
    type LoadCell: LoadCellReader;
    /// Pulsed particulate sensor
    type Dust: DustSampler;
    /// Temperature/humidity sensor
    type Climate: ClimateSensor;
    /// Left light sensor
    type LightLeft: AnalogInput;
    /// Right light sensor
    type LightRight: AnalogInput;
    /// Tracker actuator
    type Servo: Servo;
    /// Busy-wait delay provider
    type Delay: DelayNs;
    /// Monotonic millisecond clock
    type Clock: TimeSource;
    /// Serial data link to the host
    type Serial: embedded_io::Write;
}

/// One owned instance of every driver on a board
pub struct Devices<B: Board> {
    /// Bridge ADC
    pub load_cell: B::LoadCell,
    /// Dust sensor
    pub dust: B::Dust,
    /// Climate sensor
    pub climate: B::Climate,
    /// Left LDR
    pub light_left: B::LightLeft,
    /// Right LDR
    pub light_right: B::LightRight,
    /// Tracker servo
    pub servo: B::Servo,
    /// Delay provider
    pub delay: B::Delay,
    /// Clock
    pub clock: B::Clock,
    /// Serial port
    pub serial: B::Serial,
}
