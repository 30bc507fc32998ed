//! Simulated board wiring

use crate::board::{Board, Devices};
use crate::climate::{Dht, DhtModel};
use crate::dust::DustSensor;
use crate::errors::SensorResult;
use crate::hal::PwmServo;
use crate::loadcell::LoadCell;

use super::{
    SimAnalog, SimClock, SimDelay, SimDht, SimDhtPin, SimHx710, SimHx710Clock, SimHx710Data,
    SimOutputPin, SimPwm, SimSerial,
};

/// Board built entirely from simulated peripherals
#[derive(Debug, Clone, Copy, Default)]
pub struct SimBoard;

impl Board for SimBoard {
    type LoadCell = LoadCell<SimHx710Data, SimHx710Clock>;
    type Dust = DustSensor<SimOutputPin, SimAnalog>;
    type Climate = Dht<SimDhtPin>;
    type LightLeft = SimAnalog;
    type LightRight = SimAnalog;
    type Servo = PwmServo<SimPwm>;
    type Delay = SimDelay;
    type Clock = SimClock;
    type Serial = SimSerial;
}

/// Test-side handles onto the peripherals owned by the station
#[derive(Debug, Clone)]
pub struct SimHandles {
    /// Shared time
    pub clock: SimClock,
    /// Load-cell script
    pub load_cell: SimHx710,
    /// Dust sensor output
    pub dust_adc: SimAnalog,
    /// Dust LED drive line
    pub dust_led: SimOutputPin,
    /// Climate sensor script
    pub dht: SimDht,
    /// Left LDR
    pub light_left: SimAnalog,
    /// Right LDR
    pub light_right: SimAnalog,
    /// Servo PWM channel
    pub servo: SimPwm,
    /// Captured serial output
    pub serial: SimSerial,
}

impl SimBoard {
    /// Wire up a fresh board
    ///
    /// The load cell and climate sensor start silent and both light
    /// sensors read 512.
    pub fn build() -> SensorResult<(Devices<SimBoard>, SimHandles)> {
        let clock = SimClock::new();
        let handles = SimHandles {
            load_cell: SimHx710::timed(&clock),
            dust_adc: SimAnalog::new(0),
            dust_led: SimOutputPin::new(&clock),
            dht: SimDht::new(),
            light_left: SimAnalog::new(512),
            light_right: SimAnalog::new(512),
            servo: SimPwm::new(&clock),
            serial: SimSerial::new(),
            clock,
        };

        let (dout, sck) = handles.load_cell.pins();
        let devices = Devices {
            load_cell: LoadCell::new(dout, sck)?,
            dust: DustSensor::new(handles.dust_led.clone(), handles.dust_adc.clone())?,
            climate: Dht::new(handles.dht.pin(&handles.clock), DhtModel::Dht22)?,
            light_left: handles.light_left.clone(),
            light_right: handles.light_right.clone(),
            servo: PwmServo::new(handles.servo.clone()),
            delay: handles.clock.delay(),
            clock: handles.clock.clone(),
            serial: handles.serial.clone(),
        };
        Ok((devices, handles))
    }
}
