//! Simulated DHT sensor on an open-drain line
//!
//! Once the host releases the line after its start pulse, the level is a
//! pure function of the time elapsed on the shared [`SimClock`]:
//!
//! ```text
//! 0      20        100       180   +50  +26/70 ...  40 bits, then 50 µs low
//! │ high │   low   │  high   │ low │ high │
//! ```

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use super::clock::SimClock;

const RESPONSE_DELAY_US: u64 = 20;
const RESPONSE_LOW_US: u64 = 80;
const RESPONSE_HIGH_US: u64 = 80;
const BIT_LOW_US: u64 = 50;
const ZERO_HIGH_US: u64 = 26;
const ONE_HIGH_US: u64 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behaviour {
    /// No answer; the pull-up holds the line high
    Silent,
    /// Line shorted low
    StuckLow,
    /// Answer with this frame
    Respond([u8; 5]),
}

#[derive(Debug)]
struct DhtState {
    behaviour: Behaviour,
    exchanges: usize,
}

/// Script handle for the simulated sensor
#[derive(Debug, Clone)]
pub struct SimDht {
    state: Rc<RefCell<DhtState>>,
}

impl SimDht {
    /// Sensor that does not answer until scripted
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(DhtState {
                behaviour: Behaviour::Silent,
                exchanges: 0,
            })),
        }
    }

    /// Data pin bound to `clock`
    pub fn pin(&self, clock: &SimClock) -> SimDhtPin {
        SimDhtPin {
            state: Rc::clone(&self.state),
            clock: clock.clone(),
            driven_low: false,
            released_at_us: None,
        }
    }

    /// Answer every exchange with this raw frame
    pub fn respond_with_frame(&self, frame: [u8; 5]) {
        self.state.borrow_mut().behaviour = Behaviour::Respond(frame);
    }

    /// Answer with a correctly checksummed DHT22 frame
    pub fn respond_with_dht22(&self, temperature: f32, humidity: f32) {
        self.respond_with_frame(encode_dht22(temperature, humidity));
    }

    /// Stop answering; reads time out
    pub fn go_silent(&self) {
        self.state.borrow_mut().behaviour = Behaviour::Silent;
    }

    /// Hold the line low; reads time out
    pub fn stick_low(&self) {
        self.state.borrow_mut().behaviour = Behaviour::StuckLow;
    }

    /// Start pulses seen so far
    pub fn exchanges(&self) -> usize {
        self.state.borrow().exchanges
    }
}

impl Default for SimDht {
    fn default() -> Self {
        Self::new()
    }
}

/// DHT22 wire encoding of one reading
pub(crate) fn encode_dht22(temperature: f32, humidity: f32) -> [u8; 5] {
    let hum = (humidity * 10.0).round() as u16;
    let magnitude = (temperature.abs() * 10.0).round() as u16 & 0x7FFF;
    let temp = if temperature < 0.0 { magnitude | 0x8000 } else { magnitude };
    let [h1, h0] = hum.to_be_bytes();
    let [t1, t0] = temp.to_be_bytes();
    let sum = h1.wrapping_add(h0).wrapping_add(t1).wrapping_add(t0);
    [h1, h0, t1, t0, sum]
}

fn frame_level(frame: &[u8; 5], elapsed_us: u64) -> bool {
    let mut t = elapsed_us;
    if t < RESPONSE_DELAY_US {
        return true;
    }
    t -= RESPONSE_DELAY_US;
    if t < RESPONSE_LOW_US {
        return false;
    }
    t -= RESPONSE_LOW_US;
    if t < RESPONSE_HIGH_US {
        return true;
    }
    t -= RESPONSE_HIGH_US;

    for bit in 0..40 {
        if t < BIT_LOW_US {
            return false;
        }
        t -= BIT_LOW_US;
        let one = frame[bit / 8] & (1 << (7 - bit % 8)) != 0;
        let high = if one { ONE_HIGH_US } else { ZERO_HIGH_US };
        if t < high {
            return true;
        }
        t -= high;
    }
    // Trailing low, then the line idles high
    t >= BIT_LOW_US
}

/// Open-drain data line of the simulated sensor
#[derive(Debug)]
pub struct SimDhtPin {
    state: Rc<RefCell<DhtState>>,
    clock: SimClock,
    driven_low: bool,
    released_at_us: Option<u64>,
}

impl ErrorType for SimDhtPin {
    type Error = Infallible;
}

impl OutputPin for SimDhtPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.driven_low = true;
        self.released_at_us = None;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if self.driven_low {
            self.released_at_us = Some(self.clock.now_us());
            self.state.borrow_mut().exchanges += 1;
        }
        self.driven_low = false;
        Ok(())
    }
}

impl InputPin for SimDhtPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        if self.driven_low {
            return Ok(false);
        }
        let level = match (self.state.borrow().behaviour, self.released_at_us) {
            (Behaviour::StuckLow, _) => false,
            (Behaviour::Silent, _) | (_, None) => true,
            (Behaviour::Respond(frame), Some(released)) => {
                frame_level(&frame, self.clock.now_us().saturating_sub(released))
            }
        };
        Ok(level)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}
