//! Bit-Banged 24-Bit Load-Cell ADC
//!
//! ## Protocol
//!
//! The bridge converter (HX710/HX711 family) has no bus peripheral: the
//! host drives a clock line and samples a data line by hand.
//!
//! ```text
//!  DOUT ‾‾‾‾‾\____________ D23 __ D22 __ ... __ D0 ______/‾‾‾‾
//!  SCK  ___________/‾\_/‾\_/‾\_ ... _/‾\_/‾\___/‾\_____________
//!                  │ 1 │ 2 │        │24 │   │25 │
//!        ready ────┘   data bits, MSB first   └ next-channel pulse
//! ```
//!
//! 1. DOUT falls when a conversion is ready.
//! 2. 24 clock pulses shift the result out MSB-first; each bit is sampled
//!    while SCK is high.
//! 3. One more pulse selects channel A, gain 128, for the next conversion.
//! 4. The result is 24-bit two's complement and is sign-extended to `i32`.
//!
//! ## Bounded Ready Wait
//!
//! DOUT may never fall (sensor unplugged, powered down). The wait is
//! bounded by a 100 ms [`Deadline`] on the monotonic clock so the tracker
//! loop is never starved, and on expiry [`LoadCellReader::read_raw`]
//! returns the `0` sentinel.
//!
//! ## Known Limitation
//!
//! The sentinel `0` is also a legal conversion result. A bridge that
//! genuinely reads exactly zero is discarded by the averaging filter in
//! [`crate::pressure`] exactly as a timeout would be. With a loaded bridge
//! and 24 bits of noise the collision is rare, and it is left as-is rather
//! than changing the reading contract.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use fugit::MillisDurationU64;

use crate::constants::sensors::{
    LOAD_CELL_BITS, LOAD_CELL_CLOCK_HALF_PERIOD_US, LOAD_CELL_GAIN_PULSES, LOAD_CELL_POLL_US,
    LOAD_CELL_TIMEOUT_SENTINEL,
};
use crate::constants::time::LOAD_CELL_READY_TIMEOUT;
use crate::errors::{bus, SensorError, SensorResult};
use crate::time::{Deadline, TimeSource};

/// Anything that yields raw load-cell conversions under the sentinel contract
pub trait LoadCellReader {
    /// One raw conversion, or `0` if the converter never became ready
    fn read_raw<C, D>(&mut self, clock: &C, delay: &mut D) -> i32
    where
        C: TimeSource + ?Sized,
        D: DelayNs;
}

/// Sign-extend a 24-bit two's-complement value
///
/// Bits above 23 are ignored.
pub const fn decode_24bit(raw: u32) -> i32 {
    ((raw << 8) as i32) >> 8
}

/// Load-cell converter on a data-in / clock-out pin pair
#[derive(Debug)]
pub struct LoadCell<DOUT, SCK> {
    dout: DOUT,
    sck: SCK,
    ready_timeout: MillisDurationU64,
}

impl<DOUT, SCK> LoadCell<DOUT, SCK>
where
    DOUT: InputPin,
    SCK: OutputPin,
{
    /// Take ownership of the pins and park the clock low
    ///
    /// Holding SCK high for more than 60 µs powers the converter down.
    pub fn new(dout: DOUT, mut sck: SCK) -> SensorResult<Self> {
        sck.set_low().map_err(bus)?;
        Ok(Self {
            dout,
            sck,
            ready_timeout: LOAD_CELL_READY_TIMEOUT,
        })
    }

    /// Override the data-ready deadline
    pub fn with_ready_timeout(mut self, timeout: MillisDurationU64) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// True when a conversion is waiting to be clocked out
    pub fn is_ready(&mut self) -> SensorResult<bool> {
        self.dout.is_low().map_err(bus)
    }

    /// Single non-blocking attempt
    ///
    /// `WouldBlock` while the converter is busy.
    pub fn try_read<D: DelayNs>(&mut self, delay: &mut D) -> nb::Result<i32, SensorError> {
        if !self.is_ready()? {
            return Err(nb::Error::WouldBlock);
        }
        let raw = self.shift_in(delay)?;
        Ok(decode_24bit(raw))
    }

    /// Poll until a conversion is ready or the deadline passes
    pub fn read_within<C, D>(&mut self, clock: &C, delay: &mut D) -> SensorResult<i32>
    where
        C: TimeSource + ?Sized,
        D: DelayNs,
    {
        let deadline = Deadline::after(clock, self.ready_timeout);
        loop {
            match self.try_read(delay) {
                Ok(value) => return Ok(value),
                Err(nb::Error::Other(e)) => return Err(e),
                Err(nb::Error::WouldBlock) => {
                    if deadline.is_expired(clock) {
                        return Err(SensorError::Timeout);
                    }
                    delay.delay_us(LOAD_CELL_POLL_US);
                }
            }
        }
    }

    /// Release the pins
    pub fn release(self) -> (DOUT, SCK) {
        (self.dout, self.sck)
    }

    fn shift_in<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<u32> {
        let mut value: u32 = 0;
        for _ in 0..LOAD_CELL_BITS {
            self.sck.set_high().map_err(bus)?;
            delay.delay_us(LOAD_CELL_CLOCK_HALF_PERIOD_US);
            let bit = self.dout.is_high().map_err(bus)?;
            value = (value << 1) | u32::from(bit);
            self.sck.set_low().map_err(bus)?;
            delay.delay_us(LOAD_CELL_CLOCK_HALF_PERIOD_US);
        }
        for _ in 0..LOAD_CELL_GAIN_PULSES {
            self.sck.set_high().map_err(bus)?;
            delay.delay_us(LOAD_CELL_CLOCK_HALF_PERIOD_US);
            self.sck.set_low().map_err(bus)?;
            delay.delay_us(LOAD_CELL_CLOCK_HALF_PERIOD_US);
        }
        Ok(value)
    }
}

impl<DOUT, SCK> LoadCellReader for LoadCell<DOUT, SCK>
where
    DOUT: InputPin,
    SCK: OutputPin,
{
    fn read_raw<C, D>(&mut self, clock: &C, delay: &mut D) -> i32
    where
        C: TimeSource + ?Sized,
        D: DelayNs,
    {
        match self.read_within(clock, delay) {
            Ok(value) => value,
            Err(SensorError::Timeout) => {
                log_debug!("load cell not ready within deadline");
                LOAD_CELL_TIMEOUT_SENTINEL
            }
            Err(_) => {
                log_warn!("load cell pin error");
                LOAD_CELL_TIMEOUT_SENTINEL
            }
        }
    }
}
