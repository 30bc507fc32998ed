//! Pulsed Optical Dust Sampler
//!
//! The particulate sensor (Sharp GP2Y1010 type) is a duty-cycle sensor:
//! its IR LED must be pulsed and the output sampled at a fixed point in the
//! pulse.
//!
//! ```text
//! LED (active low) ‾‾‾\_______________/‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//!                     │←── 280 µs ──→│←40→│←──────── 9680 µs ────────→│
//!                                     ▲
//!                               ADC sample
//! ```
//!
//! The three waits add up to ~10 ms, the largest fixed cost of a tick, but
//! short enough that the sampler runs on every tick without gating.
//!
//! Conversion is the datasheet's linear fit:
//! `density = 170 × V − 0.1`, with `V = counts × 5.0 / 1024`. Near the
//! noise floor the fit goes negative, so the result is clamped at zero.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::constants::sensors::{
    ADC_FULL_SCALE_COUNTS, ADC_REFERENCE_V, DUST_CYCLE_REST_US, DUST_DENSITY_OFFSET,
    DUST_DENSITY_SLOPE, DUST_PULSE_TAIL_US, DUST_SAMPLING_DELAY_US,
};
use crate::errors::{bus, SensorResult};
use crate::hal::AnalogInput;

/// Anything that produces one dust density estimate per call
pub trait DustSampler {
    /// Pulse, sample and convert; never negative
    fn sample_once<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<f32>;
}

/// ADC counts to volts
pub fn counts_to_voltage(raw: u16) -> f32 {
    f32::from(raw) * (ADC_REFERENCE_V / ADC_FULL_SCALE_COUNTS)
}

/// Volts to density (µg/m³), before clamping
pub fn voltage_to_density(voltage: f32) -> f32 {
    DUST_DENSITY_SLOPE * voltage - DUST_DENSITY_OFFSET
}

/// ADC counts to clamped density (µg/m³)
pub fn counts_to_density(raw: u16) -> f32 {
    voltage_to_density(counts_to_voltage(raw)).max(0.0)
}

/// Dust sensor on an LED drive pin and an analog output
#[derive(Debug)]
pub struct DustSensor<LED, A> {
    led: LED,
    adc: A,
}

impl<LED, A> DustSensor<LED, A>
where
    LED: OutputPin,
    A: AnalogInput,
{
    /// Take ownership of the pins with the LED off
    pub fn new(mut led: LED, adc: A) -> SensorResult<Self> {
        led.set_high().map_err(bus)?;
        Ok(Self { led, adc })
    }

    /// One timed pulse returning raw ADC counts
    pub fn pulse_raw<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<u16> {
        self.led.set_low().map_err(bus)?;
        delay.delay_us(DUST_SAMPLING_DELAY_US);
        let sample = self.adc.read();
        delay.delay_us(DUST_PULSE_TAIL_US);
        // LED goes off even if the conversion failed
        self.led.set_high().map_err(bus)?;
        delay.delay_us(DUST_CYCLE_REST_US);
        sample.map_err(bus)
    }

    /// Release the pins
    pub fn release(self) -> (LED, A) {
        (self.led, self.adc)
    }
}

impl<LED, A> DustSampler for DustSensor<LED, A>
where
    LED: OutputPin,
    A: AnalogInput,
{
    fn sample_once<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<f32> {
        let raw = self.pulse_raw(delay)?;
        Ok(counts_to_density(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_dust_scenario() {
        let voltage = counts_to_voltage(300);
        assert!((voltage - 1.4648).abs() < 1e-4);

        let density = voltage_to_density(voltage);
        assert!((density - 248.92).abs() < 0.01);
        assert_eq!(counts_to_density(300), density);
    }

    #[test]
    fn noise_floor_clamps_to_zero() {
        assert!(voltage_to_density(0.0) < 0.0);
        assert_eq!(counts_to_density(0), 0.0);
    }

    #[test]
    fn density_never_negative() {
        for raw in 0..=1023u16 {
            assert!(counts_to_density(raw) >= 0.0);
        }
    }
}
