//! Temperature/Humidity Sensor (DHT Single-Wire)
//!
//! ## Protocol
//!
//! DHT11 and DHT22 share one open-drain data line:
//!
//! ```text
//! host start        sensor response        40 data bits
//! ‾‾‾\________/‾‾‾\_____/‾‾‾‾‾\___/‾‾\___/‾‾‾‾‾‾\__ ...
//!    │ ≥18 ms │30µs│80 µs│80 µs │50 │26 │50 │ 70  │
//!    (DHT11)              ready   "0"     "1"
//! ```
//!
//! Each bit starts with ~50 µs low; the length of the following high phase
//! encodes the value (~27 µs for `0`, ~70 µs for `1`). Five bytes arrive:
//! humidity (2), temperature (2), checksum (low byte of the sum of the
//! other four).
//!
//! Every level is timed by counting 1 µs delays, and any level held longer
//! than 100 µs aborts the read. The whole exchange takes ~4 ms of bit time
//! plus the start pulse, which is why the station gates it to every 2 s.
//!
//! ## Failure Contract
//!
//! Like the common DHT libraries, a failed exchange (timeout or checksum)
//! yields `NaN` for both quantities. The station rejects a reading in which
//! either value is `NaN`.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::constants::sensors::{
    DHT11_START_LOW_US, DHT22_START_LOW_US, DHT_LEVEL_TIMEOUT_US, DHT_ONE_THRESHOLD_US,
    DHT_START_RELEASE_US,
};
use crate::errors::{bus, SensorError, SensorResult};

/// One temperature (°C) / relative humidity (%) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    /// Degrees Celsius
    pub temperature: f32,
    /// Percent relative humidity
    pub humidity: f32,
}

impl ClimateReading {
    /// Reading reported for a failed exchange
    pub const FAILED: Self = Self {
        temperature: f32::NAN,
        humidity: f32::NAN,
    };

    /// Both quantities present (neither is `NaN`)
    pub fn is_valid(&self) -> bool {
        !self.temperature.is_nan() && !self.humidity.is_nan()
    }

    /// The reading itself, or `ClimateReadFailed` if either value is `NaN`
    pub fn validated(self) -> SensorResult<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(SensorError::ClimateReadFailed)
        }
    }
}

/// Anything that produces temperature/humidity pairs under the NaN contract
pub trait ClimateSensor {
    /// Run one read exchange
    fn read<D: DelayNs>(&mut self, delay: &mut D) -> ClimateReading;
}

/// Supported sensor variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DhtModel {
    /// 1 °C / 1 % resolution, 0..50 °C
    Dht11,
    /// 0.1 °C / 0.1 % resolution, -40..80 °C (also AM2302)
    Dht22,
}

impl DhtModel {
    fn start_low_us(&self) -> u32 {
        match self {
            Self::Dht11 => DHT11_START_LOW_US,
            Self::Dht22 => DHT22_START_LOW_US,
        }
    }
}

/// Decode a 5-byte frame, verifying the checksum
pub fn decode_frame(model: DhtModel, frame: [u8; 5]) -> SensorResult<ClimateReading> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::Checksum);
    }

    let reading = match model {
        DhtModel::Dht11 => {
            let humidity = f32::from(frame[0]) + f32::from(frame[1]) * 0.1;
            let magnitude = f32::from(frame[2]) + f32::from(frame[3] & 0x7F) * 0.1;
            let temperature = if frame[3] & 0x80 != 0 { -magnitude } else { magnitude };
            ClimateReading { temperature, humidity }
        }
        DhtModel::Dht22 => {
            let humidity = f32::from(u16::from_be_bytes([frame[0], frame[1]])) / 10.0;
            let magnitude = f32::from(u16::from_be_bytes([frame[2] & 0x7F, frame[3]])) / 10.0;
            let temperature = if frame[2] & 0x80 != 0 { -magnitude } else { magnitude };
            ClimateReading { temperature, humidity }
        }
    };
    Ok(reading)
}

/// DHT sensor on an open-drain pin
#[derive(Debug)]
pub struct Dht<P> {
    pin: P,
    model: DhtModel,
}

impl<P> Dht<P>
where
    P: InputPin + OutputPin,
{
    /// Take ownership of the pin and release the line
    pub fn new(mut pin: P, model: DhtModel) -> SensorResult<Self> {
        pin.set_high().map_err(bus)?;
        Ok(Self { pin, model })
    }

    /// Sensor variant
    pub fn model(&self) -> DhtModel {
        self.model
    }

    /// Run the exchange and decode it
    pub fn try_read<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<ClimateReading> {
        let frame = self.read_frame(delay)?;
        decode_frame(self.model, frame)
    }

    /// Release the pin
    pub fn release(self) -> P {
        self.pin
    }

    fn read_frame<D: DelayNs>(&mut self, delay: &mut D) -> SensorResult<[u8; 5]> {
        self.pin.set_low().map_err(bus)?;
        delay.delay_us(self.model.start_low_us());
        self.pin.set_high().map_err(bus)?;
        delay.delay_us(DHT_START_RELEASE_US);

        // Response: sensor pulls low ~80 µs, then releases ~80 µs
        self.level_duration(delay, true)?;
        self.level_duration(delay, false)?;
        self.level_duration(delay, true)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            self.level_duration(delay, false)?;
            let high_us = self.level_duration(delay, true)?;
            if high_us > DHT_ONE_THRESHOLD_US {
                frame[bit / 8] |= 1 << (7 - bit % 8);
            }
        }
        Ok(frame)
    }

    /// Microseconds the line stays at `high`; times out past 100 µs
    fn level_duration<D: DelayNs>(&mut self, delay: &mut D, high: bool) -> SensorResult<u32> {
        let mut elapsed = 0;
        while self.pin.is_high().map_err(bus)? == high {
            if elapsed >= DHT_LEVEL_TIMEOUT_US {
                return Err(SensorError::Timeout);
            }
            delay.delay_us(1);
            elapsed += 1;
        }
        Ok(elapsed)
    }
}

impl<P> ClimateSensor for Dht<P>
where
    P: InputPin + OutputPin,
{
    fn read<D: DelayNs>(&mut self, delay: &mut D) -> ClimateReading {
        match self.try_read(delay) {
            Ok(reading) => reading,
            Err(SensorError::Checksum) => {
                log_warn!("DHT frame checksum mismatch");
                ClimateReading::FAILED
            }
            Err(_) => {
                log_warn!("DHT exchange timed out");
                ClimateReading::FAILED
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_checksum(data: [u8; 4]) -> [u8; 5] {
        let sum = data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        [data[0], data[1], data[2], data[3], sum]
    }

    #[test]
    fn dht11_frame() {
        let reading = decode_frame(DhtModel::Dht11, with_checksum([55, 0, 23, 4])).unwrap();
        assert_eq!(reading.humidity, 55.0);
        assert!((reading.temperature - 23.4).abs() < 1e-5);
    }

    #[test]
    fn dht11_negative_flag() {
        let reading = decode_frame(DhtModel::Dht11, with_checksum([40, 0, 2, 0x85])).unwrap();
        assert!((reading.temperature + 2.5).abs() < 1e-5);
    }

    #[test]
    fn dht22_frame() {
        // 65.2 %RH, 35.1 °C
        let reading = decode_frame(DhtModel::Dht22, with_checksum([0x02, 0x8C, 0x01, 0x5F])).unwrap();
        assert!((reading.humidity - 65.2).abs() < 1e-4);
        assert!((reading.temperature - 35.1).abs() < 1e-4);
    }

    #[test]
    fn dht22_negative_temperature() {
        // -10.1 °C
        let reading = decode_frame(DhtModel::Dht22, with_checksum([0x01, 0x90, 0x80, 0x65])).unwrap();
        assert!((reading.temperature + 10.1).abs() < 1e-4);
    }

    #[test]
    fn checksum_mismatch_is_rejected() {
        let mut frame = with_checksum([55, 0, 23, 4]);
        frame[4] ^= 0x01;
        assert_eq!(decode_frame(DhtModel::Dht11, frame), Err(SensorError::Checksum));
    }

    #[test]
    fn nan_in_either_field_fails_validation() {
        let ok = ClimateReading { temperature: 21.0, humidity: 40.0 };
        assert_eq!(ok.validated(), Ok(ok));

        let no_temp = ClimateReading { temperature: f32::NAN, ..ok };
        assert_eq!(no_temp.validated(), Err(SensorError::ClimateReadFailed));

        let no_hum = ClimateReading { humidity: f32::NAN, ..ok };
        assert!(!no_hum.is_valid());
        assert!(!ClimateReading::FAILED.is_valid());
    }
}
