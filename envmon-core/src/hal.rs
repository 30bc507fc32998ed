//! Hardware seams not covered by `embedded-hal` 1.0
//!
//! Digital pins, busy-wait delays and PWM channels come straight from
//! `embedded-hal`. Two capabilities the station needs have no trait there:
//!
//! - a one-shot analog conversion ([`AnalogInput`]), which `embedded-hal`
//!   dropped in 1.0
//! - a hobby servo addressed in degrees ([`Servo`]), provided for any PWM
//!   channel by [`PwmServo`]

use embedded_hal::pwm::SetDutyCycle;

use crate::constants::tracker::{
    SERVO_FRAME_US, SERVO_MAX_PULSE_US, SERVO_MIN_PULSE_US, SERVO_TRAVEL_DEG,
};
use crate::errors::{bus, SensorResult};

/// One-shot 10-bit analog conversion (0..=1023)
pub trait AnalogInput {
    /// Driver-specific conversion error
    type Error: core::fmt::Debug;

    /// Start a conversion and wait for the result
    fn read(&mut self) -> Result<u16, Self::Error>;
}

/// Positional servo commanded in whole degrees
pub trait Servo {
    /// Move to `degrees` (0..=180); larger values saturate at 180
    fn write_angle(&mut self, degrees: u8) -> SensorResult<()>;
}

/// Servo driven by a 50 Hz PWM channel
///
/// Maps 0..=180° linearly onto a 544-2400 µs pulse, the same span the
/// common Arduino servo library uses.
#[derive(Debug)]
pub struct PwmServo<P> {
    channel: P,
}

impl<P: SetDutyCycle> PwmServo<P> {
    /// Wrap a channel already configured for a 20 ms period
    pub fn new(channel: P) -> Self {
        Self { channel }
    }

    /// Release the PWM channel
    pub fn release(self) -> P {
        self.channel
    }
}

/// Pulse width commanding `degrees`
pub fn angle_to_pulse_us(degrees: u8) -> u32 {
    let degrees = u32::from(degrees).min(SERVO_TRAVEL_DEG);
    SERVO_MIN_PULSE_US + (SERVO_MAX_PULSE_US - SERVO_MIN_PULSE_US) * degrees / SERVO_TRAVEL_DEG
}

impl<P: SetDutyCycle> Servo for PwmServo<P> {
    fn write_angle(&mut self, degrees: u8) -> SensorResult<()> {
        let pulse = angle_to_pulse_us(degrees);
        // Both fit in u16: pulse <= 2400, frame = 20000
        self.channel
            .set_duty_cycle_fraction(pulse as u16, SERVO_FRAME_US as u16)
            .map_err(bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::pwm::ErrorType;

    struct RecordingChannel {
        duty: u16,
    }

    impl ErrorType for RecordingChannel {
        type Error = Infallible;
    }

    impl SetDutyCycle for RecordingChannel {
        fn max_duty_cycle(&self) -> u16 {
            20_000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    #[test]
    fn pulse_spans_servo_travel() {
        assert_eq!(angle_to_pulse_us(0), 544);
        assert_eq!(angle_to_pulse_us(90), 1472);
        assert_eq!(angle_to_pulse_us(180), 2400);
        assert_eq!(angle_to_pulse_us(255), 2400);
    }

    #[test]
    fn servo_writes_pulse_as_duty() {
        // max duty equals the frame in µs, so duty reads back as the pulse
        let mut servo = PwmServo::new(RecordingChannel { duty: 0 });
        servo.write_angle(90).unwrap();
        assert_eq!(servo.release().duty, 1472);
    }
}
