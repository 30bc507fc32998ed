//! Serde types for the three line shapes

use envmon_core::constants::{PRESSURE_MAX_KPA, PRESSURE_MIN_KPA, SERVO_MAX_DEG, SERVO_MIN_DEG};
use envmon_core::tracker::{TrackerAction, TrackerStatus};
use serde::{Deserialize, Serialize};

use crate::SchemaError;

/// One line from the station
///
/// Untagged: the shape is recognised by its keys, tried in declaration
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireMessage {
    /// Startup progress or readiness
    Status {
        /// `info` or `READY`
        status: StatusKind,
        /// Human-readable text
        msg: String,
    },
    /// Sensor failure report
    Error {
        /// Failure text
        error: String,
    },
    /// Full sensor record
    Record(SensorRecord),
}

/// Value of the `status` key on status lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusKind {
    /// Progress during startup
    #[serde(rename = "info")]
    Info,
    /// Calibration finished, records follow
    #[serde(rename = "READY")]
    Ready,
}

/// Periodic sensor record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    /// °C, one decimal
    pub temp: f64,
    /// %RH, whole percent
    pub hum: f64,
    /// µg/m³, two decimals
    pub dust: f64,
    /// kPa, three decimals
    pub pressure: f64,
    /// Seconds since station boot
    pub time: u64,
    /// Tracker state at emission
    pub tracker: TrackerRecord,
}

/// Tracker object nested in a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerRecord {
    /// Servo angle in degrees
    pub angle: i32,
    /// Left LDR counts
    pub ldr_left: i32,
    /// Right LDR counts
    pub ldr_right: i32,
    /// `ldr_left - ldr_right`
    pub diff: i32,
    /// Step taken on the emitting tick
    pub action: TrackerAction,
    /// Derived tracker status
    pub status: TrackerStatus,
}

impl SensorRecord {
    /// Verify the ranges the station clamps its outputs to
    pub fn check_ranges(&self) -> Result<(), SchemaError> {
        let t = &self.tracker;
        if !(SERVO_MIN_DEG..=SERVO_MAX_DEG).contains(&t.angle) {
            return Err(SchemaError::OutOfRange("tracker.angle"));
        }
        if t.ldr_left.checked_sub(t.ldr_right) != Some(t.diff) {
            return Err(SchemaError::OutOfRange("tracker.diff"));
        }
        if !(self.dust >= 0.0) {
            return Err(SchemaError::OutOfRange("dust"));
        }
        let pressure_range = f64::from(PRESSURE_MIN_KPA)..=f64::from(PRESSURE_MAX_KPA);
        if !pressure_range.contains(&self.pressure) {
            return Err(SchemaError::OutOfRange("pressure"));
        }
        if !(0.0..=100.0).contains(&self.hum) {
            return Err(SchemaError::OutOfRange("hum"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SensorRecord {
        SensorRecord {
            temp: 23.4,
            hum: 55.0,
            dust: 12.5,
            pressure: 0.04,
            time: 12,
            tracker: TrackerRecord {
                angle: 90,
                ldr_left: 500,
                ldr_right: 500,
                diff: 0,
                action: TrackerAction::Center,
                status: TrackerStatus::Centered,
            },
        }
    }

    #[test]
    fn clamped_record_passes_range_check() {
        assert_eq!(record().check_ranges(), Ok(()));
    }

    #[test]
    fn out_of_range_fields_are_named() {
        let mut bad = record();
        bad.tracker.angle = 151;
        assert_eq!(bad.check_ranges(), Err(SchemaError::OutOfRange("tracker.angle")));

        let mut bad = record();
        bad.pressure = 40.5;
        assert_eq!(bad.check_ranges(), Err(SchemaError::OutOfRange("pressure")));

        let mut bad = record();
        bad.dust = f64::NAN;
        assert_eq!(bad.check_ranges(), Err(SchemaError::OutOfRange("dust")));

        let mut bad = record();
        bad.tracker.diff = 7;
        assert_eq!(bad.check_ranges(), Err(SchemaError::OutOfRange("tracker.diff")));

        // Overflowing difference on a corrupted line is rejected, not a panic
        let mut bad = record();
        bad.tracker.ldr_left = i32::MIN;
        bad.tracker.ldr_right = 1;
        bad.tracker.diff = i32::MIN;
        assert_eq!(bad.check_ranges(), Err(SchemaError::OutOfRange("tracker.diff")));
    }

    #[test]
    fn tracker_labels_use_wire_spelling() {
        let json = serde_json::to_string(&record().tracker).unwrap();
        assert!(json.contains(r#""action":"CENTER""#));
        assert!(json.contains(r#""status":"CENTERED""#));
    }
}
