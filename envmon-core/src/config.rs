//! Station configuration
//!
//! Defaults come from [`crate::constants`]; the builders override single
//! values for boards with different hardware or for faster simulation.

use fugit::MillisDurationU64;

use crate::constants::{
    CALIBRATION_SAMPLES, CLIMATE_INTERVAL, PRESSURE_INTERVAL, STEADY_STATE_SAMPLES, TICK_PAUSE_MS,
};
use crate::errors::ConfigError;
use crate::pressure::PressureConfig;
use crate::tracker::TrackerConfig;

/// Runtime tuning for one station
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationConfig {
    /// Samples averaged for the zero offset at startup
    pub calibration_samples: usize,
    /// Samples averaged per steady-state pressure pass
    pub steady_samples: usize,
    /// Minimum spacing of pressure passes (ms)
    pub pressure_interval_ms: u64,
    /// Minimum spacing of climate reads (ms)
    pub climate_interval_ms: u64,
    /// Pause after each tick (ms)
    pub tick_pause_ms: u32,
    /// Solar tracker gains and geometry
    pub tracker: TrackerConfig,
    /// Pressure scale and clamp
    pub pressure: PressureConfig,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            calibration_samples: CALIBRATION_SAMPLES,
            steady_samples: STEADY_STATE_SAMPLES,
            pressure_interval_ms: PRESSURE_INTERVAL.ticks(),
            climate_interval_ms: CLIMATE_INTERVAL.ticks(),
            tick_pause_ms: TICK_PAUSE_MS,
            tracker: TrackerConfig::default(),
            pressure: PressureConfig::default(),
        }
    }
}

impl StationConfig {
    /// Override the startup calibration sample count
    pub fn with_calibration_samples(mut self, samples: usize) -> Self {
        self.calibration_samples = samples;
        self
    }

    /// Override the per-pass pressure sample count
    pub fn with_steady_samples(mut self, samples: usize) -> Self {
        self.steady_samples = samples;
        self
    }

    /// Override the pressure gate spacing
    pub fn with_pressure_interval(mut self, interval: MillisDurationU64) -> Self {
        self.pressure_interval_ms = interval.ticks();
        self
    }

    /// Override the climate gate spacing
    pub fn with_climate_interval(mut self, interval: MillisDurationU64) -> Self {
        self.climate_interval_ms = interval.ticks();
        self
    }

    /// Override the inter-tick pause
    pub fn with_tick_pause_ms(mut self, pause_ms: u32) -> Self {
        self.tick_pause_ms = pause_ms;
        self
    }

    /// Replace the tracker tuning
    pub fn with_tracker(mut self, tracker: TrackerConfig) -> Self {
        self.tracker = tracker;
        self
    }

    /// Replace the pressure tuning
    pub fn with_pressure(mut self, pressure: PressureConfig) -> Self {
        self.pressure = pressure;
        self
    }

    /// Check the nested tuning before handing the config to a station
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tracker.validate()?;
        self.pressure.validate()
    }

    /// Pressure gate spacing
    pub fn pressure_interval(&self) -> MillisDurationU64 {
        MillisDurationU64::millis(self.pressure_interval_ms)
    }

    /// Climate gate spacing
    pub fn climate_interval(&self) -> MillisDurationU64 {
        MillisDurationU64::millis(self.climate_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_firmware_constants() {
        let config = StationConfig::default();
        assert_eq!(config.calibration_samples, 20);
        assert_eq!(config.steady_samples, 5);
        assert_eq!(config.pressure_interval().ticks(), 5000);
        assert_eq!(config.climate_interval().ticks(), 2000);
        assert_eq!(config.tracker.center, 90);
    }

    #[test]
    fn builders_override_single_fields() {
        let config = StationConfig::default()
            .with_steady_samples(3)
            .with_climate_interval(MillisDurationU64::millis(500));
        assert_eq!(config.steady_samples, 3);
        assert_eq!(config.climate_interval_ms, 500);
        assert_eq!(config.calibration_samples, 20);
    }

    #[test]
    fn validate_reports_nested_tuning_errors() {
        assert_eq!(StationConfig::default().validate(), Ok(()));

        let inverted = TrackerConfig {
            min_angle: 150,
            max_angle: 30,
            ..TrackerConfig::default()
        };
        assert!(matches!(
            StationConfig::default().with_tracker(inverted).validate(),
            Err(ConfigError::InvertedRange { .. })
        ));

        let flat = PressureConfig {
            scale_counts_per_kpa: 0.0,
            ..PressureConfig::default()
        };
        assert!(matches!(
            StationConfig::default().with_pressure(flat).validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[cfg(feature = "std")]
    #[test]
    fn config_is_serde_capable() {
        // serde derive is present whenever std is on
        fn assert_serde<T: serde::Serialize + for<'de> serde::Deserialize<'de>>() {}
        assert_serde::<StationConfig>();
    }
}
