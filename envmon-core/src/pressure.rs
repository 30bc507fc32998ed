//! Pressure Averaging and Zero Calibration
//!
//! ## Overview
//!
//! Pressure is derived from the load-cell bridge in three steps:
//!
//! ```text
//! raw samples ──► average_valid ──► (avg - zero_offset) / scale ──► clamp [0, 40] kPa
//!  (0 = invalid)    (int mean)         Calibration::pressure
//! ```
//!
//! ## Sample Filtering
//!
//! A raw `0` is the load cell's timeout sentinel, so every zero is dropped
//! from both the sum and the divisor. If a whole pass is zeros the average
//! is `0` as well; the station then reports a flat pressure rather than
//! faulting.
//!
//! ## Calibration
//!
//! The zero offset is captured once, before the main loop, with the port
//! open to ambient. Calibration uses 20 samples instead of the steady-state
//! 5: latency does not matter before the tracker starts moving, accuracy
//! does. The [`Calibration`] is never modified afterwards.

use embedded_hal::delay::DelayNs;

use crate::constants::sensors::{
    INTER_SAMPLE_DELAY_MS, LOAD_CELL_TIMEOUT_SENTINEL, PRESSURE_MAX_KPA, PRESSURE_MIN_KPA,
    PRESSURE_SCALE_COUNTS_PER_KPA,
};
use crate::errors::{ConfigError, SensorError, SensorResult};
use crate::loadcell::LoadCellReader;
use crate::time::TimeSource;

/// Pressure conversion tuning
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PressureConfig {
    /// Raw counts per kPa
    pub scale_counts_per_kpa: f32,
    /// Lower clamp (kPa)
    pub min_kpa: f32,
    /// Upper clamp (kPa)
    pub max_kpa: f32,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            scale_counts_per_kpa: PRESSURE_SCALE_COUNTS_PER_KPA,
            min_kpa: PRESSURE_MIN_KPA,
            max_kpa: PRESSURE_MAX_KPA,
        }
    }
}

impl PressureConfig {
    /// Checked tuning; rejects a zero scale or an inverted clamp
    pub fn new(scale_counts_per_kpa: f32, min_kpa: f32, max_kpa: f32) -> Result<Self, ConfigError> {
        let config = Self {
            scale_counts_per_kpa,
            min_kpa,
            max_kpa,
        };
        config.validate()?;
        Ok(config)
    }

    /// Finite non-zero scale and an ordered clamp
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scale_counts_per_kpa.is_finite() || self.scale_counts_per_kpa == 0.0 {
            return Err(ConfigError::Invalid {
                field: "pressure.scale_counts_per_kpa",
            });
        }
        // Also catches NaN bounds
        if !(self.min_kpa <= self.max_kpa) {
            return Err(ConfigError::InvertedRange {
                field: "pressure.min_kpa..pressure.max_kpa",
            });
        }
        Ok(())
    }
}

/// Zero offset and scale captured at startup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    zero_offset: i32,
    scale_factor: f32,
    min_kpa: f32,
    max_kpa: f32,
}

impl Calibration {
    /// Calibration with an explicit offset and the configured scale and clamp
    pub fn new(zero_offset: i32, config: &PressureConfig) -> Self {
        Self {
            zero_offset,
            scale_factor: config.scale_counts_per_kpa,
            min_kpa: config.min_kpa,
            max_kpa: config.max_kpa,
        }
    }

    /// Raw average recorded at ambient
    pub fn zero_offset(&self) -> i32 {
        self.zero_offset
    }

    /// Raw counts per kPa
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Convert a raw average to clamped gauge pressure in kPa
    pub fn pressure(&self, average: i32) -> f32 {
        let delta = (i64::from(average) - i64::from(self.zero_offset)) as f32;
        let kpa = delta / self.scale_factor;
        // NaN (zero scale) clamps to the lower bound
        if kpa.is_nan() {
            return self.min_kpa;
        }
        // Unlike `f32::clamp`, never panics on an unchecked inverted range
        kpa.max(self.min_kpa).min(self.max_kpa)
    }
}

/// Integer mean of the non-sentinel samples
///
/// Zeros are excluded from sum and count. The quotient truncates toward
/// zero. `NoValidSamples` when every sample was a sentinel.
pub fn mean_of_valid<I>(samples: I) -> SensorResult<i32>
where
    I: IntoIterator<Item = i32>,
{
    let (sum, count) = samples
        .into_iter()
        .filter(|&s| s != LOAD_CELL_TIMEOUT_SENTINEL)
        .fold((0i64, 0i64), |(sum, count), s| (sum + i64::from(s), count + 1));
    if count == 0 {
        return Err(SensorError::NoValidSamples);
    }
    Ok((sum / count) as i32)
}

/// [`mean_of_valid`], degrading to `0` when no sample is valid
pub fn average_valid<I>(samples: I) -> i32
where
    I: IntoIterator<Item = i32>,
{
    mean_of_valid(samples).unwrap_or(0)
}

/// Take `sample_count` raw readings with a short pause between them and
/// average the valid ones
pub fn read_averaged<L, C, D>(load_cell: &mut L, clock: &C, delay: &mut D, sample_count: usize) -> i32
where
    L: LoadCellReader + ?Sized,
    C: TimeSource + ?Sized,
    D: DelayNs,
{
    let samples = (0..sample_count).map(|i| {
        if i > 0 {
            delay.delay_ms(INTER_SAMPLE_DELAY_MS);
        }
        load_cell.read_raw(clock, &mut *delay)
    });
    match mean_of_valid(samples) {
        Ok(average) => average,
        Err(_) => {
            log_warn!("pressure pass produced no valid samples");
            0
        }
    }
}

/// Capture the zero offset from `sample_count` samples at ambient
pub fn calibrate<L, C, D>(
    load_cell: &mut L,
    clock: &C,
    delay: &mut D,
    sample_count: usize,
    config: &PressureConfig,
) -> Calibration
where
    L: LoadCellReader + ?Sized,
    C: TimeSource + ?Sized,
    D: DelayNs,
{
    let zero_offset = read_averaged(load_cell, clock, delay, sample_count);
    log_info!("pressure zero offset captured: {}", zero_offset);
    Calibration::new(zero_offset, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn calibration(zero_offset: i32) -> Calibration {
        Calibration::new(zero_offset, &PressureConfig::default())
    }

    #[test]
    fn zeros_are_excluded_from_sum_and_count() {
        assert_eq!(average_valid([100, 0, 300, 0]), 200);
    }

    #[test]
    fn all_invalid_pass_is_zero() {
        assert_eq!(mean_of_valid([0, 0, 0]), Err(SensorError::NoValidSamples));
        assert_eq!(average_valid([0, 0, 0, 0, 0]), 0);
        assert_eq!(average_valid(core::iter::empty()), 0);
    }

    #[test]
    fn average_truncates_toward_zero() {
        assert_eq!(average_valid([1, 2]), 1);
        assert_eq!(average_valid([-1, -2]), -1);
    }

    #[test]
    fn wide_samples_do_not_overflow() {
        assert_eq!(average_valid([i32::MAX, i32::MAX]), i32::MAX);
    }

    #[test]
    fn documented_pressure_scenario() {
        let cal = calibration(25_000);
        let kpa = cal.pressure(26_000);
        assert!((kpa - 0.04).abs() < 1e-6);
    }

    #[test]
    fn pressure_clamps_both_ends() {
        let cal = calibration(25_000);
        assert_eq!(cal.pressure(0), 0.0);
        assert_eq!(cal.pressure(24_000), 0.0);
        assert_eq!(cal.pressure(25_000 + 41 * 25_000), 40.0);
    }

    #[test]
    fn checked_config_rejects_unusable_tuning() {
        assert_eq!(PressureConfig::new(25_000.0, 0.0, 40.0), Ok(PressureConfig::default()));
        assert_eq!(
            PressureConfig::new(25_000.0, 40.0, 0.0),
            Err(ConfigError::InvertedRange {
                field: "pressure.min_kpa..pressure.max_kpa"
            })
        );
        assert_eq!(
            PressureConfig::new(0.0, 0.0, 40.0),
            Err(ConfigError::Invalid {
                field: "pressure.scale_counts_per_kpa"
            })
        );
        assert!(PressureConfig::new(25_000.0, f32::NAN, 40.0).is_err());
    }

    #[test]
    fn unchecked_inverted_clamp_does_not_panic() {
        let config = PressureConfig {
            min_kpa: 40.0,
            max_kpa: 0.0,
            ..PressureConfig::default()
        };
        assert_eq!(Calibration::new(25_000, &config).pressure(26_000), 0.0);
    }

    proptest! {
        #[test]
        fn invalid_samples_never_reach_the_mean(
            samples in proptest::collection::vec(prop_oneof![Just(0i32), -8_388_608i32..8_388_608], 1..40)
        ) {
            let valid: Vec<i64> = samples.iter().copied().filter(|&s| s != 0).map(i64::from).collect();
            prop_assume!(!valid.is_empty());
            let expected = valid.iter().sum::<i64>() / valid.len() as i64;
            prop_assert_eq!(i64::from(average_valid(samples)), expected);
        }

        #[test]
        fn pressure_is_always_in_range(average in any::<i32>(), offset in -8_388_608i32..8_388_608) {
            let kpa = calibration(offset).pressure(average);
            prop_assert!((0.0..=40.0).contains(&kpa));
        }
    }
}
