//! Hysteretic Solar-Tracking Controller
//!
//! ## Overview
//!
//! Two light-dependent resistors sit either side of a divider on the panel.
//! Each tick the controller compares them and nudges the single servo one
//! fixed step toward balance; inside a dead band it drifts back to center
//! instead. There is no integral or derivative term: the gains are fixed.
//!
//! ## Decision Table
//!
//! | Condition (`diff = left - right`) | Position   | Step          | Action   |
//! |-----------------------------------|------------|---------------|----------|
//! | `diff > tolerance`                | any        | `+step`       | `RIGHT`  |
//! | `diff < -tolerance`               | any        | `-step`       | `LEFT`   |
//! | within tolerance                  | `> center` | toward center | `RETURN` |
//! | within tolerance                  | `< center` | toward center | `RETURN` |
//! | within tolerance                  | `= center` | none          | `CENTER` |
//!
//! The mount's linkage is mechanically inverted: a brighter left sensor
//! (positive `diff`) requires a larger angle, hence `RIGHT` increases it.
//!
//! A return step never crosses the center, so the controller settles on
//! center instead of hunting around it.
//!
//! ## Clamping
//!
//! The candidate position is clamped to `[min, max]` on every tick before
//! it reaches the servo, whether or not a step was taken, so an
//! out-of-range angle can never persist.
//!
//! ## Status
//!
//! Status is derived, never stored:
//! - `CENTERED` when within tolerance and exactly at center
//! - `RETURNING` when the action was a return step
//! - `TRACKING` when the action was `LEFT` or `RIGHT`
//! - `IDLE` otherwise

use crate::constants::tracker::{
    SERVO_CENTER_DEG, SERVO_MAX_DEG, SERVO_MIN_DEG, TRACKER_STEP_DEG, TRACKER_TOLERANCE,
};
use crate::errors::ConfigError;

/// Controller gains and geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackerConfig {
    /// Dead-band half width on `left - right`
    pub tolerance: i32,
    /// Degrees moved per tick
    pub step: i32,
    /// Rest position
    pub center: i32,
    /// Lower travel limit
    pub min_angle: i32,
    /// Upper travel limit
    pub max_angle: i32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tolerance: TRACKER_TOLERANCE,
            step: TRACKER_STEP_DEG,
            center: SERVO_CENTER_DEG,
            min_angle: SERVO_MIN_DEG,
            max_angle: SERVO_MAX_DEG,
        }
    }
}

impl TrackerConfig {
    /// Checked tuning; rejects geometry the controller cannot honour
    pub fn new(
        tolerance: i32,
        step: i32,
        center: i32,
        min_angle: i32,
        max_angle: i32,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            tolerance,
            step,
            center,
            min_angle,
            max_angle,
        };
        config.validate()?;
        Ok(config)
    }

    /// Travel limits ordered, center inside them, positive step
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_angle > self.max_angle {
            return Err(ConfigError::InvertedRange {
                field: "tracker.min_angle..tracker.max_angle",
            });
        }
        if !(self.min_angle..=self.max_angle).contains(&self.center) {
            return Err(ConfigError::Invalid {
                field: "tracker.center",
            });
        }
        if self.step <= 0 {
            return Err(ConfigError::Invalid {
                field: "tracker.step",
            });
        }
        if self.tolerance < 0 {
            return Err(ConfigError::Invalid {
                field: "tracker.tolerance",
            });
        }
        Ok(())
    }

    /// Bound `angle` to the travel limits
    ///
    /// Never panics: with unchecked inverted limits the upper one wins.
    fn limit(&self, angle: i32) -> i32 {
        angle.max(self.min_angle).min(self.max_angle)
    }
}

/// What the controller did this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum TrackerAction {
    /// Stepped toward lower angles
    Left,
    /// Stepped toward higher angles
    Right,
    /// Stepped back toward center inside the dead band
    Return,
    /// Held at center
    Center,
}

impl TrackerAction {
    /// Label used on the serial link
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Return => "RETURN",
            Self::Center => "CENTER",
        }
    }
}

/// Summary of the tracker's situation after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum TrackerStatus {
    /// Balanced and parked at center
    Centered,
    /// Drifting back to center
    Returning,
    /// Actively following the light
    Tracking,
    /// None of the above
    Idle,
}

impl TrackerStatus {
    /// Label used on the serial link
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Centered => "CENTERED",
            Self::Returning => "RETURNING",
            Self::Tracking => "TRACKING",
            Self::Idle => "IDLE",
        }
    }
}

/// The controller's only memory: the commanded servo angle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerState {
    servo_position: i32,
}

impl TrackerState {
    /// Start at the configured center
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            servo_position: config.center,
        }
    }

    /// Start at an arbitrary angle, clamped into range
    pub fn at(position: i32, config: &TrackerConfig) -> Self {
        Self {
            servo_position: config.limit(position),
        }
    }

    /// Commanded angle in degrees
    pub fn servo_position(&self) -> i32 {
        self.servo_position
    }
}

/// Outcome of one controller update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerReading {
    /// Angle written to the servo
    pub angle: i32,
    /// Left LDR counts
    pub ldr_left: i32,
    /// Right LDR counts
    pub ldr_right: i32,
    /// `left - right`
    pub diff: i32,
    /// Step taken
    pub action: TrackerAction,
    /// Derived status
    pub status: TrackerStatus,
}

/// Advance the controller one tick
pub fn update(
    state: &mut TrackerState,
    config: &TrackerConfig,
    ldr_left: i32,
    ldr_right: i32,
) -> TrackerReading {
    let diff = ldr_left.saturating_sub(ldr_right);
    let within = diff.saturating_abs() <= config.tolerance;
    let position = state.servo_position;

    let (candidate, action) = if diff > config.tolerance {
        (position.saturating_add(config.step), TrackerAction::Right)
    } else if diff < -config.tolerance {
        (position.saturating_sub(config.step), TrackerAction::Left)
    } else if position > config.center {
        (position.saturating_sub(config.step).max(config.center), TrackerAction::Return)
    } else if position < config.center {
        (position.saturating_add(config.step).min(config.center), TrackerAction::Return)
    } else {
        (position, TrackerAction::Center)
    };

    state.servo_position = config.limit(candidate);

    let status = if within && state.servo_position == config.center {
        TrackerStatus::Centered
    } else {
        match action {
            TrackerAction::Return => TrackerStatus::Returning,
            TrackerAction::Left | TrackerAction::Right => TrackerStatus::Tracking,
            TrackerAction::Center => TrackerStatus::Idle,
        }
    };

    TrackerReading {
        angle: state.servo_position,
        ldr_left,
        ldr_right,
        diff,
        action,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cfg() -> TrackerConfig {
        TrackerConfig::default()
    }

    #[test]
    fn darker_left_steps_left() {
        let config = cfg();
        let mut state = TrackerState::new(&config);
        let reading = update(&mut state, &config, 400, 600);

        assert_eq!(reading.diff, -200);
        assert_eq!(reading.action, TrackerAction::Left);
        assert_eq!(reading.status, TrackerStatus::Tracking);
        assert_eq!(state.servo_position(), 90 - config.step);
    }

    #[test]
    fn brighter_left_steps_right() {
        let config = cfg();
        let mut state = TrackerState::new(&config);
        let reading = update(&mut state, &config, 700, 600);

        assert_eq!(reading.action, TrackerAction::Right);
        assert_eq!(reading.angle, 90 + config.step);
    }

    #[test]
    fn extreme_light_levels_saturate_the_difference() {
        let config = cfg();
        let mut state = TrackerState::new(&config);

        let reading = update(&mut state, &config, i32::MIN, 1);
        assert_eq!(reading.diff, i32::MIN);
        assert_eq!(reading.action, TrackerAction::Left);

        let reading = update(&mut state, &config, i32::MAX, -1);
        assert_eq!(reading.diff, i32::MAX);
        assert_eq!(reading.action, TrackerAction::Right);
        assert_eq!(reading.angle, 90);
    }

    #[test]
    fn checked_config_rejects_bad_geometry() {
        assert_eq!(TrackerConfig::new(30, 2, 90, 30, 150), Ok(cfg()));
        assert_eq!(
            TrackerConfig::new(30, 2, 90, 150, 30),
            Err(ConfigError::InvertedRange {
                field: "tracker.min_angle..tracker.max_angle"
            })
        );
        assert_eq!(
            TrackerConfig::new(30, 2, 10, 30, 150),
            Err(ConfigError::Invalid {
                field: "tracker.center"
            })
        );
        assert_eq!(
            TrackerConfig::new(30, 0, 90, 30, 150),
            Err(ConfigError::Invalid {
                field: "tracker.step"
            })
        );
    }

    #[test]
    fn unchecked_inverted_limits_do_not_panic() {
        let config = TrackerConfig {
            min_angle: 150,
            max_angle: 30,
            ..cfg()
        };
        let mut state = TrackerState::new(&config);
        let reading = update(&mut state, &config, 700, 600);
        assert_eq!(reading.angle, 30);
        assert_eq!(TrackerState::at(90, &config).servo_position(), 30);
    }

    #[test]
    fn tolerance_band_is_inclusive() {
        let config = cfg();
        let mut state = TrackerState::new(&config);
        let reading = update(&mut state, &config, 530, 500);
        assert_eq!(reading.action, TrackerAction::Center);

        let reading = update(&mut state, &config, 531, 500);
        assert_eq!(reading.action, TrackerAction::Right);
    }

    #[test]
    fn centered_is_idempotent() {
        let config = cfg();
        let mut state = TrackerState::new(&config);
        for _ in 0..50 {
            let reading = update(&mut state, &config, 512, 500);
            assert_eq!(reading.angle, 90);
            assert_eq!(reading.action, TrackerAction::Center);
            assert_eq!(reading.status, TrackerStatus::Centered);
        }
    }

    #[test]
    fn returns_from_above_and_below() {
        let config = cfg();

        let mut high = TrackerState::at(100, &config);
        let reading = update(&mut high, &config, 500, 500);
        assert_eq!(reading.action, TrackerAction::Return);
        assert_eq!(reading.status, TrackerStatus::Returning);
        assert_eq!(reading.angle, 98);

        let mut low = TrackerState::at(80, &config);
        let reading = update(&mut low, &config, 500, 500);
        assert_eq!(reading.action, TrackerAction::Return);
        assert_eq!(reading.angle, 82);
    }

    #[test]
    fn return_step_landing_on_center_reports_centered() {
        let config = cfg();
        let mut state = TrackerState::at(92, &config);
        let reading = update(&mut state, &config, 500, 500);
        assert_eq!(reading.action, TrackerAction::Return);
        assert_eq!(reading.status, TrackerStatus::Centered);
    }

    #[test]
    fn return_step_does_not_overshoot_center() {
        let config = TrackerConfig { step: 7, ..cfg() };
        let mut state = TrackerState::at(93, &config);
        assert_eq!(update(&mut state, &config, 0, 0).angle, 90);
        assert_eq!(update(&mut state, &config, 0, 0).action, TrackerAction::Center);
    }

    #[test]
    fn converges_to_upper_limit_and_stays() {
        let config = cfg();
        let mut state = TrackerState::new(&config);
        let mut previous = state.servo_position();
        while previous < config.max_angle {
            let reading = update(&mut state, &config, 900, 100);
            assert_eq!(reading.angle, (previous + config.step).min(config.max_angle));
            previous = reading.angle;
        }
        for _ in 0..10 {
            assert_eq!(update(&mut state, &config, 900, 100).angle, 150);
        }
    }

    #[test]
    fn wire_labels() {
        assert_eq!(TrackerAction::Left.as_str(), "LEFT");
        assert_eq!(TrackerAction::Return.as_str(), "RETURN");
        assert_eq!(TrackerStatus::Centered.as_str(), "CENTERED");
        assert_eq!(TrackerStatus::Idle.as_str(), "IDLE");
    }

    proptest! {
        #[test]
        fn position_always_in_bounds(
            start in -500i32..500,
            inputs in proptest::collection::vec((0i32..1024, 0i32..1024), 0..300),
        ) {
            let config = cfg();
            let mut state = TrackerState::at(start, &config);
            prop_assert!((30..=150).contains(&state.servo_position()));
            for (left, right) in inputs {
                let reading = update(&mut state, &config, left, right);
                prop_assert!((30..=150).contains(&reading.angle));
                prop_assert_eq!(reading.angle, state.servo_position());
            }
        }

        #[test]
        fn constant_bright_left_increases_strictly_until_clamped(
            diff in 31i32..1023,
            ticks in 1usize..120,
        ) {
            let config = cfg();
            let mut state = TrackerState::new(&config);
            for _ in 0..ticks {
                let before = state.servo_position();
                let after = update(&mut state, &config, diff, 0).angle;
                if before < config.max_angle {
                    prop_assert_eq!(after, (before + config.step).min(config.max_angle));
                    prop_assert!(after > before);
                } else {
                    prop_assert_eq!(after, config.max_angle);
                }
            }
        }
    }
}
