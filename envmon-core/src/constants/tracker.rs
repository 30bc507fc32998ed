//! Solar Tracker Geometry
//!
//! Mechanical limits of the tracker mount and the fixed gains of the
//! hysteretic controller. Angles are servo degrees.

/// Lowest commanded angle. The mount hits its end stop below this.
pub const SERVO_MIN_DEG: i32 = 30;

/// Highest commanded angle.
pub const SERVO_MAX_DEG: i32 = 150;

/// Rest position, panel facing straight up.
pub const SERVO_CENTER_DEG: i32 = 90;

/// Angle change applied per tick when a step is taken.
pub const TRACKER_STEP_DEG: i32 = 2;

/// Half-width of the dead band on `left - right` (raw ADC counts).
pub const TRACKER_TOLERANCE: i32 = 30;

// ===== SERVO PULSE =====

/// Pulse width commanding 0° (microseconds).
pub const SERVO_MIN_PULSE_US: u32 = 544;

/// Pulse width commanding 180° (microseconds).
pub const SERVO_MAX_PULSE_US: u32 = 2400;

/// Servo frame period at 50 Hz (microseconds).
pub const SERVO_FRAME_US: u32 = 20_000;

/// Full mechanical travel of the servo (degrees).
pub const SERVO_TRAVEL_DEG: u32 = 180;
