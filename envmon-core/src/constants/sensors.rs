//! Sensor Specifications and Conversion Models
//!
//! Operational constants for the four physical sensors sampled by the
//! station, taken from the parts' datasheets and the board wiring.

// ===== LOAD CELL (24-BIT DIFFERENTIAL ADC) =====

/// Number of data bits clocked out per conversion.
pub const LOAD_CELL_BITS: u32 = 24;

/// Extra clock pulses after the data bits.
///
/// One pulse selects channel A with gain 128 for the next conversion.
pub const LOAD_CELL_GAIN_PULSES: u32 = 1;

/// Half-period of the bit-banged clock (microseconds).
///
/// The converter latches on the rising edge and needs at least 0.2 µs
/// per phase; the clock must not stay high for more than 60 µs or the
/// part powers down.
pub const LOAD_CELL_CLOCK_HALF_PERIOD_US: u32 = 1;

/// Granularity of the data-ready poll (microseconds).
pub const LOAD_CELL_POLL_US: u32 = 10;

/// Raw reading returned when the converter never signalled ready.
///
/// Indistinguishable from a genuine all-zero conversion. Averaging treats
/// every zero as invalid.
pub const LOAD_CELL_TIMEOUT_SENTINEL: i32 = 0;

// ===== PRESSURE =====

/// Samples averaged for the one-time zero calibration at startup.
pub const CALIBRATION_SAMPLES: usize = 20;

/// Samples averaged for each steady-state pressure reading.
pub const STEADY_STATE_SAMPLES: usize = 5;

/// Pause between consecutive raw samples in an averaging pass (milliseconds).
pub const INTER_SAMPLE_DELAY_MS: u32 = 10;

/// Raw ADC counts per kilopascal.
///
/// Empirical for the 40 kPa bridge sensor on the station board.
pub const PRESSURE_SCALE_COUNTS_PER_KPA: f32 = 25_000.0;

/// Lowest reportable pressure (kPa, gauge).
pub const PRESSURE_MIN_KPA: f32 = 0.0;

/// Highest reportable pressure (kPa, gauge). Sensor full scale.
pub const PRESSURE_MAX_KPA: f32 = 40.0;

// ===== ANALOG INPUTS =====

/// ADC reference voltage (volts).
pub const ADC_REFERENCE_V: f32 = 5.0;

/// Counts spanning the ADC reference (10-bit converter).
pub const ADC_FULL_SCALE_COUNTS: f32 = 1024.0;

// ===== DUST SENSOR (PULSED OPTICAL) =====

/// LED on-time before the analog sample is taken (microseconds).
///
/// Source: Sharp GP2Y1010AU0F application note, 0.28 ms sampling point.
pub const DUST_SAMPLING_DELAY_US: u32 = 280;

/// Remainder of the 0.32 ms LED pulse after sampling (microseconds).
pub const DUST_PULSE_TAIL_US: u32 = 40;

/// Rest of the 10 ms duty cycle with the LED off (microseconds).
pub const DUST_CYCLE_REST_US: u32 = 9680;

/// Slope of the linear voltage-to-density model (µg/m³ per volt).
pub const DUST_DENSITY_SLOPE: f32 = 170.0;

/// Offset of the linear voltage-to-density model (µg/m³).
pub const DUST_DENSITY_OFFSET: f32 = 0.1;

// ===== CLIMATE (DHT SINGLE-WIRE) =====

/// Host start signal for DHT11, line held low (microseconds).
pub const DHT11_START_LOW_US: u32 = 18_000;

/// Host start signal for DHT22/AM2302, line held low (microseconds).
pub const DHT22_START_LOW_US: u32 = 1_100;

/// Host release time before the sensor answers (microseconds).
pub const DHT_START_RELEASE_US: u32 = 30;

/// Longest level the sensor may hold during the response and data phase
/// before the read is abandoned (microseconds).
pub const DHT_LEVEL_TIMEOUT_US: u32 = 100;

/// High-phase length above which a data bit decodes as `1` (microseconds).
///
/// A `0` bit is ~26-28 µs high, a `1` bit ~70 µs.
pub const DHT_ONE_THRESHOLD_US: u32 = 40;
