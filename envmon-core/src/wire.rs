//! Line-Delimited JSON Encoder for the Serial Link
//!
//! ## Overview
//!
//! Every message on the link is one JSON object on one line:
//!
//! ```text
//! {"status":"info","msg":"Calibrating pressure sensor"}
//! {"status":"READY","msg":"System ready"}
//! {"error":"DHT sensor read failed"}
//! {"temp":23.4,"hum":55,"dust":248.92,"pressure":0.040,"time":12,"tracker":{...}}
//! ```
//!
//! Record fields carry a fixed number of decimals (temperature 1, humidity
//! 0, dust 2, pressure 3), which a generic serializer cannot express, so
//! lines are formatted with `core::fmt::Write` into a fixed-capacity
//! [`heapless::String`]. Nothing here allocates.
//!
//! Decimals round half away from zero (`54.5` → `55`, `-0.25` → `-0.3`),
//! matching the float printing of the common microcontroller serial
//! libraries rather than `core::fmt`'s round-half-to-even. A value that
//! rounds to zero is printed without a sign.
//!
//! The host parses each line independently and treats anything it cannot
//! parse as noise, so a dropped or truncated line costs one reading and
//! nothing more. Write failures are therefore reported, never retried.

use core::fmt;

use heapless::String;
use thiserror_no_std::Error;

use crate::tracker::TrackerReading;

/// Capacity of one encoded line, newline excluded
pub const LINE_CAPACITY: usize = 256;

/// One encoded line
pub type Line = String<LINE_CAPACITY>;

/// Everything one emission needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorFrame {
    /// °C, fresh this tick
    pub temperature: f32,
    /// %RH, fresh this tick
    pub humidity: f32,
    /// µg/m³, this tick's pulse
    pub dust: f32,
    /// kPa, possibly up to one pressure interval old
    pub pressure: f32,
    /// Whole seconds since boot
    pub uptime_s: u64,
    /// This tick's tracker outcome
    pub tracker: TrackerReading,
}

/// Failure to put a line on the link
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    /// Encoded line exceeded [`LINE_CAPACITY`]
    #[error("Encoded line exceeds buffer capacity")]
    LineTooLong,

    /// The serial port rejected the write
    #[error("Serial write failed")]
    Serial,
}

#[cfg(feature = "defmt")]
impl defmt::Format for WireError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::LineTooLong => defmt::write!(fmt, "LineTooLong"),
            Self::Serial => defmt::write!(fmt, "Serial"),
        }
    }
}

/// The three line shapes of the protocol
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message<'a> {
    /// `{"status":"info","msg":...}`
    Info(&'a str),
    /// `{"status":"READY","msg":...}`
    Ready(&'a str),
    /// `{"error":...}`
    Error(&'a str),
    /// Full sensor record
    Record(&'a SensorFrame),
}

impl Message<'_> {
    /// Format into any `fmt::Write` sink, without the trailing newline
    pub fn write_to<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        match self {
            Message::Info(msg) => write_status(out, "info", msg),
            Message::Ready(msg) => write_status(out, "READY", msg),
            Message::Error(text) => {
                out.write_str("{\"error\":")?;
                write_json_str(out, text)?;
                out.write_char('}')
            }
            Message::Record(frame) => write_record(out, frame),
        }
    }

    /// Encode into a fresh line buffer
    pub fn encode(&self) -> Result<Line, WireError> {
        let mut line = Line::new();
        self.write_to(&mut line).map_err(|_| WireError::LineTooLong)?;
        Ok(line)
    }

    /// Encode and write one newline-terminated line to `port`
    pub fn send<P: embedded_io::Write>(&self, port: &mut P) -> Result<(), WireError> {
        let line = self.encode()?;
        port.write_all(line.as_bytes()).map_err(|_| WireError::Serial)?;
        port.write_all(b"\n").map_err(|_| WireError::Serial)?;
        port.flush().map_err(|_| WireError::Serial)
    }
}

fn write_status<W: fmt::Write>(out: &mut W, status: &str, msg: &str) -> fmt::Result {
    out.write_str("{\"status\":")?;
    write_json_str(out, status)?;
    out.write_str(",\"msg\":")?;
    write_json_str(out, msg)?;
    out.write_char('}')
}

fn write_record<W: fmt::Write>(out: &mut W, frame: &SensorFrame) -> fmt::Result {
    let t = &frame.tracker;
    out.write_str("{\"temp\":")?;
    write_fixed(out, frame.temperature, 1)?;
    out.write_str(",\"hum\":")?;
    write_fixed(out, frame.humidity, 0)?;
    out.write_str(",\"dust\":")?;
    write_fixed(out, frame.dust, 2)?;
    out.write_str(",\"pressure\":")?;
    write_fixed(out, frame.pressure, 3)?;
    write!(out, ",\"time\":{},", frame.uptime_s)?;
    write!(
        out,
        "\"tracker\":{{\"angle\":{},\"ldr_left\":{},\"ldr_right\":{},\"diff\":{},\"action\":\"{}\",\"status\":\"{}\"}}}}",
        t.angle,
        t.ldr_left,
        t.ldr_right,
        t.diff,
        t.action.as_str(),
        t.status.as_str()
    )
}

/// Write `value` with exactly `decimals` digits after the point
///
/// Rounds half away from zero. Only finite values reach the encoder.
fn write_fixed<W: fmt::Write>(out: &mut W, value: f32, decimals: u32) -> fmt::Result {
    let scale = 10u64.pow(decimals);
    // Saturating cast; the station clamps every field far below u64 range
    let units = (f64::from(value).abs() * scale as f64 + 0.5) as u64;
    if value.is_sign_negative() && units != 0 {
        out.write_char('-')?;
    }
    write!(out, "{}", units / scale)?;
    if decimals > 0 {
        write!(out, ".{:0width$}", units % scale, width = decimals as usize)?;
    }
    Ok(())
}

/// Write `s` as a quoted JSON string
fn write_json_str<W: fmt::Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}
