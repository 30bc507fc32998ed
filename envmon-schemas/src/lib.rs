//! Wire Schema for the envmon Serial Stream
//!
//! ## Overview
//!
//! The station writes one JSON object per line over a 9600 baud serial
//! link. This crate is the host's view of that contract: serde types for
//! the three line shapes, a parser that tells noise from data, and a byte
//! stream decoder that turns serial reads into messages.
//!
//! ## Line Shapes
//!
//! ```json
//! {"status":"info","msg":"Calibrating pressure sensor"}
//! {"status":"READY","msg":"System ready"}
//! {"error":"DHT sensor read failed"}
//! {"temp":23.4,"hum":55,"dust":248.92,"pressure":0.040,"time":12,
//!  "tracker":{"angle":88,"ldr_left":400,"ldr_right":600,"diff":-200,
//!             "action":"LEFT","status":"TRACKING"}}
//! ```
//!
//! The record is shown wrapped; on the wire it is a single line.
//!
//! ## Noise Tolerance
//!
//! A serial link delivers partial lines at connect time, bytes garbled by
//! resets, and the occasional non-JSON boot banner. None of these are
//! fatal: they surface as [`SchemaError::Noise`] and the reader moves on to
//! the next line. [`LineDecoder::messages`] drops them after logging.
//!
//! ## Range Checks
//!
//! The station clamps its outputs, so a record outside the documented
//! ranges means a corrupted line or a firmware mismatch.
//! [`SensorRecord::check_ranges`] verifies them on the host.
//!
//! ## Usage Example
//!
//! ```rust
//! use envmon_schemas::{LineDecoder, WireMessage};
//!
//! let mut decoder = LineDecoder::new();
//! decoder.push(b"garbage\r\n{\"error\":\"DHT sensor read failed\"}\r\n{\"temp\":2");
//!
//! let messages = decoder.messages();
//! assert_eq!(messages.len(), 1);
//! assert!(matches!(&messages[0], WireMessage::Error { error } if error == "DHT sensor read failed"));
//! assert_eq!(decoder.pending(), 9);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod decoder;
pub mod message;

pub use decoder::{parse_line, LineDecoder, MAX_LINE_BYTES};
pub use message::{SensorRecord, StatusKind, TrackerRecord, WireMessage};

/// Baud rate the host opens the station's serial port at
pub use envmon_core::constants::SERIAL_BAUD;

use thiserror_no_std::Error;

/// Reasons a line did not yield a message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Blank, truncated or not JSON at all
    #[error("Line is not JSON")]
    Noise,

    /// Valid JSON that matches none of the line shapes
    #[error("Unrecognised message shape: {0}")]
    Json(String),

    /// A record field lies outside the range the station guarantees
    #[error("Field out of range: {0}")]
    OutOfRange(&'static str),
}

impl SchemaError {
    /// Every schema error is confined to its line; the stream continues
    pub fn is_transient(&self) -> bool {
        true
    }
}
