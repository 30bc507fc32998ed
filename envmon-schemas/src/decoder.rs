//! Line parsing and serial byte-stream decoding

use crate::message::WireMessage;
use crate::SchemaError;

/// Longest line kept while waiting for its newline; longer input is noise
pub const MAX_LINE_BYTES: usize = 1024;

/// Parse one line
///
/// Surrounding whitespace (including `\r`) is ignored. Anything that is not
/// JSON is [`SchemaError::Noise`]; JSON of an unknown shape is
/// [`SchemaError::Json`].
pub fn parse_line(line: &str) -> Result<WireMessage, SchemaError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(SchemaError::Noise);
    }
    let value: serde_json::Value = serde_json::from_str(line).map_err(|_| SchemaError::Noise)?;
    serde_json::from_value(value).map_err(|e| SchemaError::Json(e.to_string()))
}

/// Reassembles lines from arbitrarily split serial reads
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
    discarding: bool,
}

impl LineDecoder {
    /// Empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes read from the port
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes held that do not yet form a complete line
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Next complete line, decoded lossily and without its terminator
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let Some(end) = self.buffer.iter().position(|&b| b == b'\n') else {
                if self.buffer.len() > MAX_LINE_BYTES {
                    // Runaway line: drop what we have and skip to its end
                    log::debug!("discarding {} bytes without newline", self.buffer.len());
                    self.buffer.clear();
                    self.discarding = true;
                }
                return None;
            };

            let raw: Vec<u8> = self.buffer.drain(..=end).collect();
            if self.discarding {
                self.discarding = false;
                continue;
            }
            let text = String::from_utf8_lossy(&raw[..end]);
            return Some(text.trim_end_matches('\r').to_string());
        }
    }

    /// Every complete line parsed, noise skipped
    pub fn messages(&mut self) -> Vec<WireMessage> {
        let mut messages = Vec::new();
        while let Some(line) = self.next_line() {
            match parse_line(&line) {
                Ok(message) => messages.push(message),
                Err(e) => log::debug!("skipping line {:?}: {}", line, e),
            }
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StatusKind;

    #[test]
    fn status_lines_parse() {
        let msg = parse_line(r#"{"status":"READY","msg":"System ready"}"#).unwrap();
        assert_eq!(
            msg,
            WireMessage::Status {
                status: StatusKind::Ready,
                msg: "System ready".into()
            }
        );
    }

    #[test]
    fn blank_and_garbage_are_noise() {
        assert_eq!(parse_line(""), Err(SchemaError::Noise));
        assert_eq!(parse_line("  \r"), Err(SchemaError::Noise));
        assert_eq!(parse_line("{\"temp\":2"), Err(SchemaError::Noise));
        assert_eq!(parse_line("\u{fffd}\u{fffd}boot"), Err(SchemaError::Noise));
    }

    #[test]
    fn unknown_shape_is_json_error() {
        assert!(matches!(parse_line(r#"{"hello":1}"#), Err(SchemaError::Json(_))));
        assert!(matches!(parse_line(r#"{"status":"busy","msg":"x"}"#), Err(SchemaError::Json(_))));
        assert!(matches!(parse_line("42"), Err(SchemaError::Json(_))));
    }

    #[test]
    fn lines_survive_arbitrary_splits() {
        let mut decoder = LineDecoder::new();
        decoder.push(b"{\"error\":\"DHT se");
        assert_eq!(decoder.next_line(), None);
        decoder.push(b"nsor read failed\"}\r\n");
        assert_eq!(
            decoder.next_line().as_deref(),
            Some(r#"{"error":"DHT sensor read failed"}"#)
        );
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let mut decoder = LineDecoder::new();
        decoder.push(&[0xFF, 0xFE, b'\n']);
        decoder.push(b"{\"status\":\"info\",\"msg\":\"ok\"}\n");
        let messages = decoder.messages();
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn runaway_line_is_dropped() {
        let mut decoder = LineDecoder::new();
        decoder.push(&[b'x'; MAX_LINE_BYTES + 1]);
        assert_eq!(decoder.next_line(), None);
        assert_eq!(decoder.pending(), 0);

        decoder.push(b"still the same line\n{\"error\":\"e\"}\n");
        assert_eq!(decoder.next_line().as_deref(), Some(r#"{"error":"e"}"#));
    }
}
