//! Capturing serial port

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

/// Serial port keeping everything written to it
#[derive(Debug, Clone, Default)]
pub struct SimSerial {
    tx: Rc<RefCell<Vec<u8>>>,
}

impl SimSerial {
    /// Empty port
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw bytes written so far
    pub fn bytes(&self) -> Vec<u8> {
        self.tx.borrow().clone()
    }

    /// Complete lines written so far, without terminators
    pub fn lines(&self) -> Vec<String> {
        let tx = self.tx.borrow();
        let text = String::from_utf8_lossy(&tx);
        let mut lines: Vec<String> = text.split('\n').map(|l| l.to_string()).collect();
        // Text after the last newline is not a complete line
        lines.pop();
        lines
    }

    /// Complete lines, draining the buffer up to the last newline
    pub fn take_lines(&self) -> Vec<String> {
        let lines = self.lines();
        let mut tx = self.tx.borrow_mut();
        let consumed = tx.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
        tx.drain(..consumed);
        lines
    }
}

impl embedded_io::ErrorType for SimSerial {
    type Error = Infallible;
}

impl embedded_io::Write for SimSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.tx.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
