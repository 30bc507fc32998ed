//! Scripted analog channel

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::errors::SensorError;
use crate::hal::AnalogInput;

#[derive(Debug, Default)]
struct Script {
    queued: VecDeque<u16>,
    steady: u16,
    failures: usize,
    reads: usize,
}

/// Analog input returning queued values, then a steady level
///
/// Faults can be injected with [`SimAnalog::fail_next`].
///
/// Clones share the script, so a test keeps one clone to drive the value
/// while the driver owns another.
#[derive(Debug, Clone, Default)]
pub struct SimAnalog {
    script: Rc<RefCell<Script>>,
}

impl SimAnalog {
    /// Channel reading a constant `level`
    pub fn new(level: u16) -> Self {
        let channel = Self::default();
        channel.set(level);
        channel
    }

    /// Change the steady level
    pub fn set(&self, level: u16) {
        self.script.borrow_mut().steady = level.min(1023);
    }

    /// Queue one conversion ahead of the steady level
    pub fn push(&self, level: u16) {
        self.script.borrow_mut().queued.push_back(level.min(1023));
    }

    /// Fail the next `count` conversions with [`SensorError::Bus`]
    pub fn fail_next(&self, count: usize) {
        self.script.borrow_mut().failures = count;
    }

    /// Conversions attempted so far, failed ones included
    pub fn reads(&self) -> usize {
        self.script.borrow().reads
    }
}

impl AnalogInput for SimAnalog {
    type Error = SensorError;

    fn read(&mut self) -> Result<u16, Self::Error> {
        let mut script = self.script.borrow_mut();
        script.reads += 1;
        if script.failures > 0 {
            script.failures -= 1;
            return Err(SensorError::Bus);
        }
        let steady = script.steady;
        Ok(script.queued.pop_front().unwrap_or(steady))
    }
}
