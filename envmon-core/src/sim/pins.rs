//! Recording output pin and PWM channel

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};

use super::clock::SimClock;

/// Output pin logging every level change with its timestamp
#[derive(Debug, Clone)]
pub struct SimOutputPin {
    clock: SimClock,
    high: Rc<Cell<bool>>,
    transitions: Rc<RefCell<Vec<(u64, bool)>>>,
}

impl SimOutputPin {
    /// Pin starting low, timestamped by `clock`
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
            high: Rc::new(Cell::new(false)),
            transitions: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Current level
    pub fn is_set_high(&self) -> bool {
        self.high.get()
    }

    /// `(time in µs, new level)` for every change
    pub fn transitions(&self) -> Vec<(u64, bool)> {
        self.transitions.borrow().clone()
    }

    fn drive(&self, high: bool) {
        if self.high.get() != high {
            self.transitions.borrow_mut().push((self.clock.now_us(), high));
        }
        self.high.set(high);
    }
}

impl ErrorType for SimOutputPin {
    type Error = Infallible;
}

impl OutputPin for SimOutputPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

/// PWM channel whose duty resolution is 1 µs of a 20 ms frame
///
/// Every update is logged with its timestamp, so tests can order servo
/// writes against other pins driven in the same tick.
#[derive(Debug, Clone)]
pub struct SimPwm {
    clock: SimClock,
    duty: Rc<Cell<u16>>,
    log: Rc<RefCell<Vec<(u64, u16)>>>,
}

impl SimPwm {
    /// Channel at 0 % duty, timestamped by `clock`
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
            duty: Rc::new(Cell::new(0)),
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Current pulse width in µs
    pub fn pulse_us(&self) -> u16 {
        self.duty.get()
    }

    /// Duty updates so far
    pub fn writes(&self) -> usize {
        self.log.borrow().len()
    }

    /// `(time in µs, duty)` for every update, repeated values included
    pub fn write_log(&self) -> Vec<(u64, u16)> {
        self.log.borrow().clone()
    }
}

impl pwm::ErrorType for SimPwm {
    type Error = Infallible;
}

impl SetDutyCycle for SimPwm {
    fn max_duty_cycle(&self) -> u16 {
        20_000
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty.set(duty);
        self.log.borrow_mut().push((self.clock.now_us(), duty));
        Ok(())
    }
}
