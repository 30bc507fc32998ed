//! Simulated HX710-style bridge converter
//!
//! The converter is split across two pins that share state: data-out
//! ([`SimHx710Data`]) and clock-in ([`SimHx710Clock`]). Conversions come
//! from a script; with nothing scripted DOUT stays high, which is how an
//! unplugged sensor looks to the driver.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use super::clock::SimClock;

#[derive(Debug, Default)]
struct Hx710State {
    queued: VecDeque<i32>,
    steady: Option<i32>,
    /// Value being shifted out and rising edges seen so far
    shifting: Option<(u32, u32)>,
    sck_high: bool,
    conversions: usize,
    clock: Option<SimClock>,
    /// Rising SCK edges in µs, recorded only with a clock attached
    edges: Vec<u64>,
}

impl Hx710State {
    fn has_conversion(&self) -> bool {
        !self.queued.is_empty() || self.steady.is_some()
    }

    fn next_conversion(&mut self) -> Option<i32> {
        self.queued.pop_front().or(self.steady)
    }

    fn dout_high(&self) -> bool {
        match self.shifting {
            Some((raw, edges)) if (1..=24).contains(&edges) => raw & (1 << (24 - edges)) != 0,
            Some(_) => true,
            None => !self.has_conversion(),
        }
    }

    fn rising_edge(&mut self) {
        if let Some(clock) = &self.clock {
            self.edges.push(clock.now_us());
        }
        match self.shifting {
            None => {
                if let Some(value) = self.next_conversion() {
                    self.shifting = Some(((value as u32) & 0x00FF_FFFF, 1));
                }
            }
            Some((raw, edges)) => {
                let edges = edges + 1;
                if edges >= 25 {
                    // Gain pulse ends the conversion
                    self.shifting = None;
                    self.conversions += 1;
                } else {
                    self.shifting = Some((raw, edges));
                }
            }
        }
    }
}

/// Script handle for the simulated converter
#[derive(Debug, Clone, Default)]
pub struct SimHx710 {
    state: Rc<RefCell<Hx710State>>,
}

impl SimHx710 {
    /// Converter with nothing scripted
    pub fn new() -> Self {
        Self::default()
    }

    /// Converter that timestamps its clock line against `clock`
    pub fn timed(clock: &SimClock) -> Self {
        let sim = Self::new();
        sim.state.borrow_mut().clock = Some(clock.clone());
        sim
    }

    /// Pins to hand to [`crate::loadcell::LoadCell::new`]
    pub fn pins(&self) -> (SimHx710Data, SimHx710Clock) {
        (
            SimHx710Data {
                state: Rc::clone(&self.state),
            },
            SimHx710Clock {
                state: Rc::clone(&self.state),
            },
        )
    }

    /// Queue one conversion result
    pub fn push(&self, value: i32) {
        self.state.borrow_mut().queued.push_back(value);
    }

    /// Value returned once the queue is empty; `None` never becomes ready
    pub fn set_steady(&self, value: Option<i32>) {
        self.state.borrow_mut().steady = value;
    }

    /// Completed 25-pulse conversions
    pub fn conversions(&self) -> usize {
        self.state.borrow().conversions
    }

    /// Times (µs) of every rising clock edge; empty unless [`SimHx710::timed`]
    pub fn clock_edges(&self) -> Vec<u64> {
        self.state.borrow().edges.clone()
    }
}

/// Data-out line of the simulated converter
#[derive(Debug)]
pub struct SimHx710Data {
    state: Rc<RefCell<Hx710State>>,
}

/// Clock-in line of the simulated converter
#[derive(Debug)]
pub struct SimHx710Clock {
    state: Rc<RefCell<Hx710State>>,
}

impl ErrorType for SimHx710Data {
    type Error = Infallible;
}

impl InputPin for SimHx710Data {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.state.borrow().dout_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.state.borrow().dout_high())
    }
}

impl ErrorType for SimHx710Clock {
    type Error = Infallible;
}

impl OutputPin for SimHx710Clock {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.state.borrow_mut().sck_high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        if !state.sck_high {
            state.rising_edge();
        }
        state.sck_high = true;
        Ok(())
    }
}
