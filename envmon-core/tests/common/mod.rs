//! Common test utilities for station integration tests
//!
//! This module provides:
//! - A simulated station fixture with sensible ambient defaults
//! - Helpers to tick until a condition or a point in simulated time
//! - Parsing helpers for the emitted JSON lines

#![allow(dead_code)]

use envmon_core::{
    config::StationConfig,
    sim::{SimBoard, SimHandles},
    station::{Emission, Station, TickReport},
};

/// Raw bridge reading at ambient used by most fixtures
pub const AMBIENT_COUNTS: i32 = 25_000;

/// A started station plus handles onto its simulated peripherals
pub struct Fixture {
    pub station: Station<SimBoard>,
    pub sim: SimHandles,
}

impl Fixture {
    /// Board with a working load cell, dust sensor and DHT22, started with
    /// the default configuration
    pub fn healthy() -> Self {
        Self::build(StationConfig::default(), |sim| {
            sim.load_cell.set_steady(Some(AMBIENT_COUNTS));
            sim.dust_adc.set(300);
            sim.dht.respond_with_dht22(23.4, 55.0);
        })
    }

    /// Board prepared by `setup` before the station starts
    pub fn build<F: FnOnce(&SimHandles)>(config: StationConfig, setup: F) -> Self {
        let (devices, sim) = SimBoard::build().expect("simulated board wires up");
        setup(&sim);
        let station = Station::start(devices, config);
        Self { station, sim }
    }

    /// Tick once, then pause as the firmware loop does
    pub fn step(&mut self) -> TickReport {
        let report = self.station.tick();
        self.sim
            .clock
            .advance_ms(u64::from(self.station.config().tick_pause_ms));
        report
    }

    /// Tick until simulated time reaches `ms`, returning every report
    pub fn run_until_ms(&mut self, ms: u64) -> Vec<TickReport> {
        let mut reports = Vec::new();
        while self.sim.clock.now_ms() < ms {
            reports.push(self.step());
        }
        reports
    }

    /// Tick until a tick emits something, giving up after `max_ticks`
    pub fn next_emission(&mut self, max_ticks: usize) -> Option<TickReport> {
        (0..max_ticks)
            .map(|_| self.step())
            .find(|report| report.emission != Emission::Nothing)
    }
}

/// Parse one emitted line
pub fn json(line: &str) -> serde_json::Value {
    serde_json::from_str(line).unwrap_or_else(|e| panic!("not JSON: {line:?}: {e}"))
}

/// Lines that are full records
pub fn records(lines: &[String]) -> Vec<serde_json::Value> {
    lines
        .iter()
        .map(|l| json(l))
        .filter(|v| v.get("temp").is_some())
        .collect()
}
