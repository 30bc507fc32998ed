//! Simulated Station Example
//!
//! Runs the full station loop against the simulated board and prints the
//! serial stream exactly as the host would receive it.
//!
//! ## What You'll See
//!
//! - Startup info lines, the captured zero offset and `READY`
//! - One record every 2 s of simulated time
//! - The tracker walking toward a light source that moves across the sky
//! - A burst of `{"error":"DHT sensor read failed"}` while the sensor is
//!   unplugged
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example simulated_station
//! ```

use envmon_core::{
    config::StationConfig,
    sim::SimBoard,
    station::{Emission, Station},
};

const SIMULATED_SECONDS: u64 = 30;

fn main() {
    println!("envmon Simulated Station");
    println!("========================\n");

    let (devices, handles) = match SimBoard::build() {
        Ok(board) => board,
        Err(e) => {
            eprintln!("failed to wire simulated board: {e}");
            return;
        }
    };

    // Bridge at ambient reads ~25 000 counts with a little noise
    for i in 0..20 {
        handles.load_cell.push(25_000 + (i % 3) - 1);
    }
    handles.load_cell.set_steady(Some(27_500));
    handles.dust_adc.set(300);
    handles.dht.respond_with_dht22(23.4, 55.0);

    let mut station = Station::start(devices, StationConfig::default());

    let mut records = 0;
    let mut errors = 0;
    while handles.clock.now_ms() < SIMULATED_SECONDS * 1_000 {
        let seconds = handles.clock.now_ms() / 1_000;

        // Sun drifts from the left sensor to the right one
        let left = 800u16.saturating_sub((seconds * 40) as u16);
        handles.light_left.set(left.max(200));
        handles.light_right.set(500);

        // Sensor unplugged between 12 s and 16 s
        if (12..16).contains(&seconds) {
            handles.dht.go_silent();
        } else {
            handles.dht.respond_with_dht22(23.4 + seconds as f32 * 0.05, 55.0);
        }

        let report = station.tick();
        match report.emission {
            Emission::Record(_) => records += 1,
            Emission::ClimateError => errors += 1,
            Emission::Nothing => {}
        }

        // Pause between ticks, as the firmware loop does
        handles.clock.advance_ms(u64::from(station.config().tick_pause_ms));
    }

    for line in handles.serial.lines() {
        println!("{line}");
    }

    println!();
    println!("Summary:");
    println!("  Simulated time: {} s", SIMULATED_SECONDS);
    println!("  Records: {records}");
    println!("  Errors: {errors}");
    println!("  Final servo pulse: {} µs", handles.servo.pulse_us());
}
