//! Contract tests between the station's encoder and the host schema
//!
//! Lines are produced by the firmware-side encoder (or by a full simulated
//! station run) and must parse into the host types with the same values.

use envmon_core::{
    config::StationConfig,
    sim::SimBoard,
    station::Station,
    tracker::{TrackerAction, TrackerReading, TrackerStatus},
    wire::{Message, SensorFrame},
};
use envmon_schemas::{parse_line, LineDecoder, SchemaError, StatusKind, WireMessage};
use proptest::prelude::*;

fn frame(temperature: f32, humidity: f32, dust: f32, pressure: f32) -> SensorFrame {
    SensorFrame {
        temperature,
        humidity,
        dust,
        pressure,
        uptime_s: 3_600,
        tracker: TrackerReading {
            angle: 120,
            ldr_left: 900,
            ldr_right: 300,
            diff: 600,
            action: TrackerAction::Right,
            status: TrackerStatus::Tracking,
        },
    }
}

#[test]
fn encoded_record_parses_with_documented_precision() {
    let line = Message::Record(&frame(-12.34, 55.6, 248.916, 0.0404)).encode().unwrap();
    let WireMessage::Record(record) = parse_line(&line).unwrap() else {
        panic!("not a record: {line}");
    };

    assert_eq!(record.temp, -12.3);
    assert_eq!(record.hum, 56.0);
    assert_eq!(record.dust, 248.92);
    assert_eq!(record.pressure, 0.04);
    assert_eq!(record.time, 3_600);
    assert_eq!(record.tracker.action, TrackerAction::Right);
    assert_eq!(record.tracker.status, TrackerStatus::Tracking);
    assert_eq!(record.check_ranges(), Ok(()));
}

#[test]
fn error_and_status_lines_parse() {
    let error = Message::Error("DHT sensor read failed").encode().unwrap();
    assert_eq!(
        parse_line(&error),
        Ok(WireMessage::Error {
            error: "DHT sensor read failed".into()
        })
    );

    let info = Message::Info("with \"quotes\"").encode().unwrap();
    assert_eq!(
        parse_line(&info),
        Ok(WireMessage::Status {
            status: StatusKind::Info,
            msg: "with \"quotes\"".into()
        })
    );
}

#[test]
fn truncated_record_is_noise() {
    let line = Message::Record(&frame(20.0, 40.0, 1.0, 1.0)).encode().unwrap();
    let cut = &line[..line.len() / 2];
    assert_eq!(parse_line(cut), Err(SchemaError::Noise));
}

#[test]
fn simulated_station_stream_decodes_end_to_end() {
    let (devices, sim) = SimBoard::build().unwrap();
    sim.load_cell.set_steady(Some(25_000));
    sim.dust_adc.set(120);
    sim.dht.respond_with_dht22(19.5, 62.0);
    sim.light_left.set(700);
    sim.light_right.set(300);

    let mut station = Station::start(devices, StationConfig::default());
    while sim.clock.now_ms() < 7_000 {
        station.tick();
        sim.clock.advance_ms(40);
    }

    // Deliver the stream in awkward chunks, as a serial read loop would
    let bytes = sim.serial.bytes();
    let mut decoder = LineDecoder::new();
    let mut messages = Vec::new();
    for chunk in bytes.chunks(7) {
        decoder.push(chunk);
        messages.extend(decoder.messages());
    }

    let ready = messages
        .iter()
        .position(|m| matches!(m, WireMessage::Status { status: StatusKind::Ready, .. }))
        .expect("READY line");
    let records: Vec<_> = messages[ready..]
        .iter()
        .filter_map(|m| match m {
            WireMessage::Record(r) => Some(r),
            _ => None,
        })
        .collect();

    assert_eq!(records.len(), 3);
    for record in &records {
        assert_eq!(record.check_ranges(), Ok(()));
        assert_eq!(record.temp, 19.5);
        assert_eq!(record.tracker.action, TrackerAction::Right);
    }
    // Bright left side drove the tracker to its upper stop before the first record
    assert!(records.iter().all(|r| r.tracker.angle == 150));
}

proptest! {
    #[test]
    fn any_clamped_frame_satisfies_host_ranges(
        temperature in -40.0f32..80.0,
        humidity in 0.0f32..100.0,
        raw_dust in 0u16..1024,
        pressure in 0.0f32..=40.0,
    ) {
        let dust = envmon_core::dust::counts_to_density(raw_dust);
        let line = Message::Record(&frame(temperature, humidity, dust, pressure)).encode().unwrap();
        match parse_line(&line) {
            Ok(WireMessage::Record(record)) => {
                prop_assert_eq!(record.check_ranges(), Ok(()));
            }
            other => {
                prop_assert!(false, "unexpected parse: {:?}", other);
            }
        }
    }
}
