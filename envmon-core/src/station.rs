//! Cooperative Scheduler and Record Emitter
//!
//! ## Overview
//!
//! One thread, no interrupts, no preemption. Each tick runs every component
//! in a fixed priority order:
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌────────────────┐   ┌───────────────┐   ┌──────────┐
//! │ tracker  │──►│   dust   │──►│ pressure gate  │──►│ climate gate  │──►│  emit    │
//! │ (always) │   │ (always) │   │ (every 5 s)    │   │ (every 2 s)   │   │ record / │
//! └──────────┘   └──────────┘   └────────────────┘   └───────────────┘   │ error    │
//!                                                                        └──────────┘
//! ```
//!
//! The actuator is updated first so it never waits behind a slow sensor.
//! The only bounded wait is the 100 ms load-cell ready poll.
//!
//! ## Emission Cadence
//!
//! A record is emitted only on ticks where the climate sampler fired and
//! returned a valid pair, so the host sees ~0.5 Hz regardless of the ~20 Hz
//! tick rate. A failed climate read emits `{"error":"DHT sensor read
//! failed"}` instead and leaves the stored pair untouched. Pressure in a
//! record may be up to one pressure interval old.
//!
//! ## State
//!
//! All mutable state lives in [`StationState`], owned by the [`Station`]
//! and passed by exclusive reference into each component's update.

use core::fmt::Write as _;

use embedded_hal::delay::DelayNs;

use crate::board::{Board, Devices};
use crate::climate::{ClimateReading, ClimateSensor};
use crate::config::StationConfig;
use crate::dust::DustSampler;
use crate::gate::TimedSample;
use crate::hal::{AnalogInput, Servo};
use crate::pressure::{self, Calibration};
use crate::time::{uptime_seconds, TimeSource, Timestamp};
use crate::tracker::{self, TrackerAction, TrackerReading, TrackerState, TrackerStatus};
use crate::wire::{Message, SensorFrame};

const MSG_TRACKER_READY: &str = "Solar tracker centered";
const MSG_CALIBRATING: &str = "Calibrating pressure sensor";
const MSG_READY: &str = "System ready";

/// Everything the loop remembers between ticks
#[derive(Debug, Clone, Copy)]
pub struct StationState {
    /// Zero offset captured at startup
    pub calibration: Calibration,
    /// Commanded servo angle
    pub tracker: TrackerState,
    /// Last tracker outcome, reused if the light sensors fail
    pub last_tracker: TrackerReading,
    /// Last dust density, reused if the dust pulse fails
    pub last_dust: f32,
    /// Last computed pressure and its gate
    pub pressure: TimedSample<f32>,
    /// Last valid climate pair and its gate
    pub climate: TimedSample<ClimateReading>,
}

impl StationState {
    /// Initial state for `config` with an already captured calibration
    pub fn new(config: &StationConfig, calibration: Calibration) -> Self {
        let tracker = TrackerState::new(&config.tracker);
        Self {
            calibration,
            tracker,
            last_tracker: TrackerReading {
                angle: tracker.servo_position(),
                ldr_left: 0,
                ldr_right: 0,
                diff: 0,
                action: TrackerAction::Center,
                status: TrackerStatus::Centered,
            },
            last_dust: 0.0,
            pressure: TimedSample::new(config.pressure.min_kpa, config.pressure_interval()),
            climate: TimedSample::new(ClimateReading::FAILED, config.climate_interval()),
        }
    }
}

/// What a tick emitted on the serial link
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Emission {
    /// Climate gate closed; nothing sent
    Nothing,
    /// Full record sent
    Record(SensorFrame),
    /// Climate read failed; error line sent
    ClimateError,
}

/// Summary of one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Clock reading at the start of the tick
    pub started_at: Timestamp,
    /// Tracker outcome
    pub tracker: TrackerReading,
    /// Dust density used this tick
    pub dust: f32,
    /// Pressure gate fired
    pub pressure_refreshed: bool,
    /// Climate gate fired
    pub climate_attempted: bool,
    /// Line sent, if any
    pub emission: Emission,
}

/// The sampling-and-control loop for one board
pub struct Station<B: Board> {
    devices: Devices<B>,
    config: StationConfig,
    state: StationState,
}

impl<B: Board> Station<B> {
    /// Center the tracker, calibrate pressure and announce readiness
    pub fn start(mut devices: Devices<B>, config: StationConfig) -> Self {
        let tracker = TrackerState::new(&config.tracker);
        write_servo(&mut devices.servo, tracker.servo_position());
        send(&mut devices.serial, Message::Info(MSG_TRACKER_READY));

        send(&mut devices.serial, Message::Info(MSG_CALIBRATING));
        let calibration = pressure::calibrate(
            &mut devices.load_cell,
            &devices.clock,
            &mut devices.delay,
            config.calibration_samples,
            &config.pressure,
        );

        let mut msg: heapless::String<48> = heapless::String::new();
        if write!(msg, "Zero offset: {}", calibration.zero_offset()).is_ok() {
            send(&mut devices.serial, Message::Info(&msg));
        }
        send(&mut devices.serial, Message::Ready(MSG_READY));
        log_info!("station ready, zero offset {}", calibration.zero_offset());

        let state = StationState::new(&config, calibration);
        Self {
            devices,
            config,
            state,
        }
    }

    /// Run one loop iteration
    pub fn tick(&mut self) -> TickReport {
        let started_at = self.devices.clock.now();
        let tracker = self.track();
        let dust = self.sample_dust();

        let pressure_refreshed = self.refresh_pressure();

        let now = self.devices.clock.now();
        let climate = &mut self.devices.climate;
        let delay = &mut self.devices.delay;
        let outcome = self
            .state
            .climate
            .refresh(now, || climate.read(delay).validated());

        let emission = match outcome {
            None => Emission::Nothing,
            Some(Ok(reading)) => {
                let frame = SensorFrame {
                    temperature: reading.temperature,
                    humidity: reading.humidity,
                    dust,
                    pressure: self.state.pressure.value(),
                    uptime_s: uptime_seconds(self.devices.clock.now()),
                    tracker,
                };
                send(&mut self.devices.serial, Message::Record(&frame));
                Emission::Record(frame)
            }
            Some(Err(e)) => {
                log_warn!("climate read rejected");
                if let Some(text) = e.wire_message() {
                    send(&mut self.devices.serial, Message::Error(text));
                }
                Emission::ClimateError
            }
        };

        TickReport {
            started_at,
            tracker,
            dust,
            pressure_refreshed,
            climate_attempted: outcome.is_some(),
            emission,
        }
    }

    /// Tick forever with the configured pause between ticks
    pub fn run(mut self) -> ! {
        loop {
            self.tick();
            self.devices.delay.delay_ms(self.config.tick_pause_ms);
        }
    }

    /// Current loop state
    pub fn state(&self) -> &StationState {
        &self.state
    }

    /// Active configuration
    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    /// Owned drivers
    pub fn devices(&self) -> &Devices<B> {
        &self.devices
    }

    /// Owned drivers, mutably
    pub fn devices_mut(&mut self) -> &mut Devices<B> {
        &mut self.devices
    }

    /// Stop the loop and hand the drivers back
    pub fn into_devices(self) -> Devices<B> {
        self.devices
    }

    fn track(&mut self) -> TrackerReading {
        let left = self.devices.light_left.read();
        let right = self.devices.light_right.read();
        let (Ok(left), Ok(right)) = (left, right) else {
            log_warn!("light sensor read failed, holding tracker");
            return self.state.last_tracker;
        };

        let reading = tracker::update(
            &mut self.state.tracker,
            &self.config.tracker,
            i32::from(left),
            i32::from(right),
        );
        write_servo(&mut self.devices.servo, reading.angle);
        self.state.last_tracker = reading;
        reading
    }

    fn sample_dust(&mut self) -> f32 {
        match self.devices.dust.sample_once(&mut self.devices.delay) {
            Ok(density) => {
                self.state.last_dust = density;
                density
            }
            Err(_) => {
                log_warn!("dust pulse failed, reusing last density");
                self.state.last_dust
            }
        }
    }

    fn refresh_pressure(&mut self) -> bool {
        let now = self.devices.clock.now();
        let calibration = self.state.calibration;
        let samples = self.config.steady_samples;
        let devices = &mut self.devices;
        self.state
            .pressure
            .refresh(now, || {
                let average = pressure::read_averaged(
                    &mut devices.load_cell,
                    &devices.clock,
                    &mut devices.delay,
                    samples,
                );
                Ok::<_, core::convert::Infallible>(calibration.pressure(average))
            })
            .is_some()
    }
}

fn write_servo<S: Servo>(servo: &mut S, angle: i32) {
    // Tracker bounds keep the angle well inside 0..=180
    let degrees = angle.clamp(0, 180) as u8;
    if servo.write_angle(degrees).is_err() {
        log_warn!("servo write failed");
    }
}

fn send<P: embedded_io::Write>(port: &mut P, message: Message<'_>) {
    if message.send(port).is_err() {
        log_warn!("serial write failed, line dropped");
    }
}
