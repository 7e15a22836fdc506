//! Pulse-to-stress pipeline of a wearable stress monitor.
//!
//! A raw analog pulse reading is turned into beats, NN intervals, BPM,
//! SDNN/RMSSD and a [`StressLevel`](stress::StressLevel), which drives two
//! vibration motors, the status screen and a serial telemetry line. All of the
//! signal processing is hardware independent; the ESP32 bring-up lives in
//! [`board`] and is only built for `target_os = "espidf"`.

pub mod actuator;
pub mod bpm;
pub mod circ;
pub mod clock;
pub mod config;
pub mod control;
pub mod display;
pub mod flatline;
pub mod hrv;
pub mod monitor;
pub mod pulse;
pub mod sensor;
pub mod stress;
pub mod telemetry;
pub mod trace;
pub mod waveform;

#[cfg(target_os = "espidf")]
pub mod board;

pub use config::MonitorConfig;
pub use monitor::{Evaluation, Monitor};
pub use stress::StressLevel;
