//! SenseLogger - joystick-driven Sense HAT telemetry logger
//!
//! Samples the Sense HAT environmental and inertial sensors into timestamped
//! CSV files. The joystick and the 8x8 LED matrix are the whole user
//! interface:
//!
//! | Input | Action |
//! |-------|--------|
//! | LEFT | Start recording |
//! | RIGHT | Stop recording, move the file to the completed-jobs directory |
//! | MIDDLE | Scroll the `wlan0` IPv4 address |
//! | UP | Toggle low-light mode |
//! | DOWN (held) | Shutdown, confirmed with UP |
//!
//! The `mock` device backend runs the same loop without hardware.

pub mod app;
pub mod config;
pub mod core;
pub mod devices;
pub mod display;
pub mod error;
pub mod input;
pub mod network;
pub mod power;
pub mod recorder;
pub mod sensor;

// Re-export commonly used types
pub use app::{ExitReason, LoggerOptions, LoggerState, SenseLogger, Timing};
pub use config::Config;
pub use crate::core::types::{InputEvent, SampleRecord};
pub use error::{Error, Result};
