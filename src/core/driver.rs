//! Hardware boundary traits
//!
//! Everything the logger touches outside its own process goes through one of
//! these traits, so the state machine runs unchanged against the Sense HAT or
//! the mock backend.

use crate::core::types::{Frame, InputEvent, MATRIX_PIXELS, Orientation, Rgb, Vector3};
use crate::error::Result;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Onboard environmental and inertial sensors
///
/// Units follow the Sense HAT conventions: degrees Celsius, percent relative
/// humidity, millibars, degrees for orientation, microtesla for the
/// magnetometer, g for the accelerometer and radians/second for the gyroscope.
pub trait SensorBoard: Send {
    fn temperature_from_humidity(&mut self) -> Result<f64>;

    fn temperature_from_pressure(&mut self) -> Result<f64>;

    fn humidity(&mut self) -> Result<f64>;

    fn pressure(&mut self) -> Result<f64>;

    fn orientation_degrees(&mut self) -> Result<Orientation>;

    fn compass_raw(&mut self) -> Result<Vector3>;

    fn accelerometer_raw(&mut self) -> Result<Vector3>;

    fn gyroscope_raw(&mut self) -> Result<Vector3>;
}

/// 8x8 RGB LED matrix
pub trait LedMatrix: Send {
    /// Replace all 64 pixels
    fn set_pixels(&mut self, frame: &Frame) -> Result<()>;

    /// Switch between low-light and full-brightness gamma
    fn set_low_light(&mut self, enabled: bool) -> Result<()>;

    /// Turn every pixel off
    fn clear(&mut self) -> Result<()> {
        self.set_pixels(&[Rgb::BLACK; MATRIX_PIXELS])
    }
}

/// Directional joystick event queue
pub trait Joystick: Send {
    /// Block up to `timeout` for the next event. `Ok(None)` on timeout.
    fn next_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>>;

    /// Take an already queued event without blocking
    fn try_next_event(&mut self) -> Result<Option<InputEvent>>;
}

/// Per-interface IPv4 lookup
pub trait InterfaceQuery: Send {
    fn ipv4_address(&self, interface: &str) -> Result<Ipv4Addr>;
}

/// Operating system power control
pub trait PowerControl: Send {
    /// Halt the machine
    fn shutdown(&mut self) -> Result<()>;
}
