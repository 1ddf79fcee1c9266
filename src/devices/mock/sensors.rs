//! Simulated Sense HAT sensor suite
//!
//! Values hover around a room-temperature, level, stationary board with
//! Gaussian noise; the heading drifts slowly so consecutive rows differ.
//! Faults can be injected randomly (`fault_rate`) or on demand through
//! [`SensorFaults`].

use super::noise::NoiseGenerator;
use crate::core::driver::SensorBoard;
use crate::core::types::{Orientation, Vector3};
use crate::error::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

const TEMPERATURE_C: f64 = 24.5;
const HUMIDITY_PCT: f64 = 42.0;
const PRESSURE_MBAR: f64 = 1013.25;
/// Earth field, microtesla, board level and pointing north
const MAG_FIELD_UT: Vector3 = Vector3::new(22.0, 0.0, -42.0);
/// Heading change per orientation read, degrees
const YAW_DRIFT_DEG: f64 = 0.25;

/// Shared switchboard for forcing read failures from a test or REPL
#[derive(Clone, Default)]
pub struct SensorFaults {
    failing: Arc<AtomicBool>,
    fail_next: Arc<AtomicU32>,
}

impl SensorFaults {
    /// Fail every sample until switched off
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Fail the next `count` samples
    pub fn fail_next(&self, count: u32) {
        self.fail_next.store(count, Ordering::Relaxed);
    }

    fn take(&self) -> bool {
        if self.failing.load(Ordering::Relaxed) {
            return true;
        }
        self.fail_next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok()
    }
}

pub struct MockSensorBoard {
    noise: NoiseGenerator,
    fault_rate: f64,
    faults: SensorFaults,
    yaw: f64,
}

impl MockSensorBoard {
    pub fn new(seed: u64, fault_rate: f64) -> Self {
        Self {
            noise: NoiseGenerator::new(seed),
            fault_rate: fault_rate.clamp(0.0, 1.0),
            faults: SensorFaults::default(),
            yaw: 0.0,
        }
    }

    /// Handle for injecting faults after the board is boxed
    pub fn faults(&self) -> SensorFaults {
        self.faults.clone()
    }

    /// Faults are decided on the first read of a sample so a sample fails
    /// as a whole, like a wedged bus would.
    fn bus(&mut self, sensor: &'static str) -> Result<()> {
        if self.faults.take() || self.noise.chance(self.fault_rate) {
            return Err(Error::SensorRead {
                sensor,
                source: std::io::Error::new(std::io::ErrorKind::TimedOut, "simulated bus timeout"),
            });
        }
        Ok(())
    }

    fn jitter(&mut self, v: Vector3, stddev: f64) -> Vector3 {
        Vector3::new(
            v.x + self.noise.gaussian(stddev),
            v.y + self.noise.gaussian(stddev),
            v.z + self.noise.gaussian(stddev),
        )
    }
}

impl SensorBoard for MockSensorBoard {
    fn temperature_from_humidity(&mut self) -> Result<f64> {
        self.bus("hts221")?;
        Ok(TEMPERATURE_C + 0.6 + self.noise.gaussian(0.05))
    }

    fn temperature_from_pressure(&mut self) -> Result<f64> {
        Ok(TEMPERATURE_C + self.noise.gaussian(0.05))
    }

    fn humidity(&mut self) -> Result<f64> {
        Ok((HUMIDITY_PCT + self.noise.gaussian(0.3)).clamp(0.0, 100.0))
    }

    fn pressure(&mut self) -> Result<f64> {
        Ok(PRESSURE_MBAR + self.noise.gaussian(0.02))
    }

    fn orientation_degrees(&mut self) -> Result<Orientation> {
        self.yaw = (self.yaw + YAW_DRIFT_DEG).rem_euclid(360.0);
        Ok(Orientation {
            pitch: self.noise.gaussian(0.2).rem_euclid(360.0),
            roll: self.noise.gaussian(0.2).rem_euclid(360.0),
            yaw: self.yaw,
        })
    }

    fn compass_raw(&mut self) -> Result<Vector3> {
        Ok(self.jitter(MAG_FIELD_UT, 0.4))
    }

    fn accelerometer_raw(&mut self) -> Result<Vector3> {
        Ok(self.jitter(Vector3::new(0.0, 0.0, 1.0), 0.005))
    }

    fn gyroscope_raw(&mut self) -> Result<Vector3> {
        Ok(self.jitter(Vector3::default(), 0.002))
    }
}
