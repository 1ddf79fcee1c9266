//! Sensor sampling
//!
//! [`SensorReader`] performs one all-or-nothing read of the eight sub-sensors
//! and packs the result into a [`SampleRecord`]. A failure of any read fails
//! the whole sample; no partial record is ever produced.

use crate::core::driver::SensorBoard;
use crate::core::types::SampleRecord;
use crate::error::Result;
use chrono::{Local, SubsecRound};

pub struct SensorReader {
    board: Box<dyn SensorBoard>,
}

impl SensorReader {
    pub fn new(board: Box<dyn SensorBoard>) -> Self {
        Self { board }
    }

    /// Read every sub-sensor once and stamp the result with local time.
    pub fn sample(&mut self) -> Result<SampleRecord> {
        let temp_h = self.board.temperature_from_humidity()?;
        let temp_p = self.board.temperature_from_pressure()?;
        let humidity = self.board.humidity()?;
        let pressure = self.board.pressure()?;
        let orientation = self.board.orientation_degrees()?;
        let mag = self.board.compass_raw()?;
        // Not a file column, but part of the transaction
        let accel = self.board.accelerometer_raw()?;
        let gyro = self.board.gyroscope_raw()?;

        log::trace!(
            "accel=({:.3}, {:.3}, {:.3}) g",
            accel.x,
            accel.y,
            accel.z
        );

        // Rows carry microsecond precision, so the record does too
        let timestamp = Local::now().naive_local().trunc_subsecs(6);

        Ok(SampleRecord::new(
            temp_h,
            temp_p,
            humidity,
            pressure,
            orientation,
            mag,
            gyro,
            timestamp,
        ))
    }
}
