//! Device implementations

pub mod mock;
pub mod sensehat;

use crate::config::Config;
use crate::core::driver::{InterfaceQuery, Joystick, LedMatrix, PowerControl, SensorBoard};
use crate::error::{Error, Result};

/// Everything the logger needs from the outside world
pub struct DeviceSet {
    pub sensors: Box<dyn SensorBoard>,
    pub matrix: Box<dyn LedMatrix>,
    pub joystick: Box<dyn Joystick>,
    pub interfaces: Box<dyn InterfaceQuery>,
    pub power: Box<dyn PowerControl>,
}

/// Create the device set based on configuration
pub fn create_device(config: &Config) -> Result<DeviceSet> {
    match config.device.device_type.as_str() {
        "sensehat" => sensehat::open(config),
        "mock" => mock::open(&config.device),
        _ => Err(Error::UnknownDevice(config.device.device_type.clone())),
    }
}
