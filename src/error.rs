//! Error types for SenseLogger

use std::path::PathBuf;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// SenseLogger error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown device backend in configuration
    #[error("Unknown device type: {0}")]
    UnknownDevice(String),

    /// Hardware device could not be located
    #[error("Device not present: {0}")]
    DeviceMissing(String),

    /// Hardware answered with an unexpected identity
    #[error("Unexpected {device} identity: expected {expected:#04x}, got {actual:#04x}")]
    WrongDevice {
        /// Chip name
        device: &'static str,
        /// Expected WHO_AM_I value
        expected: u8,
        /// Value read from the chip
        actual: u8,
    },

    /// A sensor read failed on the bus
    #[error("Sensor read failed ({sensor}): {source}")]
    SensorRead {
        /// Sub-sensor that failed
        sensor: &'static str,
        /// Underlying bus error
        #[source]
        source: std::io::Error,
    },

    /// Completed-jobs directory is unusable
    #[error("Output directory {path:?} unusable: {reason}")]
    OutputDirectory {
        /// Directory path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A recording session is already open
    #[error("Recording session already active")]
    SessionActive,

    /// No recording session is open
    #[error("No active recording session")]
    NoActiveSession,

    /// Row could not be parsed back into a sample
    #[error("Malformed sample row: {0}")]
    MalformedRow(String),

    /// Named network interface does not exist
    #[error("Network interface not found: {0}")]
    InterfaceNotFound(String),

    /// Network interface exists but has no IPv4 binding
    #[error("No IPv4 address on interface: {0}")]
    AddressUnavailable(String),

    /// Joystick event source went away
    #[error("Joystick input disconnected")]
    InputDisconnected,

    /// LED matrix write failed
    #[error("Display error: {0}")]
    Display(String),

    /// OS shutdown command failed
    #[error("Shutdown failed: {0}")]
    Shutdown(String),

    /// Signal handler could not be installed
    #[error("Signal handler error: {0}")]
    Signal(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
