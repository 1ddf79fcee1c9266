//! Configuration for SenseLogger
//!
//! Loads configuration from a TOML file. Every field has a default, so an
//! empty file (or no file at all) yields a working setup for a Sense HAT.
//!
//! ```toml
//! [recording]
//! prefix = "SenseLog"
//! output_dir = "Finished"
//!
//! [device]
//! type = "sensehat"   # or "mock"
//!
//! [logging]
//! level = "info"
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config path probed when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "sense-logger.toml";

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub power: PowerConfig,
}

/// Output file naming and placement
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordingConfig {
    /// File name prefix: `<prefix>-<YYYYMMDD_HHMMSS>.csv`
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Completed-jobs directory that finished files are moved into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_prefix() -> String {
    "SenseLog".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("Finished")
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            output_dir: default_output_dir(),
        }
    }
}

/// Hardware backend selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Backend: `sensehat` (real hardware) or `mock` (simulation)
    #[serde(rename = "type", default = "default_device_type")]
    pub device_type: String,

    /// Mock noise seed (0 = random each run)
    #[serde(default)]
    pub seed: u64,

    /// Mock probability of a sensor read fault per sample (0.0-1.0)
    #[serde(default)]
    pub fault_rate: f64,
}

fn default_device_type() -> String {
    "sensehat".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_type: default_device_type(),
            seed: 0,
            fault_rate: 0.0,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides it
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

/// OS power control
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PowerConfig {
    /// Program and arguments run on confirmed shutdown
    #[serde(default = "default_shutdown_command")]
    pub shutdown_command: Vec<String>,
}

fn default_shutdown_command() -> Vec<String> {
    ["sudo", "shutdown", "-h", "now"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            shutdown_command: default_shutdown_command(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load `path` if given, else the default path if it exists, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.recording.prefix, "SenseLog");
        assert_eq!(config.recording.output_dir, PathBuf::from("Finished"));
        assert_eq!(config.device.device_type, "sensehat");
        assert_eq!(config.logging.level, "info");
        assert_eq!(
            config.power.shutdown_command,
            vec!["sudo", "shutdown", "-h", "now"]
        );
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.recording.prefix, "SenseLog");
        assert_eq!(config.device.fault_rate, 0.0);
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[recording]
prefix = "Drone"
output_dir = "/var/lib/sense/done"

[device]
type = "mock"
seed = 42
fault_rate = 0.1

[logging]
level = "debug"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.recording.prefix, "Drone");
        assert_eq!(
            config.recording.output_dir,
            PathBuf::from("/var/lib/sense/done")
        );
        assert_eq!(config.device.device_type, "mock");
        assert_eq!(config.device.seed, 42);
        assert_eq!(config.logging.level, "debug");
        // Untouched section keeps its default
        assert_eq!(config.power.shutdown_command.len(), 4);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[recording\nprefix = ").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logger.toml");
        fs::write(&path, "[recording]\nprefix = \"Cliff\"\n").unwrap();
        let config = Config::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.recording.prefix, "Cliff");
        assert_eq!(config.recording.output_dir, PathBuf::from("Finished"));
    }
}
