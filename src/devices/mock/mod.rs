//! Mock Sense HAT for hardware-free runs
//!
//! | Component | Simulation |
//! |-----------|------------|
//! | Sensors | Set points plus seeded Gaussian noise, optional faults |
//! | LED matrix | In-memory frame history ([`MatrixProbe`]) |
//! | Joystick | Channel; the binary feeds it from stdin lines |
//! | Interfaces | Static table ([`StaticInterfaces`]) |
//! | Power | Counter, never touches the host ([`MockPower`]) |
//!
//! Example configuration:
//!
//! ```toml
//! [device]
//! type = "mock"
//! seed = 42          # 0 = random each run
//! fault_rate = 0.05  # chance a sample fails
//! ```
//!
//! Stdin accepts one event per line, `<direction> [pressed|held|released]`,
//! e.g. `left`, `down held`, `up`.

mod matrix;
mod noise;
mod sensors;

pub use matrix::{MatrixProbe, MatrixRecord, MockMatrix};
pub use sensors::{MockSensorBoard, SensorFaults};

use super::DeviceSet;
use crate::config::DeviceConfig;
use crate::core::driver::{InterfaceQuery, PowerControl};
use crate::core::types::InputEvent;
use crate::error::{Error, Result};
use crate::input::ChannelJoystick;
use crossbeam_channel::Sender;
use std::collections::HashMap;
use std::io::BufRead;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// Handles for steering and observing a mock [`DeviceSet`]
pub struct MockHandles {
    /// Push joystick events
    pub joystick: Sender<InputEvent>,
    pub matrix: MatrixProbe,
    pub faults: SensorFaults,
    pub power: PowerProbe,
}

/// Build a mock device set, returning the handles that drive it.
pub fn create(config: &DeviceConfig, interfaces: StaticInterfaces) -> (DeviceSet, MockHandles) {
    let board = MockSensorBoard::new(config.seed, config.fault_rate);
    let faults = board.faults();
    let matrix = MockMatrix::new();
    let matrix_probe = matrix.probe();
    let (tx, joystick) = ChannelJoystick::channel();
    let power = MockPower::new();
    let power_probe = power.probe();

    log::info!(
        "Mock Sense HAT: seed={}, fault_rate={}",
        config.seed,
        config.fault_rate
    );

    let devices = DeviceSet {
        sensors: Box::new(board),
        matrix: Box::new(matrix),
        joystick: Box::new(joystick),
        interfaces: Box::new(interfaces),
        power: Box::new(power),
    };
    let handles = MockHandles {
        joystick: tx,
        matrix: matrix_probe,
        faults,
        power: power_probe,
    };
    (devices, handles)
}

/// Mock device set whose joystick reads scripted events from stdin
pub fn open(config: &DeviceConfig) -> Result<DeviceSet> {
    let interfaces = StaticInterfaces::new().with_address("wlan0", Ipv4Addr::new(192, 168, 4, 1));
    let (devices, handles) = create(config, interfaces);
    spawn_stdin_joystick(handles.joystick)?;
    Ok(devices)
}

fn spawn_stdin_joystick(tx: Sender<InputEvent>) -> Result<()> {
    thread::Builder::new()
        .name("mock-joystick".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                match line.parse::<InputEvent>() {
                    Ok(event) => {
                        log::debug!("Scripted event: {}", event);
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => log::warn!("Ignoring stdin line '{}': {}", line, e),
                }
            }
            // Sender dropped here; the loop sees a disconnected joystick
            log::info!("Mock joystick input closed");
        })?;
    Ok(())
}

/// Interface table. Absent names do not exist; `None` means the interface
/// exists without an IPv4 address.
#[derive(Debug, Clone, Default)]
pub struct StaticInterfaces {
    table: HashMap<String, Option<Ipv4Addr>>,
}

impl StaticInterfaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(mut self, name: &str, addr: Ipv4Addr) -> Self {
        self.table.insert(name.to_string(), Some(addr));
        self
    }

    pub fn without_address(mut self, name: &str) -> Self {
        self.table.insert(name.to_string(), None);
        self
    }
}

impl InterfaceQuery for StaticInterfaces {
    fn ipv4_address(&self, interface: &str) -> Result<Ipv4Addr> {
        match self.table.get(interface) {
            Some(Some(addr)) => Ok(*addr),
            Some(None) => Err(Error::AddressUnavailable(interface.to_string())),
            None => Err(Error::InterfaceNotFound(interface.to_string())),
        }
    }
}

/// Observer for [`MockPower`]
#[derive(Clone, Default)]
pub struct PowerProbe {
    calls: Arc<AtomicUsize>,
    /// Directory listing taken when shutdown was invoked
    snapshot: Arc<Mutex<Option<Vec<PathBuf>>>>,
}

impl PowerProbe {
    pub fn shutdown_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Files present in the watched directory at shutdown time, sorted
    pub fn files_at_shutdown(&self) -> Option<Vec<PathBuf>> {
        self.snapshot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Power control that only records the request
pub struct MockPower {
    probe: PowerProbe,
    watch: Option<PathBuf>,
}

impl MockPower {
    pub fn new() -> Self {
        Self {
            probe: PowerProbe::default(),
            watch: None,
        }
    }

    /// List `dir` at shutdown time so callers can check what was on disk
    pub fn watching(mut self, dir: impl Into<PathBuf>) -> Self {
        self.watch = Some(dir.into());
        self
    }

    pub fn probe(&self) -> PowerProbe {
        self.probe.clone()
    }
}

impl Default for MockPower {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerControl for MockPower {
    fn shutdown(&mut self) -> Result<()> {
        log::info!("Mock shutdown requested; host left running");
        if let Some(dir) = &self.watch {
            let mut files = std::fs::read_dir(dir)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<Vec<_>>>()?;
            files.sort();
            *self.probe.snapshot.lock().unwrap_or_else(|e| e.into_inner()) = Some(files);
        }
        self.probe.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
