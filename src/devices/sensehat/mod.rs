//! Raspberry Pi Sense HAT on Linux
//!
//! | Component | Access |
//! |-----------|--------|
//! | HTS221 humidity/temperature | i2c-dev `/dev/i2c-1` @ 0x5F |
//! | LPS25H pressure/temperature | i2c-dev `/dev/i2c-1` @ 0x5C |
//! | LSM9DS1 accel/gyro | i2c-dev `/dev/i2c-1` @ 0x6A |
//! | LSM9DS1 magnetometer | i2c-dev `/dev/i2c-1` @ 0x1C |
//! | LED matrix | `/dev/fbN` named `RPi-Sense FB` |
//! | Joystick | `/dev/input/eventN` named `Raspberry Pi Sense HAT Joystick` |
//!
//! The framebuffer is located by name through sysfs and the joystick by its
//! evdev name, so the numbering of fb and event nodes does not matter.

pub mod framebuffer;
pub mod hts221;
mod i2c;
pub mod joystick;
pub mod lps25h;
pub mod lsm9ds1;
pub mod orientation;

use super::DeviceSet;
use crate::config::Config;
use crate::core::driver::SensorBoard;
use crate::core::types::{Orientation, Vector3};
use crate::error::{Error, Result};
use crate::network::LinuxInterfaces;
use crate::power::CommandPower;
use embedded_hal::i2c::I2c;
use framebuffer::Framebuffer;
use hts221::Hts221;
use i2c::{SENSE_HAT_BUS, open_bus};
use linux_embedded_hal::I2cdev;
use lps25h::Lps25h;
use lsm9ds1::Lsm9ds1;
use std::fs;
use std::path::{Path, PathBuf};

const SYS_GRAPHICS: &str = "/sys/class/graphics";

/// The three sensor chips behind [`SensorBoard`]
pub struct SenseHatBoard<I = I2cdev> {
    humidity: Hts221<I>,
    pressure: Lps25h<I>,
    imu: Lsm9ds1<I>,
}

impl SenseHatBoard<I2cdev> {
    /// One i2c-dev handle per chip address
    pub fn open(bus: impl AsRef<Path>) -> Result<Self> {
        let bus = bus.as_ref();
        let board = Self {
            humidity: Hts221::new(open_bus(bus)?)?,
            pressure: Lps25h::new(open_bus(bus)?)?,
            imu: Lsm9ds1::new(open_bus(bus)?, open_bus(bus)?)?,
        };
        log::info!("Sense HAT sensors initialised on {}", bus.display());
        Ok(board)
    }
}

impl<I: I2c + Send> SensorBoard for SenseHatBoard<I> {
    fn temperature_from_humidity(&mut self) -> Result<f64> {
        self.humidity.temperature()
    }

    fn temperature_from_pressure(&mut self) -> Result<f64> {
        self.pressure.temperature()
    }

    fn humidity(&mut self) -> Result<f64> {
        self.humidity.humidity()
    }

    fn pressure(&mut self) -> Result<f64> {
        self.pressure.pressure()
    }

    fn orientation_degrees(&mut self) -> Result<Orientation> {
        let accel = self.imu.accelerometer()?;
        let mag = self.imu.magnetometer()?;
        Ok(orientation::orientation(accel, mag))
    }

    fn compass_raw(&mut self) -> Result<Vector3> {
        self.imu.magnetometer()
    }

    fn accelerometer_raw(&mut self) -> Result<Vector3> {
        self.imu.accelerometer()
    }

    fn gyroscope_raw(&mut self) -> Result<Vector3> {
        self.imu.gyroscope()
    }
}

/// `/dev/fbN` whose `class_dir/fbN/name` reads `wanted`
pub fn find_framebuffer(class_dir: &Path, wanted: &str, dev_dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(class_dir)
        .map_err(|e| Error::DeviceMissing(format!("{}: {}", class_dir.display(), e)))?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("fb"))
        .collect();
    names.sort();

    for name in names {
        let Ok(contents) = fs::read_to_string(class_dir.join(&name).join("name")) else {
            continue;
        };
        if contents.trim() == wanted {
            return Ok(dev_dir.join(name));
        }
    }
    Err(Error::DeviceMissing(wanted.to_string()))
}

/// Open every Sense HAT device
pub fn open(config: &Config) -> Result<DeviceSet> {
    let sensors = SenseHatBoard::open(SENSE_HAT_BUS)?;

    let fb_path = find_framebuffer(
        Path::new(SYS_GRAPHICS),
        framebuffer::FB_NAME,
        Path::new("/dev"),
    )?;
    let matrix = Framebuffer::open(&fb_path)?;
    log::info!("Sense HAT display {}", fb_path.display());

    let joystick = joystick::open()?;

    Ok(DeviceSet {
        sensors: Box::new(sensors),
        matrix: Box::new(matrix),
        joystick: Box::new(joystick),
        interfaces: Box::new(LinuxInterfaces),
        power: Box::new(CommandPower::new(config.power.shutdown_command.clone())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use i2c::test_bus::RegisterBus;
    use tempfile::TempDir;

    fn sysfs(entries: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (entry, name) in entries {
            let device = dir.path().join(entry);
            fs::create_dir_all(&device).unwrap();
            fs::write(device.join("name"), format!("{}\n", name)).unwrap();
        }
        dir
    }

    #[test]
    fn test_find_framebuffer_by_name() {
        let sys = sysfs(&[
            ("fb0", "vc4drmfb"),
            ("fb1", framebuffer::FB_NAME),
            ("fbcon", "ignored"),
        ]);
        let path =
            find_framebuffer(sys.path(), framebuffer::FB_NAME, Path::new("/dev")).unwrap();
        assert_eq!(path, PathBuf::from("/dev/fb1"));
    }

    #[test]
    fn test_missing_framebuffer() {
        let sys = sysfs(&[("fb0", "vc4drmfb")]);
        let dev = Path::new("/dev");
        let err = find_framebuffer(sys.path(), framebuffer::FB_NAME, dev).unwrap_err();
        assert!(matches!(err, Error::DeviceMissing(_)));

        let err =
            find_framebuffer(&sys.path().join("absent"), framebuffer::FB_NAME, dev).unwrap_err();
        assert!(matches!(err, Error::DeviceMissing(_)));
    }

    #[test]
    fn test_board_samples_every_chip() {
        let hts = RegisterBus::new(hts221::ADDRESS);
        let mut calib = [0u8; 16];
        calib[0x01] = 2;
        calib[0x03] = 8;
        calib[0x0A] = 1;
        calib[0x0E] = 1;
        hts.set(0x0F, &[0xBC]).set(0x30, &calib);
        let lps = RegisterBus::new(lps25h::ADDRESS);
        lps.set(0x0F, &[0xBD]).set(0x28, &[0x00, 0x54, 0x3F]);
        let ag = RegisterBus::new(lsm9ds1::AG_ADDRESS);
        ag.set(0x0F, &[0x68]).set(0x28, &[0, 0, 0, 0, 0x02, 0x10]);
        let mag = RegisterBus::new(lsm9ds1::MAG_ADDRESS);
        mag.set(0x0F, &[0x3D]).set(0x28, &[0xE8, 0x03, 0, 0, 0, 0]);

        let mut board = SenseHatBoard {
            humidity: Hts221::new(hts).unwrap(),
            pressure: Lps25h::new(lps).unwrap(),
            imu: Lsm9ds1::new(ag, mag).unwrap(),
        };
        assert_eq!(board.pressure().unwrap(), 1013.25);
        assert!((board.compass_raw().unwrap().x - 14.0).abs() < 1e-9);

        let level = board.orientation_degrees().unwrap();
        assert!(level.pitch.abs() < 0.1);
        assert!(level.roll.abs() < 0.1);
    }
}
