//! LSM9DS1 inertial module: accelerometer + gyroscope at one address,
//! magnetometer at another.

use super::i2c::{Register, axes_le};
use crate::core::types::Vector3;
use crate::error::{Error, Result};
use embedded_hal::i2c::I2c;

pub const AG_ADDRESS: u8 = 0x6A;
pub const MAG_ADDRESS: u8 = 0x1C;

const WHO_AM_I: u8 = 0x0F;
const AG_WHO_AM_I_VALUE: u8 = 0x68;
const MAG_WHO_AM_I_VALUE: u8 = 0x3D;

// Accelerometer / gyroscope registers
const CTRL_REG1_G: u8 = 0x10;
const OUT_X_L_G: u8 = 0x18;
const CTRL_REG6_XL: u8 = 0x20;
const CTRL_REG8: u8 = 0x22;
const OUT_X_L_XL: u8 = 0x28;

// Magnetometer registers
const CTRL_REG1_M: u8 = 0x20;
const CTRL_REG2_M: u8 = 0x21;
const CTRL_REG3_M: u8 = 0x22;
const CTRL_REG4_M: u8 = 0x23;
const OUT_X_L_M: u8 = 0x28;

/// Block data update with register auto-increment (IF_ADD_INC)
const AG_INIT: [(u8, u8); 3] = [
    (CTRL_REG8, 0x44),
    // 119 Hz, 500 dps
    (CTRL_REG1_G, 0x68),
    // 119 Hz, +/-8 g
    (CTRL_REG6_XL, 0x78),
];

const MAG_INIT: [(u8, u8); 4] = [
    // Ultra-high performance X/Y, 80 Hz
    (CTRL_REG1_M, 0x7C),
    // +/-4 gauss
    (CTRL_REG2_M, 0x00),
    // Continuous conversion
    (CTRL_REG3_M, 0x00),
    // Ultra-high performance Z
    (CTRL_REG4_M, 0x0C),
];

/// 17.5 mdps/LSB at 500 dps
const GYRO_DPS_PER_LSB: f64 = 0.0175;
/// 0.244 mg/LSB at +/-8 g
const ACCEL_G_PER_LSB: f64 = 0.000244;
/// 0.14 mgauss/LSB at +/-4 gauss; 1 gauss = 100 uT
const MAG_UT_PER_LSB: f64 = 0.014;

pub fn scale(raw: [i16; 3], factor: f64) -> Vector3 {
    Vector3::new(
        raw[0] as f64 * factor,
        raw[1] as f64 * factor,
        raw[2] as f64 * factor,
    )
}

pub struct Lsm9ds1<I> {
    ag: Register<I>,
    mag: Register<I>,
}

impl<I: I2c> Lsm9ds1<I> {
    /// `ag_bus` and `mag_bus` may be two handles on the same i2c bus
    pub fn new(ag_bus: I, mag_bus: I) -> Result<Self> {
        // Auto-increment on the AG side is a CTRL_REG8 setting, not an address bit
        let mut ag = Register::new(ag_bus, AG_ADDRESS, 0x00);
        ag.check_identity("lsm9ds1", WHO_AM_I, AG_WHO_AM_I_VALUE)?;
        ag.apply(&AG_INIT).map_err(|e| read_error("lsm9ds1", e))?;

        let mut mag = Register::new(mag_bus, MAG_ADDRESS, 0x80);
        mag.check_identity("lsm9ds1-mag", WHO_AM_I, MAG_WHO_AM_I_VALUE)?;
        mag.apply(&MAG_INIT)
            .map_err(|e| read_error("lsm9ds1-mag", e))?;

        Ok(Self { ag, mag })
    }

    /// g
    pub fn accelerometer(&mut self) -> Result<Vector3> {
        let raw = read_axes(&mut self.ag, OUT_X_L_XL, "accelerometer")?;
        Ok(scale(raw, ACCEL_G_PER_LSB))
    }

    /// rad/s
    pub fn gyroscope(&mut self) -> Result<Vector3> {
        let raw = read_axes(&mut self.ag, OUT_X_L_G, "gyroscope")?;
        Ok(scale(raw, GYRO_DPS_PER_LSB.to_radians()))
    }

    /// uT
    pub fn magnetometer(&mut self) -> Result<Vector3> {
        let raw = read_axes(&mut self.mag, OUT_X_L_M, "magnetometer")?;
        Ok(scale(raw, MAG_UT_PER_LSB))
    }
}

fn read_axes<I: I2c>(dev: &mut Register<I>, reg: u8, sensor: &'static str) -> Result<[i16; 3]> {
    let mut buf = [0u8; 6];
    dev.read_bytes(reg, &mut buf)
        .map_err(|e| read_error(sensor, e))?;
    Ok(axes_le(&buf))
}

fn read_error(sensor: &'static str, source: std::io::Error) -> Error {
    Error::SensorRead { sensor, source }
}
