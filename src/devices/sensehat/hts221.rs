//! HTS221 relative humidity and temperature sensor
//!
//! The chip reports raw ADC counts; factory calibration points stored in
//! registers 0x30..0x3F turn them into %RH and degrees Celsius by linear
//! interpolation.

use super::i2c::{Register, i16_le};
use crate::error::{Error, Result};
use embedded_hal::i2c::I2c;

pub const ADDRESS: u8 = 0x5F;

const WHO_AM_I: u8 = 0x0F;
const WHO_AM_I_VALUE: u8 = 0xBC;
const AV_CONF: u8 = 0x10;
const CTRL_REG1: u8 = 0x20;
const HUMIDITY_OUT_L: u8 = 0x28;
const TEMP_OUT_L: u8 = 0x2A;
const CALIB_START: u8 = 0x30;

/// Power on, block data update, 12.5 Hz
const CTRL_REG1_VALUE: u8 = 0x87;
/// 32 humidity / 16 temperature samples averaged
const AV_CONF_VALUE: u8 = 0x1B;

const NAME: &str = "hts221";

/// Two-point linear calibration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    h0_rh: f64,
    h1_rh: f64,
    h0_out: i16,
    h1_out: i16,
    t0_deg_c: f64,
    t1_deg_c: f64,
    t0_out: i16,
    t1_out: i16,
}

impl Calibration {
    /// Decode the 16 calibration bytes read from 0x30
    pub fn from_registers(r: &[u8; 16]) -> Result<Self> {
        let t_msb = r[0x05];
        let t0_x8 = (((t_msb & 0x03) as u16) << 8) | r[0x02] as u16;
        let t1_x8 = (((t_msb & 0x0C) as u16) << 6) | r[0x03] as u16;

        let cal = Self {
            h0_rh: r[0x00] as f64 / 2.0,
            h1_rh: r[0x01] as f64 / 2.0,
            h0_out: i16_le(r[0x06], r[0x07]),
            h1_out: i16_le(r[0x0A], r[0x0B]),
            t0_deg_c: t0_x8 as f64 / 8.0,
            t1_deg_c: t1_x8 as f64 / 8.0,
            t0_out: i16_le(r[0x0C], r[0x0D]),
            t1_out: i16_le(r[0x0E], r[0x0F]),
        };

        if cal.h0_out == cal.h1_out || cal.t0_out == cal.t1_out {
            return Err(Error::SensorRead {
                sensor: NAME,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "degenerate calibration",
                ),
            });
        }
        Ok(cal)
    }

    pub fn humidity(&self, raw: i16) -> f64 {
        let slope = (self.h1_rh - self.h0_rh) / (self.h1_out as f64 - self.h0_out as f64);
        (self.h0_rh + (raw as f64 - self.h0_out as f64) * slope).clamp(0.0, 100.0)
    }

    pub fn temperature(&self, raw: i16) -> f64 {
        let slope = (self.t1_deg_c - self.t0_deg_c) / (self.t1_out as f64 - self.t0_out as f64);
        self.t0_deg_c + (raw as f64 - self.t0_out as f64) * slope
    }
}

pub struct Hts221<I> {
    dev: Register<I>,
    calibration: Calibration,
}

impl<I: I2c> Hts221<I> {
    /// Check identity, power on and read the factory calibration
    pub fn new(i2c: I) -> Result<Self> {
        let mut dev = Register::new(i2c, ADDRESS, 0x80);
        dev.check_identity(NAME, WHO_AM_I, WHO_AM_I_VALUE)?;
        dev.apply(&[(CTRL_REG1, CTRL_REG1_VALUE), (AV_CONF, AV_CONF_VALUE)])
            .map_err(read_error)?;

        let mut regs = [0u8; 16];
        dev.read_bytes(CALIB_START, &mut regs).map_err(read_error)?;
        let calibration = Calibration::from_registers(&regs)?;
        log::debug!("HTS221 calibration: {:?}", calibration);

        Ok(Self { dev, calibration })
    }

    pub fn humidity(&mut self) -> Result<f64> {
        let raw = self.read_i16(HUMIDITY_OUT_L)?;
        Ok(self.calibration.humidity(raw))
    }

    pub fn temperature(&mut self) -> Result<f64> {
        let raw = self.read_i16(TEMP_OUT_L)?;
        Ok(self.calibration.temperature(raw))
    }

    fn read_i16(&mut self, reg: u8) -> Result<i16> {
        let mut buf = [0u8; 2];
        self.dev.read_bytes(reg, &mut buf).map_err(read_error)?;
        Ok(i16_le(buf[0], buf[1]))
    }
}

fn read_error(source: std::io::Error) -> Error {
    Error::SensorRead {
        sensor: NAME,
        source,
    }
}
