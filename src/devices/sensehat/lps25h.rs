//! LPS25H barometric pressure and temperature sensor

use super::i2c::{Register, i16_le};
use crate::error::{Error, Result};
use embedded_hal::i2c::I2c;

pub const ADDRESS: u8 = 0x5C;

const WHO_AM_I: u8 = 0x0F;
const WHO_AM_I_VALUE: u8 = 0xBD;
const RES_CONF: u8 = 0x10;
const CTRL_REG1: u8 = 0x20;
const CTRL_REG2: u8 = 0x21;
const FIFO_CTRL: u8 = 0x2E;
const PRESS_OUT_XL: u8 = 0x28;
const TEMP_OUT_L: u8 = 0x2B;

const NAME: &str = "lps25h";

/// Power on, 25 Hz, block data update; FIFO mean of 32 samples
const INIT: [(u8, u8); 4] = [
    (CTRL_REG1, 0xC4),
    (RES_CONF, 0x05),
    (FIFO_CTRL, 0xC0),
    (CTRL_REG2, 0x40),
];

/// 24-bit two's complement, LSB = 1/4096 hPa (= mbar)
pub fn pressure_from_raw(raw: [u8; 3]) -> f64 {
    // Sign-extend through the top byte of an i32
    let value = i32::from_le_bytes([0, raw[0], raw[1], raw[2]]) >> 8;
    value as f64 / 4096.0
}

pub fn temperature_from_raw(raw: i16) -> f64 {
    42.5 + raw as f64 / 480.0
}

pub struct Lps25h<I> {
    dev: Register<I>,
}

impl<I: I2c> Lps25h<I> {
    pub fn new(i2c: I) -> Result<Self> {
        let mut dev = Register::new(i2c, ADDRESS, 0x80);
        dev.check_identity(NAME, WHO_AM_I, WHO_AM_I_VALUE)?;
        dev.apply(&INIT).map_err(read_error)?;
        Ok(Self { dev })
    }

    /// Millibars
    pub fn pressure(&mut self) -> Result<f64> {
        let mut buf = [0u8; 3];
        self.dev
            .read_bytes(PRESS_OUT_XL, &mut buf)
            .map_err(read_error)?;
        Ok(pressure_from_raw(buf))
    }

    pub fn temperature(&mut self) -> Result<f64> {
        let mut buf = [0u8; 2];
        self.dev.read_bytes(TEMP_OUT_L, &mut buf).map_err(read_error)?;
        Ok(temperature_from_raw(i16_le(buf[0], buf[1])))
    }
}

fn read_error(source: std::io::Error) -> Error {
    Error::SensorRead {
        sensor: NAME,
        source,
    }
}
