//! Register access for the Sense HAT chips over `embedded_hal::i2c::I2c`

use crate::error::{Error, Result};
use embedded_hal::i2c::I2c;
use linux_embedded_hal::I2cdev;
use std::path::Path;

/// Bus the Sense HAT sits on
pub const SENSE_HAT_BUS: &str = "/dev/i2c-1";

/// Open the Linux i2c-dev node. Each chip driver gets its own handle.
pub fn open_bus(bus: &Path) -> Result<I2cdev> {
    I2cdev::new(bus).map_err(|e| Error::DeviceMissing(format!("{}: {}", bus.display(), e)))
}

/// One chip at a fixed address
pub struct Register<I> {
    i2c: I,
    address: u8,
    /// Register address bit that enables auto-increment on multi-byte reads
    auto_increment: u8,
}

impl<I: I2c> Register<I> {
    pub fn new(i2c: I, address: u8, auto_increment: u8) -> Self {
        Self {
            i2c,
            address,
            auto_increment,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn read_reg(&mut self, reg: u8) -> std::io::Result<u8> {
        let mut buf = [0u8];
        self.read_bytes(reg, &mut buf)?;
        Ok(buf[0])
    }

    pub fn write_reg(&mut self, reg: u8, value: u8) -> std::io::Result<()> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(bus_error)
    }

    /// Consecutive registers starting at `start`
    pub fn read_bytes(&mut self, start: u8, buf: &mut [u8]) -> std::io::Result<()> {
        let reg = if buf.len() > 1 {
            start | self.auto_increment
        } else {
            start
        };
        self.i2c
            .write_read(self.address, &[reg], buf)
            .map_err(bus_error)
    }

    /// Write a `(register, value)` sequence in order
    pub fn apply(&mut self, config: &[(u8, u8)]) -> std::io::Result<()> {
        for &(reg, value) in config {
            log::debug!(
                "i2c {:#04x}: write_reg {:#04x} = {:#04x}",
                self.address,
                reg,
                value
            );
            self.write_reg(reg, value)?;
        }
        Ok(())
    }

    /// Fail unless WHO_AM_I at `reg` reads `expected`
    pub fn check_identity(&mut self, device: &'static str, reg: u8, expected: u8) -> Result<()> {
        let actual = self
            .read_reg(reg)
            .map_err(|source| Error::SensorRead {
                sensor: device,
                source,
            })?;
        if actual != expected {
            return Err(Error::WrongDevice {
                device,
                expected,
                actual,
            });
        }
        log::debug!("{} found at {:#04x}", device, self.address);
        Ok(())
    }
}

fn bus_error<E: embedded_hal::i2c::Error>(e: E) -> std::io::Error {
    std::io::Error::other(format!("i2c {:?}: {:?}", e.kind(), e))
}

/// Little-endian signed 16-bit from a register pair
#[inline]
pub fn i16_le(lo: u8, hi: u8) -> i16 {
    i16::from_le_bytes([lo, hi])
}

/// Three little-endian i16 axes from a 6-byte block
pub fn axes_le(buf: &[u8; 6]) -> [i16; 3] {
    [
        i16_le(buf[0], buf[1]),
        i16_le(buf[2], buf[3]),
        i16_le(buf[4], buf[5]),
    ]
}


#[cfg(test)]
mod tests {
    use super::test_bus::RegisterBus;
    use super::*;

    #[test]
    fn test_axes_le() {
        let buf = [0x34, 0x12, 0xFF, 0xFF, 0x00, 0x80];
        assert_eq!(axes_le(&buf), [0x1234, -1, i16::MIN]);
    }

    #[test]
    fn test_missing_bus() {
        let err = open_bus(Path::new("/dev/no-such-i2c-bus")).err().unwrap();
        assert!(matches!(err, Error::DeviceMissing(_)));
    }

    #[test]
    fn test_block_read_and_config() {
        let bus = RegisterBus::new(0x5F);
        bus.set(0x0F, &[0xBC]).set(0x28, &[1, 2, 3]);
        let mut dev = Register::new(bus.clone(), 0x5F, 0x80);

        dev.check_identity("hts221", 0x0F, 0xBC).unwrap();
        let mut buf = [0u8; 3];
        dev.read_bytes(0x28, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);

        dev.apply(&[(0x20, 0x87), (0x10, 0x1B)]).unwrap();
        assert_eq!(bus.writes(), vec![(0x20, 0x87), (0x10, 0x1B)]);
    }

    #[test]
    fn test_wrong_identity() {
        let bus = RegisterBus::new(0x5C);
        bus.set(0x0F, &[0x42]);
        let mut dev = Register::new(bus, 0x5C, 0x80);
        assert!(matches!(
            dev.check_identity("lps25h", 0x0F, 0xBD),
            Err(Error::WrongDevice {
                expected: 0xBD,
                actual: 0x42,
                ..
            })
        ));
    }

    #[test]
    fn test_no_ack_is_read_error() {
        let bus = RegisterBus::new(0x6A);
        let mut dev = Register::new(bus, 0x1C, 0x80);
        assert!(matches!(
            dev.check_identity("lsm9ds1-mag", 0x0F, 0x3D),
            Err(Error::SensorRead { .. })
        ));
    }
}
