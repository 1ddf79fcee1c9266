//! Sense HAT LED matrix through its framebuffer device

use crate::core::driver::LedMatrix;
use crate::core::types::{Frame, MATRIX_PIXELS};
use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;

/// Value of `/sys/class/graphics/fbN/name` for the matrix
pub const FB_NAME: &str = "RPi-Sense FB";

/// `SENSEFB_FBIORESET_GAMMA`: 0 = default table, 1 = low light
const SENSEFB_FBIORESET_GAMMA: u64 = 0xF102;
const GAMMA_DEFAULT: libc::c_ulong = 0;
const GAMMA_LOW_LIGHT: libc::c_ulong = 1;

/// Pack a frame as native-endian RGB565, row-major
pub fn encode_frame(frame: &Frame) -> [u8; MATRIX_PIXELS * 2] {
    let mut buf = [0u8; MATRIX_PIXELS * 2];
    for (chunk, pixel) in buf.chunks_exact_mut(2).zip(frame) {
        chunk.copy_from_slice(&pixel.to_rgb565().to_ne_bytes());
    }
    buf
}

pub struct Framebuffer {
    file: File,
}

impl Framebuffer {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| Error::DeviceMissing(format!("{}: {}", path.display(), e)))?;
        log::debug!("LED matrix at {}", path.display());
        Ok(Self { file })
    }
}

impl LedMatrix for Framebuffer {
    fn set_pixels(&mut self, frame: &Frame) -> Result<()> {
        self.file
            .write_all_at(&encode_frame(frame), 0)
            .map_err(|e| Error::Display(e.to_string()))
    }

    fn set_low_light(&mut self, enabled: bool) -> Result<()> {
        let table = if enabled {
            GAMMA_LOW_LIGHT
        } else {
            GAMMA_DEFAULT
        };
        // SAFETY: fd is the open framebuffer; the request takes its
        // argument by value.
        let ret = unsafe { libc::ioctl(self.file.as_raw_fd(), SENSEFB_FBIORESET_GAMMA as _, table) };
        if ret < 0 {
            return Err(Error::Display(format!(
                "gamma ioctl: {}",
                std::io::Error::last_os_error()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Rgb;
    use tempfile::NamedTempFile;

    #[test]
    fn test_encode_frame() {
        let mut frame = [Rgb::BLACK; MATRIX_PIXELS];
        frame[0] = Rgb::new(255, 0, 0);
        frame[63] = Rgb::new(0, 0, 255);

        let buf = encode_frame(&frame);
        assert_eq!(u16::from_ne_bytes([buf[0], buf[1]]), 0xF800);
        assert_eq!(u16::from_ne_bytes([buf[126], buf[127]]), 0x001F);
        assert!(buf[2..126].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_writes_at_start_of_file() {
        let tmp = NamedTempFile::new().unwrap();
        let mut fb = Framebuffer::open(tmp.path()).unwrap();

        fb.set_pixels(&[Rgb::new(255, 255, 255); MATRIX_PIXELS]).unwrap();
        fb.clear().unwrap();

        let bytes = std::fs::read(tmp.path()).unwrap();
        assert_eq!(bytes.len(), 128);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_gamma_on_plain_file_fails() {
        let tmp = NamedTempFile::new().unwrap();
        let mut fb = Framebuffer::open(tmp.path()).unwrap();
        assert!(matches!(fb.set_low_light(true), Err(Error::Display(_))));
    }
}
