//! In-memory LED matrix

use crate::core::driver::LedMatrix;
use crate::core::types::{Frame, MATRIX_PIXELS, Rgb};
use crate::error::{Error, Result};
use std::sync::{Arc, Mutex, MutexGuard};

/// Everything the mock matrix has been asked to show
#[derive(Debug, Clone)]
pub struct MatrixRecord {
    /// Frames written, oldest first
    pub frames: Vec<Frame>,
    /// Current pixels
    pub pixels: Frame,
    /// Current gamma mode
    pub low_light: bool,
    /// Number of gamma changes
    pub gamma_writes: usize,
}

impl Default for MatrixRecord {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            pixels: [Rgb::BLACK; MATRIX_PIXELS],
            low_light: false,
            gamma_writes: 0,
        }
    }
}

/// Cloneable view of a [`MockMatrix`] kept by tests after the matrix is boxed
#[derive(Clone, Default)]
pub struct MatrixProbe {
    record: Arc<Mutex<MatrixRecord>>,
}

impl MatrixProbe {
    fn lock(&self) -> MutexGuard<'_, MatrixRecord> {
        // A panicking writer can only be a test thread; keep the data
        self.record.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> MatrixRecord {
        self.lock().clone()
    }

    pub fn pixels(&self) -> Frame {
        self.lock().pixels
    }

    pub fn low_light(&self) -> bool {
        self.lock().low_light
    }

    /// True if `frame` was shown at any point
    pub fn has_shown(&self, frame: &Frame) -> bool {
        self.lock().frames.iter().any(|f| f == frame)
    }

    pub fn is_blank(&self) -> bool {
        self.pixels() == [Rgb::BLACK; MATRIX_PIXELS]
    }
}

pub struct MockMatrix {
    probe: MatrixProbe,
    /// Frames kept in history; older ones are dropped
    history: usize,
}

impl MockMatrix {
    pub fn new() -> Self {
        Self {
            probe: MatrixProbe::default(),
            history: 4096,
        }
    }

    pub fn probe(&self) -> MatrixProbe {
        self.probe.clone()
    }
}

impl Default for MockMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl LedMatrix for MockMatrix {
    fn set_pixels(&mut self, frame: &Frame) -> Result<()> {
        let mut record = self
            .probe
            .record
            .lock()
            .map_err(|_| Error::Display("mock matrix poisoned".to_string()))?;
        if record.frames.len() == self.history {
            record.frames.remove(0);
        }
        record.frames.push(*frame);
        record.pixels = *frame;
        Ok(())
    }

    fn set_low_light(&mut self, enabled: bool) -> Result<()> {
        let mut record = self
            .probe
            .record
            .lock()
            .map_err(|_| Error::Display("mock matrix poisoned".to_string()))?;
        record.low_light = enabled;
        record.gamma_writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_sees_writes() {
        let mut matrix = MockMatrix::new();
        let probe = matrix.probe();

        let mut frame = [Rgb::BLACK; MATRIX_PIXELS];
        frame[9] = Rgb::new(255, 0, 0);
        matrix.set_pixels(&frame).unwrap();
        matrix.set_low_light(true).unwrap();

        assert!(probe.has_shown(&frame));
        assert_eq!(probe.pixels(), frame);
        assert!(probe.low_light());
        assert!(!probe.is_blank());

        matrix.clear().unwrap();
        assert!(probe.is_blank());
        assert_eq!(probe.snapshot().frames.len(), 2);
        assert_eq!(probe.snapshot().gamma_writes, 1);
    }
}
