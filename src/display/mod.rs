//! LED matrix presentation
//!
//! [`DisplayController`] is the only owner of the LED matrix. All of its
//! operations are fire-and-forget: a failed write to the device is logged and
//! swallowed, since the display is cosmetic and must never stop sampling.

pub mod font;
pub mod glyphs;

pub use glyphs::{Color, Glyph};

use crate::core::driver::LedMatrix;
use crate::core::types::Frame;
use std::thread;
use std::time::Duration;

/// What the matrix currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Blank,
    Glyph(Glyph),
    /// Scrolling text finished; matrix left blank by the scroll
    Message,
}

pub struct DisplayController {
    matrix: Box<dyn LedMatrix>,
    low_light: bool,
    state: DisplayState,
    /// Delay between scroll frames
    scroll_delay: Duration,
}

impl DisplayController {
    pub fn new(matrix: Box<dyn LedMatrix>, scroll_delay: Duration) -> Self {
        Self {
            matrix,
            low_light: false,
            state: DisplayState::Blank,
            scroll_delay,
        }
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn low_light(&self) -> bool {
        self.low_light
    }

    pub fn show_grid(&mut self, glyph: Glyph) {
        self.write(&glyph.frame());
        self.state = DisplayState::Glyph(glyph);
    }

    /// Scroll `text` in white across `background` (default off). Blocks for
    /// the duration of the scroll.
    pub fn show_message(&mut self, text: &str, background: Option<Color>) {
        let background = background.unwrap_or(Color::Off).rgb();
        log::debug!("Display message: {}", text);

        for frame in font::scroll_frames(text, Color::White.rgb(), background) {
            self.write(&frame);
            if !self.scroll_delay.is_zero() {
                thread::sleep(self.scroll_delay);
            }
        }
        self.clear();
        self.state = DisplayState::Message;
    }

    pub fn set_low_light(&mut self, enabled: bool) {
        if let Err(e) = self.matrix.set_low_light(enabled) {
            log::warn!("Failed to set low light {}: {}", enabled, e);
            return;
        }
        self.low_light = enabled;
    }

    /// Flip brightness mode, returning the new low-light flag.
    pub fn toggle_low_light(&mut self) -> bool {
        let target = !self.low_light;
        self.set_low_light(target);
        self.low_light
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.matrix.clear() {
            log::warn!("Failed to clear display: {}", e);
        }
        self.state = DisplayState::Blank;
    }

    fn write(&mut self, frame: &Frame) {
        if let Err(e) = self.matrix.set_pixels(frame) {
            log::warn!("Display write failed: {}", e);
        }
    }
}
