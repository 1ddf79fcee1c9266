//! Scrolling text for the 8x8 matrix
//!
//! Text is drawn with the `embedded_graphics` 4x6 mono font onto an 8x8
//! [`Canvas`]. Each frame moves the text one column left, starting fully off
//! the right edge and ending fully off the left edge.

use crate::core::types::{Frame, MATRIX_PIXELS, Rgb};
use embedded_graphics::mono_font::{MonoTextStyle, ascii::FONT_4X6};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Baseline, Text};
use std::convert::Infallible;

const SIDE: usize = 8;
/// Top row of the text band; the font is 6 rows tall
pub const TEXT_TOP: i32 = 1;
pub const TEXT_HEIGHT: i32 = 6;

/// One matrix frame as an `embedded_graphics` draw target. Lit font pixels
/// take the foreground color; everything else keeps the background.
pub struct Canvas {
    frame: Frame,
    foreground: Rgb,
}

impl Canvas {
    pub fn new(foreground: Rgb, background: Rgb) -> Self {
        Self {
            frame: [background; MATRIX_PIXELS],
            foreground,
        }
    }

    pub fn into_frame(self) -> Frame {
        self.frame
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(SIDE as u32, SIDE as u32)
    }
}

impl DrawTarget for Canvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> std::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if color.is_off() || coord.x < 0 || coord.y < 0 {
                continue;
            }
            let (x, y) = (coord.x as usize, coord.y as usize);
            if x < SIDE && y < SIDE {
                self.frame[y * SIDE + x] = self.foreground;
            }
        }
        Ok(())
    }
}

/// Every frame needed to scroll `text` across the matrix.
pub fn scroll_frames(text: &str, foreground: Rgb, background: Rgb) -> Vec<Frame> {
    let style = MonoTextStyle::new(&FONT_4X6, BinaryColor::On);
    let width = style
        .measure_string(text, Point::zero(), Baseline::Top)
        .bounding_box
        .size
        .width as i32;

    (-width..=SIDE as i32)
        .rev()
        .map(|x| {
            let mut canvas = Canvas::new(foreground, background);
            let _ = Text::with_baseline(text, Point::new(x, TEXT_TOP), style, Baseline::Top)
                .draw(&mut canvas);
            canvas.into_frame()
        })
        .collect()
}
