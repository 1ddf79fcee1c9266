//! Named LED matrix patterns
//!
//! Each glyph is a row-major 8x8 grid of [`Color`]s.

use crate::core::types::{Frame, MATRIX_PIXELS, Rgb};

/// Palette used by the glyphs and scrolling text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Off,
    White,
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    pub const fn rgb(self) -> Rgb {
        match self {
            Color::Off => Rgb::new(0, 0, 0),
            Color::White => Rgb::new(255, 255, 255),
            Color::Red => Rgb::new(255, 0, 0),
            Color::Green => Rgb::new(0, 255, 0),
            Color::Yellow => Rgb::new(255, 255, 0),
            Color::Blue => Rgb::new(0, 0, 255),
        }
    }
}

/// Static screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Smiley: idle, waiting for input
    Ready,
    /// Red square on white: session open
    Recording,
    /// Green tick on white: session closed and moved
    Finished,
    /// Red "X?": shutdown awaiting confirmation
    ConfirmShutdown,
    /// Invader: brightness reference after a toggle
    Reference,
    /// Red cross: session could not start or was aborted
    Error,
}

impl Glyph {
    pub fn pattern(self) -> &'static [Color; MATRIX_PIXELS] {
        match self {
            Glyph::Ready => &READY,
            Glyph::Recording => &RECORDING,
            Glyph::Finished => &FINISHED,
            Glyph::ConfirmShutdown => &CONFIRM_SHUTDOWN,
            Glyph::Reference => &REFERENCE,
            Glyph::Error => &ERROR,
        }
    }

    pub fn frame(self) -> Frame {
        (*self.pattern()).map(Color::rgb)
    }
}

const B: Color = Color::Off;
const O: Color = Color::White;
const X: Color = Color::Red;
const Y: Color = Color::Green;
const Z: Color = Color::Yellow;
const U: Color = Color::Blue;

#[rustfmt::skip]
const READY: [Color; MATRIX_PIXELS] = [
    B, B, Z, Z, Z, Z, B, B,
    B, Z, B, B, B, B, Z, B,
    Z, B, Z, B, B, Z, B, Z,
    Z, B, B, B, B, B, B, Z,
    Z, B, Z, B, B, Z, B, Z,
    Z, B, B, Z, Z, B, B, Z,
    B, Z, B, B, B, B, Z, B,
    B, B, Z, Z, Z, Z, B, B,
];

#[rustfmt::skip]
const RECORDING: [Color; MATRIX_PIXELS] = [
    O, O, O, O, O, O, O, O,
    O, O, O, O, O, O, O, O,
    O, O, X, X, X, X, O, O,
    O, O, X, X, X, X, O, O,
    O, O, X, X, X, X, O, O,
    O, O, X, X, X, X, O, O,
    O, O, O, O, O, O, O, O,
    O, O, O, O, O, O, O, O,
];

#[rustfmt::skip]
const FINISHED: [Color; MATRIX_PIXELS] = [
    O, O, O, O, O, O, O, O,
    O, O, O, O, O, O, O, O,
    O, O, O, O, O, O, Y, O,
    O, O, O, O, O, Y, O, O,
    Y, O, O, O, Y, O, O, O,
    O, Y, O, Y, O, O, O, O,
    O, O, Y, O, O, O, O, O,
    O, O, O, O, O, O, O, O,
];

#[rustfmt::skip]
const CONFIRM_SHUTDOWN: [Color; MATRIX_PIXELS] = [
    B, X, B, B, B, X, B, B,
    B, B, X, B, X, B, B, B,
    B, B, B, X, B, B, B, B,
    B, B, B, X, B, B, B, B,
    B, B, X, B, B, X, B, B,
    B, B, X, X, B, X, B, B,
    B, B, X, B, X, X, B, B,
    B, B, X, B, B, X, B, B,
];

#[rustfmt::skip]
const REFERENCE: [Color; MATRIX_PIXELS] = [
    B, B, U, B, B, U, B, B,
    B, B, B, U, U, B, B, B,
    B, B, U, U, U, U, B, B,
    B, U, U, Y, Y, U, U, B,
    U, U, U, U, U, U, U, U,
    U, B, U, U, U, U, B, U,
    U, B, U, B, B, U, B, U,
    B, B, B, U, U, B, B, B,
];

#[rustfmt::skip]
const ERROR: [Color; MATRIX_PIXELS] = [
    X, B, B, B, B, B, B, X,
    B, X, B, B, B, B, X, B,
    B, B, X, B, B, X, B, B,
    B, B, B, X, X, B, B, B,
    B, B, B, X, X, B, B, B,
    B, B, X, B, B, X, B, B,
    B, X, B, B, B, B, X, B,
    X, B, B, B, B, B, B, X,
];
