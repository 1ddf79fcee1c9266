//! Core data types shared between the loop and the device backends.
//!
//! - [`InputEvent`]: one joystick event, a (direction, action) pair
//! - [`SampleRecord`]: one row of the output file
//! - [`Rgb`]: LED matrix pixel

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

/// Joystick direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Middle,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Middle => "middle",
        }
    }
}

/// Joystick action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Pressed,
    Held,
    Released,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Pressed => "pressed",
            Action::Held => "held",
            Action::Released => "released",
        }
    }
}

/// A joystick event in arrival order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub direction: Direction,
    pub action: Action,
}

impl InputEvent {
    pub const fn new(direction: Direction, action: Action) -> Self {
        Self { direction, action }
    }

    pub const fn pressed(direction: Direction) -> Self {
        Self::new(direction, Action::Pressed)
    }

    pub const fn held(direction: Direction) -> Self {
        Self::new(direction, Action::Held)
    }

    pub const fn released(direction: Direction) -> Self {
        Self::new(direction, Action::Released)
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.direction.as_str(), self.action.as_str())
    }
}

/// Parses `"<direction> [action]"`, action defaulting to pressed.
///
/// Used by the mock joystick to read scripted events from stdin.
impl FromStr for InputEvent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            Some("up" | "u") => Direction::Up,
            Some("down" | "d") => Direction::Down,
            Some("left" | "l") => Direction::Left,
            Some("right" | "r") => Direction::Right,
            Some("middle" | "m" | "enter") => Direction::Middle,
            Some(other) => return Err(format!("unknown direction '{}'", other)),
            None => return Err("empty event".to_string()),
        };
        let action = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("pressed" | "press" | "p") => Action::Pressed,
            Some("held" | "hold" | "h") => Action::Held,
            Some("released" | "release") => Action::Released,
            Some(other) => return Err(format!("unknown action '{}'", other)),
        };
        Ok(InputEvent { direction, action })
    }
}

/// Three-axis reading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
}

/// LED pixel color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packed RGB565 as used by the Sense HAT framebuffer
    pub fn to_rgb565(self) -> u16 {
        ((self.r as u16 >> 3) << 11) | ((self.g as u16 >> 2) << 5) | (self.b as u16 >> 3)
    }
}

/// Number of LEDs on the matrix (8x8)
pub const MATRIX_PIXELS: usize = 64;

/// One frame of the LED matrix, row-major
pub type Frame = [Rgb; MATRIX_PIXELS];

/// Column names, in row order
pub const COLUMNS: [&str; 14] = [
    "temp_h",
    "temp_p",
    "humidity",
    "pressure",
    "pitch",
    "roll",
    "yaw",
    "mag_x",
    "mag_y",
    "mag_z",
    "gyro_x",
    "gyro_y",
    "gyro_z",
    "timestamp",
];

/// Separator between fields of a row
pub const FIELD_SEPARATOR: &str = ", ";

/// Timestamp format of the last column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Decimal places every numeric field is rounded to
pub const DECIMALS: i32 = 2;

/// Round to [`DECIMALS`] places. Values that round to zero are `+0.0` so
/// rows never carry `-0`.
#[inline]
pub fn round_value(value: f64) -> f64 {
    let scale = 10f64.powi(DECIMALS);
    (value * scale).round() / scale + 0.0
}

/// One sample of the sensor suite, already rounded
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    pub temp_h: f64,
    pub temp_p: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub orientation: Orientation,
    pub mag: Vector3,
    pub gyro: Vector3,
    pub timestamp: NaiveDateTime,
}

impl SampleRecord {
    /// Build a record from raw readings, applying the rounding policy.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        temp_h: f64,
        temp_p: f64,
        humidity: f64,
        pressure: f64,
        orientation: Orientation,
        mag: Vector3,
        gyro: Vector3,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            temp_h: round_value(temp_h),
            temp_p: round_value(temp_p),
            humidity: round_value(humidity),
            pressure: round_value(pressure),
            orientation: Orientation {
                pitch: round_value(orientation.pitch),
                roll: round_value(orientation.roll),
                yaw: round_value(orientation.yaw),
            },
            mag: Vector3::new(round_value(mag.x), round_value(mag.y), round_value(mag.z)),
            gyro: Vector3::new(round_value(gyro.x), round_value(gyro.y), round_value(gyro.z)),
            timestamp,
        }
    }

    /// Numeric fields in column order
    pub fn values(&self) -> [f64; 13] {
        [
            self.temp_h,
            self.temp_p,
            self.humidity,
            self.pressure,
            self.orientation.pitch,
            self.orientation.roll,
            self.orientation.yaw,
            self.mag.x,
            self.mag.y,
            self.mag.z,
            self.gyro.x,
            self.gyro.y,
            self.gyro.z,
        ]
    }

    /// Header row matching [`SampleRecord`]'s `Display` output
    pub fn header() -> String {
        COLUMNS
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(FIELD_SEPARATOR)
    }
}

/// Formats the record as one row, without line terminator
impl fmt::Display for SampleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for value in self.values() {
            write!(f, "{}{}", value, FIELD_SEPARATOR)?;
        }
        write!(f, "{}", self.timestamp.format(TIMESTAMP_FORMAT))
    }
}

/// Parses a row written by `Display` back into a record
impl FromStr for SampleRecord {
    type Err = Error;

    fn from_str(row: &str) -> Result<Self> {
        let fields: Vec<&str> = row.trim_end().split(FIELD_SEPARATOR).collect();
        if fields.len() != COLUMNS.len() {
            return Err(Error::MalformedRow(format!(
                "expected {} fields, got {}",
                COLUMNS.len(),
                fields.len()
            )));
        }

        let mut values = [0.0f64; 13];
        for (i, (slot, field)) in values.iter_mut().zip(&fields).enumerate() {
            *slot = field
                .parse()
                .map_err(|_| Error::MalformedRow(format!("{}: '{}'", COLUMNS[i], field)))?;
        }
        let timestamp = NaiveDateTime::parse_from_str(fields[13], TIMESTAMP_FORMAT)
            .map_err(|e| Error::MalformedRow(format!("timestamp: {}", e)))?;

        Ok(Self {
            temp_h: values[0],
            temp_p: values[1],
            humidity: values[2],
            pressure: values[3],
            orientation: Orientation {
                pitch: values[4],
                roll: values[5],
                yaw: values[6],
            },
            mag: Vector3::new(values[7], values[8], values[9]),
            gyro: Vector3::new(values[10], values[11], values[12]),
            timestamp,
        })
    }
}
