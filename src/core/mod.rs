//! Core abstractions for device backends.
//!
//! - [`driver`]: Traits to implement for new hardware
//! - [`types`]: Input events, sample records and pixel types

pub mod driver;
pub mod types;
