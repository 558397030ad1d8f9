//! Common HID utilities for the VSL-DSP protocol implementation
//!
//! This crate holds the pieces shared between the I/O-free protocol crate and
//! the command line tool that talks to real hardware:
//! - [`HidDevice`] / [`HidPort`]: the transport seam. The protocol layer only
//!   ever hands a finished report buffer to a [`HidDevice`].
//! - [`ReportReader`]: a bounds-checked little-endian cursor over a report.
//! - [`HidDeviceInfo`]: enumeration metadata.
//! - [`mock`]: in-memory devices for tests.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod device_info;
pub mod hid_traits;
pub mod report_parser;

pub use device_info::*;
pub use hid_traits::*;
pub use report_parser::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HidCommonError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to open device: {0}")]
    OpenError(String),

    #[error("Failed to read from device: {0}")]
    ReadError(String),

    #[error("Failed to write to device: {0}")]
    WriteError(String),

    #[error("Short write: {written} of {expected} bytes")]
    ShortWrite { expected: usize, written: usize },

    #[error("Invalid report format: {0}")]
    InvalidReport(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type HidCommonResult<T> = Result<T, HidCommonError>;
