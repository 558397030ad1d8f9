//! HID protocol implementation for the PreSonus VSL DSP.
//!
//! The AudioBox family exposes its mixer/DSP controls (channel gain, filter
//! cutoff, ...) over a vendor HID interface. Every control change is one
//! 64-byte report carrying a single `(parameter id, value)` pair. This crate
//! covers the two layers with real invariants:
//!
//! - **Calibration** ([`calibration`]): curves mapping a normalized control
//!   position to the 16-bit integer the firmware consumes.
//! - **Framing** ([`packet`]): the exact byte layout of the report.
//!
//! On top of those sit the static [`registry`] of known parameters, the
//! capture [`decoder`] and a caller-owned device [`session`]. The crate
//! performs no I/O itself; the session writes through the
//! [`vsl_hid_common::HidDevice`] seam.
//!
//! ## Report layout
//!
//! | Offset | Size | Field | Notes |
//! |--------|------|-------|-------|
//! | 0 | 1 | report id | protocol selector |
//! | 1–2 | 2 | parameter id | little-endian |
//! | 3–4 | 2 | encoded value | little-endian, 0–65535 |
//! | 5–63 | 59 | padding | zero on construction, ignored on parse |
//!
//! ## Calibration status
//!
//! - Gain encode (exponential curve) and the frequency log2 taper are
//!   recovered from the vendor driver.
//! - **Gain decode is not recovered.** [`decode_gain_approx`] is a linear
//!   remap and does not invert [`encode_gain`]; see its docs.
//! - Only one calibration point is confirmed on hardware: gain channel 1 at
//!   75% encodes to `40793`. Coefficients are per-parameter data, not
//!   universal constants.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]

pub mod calibration;
pub mod decoder;
pub mod ids;
pub mod packet;
pub mod registry;
pub mod session;

pub use calibration::*;
pub use decoder::*;
pub use ids::*;
pub use packet::*;
pub use registry::*;
pub use session::*;

use thiserror::Error;
use vsl_hid_common::HidCommonError;

/// Errors returned by VSL protocol operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VslError {
    #[error("{field} out of range: {value:#X} does not fit in {bits} bits")]
    OutOfRange {
        field: &'static str,
        value: u64,
        bits: u32,
    },

    #[error("Value {value} exceeds the device ceiling {max} of parameter {param_id:#06X}")]
    ExceedsCeiling { param_id: u16, value: u16, max: u16 },

    #[error("Invalid range for parameter {param_id:#06X}: {reason}")]
    InvalidRange { param_id: u16, reason: String },

    #[error("Invalid parameter {param_id:#06X}: {reason}")]
    InvalidParameter { param_id: u16, reason: String },

    #[error("Unknown parameter: {0:#06X}")]
    UnknownParameter(u16),

    #[error("Malformed packet: expected {expected} bytes, got {actual}")]
    MalformedPacket { expected: usize, actual: usize },

    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Convenience result alias for VSL operations.
pub type VslResult<T> = Result<T, VslError>;

impl From<HidCommonError> for VslError {
    fn from(e: HidCommonError) -> Self {
        VslError::Transport(e.to_string())
    }
}

/// PreSonus USB Vendor ID.
pub const VENDOR_ID: u16 = 0x194F;
/// Product ID of the AudioBox VSL interface.
pub const PRODUCT_ID: u16 = 0x0101;
/// Report id used for DSP parameter writes.
pub const DEFAULT_REPORT_ID: u8 = 0x06;

/// Size of every DSP report in bytes (`0x40`).
pub const REPORT_SIZE: usize = 64;
/// Report id + parameter id + value.
pub const HEADER_SIZE: usize = 5;

/// Firmware-internal float ceiling that maps onto `max_encoded_int`.
pub const MAX_ENCODED_FLOAT: f64 = 1000.0;
/// Widest device integer (16-bit unsigned).
pub const MAX_ENCODED_INT: u16 = u16::MAX;

/// Manufacturer/product substrings identifying supported audio interfaces.
pub const AUDIO_DEVICE_KEYWORDS: [&str; 3] = ["presonus", "audiobox", "studiolive"];
