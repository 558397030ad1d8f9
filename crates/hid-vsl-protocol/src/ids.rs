//! Device and parameter identifiers for the VSL DSP
//!
//! USB identity comes from the vendor driver configuration. Parameter ids are
//! the ones observed in captured traffic so far; the id space is 16 bits and
//! most of it is still unmapped.

use crate::{AUDIO_DEVICE_KEYWORDS, PRODUCT_ID, VENDOR_ID};
use vsl_hid_common::HidDeviceInfo;

/// Input channel 1 gain (exponential taper).
pub const PARAM_GAIN_CH1: u16 = 0x1A01;
/// Input channel 1 high-pass filter cutoff (log2 taper).
pub const PARAM_HPF_FREQ_CH1: u16 = 0x2B05;

pub fn is_vsl_device(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == VENDOR_ID && product_id == PRODUCT_ID
}

/// True for the VSL interface itself or any HID device whose strings name a
/// supported audio brand. Used to narrow enumeration output.
pub fn is_audio_candidate(info: &HidDeviceInfo) -> bool {
    is_vsl_device(info.vendor_id, info.product_id)
        || info.matches_any_keyword(&AUDIO_DEVICE_KEYWORDS)
}
