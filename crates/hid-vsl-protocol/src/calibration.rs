//! Calibration curves between user values and device integers
//!
//! Every function here is pure. Out-of-domain *inputs* are clamped silently;
//! only structurally invalid specs produce errors.

use crate::registry::checked_freq_range;
use crate::{MAX_ENCODED_FLOAT, ParameterSpec, UnitKind, VslResult};

/// Spans narrower than this are treated as a single point.
pub const CURVE_EPSILON: f64 = 1e-7;

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Converts an already clamped, finite, non-negative float to `u16`.
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    reason = "callers clamp into [0, u16::MAX] before converting"
)]
fn saturating_u16(value: f64) -> u16 {
    value as u16
}

/// Maps a normalized control position onto the exponential gain curve.
///
/// `encoded = offset_a + c1 * exp(norm * log_factor)` where `norm` is the
/// clamped input rescaled over `curve_domain`. A degenerate domain returns
/// `offset_a`.
pub fn encode_gain(linear_value: f64, spec: &ParameterSpec) -> f64 {
    let clamped = clamp_unit(linear_value);
    let (domain_min, domain_max) = spec.curve_domain;
    let span = domain_max - domain_min;
    if span.abs() < CURVE_EPSILON {
        return spec.curve_offset_a;
    }

    let norm = (clamped - domain_min) / span;
    spec.curve_offset_a + spec.curve_c1 * (norm * spec.log_factor).exp()
}

/// Scales a firmware float (`0..=1000`) to the parameter's device integer.
///
/// The result always lies in `[0, max_encoded_int]`. Rounding is half away
/// from zero and the value is clamped a second time after rounding.
pub fn encode_to_device_int(encoded_float: f64, spec: &ParameterSpec) -> u16 {
    if spec.max_encoded_int == 0 || encoded_float.is_nan() {
        return 0;
    }

    let max = f64::from(spec.max_encoded_int);
    let scale = max / MAX_ENCODED_FLOAT;
    let rounded = (encoded_float * scale).clamp(0.0, max).round();
    saturating_u16(rounded.clamp(0.0, max))
}

/// Log2 taper from a normalized position to Hz.
///
/// # Errors
///
/// [`crate::VslError::InvalidRange`] when either frequency bound is not
/// positive or the range is inverted.
pub fn map_frequency(linear_position: f64, spec: &ParameterSpec) -> VslResult<f64> {
    let (min_hz, max_hz) = checked_freq_range(spec)?;
    let position = clamp_unit(linear_position);

    let log2_min = min_hz.log2();
    let log2_max = max_hz.log2();
    let log2_value = log2_min + position * (log2_max - log2_min);
    Ok(log2_value.exp2())
}

/// Inverse of [`map_frequency`]: Hz back to a position in `[0, 1]`.
///
/// Returns `0.0` for a single-point range.
///
/// # Errors
///
/// Same conditions as [`map_frequency`].
pub fn decode_frequency(freq_hz: f64, spec: &ParameterSpec) -> VslResult<f64> {
    let (min_hz, max_hz) = checked_freq_range(spec)?;
    let current = if freq_hz.is_nan() {
        min_hz
    } else {
        freq_hz.clamp(min_hz, max_hz)
    };

    let log2_min = min_hz.log2();
    let log2_span = max_hz.log2() - log2_min;
    if log2_span.abs() < CURVE_EPSILON {
        return Ok(0.0);
    }
    Ok(clamp_unit((current.log2() - log2_min) / log2_span))
}

/// Approximate gain decode: a linear remap of the device integer over
/// `display_range`.
///
/// This is **not** the inverse of [`encode_gain`]. The exponential curve has
/// not been inverted from observed traffic yet, so values away from the ends
/// of the range diverge from what the device shows. Do not expect
/// `decode_gain_approx(encode_gain(x))` to reproduce `x`.
pub fn decode_gain_approx(encoded_int: u16, spec: &ParameterSpec) -> f64 {
    let (display_min, display_max) = spec.display_range;
    if spec.max_encoded_int == 0 {
        return display_min;
    }
    let fraction = f64::from(encoded_int) / f64::from(spec.max_encoded_int);
    display_min + fraction * (display_max - display_min)
}

/// Device integer for position-encoded parameters (frequency and raw).
pub fn encode_position_to_device_int(position: f64, spec: &ParameterSpec) -> u16 {
    let max = f64::from(spec.max_encoded_int);
    saturating_u16((clamp_unit(position) * max).round().clamp(0.0, max))
}

/// Normalized position carried by a device integer.
pub fn decode_position(encoded_int: u16, spec: &ParameterSpec) -> f64 {
    if spec.max_encoded_int == 0 {
        return 0.0;
    }
    f64::from(encoded_int) / f64::from(spec.max_encoded_int)
}

/// Hz to device integer through the log2 taper.
pub fn encode_frequency_hz(freq_hz: f64, spec: &ParameterSpec) -> VslResult<u16> {
    let position = decode_frequency(freq_hz, spec)?;
    Ok(encode_position_to_device_int(position, spec))
}

/// Encodes a normalized user value according to the parameter's kind.
///
/// Gain runs through the exponential curve; frequency and raw parameters
/// carry the position directly.
pub fn encode_user_value(value: f64, spec: &ParameterSpec) -> VslResult<u16> {
    match spec.unit_kind {
        UnitKind::Gain => Ok(encode_to_device_int(encode_gain(value, spec), spec)),
        UnitKind::Frequency => {
            checked_freq_range(spec)?;
            Ok(encode_position_to_device_int(value, spec))
        }
        UnitKind::Raw => Ok(encode_position_to_device_int(value, spec)),
    }
}
