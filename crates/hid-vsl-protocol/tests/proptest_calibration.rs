//! Property-based tests for the calibration curves.
//!
//! Bounds must hold for any input, including values far outside `[0, 1]`.

use hid_vsl_protocol::{
    ParameterSpec, Registry, VslError, decode_frequency, encode_gain, encode_position_to_device_int,
    encode_to_device_int, map_frequency, PARAM_GAIN_CH1,
};
use proptest::prelude::*;

fn gain_ch1() -> Result<ParameterSpec, TestCaseError> {
    Registry::builtin()
        .get(PARAM_GAIN_CH1)
        .cloned()
        .ok_or_else(|| TestCaseError::fail("GAIN_CH1 missing from builtin registry"))
}

fn frequency_spec() -> impl Strategy<Value = ParameterSpec> {
    (1.0f64..1000.0, 1.5f64..1000.0)
        .prop_map(|(min_hz, ratio)| ParameterSpec::frequency(0x2B05, "HPF", min_hz, min_hz * ratio))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Device integers stay within the ceiling whatever the upstream input.
    #[test]
    fn prop_device_int_within_ceiling(
        input in prop::num::f64::ANY,
        ceiling in 1u16..=u16::MAX,
    ) {
        let spec = gain_ch1()?.with_max_encoded_int(ceiling);
        let from_float = encode_to_device_int(input, &spec);
        prop_assert!(from_float <= ceiling, "{input} encoded as {from_float} > {ceiling}");

        let from_curve = encode_to_device_int(encode_gain(input, &spec), &spec);
        prop_assert!(from_curve <= ceiling);

        let from_position = encode_position_to_device_int(input, &spec);
        prop_assert!(from_position <= ceiling);
    }

    /// The gain curve is non-decreasing over the clamped domain.
    #[test]
    fn prop_gain_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let spec = gain_ch1()?;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(encode_gain(lo, &spec) <= encode_gain(hi, &spec));
        prop_assert!(
            encode_to_device_int(encode_gain(lo, &spec), &spec)
                <= encode_to_device_int(encode_gain(hi, &spec), &spec)
        );
    }

    /// decode_frequency inverts map_frequency to within 1e-4.
    #[test]
    fn prop_frequency_round_trip(spec in frequency_spec(), position in 0.0f64..=1.0) {
        let hz = map_frequency(position, &spec).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let back = decode_frequency(hz, &spec).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!((back - position).abs() < 1e-4, "{position} -> {hz} Hz -> {back}");
    }

    /// Mapped frequencies never leave the configured range.
    #[test]
    fn prop_frequency_within_range(spec in frequency_spec(), position in -10.0f64..10.0) {
        let hz = map_frequency(position, &spec).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let (min_hz, max_hz) = spec.freq_range;
        prop_assert!(hz >= min_hz * (1.0 - 1e-9) && hz <= max_hz * (1.0 + 1e-9));
    }

    /// A non-positive lower bound is always an InvalidRange.
    #[test]
    fn prop_non_positive_min_rejected(min_hz in -1000.0f64..=0.0, position in 0.0f64..=1.0) {
        let spec = ParameterSpec::frequency(0x2B05, "HPF", min_hz, 20000.0);
        let mapped = matches!(map_frequency(position, &spec), Err(VslError::InvalidRange { .. }));
        let decoded = matches!(decode_frequency(100.0, &spec), Err(VslError::InvalidRange { .. }));
        prop_assert!(mapped);
        prop_assert!(decoded);
    }
}
