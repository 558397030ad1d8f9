//! `encode` and `decode` commands

use anyhow::Result;
use hid_vsl_protocol::{
    EncodedPacket, ParameterSpec, ProtocolDecoder, REPORT_SIZE, Registry, UnitKind,
    decode_frequency, encode_frequency_hz, encode_gain, encode_position_to_device_int,
    encode_to_device_int, map_frequency,
};
use tracing::debug;

use super::{ValueArgs, resolve_param};
use crate::capture::parse_hex_bytes;
use crate::config::DeviceConfig;
use crate::error::CliError;
use crate::output::{self, EncodeSummary};

/// Encodes one value for `spec` into a device integer and a framed packet.
pub fn encode_value(
    spec: &ParameterSpec,
    value: &ValueArgs,
    report_id: u8,
    dump_bytes: usize,
) -> Result<(EncodedPacket, EncodeSummary), CliError> {
    let (input, input_unit, physical, device_int) = match (spec.unit_kind, value.value, value.hz) {
        (UnitKind::Gain, Some(position), _) => {
            let firmware_float = encode_gain(position, spec);
            let device_int = encode_to_device_int(firmware_float, spec);
            (position, "norm", Some(firmware_float), device_int)
        }
        (UnitKind::Frequency, Some(position), _) => {
            let hz = map_frequency(position, spec)?;
            (position, "norm", Some(hz), encode_position_to_device_int(position, spec))
        }
        (UnitKind::Frequency, None, Some(hz)) => {
            let clamped_hz = map_frequency(decode_frequency(hz, spec)?, spec)?;
            (hz, "Hz", Some(clamped_hz), encode_frequency_hz(hz, spec)?)
        }
        (UnitKind::Raw, Some(position), _) => {
            (position, "norm", None, encode_position_to_device_int(position, spec))
        }
        (_, None, Some(_)) => {
            return Err(CliError::InvalidInput(format!(
                "--hz only applies to frequency parameters; {} is {:?}",
                spec.name, spec.unit_kind
            )));
        }
        (_, None, None) => {
            return Err(CliError::InvalidInput(
                "one of --value or --hz is required".to_string(),
            ));
        }
    };

    let packet = EncodedPacket::new(report_id, spec.id, device_int);
    packet.validate()?;
    debug!("Encoded {} -> {}", spec.name, packet);

    let summary = EncodeSummary::new(spec, input, input_unit, physical, &packet, dump_bytes);
    Ok((packet, summary))
}

pub fn execute_encode(
    config: &DeviceConfig,
    registry: &Registry,
    param: &str,
    value: &ValueArgs,
    dump_bytes: usize,
    json: bool,
) -> Result<()> {
    let spec = resolve_param(registry, param)?;
    let (_, summary) = encode_value(spec, value, config.report_id, dump_bytes)?;
    output::print_encode(&summary, false, json);
    Ok(())
}

/// Parses a hex payload, optionally zero padding it to a full report.
pub fn payload_from_hex(hex: &str, pad: bool) -> Result<Vec<u8>, CliError> {
    let mut bytes = parse_hex_bytes(hex).map_err(|e| CliError::InvalidInput(format!("{e:#}")))?;
    if pad && bytes.len() < REPORT_SIZE {
        bytes.resize(REPORT_SIZE, 0);
    }
    Ok(bytes)
}

pub fn execute_decode(registry: &Registry, hex: &[String], pad: bool, json: bool) -> Result<()> {
    let payload = payload_from_hex(&hex.join(" "), pad)?;
    let record = ProtocolDecoder::new(registry)
        .decode(&payload)
        .map_err(CliError::from)?;
    output::print_records(std::slice::from_ref(&record), 0, json);
    Ok(())
}
