//! `list` and `send` commands, the only ones touching hardware

use anyhow::Result;
use hid_vsl_protocol::{DspSession, Registry, is_audio_candidate};
use tracing::info;
use vsl_hid_common::{HidDeviceInfo, HidPort};

use super::{ValueArgs, codec, resolve_param};
use crate::config::DeviceConfig;
use crate::error::CliError;
use crate::output;

/// Enumerated devices, narrowed to audio interfaces unless `all` is set.
pub fn matching_devices(port: &dyn HidPort, all: bool) -> Result<Vec<HidDeviceInfo>, CliError> {
    let devices = port.list_devices()?;
    Ok(devices
        .into_iter()
        .filter(|d| all || is_audio_candidate(d))
        .collect())
}

pub fn execute_list(port: &dyn HidPort, all: bool, json: bool) -> Result<()> {
    let devices = matching_devices(port, all)?;
    output::print_device_list(&devices, json);
    Ok(())
}

/// Encodes one value, opens the configured device and sends the report.
pub fn send_value(
    port: &dyn HidPort,
    config: &DeviceConfig,
    registry: &Registry,
    param: &str,
    value: &ValueArgs,
) -> Result<output::EncodeSummary, CliError> {
    let spec = resolve_param(registry, param)?;
    let (packet, summary) = codec::encode_value(spec, value, config.report_id, 8)?;

    let device = port.open_device(config.vendor_id, config.product_id)?;
    let mut session = DspSession::with_report_id(device, registry, config.report_id);
    session.send_packet(&packet)?;
    session.close()?;

    info!("Sent {} = {} to device", spec.name, packet.value());
    Ok(summary)
}

pub fn execute_send(
    port: &dyn HidPort,
    config: &DeviceConfig,
    registry: &Registry,
    param: &str,
    value: &ValueArgs,
    json: bool,
) -> Result<()> {
    let summary = send_value(port, config, registry, param, value)?;
    output::print_encode(&summary, true, json);
    Ok(())
}
