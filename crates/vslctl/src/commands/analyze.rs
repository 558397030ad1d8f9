//! `analyze` command: decode every DSP report in a capture file

use std::path::Path;

use anyhow::{Context, Result};
use hid_vsl_protocol::{DecodedRecord, ProtocolDecoder, Registry};
use tracing::{info, warn};

use crate::capture::{filter_device_payloads, filter_dsp_payloads, load_capture};
use crate::config::DeviceConfig;
use crate::error::CliError;
use crate::output;

/// Decoded records plus how many payloads never reached the decoder or
/// failed to decode.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub records: Vec<DecodedRecord>,
    pub dropped: usize,
}

pub fn analyze_capture(
    config: &DeviceConfig,
    registry: &Registry,
    capture: &Path,
) -> Result<Analysis> {
    let payloads =
        load_capture(capture).map_err(|e| CliError::InvalidInput(format!("{e:#}")))?;
    let (from_device, foreign) =
        filter_device_payloads(payloads, config.vendor_id, config.product_id);
    let (kept, short) = filter_dsp_payloads(from_device);
    let mut dropped = foreign + short;

    let decoder = ProtocolDecoder::new(registry);
    let mut records = Vec::with_capacity(kept.len());
    for (payload, result) in kept.iter().zip(decoder.decode_all(kept.iter().map(|p| &p.bytes))) {
        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("Skipping payload at {}us: {}", payload.timestamp_us, e);
                dropped += 1;
            }
        }
    }

    info!("Decoded {} record(s) from {}", records.len(), capture.display());
    Ok(Analysis { records, dropped })
}

pub fn execute(
    config: &DeviceConfig,
    registry: &Registry,
    capture: &Path,
    export: Option<&Path>,
    json: bool,
) -> Result<()> {
    let analysis = analyze_capture(config, registry, capture)?;
    output::print_records(&analysis.records, analysis.dropped, json);

    if let Some(path) = export {
        let text = serde_json::to_string_pretty(&analysis.records)
            .context("Failed to serialize decoded records")?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write output file '{}'", path.display()))?;
        if !json {
            println!("Decoded records saved to '{}'.", path.display());
        }
    }
    Ok(())
}
