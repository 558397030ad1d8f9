//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use hid_vsl_protocol::{
    DecodedRecord, EncodedPacket, MAX_ENCODED_INT, ParameterSpec, REPORT_SIZE, Registry, UnitKind,
};
use serde::Serialize;
use serde_json::json;
use vsl_hid_common::HidDeviceInfo;

use crate::config::DeviceConfig;
use crate::error::CliError;

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format output as JSON: {}", e),
    }
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let kind = error
        .downcast_ref::<CliError>()
        .map_or("error", CliError::kind);
    print_json(&json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": kind
        }
    }));
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

/// Configuration banner plus validation outcome.
pub fn print_status(config: &DeviceConfig, problems: &[String], json: bool) {
    if json {
        print_json(&json!({
            "success": problems.is_empty(),
            "vendor_id": format!("0x{:04X}", config.vendor_id),
            "product_id": format!("0x{:04X}", config.product_id),
            "report_id": format!("0x{:02X}", config.report_id),
            "report_size": REPORT_SIZE,
            "max_encoded_int": MAX_ENCODED_INT,
            "parameters": config.parameters.len(),
            "problems": problems,
        }));
        return;
    }

    println!("{}", "VSL-DSP configuration".bold());
    println!("  Vendor ID:       0x{:04X}", config.vendor_id);
    println!("  Product ID:      0x{:04X}", config.product_id);
    println!("  Report ID:       0x{:02X}", config.report_id);
    println!("  Report size:     {} bytes", REPORT_SIZE);
    println!("  Max encoded int: {}", MAX_ENCODED_INT);
    println!("  Parameters:      {}", config.parameters.len());

    if problems.is_empty() {
        println!("  {} configuration valid", "✓".green());
    } else {
        for problem in problems {
            println!("  {} {}", "✗".red(), problem);
        }
    }
}

fn describe_range(spec: &ParameterSpec) -> String {
    match spec.unit_kind {
        UnitKind::Gain => format!(
            "{} + {} * exp(x * {}), display {}..{} dB",
            spec.curve_offset_a,
            spec.curve_c1,
            spec.log_factor,
            spec.display_range.0,
            spec.display_range.1
        ),
        UnitKind::Frequency => format!("{}..{} Hz", spec.freq_range.0, spec.freq_range.1),
        UnitKind::Raw => "0..1".to_string(),
    }
}

pub fn print_params(registry: &Registry, json: bool) {
    if json {
        let params: Vec<&ParameterSpec> = registry.iter().collect();
        print_json(&json!({
            "success": true,
            "parameters": params,
        }));
        return;
    }

    if registry.is_empty() {
        println!("{}", "No parameters configured".yellow());
        return;
    }

    println!("{}", "Known parameters:".bold());
    for spec in registry.iter() {
        println!(
            "  0x{:04X}  {:<16} {:<10} max {:<6} {}",
            spec.id,
            spec.name.bold(),
            spec.unit_kind,
            spec.max_encoded_int,
            describe_range(spec).dimmed()
        );
    }
}

/// Result of an encode request, printed by `encode` and `send`.
#[derive(Debug, Clone, Serialize)]
pub struct EncodeSummary {
    pub param_id: String,
    pub name: String,
    pub input: f64,
    pub input_unit: &'static str,
    /// Firmware float for gain parameters, Hz for frequency parameters.
    pub physical_value: Option<f64>,
    pub device_int: u16,
    pub packet_hex: String,
}

impl EncodeSummary {
    pub fn new(
        spec: &ParameterSpec,
        input: f64,
        input_unit: &'static str,
        physical_value: Option<f64>,
        packet: &EncodedPacket,
        dump_bytes: usize,
    ) -> Self {
        Self {
            param_id: format!("0x{:04X}", spec.id),
            name: spec.name.clone(),
            input,
            input_unit,
            physical_value,
            device_int: packet.value(),
            packet_hex: packet.hex_dump(dump_bytes),
        }
    }
}

pub fn print_encode(summary: &EncodeSummary, sent: bool, json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "sent": sent,
            "result": summary,
        }));
        return;
    }

    println!("{} ({})", summary.param_id.bold(), summary.name);
    println!("  Input:      {} {}", summary.input, summary.input_unit);
    if let Some(physical) = summary.physical_value {
        println!("  Physical:   {physical:.4}");
    }
    println!(
        "  Device int: {} (0x{:04X})",
        summary.device_int, summary.device_int
    );
    println!("  Packet:     {}", summary.packet_hex);
    if sent {
        println!("  {} sent", "✓".green());
    }
}

pub fn print_records(records: &[DecodedRecord], dropped: usize, json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "records": records,
            "dropped": dropped,
        }));
        return;
    }

    println!(
        "{} {} VSL packet(s) ({} bytes), {} dropped",
        "[+]".green(),
        records.len(),
        REPORT_SIZE,
        dropped
    );
    for (index, record) in records.iter().enumerate() {
        println!("[{:03}] {}", index + 1, record);
        println!("{}", "-".repeat(50));
    }
}

pub fn print_device_list(devices: &[HidDeviceInfo], json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "devices": devices,
        }));
        return;
    }

    if devices.is_empty() {
        println!("{}", "No matching HID devices found".yellow());
        return;
    }

    println!(
        "{:<8} {:<8} {:<12} {:<24} Product",
        "VID", "PID", "Usage Page", "Manufacturer"
    );
    println!("{}", "-".repeat(80));
    for dev in devices {
        println!(
            "0x{:04X}   0x{:04X}   {:<12} {:<24} {}",
            dev.vendor_id,
            dev.product_id,
            dev.usage_page
                .map_or_else(|| "-".to_string(), |p| format!("0x{p:04X}")),
            dev.manufacturer.as_deref().unwrap_or("(unknown)"),
            dev.product_name.as_deref().unwrap_or("(unknown)"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hid_vsl_protocol::PARAM_GAIN_CH1;

    #[test]
    fn encode_summary_serializes_hex_fields() -> Result<(), Box<dyn std::error::Error>> {
        let spec = Registry::builtin()
            .get(PARAM_GAIN_CH1)
            .ok_or("builtin gain parameter missing")?;
        let packet = EncodedPacket::new(0x01, spec.id, 40793);
        let summary = EncodeSummary::new(spec, 0.75, "norm", None, &packet, 5);
        insta::assert_json_snapshot!(summary, @r###"
        {
          "param_id": "0x1A01",
          "name": "GAIN_CH1",
          "input": 0.75,
          "input_unit": "norm",
          "physical_value": null,
          "device_int": 40793,
          "packet_hex": "0x01 0x01 0x1A 0x59 0x9F"
        }
        "###);
        Ok(())
    }

    #[test]
    fn params_table_pads_unit_kind_column() {
        let spec = ParameterSpec::raw(0x3000, "RAW");
        assert_eq!(format!("{:<10}|", spec.unit_kind), "Raw       |");
    }

    #[test]
    fn describe_range_per_unit_kind() {
        let freq = ParameterSpec::frequency(0x2B05, "HPF_FREQ_CH1", 20.0, 20000.0);
        assert_eq!(describe_range(&freq), "20..20000 Hz");
        let raw = ParameterSpec::raw(0x3000, "RAW");
        assert_eq!(describe_range(&raw), "0..1");
    }
}
