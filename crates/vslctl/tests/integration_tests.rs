//! Integration tests for the vslctl CLI
//!
//! Only commands that never open hardware are exercised here.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Custom predicate to check if output is valid JSON
fn is_json() -> impl predicates::Predicate<[u8]> {
    predicates::function::function(|s: &[u8]| {
        if let Ok(text) = std::str::from_utf8(s) {
            serde_json::from_str::<Value>(text).is_ok()
        } else {
            false
        }
    })
}

fn vslctl() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("vslctl")?;
    cmd.env_remove("VSLCTL_CONFIG").env_remove("RUST_LOG");
    Ok(cmd)
}

fn reference_frame_hex() -> String {
    let mut hex = String::from("06011a599f");
    hex.push_str(&"00".repeat(59));
    hex
}

#[test]
fn test_cli_help() -> TestResult {
    vslctl()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("PreSonus VSL"));
    Ok(())
}

#[test]
fn test_status_builtin_config() -> TestResult {
    vslctl()?
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("0x194F"))
        .stdout(predicate::str::contains("configuration valid"));
    Ok(())
}

#[test]
fn test_params_json_lists_builtin_table() -> TestResult {
    let output = vslctl()?.args(["--json", "params"]).output()?;
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["success"], true);
    assert_eq!(json["parameters"][0]["name"], "GAIN_CH1");
    assert_eq!(json["parameters"][1]["unit_kind"], "frequency");
    Ok(())
}

#[test]
fn test_encode_gain_reference_point() -> TestResult {
    vslctl()?
        .args(["encode", "--param", "0x1A01", "--value", "0.75"])
        .assert()
        .success()
        .stdout(predicate::str::contains("40793"))
        .stdout(predicate::str::contains("0x06 0x01 0x1A 0x59 0x9F"));
    Ok(())
}

#[test]
fn test_encode_frequency_json() -> TestResult {
    let output = vslctl()?
        .args(["encode", "--param", "HPF_FREQ_CH1", "--hz", "20000", "--json"])
        .output()?;
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["sent"], false);
    assert_eq!(json["result"]["device_int"], 65535);
    assert_eq!(json["result"]["param_id"], "0x2B05");
    Ok(())
}

#[test]
fn test_encode_unknown_param_exit_code() -> TestResult {
    vslctl()?
        .args(["encode", "--param", "0x3C10", "--value", "0.5"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Unknown parameter"));
    Ok(())
}

#[test]
fn test_decode_full_payload_json() -> TestResult {
    vslctl()?
        .args(["--json", "decode", &reference_frame_hex()])
        .assert()
        .success()
        .stdout(is_json());

    let output = vslctl()?
        .args(["--json", "decode", &reference_frame_hex()])
        .output()?;
    let json: Value = serde_json::from_slice(&output.stdout)?;
    let record = &json["records"][0];
    assert_eq!(record["report_id"], "0x06");
    assert_eq!(record["param_id"], "0x1A01");
    assert_eq!(record["value_int"], 40793);
    assert_eq!(record["unit"], "dB");
    Ok(())
}

#[test]
fn test_decode_short_payload_malformed() -> TestResult {
    vslctl()?
        .args(["decode", "0x06", "0x01", "0x1A"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Malformed packet"));

    vslctl()?
        .args(["decode", "0x06", "0x01", "0x1A", "--pad"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GAIN_CH1"));
    Ok(())
}

#[test]
fn test_analyze_exports_records() -> TestResult {
    let dir = TempDir::new()?;
    let capture = dir.path().join("session.jsonl");
    let export = dir.path().join("session_decoded.json");
    fs::write(
        &capture,
        format!(
            "{{\"ts_ns\": 1000, \"vid\": \"0x194F\", \"pid\": \"0x0101\", \"report\": \"{0}\"}}\n\
             {{\"ts_ns\": 2000, \"vid\": \"0x194F\", \"pid\": \"0x0101\", \"report\": \"0601\"}}\n\
             {{\"ts_ns\": 3000, \"vid\": \"0x046D\", \"pid\": \"0xC52B\", \"report\": \"{0}\"}}\n",
            reference_frame_hex()
        ),
    )?;

    vslctl()?
        .arg("analyze")
        .arg(&capture)
        .arg("--output")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 VSL packet(s) (64 bytes), 2 dropped"));

    let records: Value = serde_json::from_str(&fs::read_to_string(&export)?)?;
    let records = records.as_array().ok_or("export is not an array")?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["raw_payload_hex"], "06011a599f000000");
    Ok(())
}

#[test]
fn test_missing_config_file_exit_code() -> TestResult {
    let dir = TempDir::new()?;
    let missing = dir.path().join("nowhere.yaml");

    vslctl()?
        .arg("--config")
        .arg(&missing)
        .arg("params")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("nowhere.yaml"));
    Ok(())
}

#[test]
fn test_invalid_config_exit_code() -> TestResult {
    let dir = TempDir::new()?;
    let config = dir.path().join("vsl.yaml");
    fs::write(
        &config,
        "parameters:\n  - id: 11013\n    name: HPF_FREQ_CH1\n    unit_kind: frequency\n    freq_range: [0.0, 20000.0]\n",
    )?;

    vslctl()?
        .arg("status")
        .env("VSLCTL_CONFIG", &config)
        .assert()
        .code(3)
        .stdout(predicate::str::contains("Invalid range"));
    Ok(())
}

#[test]
fn test_custom_report_id_from_config() -> TestResult {
    let dir = TempDir::new()?;
    let config = dir.path().join("vsl.json");
    fs::write(&config, r#"{"report_id": 1}"#)?;

    vslctl()?
        .args(["encode", "--param", "GAIN_CH1", "--value", "0.75", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("0x01 0x01 0x1A 0x59 0x9F"));
    Ok(())
}
