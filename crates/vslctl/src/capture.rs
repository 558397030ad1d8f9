//! Capture file ingestion
//!
//! Two capture formats are understood:
//!
//! - the `hid-capture` JSON document, with `0xNN` token strings per report:
//!   `{"vendor_id": "0x194F", "product_id": "0x0101", "captures": [...]}`
//! - JSON Lines, one `{"ts_ns", "vid", "pid", "report"}` object per line with
//!   the report as plain lowercase hex.
//!
//! Only payloads of exactly one report size from the configured device reach
//! the decoder; everything else is dropped here.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use hid_vsl_protocol::REPORT_SIZE;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureReport {
    pub timestamp_us: u64,
    pub report_id: u8,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureFile {
    pub vendor_id: String,
    pub product_id: String,
    pub captures: Vec<CaptureReport>,
}

/// One line of a JSON Lines capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedLine {
    pub ts_ns: u64,
    pub vid: String,
    pub pid: String,
    pub report: String,
}

/// Raw payload bytes with the capture timestamp in microseconds and the
/// USB identity of the device that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPayload {
    pub timestamp_us: u64,
    pub vendor_id: u16,
    pub product_id: u16,
    pub bytes: Vec<u8>,
}

fn parse_usb_id(field: &str, value: &str) -> Result<u16> {
    parse_hex_u16(value).map_err(|e| anyhow!("invalid {field}: {e}"))
}

pub fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex value '{s}': {e}"))
}

/// Parses hex bytes written either as `0xNN` tokens or as contiguous hex.
///
/// Whitespace and commas separate tokens; each token may carry a `0x` prefix
/// and must have an even number of digits.
pub fn parse_hex_bytes(s: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for token in s
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        if digits.is_empty() || !digits.len().is_multiple_of(2) {
            return Err(anyhow!("hex token '{token}' has an odd or zero digit count"));
        }
        for pair in digits.as_bytes().chunks(2) {
            let pair = std::str::from_utf8(pair)
                .with_context(|| format!("non-ASCII hex token '{token}'"))?;
            let byte = u8::from_str_radix(pair, 16)
                .with_context(|| format!("invalid hex byte '{pair}' in '{token}'"))?;
            bytes.push(byte);
        }
    }
    Ok(bytes)
}

/// Reads every payload from a capture file, whichever format it uses.
pub fn load_capture(path: &Path) -> Result<Vec<CapturedPayload>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read capture file '{}'", path.display()))?;

    if let Ok(document) = serde_json::from_str::<CaptureFile>(&text) {
        debug!(
            "Capture document for {}:{} with {} reports",
            document.vendor_id,
            document.product_id,
            document.captures.len()
        );
        let vendor_id = parse_usb_id("vendor_id", &document.vendor_id)?;
        let product_id = parse_usb_id("product_id", &document.product_id)?;
        return document
            .captures
            .iter()
            .map(|c| {
                Ok(CapturedPayload {
                    timestamp_us: c.timestamp_us,
                    vendor_id,
                    product_id,
                    bytes: parse_hex_bytes(&c.data)?,
                })
            })
            .collect();
    }

    parse_json_lines(&text)
}

fn parse_json_lines(text: &str) -> Result<Vec<CapturedPayload>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let line_no = index + 1;
            let entry: CapturedLine = serde_json::from_str(line)
                .with_context(|| format!("failed to parse capture line {line_no}"))?;
            Ok(CapturedPayload {
                timestamp_us: entry.ts_ns / 1_000,
                vendor_id: parse_usb_id("vid", &entry.vid)
                    .with_context(|| format!("capture line {line_no}"))?,
                product_id: parse_usb_id("pid", &entry.pid)
                    .with_context(|| format!("capture line {line_no}"))?,
                bytes: parse_hex_bytes(&entry.report)?,
            })
        })
        .collect()
}

/// Keeps payloads captured from `vendor_id:product_id`.
///
/// Returns the kept payloads and how many were dropped.
pub fn filter_device_payloads(
    payloads: Vec<CapturedPayload>,
    vendor_id: u16,
    product_id: u16,
) -> (Vec<CapturedPayload>, usize) {
    let total = payloads.len();
    let kept: Vec<_> = payloads
        .into_iter()
        .filter(|p| p.vendor_id == vendor_id && p.product_id == product_id)
        .collect();
    let dropped = total - kept.len();
    if dropped > 0 {
        warn!(
            "Dropped {dropped} of {total} payload(s) not captured from {vendor_id:04x}:{product_id:04x}"
        );
    }
    (kept, dropped)
}

/// Keeps payloads of exactly [`REPORT_SIZE`] bytes.
///
/// Returns the kept payloads and how many were dropped.
pub fn filter_dsp_payloads(payloads: Vec<CapturedPayload>) -> (Vec<CapturedPayload>, usize) {
    let total = payloads.len();
    let kept: Vec<_> = payloads
        .into_iter()
        .filter(|p| p.bytes.len() == REPORT_SIZE)
        .collect();
    let dropped = total - kept.len();
    if dropped > 0 {
        warn!("Dropped {dropped} of {total} payload(s) that are not {REPORT_SIZE} bytes");
    }
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn payload(timestamp_us: u64, vendor_id: u16, product_id: u16, len: usize) -> CapturedPayload {
        CapturedPayload {
            timestamp_us,
            vendor_id,
            product_id,
            bytes: vec![0u8; len],
        }
    }

    // ═══ Scenario: Hex Parsing ══════════════════════════════════════════════

    #[test]
    fn given_hex_with_0x_prefix_when_parsed_then_correct_u16_returned() {
        assert_eq!(parse_hex_u16("0x1A01"), Ok(0x1A01));
        assert_eq!(parse_hex_u16("0X2b05"), Ok(0x2B05));
        assert_eq!(parse_hex_u16("194F"), Ok(0x194F));
    }

    #[test]
    fn given_invalid_or_overflowing_hex_when_parsed_then_error_returned() {
        assert!(parse_hex_u16("ZZZZ").is_err());
        assert!(parse_hex_u16("0x10000").is_err());
        assert!(parse_hex_u16("").is_err());
        assert!(parse_hex_u16("0x").is_err());
    }

    #[test]
    fn given_token_and_contiguous_hex_when_parsed_then_same_bytes() -> TestResult {
        let tokens = parse_hex_bytes("0x06 0x01 0x1A 0x59 0x9F")?;
        let contiguous = parse_hex_bytes("06011a599f")?;
        let mixed = parse_hex_bytes("0601, 1A 0x599F")?;
        assert_eq!(tokens, vec![0x06, 0x01, 0x1A, 0x59, 0x9F]);
        assert_eq!(tokens, contiguous);
        assert_eq!(tokens, mixed);
        assert!(parse_hex_bytes("")?.is_empty());
        Ok(())
    }

    #[test]
    fn given_odd_or_invalid_hex_when_parsed_then_error_returned() {
        assert!(parse_hex_bytes("0x6").is_err());
        assert!(parse_hex_bytes("abc").is_err());
        assert!(parse_hex_bytes("0xGG").is_err());
        assert!(parse_hex_bytes("0x").is_err());
    }

    // ═══ Scenario: Capture Formats ══════════════════════════════════════════

    #[test]
    fn given_capture_document_when_loaded_then_payloads_decoded() -> TestResult {
        let document = CaptureFile {
            vendor_id: "0x194F".to_string(),
            product_id: "0x0101".to_string(),
            captures: vec![
                CaptureReport {
                    timestamp_us: 100,
                    report_id: 0x06,
                    data: "0x06 0x01 0x1A".to_string(),
                },
                CaptureReport {
                    timestamp_us: 200,
                    report_id: 0x06,
                    data: "0x06 0x05 0x2B 0x00 0x80".to_string(),
                },
            ],
        };
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "{}", serde_json::to_string_pretty(&document)?)?;

        let payloads = load_capture(file.path())?;
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].timestamp_us, 100);
        assert_eq!((payloads[0].vendor_id, payloads[0].product_id), (0x194F, 0x0101));
        assert_eq!(payloads[1].bytes, vec![0x06, 0x05, 0x2B, 0x00, 0x80]);
        Ok(())
    }

    #[test]
    fn given_json_lines_when_loaded_then_blank_lines_skipped() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            r#"{{"ts_ns": 5000, "vid": "0x194F", "pid": "0x0101", "report": "06011a599f"}}"#
        )?;
        writeln!(file)?;
        writeln!(
            file,
            r#"{{"ts_ns": 9000, "vid": "0x046D", "pid": "0xC52B", "report": "0605"}}"#
        )?;

        let payloads = load_capture(file.path())?;
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].timestamp_us, 5);
        assert_eq!(payloads[0].bytes.len(), 5);
        assert_eq!(payloads[1].vendor_id, 0x046D);
        assert_eq!(payloads[1].product_id, 0xC52B);
        Ok(())
    }

    #[test]
    fn given_garbage_line_when_loaded_then_error_names_line() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "not json")?;
        let err = load_capture(file.path()).err().ok_or("expected an error")?;
        assert!(err.to_string().contains("line 1"));
        Ok(())
    }

    #[test]
    fn given_bad_vid_in_line_when_loaded_then_error_names_line() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            r#"{{"ts_ns": 1, "vid": "0xZZZZ", "pid": "0x0101", "report": "06"}}"#
        )?;
        let err = load_capture(file.path()).err().ok_or("expected an error")?;
        assert!(format!("{err:#}").contains("capture line 1"));
        Ok(())
    }

    #[test]
    fn given_other_devices_when_filtered_then_only_configured_device_kept() {
        let payloads = vec![
            payload(1, 0x194F, 0x0101, 64),
            payload(2, 0x046D, 0xC52B, 64),
            payload(3, 0x194F, 0x0102, 64),
        ];
        let (kept, dropped) = filter_device_payloads(payloads, 0x194F, 0x0101);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].timestamp_us, 1);
        assert_eq!(dropped, 2);
    }

    #[test]
    fn given_mixed_sizes_when_filtered_then_only_full_reports_kept() {
        let payloads = vec![
            payload(1, 0x194F, 0x0101, 64),
            payload(2, 0x194F, 0x0101, 8),
            payload(3, 0x194F, 0x0101, 65),
        ];
        let (kept, dropped) = filter_dsp_payloads(payloads);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].timestamp_us, 1);
        assert_eq!(dropped, 2);
    }

    proptest::proptest! {
        #[test]
        fn given_any_bytes_when_written_as_tokens_then_parsed_back(
            bytes in proptest::collection::vec(proptest::num::u8::ANY, 0..80)
        ) {
            let tokens: Vec<String> = bytes.iter().map(|b| format!("0x{b:02X}")).collect();
            let contiguous: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
            proptest::prop_assert_eq!(parse_hex_bytes(&tokens.join(" ")).ok(), Some(bytes.clone()));
            proptest::prop_assert_eq!(parse_hex_bytes(&contiguous).ok(), Some(bytes));
        }
    }
}
