//! Captured payload decoding
//!
//! [`ProtocolDecoder`] maps a raw 64-byte payload to a [`DecodedRecord`]
//! using a borrowed [`Registry`]. Unknown parameter ids still produce a
//! record; only malformed payloads fail.

use std::fmt;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::{
    EncodedPacket, MAX_ENCODED_INT, ParameterSpec, Registry, UnitKind, VslResult,
    decode_gain_approx, decode_position, map_frequency,
};

/// Unit label for ids missing from the registry.
pub const UNKNOWN_UNIT: &str = "UNKNOWN";

/// Number of leading payload bytes kept in [`DecodedRecord::raw_payload_hex`].
pub const RAW_PREVIEW_BYTES: usize = 8;

/// Structured view of one captured report.
///
/// Serializes to the analyzer export shape: ids as `0x` hex strings, the
/// device integer under `value_int` and the unit under `unit`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedRecord {
    #[serde(serialize_with = "hex_u8")]
    pub report_id: u8,
    #[serde(serialize_with = "hex_u16")]
    pub param_id: u16,
    pub name: Option<String>,
    #[serde(rename = "value_int")]
    pub raw_int_value: u16,
    pub decoded_value: f64,
    #[serde(rename = "unit")]
    pub unit_label: String,
    /// First [`RAW_PREVIEW_BYTES`] bytes as lowercase hex.
    pub raw_payload_hex: String,
}

impl DecodedRecord {
    pub fn is_known(&self) -> bool {
        self.name.is_some()
    }
}

impl fmt::Display for DecodedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ID: {:#06X} ({})",
            self.param_id,
            self.name.as_deref().unwrap_or("UNKNOWN_PARAM")
        )?;
        writeln!(
            f,
            "  INT:  {:5} ({:#06X})",
            self.raw_int_value, self.raw_int_value
        )?;
        writeln!(f, "  USER: {:.2} {}", self.decoded_value, self.unit_label)?;
        write!(f, "  RAW:  {}...", self.raw_payload_hex)
    }
}

fn hex_u8<S: Serializer>(value: &u8, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{value:02X}"))
}

fn hex_u16<S: Serializer>(value: &u16, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{value:04X}"))
}

/// Stateless decoder over a borrowed registry.
#[derive(Debug, Clone, Copy)]
pub struct ProtocolDecoder<'a> {
    registry: &'a Registry,
}

impl<'a> ProtocolDecoder<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Decodes one payload.
    ///
    /// # Errors
    ///
    /// [`crate::VslError::MalformedPacket`] when `payload` is not 64 bytes,
    /// or [`crate::VslError::InvalidRange`] when a registered frequency
    /// parameter carries unusable bounds.
    pub fn decode(&self, payload: &[u8]) -> VslResult<DecodedRecord> {
        let packet = EncodedPacket::parse(payload)?;
        let raw = packet.value();

        let (name, decoded_value, unit_label) = match self.registry.get(packet.param_id()) {
            Some(spec) => {
                let (value, unit) = decode_known(raw, spec)?;
                (Some(spec.name.clone()), value, unit)
            }
            None => {
                debug!("Unknown parameter id {:#06X} in payload", packet.param_id());
                let value = f64::from(raw) / f64::from(MAX_ENCODED_INT);
                (None, value, UNKNOWN_UNIT)
            }
        };

        Ok(DecodedRecord {
            report_id: packet.report_id(),
            param_id: packet.param_id(),
            name,
            raw_int_value: raw,
            decoded_value,
            unit_label: unit_label.to_string(),
            raw_payload_hex: preview_hex(packet.as_bytes()),
        })
    }

    /// Decodes a batch, one result per payload.
    ///
    /// A failing payload yields its own `Err` and does not stop the rest.
    pub fn decode_all<I, P>(&self, payloads: I) -> impl Iterator<Item = VslResult<DecodedRecord>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let decoder = *self;
        payloads
            .into_iter()
            .map(move |payload| decoder.decode(payload.as_ref()))
    }
}

fn decode_known(raw: u16, spec: &ParameterSpec) -> VslResult<(f64, &'static str)> {
    let value = match spec.unit_kind {
        UnitKind::Gain => decode_gain_approx(raw, spec),
        UnitKind::Frequency => map_frequency(decode_position(raw, spec), spec)?,
        UnitKind::Raw => f64::from(raw) / f64::from(MAX_ENCODED_INT),
    };
    Ok((value, spec.unit_kind.unit_label()))
}

fn preview_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take(RAW_PREVIEW_BYTES)
        .map(|b| format!("{b:02x}"))
        .collect()
}
