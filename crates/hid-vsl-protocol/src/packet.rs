//! 64-byte DSP report framing

use std::fmt;

use vsl_hid_common::{HidCommonResult, ReportReader};

use crate::{HEADER_SIZE, REPORT_SIZE, VslError, VslResult};

/// One DSP parameter write, framed as a full HID report.
///
/// The buffer is built once from the three fields (or copied from a parsed
/// payload) and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedPacket {
    report_id: u8,
    param_id: u16,
    value: u16,
    buffer: [u8; REPORT_SIZE],
}

impl EncodedPacket {
    /// Frames `(report_id, param_id, value)` with zero padding.
    pub fn new(report_id: u8, param_id: u16, value: u16) -> Self {
        let [param_lo, param_hi] = param_id.to_le_bytes();
        let [value_lo, value_hi] = value.to_le_bytes();
        let header: [u8; HEADER_SIZE] = [report_id, param_lo, param_hi, value_lo, value_hi];

        let mut buffer = [0u8; REPORT_SIZE];
        for (slot, byte) in buffer.iter_mut().zip(header) {
            *slot = byte;
        }

        Self {
            report_id,
            param_id,
            value,
            buffer,
        }
    }

    /// Checked constructor for fields arriving as wider integers.
    ///
    /// # Errors
    ///
    /// [`VslError::OutOfRange`] naming the first field that does not fit its
    /// wire width.
    pub fn build(report_id: u32, param_id: u32, value: u32) -> VslResult<Self> {
        let report_id = match u8::try_from(report_id) {
            Ok(id) => id,
            Err(_) => {
                return Err(VslError::OutOfRange {
                    field: "report_id",
                    value: u64::from(report_id),
                    bits: u8::BITS,
                });
            }
        };
        let param_id = narrow_u16("param_id", param_id)?;
        let value = narrow_u16("value", value)?;
        Ok(Self::new(report_id, param_id, value))
    }

    /// Reads the header of an externally supplied report.
    ///
    /// Padding is kept in the buffer but not checked.
    ///
    /// # Errors
    ///
    /// [`VslError::MalformedPacket`] unless `data` is exactly
    /// [`REPORT_SIZE`] bytes long.
    pub fn parse(data: &[u8]) -> VslResult<Self> {
        let Ok(buffer) = <[u8; REPORT_SIZE]>::try_from(data) else {
            return Err(VslError::MalformedPacket {
                expected: REPORT_SIZE,
                actual: data.len(),
            });
        };
        let (report_id, param_id, value) = read_header(&buffer)?;
        Ok(Self {
            report_id,
            param_id,
            value,
            buffer,
        })
    }

    /// Re-reads the header from the buffer and compares it with the fields.
    ///
    /// # Errors
    ///
    /// [`VslError::InternalInconsistency`] on any mismatch.
    pub fn validate(&self) -> VslResult<()> {
        let (report_id, param_id, value) = read_header(&self.buffer)?;
        if (report_id, param_id, value) != (self.report_id, self.param_id, self.value) {
            return Err(VslError::InternalInconsistency(format!(
                "buffer holds ({report_id:#04X}, {param_id:#06X}, {value}) but packet \
                 records ({:#04X}, {:#06X}, {})",
                self.report_id, self.param_id, self.value
            )));
        }
        Ok(())
    }

    pub fn report_id(&self) -> u8 {
        self.report_id
    }

    pub fn param_id(&self) -> u16 {
        self.param_id
    }

    pub fn value(&self) -> u16 {
        self.value
    }

    pub fn as_bytes(&self) -> &[u8; REPORT_SIZE] {
        &self.buffer
    }

    /// The first `num_bytes` bytes as space separated `0xNN` tokens.
    pub fn hex_dump(&self, num_bytes: usize) -> String {
        self.buffer
            .iter()
            .take(num_bytes)
            .map(|b| format!("0x{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl TryFrom<&[u8]> for EncodedPacket {
    type Error = VslError;

    fn try_from(data: &[u8]) -> VslResult<Self> {
        Self::parse(data)
    }
}

impl fmt::Display for EncodedPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "report {:#04X} param {:#06X} value {}",
            self.report_id, self.param_id, self.value
        )
    }
}

fn narrow_u16(field: &'static str, raw: u32) -> VslResult<u16> {
    match u16::try_from(raw) {
        Ok(narrowed) => Ok(narrowed),
        Err(_) => Err(VslError::OutOfRange {
            field,
            value: u64::from(raw),
            bits: u16::BITS,
        }),
    }
}

fn read_header(buffer: &[u8]) -> VslResult<(u8, u16, u16)> {
    if buffer.len() != REPORT_SIZE {
        return Err(VslError::InternalInconsistency(format!(
            "packet buffer is {} bytes",
            buffer.len()
        )));
    }
    read_fields(&mut ReportReader::new(buffer))
        .map_err(|e| VslError::InternalInconsistency(e.to_string()))
}

fn read_fields(reader: &mut ReportReader<'_>) -> HidCommonResult<(u8, u16, u16)> {
    Ok((reader.read_u8()?, reader.read_u16_le()?, reader.read_u16_le()?))
}
