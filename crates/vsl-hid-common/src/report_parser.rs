//! HID report parsing utilities

use crate::{HidCommonError, HidCommonResult};

/// Little-endian reader over a borrowed report.
///
/// Reads never run past the end of the slice; an exhausted reader returns
/// [`HidCommonError::InvalidReport`].
#[derive(Debug, Clone)]
pub struct ReportReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ReportReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buffer: data,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    pub fn read_u8(&mut self) -> HidCommonResult<u8> {
        let value = self
            .buffer
            .get(self.position)
            .copied()
            .ok_or_else(|| end_of_data(self.position))?;
        self.position += 1;
        Ok(value)
    }

    pub fn read_u16_le(&mut self) -> HidCommonResult<u16> {
        let lo = self.read_u8()?;
        let hi = self.read_u8()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    pub fn read_bytes(&mut self, count: usize) -> HidCommonResult<&'a [u8]> {
        let end = self
            .position
            .checked_add(count)
            .ok_or_else(|| end_of_data(self.position))?;
        let bytes = self
            .buffer
            .get(self.position..end)
            .ok_or_else(|| end_of_data(self.position))?;
        self.position = end;
        Ok(bytes)
    }

    /// Moves the cursor to an absolute offset, clamped to the report length.
    pub fn seek(&mut self, offset: usize) {
        self.position = offset.min(self.buffer.len());
    }

    pub fn slice(&self) -> &'a [u8] {
        self.buffer
    }
}

fn end_of_data(position: usize) -> HidCommonError {
    HidCommonError::InvalidReport(format!("Unexpected end of data at offset {position}"))
}
