//! Caller-owned device session
//!
//! A [`DspSession`] pairs one open [`HidDevice`] with a report id and a
//! registry. There is no process-wide handle: whoever opens the device owns
//! the session and decides when to close it.

use tracing::{debug, info};
use vsl_hid_common::{HidCommonError, HidDevice};

use crate::{
    DEFAULT_REPORT_ID, EncodedPacket, REPORT_SIZE, Registry, UnitKind, VslError, VslResult,
    encode_frequency_hz, encode_user_value,
};

pub struct DspSession<'r, D: HidDevice> {
    device: D,
    report_id: u8,
    registry: &'r Registry,
}

impl<'r, D: HidDevice> DspSession<'r, D> {
    /// Session using [`DEFAULT_REPORT_ID`].
    pub fn new(device: D, registry: &'r Registry) -> Self {
        Self::with_report_id(device, registry, DEFAULT_REPORT_ID)
    }

    pub fn with_report_id(device: D, registry: &'r Registry, report_id: u8) -> Self {
        let info = device.get_device_info();
        info!(
            "DSP session opened on {} ({:04x}:{:04x}), report id {:#04X}",
            info.display_name(),
            info.vendor_id,
            info.product_id,
            report_id
        );
        Self {
            device,
            report_id,
            registry,
        }
    }

    pub fn report_id(&self) -> u8 {
        self.report_id
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn is_connected(&self) -> bool {
        self.device.is_connected()
    }

    /// Validates `packet` and writes it as one report.
    ///
    /// # Errors
    ///
    /// [`VslError::InternalInconsistency`] if the packet fails its self check,
    /// [`VslError::Transport`] if the write fails or is short.
    pub fn send_packet(&mut self, packet: &EncodedPacket) -> VslResult<()> {
        packet.validate()?;

        let written = self.device.write_report(packet.as_bytes())?;
        if written != REPORT_SIZE {
            return Err(HidCommonError::ShortWrite {
                expected: REPORT_SIZE,
                written,
            }
            .into());
        }

        debug!("Sent {} [{}]", packet, packet.hex_dump(8));
        Ok(())
    }

    /// Encodes a normalized value for `param_id` and sends it.
    ///
    /// Returns the packet that went out.
    pub fn set_value(&mut self, param_id: u16, value: f64) -> VslResult<EncodedPacket> {
        let spec = self.registry.require(param_id)?;
        let encoded = encode_user_value(value, spec)?;
        self.send_encoded(param_id, encoded)
    }

    /// Sends a frequency parameter given in Hz.
    ///
    /// # Errors
    ///
    /// [`VslError::InvalidParameter`] when `param_id` is not a frequency
    /// parameter.
    pub fn set_frequency_hz(&mut self, param_id: u16, freq_hz: f64) -> VslResult<EncodedPacket> {
        let spec = self.registry.require(param_id)?;
        if spec.unit_kind != UnitKind::Frequency {
            return Err(VslError::InvalidParameter {
                param_id,
                reason: format!("{} is not a frequency parameter", spec.name),
            });
        }
        let encoded = encode_frequency_hz(freq_hz, spec)?;
        self.send_encoded(param_id, encoded)
    }

    /// Sends an already encoded device integer.
    ///
    /// # Errors
    ///
    /// [`VslError::UnknownParameter`] when `param_id` is not in the registry,
    /// [`VslError::ExceedsCeiling`] when `encoded` is above the parameter's
    /// `max_encoded_int`. Nothing is written in either case.
    pub fn send_encoded(&mut self, param_id: u16, encoded: u16) -> VslResult<EncodedPacket> {
        let spec = self.registry.require(param_id)?;
        if encoded > spec.max_encoded_int {
            return Err(VslError::ExceedsCeiling {
                param_id,
                value: encoded,
                max: spec.max_encoded_int,
            });
        }

        let packet = EncodedPacket::new(self.report_id, param_id, encoded);
        self.send_packet(&packet)?;
        Ok(packet)
    }

    /// Closes the device and consumes the session.
    pub fn close(mut self) -> VslResult<()> {
        self.device.close()?;
        info!("DSP session closed");
        Ok(())
    }

    /// Hands the device back without closing it.
    pub fn into_inner(self) -> D {
        self.device
    }
}
