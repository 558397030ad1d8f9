//! `hidapi` backed implementation of the HID transport traits

use hidapi::{DeviceInfo, HidApi};
use tracing::debug;
use vsl_hid_common::{HidCommonError, HidCommonResult, HidDevice, HidDeviceInfo, HidPort};

pub struct HidapiPort {
    api: HidApi,
}

impl HidapiPort {
    pub fn new() -> HidCommonResult<Self> {
        let api = HidApi::new().map_err(|e| HidCommonError::OpenError(e.to_string()))?;
        Ok(Self { api })
    }
}

fn to_device_info(dev: &DeviceInfo) -> HidDeviceInfo {
    let mut info = HidDeviceInfo::new(
        dev.vendor_id(),
        dev.product_id(),
        dev.path().to_string_lossy().into_owned(),
    )
    .with_interface(dev.interface_number())
    .with_usage_page(dev.usage_page());
    if let Some(serial) = dev.serial_number() {
        info = info.with_serial(serial);
    }
    if let Some(manufacturer) = dev.manufacturer_string() {
        info = info.with_manufacturer(manufacturer);
    }
    if let Some(product) = dev.product_string() {
        info = info.with_product_name(product);
    }
    info
}

impl HidPort for HidapiPort {
    fn list_devices(&self) -> HidCommonResult<Vec<HidDeviceInfo>> {
        Ok(self.api.device_list().map(to_device_info).collect())
    }

    fn open_device(&self, vendor_id: u16, product_id: u16) -> HidCommonResult<Box<dyn HidDevice>> {
        let Some(found) = self
            .api
            .device_list()
            .find(|d| d.vendor_id() == vendor_id && d.product_id() == product_id)
        else {
            return Err(HidCommonError::DeviceNotFound(format!(
                "{vendor_id:04x}:{product_id:04x}"
            )));
        };

        let info = to_device_info(found);
        let device = found
            .open_device(&self.api)
            .map_err(|e| HidCommonError::OpenError(e.to_string()))?;
        debug!("Opened {} at {}", info.display_name(), info.path);

        Ok(Box::new(HidapiDevice {
            device: Some(device),
            info,
        }))
    }
}

/// An open `hidapi` handle. Closing drops the handle.
pub struct HidapiDevice {
    device: Option<hidapi::HidDevice>,
    info: HidDeviceInfo,
}

impl HidapiDevice {
    fn handle(&self) -> HidCommonResult<&hidapi::HidDevice> {
        self.device.as_ref().ok_or(HidCommonError::Disconnected)
    }
}

impl HidDevice for HidapiDevice {
    fn write_report(&mut self, data: &[u8]) -> HidCommonResult<usize> {
        self.handle()?
            .write(data)
            .map_err(|e| HidCommonError::WriteError(e.to_string()))
    }

    fn read_report(&mut self, timeout_ms: u32) -> HidCommonResult<Vec<u8>> {
        let timeout = i32::try_from(timeout_ms).unwrap_or(i32::MAX);
        let mut buf = [0u8; 64];
        let n = self
            .handle()?
            .read_timeout(&mut buf, timeout)
            .map_err(|e| HidCommonError::ReadError(e.to_string()))?;
        Ok(buf.iter().take(n).copied().collect())
    }

    fn get_device_info(&self) -> &HidDeviceInfo {
        &self.info
    }

    fn is_connected(&self) -> bool {
        self.device.is_some()
    }

    fn close(&mut self) -> HidCommonResult<()> {
        self.device = None;
        Ok(())
    }
}
