//! HID device traits

use crate::{HidCommonError, HidCommonResult, HidDeviceInfo};

/// An open HID handle.
///
/// Implementations own the underlying OS handle; dropping or closing the
/// device releases it.
pub trait HidDevice: Send {
    /// Writes one output report. Returns the number of bytes accepted.
    fn write_report(&mut self, data: &[u8]) -> HidCommonResult<usize>;

    fn read_report(&mut self, timeout_ms: u32) -> HidCommonResult<Vec<u8>>;

    fn get_device_info(&self) -> &HidDeviceInfo;

    fn is_connected(&self) -> bool;

    fn close(&mut self) -> HidCommonResult<()>;
}

impl<D: HidDevice + ?Sized> HidDevice for Box<D> {
    fn write_report(&mut self, data: &[u8]) -> HidCommonResult<usize> {
        (**self).write_report(data)
    }

    fn read_report(&mut self, timeout_ms: u32) -> HidCommonResult<Vec<u8>> {
        (**self).read_report(timeout_ms)
    }

    fn get_device_info(&self) -> &HidDeviceInfo {
        (**self).get_device_info()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn close(&mut self) -> HidCommonResult<()> {
        (**self).close()
    }
}

/// Device enumeration and opening.
pub trait HidPort {
    fn list_devices(&self) -> HidCommonResult<Vec<HidDeviceInfo>>;

    fn open_device(&self, vendor_id: u16, product_id: u16) -> HidCommonResult<Box<dyn HidDevice>>;
}

pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct MockState {
        read_queue: VecDeque<Vec<u8>>,
        write_history: Vec<Vec<u8>>,
        write_limit: Option<usize>,
        disconnected: bool,
    }

    /// In-memory device recording every written report.
    ///
    /// Clones share state, so a test can keep one handle for inspection
    /// while the code under test owns another.
    #[derive(Debug, Clone)]
    pub struct MockHidDevice {
        info: HidDeviceInfo,
        state: Arc<Mutex<MockState>>,
    }

    impl MockHidDevice {
        pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
            Self::from_info(HidDeviceInfo::new(vendor_id, product_id, path))
        }

        pub fn from_info(info: HidDeviceInfo) -> Self {
            Self {
                info,
                state: Arc::new(Mutex::new(MockState::default())),
            }
        }

        fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            f(&mut state)
        }

        pub fn queue_read(&self, data: Vec<u8>) {
            self.with_state(|s| s.read_queue.push_back(data));
        }

        pub fn get_write_history(&self) -> Vec<Vec<u8>> {
            self.with_state(|s| s.write_history.clone())
        }

        /// Caps how many bytes each write reports as accepted.
        pub fn set_write_limit(&self, limit: Option<usize>) {
            self.with_state(|s| s.write_limit = limit);
        }

        pub fn disconnect(&self) {
            self.with_state(|s| s.disconnected = true);
        }

        pub fn reconnect(&self) {
            self.with_state(|s| s.disconnected = false);
        }
    }

    impl HidDevice for MockHidDevice {
        fn write_report(&mut self, data: &[u8]) -> HidCommonResult<usize> {
            self.with_state(|s| {
                if s.disconnected {
                    return Err(HidCommonError::Disconnected);
                }
                s.write_history.push(data.to_vec());
                Ok(s.write_limit.map_or(data.len(), |limit| limit.min(data.len())))
            })
        }

        fn read_report(&mut self, _timeout_ms: u32) -> HidCommonResult<Vec<u8>> {
            self.with_state(|s| {
                if s.disconnected {
                    return Err(HidCommonError::Disconnected);
                }
                s.read_queue
                    .pop_front()
                    .ok_or_else(|| HidCommonError::ReadError("No data available".to_string()))
            })
        }

        fn get_device_info(&self) -> &HidDeviceInfo {
            &self.info
        }

        fn is_connected(&self) -> bool {
            self.with_state(|s| !s.disconnected)
        }

        fn close(&mut self) -> HidCommonResult<()> {
            self.disconnect();
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub struct MockHidPort {
        devices: Vec<MockHidDevice>,
    }

    impl MockHidPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_device(&mut self, device: MockHidDevice) {
            self.devices.push(device);
        }

        pub fn device_count(&self) -> usize {
            self.devices.len()
        }
    }

    impl HidPort for MockHidPort {
        fn list_devices(&self) -> HidCommonResult<Vec<HidDeviceInfo>> {
            Ok(self
                .devices
                .iter()
                .map(|d| d.get_device_info().clone())
                .collect())
        }

        fn open_device(
            &self,
            vendor_id: u16,
            product_id: u16,
        ) -> HidCommonResult<Box<dyn HidDevice>> {
            self.devices
                .iter()
                .find(|d| d.info.matches(vendor_id, product_id))
                .map(|d| Box::new(d.clone()) as Box<dyn HidDevice>)
                .ok_or_else(|| {
                    HidCommonError::DeviceNotFound(format!("{vendor_id:04x}:{product_id:04x}"))
                })
        }
    }
}
