//! Integration tests for the vsl-hid-common crate.
//!
//! Covers the report reader, device info, the mock transport and error display.

use proptest::prelude::*;
use vsl_hid_common::{
    HidCommonError, HidDevice, HidDeviceInfo, HidPort, ReportReader,
    hid_traits::mock::{MockHidDevice, MockHidPort},
};

// ---------------------------------------------------------------------------
// ReportReader
// ---------------------------------------------------------------------------

#[test]
fn reader_recovers_header_fields_from_full_frame() -> Result<(), HidCommonError> {
    let mut frame = [0u8; 64];
    frame[..5].copy_from_slice(&[0x06, 0x05, 0x2B, 0x00, 0x80]);

    let mut reader = ReportReader::new(&frame);
    assert_eq!(reader.read_u8()?, 0x06);
    assert_eq!(reader.read_u16_le()?, 0x2B05);
    assert_eq!(reader.read_u16_le()?, 0x8000);
    assert_eq!(reader.remaining(), 59);
    assert!(reader.read_bytes(59)?.iter().all(|&b| b == 0));
    Ok(())
}

#[test]
fn reader_on_empty_slice_fails() {
    let empty: [u8; 0] = [];
    let mut reader = ReportReader::new(&empty);
    assert_eq!(reader.remaining(), 0);
    assert!(reader.read_u8().is_err());
    assert!(reader.read_u16_le().is_err());
}

#[test]
fn reader_failed_read_does_not_advance() -> Result<(), HidCommonError> {
    let data = [0x01, 0x02, 0x03];
    let mut reader = ReportReader::new(&data);
    reader.read_u8()?;
    assert!(reader.read_bytes(5).is_err());
    assert_eq!(reader.position(), 1);
    assert_eq!(reader.read_u16_le()?, 0x0302);
    assert_eq!(reader.slice(), &data);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_u16_le_matches_std(value: u16, lead in 0usize..62) {
        let mut frame = vec![0xEEu8; lead];
        frame.extend_from_slice(&value.to_le_bytes());

        let mut reader = ReportReader::new(&frame);
        reader.seek(lead);
        let read = reader.read_u16_le().map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(read, value);
        prop_assert_eq!(reader.remaining(), 0);
    }
}

// ---------------------------------------------------------------------------
// Mock transport
// ---------------------------------------------------------------------------

#[test]
fn mock_device_write_returns_length() -> Result<(), HidCommonError> {
    let mut device = MockHidDevice::new(0x194F, 0x0101, "/dev/hidraw3");
    let frame = [0u8; 64];
    assert_eq!(device.write_report(&frame)?, 64);
    Ok(())
}

#[test]
fn mock_device_disconnect_read_fails() {
    let mut device = MockHidDevice::new(0x194F, 0x0101, "/dev/hidraw3");
    device.queue_read(vec![0x06]);
    device.disconnect();
    assert!(matches!(
        device.read_report(10),
        Err(HidCommonError::Disconnected)
    ));
}

#[test]
fn mock_port_lists_device_metadata() -> Result<(), HidCommonError> {
    let mut port = MockHidPort::default();
    port.add_device(MockHidDevice::from_info(
        HidDeviceInfo::new(0x194F, 0x0101, "/dev/hidraw3")
            .with_manufacturer("PreSonus")
            .with_product_name("AudioBox USB 96"),
    ));

    let devices = port.list_devices()?;
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].display_name(), "AudioBox USB 96");
    assert!(devices[0].matches_any_keyword(&["presonus"]));
    Ok(())
}

#[test]
fn boxed_device_forwards_calls() -> Result<(), HidCommonError> {
    let observer = MockHidDevice::new(0x194F, 0x0101, "/dev/hidraw3");
    let mut boxed: Box<dyn HidDevice> = Box::new(observer.clone());
    boxed.write_report(&[0x06, 0x00])?;
    assert_eq!(boxed.get_device_info().path, "/dev/hidraw3");
    boxed.close()?;
    assert!(!observer.is_connected());
    assert_eq!(observer.get_write_history(), vec![vec![0x06, 0x00]]);
    Ok(())
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn error_display_messages() {
    assert_eq!(
        HidCommonError::OpenError("permission denied".into()).to_string(),
        "Failed to open device: permission denied"
    );
    assert_eq!(
        HidCommonError::WriteError("pipe".into()).to_string(),
        "Failed to write to device: pipe"
    );
    assert_eq!(
        HidCommonError::InvalidReport("short".into()).to_string(),
        "Invalid report format: short"
    );
}
