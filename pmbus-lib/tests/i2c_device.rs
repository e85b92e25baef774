#![cfg(target_os = "linux")]

use pmbus_lib::error::{TransferError, ValidationError};
use pmbus_lib::{DeviceConfig, ErrorKind, I2cDevice, PmbusAddress, PmbusError, open_session};

const MISSING_BUS: &str = "/dev/i2c-pmbus-test-missing";

#[test]
fn test_invalid_address_rejected_before_open() {
    for raw in [0x80, -1, 0x1000] {
        let err = I2cDevice::open_raw(MISSING_BUS, raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(matches!(
            err,
            PmbusError::Validation(ValidationError::InvalidAddress(a)) if a == raw
        ));
    }
}

#[test]
fn test_missing_bus_is_open_error() {
    let err = I2cDevice::open_raw(MISSING_BUS, 0x40).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(matches!(err, PmbusError::Transfer(TransferError::Open { .. })));
}

#[test]
fn test_open_session_reports_bus_path() {
    let config = DeviceConfig {
        bus: MISSING_BUS.into(),
        address: PmbusAddress::new(0x5A).unwrap(),
        ..DeviceConfig::default()
    };
    let Err(err) = open_session(&config) else {
        panic!("opening a missing bus must fail");
    };
    assert!(err.to_string().contains(MISSING_BUS));
}
