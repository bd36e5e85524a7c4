//! Sensor identity and handshake constants

use std::fmt;

/// USB vendor id of the sensor (Holtek Semiconductor)
pub const SENSOR_VENDOR_ID: u16 = 0x04d9;

/// USB product id of the known sensor model
///
/// Other product ids are accepted with a warning.
pub const SENSOR_PRODUCT_ID: u16 = 0xa052;

/// Length of the feature report that starts the report stream
pub const FEATURE_REPORT_LEN: usize = 9;

/// Path prefix of the raw HID device nodes probed during auto-detection
pub const DEFAULT_CANDIDATE_PREFIX: &str = "/dev/hidraw";

/// Number of device nodes probed during auto-detection (`hidraw0` to `hidraw19`)
pub const DEFAULT_CANDIDATE_COUNT: u32 = 20;

/// Identity reported by a raw HID device node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Bus type (`BUS_USB` = 3 for the sensor)
    pub bus_type: u32,
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceIdentity {
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            bus_type: 0x03,
            vendor_id,
            product_id,
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

/// Feature report payload sent once before reading
///
/// An all-zero payload; the sensor starts streaming reports after receiving it.
pub fn init_feature_report() -> [u8; FEATURE_REPORT_LEN] {
    [0u8; FEATURE_REPORT_LEN]
}
