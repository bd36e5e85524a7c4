//! Device discovery and validation
//!
//! A device node is accepted as the sensor when it opens read-write and its
//! vendor id matches. A different product id only produces a warning.
//!
//! Auto-detection walks the candidate paths in ascending order and takes the
//! first node that is accepted. Failures along the way are logged at debug
//! level only, since most candidates are expected to be missing or to belong
//! to other HID devices.

use crate::error::DeviceError;
use crate::hid::{CandidatePaths, DeviceOpener, HidDevice};
use protocol::{DeviceIdentity, SENSOR_PRODUCT_ID, SENSOR_VENDOR_ID};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A validated, open sensor
#[derive(Debug)]
pub struct LocatedDevice<D> {
    pub path: PathBuf,
    pub identity: DeviceIdentity,
    pub device: D,
}

/// What probing one candidate path found
#[derive(Debug)]
pub struct Probe {
    pub path: PathBuf,
    pub outcome: ProbeOutcome,
}

#[derive(Debug)]
pub enum ProbeOutcome {
    /// Vendor id matches the sensor
    Sensor(DeviceIdentity),
    /// Some other HID device
    Other(DeviceIdentity),
    /// Node could not be opened or queried
    Unavailable(DeviceError),
}

/// Finds and validates the sensor among raw HID device nodes
pub struct DeviceLocator<O> {
    opener: O,
    candidates: CandidatePaths,
    vendor_id: u16,
    product_id: u16,
}

impl<O: DeviceOpener> DeviceLocator<O> {
    /// Locator using the default candidates and sensor ids
    pub fn new(opener: O) -> Self {
        Self {
            opener,
            candidates: CandidatePaths::default(),
            vendor_id: SENSOR_VENDOR_ID,
            product_id: SENSOR_PRODUCT_ID,
        }
    }

    pub fn with_candidates(mut self, candidates: CandidatePaths) -> Self {
        self.candidates = candidates;
        self
    }

    /// Override the required vendor id and the expected product id
    pub fn with_ids(mut self, vendor_id: u16, product_id: u16) -> Self {
        self.vendor_id = vendor_id;
        self.product_id = product_id;
        self
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    pub fn candidates(&self) -> &CandidatePaths {
        &self.candidates
    }

    /// Open and validate a specific device node
    pub fn open_explicit(&self, path: &Path) -> Result<LocatedDevice<O::Device>, DeviceError> {
        let located = self.open_validated(path)?;
        self.check_product(&located);
        Ok(located)
    }

    /// Open the first candidate that validates
    pub fn detect(&self) -> Result<LocatedDevice<O::Device>, DeviceError> {
        for path in self.candidates.iter() {
            match self.open_validated(&path) {
                Ok(located) => {
                    info!("Device detected: {}", located.path.display());
                    self.check_product(&located);
                    return Ok(located);
                }
                Err(e) => debug!("Skipping {}: {}", path.display(), e),
            }
        }

        Err(DeviceError::NoDeviceFound {
            tried: self.candidates.count(),
            prefix: self.candidates.prefix().to_string(),
        })
    }

    /// Inspect every candidate without keeping any of them open
    pub fn probe_all(&self) -> Vec<Probe> {
        self.candidates
            .iter()
            .map(|path| {
                let outcome = match self.identify(&path) {
                    Ok((_, identity)) if identity.vendor_id == self.vendor_id => {
                        ProbeOutcome::Sensor(identity)
                    }
                    Ok((_, identity)) => ProbeOutcome::Other(identity),
                    Err(e) => ProbeOutcome::Unavailable(e),
                };
                Probe { path, outcome }
            })
            .collect()
    }

    fn identify(&self, path: &Path) -> Result<(O::Device, DeviceIdentity), DeviceError> {
        let device = self.opener.open(path).map_err(|source| DeviceError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let identity = device.identity().map_err(|source| DeviceError::Ioctl {
            path: path.to_path_buf(),
            source,
        })?;

        Ok((device, identity))
    }

    fn open_validated(&self, path: &Path) -> Result<LocatedDevice<O::Device>, DeviceError> {
        let (device, identity) = self.identify(path)?;

        if identity.vendor_id != self.vendor_id {
            return Err(DeviceError::WrongVendor {
                path: path.to_path_buf(),
                vendor_id: identity.vendor_id,
                expected: self.vendor_id,
            });
        }

        debug!("{} identifies as {}", path.display(), identity);
        Ok(LocatedDevice {
            path: path.to_path_buf(),
            identity,
            device,
        })
    }

    fn check_product(&self, located: &LocatedDevice<O::Device>) {
        if located.identity.product_id != self.product_id {
            warn!(
                "Unknown product ID 0x{:04x} on {} (expected 0x{:04x})",
                located.identity.product_id,
                located.path.display(),
                self.product_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::mock::{MockDevice, MockOpener};
    use crate::test_log::capture_logs;
    use std::io;

    #[test]
    fn test_open_explicit_accepts_sensor() {
        let opener = MockOpener::new().with_device("/dev/hidraw0", MockDevice::sensor());
        let located = DeviceLocator::new(opener)
            .open_explicit(Path::new("/dev/hidraw0"))
            .unwrap();

        assert_eq!(located.identity.vendor_id, SENSOR_VENDOR_ID);
        assert_eq!(located.path, PathBuf::from("/dev/hidraw0"));
    }

    #[test]
    fn test_open_explicit_tolerates_unknown_product() {
        let opener =
            MockOpener::new().with_device("/dev/hidraw0", MockDevice::new(0x04d9, 0x1111));
        let located = DeviceLocator::new(opener)
            .open_explicit(Path::new("/dev/hidraw0"))
            .unwrap();

        assert_eq!(located.identity.product_id, 0x1111);
    }

    #[test]
    fn test_unknown_product_is_logged_as_warning() {
        let opener =
            MockOpener::new().with_device("/dev/hidraw0", MockDevice::new(0x04d9, 0x1111));
        let locator = DeviceLocator::new(opener);

        let (located, logs) = capture_logs(|| locator.detect());
        assert!(located.is_ok());
        assert!(logs.contains("WARN"));
        assert!(logs.contains("Unknown product ID 0x1111 on /dev/hidraw0 (expected 0xa052)"));
    }

    #[test]
    fn test_known_product_is_not_warned_about() {
        let opener = MockOpener::new().with_device("/dev/hidraw0", MockDevice::sensor());
        let locator = DeviceLocator::new(opener);

        let (located, logs) = capture_logs(|| locator.open_explicit(Path::new("/dev/hidraw0")));
        assert!(located.is_ok());
        assert!(!logs.contains("WARN"));
    }

    #[test]
    fn test_open_explicit_rejects_wrong_vendor() {
        let device = MockDevice::new(0x1234, SENSOR_PRODUCT_ID);
        let opener = MockOpener::new().with_device("/dev/hidraw0", device.clone());
        let err = DeviceLocator::new(opener)
            .open_explicit(Path::new("/dev/hidraw0"))
            .unwrap_err();

        assert!(matches!(
            err,
            DeviceError::WrongVendor {
                vendor_id: 0x1234,
                expected: 0x04d9,
                ..
            }
        ));
        // Rejected node is closed again
        assert_eq!(device.log().closes(), 1);
    }

    #[test]
    fn test_open_explicit_error_kinds() {
        let opener = MockOpener::new()
            .with_device("/dev/hidraw1", MockDevice::without_identity())
            .with_inaccessible("/dev/hidraw2", io::ErrorKind::PermissionDenied);
        let locator = DeviceLocator::new(opener);

        assert!(matches!(
            locator.open_explicit(Path::new("/dev/hidraw0")),
            Err(DeviceError::Open { .. })
        ));
        assert!(matches!(
            locator.open_explicit(Path::new("/dev/hidraw1")),
            Err(DeviceError::Ioctl { .. })
        ));
        assert!(matches!(
            locator.open_explicit(Path::new("/dev/hidraw2")),
            Err(DeviceError::Open { .. })
        ));
    }

    #[test]
    fn test_custom_ids() {
        let opener =
            MockOpener::new().with_device("/dev/hidraw0", MockDevice::new(0x1a86, 0x7523));
        let locator = DeviceLocator::new(opener).with_ids(0x1a86, 0x7523);

        assert!(locator.open_explicit(Path::new("/dev/hidraw0")).is_ok());
    }

    #[test]
    fn test_detect_with_no_nodes() {
        let locator = DeviceLocator::new(MockOpener::new());
        let err = locator.detect().unwrap_err();

        assert!(matches!(err, DeviceError::NoDeviceFound { tried: 20, .. }));
        assert_eq!(locator.opener().attempts().len(), 20);
    }
}
