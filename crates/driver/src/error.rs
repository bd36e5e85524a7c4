//! Driver error types
//!
//! All of these end a session. The only non-fatal condition, an unexpected
//! product id, is logged as a warning and never surfaces as an error.

use protocol::FrameError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors opening, validating or talking to a device node
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Device node could not be opened for reading and writing
    #[error("Unable to open device {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// HIDIOCGRAWINFO failed, so the identity could not be checked
    #[error("HIDIOCGRAWINFO failed on {}: {source}", .path.display())]
    Ioctl {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Device reported a vendor other than the sensor's
    #[error(
        "Wrong vendor ID 0x{vendor_id:04x} on {} (expected 0x{expected:04x}), make sure you got the right hidraw device",
        .path.display()
    )]
    WrongVendor {
        path: PathBuf,
        vendor_id: u16,
        expected: u16,
    },

    /// Auto-detection found no sensor
    #[error("No sensor found among {tried} candidate device(s) {prefix}*")]
    NoDeviceFound { tried: u32, prefix: String },

    /// HIDIOCSFEATURE failed while starting the report stream
    #[error("HIDIOCSFEATURE failed: {0}")]
    FeatureSet(#[source] io::Error),

    /// A read returned something other than one full report
    #[error("Bad number of bytes read: expected {expected}, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// A read failed outright
    #[error("Bad number of bytes read: {0}")]
    Read(#[source] io::Error),
}

impl DeviceError {
    /// True when the device node simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DeviceError::Open { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }
}

/// Errors that end the monitoring loop
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Measurement line could not be written or flushed
    #[error("Failed to write measurement: {0}")]
    Output(#[source] io::Error),
}
