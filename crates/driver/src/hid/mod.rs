//! Raw HID device access
//!
//! The locator and the monitor only talk to devices through the two traits in
//! this module. [`hidraw`] implements them on top of Linux `/dev/hidrawN`
//! nodes; [`mock`] implements them in memory for tests.
//!
//! Closing is not part of the trait: a device is closed when its value is
//! dropped, which happens exactly once whichever way a session ends.

#[cfg(target_os = "linux")]
pub mod hidraw;
pub mod mock;

use protocol::{DEFAULT_CANDIDATE_COUNT, DEFAULT_CANDIDATE_PREFIX, DeviceIdentity};
use std::io;
use std::path::{Path, PathBuf};

/// An open raw HID device
pub trait HidDevice {
    /// Query vendor and product ids
    fn identity(&self) -> io::Result<DeviceIdentity>;

    /// Send a feature report over the control channel
    fn set_feature_report(&mut self, report: &[u8]) -> io::Result<()>;

    /// Blocking read of one input report; returns the number of bytes read
    fn read_report(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Opens device nodes by path
pub trait DeviceOpener {
    type Device: HidDevice;

    /// Open a device node for reading and writing
    fn open(&self, path: &Path) -> io::Result<Self::Device>;
}

/// Bounded, ordered list of device nodes probed during auto-detection
///
/// Yields `{prefix}0` through `{prefix}{count - 1}` in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePaths {
    prefix: String,
    count: u32,
}

impl CandidatePaths {
    pub fn new(prefix: impl Into<String>, count: u32) -> Self {
        Self {
            prefix: prefix.into(),
            count,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Path of the candidate at `index`
    pub fn path(&self, index: u32) -> PathBuf {
        PathBuf::from(format!("{}{}", self.prefix, index))
    }

    pub fn iter(&self) -> impl Iterator<Item = PathBuf> + '_ {
        (0..self.count).map(|index| self.path(index))
    }
}

impl Default for CandidatePaths {
    fn default() -> Self {
        Self::new(DEFAULT_CANDIDATE_PREFIX, DEFAULT_CANDIDATE_COUNT)
    }
}
