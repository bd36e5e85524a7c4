//! In-memory HID devices for tests
//!
//! A [`MockDevice`] is scripted with an identity, a queue of read results and
//! an optional feature report failure. Clones share one [`MockLog`], so a test
//! can keep a clone around and inspect what happened after the original has
//! been moved into the code under test and dropped.
//!
//! # Example
//!
//! ```
//! use driver::hid::mock::{MockDevice, MockOpener};
//! use driver::DeviceLocator;
//!
//! let sensor = MockDevice::sensor().with_report([0x50, 0x01, 0x90, 0xe1, 0x0d, 0, 0, 0]);
//! let opener = MockOpener::new().with_device("/dev/hidraw2", sensor.clone());
//!
//! let located = DeviceLocator::new(opener).detect().unwrap();
//! assert_eq!(located.path.to_str(), Some("/dev/hidraw2"));
//!
//! drop(located);
//! assert_eq!(sensor.log().closes(), 1);
//! ```

use super::{DeviceOpener, HidDevice};
use protocol::{DeviceIdentity, FRAME_LEN, SENSOR_PRODUCT_ID, SENSOR_VENDOR_ID};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted read result
#[derive(Debug, Clone)]
pub enum MockRead {
    /// Bytes returned by the read (may be shorter than a report)
    Data(Vec<u8>),
    /// The read fails with this error kind
    Error(io::ErrorKind),
}

/// Record of what happened to a mock device and its clones
#[derive(Debug, Default)]
pub struct MockLog {
    closes: AtomicUsize,
    reads: AtomicUsize,
    feature_reports: Mutex<Vec<Vec<u8>>>,
}

impl MockLog {
    /// Number of device values dropped after being handed out by an opener
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Number of read calls
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Feature reports sent, in order
    pub fn feature_reports(&self) -> Vec<Vec<u8>> {
        self.feature_reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }
}

/// Scripted HID device
#[derive(Debug, Clone)]
pub struct MockDevice {
    identity: Option<DeviceIdentity>,
    reads: VecDeque<MockRead>,
    feature_error: Option<io::ErrorKind>,
    log: Arc<MockLog>,
    opened: bool,
}

impl MockDevice {
    /// Device reporting the given ids
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            identity: Some(DeviceIdentity::new(vendor_id, product_id)),
            reads: VecDeque::new(),
            feature_error: None,
            log: Arc::new(MockLog::default()),
            opened: false,
        }
    }

    /// Device with the sensor's vendor and product ids
    pub fn sensor() -> Self {
        Self::new(SENSOR_VENDOR_ID, SENSOR_PRODUCT_ID)
    }

    /// Device whose identity ioctl fails
    pub fn without_identity() -> Self {
        let mut device = Self::new(0, 0);
        device.identity = None;
        device
    }

    /// Queue one full report
    pub fn with_report(mut self, report: [u8; FRAME_LEN]) -> Self {
        self.reads.push_back(MockRead::Data(report.to_vec()));
        self
    }

    /// Queue a raw read result
    pub fn with_read(mut self, read: MockRead) -> Self {
        self.reads.push_back(read);
        self
    }

    /// Make the feature report ioctl fail
    pub fn with_feature_error(mut self, kind: io::ErrorKind) -> Self {
        self.feature_error = Some(kind);
        self
    }

    pub fn log(&self) -> Arc<MockLog> {
        Arc::clone(&self.log)
    }

    /// Copy handed out by an opener; only these count as closes when dropped
    fn open_copy(&self) -> Self {
        let mut device = self.clone();
        device.opened = true;
        device
    }
}

impl HidDevice for MockDevice {
    fn identity(&self) -> io::Result<DeviceIdentity> {
        // ENOTTY, as returned for nodes that are not hidraw devices
        self.identity.ok_or_else(|| io::Error::from_raw_os_error(25))
    }

    fn set_feature_report(&mut self, report: &[u8]) -> io::Result<()> {
        if let Some(kind) = self.feature_error {
            return Err(io::Error::from(kind));
        }
        if let Ok(mut reports) = self.log.feature_reports.lock() {
            reports.push(report.to_vec());
        }
        Ok(())
    }

    fn read_report(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.log.reads.fetch_add(1, Ordering::SeqCst);
        match self.reads.pop_front() {
            Some(MockRead::Data(data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            Some(MockRead::Error(kind)) => Err(io::Error::from(kind)),
            // Unplugged
            None => Ok(0),
        }
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        if self.opened {
            self.log.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[derive(Debug, Clone)]
enum MockNode {
    Device(MockDevice),
    Inaccessible(io::ErrorKind),
}

/// Opener over a fixed set of simulated device nodes
///
/// Paths without a node fail with `NotFound`.
#[derive(Debug, Default)]
pub struct MockOpener {
    nodes: HashMap<PathBuf, MockNode>,
    attempts: Mutex<Vec<PathBuf>>,
}

impl MockOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, path: impl Into<PathBuf>, device: MockDevice) -> Self {
        self.nodes.insert(path.into(), MockNode::Device(device));
        self
    }

    /// Node that exists but cannot be opened
    pub fn with_inaccessible(mut self, path: impl Into<PathBuf>, kind: io::ErrorKind) -> Self {
        self.nodes.insert(path.into(), MockNode::Inaccessible(kind));
        self
    }

    /// Paths passed to `open`, in order
    pub fn attempts(&self) -> Vec<PathBuf> {
        self.attempts
            .lock()
            .map(|attempts| attempts.clone())
            .unwrap_or_default()
    }
}

impl DeviceOpener for MockOpener {
    type Device = MockDevice;

    fn open(&self, path: &Path) -> io::Result<MockDevice> {
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.push(path.to_path_buf());
        }
        match self.nodes.get(path) {
            Some(MockNode::Device(device)) => Ok(device.open_copy()),
            Some(MockNode::Inaccessible(kind)) => Err(io::Error::from(*kind)),
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }
}
