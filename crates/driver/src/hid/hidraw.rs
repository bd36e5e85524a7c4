//! Linux hidraw backend
//!
//! Talks to `/dev/hidrawN` character devices:
//!
//! - `HIDIOCGRAWINFO` reads the bus type, vendor and product ids
//! - `HIDIOCSFEATURE(len)` sends a feature report
//! - plain `read(2)` returns one input report per call

use super::{DeviceOpener, HidDevice};
use protocol::DeviceIdentity;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use sys::{HidrawDevinfo, hidiocgrawinfo, hidiocsfeature};
use tracing::debug;

mod sys {
    use nix::{ioctl_read, ioctl_readwrite_buf};

    /// `struct hidraw_devinfo` from `<linux/hidraw.h>`
    #[repr(C)]
    #[derive(Debug, Default)]
    pub struct HidrawDevinfo {
        pub bustype: u32,
        pub vendor: i16,
        pub product: i16,
    }

    ioctl_read!(hidiocgrawinfo, b'H', 0x03, HidrawDevinfo);
    ioctl_readwrite_buf!(hidiocsfeature, b'H', 0x06, u8);
}

/// An open `/dev/hidrawN` node
#[derive(Debug)]
pub struct HidrawDevice {
    file: File,
    path: PathBuf,
}

impl HidrawDevice {
    /// Open a hidraw node for reading and writing
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        debug!("Opened {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HidDevice for HidrawDevice {
    fn identity(&self) -> io::Result<DeviceIdentity> {
        let mut info = HidrawDevinfo::default();
        // SAFETY: the descriptor stays open for the lifetime of `self` and
        // `info` matches the kernel's hidraw_devinfo layout.
        unsafe { hidiocgrawinfo(self.file.as_raw_fd(), &mut info) }.map_err(io::Error::from)?;

        Ok(DeviceIdentity {
            bus_type: info.bustype,
            vendor_id: info.vendor as u16,
            product_id: info.product as u16,
        })
    }

    fn set_feature_report(&mut self, report: &[u8]) -> io::Result<()> {
        // The kernel may write back into the buffer
        let mut buf = report.to_vec();
        // SAFETY: the request length is taken from `buf`, which outlives the call.
        unsafe { hidiocsfeature(self.file.as_raw_fd(), &mut buf) }.map_err(io::Error::from)?;
        Ok(())
    }

    fn read_report(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Drop for HidrawDevice {
    fn drop(&mut self) {
        debug!("Closing {}", self.path.display());
    }
}

/// Opens real hidraw nodes
#[derive(Debug, Default, Clone, Copy)]
pub struct HidrawOpener;

impl DeviceOpener for HidrawOpener {
    type Device = HidrawDevice;

    fn open(&self, path: &Path) -> io::Result<HidrawDevice> {
        HidrawDevice::open(path)
    }
}
