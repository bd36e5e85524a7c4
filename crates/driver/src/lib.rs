//! co2mon driver
//!
//! Locates a zyTemp-family CO2 monitor among the raw HID device nodes, starts
//! its report stream and decodes reports into measurement lines.
//!
//! The pieces are split so they can be exercised without hardware:
//!
//! - [`hid`]: the `HidDevice`/`DeviceOpener` capabilities, the Linux hidraw
//!   backend and an in-memory mock
//! - [`locator`]: device discovery and vendor validation
//! - [`monitor`]: the handshake and frame decoding loop
//! - [`config`]: TOML configuration

pub mod config;
pub mod error;
pub mod hid;
pub mod locator;
pub mod monitor;

#[cfg(test)]
mod test_log;

pub use config::{ConfigSource, DriverConfig};
pub use error::{DeviceError, MonitorError};
pub use hid::{CandidatePaths, DeviceOpener, HidDevice};
pub use locator::{DeviceLocator, LocatedDevice, Probe, ProbeOutcome};
pub use monitor::{Monitor, MonitorStats};
