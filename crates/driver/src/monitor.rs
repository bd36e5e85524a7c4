//! Frame decoding loop
//!
//! ```text
//! Initializing ──feature report──▶ Reading ──8 bytes──▶ Decoding ──▶ Reading ...
//!      │                             │                     │
//!      └──────────── any error ──────┴─────────────────────┴──▶ Terminated
//! ```
//!
//! The loop is fail-stop. A short read, a missing terminator or a bad checksum
//! ends the session; there is no retry, no resynchronization and no read
//! timeout. The device is owned by the [`Monitor`] and closed when it is
//! dropped, so it is released exactly once on every exit path.

use crate::error::{DeviceError, MonitorError};
use crate::hid::HidDevice;
use protocol::{FRAME_LEN, Measurement, decode_frame, init_feature_report};
use std::convert::Infallible;
use std::io::Write;
use tracing::{debug, info, trace};

/// Counters for one monitoring session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MonitorStats {
    /// Full reports read from the device
    pub frames_read: u64,
    /// Measurement lines written
    pub measurements_emitted: u64,
    /// Valid reports with a tag that carries no known metric
    pub unknown_tags: u64,
}

/// Reads reports from a device and writes measurement lines to `out`
pub struct Monitor<D, W> {
    device: D,
    out: W,
    stats: MonitorStats,
}

impl<D: HidDevice, W: Write> Monitor<D, W> {
    pub fn new(device: D, out: W) -> Self {
        Self {
            device,
            out,
            stats: MonitorStats::default(),
        }
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    /// Send the feature report that starts the report stream
    pub fn initialize(&mut self) -> Result<(), MonitorError> {
        self.device
            .set_feature_report(&init_feature_report())
            .map_err(DeviceError::FeatureSet)?;
        debug!("Sent init feature report");
        Ok(())
    }

    /// Read, validate and emit one report
    ///
    /// Returns the emitted measurement, or `None` for an unknown tag.
    pub fn step(&mut self) -> Result<Option<Measurement>, MonitorError> {
        let mut report = [0u8; FRAME_LEN];
        let count = self
            .device
            .read_report(&mut report)
            .map_err(DeviceError::Read)?;
        if count != FRAME_LEN {
            return Err(DeviceError::ShortRead {
                expected: FRAME_LEN,
                actual: count,
            }
            .into());
        }
        self.stats.frames_read += 1;

        let frame = decode_frame(&report)?;

        let Some(measurement) = frame.measurement() else {
            trace!("Ignoring report with tag 0x{:02x}", frame.tag);
            self.stats.unknown_tags += 1;
            return Ok(None);
        };

        writeln!(self.out, "{}", measurement)
            .and_then(|_| self.out.flush())
            .map_err(MonitorError::Output)?;
        self.stats.measurements_emitted += 1;

        Ok(Some(measurement))
    }

    /// Initialize, then decode reports until an error ends the session
    ///
    /// The device is closed before this returns.
    pub fn run(mut self) -> Result<Infallible, MonitorError> {
        self.initialize()?;
        info!("Reading measurements");

        loop {
            if let Err(e) = self.step() {
                debug!(
                    "Session ended after {} frame(s), {} measurement(s), {} unknown tag(s)",
                    self.stats.frames_read,
                    self.stats.measurements_emitted,
                    self.stats.unknown_tags
                );
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::mock::{MockDevice, MockRead};
    use protocol::{FrameError, encode_frame};
    use std::io;

    #[test]
    fn test_initialize_sends_zeroed_feature_report() {
        let device = MockDevice::sensor();
        let log = device.log();
        let mut monitor = Monitor::new(device, Vec::new());

        monitor.initialize().unwrap();
        assert_eq!(log.feature_reports(), vec![vec![0u8; 9]]);
    }

    #[test]
    fn test_step_emits_line() {
        let device = MockDevice::sensor().with_report(encode_frame(0x50, 400));
        let mut monitor = Monitor::new(device, Vec::new());

        let m = monitor.step().unwrap();
        assert_eq!(m, Some(Measurement::Co2 { ppm: 400 }));
        assert_eq!(String::from_utf8(monitor.out.clone()).unwrap(), "C 400 ppm\n");
        assert_eq!(monitor.stats().measurements_emitted, 1);
    }

    #[test]
    fn test_step_skips_unknown_tag() {
        let device = MockDevice::sensor().with_report(encode_frame(0x99, 7));
        let mut monitor = Monitor::new(device, Vec::new());

        assert_eq!(monitor.step().unwrap(), None);
        assert!(monitor.out.is_empty());
        assert_eq!(monitor.stats().unknown_tags, 1);
        assert_eq!(monitor.stats().frames_read, 1);
    }

    #[test]
    fn test_partial_read_is_short_read() {
        let device = MockDevice::sensor().with_read(MockRead::Data(vec![0x50, 0x01, 0x90]));
        let mut monitor = Monitor::new(device, Vec::new());

        assert!(matches!(
            monitor.step(),
            Err(MonitorError::Device(DeviceError::ShortRead {
                expected: 8,
                actual: 3
            }))
        ));
    }

    #[test]
    fn test_read_error() {
        let device = MockDevice::sensor().with_read(MockRead::Error(io::ErrorKind::Other));
        let mut monitor = Monitor::new(device, Vec::new());

        assert!(matches!(
            monitor.step(),
            Err(MonitorError::Device(DeviceError::Read(_)))
        ));
    }

    #[test]
    fn test_checksum_error_is_terminal() {
        let device = MockDevice::sensor()
            .with_report([0x50, 0x01, 0x90, 0x51, 0x0d, 0, 0, 0])
            .with_report(encode_frame(0x50, 400));
        let monitor = Monitor::new(device, Vec::new());

        let result: Result<Infallible, MonitorError> = monitor.run();
        let Err(err) = result;
        assert!(matches!(
            err,
            MonitorError::Frame(FrameError::ChecksumMismatch {
                expected: 0x51,
                computed: 0xe1
            })
        ));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_output_failure() {
        let device = MockDevice::sensor().with_report(encode_frame(0x41, 4512));
        let mut monitor = Monitor::new(device, FailingWriter);

        assert!(matches!(monitor.step(), Err(MonitorError::Output(_))));
    }
}
