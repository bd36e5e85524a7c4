//! Wire protocol for zyTemp-family USB CO2 monitors
//!
//! This crate describes the reports exchanged with the sensor over its raw HID
//! interface. It performs no I/O: callers hand it the bytes they read from the
//! device and get back validated frames and typed measurements.
//!
//! # Example
//!
//! ```
//! use protocol::{Measurement, decode_frame};
//!
//! // CO2 report: tag 0x50, value 0x0190 (400 ppm), checksum, terminator, padding
//! let report = [0x50, 0x01, 0x90, 0xe1, 0x0d, 0x00, 0x00, 0x00];
//!
//! let frame = decode_frame(&report).unwrap();
//! assert_eq!(frame.value, 400);
//! assert_eq!(frame.measurement(), Some(Measurement::Co2 { ppm: 400 }));
//! assert_eq!(frame.measurement().unwrap().to_string(), "C 400 ppm");
//! ```
//!
//! # Output Lines
//!
//! Measurements render to the line format printed by the monitor and can be
//! parsed back by downstream consumers of that stream:
//!
//! ```
//! use protocol::Measurement;
//!
//! let m: Measurement = "T 4737 (22.91 °C)".parse().unwrap();
//! assert_eq!(m, Measurement::Temperature { raw: 4737 });
//! ```

pub mod device;
pub mod error;
pub mod frame;
pub mod integrity;
pub mod measurement;

pub use device::{
    DEFAULT_CANDIDATE_COUNT, DEFAULT_CANDIDATE_PREFIX, DeviceIdentity, FEATURE_REPORT_LEN,
    SENSOR_PRODUCT_ID, SENSOR_VENDOR_ID, init_feature_report,
};
pub use error::{FrameError, ParseError, Result};
pub use frame::{FRAME_LEN, FRAME_TERMINATOR, Frame, decode_frame, encode_frame};
pub use integrity::{compute_checksum, verify_checksum};
pub use measurement::{Measurement, TAG_CO2, TAG_HUMIDITY, TAG_TEMPERATURE};
