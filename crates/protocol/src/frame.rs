//! Report frame decoding
//!
//! The sensor streams fixed-size input reports, one measurement per report:
//!
//! ```text
//! [tag: u8][value_hi: u8][value_lo: u8][checksum: u8][terminator: 0x0d][pad: 3 bytes]
//! ```
//!
//! Validation runs in a fixed order: terminator first, then checksum. A frame
//! with a bad terminator is rejected even if its checksum happens to be right.

use crate::error::{FrameError, Result};
use crate::integrity::compute_checksum;
use crate::measurement::Measurement;

/// Size of one input report in bytes
pub const FRAME_LEN: usize = 8;

/// Fixed value of the terminator byte
pub const FRAME_TERMINATOR: u8 = 0x0d;

const TAG_OFFSET: usize = 0;
const VALUE_HI_OFFSET: usize = 1;
const VALUE_LO_OFFSET: usize = 2;
const CHECKSUM_OFFSET: usize = 3;
const TERMINATOR_OFFSET: usize = 4;

/// A validated report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Measurement tag
    pub tag: u8,
    /// Raw value, assembled big-endian from the two value bytes
    pub value: u16,
    /// Transmitted checksum (already verified)
    pub checksum: u8,
}

impl Frame {
    /// Typed measurement carried by this frame
    ///
    /// Returns `None` for tags the sensor emits but that carry no known metric.
    pub fn measurement(&self) -> Option<Measurement> {
        Measurement::from_tagged(self.tag, self.value)
    }
}

/// Validate and decode one report
///
/// # Example
/// ```
/// use protocol::{FrameError, decode_frame};
///
/// let frame = decode_frame(&[0x41, 0x11, 0xa0, 0xf2, 0x0d, 0, 0, 0]).unwrap();
/// assert_eq!(frame.value, 0x11a0);
///
/// let err = decode_frame(&[0x41, 0x11, 0xa0, 0xf2, 0x00, 0, 0, 0]).unwrap_err();
/// assert_eq!(err, FrameError::MissingTerminator { found: 0x00 });
/// ```
pub fn decode_frame(report: &[u8; FRAME_LEN]) -> Result<Frame> {
    let terminator = report[TERMINATOR_OFFSET];
    if terminator != FRAME_TERMINATOR {
        return Err(FrameError::MissingTerminator { found: terminator });
    }

    let tag = report[TAG_OFFSET];
    let hi = report[VALUE_HI_OFFSET];
    let lo = report[VALUE_LO_OFFSET];
    let checksum = report[CHECKSUM_OFFSET];

    let computed = compute_checksum(tag, hi, lo);
    if computed != checksum {
        return Err(FrameError::ChecksumMismatch {
            expected: checksum,
            computed,
        });
    }

    Ok(Frame {
        tag,
        value: u16::from_be_bytes([hi, lo]),
        checksum,
    })
}

/// Build a well-formed report for a tag and raw value
///
/// Padding bytes are zero. Used by device simulators and tests.
pub fn encode_frame(tag: u8, value: u16) -> [u8; FRAME_LEN] {
    let [hi, lo] = value.to_be_bytes();
    let mut report = [0u8; FRAME_LEN];
    report[TAG_OFFSET] = tag;
    report[VALUE_HI_OFFSET] = hi;
    report[VALUE_LO_OFFSET] = lo;
    report[CHECKSUM_OFFSET] = compute_checksum(tag, hi, lo);
    report[TERMINATOR_OFFSET] = FRAME_TERMINATOR;
    report
}
