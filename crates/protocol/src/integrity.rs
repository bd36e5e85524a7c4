//! Frame checksum
//!
//! The sensor protects each report with an 8-bit additive checksum over the
//! tag byte and the two value bytes. The sum wraps modulo 256.
//!
//! ```
//! use protocol::integrity::{compute_checksum, verify_checksum};
//!
//! assert_eq!(compute_checksum(0x50, 0x01, 0x90), 0xe1);
//! assert!(verify_checksum(0x50, 0x01, 0x90, 0xe1));
//! ```

/// Compute the checksum for a tag and its big-endian value bytes
#[inline]
pub fn compute_checksum(tag: u8, hi: u8, lo: u8) -> u8 {
    tag.wrapping_add(hi).wrapping_add(lo)
}

/// Verify a transmitted checksum
#[inline]
pub fn verify_checksum(tag: u8, hi: u8, lo: u8, expected_checksum: u8) -> bool {
    compute_checksum(tag, hi, lo) == expected_checksum
}
