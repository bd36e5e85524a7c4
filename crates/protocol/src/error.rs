//! Protocol error types

use thiserror::Error;

/// Frame validation errors
///
/// Every variant is terminal for a monitoring session: the byte stream is
/// never resynchronized after a bad frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Byte at the terminator offset was not 0x0d
    #[error("Missing packet terminator: found 0x{found:02x}, expected 0x0d")]
    MissingTerminator { found: u8 },

    /// Transmitted checksum does not match the sum of tag and value bytes
    #[error("Bad checksum: expected 0x{expected:02x} but got 0x{computed:02x}")]
    ChecksumMismatch { expected: u8, computed: u8 },
}

/// Errors parsing a printed measurement line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty measurement line")]
    Empty,

    #[error("Unknown metric '{0}'")]
    UnknownMetric(String),

    #[error("Missing raw value")]
    MissingValue,

    #[error("Invalid raw value '{0}'")]
    InvalidValue(String),
}

/// Type alias for frame decoding results
pub type Result<T> = std::result::Result<T, FrameError>;
