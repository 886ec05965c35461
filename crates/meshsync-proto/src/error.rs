//! Codec error types.

use thiserror::Error;

/// Errors that can occur when encoding or decoding protocol messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input is too short to hold the expected fields.
    #[error("truncated message: expected at least {expected} bytes, got {actual}")]
    Truncated {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Encoded message would exceed the protocol maximum.
    #[error("message too long: maximum {max} bytes, got {actual}")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length produced.
        actual: usize,
    },

    /// Caller-supplied buffer cannot hold the encoding.
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes the encoding requires.
        needed: usize,
        /// Bytes available in the buffer.
        available: usize,
    },

    /// Unknown packet body tag.
    #[error("unknown packet body tag: 0x{0:02X}")]
    UnknownBody(u8),

    /// Unknown envelope tag.
    #[error("unknown envelope tag: 0x{0:02X}")]
    UnknownEnvelope(u8),

    /// A string field held invalid UTF-8.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,

    /// A string field exceeds the wire limit.
    #[error("string too long: maximum {max} bytes, got {actual}")]
    StringTooLong {
        /// Maximum allowed content length.
        max: usize,
        /// Actual content length.
        actual: usize,
    },
}
