//! Wire primitives shared by all message codecs.
//!
//! All multi-byte integers are little-endian. Strings are length-prefixed:
//! one length byte followed by that many bytes of UTF-8, content capped at
//! [`MAX_STRING_LEN`].
//!
//! A zero-length payload is never a valid message encoding; the service layer
//! reserves it as the universal "empty / exhausted" sentinel.

use bytes::BufMut;

use crate::error::CodecError;

/// Maximum content length of a wire string, excluding the length prefix.
pub const MAX_STRING_LEN: usize = 40;

/// Upper bound on any single channel payload across every schema in the
/// system. Callers sizing read buffers should use this.
pub const MAX_CHANNEL_PAYLOAD: usize = 512;

/// A message that can be encoded to and decoded from its compact wire form.
pub trait WireCodec: Sized {
    /// Encode the message to a freshly allocated buffer.
    fn encode(&self) -> Vec<u8>;

    /// Decode a message from bytes.
    fn decode(data: &[u8]) -> Result<Self, CodecError>;

    /// Encode into a caller-supplied buffer, returning the byte count.
    ///
    /// Never blocks. Fails without touching `buf` if the encoding exceeds
    /// [`MAX_CHANNEL_PAYLOAD`] or does not fit in `buf`.
    fn encode_into(&self, buf: &mut [u8]) -> Result<usize, CodecError> {
        let bytes = self.encode();
        if bytes.len() > MAX_CHANNEL_PAYLOAD {
            return Err(CodecError::TooLong {
                max: MAX_CHANNEL_PAYLOAD,
                actual: bytes.len(),
            });
        }
        if bytes.len() > buf.len() {
            return Err(CodecError::BufferTooSmall {
                needed: bytes.len(),
                available: buf.len(),
            });
        }
        buf[..bytes.len()].copy_from_slice(&bytes);
        Ok(bytes.len())
    }
}

/// Append a length-prefixed string, truncating oversized content to the wire
/// limit at a character boundary.
pub(crate) fn put_string(buf: &mut Vec<u8>, s: &str) {
    let s = clamp_str(s);
    buf.put_u8(s.len() as u8);
    buf.extend_from_slice(s.as_bytes());
}

/// Truncate a string to [`MAX_STRING_LEN`] bytes at a character boundary.
pub(crate) fn clamp_str(s: &str) -> &str {
    if s.len() <= MAX_STRING_LEN {
        return s;
    }
    let mut end = MAX_STRING_LEN;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Read one byte and advance.
pub(crate) fn take_u8(data: &[u8], at: &mut usize) -> Result<u8, CodecError> {
    if data.len() < *at + 1 {
        return Err(CodecError::Truncated {
            expected: *at + 1,
            actual: data.len(),
        });
    }
    let v = data[*at];
    *at += 1;
    Ok(v)
}

/// Read one signed byte and advance.
pub(crate) fn take_i8(data: &[u8], at: &mut usize) -> Result<i8, CodecError> {
    Ok(take_u8(data, at)? as i8)
}

/// Read a little-endian u32 and advance.
pub(crate) fn take_u32(data: &[u8], at: &mut usize) -> Result<u32, CodecError> {
    if data.len() < *at + 4 {
        return Err(CodecError::Truncated {
            expected: *at + 4,
            actual: data.len(),
        });
    }
    let v = u32::from_le_bytes([data[*at], data[*at + 1], data[*at + 2], data[*at + 3]]);
    *at += 4;
    Ok(v)
}

/// Read a little-endian i32 and advance.
pub(crate) fn take_i32(data: &[u8], at: &mut usize) -> Result<i32, CodecError> {
    Ok(take_u32(data, at)? as i32)
}

/// Read a length-prefixed string and advance.
pub(crate) fn take_string(data: &[u8], at: &mut usize) -> Result<String, CodecError> {
    let len = take_u8(data, at)? as usize;
    if len > MAX_STRING_LEN {
        return Err(CodecError::StringTooLong {
            max: MAX_STRING_LEN,
            actual: len,
        });
    }
    if data.len() < *at + len {
        return Err(CodecError::Truncated {
            expected: *at + len,
            actual: data.len(),
        });
    }
    let s = std::str::from_utf8(&data[*at..*at + len])
        .map_err(|_| CodecError::InvalidUtf8)?
        .to_string();
    *at += len;
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_u32_requires_four_bytes() {
        let mut at = 0;
        let err = take_u32(&[1, 2, 3], &mut at).unwrap_err();
        assert_eq!(
            err,
            CodecError::Truncated {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn take_string_rejects_bad_utf8() {
        // length 2, then an invalid UTF-8 sequence
        let mut at = 0;
        let err = take_string(&[2, 0xC3, 0x28], &mut at).unwrap_err();
        assert_eq!(err, CodecError::InvalidUtf8);
    }

    #[test]
    fn take_string_rejects_oversized_length() {
        let mut at = 0;
        let data = [41u8; 64];
        let err = take_string(&data, &mut at).unwrap_err();
        assert_eq!(
            err,
            CodecError::StringTooLong {
                max: MAX_STRING_LEN,
                actual: 41
            }
        );
    }

    #[test]
    fn put_take_string_roundtrip() {
        let mut buf = Vec::new();
        put_string(&mut buf, "!node-a1");
        let mut at = 0;
        assert_eq!(take_string(&buf, &mut at).unwrap(), "!node-a1");
        assert_eq!(at, buf.len());
    }
}
