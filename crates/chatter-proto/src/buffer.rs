//! Typed buffer primitives.
//!
//! All integers are big-endian. Strings are encoded as a `u32` byte length
//! followed by that many bytes of UTF-8. Reads are bounds-checked and fail
//! with [`ProtoError`] on truncated input; a failed read poisons nothing,
//! but callers are expected to abandon the whole frame.

use crate::error::{ProtoError, Result};
use bytes::{BufMut, Bytes, BytesMut};

/// Upper bound on a single length-prefixed string, in bytes.
///
/// Usernames, hostnames, and channel names are all short; a declared length
/// beyond this is a malformed or hostile frame.
pub const MAX_STRING_LEN: usize = 4096;

/// Append-only typed buffer for building outbound payloads.
#[derive(Debug, Default)]
pub struct BufferWriter {
    buf: BytesMut,
}

impl BufferWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Create a writer with a capacity hint.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Append a `u8`.
    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buf.put_u8(value);
        self
    }

    /// Append a big-endian `u16`.
    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        self.buf.put_u16(value);
        self
    }

    /// Append a big-endian `u32`.
    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.buf.put_u32(value);
        self
    }

    /// Append a length-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) -> &mut Self {
        self.buf.put_u32(value.len() as u32);
        self.buf.put_slice(value.as_bytes());
        self
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finish the buffer, yielding a cheaply-cloneable payload.
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Bounds-checked reader over an inbound payload.
#[derive(Debug)]
pub struct BufferReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BufferReader<'a> {
    /// Wrap a payload slice.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes left unread.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(ProtoError::Truncated {
                needed: len - self.remaining(),
                offset: self.pos,
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Read a `u8`.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a big-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a big-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        let offset = self.pos;
        let len = self.read_u32()? as usize;
        if len > MAX_STRING_LEN {
            return Err(ProtoError::StringTooLong {
                length: len,
                limit: MAX_STRING_LEN,
            });
        }
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| ProtoError::InvalidUtf8 { offset })
    }
}
