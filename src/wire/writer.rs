//! Frame writer
//!
//! Writes into a buffer sized up front from the message's string
//! byte-lengths and fixed-width fields; encoding never reallocates.

use super::{WireError, WireResult};

/// Appends wire-encoded fields to an exact-capacity buffer.
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    /// Create a writer with the exact capacity the frame will need.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Bytes a string field occupies on the wire: prefix + UTF-8 body.
    pub fn string_size(s: &str) -> usize {
        4 + s.len()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Length-prefixed UTF-8 string. Fails if the byte length does not
    /// fit the u32 prefix.
    pub fn write_string(&mut self, s: &str) -> WireResult<()> {
        let len = u32::try_from(s.len()).map_err(|_| WireError::Overflow(s.len()))?;
        self.write_u32(len);
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    /// Copy already-framed bytes verbatim (used when re-framing a
    /// relayed message).
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
