//! Byte buffer utilities for parsing big-endian binary data.
//!
//! The console is a PowerPC machine, so every structure read from emulated
//! memory, every PAD file and every save file is big-endian. `ByteBuffer`
//! is the single place where raw bytes are turned into integers.

use encoding_rs::SHIFT_JIS;
use tracing::debug;

use crate::error::{Error, Result};

/// A position-tracking reader over a big-endian byte slice.
///
/// # Example
///
/// ```
/// use galaxypad_core::process::ByteBuffer;
///
/// let data = [0x12, 0x34, 0x56, 0x78, 0x00, 0x2A];
/// let mut buf = ByteBuffer::new(&data);
///
/// assert_eq!(buf.read_u32().unwrap(), 0x12345678);
/// assert_eq!(buf.read_u16().unwrap(), 42);
/// assert_eq!(buf.position(), 6);
/// ```
pub struct ByteBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of bytes remaining from the current position.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Sets the current read position.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is beyond the buffer length.
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(Error::UnexpectedEof {
                position: self.pos,
                needed: pos.saturating_sub(self.pos),
                len: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.set_position(self.pos.saturating_add(count))
    }

    /// Returns a slice at the specified offset without advancing the position.
    pub fn slice_at(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(&self.data[offset..end]),
            _ => Err(Error::UnexpectedEof {
                position: offset,
                needed: len,
                len: self.data.len(),
            }),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads the specified number of bytes and advances the position.
    ///
    /// # Errors
    ///
    /// Returns an error if there are not enough bytes remaining.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.slice_at(self.pos, count).map_err(|_| Error::UnexpectedEof {
            position: self.pos,
            needed: count,
            len: self.data.len(),
        })?;
        self.pos += count;
        Ok(bytes)
    }

    /// Reads a fixed-size, NUL-padded ASCII name (save block tables).
    pub fn read_padded_name(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_bytes(len)?;
        Ok(decode_shift_jis_to_string(bytes))
    }

    /// Reads an unsigned 32-bit integer at the specified offset without advancing position.
    pub fn read_u32_at(&self, offset: usize) -> Result<u32> {
        let bytes = self.slice_at(offset, 4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Returns the unread tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }
}

/// Decodes Shift-JIS bytes to `String`, stopping at the first NUL.
pub fn decode_shift_jis_to_string(bytes: &[u8]) -> String {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let (decoded, _, had_errors) = SHIFT_JIS.decode(&bytes[..len]);
    if had_errors {
        debug!(
            "Shift-JIS decoding had errors for bytes: {:?}",
            &bytes[..len.min(20)]
        );
    }
    decoded.into_owned()
}
