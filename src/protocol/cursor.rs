use bytes::Buf;

use crate::error::DecodeError;

/// Sequential little-endian reader over one characteristic value
///
/// Every read checks the remaining length first, so a short packet surfaces as
/// [`DecodeError::TruncatedPacket`] instead of a panic. A failed read leaves the
/// position where it was.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the first byte of `data`
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Offset of the next unread byte
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes not yet consumed
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Read an unsigned 8-bit value
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TruncatedPacket`] if the packet is exhausted.
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?.get_u8())
    }

    /// Read an unsigned little-endian 16-bit value
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TruncatedPacket`] if fewer than 2 bytes remain.
    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(self.take(2)?.get_u16_le())
    }

    /// Read a signed little-endian 16-bit value
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TruncatedPacket`] if fewer than 2 bytes remain.
    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        Ok(self.take(2)?.get_i16_le())
    }

    /// Read an unsigned little-endian 32-bit value
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TruncatedPacket`] if fewer than 4 bytes remain.
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(self.take(4)?.get_u32_le())
    }

    /// Consume everything left in the packet
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.position..];
        self.position = self.data.len();
        rest
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(DecodeError::TruncatedPacket {
                offset: self.position,
                needed,
                remaining,
            });
        }

        let chunk = &self.data[self.position..self.position + needed];
        self.position += needed;
        Ok(chunk)
    }
}
