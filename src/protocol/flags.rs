use super::cursor::ByteCursor;
use crate::error::DecodeError;

/// Leading flag bits of a measurement characteristic
///
/// Bit numbering starts at the least significant bit. The flags are read once
/// per packet and then queried by bit position; each decoder names its own bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagField(u16);

impl FlagField {
    /// Wrap a raw flag value
    #[must_use]
    pub const fn new(bits: u16) -> Self {
        Self(bits)
    }

    /// Read a one-byte flag field
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TruncatedPacket`] on an empty packet.
    pub fn read_u8(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        cursor.read_u8().map(|bits| Self(u16::from(bits)))
    }

    /// Read a two-byte little-endian flag field
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TruncatedPacket`] if fewer than 2 bytes remain.
    pub fn read_u16(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        cursor.read_u16().map(Self)
    }

    /// Check whether `bit` is set
    #[must_use]
    pub const fn is_set(self, bit: u8) -> bool {
        bit < 16 && (self.0 >> bit) & 1 != 0
    }

    /// Get the raw flag value
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Return a copy with `bit` set when `condition` holds
    ///
    /// Bits outside the 16-bit field are ignored.
    #[must_use]
    pub const fn with(self, bit: u8, condition: bool) -> Self {
        if condition && bit < 16 {
            Self(self.0 | (1 << bit))
        } else {
            self
        }
    }
}
