//! Heart Rate Measurement (0x2A37)
//!
//! Layout after the one-byte flag field:
//! - heart rate, `u8` or `u16` depending on bit 0
//! - energy expended `u16` if bit 3
//! - any number of `u16` RR intervals if bit 4
//!
//! Contact state lives entirely in the flags (bit 2 = supported, bit 1 = detected).

use bytes::{BufMut, Bytes, BytesMut};

use super::{cursor::ByteCursor, flags::FlagField};
use crate::{error::DecodeError, types::HeartRateSample};

const RATE_U16: u8 = 0;
const CONTACT_DETECTED: u8 = 1;
const CONTACT_SUPPORTED: u8 = 2;
const ENERGY_EXPENDED: u8 = 3;
const RR_INTERVALS: u8 = 4;

/// Decode a Heart Rate Measurement value
///
/// A trailing odd byte after the RR intervals is ignored.
///
/// # Errors
///
/// Returns [`DecodeError::TruncatedPacket`] if the packet ends before a field
/// its flags announce.
pub fn decode_heart_rate(data: &[u8]) -> Result<HeartRateSample, DecodeError> {
    let mut cursor = ByteCursor::new(data);
    let flags = FlagField::read_u8(&mut cursor)?;

    let heart_rate = if flags.is_set(RATE_U16) {
        cursor.read_u16()?
    } else {
        u16::from(cursor.read_u8()?)
    };

    let contact_detected = flags
        .is_set(CONTACT_SUPPORTED)
        .then(|| flags.is_set(CONTACT_DETECTED));

    let energy_expended = if flags.is_set(ENERGY_EXPENDED) {
        Some(cursor.read_u16()?)
    } else {
        None
    };

    let mut rr_intervals = Vec::new();
    if flags.is_set(RR_INTERVALS) {
        rr_intervals.reserve(cursor.remaining() / 2);
        while cursor.remaining() >= 2 {
            rr_intervals.push(cursor.read_u16()?);
        }
    }

    Ok(HeartRateSample {
        heart_rate,
        contact_detected,
        energy_expended,
        rr_intervals,
    })
}

impl HeartRateSample {
    /// Encode as a Heart Rate Measurement value
    ///
    /// The 16-bit heart-rate format is used only when the value does not fit
    /// in a byte.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        let wide = self.heart_rate > u16::from(u8::MAX);
        let flags = FlagField::default()
            .with(RATE_U16, wide)
            .with(CONTACT_SUPPORTED, self.contact_detected.is_some())
            .with(CONTACT_DETECTED, self.contact_detected == Some(true))
            .with(ENERGY_EXPENDED, self.energy_expended.is_some())
            .with(RR_INTERVALS, !self.rr_intervals.is_empty());

        let mut buf = BytesMut::with_capacity(6 + 2 * self.rr_intervals.len());
        buf.put_u8(flags.bits() as u8);

        if wide {
            buf.put_u16_le(self.heart_rate);
        } else {
            buf.put_u8(self.heart_rate as u8);
        }

        if let Some(energy) = self.energy_expended {
            buf.put_u16_le(energy);
        }

        for rr in &self.rr_intervals {
            buf.put_u16_le(*rr);
        }

        buf.freeze()
    }
}
