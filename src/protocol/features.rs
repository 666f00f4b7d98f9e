//! Trainer capability characteristics: the feature bitmasks and the
//! supported power range. These are read once after connecting and only
//! logged by the session.

use super::cursor::ByteCursor;
use crate::{
    error::DecodeError,
    types::{FeatureField, PowerRange},
};

/// Decode a feature bitmask
///
/// CSC Feature is 16 bits wide, the others 32. Fitness Machine Feature is
/// followed by a target setting word which is not decoded.
///
/// # Errors
///
/// Returns [`DecodeError::TruncatedPacket`] if the value is shorter than the
/// field's width.
pub fn decode_feature_bits(field: FeatureField, data: &[u8]) -> Result<u32, DecodeError> {
    let mut cursor = ByteCursor::new(data);
    match field {
        FeatureField::CyclingSpeedCadence => cursor.read_u16().map(u32::from),
        FeatureField::CyclingPower | FeatureField::FitnessMachine => cursor.read_u32(),
    }
}

/// Decode a Supported Power Range (0x2AD8) value
///
/// # Errors
///
/// Returns [`DecodeError::TruncatedPacket`] if fewer than 6 bytes are present.
pub fn decode_power_range(data: &[u8]) -> Result<PowerRange, DecodeError> {
    let mut cursor = ByteCursor::new(data);
    Ok(PowerRange {
        min: cursor.read_i16()?,
        max: cursor.read_i16()?,
        increment: cursor.read_u16()?,
    })
}
