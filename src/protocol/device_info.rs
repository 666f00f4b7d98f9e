//! Read-once characteristics: battery level, body sensor location and the
//! Device Information strings.

use super::cursor::ByteCursor;
use crate::{error::DecodeError, types::BodySensorLocation};

/// Decode a Battery Level (0x2A19) value
///
/// Values above 100 are passed through; some sensors report 0xFF when the
/// level is unknown.
///
/// # Errors
///
/// Returns [`DecodeError::TruncatedPacket`] on an empty value.
pub fn decode_battery_level(data: &[u8]) -> Result<u8, DecodeError> {
    ByteCursor::new(data).read_u8()
}

/// Decode a Body Sensor Location (0x2A38) value
///
/// # Errors
///
/// Returns [`DecodeError::TruncatedPacket`] on an empty value.
pub fn decode_body_location(data: &[u8]) -> Result<BodySensorLocation, DecodeError> {
    ByteCursor::new(data).read_u8().map(BodySensorLocation::from)
}

/// Decode a UTF-8 string characteristic
///
/// Invalid sequences are replaced and trailing NUL padding is dropped.
#[must_use]
pub fn decode_string(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(ByteCursor::new(data).read_rest());
    text.trim_end_matches('\0').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_battery_level() {
        assert_eq!(decode_battery_level(&[87]).unwrap(), 87);
        assert!(decode_battery_level(&[]).is_err());
    }

    #[test]
    fn test_body_location() {
        assert_eq!(decode_body_location(&[1]).unwrap(), BodySensorLocation::Chest);
        assert_eq!(decode_body_location(&[42]).unwrap(), BodySensorLocation::Unknown);
        assert!(matches!(
            decode_body_location(&[]),
            Err(DecodeError::TruncatedPacket { needed: 1, remaining: 0, .. })
        ));
    }

    #[test]
    fn test_strings() {
        assert_eq!(decode_string(b"Polar Electro Oy\0\0"), "Polar Electro Oy");
        assert_eq!(decode_string(b""), "");
        assert_eq!(decode_string(&[b'v', 0xFF, b'1']), "v\u{FFFD}1");
    }
}
