//! Indoor Bike Data (0x2AD2)
//!
//! Two flag bytes, then instantaneous speed which is always decoded. Bit 0 is
//! not consulted for it. Bits 1 through 7 gate the remaining fields in
//! ascending order; higher bits are not decoded.

use bytes::{BufMut, Bytes, BytesMut};

use super::{cursor::ByteCursor, flags::FlagField};
use crate::{
    error::DecodeError,
    types::{BikeSample, TotalDistance},
};

const AVERAGE_SPEED: u8 = 1;
const INSTANTANEOUS_CADENCE: u8 = 2;
const AVERAGE_CADENCE: u8 = 3;
const TOTAL_DISTANCE: u8 = 4;
const RESISTANCE_LEVEL: u8 = 5;
const INSTANTANEOUS_POWER: u8 = 6;
const AVERAGE_POWER: u8 = 7;

/// Decode an Indoor Bike Data value
///
/// # Errors
///
/// Returns [`DecodeError::TruncatedPacket`] if the packet ends before a field
/// its flags announce.
pub fn decode_indoor_bike(data: &[u8]) -> Result<BikeSample, DecodeError> {
    let mut cursor = ByteCursor::new(data);
    let flags = FlagField::read_u16(&mut cursor)?;
    let instantaneous_speed = cursor.read_i16()?;

    let average_speed = read_if(flags, AVERAGE_SPEED, || cursor.read_u16())?;
    let cadence = read_if(flags, INSTANTANEOUS_CADENCE, || cursor.read_u16())?;
    let average_cadence = read_if(flags, AVERAGE_CADENCE, || cursor.read_u16())?;
    let total_distance = read_if(flags, TOTAL_DISTANCE, || {
        Ok(TotalDistance {
            low: cursor.read_u16()?,
            high: cursor.read_u8()?,
        })
    })?;
    let resistance_level = read_if(flags, RESISTANCE_LEVEL, || cursor.read_i16())?;
    let instantaneous_power = read_if(flags, INSTANTANEOUS_POWER, || cursor.read_i16())?;
    let average_power = read_if(flags, AVERAGE_POWER, || cursor.read_i16())?;

    Ok(BikeSample {
        instantaneous_speed,
        average_speed,
        cadence,
        average_cadence,
        total_distance,
        resistance_level,
        instantaneous_power,
        average_power,
    })
}

fn read_if<T>(
    flags: FlagField,
    bit: u8,
    read: impl FnOnce() -> Result<T, DecodeError>,
) -> Result<Option<T>, DecodeError> {
    if flags.is_set(bit) {
        read().map(Some)
    } else {
        Ok(None)
    }
}

impl BikeSample {
    /// Encode as an Indoor Bike Data value
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        let flags = FlagField::default()
            .with(AVERAGE_SPEED, self.average_speed.is_some())
            .with(INSTANTANEOUS_CADENCE, self.cadence.is_some())
            .with(AVERAGE_CADENCE, self.average_cadence.is_some())
            .with(TOTAL_DISTANCE, self.total_distance.is_some())
            .with(RESISTANCE_LEVEL, self.resistance_level.is_some())
            .with(INSTANTANEOUS_POWER, self.instantaneous_power.is_some())
            .with(AVERAGE_POWER, self.average_power.is_some());

        let mut buf = BytesMut::with_capacity(19);
        buf.put_u16_le(flags.bits());
        buf.put_i16_le(self.instantaneous_speed);

        for value in [self.average_speed, self.cadence, self.average_cadence]
            .into_iter()
            .flatten()
        {
            buf.put_u16_le(value);
        }
        if let Some(distance) = self.total_distance {
            buf.put_u16_le(distance.low);
            buf.put_u8(distance.high);
        }
        for value in [
            self.resistance_level,
            self.instantaneous_power,
            self.average_power,
        ]
        .into_iter()
        .flatten()
        {
            buf.put_i16_le(value);
        }

        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_only() {
        let sample = decode_indoor_bike(&[0x00, 0x00, 0xC4, 0x09]).unwrap();
        assert_eq!(sample, BikeSample { instantaneous_speed: 2500, ..Default::default() });
    }

    #[test]
    fn test_speed_decoded_regardless_of_bit_0() {
        let sample = decode_indoor_bike(&[0x01, 0x00, 0xC4, 0x09]).unwrap();
        assert_eq!(sample.instantaneous_speed, 2500);
    }

    #[test]
    fn test_instantaneous_power_offset() {
        let data = [0x40, 0x00, 0xE8, 0x03, 0xB4, 0x00];
        let sample = decode_indoor_bike(&data).unwrap();
        assert_eq!(sample.instantaneous_speed, 1000);
        assert_eq!(sample.instantaneous_power, Some(180));
        assert_eq!(sample.average_speed, None);
        assert_eq!(sample.cadence, None);
        assert_eq!(sample.average_cadence, None);
        assert_eq!(sample.total_distance, None);
        assert_eq!(sample.resistance_level, None);
        assert_eq!(sample.average_power, None);
    }

    #[test]
    fn test_three_byte_distance_shifts_following_fields() {
        let data = [
            0x74, 0x00, // flags: bits 2, 4, 5, 6
            0x10, 0x0E, // speed 3600
            0xB4, 0x00, // cadence 180
            0x45, 0x23, 0x01, // distance 0x012345
            0x0A, 0x00, // resistance 10
            0xFA, 0x00, // power 250
        ];
        let sample = decode_indoor_bike(&data).unwrap();
        assert_eq!(sample.cadence, Some(180));
        assert_eq!(
            sample.total_distance,
            Some(TotalDistance { low: 0x2345, high: 0x01 })
        );
        assert_eq!(sample.total_distance.map(TotalDistance::meters), Some(74_565));
        assert_eq!(sample.resistance_level, Some(10));
        assert_eq!(sample.instantaneous_power, Some(250));
        assert_eq!(&sample.to_bytes()[..], &data[..]);
    }

    #[test]
    fn test_all_fields() {
        let sample = BikeSample {
            instantaneous_speed: 3012,
            average_speed: Some(2870),
            cadence: Some(176),
            average_cadence: Some(170),
            total_distance: Some(TotalDistance::from_meters(12_400)),
            resistance_level: Some(-3),
            instantaneous_power: Some(231),
            average_power: Some(204),
        };
        let bytes = sample.to_bytes();
        assert_eq!(bytes.len(), 19);
        assert_eq!(&bytes[..2], &[0xFE, 0x00]);
        assert_eq!(decode_indoor_bike(&bytes).unwrap(), sample);
    }

    #[test]
    fn test_truncated_packets() {
        assert!(matches!(
            decode_indoor_bike(&[0x40]),
            Err(DecodeError::TruncatedPacket { offset: 0, .. })
        ));
        assert!(matches!(
            decode_indoor_bike(&[0x40, 0x00, 0xE8, 0x03]),
            Err(DecodeError::TruncatedPacket { offset: 4, needed: 2, remaining: 0 })
        ));
        // Distance low word present, high byte missing
        assert!(matches!(
            decode_indoor_bike(&[0x10, 0x00, 0xE8, 0x03, 0x45, 0x23]),
            Err(DecodeError::TruncatedPacket { offset: 6, needed: 1, remaining: 0 })
        ));
    }

    #[test]
    fn test_every_flag_combination() {
        for combination in 0u8..128 {
            let has = |bit: u8| combination & (1 << (bit - 1)) != 0;
            let sample = BikeSample {
                instantaneous_speed: -2001,
                average_speed: has(AVERAGE_SPEED).then_some(0x1112),
                cadence: has(INSTANTANEOUS_CADENCE).then_some(0x2122),
                average_cadence: has(AVERAGE_CADENCE).then_some(0x3132),
                total_distance: has(TOTAL_DISTANCE).then_some(TotalDistance {
                    low: 0x4142,
                    high: 0x43,
                }),
                resistance_level: has(RESISTANCE_LEVEL).then_some(-0x5152),
                instantaneous_power: has(INSTANTANEOUS_POWER).then_some(0x6162),
                average_power: has(AVERAGE_POWER).then_some(-0x7172),
            };
            let data = sample.to_bytes();

            assert_eq!(
                u16::from_le_bytes([data[0], data[1]]),
                u16::from(combination) << 1
            );
            assert_eq!(decode_indoor_bike(&data).unwrap(), sample, "flags {:#04X}", data[0]);

            for len in 0..data.len() {
                assert!(
                    matches!(
                        decode_indoor_bike(&data[..len]),
                        Err(DecodeError::TruncatedPacket { .. })
                    ),
                    "flags {:#04X} accepted {len} of {} bytes",
                    data[0],
                    data.len()
                );
            }
        }
    }
}
