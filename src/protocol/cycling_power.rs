//! Cycling Power Measurement (0x2A63)
//!
//! Two flag bytes, then instantaneous power which is always present. The
//! optional fields follow in flag-bit order. Bits 1 and 3 only qualify other
//! fields (balance reference, torque source) and carry no data, so they are
//! skipped. Fields above bit 7 are not decoded.

use bytes::{BufMut, Bytes, BytesMut};

use super::{cursor::ByteCursor, flags::FlagField};
use crate::{
    error::DecodeError,
    types::{CrankRevolutions, MagnitudeRange, PowerSample, WheelRevolutions},
};

const POWER_BALANCE: u8 = 0;
const ACCUMULATED_TORQUE: u8 = 2;
const WHEEL_REVOLUTIONS: u8 = 4;
const CRANK_REVOLUTIONS: u8 = 5;
const FORCE_MAGNITUDES: u8 = 6;
const TORQUE_MAGNITUDES: u8 = 7;

/// Decode a Cycling Power Measurement value
///
/// # Errors
///
/// Returns [`DecodeError::TruncatedPacket`] if the packet ends before a field
/// its flags announce.
pub fn decode_cycling_power(data: &[u8]) -> Result<PowerSample, DecodeError> {
    let mut cursor = ByteCursor::new(data);
    let flags = FlagField::read_u16(&mut cursor)?;
    let power = cursor.read_i16()?;

    let power_balance = if flags.is_set(POWER_BALANCE) {
        Some(cursor.read_u8()?)
    } else {
        None
    };

    let accumulated_torque = if flags.is_set(ACCUMULATED_TORQUE) {
        Some(cursor.read_u16()?)
    } else {
        None
    };

    let wheel = if flags.is_set(WHEEL_REVOLUTIONS) {
        Some(WheelRevolutions {
            revolutions: cursor.read_u32()?,
            last_event_time: cursor.read_u16()?,
        })
    } else {
        None
    };

    let crank = if flags.is_set(CRANK_REVOLUTIONS) {
        Some(CrankRevolutions {
            revolutions: cursor.read_u16()?,
            last_event_time: cursor.read_u16()?,
        })
    } else {
        None
    };

    let force_range = if flags.is_set(FORCE_MAGNITUDES) {
        Some(read_range(&mut cursor)?)
    } else {
        None
    };

    let torque_range = if flags.is_set(TORQUE_MAGNITUDES) {
        Some(read_range(&mut cursor)?)
    } else {
        None
    };

    Ok(PowerSample {
        power,
        power_balance,
        accumulated_torque,
        wheel,
        crank,
        force_range,
        torque_range,
    })
}

fn read_range(cursor: &mut ByteCursor<'_>) -> Result<MagnitudeRange, DecodeError> {
    Ok(MagnitudeRange {
        max: cursor.read_i16()?,
        min: cursor.read_i16()?,
    })
}

impl PowerSample {
    /// Encode as a Cycling Power Measurement value
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        let flags = FlagField::default()
            .with(POWER_BALANCE, self.power_balance.is_some())
            .with(ACCUMULATED_TORQUE, self.accumulated_torque.is_some())
            .with(WHEEL_REVOLUTIONS, self.wheel.is_some())
            .with(CRANK_REVOLUTIONS, self.crank.is_some())
            .with(FORCE_MAGNITUDES, self.force_range.is_some())
            .with(TORQUE_MAGNITUDES, self.torque_range.is_some());

        let mut buf = BytesMut::with_capacity(24);
        buf.put_u16_le(flags.bits());
        buf.put_i16_le(self.power);

        if let Some(balance) = self.power_balance {
            buf.put_u8(balance);
        }
        if let Some(torque) = self.accumulated_torque {
            buf.put_u16_le(torque);
        }
        if let Some(wheel) = self.wheel {
            buf.put_u32_le(wheel.revolutions);
            buf.put_u16_le(wheel.last_event_time);
        }
        if let Some(crank) = self.crank {
            buf.put_u16_le(crank.revolutions);
            buf.put_u16_le(crank.last_event_time);
        }
        for range in [self.force_range, self.torque_range].into_iter().flatten() {
            buf.put_i16_le(range.max);
            buf.put_i16_le(range.min);
        }

        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_only() {
        let sample = decode_cycling_power(&[0x00, 0x00, 0xFA, 0x00]).unwrap();
        assert_eq!(sample.power, 250);
        assert_eq!(sample, PowerSample { power: 250, ..Default::default() });
    }

    #[test]
    fn test_negative_power() {
        let sample = decode_cycling_power(&[0x00, 0x00, 0xF6, 0xFF]).unwrap();
        assert_eq!(sample.power, -10);
    }

    #[test]
    fn test_wheel_pair_follows_power() {
        let mut data = vec![0x10, 0x00];
        data.extend_from_slice(&100i16.to_le_bytes());
        data.extend_from_slice(&500_000u32.to_le_bytes());
        data.extend_from_slice(&1000u16.to_le_bytes());

        let sample = decode_cycling_power(&data).unwrap();
        assert_eq!(sample.power, 100);
        assert_eq!(
            sample.wheel,
            Some(WheelRevolutions {
                revolutions: 500_000,
                last_event_time: 1000,
            })
        );
        assert_eq!(sample.power_balance, None);
        assert_eq!(sample.accumulated_torque, None);
        assert_eq!(sample.crank, None);
    }

    #[test]
    fn test_reserved_bits_ignored() {
        // Bits 1 and 3 set alongside bit 5: crank data must still sit right after power
        let data = [0x2A, 0x00, 0xC8, 0x00, 0x0A, 0x00, 0x00, 0x04];
        let sample = decode_cycling_power(&data).unwrap();
        assert_eq!(sample.power, 200);
        assert_eq!(
            sample.crank,
            Some(CrankRevolutions {
                revolutions: 10,
                last_event_time: 1024,
            })
        );
        assert_eq!(sample.power_balance, None);
        assert_eq!(sample.accumulated_torque, None);
    }

    #[test]
    fn test_high_flag_bits_ignored() {
        let data = [0x00, 0x01, 0x64, 0x00];
        let sample = decode_cycling_power(&data).unwrap();
        assert_eq!(sample, PowerSample { power: 100, ..Default::default() });
    }

    #[test]
    fn test_all_fields_in_order() {
        let data = [
            0xF5, 0x00, // flags: bits 0, 2, 4, 5, 6, 7
            0x2C, 0x01, // power 300
            0x64, // balance 100
            0x40, 0x00, // accumulated torque 64
            0x01, 0x00, 0x00, 0x00, 0x02, 0x00, // wheel 1 @ 2
            0x03, 0x00, 0x04, 0x00, // crank 3 @ 4
            0x32, 0x00, 0xF6, 0xFF, // force 50 / -10
            0x14, 0x00, 0xFB, 0xFF, // torque 20 / -5
        ];
        let sample = decode_cycling_power(&data).unwrap();
        assert_eq!(
            sample,
            PowerSample {
                power: 300,
                power_balance: Some(100),
                accumulated_torque: Some(64),
                wheel: Some(WheelRevolutions {
                    revolutions: 1,
                    last_event_time: 2,
                }),
                crank: Some(CrankRevolutions {
                    revolutions: 3,
                    last_event_time: 4,
                }),
                force_range: Some(MagnitudeRange { max: 50, min: -10 }),
                torque_range: Some(MagnitudeRange { max: 20, min: -5 }),
            }
        );
        assert_eq!(&sample.to_bytes()[..], &data[..]);
    }

    #[test]
    fn test_truncated_packets() {
        assert!(matches!(
            decode_cycling_power(&[0x00]),
            Err(DecodeError::TruncatedPacket { offset: 0, needed: 2, .. })
        ));
        assert!(matches!(
            decode_cycling_power(&[0x00, 0x00, 0xFA]),
            Err(DecodeError::TruncatedPacket { offset: 2, .. })
        ));
        // Wheel revolutions present but event time cut short
        let data = [0x10, 0x00, 0x64, 0x00, 0x20, 0xA1, 0x07, 0x00, 0xE8];
        assert!(matches!(
            decode_cycling_power(&data),
            Err(DecodeError::TruncatedPacket { offset: 8, needed: 2, remaining: 1 })
        ));
    }

    #[test]
    fn test_encode_round_trip() {
        let sample = PowerSample {
            power: 215,
            power_balance: None,
            accumulated_torque: Some(9000),
            wheel: None,
            crank: Some(CrankRevolutions {
                revolutions: 812,
                last_event_time: 40_000,
            }),
            force_range: None,
            torque_range: Some(MagnitudeRange { max: 900, min: 120 }),
        };
        assert_eq!(decode_cycling_power(&sample.to_bytes()).unwrap(), sample);
    }

    fn sample_for_flags(mask: u8) -> PowerSample {
        let has = |bit: u8| mask & (1 << bit) != 0;
        PowerSample {
            power: -1234,
            power_balance: has(POWER_BALANCE).then_some(0x5A),
            accumulated_torque: has(ACCUMULATED_TORQUE).then_some(0xBEEF),
            wheel: has(WHEEL_REVOLUTIONS).then_some(WheelRevolutions {
                revolutions: 0x0102_0304,
                last_event_time: 0x0506,
            }),
            crank: has(CRANK_REVOLUTIONS).then_some(CrankRevolutions {
                revolutions: 0x0708,
                last_event_time: 0x090A,
            }),
            force_range: has(FORCE_MAGNITUDES).then_some(MagnitudeRange { max: 321, min: -321 }),
            torque_range: has(TORQUE_MAGNITUDES).then_some(MagnitudeRange { max: 77, min: -88 }),
        }
    }

    #[test]
    fn test_every_flag_combination() {
        let fields = [
            POWER_BALANCE,
            ACCUMULATED_TORQUE,
            WHEEL_REVOLUTIONS,
            CRANK_REVOLUTIONS,
            FORCE_MAGNITUDES,
            TORQUE_MAGNITUDES,
        ];

        for combination in 0u8..64 {
            let mask = fields
                .iter()
                .enumerate()
                .filter(|(i, _)| combination & (1 << i) != 0)
                .fold(0u8, |mask, (_, bit)| mask | (1 << bit));
            let sample = sample_for_flags(mask);
            let data = sample.to_bytes();

            assert_eq!(u16::from(mask), u16::from_le_bytes([data[0], data[1]]));
            assert_eq!(decode_cycling_power(&data).unwrap(), sample, "flags {mask:#04X}");

            for len in 0..data.len() {
                assert!(
                    matches!(
                        decode_cycling_power(&data[..len]),
                        Err(DecodeError::TruncatedPacket { .. })
                    ),
                    "flags {mask:#04X} accepted {len} of {} bytes",
                    data.len()
                );
            }
        }
    }
}
