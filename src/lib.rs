#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

//! # Gattsense
//!
//! Live telemetry from Bluetooth Low Energy fitness sensors: heart-rate
//! monitors, cycling power meters and indoor bike trainers.
//!
//! The heart of the crate is a set of decoders for the Bluetooth SIG
//! characteristic formats these sensors notify:
//!
//! - **Heart Rate Measurement** (0x2A37): 8/16-bit heart rate, contact state,
//!   energy expended and RR intervals
//! - **Cycling Power Measurement** (0x2A63): instantaneous power, pedal balance,
//!   accumulated torque, wheel and crank revolution data, force and torque
//!   extremes
//! - **Indoor Bike Data** (0x2AD2): speed, cadence, distance, resistance and power
//!
//! Each format starts with a flag field that decides which of the trailing
//! fields are present. Decoders are pure functions of the notification buffer
//! and report short buffers as [`DecodeError::TruncatedPacket`].
//!
//! A [`DeviceSession`] dispatches raw values to the right decoder, merges the
//! results into a [`SensorState`] of last known values, and forwards both to
//! caller-supplied callbacks. Transport is a thin layer over `btleplug`.
//!
//! ## Quick Start
//!
//! ```
//! use gattsense::protocol::decode_heart_rate;
//!
//! let sample = decode_heart_rate(&[0x10, 0x3C, 0x20, 0x03, 0x2A, 0x03]).unwrap();
//! assert_eq!(sample.heart_rate, 60);
//! assert_eq!(sample.rr_intervals, vec![800, 810]);
//! ```

/// Bluetooth Low Energy transport
pub mod ble;
/// Error types and handling
pub mod error;
/// Characteristic decoders
pub mod protocol;
/// Session orchestration and dispatch
pub mod session;
/// Last known sensor values
pub mod state;
/// Type definitions and data structures
pub mod types;

// Re-export the main types for convenient usage
pub use ble::{BleManager, Notification, NotificationSource, SensorConnection};
pub use error::{DecodeError, Result, SensorError};
pub use protocol::Characteristic;
pub use session::DeviceSession;
pub use state::SensorState;
pub use types::{
    AuxiliaryStream, BikeSample, BodySensorLocation, ConnectionParams, CrankRevolutions,
    DeviceInfoField, DiscoveredSensor, FeatureField, HeartRateSample, MagnitudeRange,
    Measurement, PowerRange, PowerSample, SensorKind, TotalDistance, WheelRevolutions,
};

use uuid::Uuid;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Heart Rate service (0x180D)
pub const HEART_RATE_SERVICE_UUID: Uuid =
    Uuid::from_u128(0x0000_180d_0000_1000_8000_0080_5f9b_34fb);

/// Battery service (0x180F)
pub const BATTERY_SERVICE_UUID: Uuid = Uuid::from_u128(0x0000_180f_0000_1000_8000_0080_5f9b_34fb);

/// Device Information service (0x180A)
pub const DEVICE_INFORMATION_SERVICE_UUID: Uuid =
    Uuid::from_u128(0x0000_180a_0000_1000_8000_0080_5f9b_34fb);

/// Cycling Power service (0x1818)
pub const CYCLING_POWER_SERVICE_UUID: Uuid =
    Uuid::from_u128(0x0000_1818_0000_1000_8000_0080_5f9b_34fb);

/// Fitness Machine service (0x1826)
pub const FITNESS_MACHINE_SERVICE_UUID: Uuid =
    Uuid::from_u128(0x0000_1826_0000_1000_8000_0080_5f9b_34fb);

/// Cycling Speed and Cadence service (0x1816)
pub const CYCLING_SPEED_CADENCE_SERVICE_UUID: Uuid =
    Uuid::from_u128(0x0000_1816_0000_1000_8000_0080_5f9b_34fb);

/// Heart Rate Measurement characteristic (0x2A37)
pub const HEART_RATE_MEASUREMENT_UUID: Uuid =
    Uuid::from_u128(0x0000_2a37_0000_1000_8000_0080_5f9b_34fb);

/// Body Sensor Location characteristic (0x2A38)
pub const BODY_SENSOR_LOCATION_UUID: Uuid =
    Uuid::from_u128(0x0000_2a38_0000_1000_8000_0080_5f9b_34fb);

/// Battery Level characteristic (0x2A19)
pub const BATTERY_LEVEL_UUID: Uuid = Uuid::from_u128(0x0000_2a19_0000_1000_8000_0080_5f9b_34fb);

/// Cycling Power Measurement characteristic (0x2A63)
pub const CYCLING_POWER_MEASUREMENT_UUID: Uuid =
    Uuid::from_u128(0x0000_2a63_0000_1000_8000_0080_5f9b_34fb);

/// Indoor Bike Data characteristic (0x2AD2)
pub const INDOOR_BIKE_DATA_UUID: Uuid = Uuid::from_u128(0x0000_2ad2_0000_1000_8000_0080_5f9b_34fb);

/// Cycling Power Vector characteristic (0x2A64)
pub const CYCLING_POWER_VECTOR_UUID: Uuid =
    Uuid::from_u128(0x0000_2a64_0000_1000_8000_0080_5f9b_34fb);

/// Cycling Power Feature characteristic (0x2A65)
pub const CYCLING_POWER_FEATURE_UUID: Uuid =
    Uuid::from_u128(0x0000_2a65_0000_1000_8000_0080_5f9b_34fb);

/// CSC Measurement characteristic (0x2A5B)
pub const CSC_MEASUREMENT_UUID: Uuid = Uuid::from_u128(0x0000_2a5b_0000_1000_8000_0080_5f9b_34fb);

/// CSC Feature characteristic (0x2A5C)
pub const CSC_FEATURE_UUID: Uuid = Uuid::from_u128(0x0000_2a5c_0000_1000_8000_0080_5f9b_34fb);

/// Fitness Machine Feature characteristic (0x2ACC)
pub const FITNESS_MACHINE_FEATURE_UUID: Uuid =
    Uuid::from_u128(0x0000_2acc_0000_1000_8000_0080_5f9b_34fb);

/// Supported Power Range characteristic (0x2AD8)
pub const SUPPORTED_POWER_RANGE_UUID: Uuid =
    Uuid::from_u128(0x0000_2ad8_0000_1000_8000_0080_5f9b_34fb);

/// Model Number String characteristic (0x2A24)
pub const MODEL_NUMBER_UUID: Uuid = Uuid::from_u128(0x0000_2a24_0000_1000_8000_0080_5f9b_34fb);

/// Serial Number String characteristic (0x2A25)
pub const SERIAL_NUMBER_UUID: Uuid = Uuid::from_u128(0x0000_2a25_0000_1000_8000_0080_5f9b_34fb);

/// Firmware Revision String characteristic (0x2A26)
pub const FIRMWARE_REVISION_UUID: Uuid =
    Uuid::from_u128(0x0000_2a26_0000_1000_8000_0080_5f9b_34fb);

/// Hardware Revision String characteristic (0x2A27)
pub const HARDWARE_REVISION_UUID: Uuid =
    Uuid::from_u128(0x0000_2a27_0000_1000_8000_0080_5f9b_34fb);

/// Software Revision String characteristic (0x2A28)
pub const SOFTWARE_REVISION_UUID: Uuid =
    Uuid::from_u128(0x0000_2a28_0000_1000_8000_0080_5f9b_34fb);

/// Manufacturer Name String characteristic (0x2A29)
pub const MANUFACTURER_NAME_UUID: Uuid =
    Uuid::from_u128(0x0000_2a29_0000_1000_8000_0080_5f9b_34fb);
