//! GATT characteristic decoding
//!
//! Each supported characteristic maps to one pure decode function. Decoders
//! borrow the notification buffer for the duration of the call, never retain
//! it, and never touch session state; merging is the session's job.

/// Little-endian packet reader
pub mod cursor;
/// Cycling Power Measurement decoder
pub mod cycling_power;
/// Battery, body location and Device Information decoders
pub mod device_info;
/// Trainer feature and power range decoders
pub mod features;
/// Flag field bit tests
pub mod flags;
/// Heart Rate Measurement decoder
pub mod heart_rate;
/// Indoor Bike Data decoder
pub mod indoor_bike;

pub use cursor::ByteCursor;
pub use cycling_power::decode_cycling_power;
pub use device_info::{decode_battery_level, decode_body_location, decode_string};
pub use features::{decode_feature_bits, decode_power_range};
pub use flags::FlagField;
pub use heart_rate::decode_heart_rate;
pub use indoor_bike::decode_indoor_bike;

use std::fmt;
use uuid::Uuid;

use crate::{
    error::DecodeError,
    types::{AuxiliaryStream, DeviceInfoField, FeatureField, Measurement, SensorKind},
    BATTERY_LEVEL_UUID, BATTERY_SERVICE_UUID, BODY_SENSOR_LOCATION_UUID, CSC_FEATURE_UUID,
    CSC_MEASUREMENT_UUID, CYCLING_POWER_FEATURE_UUID, CYCLING_POWER_MEASUREMENT_UUID,
    CYCLING_POWER_SERVICE_UUID, CYCLING_POWER_VECTOR_UUID, CYCLING_SPEED_CADENCE_SERVICE_UUID,
    DEVICE_INFORMATION_SERVICE_UUID, FIRMWARE_REVISION_UUID, FITNESS_MACHINE_FEATURE_UUID,
    FITNESS_MACHINE_SERVICE_UUID, HARDWARE_REVISION_UUID, HEART_RATE_MEASUREMENT_UUID,
    HEART_RATE_SERVICE_UUID, INDOOR_BIKE_DATA_UUID, MANUFACTURER_NAME_UUID, MODEL_NUMBER_UUID,
    SERIAL_NUMBER_UUID, SOFTWARE_REVISION_UUID, SUPPORTED_POWER_RANGE_UUID,
};

/// A characteristic this crate knows how to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    /// Heart Rate Measurement, notified
    HeartRateMeasurement,
    /// Cycling Power Measurement, notified
    CyclingPowerMeasurement,
    /// Indoor Bike Data, notified
    IndoorBikeData,
    /// Battery Level, read once
    BatteryLevel,
    /// Body Sensor Location, read once
    BodySensorLocation,
    /// Device Information string, read once
    DeviceInformation(DeviceInfoField),
    /// Feature bitmask, read once
    Feature(FeatureField),
    /// Supported Power Range, read once
    SupportedPowerRange,
    /// Notified, logged but not decoded
    Auxiliary(AuxiliaryStream),
}

const DEVICE_INFORMATION: [Characteristic; 6] = [
    Characteristic::DeviceInformation(DeviceInfoField::ManufacturerName),
    Characteristic::DeviceInformation(DeviceInfoField::ModelNumber),
    Characteristic::DeviceInformation(DeviceInfoField::SerialNumber),
    Characteristic::DeviceInformation(DeviceInfoField::HardwareRevision),
    Characteristic::DeviceInformation(DeviceInfoField::FirmwareRevision),
    Characteristic::DeviceInformation(DeviceInfoField::SoftwareRevision),
];

impl Characteristic {
    /// GATT UUID of the characteristic
    #[must_use]
    pub const fn uuid(self) -> Uuid {
        match self {
            Self::HeartRateMeasurement => HEART_RATE_MEASUREMENT_UUID,
            Self::CyclingPowerMeasurement => CYCLING_POWER_MEASUREMENT_UUID,
            Self::IndoorBikeData => INDOOR_BIKE_DATA_UUID,
            Self::BatteryLevel => BATTERY_LEVEL_UUID,
            Self::BodySensorLocation => BODY_SENSOR_LOCATION_UUID,
            Self::DeviceInformation(field) => match field {
                DeviceInfoField::ModelNumber => MODEL_NUMBER_UUID,
                DeviceInfoField::SerialNumber => SERIAL_NUMBER_UUID,
                DeviceInfoField::FirmwareRevision => FIRMWARE_REVISION_UUID,
                DeviceInfoField::HardwareRevision => HARDWARE_REVISION_UUID,
                DeviceInfoField::SoftwareRevision => SOFTWARE_REVISION_UUID,
                DeviceInfoField::ManufacturerName => MANUFACTURER_NAME_UUID,
            },
            Self::Feature(field) => match field {
                FeatureField::CyclingPower => CYCLING_POWER_FEATURE_UUID,
                FeatureField::CyclingSpeedCadence => CSC_FEATURE_UUID,
                FeatureField::FitnessMachine => FITNESS_MACHINE_FEATURE_UUID,
            },
            Self::SupportedPowerRange => SUPPORTED_POWER_RANGE_UUID,
            Self::Auxiliary(stream) => match stream {
                AuxiliaryStream::CyclingPowerVector => CYCLING_POWER_VECTOR_UUID,
                AuxiliaryStream::CscMeasurement => CSC_MEASUREMENT_UUID,
            },
        }
    }

    /// Look up a characteristic by UUID
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Option<Self> {
        [
            Self::HeartRateMeasurement,
            Self::CyclingPowerMeasurement,
            Self::IndoorBikeData,
            Self::BatteryLevel,
            Self::BodySensorLocation,
            Self::SupportedPowerRange,
        ]
        .into_iter()
        .chain(DEVICE_INFORMATION)
        .chain(TRAINER_EXTRAS)
        .find(|c| c.uuid() == uuid)
    }

    /// Whether values arrive as notifications rather than a single read
    #[must_use]
    pub const fn is_notified(self) -> bool {
        self.is_measurement() || matches!(self, Self::Auxiliary(_))
    }

    /// Whether notifications carry live values merged into the sensor state
    #[must_use]
    pub const fn is_measurement(self) -> bool {
        matches!(
            self,
            Self::HeartRateMeasurement | Self::CyclingPowerMeasurement | Self::IndoorBikeData
        )
    }

    /// Decode one value of this characteristic
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TruncatedPacket`] if the value is shorter than its
    /// flags require.
    pub fn decode(self, data: &[u8]) -> Result<Measurement, DecodeError> {
        Ok(match self {
            Self::HeartRateMeasurement => Measurement::HeartRate(decode_heart_rate(data)?),
            Self::CyclingPowerMeasurement => Measurement::Power(decode_cycling_power(data)?),
            Self::IndoorBikeData => Measurement::Bike(decode_indoor_bike(data)?),
            Self::BatteryLevel => Measurement::Battery(decode_battery_level(data)?),
            Self::BodySensorLocation => Measurement::BodyLocation(decode_body_location(data)?),
            Self::DeviceInformation(field) => Measurement::DeviceInfo {
                field,
                value: decode_string(data),
            },
            Self::Feature(field) => Measurement::Feature {
                field,
                bits: decode_feature_bits(field, data)?,
            },
            Self::SupportedPowerRange => Measurement::PowerRange(decode_power_range(data)?),
            Self::Auxiliary(stream) => Measurement::Auxiliary {
                stream,
                value: data.to_vec(),
            },
        })
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeartRateMeasurement => write!(f, "Heart Rate Measurement"),
            Self::CyclingPowerMeasurement => write!(f, "Cycling Power Measurement"),
            Self::IndoorBikeData => write!(f, "Indoor Bike Data"),
            Self::BatteryLevel => write!(f, "Battery Level"),
            Self::BodySensorLocation => write!(f, "Body Sensor Location"),
            Self::DeviceInformation(field) => write!(f, "{field}"),
            Self::Feature(field) => write!(f, "{field}"),
            Self::SupportedPowerRange => write!(f, "Supported Power Range"),
            Self::Auxiliary(stream) => write!(f, "{stream}"),
        }
    }
}

const HEART_RATE_CHARACTERISTICS: [Characteristic; 9] = [
    Characteristic::HeartRateMeasurement,
    Characteristic::BodySensorLocation,
    Characteristic::BatteryLevel,
    DEVICE_INFORMATION[0],
    DEVICE_INFORMATION[1],
    DEVICE_INFORMATION[2],
    DEVICE_INFORMATION[3],
    DEVICE_INFORMATION[4],
    DEVICE_INFORMATION[5],
];

const TRAINER_EXTRAS: [Characteristic; 5] = [
    Characteristic::Feature(FeatureField::CyclingPower),
    Characteristic::Feature(FeatureField::CyclingSpeedCadence),
    Characteristic::Feature(FeatureField::FitnessMachine),
    Characteristic::Auxiliary(AuxiliaryStream::CyclingPowerVector),
    Characteristic::Auxiliary(AuxiliaryStream::CscMeasurement),
];

const TRAINER_CHARACTERISTICS: [Characteristic; 14] = [
    Characteristic::CyclingPowerMeasurement,
    Characteristic::IndoorBikeData,
    Characteristic::SupportedPowerRange,
    TRAINER_EXTRAS[0],
    TRAINER_EXTRAS[1],
    TRAINER_EXTRAS[2],
    TRAINER_EXTRAS[3],
    TRAINER_EXTRAS[4],
    DEVICE_INFORMATION[0],
    DEVICE_INFORMATION[1],
    DEVICE_INFORMATION[2],
    DEVICE_INFORMATION[3],
    DEVICE_INFORMATION[4],
    DEVICE_INFORMATION[5],
];

impl SensorKind {
    /// Services advertised by this kind of sensor, used as the scan filter
    #[must_use]
    pub const fn advertised_services(self) -> &'static [Uuid] {
        match self {
            Self::HeartRateMonitor => &[HEART_RATE_SERVICE_UUID],
            Self::PowerTrainer => &[CYCLING_POWER_SERVICE_UUID, FITNESS_MACHINE_SERVICE_UUID],
        }
    }

    /// Services the session may use once connected
    #[must_use]
    pub const fn services(self) -> &'static [Uuid] {
        match self {
            Self::HeartRateMonitor => &[
                HEART_RATE_SERVICE_UUID,
                BATTERY_SERVICE_UUID,
                DEVICE_INFORMATION_SERVICE_UUID,
            ],
            Self::PowerTrainer => &[
                CYCLING_POWER_SERVICE_UUID,
                FITNESS_MACHINE_SERVICE_UUID,
                CYCLING_SPEED_CADENCE_SERVICE_UUID,
                DEVICE_INFORMATION_SERVICE_UUID,
            ],
        }
    }

    /// Characteristics decoded for this kind of sensor
    #[must_use]
    pub const fn characteristics(self) -> &'static [Characteristic] {
        match self {
            Self::HeartRateMonitor => &HEART_RATE_CHARACTERISTICS,
            Self::PowerTrainer => &TRAINER_CHARACTERISTICS,
        }
    }
}
