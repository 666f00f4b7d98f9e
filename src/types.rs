use serde::{Deserialize, Serialize};
use std::fmt;

/// Decoded Heart Rate Measurement (0x2A37) notification
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeartRateSample {
    /// Heart rate in beats per minute, widened from an 8- or 16-bit field
    pub heart_rate: u16,
    /// Skin contact state, present only if the sensor supports contact detection
    pub contact_detected: Option<bool>,
    /// Accumulated energy expended in kilojoules
    pub energy_expended: Option<u16>,
    /// RR intervals in 1/1024 second units, oldest first
    pub rr_intervals: Vec<u16>,
}

/// Cumulative wheel revolution data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelRevolutions {
    /// Cumulative wheel revolutions
    pub revolutions: u32,
    /// Time of the last wheel event in 1/2048 second units
    pub last_event_time: u16,
}

/// Cumulative crank revolution data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrankRevolutions {
    /// Cumulative crank revolutions
    pub revolutions: u16,
    /// Time of the last crank event in 1/1024 second units
    pub last_event_time: u16,
}

/// Extreme magnitudes reported for force or torque
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagnitudeRange {
    /// Maximum magnitude
    pub max: i16,
    /// Minimum magnitude
    pub min: i16,
}

/// Decoded Cycling Power Measurement (0x2A63) notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PowerSample {
    /// Instantaneous power in watts
    pub power: i16,
    /// Pedal power balance in 1/2 percent units
    pub power_balance: Option<u8>,
    /// Accumulated torque in 1/32 Newton metre units
    pub accumulated_torque: Option<u16>,
    /// Wheel revolutions and last wheel event time
    pub wheel: Option<WheelRevolutions>,
    /// Crank revolutions and last crank event time
    pub crank: Option<CrankRevolutions>,
    /// Extreme force magnitudes in newtons
    pub force_range: Option<MagnitudeRange>,
    /// Extreme torque magnitudes in 1/32 Newton metre units
    pub torque_range: Option<MagnitudeRange>,
}

/// 24-bit total distance split the way it is transmitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalDistance {
    /// Low 16 bits
    pub low: u16,
    /// High 8 bits
    pub high: u8,
}

impl TotalDistance {
    /// Build from a distance in metres, keeping the low 24 bits
    #[must_use]
    pub const fn from_meters(meters: u32) -> Self {
        Self {
            low: (meters & 0xFFFF) as u16,
            high: ((meters >> 16) & 0xFF) as u8,
        }
    }

    /// Combined distance in metres
    #[must_use]
    pub const fn meters(self) -> u32 {
        (self.high as u32) << 16 | self.low as u32
    }
}

/// Decoded Indoor Bike Data (0x2AD2) notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BikeSample {
    /// Instantaneous speed in 1/100 km/h units
    pub instantaneous_speed: i16,
    /// Average speed in 1/100 km/h units
    pub average_speed: Option<u16>,
    /// Instantaneous cadence in 1/2 rpm units
    pub cadence: Option<u16>,
    /// Average cadence in 1/2 rpm units
    pub average_cadence: Option<u16>,
    /// Total distance in metres
    pub total_distance: Option<TotalDistance>,
    /// Resistance level, unitless
    pub resistance_level: Option<i16>,
    /// Instantaneous power in watts
    pub instantaneous_power: Option<i16>,
    /// Average power in watts
    pub average_power: Option<i16>,
}

/// Body Sensor Location (0x2A38) values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodySensorLocation {
    /// Other location
    Other = 0,
    /// Chest strap
    Chest = 1,
    /// Wrist
    Wrist = 2,
    /// Finger
    Finger = 3,
    /// Hand
    Hand = 4,
    /// Ear lobe
    EarLobe = 5,
    /// Foot
    Foot = 6,
    /// Reserved value
    Unknown = 0xFF,
}

impl From<u8> for BodySensorLocation {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Other,
            1 => Self::Chest,
            2 => Self::Wrist,
            3 => Self::Finger,
            4 => Self::Hand,
            5 => Self::EarLobe,
            6 => Self::Foot,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for BodySensorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other => write!(f, "Other"),
            Self::Chest => write!(f, "Chest"),
            Self::Wrist => write!(f, "Wrist"),
            Self::Finger => write!(f, "Finger"),
            Self::Hand => write!(f, "Hand"),
            Self::EarLobe => write!(f, "Ear Lobe"),
            Self::Foot => write!(f, "Foot"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Device Information service string characteristics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceInfoField {
    /// Model Number String (0x2A24)
    ModelNumber,
    /// Serial Number String (0x2A25)
    SerialNumber,
    /// Firmware Revision String (0x2A26)
    FirmwareRevision,
    /// Hardware Revision String (0x2A27)
    HardwareRevision,
    /// Software Revision String (0x2A28)
    SoftwareRevision,
    /// Manufacturer Name String (0x2A29)
    ManufacturerName,
}

impl fmt::Display for DeviceInfoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelNumber => write!(f, "Model Number String"),
            Self::SerialNumber => write!(f, "Serial Number String"),
            Self::FirmwareRevision => write!(f, "Firmware Revision String"),
            Self::HardwareRevision => write!(f, "Hardware Revision String"),
            Self::SoftwareRevision => write!(f, "Software Revision String"),
            Self::ManufacturerName => write!(f, "Manufacturer Name String"),
        }
    }
}

/// Feature bitmask characteristics read from trainers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureField {
    /// Cycling Power Feature (0x2A65), 32 bits
    CyclingPower,
    /// CSC Feature (0x2A5C), 16 bits
    CyclingSpeedCadence,
    /// Fitness Machine Feature (0x2ACC), first 32-bit word
    FitnessMachine,
}

impl fmt::Display for FeatureField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CyclingPower => write!(f, "Cycling Power Feature"),
            Self::CyclingSpeedCadence => write!(f, "CSC Feature"),
            Self::FitnessMachine => write!(f, "Fitness Machine Feature"),
        }
    }
}

/// Supported Power Range (0x2AD8) of a fitness machine, in watts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerRange {
    /// Minimum power the machine can target
    pub min: i16,
    /// Maximum power the machine can target
    pub max: i16,
    /// Smallest power step
    pub increment: u16,
}

/// Notified characteristics whose values are only logged, never merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuxiliaryStream {
    /// Cycling Power Vector (0x2A64)
    CyclingPowerVector,
    /// CSC Measurement (0x2A5B)
    CscMeasurement,
}

impl fmt::Display for AuxiliaryStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CyclingPowerVector => write!(f, "Cycling Power Vector"),
            Self::CscMeasurement => write!(f, "CSC Measurement"),
        }
    }
}

/// One decoded characteristic value, as handed to session callbacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Measurement {
    /// Heart Rate Measurement notification
    HeartRate(HeartRateSample),
    /// Cycling Power Measurement notification
    Power(PowerSample),
    /// Indoor Bike Data notification
    Bike(BikeSample),
    /// Battery level in percent
    Battery(u8),
    /// Where the heart-rate sensor is worn
    BodyLocation(BodySensorLocation),
    /// A Device Information string
    DeviceInfo {
        /// Which string was read
        field: DeviceInfoField,
        /// Decoded text
        value: String,
    },
    /// A feature bitmask
    Feature {
        /// Which feature characteristic was read
        field: FeatureField,
        /// Raw feature bits
        bits: u32,
    },
    /// Power range a trainer supports
    PowerRange(PowerRange),
    /// Undecoded value of a logged-only characteristic
    Auxiliary {
        /// Which characteristic notified
        stream: AuxiliaryStream,
        /// Raw value bytes
        value: Vec<u8>,
    },
}

/// Kind of fitness sensor a session talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorKind {
    /// Heart-rate chest strap or wrist sensor
    HeartRateMonitor,
    /// Cycling power meter or smart trainer
    PowerTrainer,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeartRateMonitor => write!(f, "Heart Rate Monitor"),
            Self::PowerTrainer => write!(f, "Power Trainer"),
        }
    }
}

/// Sensor found during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredSensor {
    /// Advertised local name
    pub name: String,
    /// Device address
    pub address: String,
    /// Signal strength (RSSI)
    pub rssi: i16,
}

impl DiscoveredSensor {
    /// Create new sensor info
    #[must_use]
    pub const fn new(name: String, address: String, rssi: i16) -> Self {
        Self {
            name,
            address,
            rssi,
        }
    }
}

/// Connection parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionParams {
    /// Scan duration in milliseconds
    pub scan_timeout_ms: u64,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Longest silence tolerated between notifications, in milliseconds
    pub notification_timeout_ms: u64,
    /// Only accept sensors whose name contains this text (case-insensitive)
    pub name_filter: Option<String>,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            scan_timeout_ms: 5_000,
            connect_timeout_ms: 10_000,
            notification_timeout_ms: 30_000,
            name_filter: None,
        }
    }
}

impl ConnectionParams {
    /// Check whether an advertised name passes the name filter
    #[must_use]
    pub fn accepts_name(&self, name: &str) -> bool {
        self.name_filter
            .as_ref()
            .is_none_or(|filter| name.to_lowercase().contains(&filter.to_lowercase()))
    }
}
