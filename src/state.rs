use serde::{Deserialize, Serialize};

use crate::types::{
    BikeSample, BodySensorLocation, CrankRevolutions, HeartRateSample, MagnitudeRange,
    Measurement, PowerSample, TotalDistance, WheelRevolutions,
};

/// Last known values reported by one sensor
///
/// Fields are `None` until the sensor first reports them. Merging a sample only
/// overwrites the fields that sample carries, so values reported by other
/// characteristics (or earlier notifications) stick until replaced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SensorState {
    /// Advertised device name
    pub name: Option<String>,
    /// Battery level in percent
    pub battery: Option<u8>,
    /// Where the heart-rate sensor is worn
    pub body_location: Option<BodySensorLocation>,
    /// Last Device Information string read
    pub device_info: Option<String>,

    /// Heart rate in beats per minute
    pub heart_rate: Option<u16>,
    /// Skin contact state
    pub contact_detected: Option<bool>,
    /// Energy expended in kilojoules
    pub energy_expended: Option<u16>,
    /// Most recent non-empty RR interval batch
    pub rr_intervals: Vec<u16>,

    /// Cycling power in watts
    pub power: Option<i16>,
    /// Pedal power balance
    pub power_balance: Option<u8>,
    /// Accumulated torque
    pub accumulated_torque: Option<u16>,
    /// Wheel revolutions and last wheel event time
    pub wheel: Option<WheelRevolutions>,
    /// Crank revolutions and last crank event time
    pub crank: Option<CrankRevolutions>,
    /// Extreme force magnitudes
    pub force_range: Option<MagnitudeRange>,
    /// Extreme torque magnitudes
    pub torque_range: Option<MagnitudeRange>,

    /// Indoor bike instantaneous speed
    pub speed: Option<i16>,
    /// Indoor bike average speed
    pub average_speed: Option<u16>,
    /// Indoor bike cadence
    pub cadence: Option<u16>,
    /// Indoor bike average cadence
    pub average_cadence: Option<u16>,
    /// Indoor bike total distance
    pub total_distance: Option<TotalDistance>,
    /// Indoor bike resistance level
    pub resistance_level: Option<i16>,
    /// Indoor bike instantaneous power
    pub instantaneous_power: Option<i16>,
    /// Indoor bike average power
    pub average_power: Option<i16>,
}

fn merge<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

impl SensorState {
    /// Create an empty state for a newly connected device
    #[must_use]
    pub fn for_device(name: Option<String>) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Merge one decoded measurement into the stored values
    pub fn apply(&mut self, measurement: &Measurement) {
        match measurement {
            Measurement::HeartRate(sample) => self.apply_heart_rate(sample),
            Measurement::Power(sample) => self.apply_power(sample),
            Measurement::Bike(sample) => self.apply_bike(sample),
            Measurement::Battery(level) => self.battery = Some(*level),
            Measurement::BodyLocation(location) => self.body_location = Some(*location),
            Measurement::DeviceInfo { value, .. } => self.device_info = Some(value.clone()),
            Measurement::Feature { .. }
            | Measurement::PowerRange(_)
            | Measurement::Auxiliary { .. } => {}
        }
    }

    /// Merge a heart-rate sample
    pub fn apply_heart_rate(&mut self, sample: &HeartRateSample) {
        self.heart_rate = Some(sample.heart_rate);
        merge(&mut self.contact_detected, sample.contact_detected);
        merge(&mut self.energy_expended, sample.energy_expended);
        if !sample.rr_intervals.is_empty() {
            self.rr_intervals.clone_from(&sample.rr_intervals);
        }
    }

    /// Merge a cycling power sample
    pub fn apply_power(&mut self, sample: &PowerSample) {
        self.power = Some(sample.power);
        merge(&mut self.power_balance, sample.power_balance);
        merge(&mut self.accumulated_torque, sample.accumulated_torque);
        merge(&mut self.wheel, sample.wheel);
        merge(&mut self.crank, sample.crank);
        merge(&mut self.force_range, sample.force_range);
        merge(&mut self.torque_range, sample.torque_range);
    }

    /// Merge an indoor bike sample
    pub fn apply_bike(&mut self, sample: &BikeSample) {
        self.speed = Some(sample.instantaneous_speed);
        merge(&mut self.average_speed, sample.average_speed);
        merge(&mut self.cadence, sample.cadence);
        merge(&mut self.average_cadence, sample.average_cadence);
        merge(&mut self.total_distance, sample.total_distance);
        merge(&mut self.resistance_level, sample.resistance_level);
        merge(&mut self.instantaneous_power, sample.instantaneous_power);
        merge(&mut self.average_power, sample.average_power);
    }
}
