use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    ble::{BleManager, NotificationSource, SensorConnection},
    error::{Result, SensorError},
    protocol::Characteristic,
    state::SensorState,
    types::{ConnectionParams, Measurement, SensorKind},
};

/// Callback receiving every decoded measurement
pub type MeasurementCallback = Box<dyn Fn(&Measurement) + Send + Sync>;

/// Callback receiving the sensor state after each merge
pub type StateCallback = Box<dyn Fn(&SensorState) + Send + Sync>;

/// Routes raw characteristic values of one sensor to their decoders
///
/// The session owns a dispatch table from characteristic UUID to decoder,
/// built from the [`SensorKind`] profile. Decoding happens outside any lock;
/// only merging a decoded measurement into the shared [`SensorState`] takes
/// the write lock, so measurement streams of different characteristics can be
/// handled concurrently.
///
/// A failed decode is logged and dropped. It never touches the stored state
/// and never stops the notification loop.
///
/// # Examples
///
/// ```no_run
/// use gattsense::{ConnectionParams, DeviceSession, Measurement, SensorKind};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let session = DeviceSession::new(SensorKind::HeartRateMonitor)
///         .with_measurement_callback(|measurement| {
///             if let Measurement::HeartRate(sample) = measurement {
///                 println!("{} bpm", sample.heart_rate);
///             }
///         });
///
///     let mut connection = session.connect_first(&ConnectionParams::default()).await?;
///     session.run(&mut connection).await?;
///     Ok(())
/// }
/// ```
pub struct DeviceSession {
    kind: SensorKind,
    decoders: HashMap<Uuid, Characteristic>,
    state: Arc<RwLock<SensorState>>,
    on_measurement: Option<MeasurementCallback>,
    on_state_change: Option<StateCallback>,
}

impl DeviceSession {
    /// Create a session for a kind of sensor
    #[must_use]
    pub fn new(kind: SensorKind) -> Self {
        let decoders = kind
            .characteristics()
            .iter()
            .map(|c| (c.uuid(), *c))
            .collect();

        Self {
            kind,
            decoders,
            state: Arc::new(RwLock::new(SensorState::default())),
            on_measurement: None,
            on_state_change: None,
        }
    }

    /// Forward every decoded measurement to `callback`
    #[must_use]
    pub fn with_measurement_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Measurement) + Send + Sync + 'static,
    {
        self.on_measurement = Some(Box::new(callback));
        self
    }

    /// Forward a snapshot of the state to `callback` after every merge
    #[must_use]
    pub fn with_state_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SensorState) + Send + Sync + 'static,
    {
        self.on_state_change = Some(Box::new(callback));
        self
    }

    /// Kind of sensor this session decodes
    #[must_use]
    pub const fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Decoder registered for a characteristic UUID
    #[must_use]
    pub fn decoder_for(&self, uuid: Uuid) -> Option<Characteristic> {
        self.decoders.get(&uuid).copied()
    }

    /// Get a copy of the last known values
    pub async fn state(&self) -> SensorState {
        self.state.read().await.clone()
    }

    /// Shared handle to the state, for readers outside the session
    #[must_use]
    pub fn shared_state(&self) -> Arc<RwLock<SensorState>> {
        Arc::clone(&self.state)
    }

    /// Reset the state for a newly connected device
    pub async fn start(&self, name: Option<String>) {
        info!(
            "Starting {} session for {}",
            self.kind,
            name.as_deref().unwrap_or("unnamed sensor")
        );
        let snapshot = SensorState::for_device(name);
        *self.state.write().await = snapshot.clone();

        if let Some(callback) = &self.on_state_change {
            callback(&snapshot);
        }
    }

    /// Decode one characteristic value and merge it into the state
    ///
    /// Callbacks run after the write lock is released. Within one stream of
    /// notifications handled in sequence, callbacks observe merges in order.
    /// When several streams are handled concurrently, `on_state_change` may
    /// receive their snapshots in a different order than the merges happened.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::UnknownCharacteristic`] if no decoder is registered
    /// for `uuid`, or [`SensorError::Decode`] if the value is malformed. In both
    /// cases the state is left untouched.
    pub async fn handle_notification(&self, uuid: Uuid, data: &[u8]) -> Result<Measurement> {
        let characteristic = self
            .decoder_for(uuid)
            .ok_or(SensorError::UnknownCharacteristic(uuid))?;

        let measurement = characteristic.decode(data)?;
        debug!("{}: {:?}", characteristic, measurement);

        match &measurement {
            Measurement::DeviceInfo { field, value } => info!("{field}: {value}"),
            Measurement::Feature { field, bits } => info!("{field}: {bits:#010X}"),
            Measurement::PowerRange(range) => info!(
                "Supported Power Range: {}..={} W, step {} W",
                range.min, range.max, range.increment
            ),
            Measurement::Auxiliary { stream, value } => info!("{stream}: {value:02X?}"),
            _ => {}
        }

        let snapshot = {
            let mut state = self.state.write().await;
            state.apply(&measurement);
            self.on_state_change.as_ref().map(|_| state.clone())
        };

        if let Some(callback) = &self.on_measurement {
            callback(&measurement);
        }
        if let (Some(callback), Some(snapshot)) = (&self.on_state_change, snapshot) {
            callback(&snapshot);
        }

        Ok(measurement)
    }

    /// Process notifications until the source is exhausted
    ///
    /// Values that fail to decode, or arrive for a characteristic without a
    /// decoder, are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by `source`. A
    /// [`SensorError::Timeout`] leaves the source usable, so `run` may be
    /// called again.
    pub async fn run<S>(&self, source: &mut S) -> Result<()>
    where
        S: NotificationSource + ?Sized,
    {
        while let Some(notification) = source.next_notification().await? {
            if let Err(e) = self
                .handle_notification(notification.characteristic, &notification.value)
                .await
            {
                warn!(
                    "Dropping notification from {}: {} ({:02X?})",
                    notification.characteristic, e, notification.value
                );
            }
        }

        info!("Notification source exhausted");
        Ok(())
    }

    /// Scan for the strongest matching sensor and connect to it
    ///
    /// The state is reset for the new device and the profile's read-once
    /// characteristics (battery, body location, device information, trainer
    /// capabilities) are read and merged before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::DeviceNotFound`] if no sensor is found during the
    /// scan, or any BLE connection error.
    pub async fn connect_first(&self, params: &ConnectionParams) -> Result<SensorConnection> {
        let ble_manager = BleManager::new().await?;
        let devices = ble_manager.scan_for_devices(self.kind, params).await?;
        let sensor = devices.first().ok_or(SensorError::DeviceNotFound)?;

        let connection = ble_manager
            .connect_to_device(sensor, self.kind, params)
            .await?;
        self.attach(&connection).await;

        Ok(connection)
    }

    /// Start a fresh state for `connection` and merge its read-once values
    pub async fn attach(&self, connection: &SensorConnection) {
        self.start(Some(connection.sensor().name.clone())).await;

        for value in connection.read_static_values().await {
            if let Err(e) = self
                .handle_notification(value.characteristic, &value.value)
                .await
            {
                warn!("Ignoring {}: {}", value.characteristic, e);
            }
        }
    }
}
