use async_trait::async_trait;
use btleplug::{
    api::{
        BDAddr, Central, CharPropFlags, Characteristic as GattCharacteristic, Manager as _,
        Peripheral as _, ScanFilter, ValueNotification,
    },
    platform::{Manager, Peripheral},
};
use futures::stream::{Stream, StreamExt};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time::timeout,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::{Result, SensorError},
    protocol::Characteristic,
    types::{ConnectionParams, DiscoveredSensor, SensorKind},
};

/// One raw characteristic value as delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// UUID of the characteristic the value belongs to
    pub characteristic: Uuid,
    /// Raw value bytes
    pub value: Vec<u8>,
}

impl Notification {
    /// Create a notification
    #[must_use]
    pub fn new(characteristic: Uuid, value: impl Into<Vec<u8>>) -> Self {
        Self {
            characteristic,
            value: value.into(),
        }
    }
}

impl From<ValueNotification> for Notification {
    fn from(notification: ValueNotification) -> Self {
        Self::new(notification.uuid, notification.value)
    }
}

/// Source of raw characteristic values, in arrival order
#[async_trait]
pub trait NotificationSource: Send {
    /// Wait for the next value
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns transport errors such as [`SensorError::Timeout`].
    async fn next_notification(&mut self) -> Result<Option<Notification>>;
}

/// BLE manager for fitness sensor discovery
pub struct BleManager {
    manager: Manager,
    peripherals: Arc<Mutex<HashMap<BDAddr, Peripheral>>>,
}

impl BleManager {
    /// Create a new BLE manager
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Ble`] if the Bluetooth adapter cannot be initialized.
    pub async fn new() -> Result<Self> {
        let manager = Manager::new().await?;

        Ok(Self {
            manager,
            peripherals: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Scan for sensors advertising the services of `kind`
    ///
    /// Results are sorted strongest signal first.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::DeviceNotFound`] if no Bluetooth adapters are available,
    /// or [`SensorError::Ble`] for other Bluetooth-related errors.
    pub async fn scan_for_devices(
        &self,
        kind: SensorKind,
        params: &ConnectionParams,
    ) -> Result<Vec<DiscoveredSensor>> {
        info!("Starting scan for {kind} sensors...");

        let adapters = self.manager.adapters().await?;
        let central = adapters.first().ok_or(SensorError::DeviceNotFound)?;

        let scan_filter = ScanFilter {
            services: kind.advertised_services().to_vec(),
        };

        central.start_scan(scan_filter).await?;
        tokio::time::sleep(Duration::from_millis(params.scan_timeout_ms)).await;
        central.stop_scan().await?;

        let mut devices = Vec::new();
        for peripheral in central.peripherals().await? {
            let Some(sensor) = Self::matching_sensor(&peripheral, kind, params).await else {
                continue;
            };

            info!("Found {kind}: {} ({}dBm)", sensor.name, sensor.rssi);
            devices.push(sensor);
            self.peripherals
                .lock()
                .await
                .insert(peripheral.address(), peripheral);
        }

        devices.sort_by(|a, b| b.rssi.cmp(&a.rssi));
        info!("Scan completed. Found {} sensor(s)", devices.len());
        Ok(devices)
    }

    /// Connect to a sensor found by [`BleManager::scan_for_devices`]
    ///
    /// Subscribes to every notified characteristic of `kind` the sensor exposes.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::DeviceNotFound`] if the sensor was not part of a scan,
    /// [`SensorError::Timeout`] if connection times out,
    /// [`SensorError::ConnectionFailed`] if connection fails,
    /// or [`SensorError::CharacteristicNotFound`] if none of the profile's
    /// measurement characteristics can be subscribed. Logged-only streams do
    /// not count.
    pub async fn connect_to_device(
        &self,
        sensor: &DiscoveredSensor,
        kind: SensorKind,
        params: &ConnectionParams,
    ) -> Result<SensorConnection> {
        info!("Connecting to sensor: {}", sensor.name);

        let peripheral = self
            .peripherals
            .lock()
            .await
            .values()
            .find(|p| p.address().to_string() == sensor.address)
            .cloned()
            .ok_or(SensorError::DeviceNotFound)?;

        timeout(
            Duration::from_millis(params.connect_timeout_ms),
            peripheral.connect(),
        )
        .await
        .map_err(|_| SensorError::Timeout {
            timeout_ms: params.connect_timeout_ms,
        })?
        .map_err(|e| SensorError::ConnectionFailed(e.to_string()))?;

        peripheral.discover_services().await?;

        let available = peripheral.characteristics();
        let mut measurements = 0;
        for characteristic in kind.characteristics().iter().filter(|c| c.is_notified()) {
            let Some(gatt) = available.iter().find(|g| g.uuid == characteristic.uuid()) else {
                debug!("{} not exposed by {}", characteristic, sensor.name);
                continue;
            };
            if !gatt.properties.contains(CharPropFlags::NOTIFY) {
                warn!("{} does not support notifications", characteristic);
                continue;
            }

            peripheral.subscribe(gatt).await?;
            info!("Subscribed to {}", characteristic);
            if characteristic.is_measurement() {
                measurements += 1;
            }
        }

        if measurements == 0 {
            let expected = kind
                .characteristics()
                .first()
                .map_or_else(Uuid::nil, |c| c.uuid());
            return Err(SensorError::CharacteristicNotFound(expected));
        }

        let stream = peripheral.notifications().await?;
        let (sender, receiver) = mpsc::unbounded_channel();
        let forwarder = tokio::spawn(forward_notifications(stream, sender));

        info!("Successfully connected to {}", sensor.name);

        Ok(SensorConnection {
            peripheral,
            sensor: sensor.clone(),
            kind,
            notification_receiver: receiver,
            forwarder,
            notification_timeout_ms: params.notification_timeout_ms,
        })
    }

    async fn matching_sensor(
        peripheral: &Peripheral,
        kind: SensorKind,
        params: &ConnectionParams,
    ) -> Option<DiscoveredSensor> {
        let properties = peripheral.properties().await.ok()??;

        let advertises = properties
            .services
            .iter()
            .any(|uuid| kind.advertised_services().contains(uuid));
        if !advertises {
            return None;
        }

        let name = properties
            .local_name
            .unwrap_or_else(|| format!("Unknown {kind}"));
        if !params.accepts_name(&name) {
            debug!("Skipping {name}: does not match name filter");
            return None;
        }

        Some(DiscoveredSensor::new(
            name,
            properties.address.to_string(),
            properties.rssi.unwrap_or(0),
        ))
    }
}

/// Active connection to a fitness sensor
pub struct SensorConnection {
    peripheral: Peripheral,
    sensor: DiscoveredSensor,
    kind: SensorKind,
    notification_receiver: mpsc::UnboundedReceiver<Notification>,
    forwarder: JoinHandle<()>,
    notification_timeout_ms: u64,
}

impl SensorConnection {
    /// Sensor this connection belongs to
    #[must_use]
    pub const fn sensor(&self) -> &DiscoveredSensor {
        &self.sensor
    }

    /// Read every read-once characteristic of the profile the sensor exposes
    ///
    /// Characteristics that are missing or fail to read are skipped.
    pub async fn read_static_values(&self) -> Vec<Notification> {
        let available = self.peripheral.characteristics();
        let mut values = Vec::new();

        for characteristic in self.kind.characteristics().iter().filter(|c| !c.is_notified()) {
            let Some(gatt) = find_readable(&available, *characteristic) else {
                continue;
            };

            match self.peripheral.read(gatt).await {
                Ok(value) => {
                    debug!("Read {}: {:02X?}", characteristic, value);
                    values.push(Notification::new(gatt.uuid, value));
                }
                Err(e) => warn!("Can't read {}: {}", characteristic, e),
            }
        }

        values
    }

    /// Wait for a notification from the sensor
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Timeout`] if no notification is received within the timeout,
    /// or [`SensorError::Disconnected`] if the notification stream has ended.
    pub async fn receive_notification(&mut self, timeout_ms: u64) -> Result<Notification> {
        timeout(
            Duration::from_millis(timeout_ms),
            self.notification_receiver.recv(),
        )
        .await
        .map_err(|_| SensorError::Timeout { timeout_ms })?
        .ok_or(SensorError::Disconnected)
    }

    /// Check if the sensor is still connected
    pub async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    /// Disconnect from the sensor
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::Ble`] if disconnection fails.
    pub async fn disconnect(&self) -> Result<()> {
        self.forwarder.abort();
        self.peripheral.disconnect().await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationSource for SensorConnection {
    async fn next_notification(&mut self) -> Result<Option<Notification>> {
        match self.receive_notification(self.notification_timeout_ms).await {
            Ok(notification) => Ok(Some(notification)),
            Err(SensorError::Disconnected) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Drop for SensorConnection {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

fn find_readable(
    available: &std::collections::BTreeSet<GattCharacteristic>,
    characteristic: Characteristic,
) -> Option<&GattCharacteristic> {
    available
        .iter()
        .find(|g| g.uuid == characteristic.uuid())
        .filter(|g| g.properties.contains(CharPropFlags::READ))
}

/// Forward raw notifications from the peripheral into the connection's channel
async fn forward_notifications<S>(mut stream: S, sender: mpsc::UnboundedSender<Notification>)
where
    S: Stream<Item = ValueNotification> + Unpin,
{
    while let Some(data) = stream.next().await {
        debug!("Notification {}: {:02X?}", data.uuid, data.value);
        if sender.send(data.into()).is_err() {
            break;
        }
    }

    debug!("Notification stream ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HEART_RATE_MEASUREMENT_UUID;

    #[tokio::test]
    async fn test_forward_notifications_preserves_order() {
        let values = vec![
            ValueNotification {
                uuid: HEART_RATE_MEASUREMENT_UUID,
                value: vec![0x00, 0x3C],
            },
            ValueNotification {
                uuid: HEART_RATE_MEASUREMENT_UUID,
                value: vec![0x00, 0x3D],
            },
        ];
        let (sender, mut receiver) = mpsc::unbounded_channel();

        forward_notifications(futures::stream::iter(values), sender).await;

        assert_eq!(receiver.recv().await.unwrap().value, vec![0x00, 0x3C]);
        assert_eq!(receiver.recv().await.unwrap().value, vec![0x00, 0x3D]);
        assert!(receiver.recv().await.is_none());
    }

    #[test]
    fn test_notification_from_value() {
        let notification = Notification::from(ValueNotification {
            uuid: HEART_RATE_MEASUREMENT_UUID,
            value: vec![0x10, 0x3C],
        });
        assert_eq!(
            notification,
            Notification::new(HEART_RATE_MEASUREMENT_UUID, vec![0x10, 0x3C])
        );
    }
}
