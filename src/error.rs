use thiserror::Error;
use uuid::Uuid;

/// Errors raised while decoding a single characteristic value
///
/// A decode error is local to one notification. The next notification starts
/// from a fresh cursor and is unaffected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A read asked for more bytes than the packet has left
    #[error("Truncated packet: needed {needed} byte(s) at offset {offset}, {remaining} remaining")]
    TruncatedPacket {
        /// Offset of the failed read
        offset: usize,
        /// Bytes the read required
        needed: usize,
        /// Bytes that were left in the packet
        remaining: usize,
    },
}

/// Errors that can occur when working with BLE fitness sensors
#[derive(Error, Debug)]
pub enum SensorError {
    /// Bluetooth Low Energy related errors
    #[error("BLE error: {0}")]
    Ble(#[from] btleplug::Error),

    /// No matching sensor was found during scanning
    #[error("Sensor not found")]
    DeviceNotFound,

    /// Device connection failed
    #[error("Failed to connect to sensor: {0}")]
    ConnectionFailed(String),

    /// Device disconnected unexpectedly
    #[error("Sensor disconnected")]
    Disconnected,

    /// Operation timeout
    #[error("Operation timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// A characteristic required by the sensor profile is missing
    #[error("Characteristic {0} not found on sensor")]
    CharacteristicNotFound(Uuid),

    /// A value arrived for a characteristic the session has no decoder for
    #[error("No decoder registered for characteristic {0}")]
    UnknownCharacteristic(Uuid),

    /// A characteristic value could not be decoded
    #[error("Failed to decode characteristic value: {0}")]
    Decode(#[from] DecodeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sensor operations
pub type Result<T> = std::result::Result<T, SensorError>;

impl SensorError {
    /// Check if this error indicates a connection issue
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Ble(_) | Self::ConnectionFailed(_) | Self::Disconnected | Self::DeviceNotFound
        )
    }

    /// Check if the connection stays usable after this error
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Decode(_) | Self::UnknownCharacteristic(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let connection_error = SensorError::ConnectionFailed("test".to_string());
        assert!(connection_error.is_connection_error());
        assert!(!connection_error.is_recoverable());

        let decode_error = SensorError::from(DecodeError::TruncatedPacket {
            offset: 2,
            needed: 2,
            remaining: 1,
        });
        assert!(!decode_error.is_connection_error());
        assert!(decode_error.is_recoverable());

        let timeout_error = SensorError::Timeout { timeout_ms: 5000 };
        assert!(!timeout_error.is_connection_error());
        assert!(timeout_error.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let error = DecodeError::TruncatedPacket {
            offset: 4,
            needed: 4,
            remaining: 3,
        };
        let error_string = format!("{error}");
        assert!(error_string.contains("Truncated packet"));
        assert!(error_string.contains("offset 4"));
        assert!(error_string.contains("3 remaining"));
    }
}
