use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A registered device as stored in the `devices` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Device {
    pub id: i64,
    pub name: String,
    pub location: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub device_type: String,
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a device. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDevice {
    pub name: String,
    pub location: String,
    #[serde(rename = "type")]
    pub device_type: String,
}

impl NewDevice {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        device_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            device_type: device_type.into(),
        }
    }
}

/// Rows inserted when the table is empty at startup
pub fn seed_devices() -> Vec<NewDevice> {
    vec![
        NewDevice::new("Living Room Sensor", "Living Room", "temperature"),
        NewDevice::new("Bedroom Sensor", "Bedroom", "temperature"),
        NewDevice::new("Kitchen Switch", "Kitchen", "switch"),
    ]
}

/// Device identifier taken from the `/devices/{id}` path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DeviceId(i64);

impl DeviceId {
    pub fn get(self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidDeviceId {
    /// Segment is empty or contains something other than ASCII digits
    NotDigits,
    /// All digits, but larger than any id the table can hold
    OutOfRange,
}

impl fmt::Display for InvalidDeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidDeviceId::NotDigits => write!(f, "Device id must be numeric"),
            InvalidDeviceId::OutOfRange => write!(f, "Device id is out of range"),
        }
    }
}

impl std::error::Error for InvalidDeviceId {}

impl FromStr for DeviceId {
    type Err = InvalidDeviceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // i64::from_str also accepts a leading sign, which is not a valid id
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidDeviceId::NotDigits);
        }
        s.parse::<i64>()
            .map(DeviceId)
            .map_err(|_| InvalidDeviceId::OutOfRange)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body of `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub database: DatabaseStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
}
