//! Sensor reading data model.
//!
//! The JSON shape uses camelCase (`deviceId`) to match the dashboard
//! client's existing contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Device id assigned when the caller omits one.
pub const DEFAULT_DEVICE_ID: &str = "sensor-001";

/// A stored sensor reading. Immutable after creation; readings are only
/// ever removed by capacity eviction in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// Unique identifier, assigned at write time.
    pub id: String,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Originating device.
    pub device_id: String,
    /// Sample time; server-assigned when the caller omits it.
    pub timestamp: DateTime<Utc>,
}

/// Ingestion payload for `POST /data`.
///
/// `temperature` and `humidity` are required; a body missing either is
/// rejected at deserialization with a client error. `device_id` and
/// `timestamp` default at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReading {
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewReading {
    /// Materialize a stored reading: assign a fresh id and fill in the
    /// device/timestamp defaults. Every store backend goes through this so
    /// id assignment is uniform across them.
    pub fn into_reading(self) -> Reading {
        Reading {
            id: Uuid::new_v4().to_string(),
            temperature: self.temperature,
            humidity: self.humidity,
            device_id: self
                .device_id
                .unwrap_or_else(|| DEFAULT_DEVICE_ID.to_string()),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
        }
    }
}
