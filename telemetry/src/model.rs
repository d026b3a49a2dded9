use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// A stored telemetry payload: caller-supplied fields plus the server-assigned `timestamp`
pub type TelemetryRecord = Map<String, Value>;

/// Response to `POST /telemetry`
#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub message: &'static str,
    pub data: TelemetryRecord,
    pub count: usize,
}

/// Response to `GET /telemetry`
#[derive(Debug, Serialize)]
pub struct TelemetryResponse {
    pub data: Vec<TelemetryRecord>,
    pub total: usize,
}

/// Response to `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub records: usize,
    pub timestamp: DateTime<Utc>,
}
