use crate::errors::{Error, Result};
use crate::metrics::RECORDS_STORED;
use crate::model::TelemetryRecord;
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde_json::Value;

pub const TIMESTAMP_KEY: &str = "timestamp";

/// Append-only, in-memory telemetry sequence. Lives for the process lifetime.
#[derive(Debug, Default)]
pub struct TelemetryLog {
    records: Mutex<Vec<TelemetryRecord>>,
}

impl TelemetryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps `payload` with the receipt time and appends it.
    ///
    /// Returns the stored record and the number of records held after the append.
    /// The timestamp is taken under the lock, so timestamps never decrease along
    /// the sequence.
    pub fn record(&self, payload: Value) -> Result<(TelemetryRecord, usize)> {
        let mut record = match payload {
            Value::Object(map) => map,
            other => {
                return Err(Error::InvalidPayload(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let mut records = self.records.lock();
        record.insert(TIMESTAMP_KEY.to_string(), Value::String(receipt_timestamp()));
        records.push(record.clone());
        RECORDS_STORED.inc();

        Ok((record, records.len()))
    }

    /// Copy of every record in arrival order
    pub fn snapshot(&self) -> Vec<TelemetryRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

fn receipt_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
