use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

const VALUE_MIN: f64 = 20.0;
const VALUE_MAX: f64 = 25.0;

/// A single simulated sensor reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub sensor_id: u32,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Random reading in [20.0, 25.0), truncated to one decimal place
pub fn generate_reading(rng: &mut impl Rng, sensor_id: u32) -> Reading {
    let raw: f64 = rng.gen_range(VALUE_MIN..VALUE_MAX);

    Reading {
        sensor_id,
        value: (raw * 10.0).trunc() / 10.0,
        timestamp: Utc::now(),
    }
}

/// Sensor ids cycle through `1..=devices`
pub fn sensor_for(sequence: u64, devices: u32) -> u32 {
    (sequence % u64::from(devices)) as u32 + 1
}
