use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

const VALUE_MIN: f64 = 18.0;
const VALUE_MAX: f64 = 38.0;

pub const UNKNOWN_LOCATION: &str = "Unknown";
pub const UNKNOWN_SENSOR: &str = "0";

/// Fixed sensor placement: (sensor id, room)
const SENSORS: [(&str, &str); 3] = [("1", "Living Room"), ("2", "Bedroom"), ("3", "Kitchen")];

/// A generated temperature reading
#[derive(Debug, Clone, Serialize)]
pub struct TemperatureReading {
    pub value: f64,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
    pub location: String,
    pub status: String,
    pub sensor_id: String,
    pub sensor_type: String,
    pub description: String,
}

pub fn location_for_sensor(sensor_id: &str) -> &'static str {
    SENSORS
        .iter()
        .find(|(id, _)| *id == sensor_id)
        .map_or(UNKNOWN_LOCATION, |&(_, room)| room)
}

pub fn sensor_for_location(location: &str) -> &'static str {
    SENSORS
        .iter()
        .find(|(_, room)| *room == location)
        .map_or(UNKNOWN_SENSOR, |&(id, _)| id)
}

/// Reading for a location, with the sensor id derived from it
pub fn reading_at_location(rng: &mut impl Rng, location: &str) -> TemperatureReading {
    generate_reading(rng, location, sensor_for_location(location))
}

/// Reading for a sensor, with the location derived from it
pub fn reading_for_sensor(rng: &mut impl Rng, sensor_id: &str) -> TemperatureReading {
    generate_reading(rng, location_for_sensor(sensor_id), sensor_id)
}

fn generate_reading(rng: &mut impl Rng, location: &str, sensor_id: &str) -> TemperatureReading {
    TemperatureReading {
        value: rng.gen_range(VALUE_MIN..VALUE_MAX),
        unit: "°C".to_string(),
        timestamp: Utc::now(),
        location: location.to_string(),
        status: "active".to_string(),
        sensor_id: sensor_id.to_string(),
        sensor_type: "Temperature sensor".to_string(),
        description: location.to_string(),
    }
}

/// Body of `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
