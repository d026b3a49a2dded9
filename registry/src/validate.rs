use crate::errors::{Error, Result};
use crate::model::NewDevice;
use serde_json::{Map, Value};

const REQUIRED_FIELDS: [&str; 3] = ["name", "location", "type"];

/// Validates a `POST /devices` body and turns it into a [`NewDevice`]
pub fn validate_new_device(body: &Value) -> Result<NewDevice> {
    let object = body
        .as_object()
        .ok_or_else(|| Error::Validation("Request body must be a JSON object".to_string()))?;

    // Presence first, so the error names the first missing field
    for field in REQUIRED_FIELDS {
        if !object.contains_key(field) {
            return Err(Error::Validation(format!(
                "Missing required field: {}",
                field
            )));
        }
    }

    Ok(NewDevice {
        name: string_field(object, "name")?,
        location: string_field(object, "location")?,
        device_type: string_field(object, "type")?,
    })
}

fn string_field(object: &Map<String, Value>, field: &str) -> Result<String> {
    match object.get(field) {
        // TEXT columns cannot hold NUL bytes
        Some(Value::String(s)) if s.contains('\0') => Err(Error::Validation(format!(
            "Field '{}' must not contain NUL",
            field
        ))),
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(Error::Validation(format!(
            "Field '{}' must be a string",
            field
        ))),
    }
}
