use crate::model::{reading_at_location, reading_for_sensor, HealthResponse, TemperatureReading};
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct TemperatureQuery {
    location: Option<String>,
}

pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health).fallback(not_found))
        .route("/temperature", get(temperature_at_location).fallback(not_found))
        .route("/temperature/:id", get(temperature_for_sensor).fallback(not_found))
        .fallback(not_found)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn temperature_at_location(
    query: Result<Query<TemperatureQuery>, QueryRejection>,
) -> Result<Json<TemperatureReading>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let location = params
        .location
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Location is required".to_string()))?;

    Ok(Json(reading_at_location(&mut rand::thread_rng(), &location)))
}

async fn temperature_for_sensor(
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<TemperatureReading>, ApiError> {
    let Path(sensor_id) = path.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if sensor_id.is_empty() {
        return Err(ApiError::BadRequest("Sensor id is required".to_string()));
    }

    Ok(Json(reading_for_sensor(&mut rand::thread_rng(), &sensor_id)))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => {
                debug!("Rejected request: {}", message);
                (StatusCode::BAD_REQUEST, message)
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
