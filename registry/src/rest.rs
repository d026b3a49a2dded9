use crate::db::DeviceStore;
use crate::errors::Error;
use crate::metrics::{gather_metrics, DB_FAILURES_TOTAL, DB_UP, DEVICES_CREATED_TOTAL, INVALID_REQUESTS_TOTAL};
use crate::model::{DatabaseStatus, Device, DeviceId, HealthResponse, InvalidDeviceId};
use crate::validate::validate_new_device;
use axum::{
    async_trait,
    extract::{rejection::PathRejection, FromRequest, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const SERVICE_NAME: &str = "device-registry";

#[derive(Clone)]
struct AppState {
    store: Arc<dyn DeviceStore>,
}

pub fn create_router(store: Arc<dyn DeviceStore>) -> Router {
    let state = AppState { store };

    // Unsupported methods on known paths are reported as 404, same as unknown paths
    Router::new()
        .route("/health", get(health).fallback(not_found))
        .route(
            "/devices",
            get(list_devices).post(create_device).fallback(not_found),
        )
        .route("/devices/:id", get(get_device).fallback(not_found))
        .route("/metrics", get(metrics_handler).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.store.ping().await {
        Ok(()) => {
            DB_UP.set(1.0);
            DatabaseStatus::Connected
        }
        Err(e) => {
            warn!("Health probe could not reach database: {}", e);
            DB_UP.set(0.0);
            DatabaseStatus::Disconnected
        }
    };

    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        database,
        timestamp: Utc::now(),
    })
}

async fn list_devices(State(state): State<AppState>) -> Result<Json<Vec<Device>>, ApiError> {
    let devices = state.store.list().await?;
    Ok(Json(devices))
}

async fn get_device(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Device>, ApiError> {
    let Path(raw_id) = path.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let id = match raw_id.parse::<DeviceId>() {
        Ok(id) => id,
        Err(InvalidDeviceId::NotDigits) => {
            return Err(ApiError::BadRequest(InvalidDeviceId::NotDigits.to_string()))
        }
        // Larger than any BIGSERIAL value, so no row can match
        Err(InvalidDeviceId::OutOfRange) => return Err(ApiError::device_not_found()),
    };

    state
        .store
        .get(id.get())
        .await?
        .map(Json)
        .ok_or_else(ApiError::device_not_found)
}

async fn create_device(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<Device>), ApiError> {
    let new_device = validate_new_device(&body)?;
    let device = state.store.create(&new_device).await?;

    DEVICES_CREATED_TOTAL.inc();
    info!(
        "Created device {} ({}, {}, {})",
        device.id, device.name, device.location, device.device_type
    );

    Ok((StatusCode::CREATED, Json(device)))
}

async fn metrics_handler() -> Result<String, ApiError> {
    gather_metrics().map_err(|e| ApiError::Internal(Error::from(e).to_string()))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

/// JSON request body. Rejections become JSON client errors instead of axum's plain-text ones.
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::BadRequest(format!(
                "Invalid JSON: {}",
                rejection.body_text()
            ))),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    fn device_not_found() -> Self {
        ApiError::NotFound("Device not found".to_string())
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if is_storage_failure(&err) {
            DB_FAILURES_TOTAL.inc();
        }
        match err {
            Error::Validation(message) => ApiError::BadRequest(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

fn is_storage_failure(err: &Error) -> bool {
    matches!(err, Error::Database(_) | Error::Migration(_))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => {
                INVALID_REQUESTS_TOTAL.inc();
                debug!("Rejected request: {}", message);
                (StatusCode::BAD_REQUEST, message)
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Internal(message) => {
                error!("API error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
