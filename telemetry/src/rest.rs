use crate::errors::Error;
use crate::metrics::{gather_metrics, INVALID_MESSAGES_TOTAL, MESSAGES_TOTAL};
use crate::model::{HealthResponse, RecordResponse, TelemetryResponse};
use crate::store::TelemetryLog;
use axum::{
    async_trait,
    extract::{FromRequest, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, Clone)]
struct AppState {
    log: Arc<TelemetryLog>,
}

pub fn create_router(log: Arc<TelemetryLog>) -> Router {
    let state = AppState { log };

    Router::new()
        .route(
            "/telemetry",
            get(list_telemetry).post(record_telemetry).fallback(not_found),
        )
        .route("/health", get(health).fallback(not_found))
        .route("/metrics", get(metrics_handler).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
}

async fn record_telemetry(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody,
) -> Result<(StatusCode, Json<RecordResponse>), ApiError> {
    let (record, count) = state.log.record(payload)?;

    MESSAGES_TOTAL.inc();
    debug!("Stored telemetry record #{}", count);

    Ok((
        StatusCode::CREATED,
        Json(RecordResponse {
            message: "Telemetry received",
            data: record,
            count,
        }),
    ))
}

async fn list_telemetry(State(state): State<AppState>) -> Json<TelemetryResponse> {
    let data = state.log.snapshot();
    Json(TelemetryResponse {
        total: data.len(),
        data,
    })
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "telemetry",
        records: state.log.len(),
        timestamp: Utc::now(),
    })
}

async fn metrics_handler() -> Result<String, ApiError> {
    gather_metrics().map_err(|e| ApiError::Internal(Error::from(e).to_string()))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
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
                "Invalid JSON format: {}",
                rejection.body_text()
            ))),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound,
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidPayload(_) => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => {
                INVALID_MESSAGES_TOTAL.inc();
                debug!("Rejected telemetry: {}", message);
                (StatusCode::BAD_REQUEST, message)
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::Internal(message) => {
                error!("API error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn send(router: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(b) => {
                builder = builder.header("content-type", "application/json");
                Body::from(b.to_string())
            }
            None => Body::empty(),
        };

        let resp = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_post_telemetry() {
        let router = create_router(Arc::new(TelemetryLog::new()));

        let (status, json) = send(&router, "POST", "/telemetry", Some(r#"{"temp": 21.5}"#)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["message"], "Telemetry received");
        assert_eq!(json["data"]["temp"], 21.5);
        assert!(chrono::DateTime::parse_from_rfc3339(json["data"]["timestamp"].as_str().unwrap()).is_ok());
        assert_eq!(json["count"], 1);
    }

    #[tokio::test]
    async fn test_posts_then_list_in_order() {
        let log = Arc::new(TelemetryLog::new());
        let router = create_router(log.clone());

        for i in 0..4 {
            let body = json!({"sensor_id": 1, "value": 20.0 + i as f64}).to_string();
            let (status, json) = send(&router, "POST", "/telemetry", Some(&body)).await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(json["count"], i + 1);
        }

        let (status, json) = send(&router, "GET", "/telemetry", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 4);
        let data = json["data"].as_array().unwrap();
        assert_eq!(data.len(), 4);
        for (i, record) in data.iter().enumerate() {
            assert_eq!(record["value"], 20.0 + i as f64);
            assert!(record["timestamp"].is_string());
        }
    }

    #[tokio::test]
    async fn test_empty_list() {
        let router = create_router(Arc::new(TelemetryLog::new()));

        let (status, json) = send(&router, "GET", "/telemetry", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"data": [], "total": 0}));
    }

    #[tokio::test]
    async fn test_rejects_malformed_and_non_object() {
        let log = Arc::new(TelemetryLog::new());
        let router = create_router(log.clone());

        for body in ["{temp: 1", "[1, 2, 3]", "42", "null"] {
            let (status, json) = send(&router, "POST", "/telemetry", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
            assert!(json["error"].is_string());
        }
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_missing_content_type() {
        let router = create_router(Arc::new(TelemetryLog::new()));
        let req = Request::builder()
            .method("POST")
            .uri("/telemetry")
            .body(Body::from(r#"{"temp": 1}"#))
            .unwrap();

        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health_reports_record_count() {
        let log = Arc::new(TelemetryLog::new());
        log.record(json!({"temp": 19.0})).unwrap();
        let router = create_router(log);

        let (status, json) = send(&router, "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["records"], 1);
    }

    #[tokio::test]
    async fn test_unknown_route_and_method() {
        let router = create_router(Arc::new(TelemetryLog::new()));

        let (status, json) = send(&router, "GET", "/devices", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Not found");

        let (status, _) = send(&router, "DELETE", "/telemetry", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    fn metric_value(text: &str, name: &str) -> f64 {
        text.lines()
            .find_map(|line| line.strip_prefix(name)?.strip_prefix(' '))
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or_else(|| panic!("{name} missing from:\n{text}"))
    }

    #[tokio::test]
    async fn test_metrics_route_counts_messages() {
        crate::metrics::init_for_tests();
        let router = create_router(Arc::new(TelemetryLog::new()));

        let (status, _) = send(&router, "POST", "/telemetry", Some(r#"{"temp": 21.5}"#)).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&router, "POST", "/telemetry", Some("[1]")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(metric_value(&text, "telemetry_messages_total") >= 1.0);
        assert!(metric_value(&text, "telemetry_invalid_messages_total") >= 1.0);
        assert!(metric_value(&text, "telemetry_records_stored") >= 1.0);
    }
}
