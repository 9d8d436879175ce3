//! Service information and Prometheus exposition.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use super::AppState;

/// `GET /`
pub async fn home_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Admin Service",
        "service": state.service.name,
        "description": "Administrative management service for xShop.ai platform",
        "environment": state.service.environment.as_str(),
    }))
}

/// `GET /version`
pub async fn version_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "version": state.service.version }))
}

/// `GET /metrics` in Prometheus text format, or 503 without a recorder.
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}
