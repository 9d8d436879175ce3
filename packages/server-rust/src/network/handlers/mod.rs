//! Axum handlers and the shared [`AppState`].

pub mod health;
pub mod home;
pub mod orders;
pub mod payments;
pub mod users;

pub use health::{health_handler, liveness_handler, readiness_handler};
pub use home::{home_handler, metrics_handler, version_handler};

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;
use super::{NetworkConfig, ShutdownController};
use crate::clients::DomainClients;
use crate::config::ServiceInfo;
use crate::messaging::EventPublisher;

/// State shared by every handler. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub shutdown: Arc<ShutdownController>,
    pub config: Arc<NetworkConfig>,
    pub service: Arc<ServiceInfo>,
    /// Downstream user/order/payment/auth clients.
    pub clients: DomainClients,
    pub publisher: EventPublisher,
    /// Present when a Prometheus recorder was installed at startup.
    pub metrics: Option<PrometheusHandle>,
    pub start_time: Instant,
}

/// Downstream JSON passed through as-is; an empty downstream body becomes
/// `null`.
pub(crate) fn passthrough(body: Option<Value>) -> Json<Value> {
    Json(body.unwrap_or(Value::Null))
}

/// Parses an optional JSON request body. An empty body yields `T::default()`.
pub(crate) fn optional_json<T>(body: &Bytes, invalid: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|_| ApiError::Validation(invalid.to_string()))
}
