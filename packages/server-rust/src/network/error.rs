//! The single HTTP error type of the admin API.
//!
//! Every failure leaves the gateway as `{"success": false, "error": "..."}`
//! with the status chosen by [`ApiError::status`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, warn};

use super::auth::AuthError;
use crate::clients::ClientError;
use crate::invoke::InvocationError;
use crate::messaging::DeliveryError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Rejected before any outbound call.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// A downstream non-2xx answer, surfaced with the downstream status.
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("{0}")]
    Internal(String),

    #[error("Service is shutting down")]
    ShuttingDown,
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(e) => e.status(),
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<InvocationError> for ApiError {
    fn from(err: InvocationError) -> Self {
        if let InvocationError::Status { status, body, .. } = &err {
            return ApiError::Upstream {
                status: *status,
                message: downstream_message(body).unwrap_or_else(|| err.to_string()),
            };
        }
        ApiError::Internal(err.to_string())
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::MissingCredential => ApiError::Auth(AuthError::MissingToken),
            ClientError::Invocation(e) => e.into(),
        }
    }
}

impl From<DeliveryError> for ApiError {
    fn from(err: DeliveryError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %message, "request rejected");
        }

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

/// The `message` (or `error`) field of a JSON error body from a downstream
/// service.
pub(crate) fn downstream_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}
