use admin_gateway_core::ServiceName;
use http::StatusCode;

/// A downstream call that did not produce a usable response.
///
/// The `Display` form of [`InvocationError::Status`] is `HTTP {status}: {body}`,
/// the only diagnostic the caller gets from a failed downstream call.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// The service answered outside the 2xx range.
    #[error("HTTP {}: {body}", .status.as_u16())]
    Status {
        service: ServiceName,
        status: StatusCode,
        body: String,
    },

    /// Connection failure, timeout, or an unreadable response body.
    #[error("{service} unreachable: {source}")]
    Transport {
        service: ServiceName,
        #[source]
        source: reqwest::Error,
    },

    /// The service declared JSON but sent something else.
    #[error("{service} returned malformed JSON: {source}")]
    Decode {
        service: ServiceName,
        #[source]
        source: serde_json::Error,
    },

    /// A caller-supplied header could not be put on the wire.
    #[error("invalid header {name:?} for {service}")]
    InvalidHeader { service: ServiceName, name: String },
}

impl InvocationError {
    #[must_use]
    pub fn service(&self) -> ServiceName {
        match self {
            InvocationError::Status { service, .. }
            | InvocationError::Transport { service, .. }
            | InvocationError::Decode { service, .. }
            | InvocationError::InvalidHeader { service, .. } => *service,
        }
    }

    /// The downstream status code, when the service answered at all.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            InvocationError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_status(&self, code: StatusCode) -> bool {
        self.status() == Some(code)
    }
}
