//! The messaging provider capability.

use admin_gateway_core::EventEnvelope;
use async_trait::async_trait;
use http::StatusCode;

/// A broker-facing publisher.
///
/// Implementations never surface publish failures as errors: any problem is
/// logged and reported as `false`. Callers that need delivery decide for
/// themselves whether `false` is fatal.
#[async_trait]
pub trait MessagingProvider: Send + Sync {
    /// Short provider identifier for logs (`"sidecar"`, `"memory"`, ...).
    fn name(&self) -> &'static str;

    /// Hands `envelope` to the broker on `topic`.
    ///
    /// Returns `true` only when the broker confirmed the handoff.
    async fn publish_event(&self, topic: &str, envelope: &EventEnvelope) -> bool;

    /// Releases any held client handle. Idempotent.
    async fn close(&self);
}

/// Why a provider could not hand an envelope to its broker.
///
/// Internal to providers; the trait boundary converts it to `false`.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("broker client unavailable: {0}")]
    Client(#[source] reqwest::Error),

    #[error("broker request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("broker rejected event with HTTP {}: {body}", .status.as_u16())]
    Rejected { status: StatusCode, body: String },
}
