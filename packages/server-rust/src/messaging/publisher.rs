//! Envelope-building publish helpers on top of the [`MessagingHub`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use admin_gateway_core::{EnvelopeBuilder, EventEnvelope};
use futures_util::FutureExt;
use serde_json::Value;
use tracing::{debug, error, info};

use super::factory::MessagingHub;

/// A publish that did not reach the broker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("event {event_id} was not accepted on topic {topic}")]
    NotAccepted { topic: String, event_id: String },

    #[error("messaging provider failed while publishing to {topic}: {message}")]
    ProviderPanicked { topic: String, message: String },
}

impl DeliveryError {
    #[must_use]
    pub fn topic(&self) -> &str {
        match self {
            DeliveryError::NotAccepted { topic, .. }
            | DeliveryError::ProviderPanicked { topic, .. } => topic,
        }
    }
}

/// Wraps payloads in envelopes and hands them to the current provider.
///
/// Two entry points with different failure contracts:
/// - [`publish_event`](Self::publish_event) never fails; problems are logged
///   and swallowed.
/// - [`deliver`](Self::deliver) reports a failed publish so callers whose
///   correctness depends on delivery can escalate it.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    hub: Arc<MessagingHub>,
    envelopes: EnvelopeBuilder,
}

impl EventPublisher {
    #[must_use]
    pub fn new(hub: Arc<MessagingHub>) -> Self {
        Self::with_envelope_builder(hub, EnvelopeBuilder::default())
    }

    #[must_use]
    pub fn with_envelope_builder(hub: Arc<MessagingHub>, envelopes: EnvelopeBuilder) -> Self {
        Self { hub, envelopes }
    }

    #[must_use]
    pub fn hub(&self) -> &Arc<MessagingHub> {
        &self.hub
    }

    /// Best-effort publish. Never fails and never panics, whatever the
    /// provider does.
    pub async fn publish_event(&self, topic: &str, payload: Value) {
        if let Err(e) = self.deliver(topic, payload, None).await {
            error!(topic, error = %e, "failed to publish event");
        }
    }

    /// Builds an envelope for `payload` and publishes it on `topic`.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::NotAccepted`] when the provider returned `false`.
    /// - [`DeliveryError::ProviderPanicked`] when constructing the provider or
    ///   publishing panicked.
    pub async fn deliver(
        &self,
        topic: &str,
        payload: Value,
        correlation_id: Option<&str>,
    ) -> Result<EventEnvelope, DeliveryError> {
        let envelope = self.envelopes.build(topic, payload, correlation_id);

        debug!(
            topic,
            event_id = %envelope.event_id,
            trace_id = %envelope.metadata.trace_id,
            span_id = %envelope.metadata.span_id,
            "publishing event"
        );

        let provider = std::panic::catch_unwind(AssertUnwindSafe(|| self.hub.provider()))
            .map_err(|panic| panicked(topic, &*panic))?;

        let accepted = AssertUnwindSafe(provider.publish_event(topic, &envelope))
            .catch_unwind()
            .await;

        match accepted {
            Ok(true) => {
                record(topic, "published");
                info!(
                    topic,
                    provider = provider.name(),
                    event_id = %envelope.event_id,
                    correlation_id = %envelope.correlation_id(),
                    "event published"
                );
                Ok(envelope)
            }
            Ok(false) => {
                record(topic, "rejected");
                Err(DeliveryError::NotAccepted {
                    topic: topic.to_string(),
                    event_id: envelope.event_id,
                })
            }
            Err(panic) => {
                record(topic, "panicked");
                Err(panicked(topic, &*panic))
            }
        }
    }
}

fn panicked(topic: &str, panic: &(dyn Any + Send)) -> DeliveryError {
    let message = panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    DeliveryError::ProviderPanicked {
        topic: topic.to_string(),
        message,
    }
}

fn record(topic: &str, outcome: &'static str) {
    metrics::counter!(
        "admin_gateway_events_total",
        "topic" => topic.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
