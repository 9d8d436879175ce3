//! Publishing through the sidecar's pub/sub API.

use std::time::Duration;

use admin_gateway_core::EventEnvelope;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, error, info};

use super::provider::{MessagingProvider, PublishError};
use crate::invoke::SidecarEndpoint;

/// Publishes envelopes with `POST /v1.0/publish/{pubsub}/{topic}` on the
/// local sidecar.
///
/// The HTTP client is created on the first publish and reused until
/// [`close`](MessagingProvider::close) drops it; the next publish after a
/// close builds a fresh one.
#[derive(Debug)]
pub struct SidecarProvider {
    endpoint: SidecarEndpoint,
    pubsub_name: String,
    timeout: Duration,
    client: Mutex<Option<reqwest::Client>>,
}

impl SidecarProvider {
    #[must_use]
    pub fn new(endpoint: SidecarEndpoint, pubsub_name: &str, timeout: Duration) -> Self {
        info!(
            provider = "sidecar",
            pubsub = pubsub_name,
            sidecar = %endpoint.base_url(),
            "initialized sidecar messaging provider"
        );
        Self {
            endpoint,
            pubsub_name: pubsub_name.to_string(),
            timeout,
            client: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn pubsub_name(&self) -> &str {
        &self.pubsub_name
    }

    /// Whether a client handle is currently held.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.client.lock().is_some()
    }

    #[must_use]
    pub fn publish_url(&self, topic: &str) -> String {
        format!(
            "{}/v1.0/publish/{}/{topic}",
            self.endpoint.base_url(),
            self.pubsub_name
        )
    }

    fn client(&self) -> Result<reqwest::Client, PublishError> {
        let mut slot = self.client.lock();
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(PublishError::Client)?;
        *slot = Some(client.clone());
        Ok(client)
    }

    async fn try_publish(&self, topic: &str, envelope: &EventEnvelope) -> Result<(), PublishError> {
        let client = self.client()?;
        let response = client
            .post(self.publish_url(topic))
            .json(envelope)
            .send()
            .await
            .map_err(PublishError::Transport)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(PublishError::Rejected { status, body })
        }
    }
}

#[async_trait]
impl MessagingProvider for SidecarProvider {
    fn name(&self) -> &'static str {
        "sidecar"
    }

    async fn publish_event(&self, topic: &str, envelope: &EventEnvelope) -> bool {
        match self.try_publish(topic, envelope).await {
            Ok(()) => {
                debug!(
                    provider = "sidecar",
                    topic,
                    event_id = %envelope.event_id,
                    correlation_id = %envelope.correlation_id(),
                    "published event"
                );
                true
            }
            Err(e) => {
                error!(
                    provider = "sidecar",
                    topic,
                    event_id = %envelope.event_id,
                    correlation_id = %envelope.correlation_id(),
                    error = %e,
                    "failed to publish event"
                );
                false
            }
        }
    }

    async fn close(&self) {
        if self.client.lock().take().is_some() {
            info!(provider = "sidecar", "closed sidecar messaging provider");
        }
    }
}
