use std::sync::atomic::{AtomicBool, Ordering};

use admin_gateway_core::EventEnvelope;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use super::provider::MessagingProvider;

/// Keeps published envelopes in memory. For local development and tests.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    published: Mutex<Vec<(String, EventEnvelope)>>,
    closed: AtomicBool,
}

impl InMemoryProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every `(topic, envelope)` published so far.
    #[must_use]
    pub fn published(&self) -> Vec<(String, EventEnvelope)> {
        self.published.lock().clone()
    }

    /// Envelopes published on `topic`, oldest first.
    #[must_use]
    pub fn published_on(&self, topic: &str) -> Vec<EventEnvelope> {
        self.published
            .lock()
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, e)| e.clone())
            .collect()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MessagingProvider for InMemoryProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn publish_event(&self, topic: &str, envelope: &EventEnvelope) -> bool {
        debug!(provider = "memory", topic, event_id = %envelope.event_id, "recorded event");
        self.published
            .lock()
            .push((topic.to_string(), envelope.clone()));
        true
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }
}
