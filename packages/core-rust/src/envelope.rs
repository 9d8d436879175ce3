//! Event envelope wire format and builder.
//!
//! Every domain event leaves the gateway wrapped in an [`EventEnvelope`]:
//!
//! ```json
//! {
//!   "eventId": "1718000000000-k3j9x0a",
//!   "eventType": "payment.processed",
//!   "timestamp": "2024-06-10T06:13:20.000Z",
//!   "source": "admin-service",
//!   "data": { "orderId": "..." },
//!   "metadata": {
//!     "traceId": "...", "spanId": "...",
//!     "correlationId": "...", "version": "1.0"
//!   }
//! }
//! ```
//!
//! Consumers downstream parse this shape, so field names and the `version`
//! literal are fixed.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::{ClockSource, SystemClock};

/// Fixed `source` of every envelope published by the gateway.
pub const EVENT_SOURCE: &str = "admin-service";

/// Envelope schema version carried in `metadata.version`.
pub const SCHEMA_VERSION: &str = "1.0";

/// Placeholder used when no trace id can be found.
pub const NO_TRACE: &str = "no-trace";

/// Placeholder used when no span id can be found.
pub const NO_SPAN: &str = "no-span";

const EVENT_ID_SUFFIX_LEN: usize = 7;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Uniform wrapper around a domain event payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    /// Unique per publish attempt: `<millis>-<7 base36 chars>`.
    pub event_id: String,
    /// Topic name the envelope is published to.
    pub event_type: String,
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub timestamp: String,
    /// Always [`EVENT_SOURCE`] for envelopes built here.
    pub source: String,
    /// Opaque domain payload.
    pub data: Value,
    pub metadata: EventMetadata,
}

/// Tracing and schema metadata attached to an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    pub trace_id: String,
    pub span_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub correlation_id: Option<String>,
    pub version: String,
}

impl EventEnvelope {
    /// Builds an envelope stamped with the system clock.
    ///
    /// Shorthand for [`EnvelopeBuilder::default`] followed by
    /// [`EnvelopeBuilder::build`].
    #[must_use]
    pub fn build(topic: &str, payload: Value, correlation_id: Option<&str>) -> Self {
        EnvelopeBuilder::default().build(topic, payload, correlation_id)
    }

    /// Correlation id, falling back to the trace id.
    #[must_use]
    pub fn correlation_id(&self) -> &str {
        self.metadata
            .correlation_id
            .as_deref()
            .unwrap_or(&self.metadata.trace_id)
    }
}

/// Builds envelopes from a clock source and random id suffixes.
///
/// The builder holds no per-envelope state and can be shared freely.
#[derive(Clone)]
pub struct EnvelopeBuilder {
    clock: Arc<dyn ClockSource>,
}

impl Default for EnvelopeBuilder {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for EnvelopeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeBuilder").finish_non_exhaustive()
    }
}

impl EnvelopeBuilder {
    #[must_use]
    pub fn new(clock: Arc<dyn ClockSource>) -> Self {
        Self { clock }
    }

    /// Wraps `payload` for publication on `topic`.
    ///
    /// `metadata.traceId` / `spanId` are read from the payload's `traceId` /
    /// `spanId` string fields. The correlation id is the caller's value when
    /// given, else the payload trace id, else [`NO_TRACE`].
    #[must_use]
    pub fn build(
        &self,
        topic: &str,
        payload: Value,
        correlation_id: Option<&str>,
    ) -> EventEnvelope {
        let millis = self.clock.now();
        let trace_id = string_field(&payload, "traceId").unwrap_or(NO_TRACE).to_string();
        let span_id = string_field(&payload, "spanId").unwrap_or(NO_SPAN).to_string();
        let correlation_id = correlation_id
            .filter(|id| !id.is_empty())
            .map_or_else(|| trace_id.clone(), str::to_string);

        EventEnvelope {
            event_id: generate_event_id(millis),
            event_type: topic.to_string(),
            timestamp: iso_timestamp(millis),
            source: EVENT_SOURCE.to_string(),
            data: payload,
            metadata: EventMetadata {
                trace_id,
                span_id,
                correlation_id: Some(correlation_id),
                version: SCHEMA_VERSION.to_string(),
            },
        }
    }
}

fn string_field<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// `<millis>-<suffix>` where the suffix is seven random base36 characters.
///
/// Collision-resistant, not collision-proof: envelopes are never used as
/// idempotency keys.
#[must_use]
pub fn generate_event_id(millis: u64) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..EVENT_ID_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();
    format!("{millis}-{suffix}")
}

/// Formats epoch millis the way JavaScript's `Date.toISOString()` does.
fn iso_timestamp(millis: u64) -> String {
    let dt = i64::try_from(millis)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_default();
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use serde_json::json;
    use std::collections::HashSet;

    fn builder() -> EnvelopeBuilder {
        // 2024-06-10T06:13:20.000Z
        EnvelopeBuilder::new(Arc::new(FixedClock(1_718_000_000_000)))
    }

    #[test]
    fn build_fills_fixed_fields() {
        let env = builder().build("payment.processed", json!({ "orderId": "o-1" }), None);

        assert_eq!(env.event_type, "payment.processed");
        assert_eq!(env.source, "admin-service");
        assert_eq!(env.timestamp, "2024-06-10T06:13:20.000Z");
        assert_eq!(env.metadata.version, "1.0");
        assert_eq!(env.data, json!({ "orderId": "o-1" }));
        assert!(env.event_id.starts_with("1718000000000-"));
    }

    #[test]
    fn trace_and_span_come_from_payload() {
        let payload = json!({ "traceId": "t-123", "spanId": "s-9" });
        let env = builder().build("payment.failed", payload, None);

        assert_eq!(env.metadata.trace_id, "t-123");
        assert_eq!(env.metadata.span_id, "s-9");
        assert_eq!(env.metadata.correlation_id.as_deref(), Some("t-123"));
    }

    #[test]
    fn missing_trace_uses_placeholders() {
        let env = builder().build("payment.failed", json!({}), None);

        assert_eq!(env.metadata.trace_id, NO_TRACE);
        assert_eq!(env.metadata.span_id, NO_SPAN);
        assert_eq!(env.correlation_id(), NO_TRACE);
    }

    #[test]
    fn caller_correlation_id_wins() {
        let payload = json!({ "traceId": "t-123" });
        let env = builder().build("payment.processed", payload, Some("corr-7"));

        assert_eq!(env.metadata.trace_id, "t-123");
        assert_eq!(env.correlation_id(), "corr-7");
    }

    #[test]
    fn empty_caller_correlation_id_is_ignored() {
        let env = builder().build("t", json!({ "traceId": "t-1" }), Some(""));
        assert_eq!(env.correlation_id(), "t-1");
    }

    #[test]
    fn non_string_trace_id_is_ignored() {
        let env = builder().build("t", json!({ "traceId": 42 }), None);
        assert_eq!(env.metadata.trace_id, NO_TRACE);
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let env = builder().build("payment.processed", json!({ "traceId": "t" }), None);
        let wire = serde_json::to_value(&env).unwrap();

        for key in ["eventId", "eventType", "timestamp", "source", "data", "metadata"] {
            assert!(wire.get(key).is_some(), "missing {key}");
        }
        assert_eq!(wire["metadata"]["traceId"], "t");
        assert_eq!(wire["metadata"]["correlationId"], "t");
        assert_eq!(wire["metadata"]["version"], "1.0");
    }

    #[test]
    fn absent_correlation_id_is_omitted_on_the_wire() {
        let mut env = builder().build("t", json!({}), None);
        env.metadata.correlation_id = None;
        let wire = serde_json::to_value(&env).unwrap();
        assert!(wire["metadata"].get("correlationId").is_none());
    }

    #[test]
    fn event_id_shape() {
        let id = generate_event_id(1_700_000_000_000);
        let (millis, suffix) = id.split_once('-').unwrap();

        assert_eq!(millis, "1700000000000");
        assert_eq!(suffix.len(), 7);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn event_ids_differ_within_one_millisecond() {
        let ids: HashSet<String> = (0..1_000).map(|_| generate_event_id(1)).collect();
        // 36^7 suffixes; a collision among 1000 draws is vanishingly unlikely.
        assert!(ids.len() > 995);
    }
}
