use std::time::Duration;

use admin_gateway_core::EventEnvelope;
use admin_gateway_server::invoke::SidecarEndpoint;
use admin_gateway_server::messaging::{MessagingProvider, SidecarProvider};
use httpmock::prelude::*;
use serde_json::json;

fn sidecar(server: &MockServer) -> SidecarProvider {
    SidecarProvider::new(
        SidecarEndpoint {
            host: server.host(),
            port: server.port(),
        },
        "pubsub",
        Duration::from_secs(5),
    )
}

fn envelope(topic: &str) -> EventEnvelope {
    EventEnvelope::build(topic, json!({ "orderId": "o1", "traceId": "t-1" }), None)
}

#[tokio::test]
async fn publish_posts_the_envelope_to_the_topic() {
    let server = MockServer::start_async().await;
    let envelope = envelope("payment.processed");
    let wire = serde_json::to_value(&envelope).unwrap();
    assert_eq!(wire["eventType"], "payment.processed");
    assert_eq!(wire["source"], "admin-service");

    let mock = server
        .mock_async(move |when, then| {
            when.method(POST)
                .path("/v1.0/publish/pubsub/payment.processed")
                .json_body(wire);
            then.status(204);
        })
        .await;

    let provider = sidecar(&server);
    assert!(provider.publish_event("payment.processed", &envelope).await);
    mock.assert_async().await;
}

#[tokio::test]
async fn rejected_publish_yields_false() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1.0/publish/pubsub/payment.failed");
            then.status(500).body("component pubsub not found");
        })
        .await;

    let provider = sidecar(&server);
    assert!(!provider.publish_event("payment.failed", &envelope("payment.failed")).await);
    mock.assert_async().await;
}

#[tokio::test]
async fn client_is_rebuilt_after_close() {
    let server = MockServer::start_async().await;
    let processed = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1.0/publish/pubsub/payment.processed");
            then.status(204);
        })
        .await;
    let failed = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1.0/publish/pubsub/payment.failed");
            then.status(200);
        })
        .await;

    let provider = sidecar(&server);
    assert!(!provider.is_connected());

    assert!(provider.publish_event("payment.processed", &envelope("payment.processed")).await);
    assert!(provider.is_connected());

    provider.close().await;
    assert!(!provider.is_connected());

    assert!(provider.publish_event("payment.failed", &envelope("payment.failed")).await);
    assert!(provider.is_connected());

    processed.assert_async().await;
    failed.assert_async().await;
}
