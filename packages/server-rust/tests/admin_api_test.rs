use std::sync::Arc;
use std::time::{Duration, Instant};

use admin_gateway_core::{EventEnvelope, ServiceName};
use admin_gateway_server::clients::DomainClients;
use admin_gateway_server::config::ServiceInfo;
use admin_gateway_server::invoke::{InvocationConfig, ServiceDirectory, ServiceInvoker};
use admin_gateway_server::messaging::{
    EventPublisher, InMemoryProvider, MessagingHub, MessagingProvider,
};
use admin_gateway_server::network::{
    build_router, AppState, NetworkConfig, ShutdownController, TokenVerifier,
};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use httpmock::prelude::*;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "integration-secret";
const ISSUER: &str = "xshopai-auth-service";
const AUDIENCE: &str = "xshopai-services";
const ADMIN_ID: &str = "507f1f77bcf86cd799439011";

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// A broker that is down: every publish panics.
struct PanickingProvider;

#[async_trait]
impl MessagingProvider for PanickingProvider {
    fn name(&self) -> &'static str {
        "panicking"
    }

    async fn publish_event(&self, _topic: &str, _envelope: &EventEnvelope) -> bool {
        panic!("broker connection refused")
    }

    async fn close(&self) {}
}

/// A broker that is reachable but refuses every event.
struct RefusingProvider;

#[async_trait]
impl MessagingProvider for RefusingProvider {
    fn name(&self) -> &'static str {
        "refusing"
    }

    async fn publish_event(&self, _topic: &str, _envelope: &EventEnvelope) -> bool {
        false
    }

    async fn close(&self) {}
}

struct Gateway {
    router: Router,
    shutdown: Arc<ShutdownController>,
}

fn gateway(server: &MockServer, provider: Arc<dyn MessagingProvider>) -> Gateway {
    let mut directory = ServiceDirectory::empty("test");
    for service in ServiceName::ALL {
        directory.set_base_url(service, &server.base_url());
    }
    let invoker = ServiceInvoker::new(&InvocationConfig {
        directory,
        timeout: Duration::from_secs(5),
        ..InvocationConfig::default()
    })
    .unwrap();

    let shutdown = Arc::new(ShutdownController::new());
    shutdown.mark_ready();

    let state = AppState {
        shutdown: Arc::clone(&shutdown),
        config: Arc::new(NetworkConfig::default()),
        service: Arc::new(ServiceInfo::default()),
        clients: DomainClients::new(&invoker),
        publisher: EventPublisher::new(Arc::new(MessagingHub::with_provider(provider))),
        metrics: None,
        start_time: Instant::now(),
    };
    let verifier = Arc::new(TokenVerifier::new(SECRET, ISSUER, AUDIENCE));

    Gateway {
        router: build_router(&NetworkConfig::default(), state, verifier),
        shutdown,
    }
}

fn token(roles: &[&str]) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &json!({
            "id": ADMIN_ID,
            "email": "admin@xshopai.com",
            "roles": roles,
            "iss": ISSUER,
            "aud": AUDIENCE,
            "exp": chrono::Utc::now().timestamp() + 3600,
        }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn admin_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token(&["admin"])))
        .header("x-request-id", "trace-abc");
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn mock_payment(server: &MockServer, order_id: &str, status: &str) {
    let path = format!("/api/payments/order/{order_id}");
    let payment = json!({
        "id": format!("pay-{order_id}"),
        "orderId": order_id,
        "status": status,
        "amount": 49.99,
        "currency": "USD",
        "paymentMethod": "card",
    });
    server
        .mock_async(move |when, then| {
            when.method(GET).path(path);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(payment);
        })
        .await;
}

// ---------------------------------------------------------------------------
// Payment saga actions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn confirm_payment_publishes_processed_event() {
    let server = MockServer::start_async().await;
    mock_payment(&server, "o1", "succeeded").await;
    let provider = Arc::new(InMemoryProvider::new());
    let gw = gateway(&server, provider.clone());

    let (status, body) = send(
        &gw.router,
        admin_request(Method::POST, "/api/admin/orders/o1/confirm-payment", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "confirmed");
    assert_eq!(body["data"]["orderId"], "o1");
    assert_eq!(body["data"]["paymentId"], "pay-o1");

    let published = provider.published_on("payment.processed");
    assert_eq!(published.len(), 1);
    let envelope = &published[0];
    assert_eq!(envelope.event_type, "payment.processed");
    assert_eq!(envelope.source, "admin-service");
    assert_eq!(envelope.metadata.trace_id, "trace-abc");
    assert_eq!(envelope.metadata.version, "1.0");
    assert_eq!(envelope.data["processedBy"], ADMIN_ID);
    assert_eq!(envelope.data["amount"], 49.99);
    assert_eq!(body["data"]["eventId"], envelope.event_id.as_str());
}

#[tokio::test]
async fn confirm_payment_refused_by_broker_is_an_error() {
    let server = MockServer::start_async().await;
    mock_payment(&server, "o8", "succeeded").await;
    let gw = gateway(&server, Arc::new(RefusingProvider));

    let (status, body) = send(
        &gw.router,
        admin_request(Method::POST, "/api/admin/orders/o8/confirm-payment", None),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    let message = body["error"].as_str().unwrap();
    assert!(
        message.starts_with("Failed to publish payment confirmation"),
        "{message}"
    );
}

#[tokio::test]
async fn confirm_payment_accepts_mixed_id_keys_and_decimal_strings() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/payments/order/o9");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "_id": "mongo-o9",
                    "id": "pay-o9",
                    "orderId": "o9",
                    "status": "succeeded",
                    "amount": "49.99",
                    "currency": "USD",
                }));
        })
        .await;
    let provider = Arc::new(InMemoryProvider::new());
    let gw = gateway(&server, provider.clone());

    let (status, body) = send(
        &gw.router,
        admin_request(Method::POST, "/api/admin/orders/o9/confirm-payment", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["paymentId"], "pay-o9");

    let published = provider.published_on("payment.processed");
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].data["paymentId"], "pay-o9");
    assert_eq!(published[0].data["amount"], "49.99");
}

#[tokio::test]
async fn confirm_payment_without_payment_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/payments/order/o2");
            then.status(404);
        })
        .await;
    let provider = Arc::new(InMemoryProvider::new());
    let gw = gateway(&server, provider.clone());

    let (status, body) = send(
        &gw.router,
        admin_request(Method::POST, "/api/admin/orders/o2/confirm-payment", None),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(provider.published().is_empty());
}

#[tokio::test]
async fn confirm_failed_payment_is_rejected() {
    let server = MockServer::start_async().await;
    mock_payment(&server, "o3", "failed").await;
    let provider = Arc::new(InMemoryProvider::new());
    let gw = gateway(&server, provider.clone());

    let (status, body) = send(
        &gw.router,
        admin_request(Method::POST, "/api/admin/orders/o3/confirm-payment", None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(provider.published().is_empty());
}

#[tokio::test]
async fn fail_payment_reports_publish_failure_with_reason() {
    let server = MockServer::start_async().await;
    mock_payment(&server, "o4", "pending").await;
    let gw = gateway(&server, Arc::new(PanickingProvider));

    let admin_token = token(&["admin"]);
    let (status, body) = send(
        &gw.router,
        admin_request(
            Method::POST,
            "/api/admin/orders/o4/fail-payment",
            Some(json!({ "reason": "Card declined" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("Card declined"), "{message}");
    assert!(!message.contains(&admin_token));
}

#[tokio::test]
async fn fail_payment_publishes_failed_event_with_default_reason() {
    let server = MockServer::start_async().await;
    mock_payment(&server, "o5", "processing").await;
    let provider = Arc::new(InMemoryProvider::new());
    let gw = gateway(&server, provider.clone());

    let (status, body) = send(
        &gw.router,
        admin_request(Method::POST, "/api/admin/orders/o5/fail-payment", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "failed");
    assert_eq!(body["data"]["reason"], "Payment marked as failed by admin");

    let published = provider.published_on("payment.failed");
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].data["failedBy"], ADMIN_ID);
}

#[tokio::test]
async fn fail_succeeded_payment_is_rejected() {
    let server = MockServer::start_async().await;
    mock_payment(&server, "o6", "succeeded").await;
    let provider = Arc::new(InMemoryProvider::new());
    let gw = gateway(&server, provider.clone());

    let (status, _) = send(
        &gw.router,
        admin_request(Method::POST, "/api/admin/orders/o6/fail-payment", None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(provider.published().is_empty());
}

#[tokio::test]
async fn order_payment_lookup_maps_missing_to_404() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/payments/order/o7");
            then.status(401);
        })
        .await;
    let gw = gateway(&server, Arc::new(InMemoryProvider::new()));

    let (status, _) = send(
        &gw.router,
        admin_request(Method::GET, "/api/admin/orders/o7/payment", None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_authorization_header_is_unauthorized() {
    let server = MockServer::start_async().await;
    let gw = gateway(&server, Arc::new(InMemoryProvider::new()));

    let request = Request::builder()
        .uri("/api/admin/users")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&gw.router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "success": false, "error": "Unauthorized: Missing Authorization header" })
    );
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let server = MockServer::start_async().await;
    let gw = gateway(&server, Arc::new(InMemoryProvider::new()));

    let request = Request::builder()
        .uri("/api/admin/users")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&gw.router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized: Invalid or expired token");
}

#[tokio::test]
async fn non_admin_is_forbidden() {
    let server = MockServer::start_async().await;
    let gw = gateway(&server, Arc::new(InMemoryProvider::new()));

    let request = Request::builder()
        .uri("/api/admin/orders")
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", token(&["customer"])),
        )
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&gw.router, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        "Forbidden: Required roles: admin. User has: customer"
    );
}

// ---------------------------------------------------------------------------
// Pass-through routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stats_route_is_not_captured_by_order_id() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/admin/orders/stats")
                .query_param("includeRecent", "true")
                .query_param("recentLimit", "10");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({ "totalOrders": 12 }));
        })
        .await;
    let gw = gateway(&server, Arc::new(InMemoryProvider::new()));

    let (status, body) = send(
        &gw.router,
        admin_request(
            Method::GET,
            "/api/admin/orders/stats?includeRecent=true&recentLimit=abc",
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalOrders"], 12);
    mock.assert_async().await;
}

#[tokio::test]
async fn downstream_status_passes_through() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/admin/users/507f1f77bcf86cd799439012");
            then.status(404)
                .header("Content-Type", "application/json")
                .json_body(json!({ "message": "User not found" }));
        })
        .await;
    let gw = gateway(&server, Arc::new(InMemoryProvider::new()));

    let (status, body) = send(
        &gw.router,
        admin_request(Method::GET, "/api/admin/users/507f1f77bcf86cd799439012", None),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "User not found" }));
}

#[tokio::test]
async fn password_reset_failure_reports_auth_service_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/admin/password/reset");
            then.status(429)
                .header("Content-Type", "application/json")
                .json_body(json!({ "error": "Too many reset requests" }));
        })
        .await;
    let gw = gateway(&server, Arc::new(InMemoryProvider::new()));

    let (status, body) = send(
        &gw.router,
        admin_request(
            Method::POST,
            "/api/admin/users/507f1f77bcf86cd799439012/reset-password",
            Some(json!({ "email": "user@xshopai.com" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many reset requests");
}

#[tokio::test]
async fn delete_user_returns_no_content() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/admin/users/507f1f77bcf86cd799439012");
            then.status(204);
        })
        .await;
    let gw = gateway(&server, Arc::new(InMemoryProvider::new()));

    let (status, body) = send(
        &gw.router,
        admin_request(Method::DELETE, "/api/admin/users/507f1f77bcf86cd799439012", None),
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
    mock.assert_async().await;
}

#[tokio::test]
async fn update_user_forwards_validated_payload() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/admin/users/507f1f77bcf86cd799439012")
                .json_body(json!({ "roles": ["customer", "vendor"], "isActive": true }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({ "id": "507f1f77bcf86cd799439012", "isActive": true }));
        })
        .await;
    let gw = gateway(&server, Arc::new(InMemoryProvider::new()));

    let (status, body) = send(
        &gw.router,
        admin_request(
            Method::PATCH,
            "/api/admin/users/507f1f77bcf86cd799439012",
            Some(json!({ "roles": ["customer", "vendor"], "isActive": true })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isActive"], true);
    mock.assert_async().await;
}

// ---------------------------------------------------------------------------
// Operational routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn operational_routes_need_no_token() {
    let server = MockServer::start_async().await;
    let gw = gateway(&server, Arc::new(InMemoryProvider::new()));

    for uri in ["/", "/version", "/health", "/health/live", "/health/ready"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = gw.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let server = MockServer::start_async().await;
    let gw = gateway(&server, Arc::new(InMemoryProvider::new()));

    let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
    let (status, body) = send(&gw.router, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn draining_gateway_refuses_admin_requests() {
    let server = MockServer::start_async().await;
    let gw = gateway(&server, Arc::new(InMemoryProvider::new()));
    gw.shutdown.begin_drain();

    let (status, _) = send(
        &gw.router,
        admin_request(Method::GET, "/api/admin/orders", None),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let request = Request::builder()
        .uri("/health/ready")
        .body(Body::empty())
        .unwrap();
    let response = gw.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
