//! Gateway lifecycle: `new()` wires state, `start()` binds, `serve()` runs
//! until the shutdown future resolves and then drains.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::auth::{require_admin, TokenVerifier};
use super::config::NetworkConfig;
use super::error::ApiError;
use super::handlers::{
    health_handler, home_handler, liveness_handler, metrics_handler, orders, payments,
    readiness_handler, users, version_handler, AppState,
};
use super::middleware::{build_http_layers, track_in_flight};
use super::shutdown::ShutdownController;
use crate::clients::DomainClients;
use crate::config::GatewayConfig;
use crate::invoke::ServiceInvoker;
use crate::messaging::{EventPublisher, MessagingHub};

/// Owns the listener and the shared state of a running gateway.
pub struct GatewayModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    state: AppState,
    verifier: Arc<TokenVerifier>,
}

impl GatewayModule {
    /// Builds the invoker, domain clients, messaging hub, and token verifier.
    /// Nothing is bound and no provider is constructed yet.
    ///
    /// # Errors
    ///
    /// Fails when the outbound HTTP client cannot be built.
    pub fn new(config: &GatewayConfig, metrics: Option<PrometheusHandle>) -> anyhow::Result<Self> {
        let invoker =
            ServiceInvoker::new(&config.invocation).context("failed to build HTTP client")?;
        let hub = Arc::new(MessagingHub::new(config.messaging.clone()));

        let state = AppState {
            shutdown: Arc::new(ShutdownController::new()),
            config: Arc::new(config.network.clone()),
            service: Arc::new(config.service.clone()),
            clients: DomainClients::new(&invoker),
            publisher: EventPublisher::new(hub),
            metrics,
            start_time: Instant::now(),
        };
        let verifier = Arc::new(TokenVerifier::new(
            &config.auth.jwt_secret,
            &config.auth.issuer,
            &config.auth.audience,
        ));

        info!(
            mode = %invoker.mode(),
            messaging = %config.messaging.provider.as_str(),
            "gateway configured"
        );

        Ok(Self::from_parts(config.network.clone(), state, verifier))
    }

    /// Assembles a module from prepared state.
    #[must_use]
    pub fn from_parts(
        config: NetworkConfig,
        state: AppState,
        verifier: Arc<TokenVerifier>,
    ) -> Self {
        Self {
            config,
            listener: None,
            state,
            verifier,
        }
    }

    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.state.shutdown)
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub fn build_router(&self) -> Router {
        build_router(&self.config, self.state.clone(), Arc::clone(&self.verifier))
    }

    /// Binds the listener and returns the bound port (useful with port 0).
    ///
    /// # Errors
    ///
    /// Fails when the address cannot be bound.
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = self.config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        let port = listener.local_addr()?.port();

        info!(host = %self.config.host, port, "listener bound");

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves until `shutdown` resolves, then drains in-flight requests and
    /// closes the messaging provider.
    ///
    /// # Errors
    ///
    /// Fails when `start()` was not called first or on a fatal I/O error.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let router = self.build_router();
        let listener = self
            .listener
            .context("start() must be called before serve()")?;
        let controller = Arc::clone(&self.state.shutdown);

        controller.mark_ready();
        info!("admin gateway ready");

        let signal_controller = Arc::clone(&controller);
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("shutdown signal received");
                signal_controller.begin_drain();
            })
            .await?;

        if controller.wait_for_drain(self.config.drain_timeout).await {
            info!("all in-flight requests drained");
        } else {
            warn!(
                in_flight = controller.in_flight_count(),
                "drain timeout expired with requests still in flight"
            );
        }

        self.state.publisher.hub().close_provider().await;
        controller.mark_stopped();
        info!("admin gateway stopped");
        Ok(())
    }
}

/// Operational routes at the root, admin routes under `/api/admin` behind
/// authentication and in-flight tracking.
pub fn build_router(
    config: &NetworkConfig,
    state: AppState,
    verifier: Arc<TokenVerifier>,
) -> Router {
    // Static segments ("stats", "paged") win over "{id}" regardless of order.
    let admin = Router::new()
        .route("/users", get(users::list_users))
        .route(
            "/users/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{id}/reset-password", post(users::reset_user_password))
        .route("/orders", get(orders::list_orders))
        .route("/orders/stats", get(orders::order_stats))
        .route("/orders/paged", get(orders::list_orders_paged))
        .route("/orders/{id}", get(orders::get_order).delete(orders::delete_order))
        .route("/orders/{id}/tracking", get(orders::order_tracking))
        .route("/orders/{id}/status", put(orders::update_order_status))
        .route("/orders/{id}/payment", get(payments::get_order_payment))
        .route(
            "/orders/{id}/confirm-payment",
            post(payments::confirm_order_payment),
        )
        .route("/orders/{id}/fail-payment", post(payments::fail_order_payment))
        .route_layer(from_fn_with_state(verifier, require_admin))
        .route_layer(from_fn_with_state(state.clone(), track_in_flight));

    Router::new()
        .route("/", get(home_handler))
        .route("/version", get(version_handler))
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .nest("/api/admin", admin)
        .fallback(route_not_found)
        .layer(build_http_layers(config))
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
