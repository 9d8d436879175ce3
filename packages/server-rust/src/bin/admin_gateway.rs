//! Admin gateway binary.

use admin_gateway_server::telemetry::{init_tracing, install_metrics_recorder};
use admin_gateway_server::{GatewayArgs, GatewayConfig, GatewayModule};
use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::try_from(GatewayArgs::parse()).context("invalid configuration")?;

    init_tracing(&config.log)?;

    let metrics = match install_metrics_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "metrics disabled");
            None
        }
    };

    info!(
        service = %config.service.name,
        version = %config.service.version,
        environment = %config.service.environment,
        "starting admin gateway"
    );

    let mut module = GatewayModule::new(&config, metrics)?;
    let port = module.start().await?;
    info!(port, "admin gateway listening");

    module.serve(shutdown_signal()).await
}

/// Resolves on SIGINT, or SIGTERM on unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("SIGTERM received"),
                    _ = tokio::signal::ctrl_c() => info!("SIGINT received"),
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable, waiting for SIGINT only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("SIGINT received");
    }
}
