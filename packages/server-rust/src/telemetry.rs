//! Logging and metrics setup for the gateway binary.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogConfig, LogFormat};

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    #[error("tracing subscriber already installed: {0}")]
    Init(#[from] TryInitError),

    #[error("failed to install metrics recorder: {0}")]
    Metrics(#[from] BuildError),
}

/// Builds the log filter: `RUST_LOG` when set, else the configured level.
///
/// # Errors
///
/// [`TelemetryError::Filter`] when the configured level is not a valid
/// directive.
pub fn log_filter(config: &LogConfig) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(&config.level)?),
    }
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Fails on an invalid filter or when a subscriber is already installed.
pub fn init_tracing(config: &LogConfig) -> Result<(), TelemetryError> {
    let filter = log_filter(config)?;
    let json = config.format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_current_span(false)))
        .with((!json).then(fmt::layer))
        .try_init()?;
    Ok(())
}

/// Installs the global Prometheus recorder and returns the handle that
/// renders `/metrics`.
///
/// # Errors
///
/// [`TelemetryError::Metrics`] when a recorder is already installed.
pub fn install_metrics_recorder() -> Result<PrometheusHandle, TelemetryError> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_level() {
        // Only meaningful when RUST_LOG is unset in the test environment.
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LogConfig {
            level: "info,admin_gateway_server=loudest".to_string(),
            format: LogFormat::Console,
        };
        assert!(matches!(log_filter(&config), Err(TelemetryError::Filter(_))));
    }

    #[test]
    fn accepts_module_directives() {
        let config = LogConfig {
            level: "info,admin_gateway_server=debug".to_string(),
            format: LogFormat::Json,
        };
        assert!(log_filter(&config).is_ok());
    }
}
