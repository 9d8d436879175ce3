//! Process configuration.
//!
//! Every setting is an environment variable with an equivalent CLI flag
//! ([`GatewayArgs`]). The raw arguments are checked once and turned into an
//! immutable [`GatewayConfig`]; anything invalid is a [`ConfigError`] and the
//! gateway refuses to start.
//!
//! Per-service addresses use one variable pair per service, keyed by the
//! service's env stem: `USER_SERVICE_URL`, `USER_SERVICE_APP_ID`, and so on.

use std::fmt;
use std::time::Duration;

use admin_gateway_core::ServiceName;
use clap::{Parser, ValueEnum};
use reqwest::Url;

use crate::invoke::{
    InvocationConfig, ServiceDirectory, SidecarEndpoint, TransportMode, UnknownTransportMode,
};
use crate::messaging::{MessagingConfig, ProviderKind, UnknownProviderKind, DEFAULT_PUBSUB_NAME};
use crate::network::auth::{DEFAULT_JWT_AUDIENCE, DEFAULT_JWT_ISSUER};
use crate::network::{NetworkConfig, DEFAULT_PORT};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    TransportMode(#[from] UnknownTransportMode),

    #[error(transparent)]
    ProviderKind(#[from] UnknownProviderKind),

    #[error("{key} is not a valid http(s) URL: {value:?}")]
    InvalidUrl { key: String, value: String },

    #[error("invalid service override {0:?} (expected <service>=<value>)")]
    InvalidOverride(String),

    #[error("SERVICE_VERSION must be a semantic version, got {0:?}")]
    InvalidVersion(String),

    #[error("{0} must be a non-zero port")]
    InvalidPort(&'static str),

    #[error("{0} must be greater than zero")]
    InvalidTimeout(&'static str),

    #[error("JWT_SECRET is required")]
    MissingJwtSecret,
}

// ---------------------------------------------------------------------------
// Enumerated settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AppEnv {
    #[default]
    Development,
    Production,
    Test,
}

impl AppEnv {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AppEnv::Development => "development",
            AppEnv::Production => "production",
            AppEnv::Test => "test",
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Console,
    /// One JSON object per line.
    Json,
}

// ---------------------------------------------------------------------------
// Raw arguments
// ---------------------------------------------------------------------------

/// Command-line and environment settings, before validation.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "admin-gateway",
    version,
    about = "Administrative gateway for the xShop.ai platform"
)]
pub struct GatewayArgs {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Comma-separated list; `*` allows any origin.
    #[arg(long, env = "CORS_ORIGINS", default_value = "*", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 30_000)]
    pub request_timeout_ms: u64,

    #[arg(long, env = "APP_ENV", value_enum, default_value_t = AppEnv::Development)]
    pub app_env: AppEnv,

    #[arg(long, env = "SERVICE_NAME", default_value = "admin-service")]
    pub service_name: String,

    #[arg(long, env = "SERVICE_VERSION", default_value = env!("CARGO_PKG_VERSION"))]
    pub service_version: String,

    /// `direct` or `sidecar` (`dapr` is accepted as an alias).
    #[arg(long, env = "PLATFORM_MODE", default_value = "direct")]
    pub platform_mode: String,

    #[arg(long, env = "DAPR_HOST", default_value = "localhost")]
    pub dapr_host: String,

    #[arg(long, env = "DAPR_HTTP_PORT", default_value_t = 3500)]
    pub dapr_http_port: u16,

    /// Host prefix for services without a configured URL.
    #[arg(long, env = "SERVICE_HOST_PREFIX", default_value = "xshopai")]
    pub service_host_prefix: String,

    #[arg(long, env = "SERVICE_TIMEOUT_MS", default_value_t = 30_000)]
    pub service_timeout_ms: u64,

    /// Base URL override, `<service>=<url>`. Repeatable; wins over
    /// `<STEM>_SERVICE_URL`.
    #[arg(long = "service-url")]
    pub service_urls: Vec<String>,

    /// Sidecar app id override, `<service>=<app-id>`. Repeatable; wins over
    /// `<STEM>_SERVICE_APP_ID`.
    #[arg(long = "service-app-id")]
    pub service_app_ids: Vec<String>,

    /// `dapr` or `memory`.
    #[arg(long, env = "MESSAGING_PROVIDER", default_value = "dapr")]
    pub messaging_provider: String,

    #[arg(long, env = "DAPR_PUBSUB_NAME", default_value = DEFAULT_PUBSUB_NAME)]
    pub pubsub_name: String,

    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    #[arg(long, env = "JWT_ISSUER", default_value = DEFAULT_JWT_ISSUER)]
    pub jwt_issuer: String,

    #[arg(long, env = "JWT_AUDIENCE", default_value = DEFAULT_JWT_AUDIENCE)]
    pub jwt_audience: String,

    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Console)]
    pub log_format: LogFormat,
}

// ---------------------------------------------------------------------------
// Validated configuration
// ---------------------------------------------------------------------------

/// Identity reported by `/` and `/version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub environment: AppEnv,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            name: "admin-service".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: AppEnv::Development,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Console,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub network: NetworkConfig,
    pub service: ServiceInfo,
    pub invocation: InvocationConfig,
    pub messaging: MessagingConfig,
    pub auth: AuthConfig,
    pub log: LogConfig,
}

impl GatewayConfig {
    /// Validates `args`, reading per-service variables through `env`.
    ///
    /// # Errors
    ///
    /// The first invalid setting, as a [`ConfigError`].
    pub fn resolve<F>(args: GatewayArgs, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = args
            .jwt_secret
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;

        if !is_semver(&args.service_version) {
            return Err(ConfigError::InvalidVersion(args.service_version));
        }
        if args.dapr_http_port == 0 {
            return Err(ConfigError::InvalidPort("DAPR_HTTP_PORT"));
        }

        let request_timeout = millis("REQUEST_TIMEOUT_MS", args.request_timeout_ms)?;
        let service_timeout = millis("SERVICE_TIMEOUT_MS", args.service_timeout_ms)?;

        let mode: TransportMode = args.platform_mode.parse()?;
        let provider: ProviderKind = args.messaging_provider.parse()?;

        let sidecar = SidecarEndpoint {
            host: args.dapr_host,
            port: args.dapr_http_port,
        };

        let directory = build_directory(
            &args.service_host_prefix,
            &args.service_urls,
            &args.service_app_ids,
            &env,
        )?;

        Ok(Self {
            network: NetworkConfig {
                host: args.host,
                port: args.port,
                cors_origins: args
                    .cors_origins
                    .into_iter()
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect(),
                request_timeout,
                ..NetworkConfig::default()
            },
            service: ServiceInfo {
                name: args.service_name,
                version: args.service_version,
                environment: args.app_env,
            },
            invocation: InvocationConfig {
                mode,
                directory,
                sidecar: sidecar.clone(),
                timeout: service_timeout,
            },
            messaging: MessagingConfig {
                provider,
                sidecar,
                pubsub_name: args.pubsub_name,
                ..MessagingConfig::default()
            },
            auth: AuthConfig {
                jwt_secret,
                issuer: args.jwt_issuer,
                audience: args.jwt_audience,
            },
            log: LogConfig {
                level: args.log_level,
                format: args.log_format,
            },
        })
    }
}

impl TryFrom<GatewayArgs> for GatewayConfig {
    type Error = ConfigError;

    fn try_from(args: GatewayArgs) -> Result<Self, Self::Error> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }
}

/// Built-in defaults, then `<STEM>_SERVICE_URL` / `<STEM>_SERVICE_APP_ID`,
/// then explicit CLI overrides.
fn build_directory<F>(
    host_prefix: &str,
    url_overrides: &[String],
    app_id_overrides: &[String],
    env: &F,
) -> Result<ServiceDirectory, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut directory = ServiceDirectory::default();
    if host_prefix != directory.host_prefix() {
        let defaults = directory;
        directory = ServiceDirectory::empty(host_prefix);
        for service in ServiceName::ALL {
            directory.set_app_id(service, defaults.app_id(service));
        }
    }

    for service in ServiceName::ALL {
        let url_key = format!("{}_SERVICE_URL", service.env_stem());
        if let Some(url) = env(&url_key).filter(|v| !v.trim().is_empty()) {
            directory.set_base_url(service, &check_url(&url_key, url.trim())?);
        }
        let app_id_key = format!("{}_SERVICE_APP_ID", service.env_stem());
        if let Some(app_id) = env(&app_id_key).filter(|v| !v.trim().is_empty()) {
            directory.set_app_id(service, app_id.trim());
        }
    }

    for raw in url_overrides {
        let (service, url) = split_override(raw)?;
        directory.set_base_url(service, &check_url("--service-url", url)?);
    }
    for raw in app_id_overrides {
        let (service, app_id) = split_override(raw)?;
        directory.set_app_id(service, app_id);
    }

    Ok(directory)
}

fn split_override(raw: &str) -> Result<(ServiceName, &str), ConfigError> {
    let invalid = || ConfigError::InvalidOverride(raw.to_string());
    let (name, value) = raw.split_once('=').ok_or_else(invalid)?;
    let service = name.trim().parse::<ServiceName>().map_err(|_| invalid())?;
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid());
    }
    Ok((service, value))
}

fn check_url(key: &str, value: &str) -> Result<String, ConfigError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Ok(value.to_string())
        }
        _ => Err(ConfigError::InvalidUrl {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn millis(key: &'static str, ms: u64) -> Result<Duration, ConfigError> {
    if ms == 0 {
        return Err(ConfigError::InvalidTimeout(key));
    }
    Ok(Duration::from_millis(ms))
}

/// `MAJOR.MINOR.PATCH` with optional `-pre` and `+build` suffixes.
fn is_semver(version: &str) -> bool {
    let core = version.split_once('+').map_or(version, |(core, _)| core);
    let core = core.split_once('-').map_or(core, |(core, _)| core);
    let parts: Vec<&str> = core.split('.').collect();
    parts.len() == 3
        && parts.iter().all(|p| {
            !p.is_empty()
                && p.bytes().all(|b| b.is_ascii_digit())
                && (p.len() == 1 || !p.starts_with('0'))
        })
}
