//! Address resolution for outbound service calls.
//!
//! A [`Transport`] is chosen once at startup and never re-evaluated. It maps
//! a logical [`ServiceName`] plus a method path to a concrete URL, either the
//! service's own base URL (direct) or the local sidecar's invoke endpoint.
//! Resolution is pure: no I/O, same inputs give the same URL.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use admin_gateway_core::ServiceName;

/// Host prefix used to build the fallback address of an unmapped service.
pub const DEFAULT_HOST_PREFIX: &str = "xshopai";

/// Port used in the fallback address of an unmapped service.
pub const FALLBACK_PORT: u16 = 8000;

/// Base URLs every deployment starts from. `auth-service` has no entry and
/// resolves through the fallback convention.
pub const DEFAULT_BASE_URLS: [(ServiceName, &str); 6] = [
    (ServiceName::User, "http://xshopai-user-service:8002"),
    (ServiceName::Order, "http://xshopai-order-service:8006"),
    (ServiceName::Product, "http://xshopai-product-service:8001"),
    (ServiceName::Payment, "http://xshopai-payment-service:8009"),
    (ServiceName::Audit, "http://xshopai-audit-service:8012"),
    (ServiceName::Notification, "http://xshopai-notification-service:8011"),
];

// ---------------------------------------------------------------------------
// TransportMode
// ---------------------------------------------------------------------------

/// How outbound calls reach a downstream service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Straight HTTP to the service's base URL.
    #[default]
    Direct,
    /// Through the co-located sidecar's service invocation API.
    Sidecar,
}

impl TransportMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Direct => "direct",
            TransportMode::Sidecar => "sidecar",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned for a transport mode string that is neither direct nor sidecar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transport mode {0:?} (expected \"direct\" or \"sidecar\")")]
pub struct UnknownTransportMode(pub String);

impl FromStr for TransportMode {
    type Err = UnknownTransportMode;

    /// `dapr` is accepted as an alias for `sidecar`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" | "http" => Ok(TransportMode::Direct),
            "sidecar" | "dapr" => Ok(TransportMode::Sidecar),
            _ => Err(UnknownTransportMode(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SidecarEndpoint
// ---------------------------------------------------------------------------

/// Address of the local sidecar's HTTP API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarEndpoint {
    pub host: String,
    pub port: u16,
}

impl Default for SidecarEndpoint {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3500,
        }
    }
}

impl SidecarEndpoint {
    /// `http://{host}:{port}` without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// ServiceDirectory
// ---------------------------------------------------------------------------

/// Per-service base URLs (direct mode) and app ids (sidecar mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDirectory {
    base_urls: BTreeMap<ServiceName, String>,
    app_ids: BTreeMap<ServiceName, String>,
    host_prefix: String,
}

impl Default for ServiceDirectory {
    fn default() -> Self {
        let mut directory = Self::empty(DEFAULT_HOST_PREFIX);
        for (service, url) in DEFAULT_BASE_URLS {
            directory.set_base_url(service, url);
            directory.set_app_id(service, service.as_str());
        }
        directory
    }
}

impl ServiceDirectory {
    /// A directory with no mappings; every service resolves via fallback.
    #[must_use]
    pub fn empty(host_prefix: &str) -> Self {
        Self {
            base_urls: BTreeMap::new(),
            app_ids: BTreeMap::new(),
            host_prefix: host_prefix.to_string(),
        }
    }

    /// Maps `service` to `url`. A trailing slash on `url` is dropped.
    pub fn set_base_url(&mut self, service: ServiceName, url: &str) {
        self.base_urls
            .insert(service, url.trim_end_matches('/').to_string());
    }

    pub fn set_app_id(&mut self, service: ServiceName, app_id: &str) {
        self.app_ids.insert(service, app_id.to_string());
    }

    /// Configured base URL, or `http://{prefix}-{service}:8000`.
    #[must_use]
    pub fn base_url(&self, service: ServiceName) -> String {
        self.base_urls.get(&service).cloned().unwrap_or_else(|| {
            format!("http://{}-{}:{FALLBACK_PORT}", self.host_prefix, service)
        })
    }

    /// Configured sidecar app id, or the service identifier itself.
    #[must_use]
    pub fn app_id(&self, service: ServiceName) -> &str {
        self.app_ids
            .get(&service)
            .map_or(service.as_str(), String::as_str)
    }

    #[must_use]
    pub fn host_prefix(&self) -> &str {
        &self.host_prefix
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Resolution strategy for outbound calls, fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Direct {
        directory: ServiceDirectory,
    },
    Sidecar {
        endpoint: SidecarEndpoint,
        directory: ServiceDirectory,
    },
}

impl Transport {
    #[must_use]
    pub fn new(
        mode: TransportMode,
        directory: ServiceDirectory,
        endpoint: SidecarEndpoint,
    ) -> Self {
        match mode {
            TransportMode::Direct => Transport::Direct { directory },
            TransportMode::Sidecar => Transport::Sidecar {
                endpoint,
                directory,
            },
        }
    }

    #[must_use]
    pub fn mode(&self) -> TransportMode {
        match self {
            Transport::Direct { .. } => TransportMode::Direct,
            Transport::Sidecar { .. } => TransportMode::Sidecar,
        }
    }

    /// Builds the URL for calling `path` on `service`.
    ///
    /// - direct: `{baseUrl}/{path}`
    /// - sidecar: `http://{host}:{port}/v1.0/invoke/{appId}/method/{path}`
    ///
    /// Only a single leading slash is stripped from `path`; everything else
    /// passes through unchanged.
    #[must_use]
    pub fn resolve_address(&self, service: ServiceName, path: &str) -> String {
        let path = normalize_path(path);
        match self {
            Transport::Direct { directory } => {
                format!("{}/{path}", directory.base_url(service))
            }
            Transport::Sidecar {
                endpoint,
                directory,
            } => format!(
                "{}/v1.0/invoke/{}/method/{path}",
                endpoint.base_url(),
                directory.app_id(service)
            ),
        }
    }
}

/// Strips one leading `/`, if present.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}
