//! Logical identifiers for the downstream services the gateway talks to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A downstream service reachable through the invocation layer.
///
/// The canonical string form (`"user-service"`, ...) is what appears in
/// logs, sidecar app ids, and the fallback host name for unmapped services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum ServiceName {
    User,
    Order,
    Product,
    Payment,
    Auth,
    Audit,
    Notification,
}

impl ServiceName {
    /// Every known service, in declaration order.
    pub const ALL: [ServiceName; 7] = [
        ServiceName::User,
        ServiceName::Order,
        ServiceName::Product,
        ServiceName::Payment,
        ServiceName::Auth,
        ServiceName::Audit,
        ServiceName::Notification,
    ];

    /// Canonical identifier, e.g. `"payment-service"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ServiceName::User => "user-service",
            ServiceName::Order => "order-service",
            ServiceName::Product => "product-service",
            ServiceName::Payment => "payment-service",
            ServiceName::Auth => "auth-service",
            ServiceName::Audit => "audit-service",
            ServiceName::Notification => "notification-service",
        }
    }

    /// Upper-case stem used to build per-service environment keys
    /// (`PAYMENT` -> `PAYMENT_SERVICE_URL`, `PAYMENT_SERVICE_APP_ID`).
    #[must_use]
    pub const fn env_stem(self) -> &'static str {
        match self {
            ServiceName::User => "USER",
            ServiceName::Order => "ORDER",
            ServiceName::Product => "PRODUCT",
            ServiceName::Payment => "PAYMENT",
            ServiceName::Auth => "AUTH",
            ServiceName::Audit => "AUDIT",
            ServiceName::Notification => "NOTIFICATION",
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ServiceName> for &'static str {
    fn from(name: ServiceName) -> Self {
        name.as_str()
    }
}

/// Returned when a string names no known service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service: {0}")]
pub struct ParseServiceNameError(pub String);

impl FromStr for ServiceName {
    type Err = ParseServiceNameError;

    /// Accepts both the canonical form (`"order-service"`) and the short
    /// form (`"order"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let short = s.strip_suffix("-service").unwrap_or(s);
        ServiceName::ALL
            .into_iter()
            .find(|name| name.as_str().strip_suffix("-service") == Some(short))
            .ok_or_else(|| ParseServiceNameError(s.to_string()))
    }
}

impl TryFrom<String> for ServiceName {
    type Error = ParseServiceNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
