//! Provider selection and the process-scoped provider cache.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::info;

use super::memory::InMemoryProvider;
use super::provider::MessagingProvider;
use super::sidecar::SidecarProvider;
use crate::invoke::SidecarEndpoint;

/// Default pub/sub component name on the sidecar.
pub const DEFAULT_PUBSUB_NAME: &str = "pubsub";

// ---------------------------------------------------------------------------
// ProviderKind
// ---------------------------------------------------------------------------

/// Which broker integration to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    /// Sidecar pub/sub API (`dapr` in configuration).
    #[default]
    Sidecar,
    /// In-process recorder.
    Memory,
}

impl ProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Sidecar => "sidecar",
            ProviderKind::Memory => "memory",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned for a provider name with no implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported messaging provider {0:?} (expected \"dapr\" or \"memory\")")]
pub struct UnknownProviderKind(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProviderKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dapr" | "sidecar" => Ok(ProviderKind::Sidecar),
            "memory" | "in-memory" => Ok(ProviderKind::Memory),
            _ => Err(UnknownProviderKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration and factory
// ---------------------------------------------------------------------------

/// Settings for event publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagingConfig {
    pub provider: ProviderKind,
    pub sidecar: SidecarEndpoint,
    pub pubsub_name: String,
    pub publish_timeout: Duration,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Sidecar,
            sidecar: SidecarEndpoint::default(),
            pubsub_name: DEFAULT_PUBSUB_NAME.to_string(),
            publish_timeout: Duration::from_secs(10),
        }
    }
}

/// Constructs a fresh provider of the configured kind.
#[must_use]
pub fn create_provider(config: &MessagingConfig) -> Arc<dyn MessagingProvider> {
    match config.provider {
        ProviderKind::Sidecar => Arc::new(SidecarProvider::new(
            config.sidecar.clone(),
            &config.pubsub_name,
            config.publish_timeout,
        )),
        ProviderKind::Memory => Arc::new(InMemoryProvider::new()),
    }
}

// ---------------------------------------------------------------------------
// MessagingHub
// ---------------------------------------------------------------------------

type ProviderFactory = Arc<dyn Fn() -> Arc<dyn MessagingProvider> + Send + Sync>;

/// Lazily constructed, process-scoped messaging provider.
///
/// Owned by the application state and shared by reference; there is no
/// module-level global. [`provider`](Self::provider) returns the same
/// instance on every call until [`close_provider`](Self::close_provider)
/// closes and forgets it; the next call then builds a new one. Concurrent
/// first calls race on a write lock and exactly one of them constructs.
pub struct MessagingHub {
    factory: ProviderFactory,
    current: RwLock<Option<Arc<dyn MessagingProvider>>>,
}

impl fmt::Debug for MessagingHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessagingHub")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl MessagingHub {
    /// A hub that builds providers from `config`.
    #[must_use]
    pub fn new(config: MessagingConfig) -> Self {
        Self::with_factory(move || create_provider(&config))
    }

    /// A hub that builds providers with `factory`.
    #[must_use]
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<dyn MessagingProvider> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
            current: RwLock::new(None),
        }
    }

    /// A hub that always hands out `provider`.
    #[must_use]
    pub fn with_provider(provider: Arc<dyn MessagingProvider>) -> Self {
        Self::with_factory(move || Arc::clone(&provider))
    }

    /// The cached provider, constructing it on first use.
    pub fn provider(&self) -> Arc<dyn MessagingProvider> {
        if let Some(provider) = self.current.read().as_ref() {
            return Arc::clone(provider);
        }

        let mut slot = self.current.write();
        if let Some(provider) = slot.as_ref() {
            return Arc::clone(provider);
        }
        let provider = (self.factory)();
        info!(provider = provider.name(), "messaging provider initialized");
        *slot = Some(Arc::clone(&provider));
        provider
    }

    /// Closes the cached provider, if any, and clears the cache.
    pub async fn close_provider(&self) {
        let taken = self.current.write().take();
        if let Some(provider) = taken {
            provider.close().await;
            info!(provider = provider.name(), "messaging provider closed");
        }
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.current.read().is_some()
    }
}
