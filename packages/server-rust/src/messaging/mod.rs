//! Event publishing: provider abstraction, concrete providers, the
//! process-scoped provider cache, and the envelope-building publisher.

pub mod factory;
pub mod memory;
pub mod provider;
pub mod publisher;
pub mod sidecar;

pub use factory::{
    create_provider, MessagingConfig, MessagingHub, ProviderKind, UnknownProviderKind,
    DEFAULT_PUBSUB_NAME,
};
pub use memory::InMemoryProvider;
pub use provider::{MessagingProvider, PublishError};
pub use publisher::{DeliveryError, EventPublisher};
pub use sidecar::SidecarProvider;
