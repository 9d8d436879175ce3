//! Dual-mode service invocation: address resolution, requests, and the
//! invoker facade used by every downstream client.

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod transport;

pub use client::ServiceInvoker;
pub use config::InvocationConfig;
pub use error::InvocationError;
pub use request::{InvocationRequest, InvokeMethod, UnsupportedMethod};
pub use transport::{
    normalize_path, ServiceDirectory, SidecarEndpoint, Transport, TransportMode,
    UnknownTransportMode,
};
