//! Admin gateway server: dual-mode service invocation, event publishing, and
//! the authenticated admin HTTP API.

pub mod clients;
pub mod config;
pub mod invoke;
pub mod messaging;
pub mod network;
pub mod telemetry;

pub use config::{ConfigError, GatewayArgs, GatewayConfig};
pub use network::GatewayModule;
