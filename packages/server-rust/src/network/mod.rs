//! HTTP surface: listener config, middleware, authentication, handlers,
//! errors, shutdown control, and the gateway lifecycle.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod module;
pub mod shutdown;

pub use auth::{AdminUser, AuthError, TokenVerifier};
pub use config::*;
pub use error::ApiError;
pub use handlers::AppState;
pub use module::{build_router, GatewayModule};
pub use shutdown::*;
