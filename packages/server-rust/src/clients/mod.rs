//! Thin per-service clients over the [`ServiceInvoker`].
//!
//! Each operation maps to one downstream call. The clients do not interpret
//! responses, with one exception: the payment lookup by order treats 404 and
//! 401 as "no payment".

pub mod auth;
pub mod order;
pub mod payment;
pub mod user;

pub use auth::{AuthClient, ClientError};
pub use order::{OrderClient, OrderStatsQuery};
pub use payment::PaymentClient;
pub use user::UserClient;

use std::collections::BTreeMap;

use crate::invoke::ServiceInvoker;

/// `Authorization: Bearer {token}`, or nothing when there is no token.
#[must_use]
pub fn auth_headers(token: Option<&str>) -> BTreeMap<String, String> {
    token
        .filter(|t| !t.is_empty())
        .map(|t| ("Authorization".to_string(), format!("Bearer {t}")))
        .into_iter()
        .collect()
}

/// The four downstream clients, sharing one invoker.
#[derive(Debug, Clone)]
pub struct DomainClients {
    pub users: UserClient,
    pub orders: OrderClient,
    pub payments: PaymentClient,
    pub auth: AuthClient,
}

impl DomainClients {
    #[must_use]
    pub fn new(invoker: &ServiceInvoker) -> Self {
        Self {
            users: UserClient::new(invoker.clone()),
            orders: OrderClient::new(invoker.clone()),
            payments: PaymentClient::new(invoker.clone()),
            auth: AuthClient::new(invoker.clone()),
        }
    }
}
