use admin_gateway_core::ServiceName;
use serde_json::Value;

use super::auth_headers;
use crate::invoke::{InvocationError, InvocationRequest, ServiceInvoker};

/// Default number of recent orders in a stats request.
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

/// Options for `GET api/admin/orders/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderStatsQuery {
    pub include_recent: bool,
    pub recent_limit: u32,
}

impl Default for OrderStatsQuery {
    fn default() -> Self {
        Self {
            include_recent: false,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

impl OrderStatsQuery {
    /// Reads the raw `includeRecent` / `recentLimit` query values.
    ///
    /// Only the literal `"true"` enables recent orders; a missing, zero, or
    /// unparsable limit falls back to [`DEFAULT_RECENT_LIMIT`].
    #[must_use]
    pub fn from_raw(include_recent: Option<&str>, recent_limit: Option<&str>) -> Self {
        Self {
            include_recent: include_recent == Some("true"),
            recent_limit: recent_limit
                .and_then(|l| l.trim().parse::<u32>().ok())
                .filter(|&l| l > 0)
                .unwrap_or(DEFAULT_RECENT_LIMIT),
        }
    }

    fn to_query(self) -> [(String, String); 2] {
        [
            ("includeRecent".to_string(), self.include_recent.to_string()),
            ("recentLimit".to_string(), self.recent_limit.to_string()),
        ]
    }
}

/// Admin order management on the order service.
#[derive(Debug, Clone)]
pub struct OrderClient {
    invoker: ServiceInvoker,
}

impl OrderClient {
    #[must_use]
    pub fn new(invoker: ServiceInvoker) -> Self {
        Self { invoker }
    }

    /// `GET api/admin/orders`
    ///
    /// # Errors
    ///
    /// Propagates the invocation failure unchanged.
    pub async fn fetch_all_orders(
        &self,
        token: Option<&str>,
    ) -> Result<Option<Value>, InvocationError> {
        let request = InvocationRequest::get(ServiceName::Order, "api/admin/orders")
            .with_headers(auth_headers(token));
        self.invoker.invoke(request).await
    }

    /// `GET api/admin/orders/paged` with the caller's query passed through.
    ///
    /// # Errors
    ///
    /// Propagates the invocation failure unchanged.
    pub async fn fetch_orders_paged(
        &self,
        token: Option<&str>,
        query: Vec<(String, String)>,
    ) -> Result<Option<Value>, InvocationError> {
        let request = InvocationRequest::get(ServiceName::Order, "api/admin/orders/paged")
            .with_query(query)
            .with_headers(auth_headers(token));
        self.invoker.invoke(request).await
    }

    /// `GET api/admin/orders/{id}`
    ///
    /// # Errors
    ///
    /// Propagates the invocation failure unchanged.
    pub async fn fetch_order_by_id(
        &self,
        id: &str,
        token: Option<&str>,
    ) -> Result<Option<Value>, InvocationError> {
        let request = InvocationRequest::get(ServiceName::Order, format!("api/admin/orders/{id}"))
            .with_headers(auth_headers(token));
        self.invoker.invoke(request).await
    }

    /// `PUT api/admin/orders/{id}/status`
    ///
    /// # Errors
    ///
    /// Propagates the invocation failure unchanged.
    pub async fn update_order_status(
        &self,
        id: &str,
        status: Value,
        token: Option<&str>,
    ) -> Result<Option<Value>, InvocationError> {
        let request =
            InvocationRequest::put(ServiceName::Order, format!("api/admin/orders/{id}/status"))
                .with_body(status)
                .with_headers(auth_headers(token));
        self.invoker.invoke(request).await
    }

    /// `DELETE api/admin/orders/{id}`
    ///
    /// # Errors
    ///
    /// Propagates the invocation failure unchanged.
    pub async fn delete_order_by_id(
        &self,
        id: &str,
        token: Option<&str>,
    ) -> Result<Option<Value>, InvocationError> {
        let request =
            InvocationRequest::delete(ServiceName::Order, format!("api/admin/orders/{id}"))
                .with_headers(auth_headers(token));
        self.invoker.invoke(request).await
    }

    /// `GET api/admin/orders/stats?includeRecent=..&recentLimit=..`
    ///
    /// # Errors
    ///
    /// Propagates the invocation failure unchanged.
    pub async fn fetch_order_stats(
        &self,
        token: Option<&str>,
        stats: OrderStatsQuery,
    ) -> Result<Option<Value>, InvocationError> {
        let request = InvocationRequest::get(ServiceName::Order, "api/admin/orders/stats")
            .with_query(stats.to_query())
            .with_headers(auth_headers(token));
        self.invoker.invoke(request).await
    }

    /// `GET api/admin/orders/{id}/tracking`
    ///
    /// # Errors
    ///
    /// Propagates the invocation failure unchanged.
    pub async fn fetch_order_tracking(
        &self,
        id: &str,
        token: Option<&str>,
    ) -> Result<Option<Value>, InvocationError> {
        let request =
            InvocationRequest::get(ServiceName::Order, format!("api/admin/orders/{id}/tracking"))
                .with_headers(auth_headers(token));
        self.invoker.invoke(request).await
    }
}
