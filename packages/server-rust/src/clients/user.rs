use admin_gateway_core::ServiceName;
use serde_json::Value;

use super::auth_headers;
use crate::invoke::{InvocationError, InvocationRequest, ServiceInvoker};

/// Admin user management on the user service.
#[derive(Debug, Clone)]
pub struct UserClient {
    invoker: ServiceInvoker,
}

impl UserClient {
    #[must_use]
    pub fn new(invoker: ServiceInvoker) -> Self {
        Self { invoker }
    }

    /// `GET api/admin/users`
    ///
    /// # Errors
    ///
    /// Propagates the invocation failure unchanged.
    pub async fn fetch_all_users(
        &self,
        token: Option<&str>,
    ) -> Result<Option<Value>, InvocationError> {
        let request = InvocationRequest::get(ServiceName::User, "api/admin/users")
            .with_headers(auth_headers(token));
        self.invoker.invoke(request).await
    }

    /// `GET api/admin/users/{id}`
    ///
    /// # Errors
    ///
    /// Propagates the invocation failure unchanged.
    pub async fn fetch_user_by_id(
        &self,
        id: &str,
        token: Option<&str>,
    ) -> Result<Option<Value>, InvocationError> {
        let request = InvocationRequest::get(ServiceName::User, format!("api/admin/users/{id}"))
            .with_headers(auth_headers(token));
        self.invoker.invoke(request).await
    }

    /// `PATCH api/admin/users/{id}` with the update forwarded as-is.
    ///
    /// # Errors
    ///
    /// Propagates the invocation failure unchanged.
    pub async fn update_user_by_id(
        &self,
        id: &str,
        update: Value,
        token: Option<&str>,
    ) -> Result<Option<Value>, InvocationError> {
        let request = InvocationRequest::patch(ServiceName::User, format!("api/admin/users/{id}"))
            .with_body(update)
            .with_headers(auth_headers(token));
        self.invoker.invoke(request).await
    }

    /// `DELETE api/admin/users/{id}`
    ///
    /// # Errors
    ///
    /// Propagates the invocation failure unchanged.
    pub async fn remove_user_by_id(
        &self,
        id: &str,
        token: Option<&str>,
    ) -> Result<Option<Value>, InvocationError> {
        let request = InvocationRequest::delete(ServiceName::User, format!("api/admin/users/{id}"))
            .with_headers(auth_headers(token));
        self.invoker.invoke(request).await
    }
}
