use admin_gateway_core::ServiceName;
use serde_json::{json, Value};
use tracing::info;

use super::auth_headers;
use crate::invoke::{InvocationError, InvocationRequest, ServiceInvoker};

/// Failure of an auth-service call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The operation requires a bearer token and none was given. No request
    /// was sent.
    #[error("Authorization token is required")]
    MissingCredential,

    #[error(transparent)]
    Invocation(#[from] InvocationError),
}

/// Admin operations on the auth service.
#[derive(Debug, Clone)]
pub struct AuthClient {
    invoker: ServiceInvoker,
}

impl AuthClient {
    #[must_use]
    pub fn new(invoker: ServiceInvoker) -> Self {
        Self { invoker }
    }

    /// `POST api/auth/admin/password/reset` with `{"email": ...}`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::MissingCredential`] when `token` is absent or empty,
    ///   before any network call.
    /// - [`ClientError::Invocation`] for a failed downstream call.
    pub async fn trigger_password_reset(
        &self,
        email: &str,
        token: Option<&str>,
    ) -> Result<Option<Value>, ClientError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(ClientError::MissingCredential)?;

        info!("triggering admin password reset");

        let request = InvocationRequest::post(ServiceName::Auth, "api/auth/admin/password/reset")
            .with_body(json!({ "email": email }))
            .with_headers(auth_headers(Some(token)));
        Ok(self.invoker.invoke(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::InvocationConfig;

    #[tokio::test]
    async fn missing_token_fails_before_any_call() {
        // The default auth-service address does not resolve; reaching the
        // network would surface as an invocation error instead.
        let client = AuthClient::new(ServiceInvoker::new(&InvocationConfig::default()).unwrap());

        let err = client.trigger_password_reset("a@b.io", None).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingCredential));

        let err = client.trigger_password_reset("a@b.io", Some("")).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingCredential));
    }
}
