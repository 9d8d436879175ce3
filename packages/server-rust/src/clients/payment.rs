use admin_gateway_core::ServiceName;
use http::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use super::auth_headers;
use crate::invoke::{InvocationError, InvocationRequest, ServiceInvoker};

/// Read access to the payment service.
#[derive(Debug, Clone)]
pub struct PaymentClient {
    invoker: ServiceInvoker,
}

impl PaymentClient {
    #[must_use]
    pub fn new(invoker: ServiceInvoker) -> Self {
        Self { invoker }
    }

    /// `GET api/payments/order/{orderId}`
    ///
    /// A 404 (no payment yet) and a 401 (token rejected by the payment
    /// service) both come back as `Ok(None)`; callers cannot tell them apart.
    ///
    /// # Errors
    ///
    /// Any other invocation failure is propagated.
    pub async fn fetch_payment_by_order_id(
        &self,
        order_id: &str,
        token: Option<&str>,
    ) -> Result<Option<Value>, InvocationError> {
        let request =
            InvocationRequest::get(ServiceName::Payment, format!("api/payments/order/{order_id}"))
                .with_headers(auth_headers(token));

        match self.invoker.invoke(request).await {
            Ok(payment) => Ok(payment),
            Err(e) if e.is_status(StatusCode::NOT_FOUND) => {
                debug!(order_id, "no payment found for order");
                Ok(None)
            }
            Err(e) if e.is_status(StatusCode::UNAUTHORIZED) => {
                warn!(order_id, "payment service rejected the token");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// `GET api/payments/{id}`
    ///
    /// # Errors
    ///
    /// Propagates the invocation failure unchanged.
    pub async fn fetch_payment_by_id(
        &self,
        payment_id: &str,
        token: Option<&str>,
    ) -> Result<Option<Value>, InvocationError> {
        let request =
            InvocationRequest::get(ServiceName::Payment, format!("api/payments/{payment_id}"))
                .with_headers(auth_headers(token));
        self.invoker.invoke(request).await
    }

    /// `GET api/payments` with optional filters (`customerId`, `orderId`,
    /// `skip`, `take`).
    ///
    /// # Errors
    ///
    /// Propagates the invocation failure unchanged.
    pub async fn fetch_payments(
        &self,
        token: Option<&str>,
        query: Vec<(String, String)>,
    ) -> Result<Option<Value>, InvocationError> {
        let request = InvocationRequest::get(ServiceName::Payment, "api/payments")
            .with_query(query)
            .with_headers(auth_headers(token));
        self.invoker.invoke(request).await
    }
}
