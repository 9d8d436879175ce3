//! The service invocation facade every domain client goes through.

use std::sync::Arc;

use admin_gateway_core::ServiceName;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use serde_json::Value;
use tracing::{debug, error};

use super::config::InvocationConfig;
use super::error::InvocationError;
use super::request::InvocationRequest;
use super::transport::{Transport, TransportMode};

const APPLICATION_JSON: &str = "application/json";

/// Issues one HTTP call per [`InvocationRequest`] and normalizes the result.
///
/// Cheap to clone: the underlying connection pool and the transport are
/// shared. No retries, no per-call timeout override.
#[derive(Debug, Clone)]
pub struct ServiceInvoker {
    http: reqwest::Client,
    transport: Arc<Transport>,
}

impl ServiceInvoker {
    /// Builds an invoker with a pooled HTTP client using the configured
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed (TLS backend
    /// initialization failure).
    pub fn new(config: &InvocationConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self::with_client(http, config.transport()))
    }

    #[must_use]
    pub fn with_client(http: reqwest::Client, transport: Transport) -> Self {
        Self {
            http,
            transport: Arc::new(transport),
        }
    }

    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    #[must_use]
    pub fn mode(&self) -> TransportMode {
        self.transport.mode()
    }

    /// Sends `request` and returns the parsed JSON body.
    ///
    /// `Ok(None)` means the service answered 2xx without a JSON body (other
    /// content type, or an empty body).
    ///
    /// # Errors
    ///
    /// - [`InvocationError::Status`] for any non-2xx answer, carrying the
    ///   status and the raw response text.
    /// - [`InvocationError::Transport`] for connection failures and timeouts.
    /// - [`InvocationError::Decode`] when a JSON content type carries a body
    ///   that does not parse.
    /// - [`InvocationError::InvalidHeader`] for a header that cannot be sent.
    pub async fn invoke(
        &self,
        request: InvocationRequest,
    ) -> Result<Option<Value>, InvocationError> {
        let service = request.service;
        let method = request.method;
        let url = self.transport.resolve_address(service, &request.path);

        debug!(
            service = %service,
            url = %url,
            method = %method,
            mode = %self.transport.mode(),
            "invoking service"
        );

        let result = self.send(&url, request).await;

        match &result {
            Ok(_) => record(service, "ok"),
            Err(e) => {
                error!(
                    service = %service,
                    url = %url,
                    method = %method,
                    status = e.status().map(|s| s.as_u16()),
                    error = %e,
                    "service invocation failed"
                );
                record(service, "error");
            }
        }

        result
    }

    async fn send(
        &self,
        url: &str,
        request: InvocationRequest,
    ) -> Result<Option<Value>, InvocationError> {
        let service = request.service;
        let headers = build_headers(service, &request)?;

        let mut builder = self
            .http
            .request(request.method.into(), url)
            .headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = request.outgoing_body() {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|source| InvocationError::Transport { service, source })?;

        let status = response.status();
        if !status.is_success() {
            // The body text is the only diagnostic; an unreadable body
            // still reports the status.
            let body = response.text().await.unwrap_or_default();
            return Err(InvocationError::Status {
                service,
                status,
                body,
            });
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains(APPLICATION_JSON));
        if !is_json {
            return Ok(None);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| InvocationError::Transport { service, source })?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| InvocationError::Decode { service, source })
    }
}

/// `Content-Type: application/json` overlaid with the caller's headers.
fn build_headers(
    service: ServiceName,
    request: &InvocationRequest,
) -> Result<HeaderMap, InvocationError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));

    for (name, value) in &request.headers {
        let invalid = || InvocationError::InvalidHeader {
            service,
            name: name.clone(),
        };
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        headers.insert(name, value);
    }

    Ok(headers)
}

fn record(service: ServiceName, outcome: &'static str) {
    metrics::counter!(
        "admin_gateway_invocations_total",
        "service" => service.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}
