//! Outbound invocation requests.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use admin_gateway_core::ServiceName;
use serde_json::Value;

/// The HTTP methods a downstream call may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl InvokeMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InvokeMethod::Get => "GET",
            InvokeMethod::Post => "POST",
            InvokeMethod::Put => "PUT",
            InvokeMethod::Patch => "PATCH",
            InvokeMethod::Delete => "DELETE",
        }
    }
}

impl From<InvokeMethod> for http::Method {
    fn from(method: InvokeMethod) -> Self {
        match method {
            InvokeMethod::Get => http::Method::GET,
            InvokeMethod::Post => http::Method::POST,
            InvokeMethod::Put => http::Method::PUT,
            InvokeMethod::Patch => http::Method::PATCH,
            InvokeMethod::Delete => http::Method::DELETE,
        }
    }
}

impl fmt::Display for InvokeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned for a method outside GET/POST/PUT/PATCH/DELETE.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported invocation method: {0}")]
pub struct UnsupportedMethod(pub String);

impl FromStr for InvokeMethod {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(InvokeMethod::Get),
            "POST" => Ok(InvokeMethod::Post),
            "PUT" => Ok(InvokeMethod::Put),
            "PATCH" => Ok(InvokeMethod::Patch),
            "DELETE" => Ok(InvokeMethod::Delete),
            _ => Err(UnsupportedMethod(s.to_string())),
        }
    }
}

/// One call to a downstream service.
///
/// `path` may carry a leading slash; the transport strips it. Query
/// parameters go in `query` and are encoded by the HTTP client rather than
/// being spliced into `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub service: ServiceName,
    pub path: String,
    pub method: InvokeMethod,
    pub body: Option<Value>,
    pub headers: BTreeMap<String, String>,
    pub query: Vec<(String, String)>,
}

impl InvocationRequest {
    #[must_use]
    pub fn new(service: ServiceName, method: InvokeMethod, path: impl Into<String>) -> Self {
        Self {
            service,
            path: path.into(),
            method,
            body: None,
            headers: BTreeMap::new(),
            query: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(service: ServiceName, path: impl Into<String>) -> Self {
        Self::new(service, InvokeMethod::Get, path)
    }

    #[must_use]
    pub fn post(service: ServiceName, path: impl Into<String>) -> Self {
        Self::new(service, InvokeMethod::Post, path)
    }

    #[must_use]
    pub fn put(service: ServiceName, path: impl Into<String>) -> Self {
        Self::new(service, InvokeMethod::Put, path)
    }

    #[must_use]
    pub fn patch(service: ServiceName, path: impl Into<String>) -> Self {
        Self::new(service, InvokeMethod::Patch, path)
    }

    #[must_use]
    pub fn delete(service: ServiceName, path: impl Into<String>) -> Self {
        Self::new(service, InvokeMethod::Delete, path)
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds headers; a later value for the same name replaces an earlier one.
    #[must_use]
    pub fn with_headers<I>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.headers.extend(headers);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_query<I, K, V>(mut self, query: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(query.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// The body to serialize, if any. GET never sends one, and a JSON `null`
    /// counts as no body.
    #[must_use]
    pub fn outgoing_body(&self) -> Option<&Value> {
        if self.method == InvokeMethod::Get {
            return None;
        }
        self.body.as_ref().filter(|b| !b.is_null())
    }
}
