//! Transport boundary.
//!
//! The executor never sees transport-specific error types: implementations
//! normalize everything into a status/body pair or a [`TransportError`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::host::Credentials;
use crate::request::Method;

/// Boxed future type for async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A request ready to put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Optional JSON body.
    pub body: Option<Value>,
    /// Basic-auth credentials.
    pub credentials: Credentials,
}

/// A response received from a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Create a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Failure to obtain any response from a host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection could not be established or was dropped.
    #[error("connection failed: {0}")]
    Connect(String),

    /// No response arrived in time.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Any other transport failure.
    #[error("request failed: {0}")]
    Other(String),
}

/// Sends HTTP requests to admin endpoints.
pub trait Transport: Send + Sync {
    /// Send one request and wait for the response.
    ///
    /// Any status code, including errors, is a response; only failures to get
    /// a response at all are errors.
    fn send<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, TransportError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display_in_millis() {
        let err = TransportError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "request timed out after 1500ms");
    }

    #[test]
    fn connect_display() {
        let err = TransportError::Connect("connection refused".into());
        assert_eq!(err.to_string(), "connection failed: connection refused");
    }
}
