//! HTTP transport backed by reqwest.
//!
//! All reqwest errors are normalized into [`TransportError`] here; nothing
//! above this module sees a reqwest type.

use std::error::Error as _;

use proxyctl_core::{BoxFuture, CtlError, HttpRequest, HttpResponse, Method, Transport, TransportError};
use tracing::trace;

/// Sends admin API requests with HTTP basic auth.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`CtlError::Config`] if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, CtlError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("proxyctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CtlError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url)
            .basic_auth(request.credentials.user(), Some(request.credentials.password()));
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(normalize)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(normalize)?;

        trace!(url = %request.url, status, bytes = body.len(), "HTTP exchange complete");
        Ok(HttpResponse::new(status, body))
    }
}

impl Transport for ReqwestTransport {
    fn send<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        Box::pin(self.perform(request))
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn normalize(err: reqwest::Error) -> TransportError {
    // reqwest's own message omits the underlying cause
    let message = match err.source() {
        Some(source) => format!("{err}: {source}"),
        None => err.to_string(),
    };
    if err.is_connect() {
        TransportError::Connect(message)
    } else {
        TransportError::Other(message)
    }
}
