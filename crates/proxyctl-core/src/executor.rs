//! Multi-host request execution.
//!
//! The [`Executor`] applies one [`RequestDescriptor`] to an ordered list of
//! candidate hosts in one of two modes:
//!
//! - [`Mode::Sequential`]: try hosts in order and stop at the first success.
//!   Later hosts are never contacted once one has succeeded.
//! - [`Mode::FanOut`]: apply the request to every host concurrently and
//!   require all of them to succeed. Failures are reported per host, in host
//!   order, whatever order the responses arrived in.
//!
//! ```text
//!  Sequential        FanOut
//!  h1 ─✗─► h2 ─✓     h1 ─✓─┐
//!                    h2 ─✗─┼─► PartialFailure { h2 }
//!                    h3 ─✓─┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde_json::{Map, Value};
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::error::{CtlError, FailureCause, HostFailure};
use crate::host::Host;
use crate::outcome::{Outcome, Output};
use crate::request::RequestDescriptor;
use crate::transport::{HttpRequest, Transport, TransportError};

/// Default timeout for a single attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How a request is spread over the candidate hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Try hosts in order until one succeeds.
    #[default]
    Sequential,
    /// Apply to every host and require all to succeed.
    FanOut,
}

/// Execution policy for one logical operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionPolicy {
    /// Host ordering mode.
    pub mode: Mode,
    /// Timeout of a single attempt.
    pub timeout: Duration,
    /// Extra attempts per host after a transient failure.
    pub retries: u32,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self {
            mode: Mode::Sequential,
            timeout: DEFAULT_TIMEOUT,
            retries: 0,
        }
    }
}

impl ExecutionPolicy {
    /// Use the given mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Use the given per-attempt timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use the given number of retries per host.
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

/// Issues request descriptors against candidate hosts.
///
/// Holds no state besides the transport.
#[derive(Clone)]
pub struct Executor {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor").finish_non_exhaustive()
    }
}

impl Executor {
    /// Create an executor on top of a transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Execute `descriptor` against `hosts` under `policy`.
    ///
    /// A single host is reported the same way in both modes: its own
    /// [`CtlError::HostUnreachable`] or [`CtlError::ServerRejected`].
    ///
    /// # Errors
    ///
    /// - [`CtlError::NoHostsConfigured`] if `hosts` is empty; nothing is sent.
    /// - [`CtlError::AllHostsUnreachable`] if sequential failover exhausts
    ///   all hosts.
    /// - [`CtlError::PartialFailure`] if a fan-out fails on any host.
    pub async fn execute(
        &self,
        descriptor: &RequestDescriptor,
        hosts: &[Host],
        policy: &ExecutionPolicy,
    ) -> Outcome {
        if hosts.is_empty() {
            return Err(CtlError::NoHostsConfigured);
        }

        debug!(
            method = %descriptor.method(),
            target = descriptor.target(),
            hosts = hosts.len(),
            mode = ?policy.mode,
            "Executing request"
        );

        match policy.mode {
            Mode::Sequential => self.sequential(descriptor, hosts, policy).await,
            Mode::FanOut => self.fan_out(descriptor, hosts, policy).await,
        }
    }

    async fn sequential(
        &self,
        descriptor: &RequestDescriptor,
        hosts: &[Host],
        policy: &ExecutionPolicy,
    ) -> Outcome {
        let mut failures = Vec::with_capacity(hosts.len());

        for host in hosts {
            match self.on_host(descriptor, host, policy).await {
                Ok(output) => {
                    debug!(host = %host, "Request succeeded");
                    return Ok(output);
                }
                Err(cause) => {
                    warn!(host = %host, error = %cause, "Host failed, trying next");
                    failures.push(HostFailure::new(host.base_url(), cause));
                }
            }
        }

        if hosts.len() == 1 {
            if let Some(failure) = failures.pop() {
                return Err(failure.into_error());
            }
        }
        Err(CtlError::AllHostsUnreachable { failures })
    }

    async fn fan_out(
        &self,
        descriptor: &RequestDescriptor,
        hosts: &[Host],
        policy: &ExecutionPolicy,
    ) -> Outcome {
        let attempts = hosts
            .iter()
            .map(|host| self.on_host(descriptor, host, policy));
        // join_all yields results in input order, not completion order
        let results = join_all(attempts).await;

        let mut outputs = Vec::with_capacity(hosts.len());
        let mut failures = Vec::new();
        for (host, result) in hosts.iter().zip(results) {
            match result {
                Ok(output) => outputs.push((host, output)),
                Err(cause) => {
                    warn!(host = %host, error = %cause, "Host failed during fan-out");
                    failures.push(HostFailure::new(host.base_url(), cause));
                }
            }
        }

        if failures.is_empty() {
            return Ok(merge_outputs(outputs));
        }
        if hosts.len() == 1 {
            if let Some(failure) = failures.pop() {
                return Err(failure.into_error());
            }
        }
        Err(CtlError::PartialFailure {
            failures,
            total: hosts.len(),
        })
    }

    /// All attempts against one host: one plus up to `retries` more while the
    /// failure is transient.
    async fn on_host(
        &self,
        descriptor: &RequestDescriptor,
        host: &Host,
        policy: &ExecutionPolicy,
    ) -> Result<Output, FailureCause> {
        let mut retried = 0;
        loop {
            match self.attempt(descriptor, host, policy.timeout).await {
                Ok(output) => return Ok(output),
                Err(cause) if cause.is_transient() && retried < policy.retries => {
                    retried += 1;
                    debug!(host = %host, retry = retried, error = %cause, "Retrying");
                }
                Err(cause) => return Err(cause),
            }
        }
    }

    async fn attempt(
        &self,
        descriptor: &RequestDescriptor,
        host: &Host,
        limit: Duration,
    ) -> Result<Output, FailureCause> {
        let request = HttpRequest {
            method: descriptor.method(),
            url: host.url_for(descriptor.target()),
            body: descriptor.body().cloned(),
            credentials: host.credentials().clone(),
        };

        trace!(method = %request.method, url = %request.url, "Sending request");

        let response = timeout(limit, self.transport.send(request))
            .await
            .map_err(|_| FailureCause::Unreachable(TransportError::Timeout(limit).to_string()))?
            .map_err(|e| FailureCause::Unreachable(e.to_string()))?;

        trace!(status = response.status, "Received response");

        if descriptor.expect().matches(response.status) {
            Ok(Output::from_body(&response.body))
        } else {
            Err(FailureCause::Rejected {
                status: response.status,
                message: error_message(response.status, &response.body),
            })
        }
    }
}

/// Reduce per-host successes to one value.
///
/// Identical outputs collapse to one; differing outputs are keyed by host.
fn merge_outputs(outputs: Vec<(&Host, Output)>) -> Output {
    let all_same = outputs.windows(2).all(|pair| pair[0].1 == pair[1].1);
    if all_same {
        return outputs
            .into_iter()
            .next()
            .map(|(_, output)| output)
            .unwrap_or_default();
    }

    let by_host: Map<String, Value> = outputs
        .into_iter()
        .map(|(host, output)| (host.base_url().to_string(), output.to_json()))
        .collect();
    Output::Json(Value::Object(by_host))
}

/// Extract a readable message from an error response.
///
/// The admin API reports errors as `{"errors": [{"detail": "..."}]}`.
fn error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let details: Vec<&str> = value
            .get("errors")
            .and_then(Value::as_array)
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e.get("detail").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();
        if !details.is_empty() {
            return details.join("; ");
        }
    }

    let body = body.trim();
    if body.is_empty() {
        format!("request failed with status {status}")
    } else {
        body.to_string()
    }
}
