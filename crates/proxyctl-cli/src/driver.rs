//! Execution driver.
//!
//! Runs one invocation from command tokens to exit status:
//!
//! ```text
//! tokens ─► resolve ─► bind ─► handler ─► executor ─► Outcome ─► render ─► exit code
//! ```
//!
//! Resolution failures come back before any executor call. Handler outcomes
//! are forwarded unchanged, and exactly one outcome is rendered.

use std::io::Write;
use std::sync::Arc;

use proxyctl_core::{CommandTree, Context, ExecutionPolicy, Executor, Host, Outcome, Transport};
use tracing::{debug, warn};

use crate::config::Config;
use crate::output::OutputFormat;

/// Exit status of a successful invocation.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit status of any failed invocation.
pub const EXIT_FAILURE: u8 = 1;
/// Exit status when the process is interrupted.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Drives command invocations against a fixed tree and host list.
#[derive(Debug)]
pub struct Driver {
    tree: Arc<CommandTree>,
    executor: Arc<Executor>,
    hosts: Arc<[Host]>,
    policy: ExecutionPolicy,
    format: OutputFormat,
}

impl Driver {
    /// Create a driver for `tree` sending requests through `transport`.
    #[must_use]
    pub fn new(tree: CommandTree, transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self {
            tree: Arc::new(tree),
            executor: Arc::new(Executor::new(transport)),
            hosts: config.hosts.clone().into(),
            policy: config.policy,
            format: OutputFormat::new(config.format),
        }
    }

    /// The dispatch context handed to handlers.
    #[must_use]
    pub fn context(&self) -> Context {
        Context::new(
            Arc::clone(&self.executor),
            Arc::clone(&self.hosts),
            self.policy,
            Arc::clone(&self.tree),
        )
    }

    /// Run one invocation and return its outcome.
    pub async fn run<S: AsRef<str>>(&self, tokens: &[S]) -> Outcome {
        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        debug!(?tokens, "Received command");

        let resolved = match self.tree.resolve(tokens.as_slice()) {
            Ok(resolved) => resolved,
            Err(e) => {
                debug!(kind = ?e.kind(), "Resolution failed");
                return Err(e);
            }
        };
        debug!(path = ?resolved.path, args = resolved.args.len(), fallback = resolved.is_fallback, "Resolved");

        let outcome = resolved.invoke(self.context()).await;
        match &outcome {
            Ok(_) => debug!("Completed"),
            Err(e) => debug!(kind = ?e.kind(), "Failed"),
        }
        outcome
    }

    /// Render `outcome` to `writer` and return the exit status.
    ///
    /// Both success values and failure messages go to the same writer.
    pub fn finish<W: Write>(&self, outcome: &Outcome, writer: &mut W) -> u8 {
        finish(outcome, &self.format, writer)
    }
}

/// Render `outcome` with `format` and return the exit status.
///
/// Usable before a [`Driver`] exists, e.g. for configuration errors.
pub fn finish<W: Write>(outcome: &Outcome, format: &OutputFormat, writer: &mut W) -> u8 {
    let (written, code) = match outcome {
        Ok(output) => (format.write(writer, output), EXIT_SUCCESS),
        Err(e) => (format.write_error(writer, e), EXIT_FAILURE),
    };
    if let Err(e) = written.and_then(|()| writer.flush().map_err(Into::into)) {
        warn!(error = %e, "Failed to write output");
    }
    code
}
