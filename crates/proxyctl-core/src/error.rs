//! Error types for command resolution and request execution.
//!
//! Every failure an invocation can end in is a [`CtlError`]. Local errors
//! (usage, unknown command, configuration) never reach the network; the
//! host-related variants carry enough per-host detail for an operator to see
//! which cluster member failed and why.

use std::fmt;

use thiserror::Error;

/// Result type alias for command dispatch.
pub type Result<T> = std::result::Result<T, CtlError>;

/// Coarse classification of a [`CtlError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing parameters.
    Usage,
    /// No command matches the input.
    UnknownCommand,
    /// The candidate host list is empty.
    NoHostsConfigured,
    /// A single host could not be reached.
    HostUnreachable,
    /// Sequential failover ran out of hosts.
    AllHostsUnreachable,
    /// A fan-out operation failed on some hosts.
    PartialFailure,
    /// A host answered but refused the operation.
    ServerRejected,
    /// Invalid client configuration.
    Config,
    /// Output rendering failed.
    Format,
    /// Local I/O failed.
    Io,
}

/// Why one host failed to service a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// Connection error or timeout.
    Unreachable(String),
    /// The host responded with a status the request did not expect.
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },
}

impl FailureCause {
    /// Whether another attempt against the same host could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Unreachable(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
        }
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable(reason) => f.write_str(reason),
            Self::Rejected { status, message } => write!(f, "HTTP {status}: {message}"),
        }
    }
}

/// The failure recorded for one candidate host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFailure {
    /// Base URL of the host.
    pub host: String,
    /// What went wrong.
    pub cause: FailureCause,
}

impl HostFailure {
    /// Create a new host failure record.
    #[must_use]
    pub fn new(host: impl Into<String>, cause: FailureCause) -> Self {
        Self {
            host: host.into(),
            cause,
        }
    }

    /// Report this failure on its own, as a single-host error.
    #[must_use]
    pub fn into_error(self) -> CtlError {
        match self.cause {
            FailureCause::Unreachable(reason) => CtlError::HostUnreachable {
                host: self.host,
                reason,
            },
            FailureCause::Rejected { status, message } => CtlError::ServerRejected {
                host: self.host,
                status,
                message,
            },
        }
    }
}

impl fmt::Display for HostFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.host, self.cause)
    }
}

/// Failure outcome of a single invocation.
#[derive(Debug, Error)]
pub enum CtlError {
    /// Wrong number of arguments or an invalid argument value.
    #[error("{message}")]
    Usage {
        /// What was wrong with the input.
        message: String,
        /// Rendered usage text of the addressed command.
        usage: String,
    },

    /// No command matches the input.
    #[error("{message}")]
    UnknownCommand {
        /// Human-readable explanation.
        message: String,
    },

    /// The candidate host list is empty.
    #[error("no hosts configured")]
    NoHostsConfigured,

    /// The only candidate host could not be reached.
    #[error("{host}: {reason}")]
    HostUnreachable {
        /// Base URL of the host.
        host: String,
        /// Connection error or timeout description.
        reason: String,
    },

    /// Every candidate host failed in sequential failover.
    #[error("{}", render_failures("All configured hosts failed:", .failures))]
    AllHostsUnreachable {
        /// Per-host failures in host order.
        failures: Vec<HostFailure>,
    },

    /// Some hosts failed a cluster-wide operation.
    #[error("{}", render_partial(.failures, .total))]
    PartialFailure {
        /// Failed hosts in host order.
        failures: Vec<HostFailure>,
        /// Number of hosts the operation was applied to.
        total: usize,
    },

    /// A host answered but refused the operation.
    #[error("{host}: server rejected the request (HTTP {status}): {message}")]
    ServerRejected {
        /// Base URL of the host.
        host: String,
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Output rendering failed.
    #[error("format error: {0}")]
    Format(String),

    /// Local I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CtlError {
    /// Build a usage error.
    #[must_use]
    pub fn usage(message: impl Into<String>, usage: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            usage: usage.into(),
        }
    }

    /// Build an unknown-command error.
    #[must_use]
    pub fn unknown_command(message: impl Into<String>) -> Self {
        Self::UnknownCommand {
            message: message.into(),
        }
    }

    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Usage { .. } => ErrorKind::Usage,
            Self::UnknownCommand { .. } => ErrorKind::UnknownCommand,
            Self::NoHostsConfigured => ErrorKind::NoHostsConfigured,
            Self::HostUnreachable { .. } => ErrorKind::HostUnreachable,
            Self::AllHostsUnreachable { .. } => ErrorKind::AllHostsUnreachable,
            Self::PartialFailure { .. } => ErrorKind::PartialFailure,
            Self::ServerRejected { .. } => ErrorKind::ServerRejected,
            Self::Config(_) => ErrorKind::Config,
            Self::Format(_) => ErrorKind::Format,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether the error was raised before any network I/O.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Usage
                | ErrorKind::UnknownCommand
                | ErrorKind::NoHostsConfigured
                | ErrorKind::Config
        )
    }

    /// Per-host failure detail, if any.
    #[must_use]
    pub fn host_failures(&self) -> &[HostFailure] {
        match self {
            Self::AllHostsUnreachable { failures } | Self::PartialFailure { failures, .. } => {
                failures
            }
            _ => &[],
        }
    }
}

fn render_partial(failures: &[HostFailure], total: &usize) -> String {
    let header = format!("Operation failed on {} of {total} hosts:", failures.len());
    render_failures(&header, failures)
}

fn render_failures(header: &str, failures: &[HostFailure]) -> String {
    let mut out = String::from(header);
    for failure in failures {
        out.push_str("\n  ");
        out.push_str(&failure.to_string());
    }
    out
}

/// Errors raised while building the command tree.
///
/// These indicate a programming mistake in command registration, not bad user
/// input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// A command already occupies the path.
    #[error("duplicate command: '{path}'")]
    DuplicateCommand {
        /// Space-separated command path.
        path: String,
    },

    /// The node's parameter schema is malformed.
    #[error("invalid parameters for '{path}': {reason}")]
    InvalidSchema {
        /// Space-separated command path.
        path: String,
        /// What is wrong with the schema.
        reason: String,
    },
}
