//! # proxyctl-core
//!
//! Command dispatch and multi-host request engine for `proxyctl`.
//!
//! Provides:
//! - A read-only command tree that resolves tokens to handlers
//! - Request descriptors replayable against any cluster member
//! - An executor with sequential failover and cluster-wide fan-out
//! - One error taxonomy for everything an invocation can end in
//!
//! # Architecture
//!
//! ```text
//! tokens ──► CommandTree::resolve ──► handler(Context, Args)
//!                                          │
//!                                          ▼
//!                            Executor::execute(descriptor, hosts, policy)
//!                                          │
//!                                          ▼
//!                                  Transport::send ──► admin API
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod executor;
pub mod host;
pub mod node;
pub mod outcome;
pub mod request;
pub mod transport;
pub mod tree;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{CtlError, ErrorKind, FailureCause, HostFailure, RegisterError};
pub use executor::{ExecutionPolicy, Executor, Mode};
pub use host::{Credentials, Host};
pub use node::{Args, CommandNode, Context, Handler, handler};
pub use outcome::{Outcome, Output};
pub use request::{Expect, Method, RequestDescriptor, Target};
pub use transport::{BoxFuture, HttpRequest, HttpResponse, Transport, TransportError};
pub use tree::{CommandTree, Resolved};
