//! # proxyctl-cli
//!
//! Command-line control client for a clustered database proxy.
//!
//! Global options are parsed by [`cli::Cli`]; the remaining tokens are
//! resolved against the command tree built by [`commands::build_tree`] and
//! run by the [`driver::Driver`]:
//!
//! ```text
//! ┌──────────┐  tokens   ┌────────┐  requests   ┌──────────┐   HTTP   ┌───────────────┐
//! │  clap    │──────────►│ Driver │────────────►│ Executor │─────────►│ proxy admin   │
//! │  (Cli)   │           │ + tree │◄────────────│          │◄─────────│ API (N hosts) │
//! └──────────┘           └────────┘   Outcome   └──────────┘          └───────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod driver;
pub mod http;
pub mod output;

pub use cli::{Cli, Format};
pub use config::Config;
pub use driver::Driver;
pub use http::ReqwestTransport;
pub use output::OutputFormat;
