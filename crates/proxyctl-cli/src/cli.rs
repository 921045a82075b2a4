//! Global option parsing with clap.
//!
//! Clap only handles the global options. Everything after them is collected
//! verbatim and handed to the command tree.

use clap::{ArgAction, Parser, ValueEnum};

/// Default admin endpoint.
pub const DEFAULT_HOST: &str = "127.0.0.1:8989";

/// proxyctl - control a clustered database proxy through its admin REST API.
#[derive(Parser, Debug, Clone)]
#[command(name = "proxyctl")]
#[command(version, about, long_about = None)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Comma-separated admin endpoints, tried in order.
    #[arg(
        short = 'h',
        long,
        env = "PROXYCTL_HOSTS",
        value_delimiter = ',',
        default_value = DEFAULT_HOST
    )]
    pub hosts: Vec<String>,

    /// Admin user name.
    #[arg(short, long, env = "PROXYCTL_USER", default_value = "admin")]
    pub user: String,

    /// Admin password.
    #[arg(
        short,
        long,
        env = "PROXYCTL_PASSWORD",
        default_value = "mariadb",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub password: String,

    /// Use HTTPS for hosts given without a scheme.
    #[arg(short, long)]
    pub secure: bool,

    /// Timeout of a single request attempt in milliseconds.
    #[arg(short, long, env = "PROXYCTL_TIMEOUT", default_value_t = 10_000)]
    pub timeout: u64,

    /// Extra attempts per host after a connection failure or server error.
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    /// Apply state changes to every host instead of the first reachable one.
    #[arg(long)]
    pub fan_out: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Command to run, e.g. `clear server db1 maintenance`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// Human-readable tables.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}
