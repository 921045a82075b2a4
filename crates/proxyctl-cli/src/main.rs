//! proxyctl binary entrypoint.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use proxyctl_cli::commands::build_tree;
use proxyctl_cli::driver::{self, Driver, EXIT_INTERRUPTED};
use proxyctl_cli::{Cli, Config, OutputFormat, ReqwestTransport};

/// Exit status when the built-in command tree is inconsistent (`EX_SOFTWARE`).
const EXIT_INTERNAL: u8 = 70;

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the rendered outcome only
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    ExitCode::from(runtime.block_on(run(cli)))
}

async fn run(cli: Cli) -> u8 {
    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => return driver::finish(&Err(e), &format, &mut stdout),
    };

    let tree = match build_tree(format) {
        Ok(tree) => tree,
        Err(e) => {
            error!(error = %e, "Command registration failed");
            eprintln!("internal error: {e}");
            return EXIT_INTERNAL;
        }
    };

    let transport = match ReqwestTransport::new() {
        Ok(transport) => transport,
        Err(e) => return driver::finish(&Err(e), &format, &mut stdout),
    };

    let driver = Driver::new(tree, Arc::new(transport), &config);
    tokio::select! {
        outcome = driver.run(cli.command.as_slice()) => driver.finish(&outcome, &mut stdout),
        () = interrupted() => {
            info!("Interrupted, abandoning in-flight requests");
            EXIT_INTERRUPTED
        }
    }
}

/// Resolves on SIGINT. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for interrupts");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxyctl_cli::driver::{EXIT_FAILURE, EXIT_SUCCESS};

    #[test]
    fn command_tree_builds() {
        assert!(build_tree(OutputFormat::default()).is_ok());
    }

    #[tokio::test]
    async fn run_unknown_command_fails_locally() {
        let cli = Cli::parse_from(["proxyctl", "-h", "127.0.0.1:1", "bogus"]);
        assert_eq!(run(cli).await, EXIT_FAILURE);
    }

    #[tokio::test]
    async fn run_with_no_hosts_fails() {
        let cli = Cli::parse_from(["proxyctl", "--hosts", "", "list", "servers"]);
        assert_eq!(run(cli).await, EXIT_FAILURE);
    }

    #[tokio::test]
    async fn run_help_succeeds() {
        let cli = Cli::parse_from(["proxyctl", "help", "set"]);
        assert_eq!(run(cli).await, EXIT_SUCCESS);
    }

    #[tokio::test]
    async fn run_against_closed_port_fails() {
        let cli = Cli::parse_from(["proxyctl", "-h", "127.0.0.1:1", "-t", "2000", "list", "servers"]);
        assert_eq!(run(cli).await, EXIT_FAILURE);
    }
}
