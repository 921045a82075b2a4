//! CLI command implementations.
//!
//! Each submodule registers one top-level command and its subcommands:
//! - [`clear`] - Clear object state
//! - [`set`] - Set object state
//! - [`list`] - List objects
//! - [`show`] - Show object details
//! - [`help`] - Render usage for any command

pub mod clear;
pub mod help;
pub mod list;
pub mod set;
pub mod show;

mod resources;

use proxyctl_core::node::FALLBACK_ARG;
use proxyctl_core::{Args, CommandTree, Context, CtlError, Handler, Outcome, RegisterError, handler};

use crate::output::OutputFormat;

/// Program name shown in usage lines.
pub const PROGRAM: &str = "proxyctl";

/// Server states that can be set or cleared.
pub const SERVER_STATES: &[&str] = &[
    "master",
    "slave",
    "maintenance",
    "running",
    "synced",
    "stale",
    "drain",
];

/// Build the full command tree.
///
/// # Errors
///
/// Returns an error only if two commands claim the same path, which is a
/// programming mistake.
pub fn build_tree(format: OutputFormat) -> Result<CommandTree, RegisterError> {
    let mut tree = CommandTree::new(
        PROGRAM,
        "Control a clustered database proxy through its admin REST API",
    );
    tree.set_root_fallback(unknown_command(""));

    clear::register(&mut tree)?;
    set::register(&mut tree)?;
    list::register(&mut tree, format)?;
    show::register(&mut tree, format)?;
    help::register(&mut tree)?;

    Ok(tree)
}

/// Fallback reporting an unknown subcommand of `branch` (empty for the root).
pub(crate) fn unknown_command(branch: &'static str) -> Handler {
    handler(move |_ctx, args| report_unknown(branch, args))
}

async fn report_unknown(branch: &'static str, args: Args) -> Outcome {
    let token = args.get(FALLBACK_ARG).unwrap_or_default();
    let hint = if branch.is_empty() {
        "help".to_string()
    } else {
        format!("help {branch}")
    };
    Err(CtlError::unknown_command(format!(
        "Unknown command '{token}'. See output of `{hint}` for a list of commands."
    )))
}

/// Reject anything that is not a settable server state before any request.
pub(crate) fn validate_state(ctx: &Context, path: &[&str], state: &str) -> Result<(), CtlError> {
    if SERVER_STATES.contains(&state) {
        return Ok(());
    }
    Err(CtlError::usage(
        format!(
            "Invalid state '{state}', expected one of: {}",
            SERVER_STATES.join(", ")
        ),
        ctx.tree().usage(path).unwrap_or_default(),
    ))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use proxyctl_core::testing::FakeTransport;
    use proxyctl_core::{Context, ExecutionPolicy, Executor, Host};

    use super::build_tree;
    use crate::cli::Format;
    use crate::output::OutputFormat;

    /// A context over the full tree with the given hosts and a fake transport.
    pub(crate) fn context(fake: &Arc<FakeTransport>, hosts: &[&str], format: Format) -> Context {
        let tree = build_tree(OutputFormat::new(format)).expect("static tree");
        let hosts: Vec<Host> = hosts.iter().map(|h| Host::new(*h)).collect();
        Context::new(
            Arc::new(Executor::new(fake.clone())),
            hosts,
            ExecutionPolicy::default(),
            Arc::new(tree),
        )
    }
}
