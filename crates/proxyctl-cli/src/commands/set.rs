//! `set` commands.

use proxyctl_core::{Args, CommandNode, CommandTree, Context, Outcome, RegisterError, RequestDescriptor, Target, handler};
use tracing::info;

use super::{SERVER_STATES, unknown_command, validate_state};

/// Register `set` and its subcommands.
pub(crate) fn register(tree: &mut CommandTree) -> Result<(), RegisterError> {
    tree.register(
        &[],
        CommandNode::branch("set", "Set object state").fallback(unknown_command("set")),
    )?;
    tree.register(
        &["set"],
        CommandNode::leaf("server", "Set server state", handler(set_server))
            .param("server")
            .param("state")
            .epilog(format!(
                "If <server> is monitored by a monitor, the monitor may overwrite the \
                 state. Valid states are: {}",
                SERVER_STATES.join(", ")
            )),
    )
}

async fn set_server(ctx: Context, args: Args) -> Outcome {
    let server = args.require("server")?;
    let state = args.require("state")?;
    validate_state(&ctx, &["set", "server"], state)?;

    let target = Target::new("servers")
        .segment(server)
        .segment("set")
        .query("state", state)
        .build();
    let output = ctx.execute(&RequestDescriptor::put(target)).await?;
    info!(server, state, "Set server state");
    Ok(output)
}
