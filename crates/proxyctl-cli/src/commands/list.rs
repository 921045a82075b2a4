//! `list` commands.
//!
//! Reads always go to the first host that answers, even with `--fan-out`.

use proxyctl_core::{Args, CommandNode, CommandTree, Context, Mode, Outcome, RegisterError, RequestDescriptor, handler};

use super::resources::{Document, ServerList, ServerResource, ServerRow, parse};
use super::unknown_command;
use crate::output::OutputFormat;

/// Register `list` and its subcommands.
pub(crate) fn register(tree: &mut CommandTree, format: OutputFormat) -> Result<(), RegisterError> {
    tree.register(
        &[],
        CommandNode::branch("list", "List objects").fallback(unknown_command("list")),
    )?;
    tree.register(
        &["list"],
        CommandNode::leaf(
            "servers",
            "List servers",
            handler(move |ctx, args| list_servers(ctx, args, format)),
        )
        .epilog("List all servers in the proxy."),
    )
}

async fn list_servers(ctx: Context, _args: Args, format: OutputFormat) -> Outcome {
    let policy = ctx.policy().with_mode(Mode::Sequential);
    let output = ctx
        .execute_with(&RequestDescriptor::get("servers"), &policy)
        .await?;

    let doc: Document<Vec<ServerResource>> = parse(output)?;
    let list = ServerList {
        servers: doc.data.into_iter().map(ServerRow::from).collect(),
    };
    format.render(&list)
}
