//! `show` commands.

use proxyctl_core::{Args, CommandNode, CommandTree, Context, Mode, Outcome, RegisterError, RequestDescriptor, Target, handler};

use super::resources::{Document, ServerDetail, ServerResource, parse};
use super::unknown_command;
use crate::output::OutputFormat;

/// Register `show` and its subcommands.
pub(crate) fn register(tree: &mut CommandTree, format: OutputFormat) -> Result<(), RegisterError> {
    tree.register(
        &[],
        CommandNode::branch("show", "Show object details").fallback(unknown_command("show")),
    )?;
    tree.register(
        &["show"],
        CommandNode::leaf(
            "server",
            "Show server",
            handler(move |ctx, args| show_server(ctx, args, format)),
        )
        .param("server")
        .epilog("The Services and Monitors fields list the objects that use the server."),
    )
}

async fn show_server(ctx: Context, args: Args, format: OutputFormat) -> Outcome {
    let server = args.require("server")?;
    let policy = ctx.policy().with_mode(Mode::Sequential);
    let target = Target::new("servers").segment(server).build();
    let output = ctx
        .execute_with(&RequestDescriptor::get(target), &policy)
        .await?;

    let doc: Document<ServerResource> = parse(output)?;
    format.render(&ServerDetail::from(doc.data))
}
