//! `clear` commands.

use proxyctl_core::{Args, CommandNode, CommandTree, Context, Outcome, RegisterError, RequestDescriptor, Target, handler};
use tracing::info;

use super::{unknown_command, validate_state};

/// Register `clear` and its subcommands.
pub(crate) fn register(tree: &mut CommandTree) -> Result<(), RegisterError> {
    tree.register(
        &[],
        CommandNode::branch("clear", "Clear object state").fallback(unknown_command("clear")),
    )?;
    tree.register(
        &["clear"],
        CommandNode::leaf("server", "Clear server state", handler(clear_server))
            .param("server")
            .param("state")
            .epilog(
                "This command clears a server state set by the `set server <server> <state>` command",
            ),
    )
}

async fn clear_server(ctx: Context, args: Args) -> Outcome {
    let server = args.require("server")?;
    let state = args.require("state")?;
    validate_state(&ctx, &["clear", "server"], state)?;

    let target = Target::new("servers")
        .segment(server)
        .segment("clear")
        .query("state", state)
        .build();
    let output = ctx.execute(&RequestDescriptor::put(target)).await?;
    info!(server, state, "Cleared server state");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proxyctl_core::testing::{FakeTransport, Reply};
    use proxyctl_core::{ErrorKind, Method, Output};

    use crate::cli::Format;
    use crate::commands::test_support::context;

    #[tokio::test]
    async fn clears_state_with_a_single_put() {
        let fake = Arc::new(FakeTransport::new().reply("http://a", Reply::Status(204, String::new())));
        let ctx = context(&fake, &["http://a:8989"], Format::Table);

        let out = ctx
            .tree()
            .dispatch(&["clear", "server", "db1", "maintenance"], ctx.clone())
            .await
            .expect("cleared");

        assert_eq!(out, Output::Empty);
        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::Put);
        assert_eq!(calls[0].url, "http://a:8989/v1/servers/db1/clear?state=maintenance");
    }

    #[tokio::test]
    async fn server_names_are_percent_encoded() {
        let fake = Arc::new(FakeTransport::new());
        let ctx = context(&fake, &["http://a:8989"], Format::Table);

        ctx.tree()
            .dispatch(&["clear", "server", "db 1/x", "drain"], ctx.clone())
            .await
            .expect("cleared");

        assert_eq!(fake.urls(), vec!["http://a:8989/v1/servers/db%201%2Fx/clear?state=drain"]);
    }

    #[tokio::test]
    async fn dot_segment_server_stays_under_servers() {
        let fake = Arc::new(FakeTransport::new());
        let ctx = context(&fake, &["http://a:8989"], Format::Table);

        ctx.tree()
            .dispatch(&["clear", "server", "..", "maintenance"], ctx.clone())
            .await
            .expect("cleared");

        assert_eq!(
            fake.urls(),
            vec!["http://a:8989/v1/servers/%2E%2E/clear?state=maintenance"]
        );
    }

    #[tokio::test]
    async fn invalid_state_sends_nothing() {
        let fake = Arc::new(FakeTransport::new());
        let ctx = context(&fake, &["http://a:8989"], Format::Table);

        let err = ctx
            .tree()
            .dispatch(&["clear", "server", "db1", "bogus"], ctx.clone())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.to_string().contains("Invalid state 'bogus'"));
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_state_is_a_usage_error() {
        let fake = Arc::new(FakeTransport::new());
        let ctx = context(&fake, &["http://a:8989"], Format::Table);

        let err = ctx
            .tree()
            .dispatch(&["clear", "server", "db1"], ctx.clone())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(fake.call_count(), 0);
    }
}
