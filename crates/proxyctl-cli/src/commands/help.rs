//! `help` command.

use proxyctl_core::{Args, CommandNode, CommandTree, Context, Outcome, Output, RegisterError, handler};

/// Register `help`.
pub(crate) fn register(tree: &mut CommandTree) -> Result<(), RegisterError> {
    tree.register(
        &[],
        CommandNode::leaf("help", "Show help for a command", handler(help))
            .optional_param("command")
            .optional_param("subcommand"),
    )
}

async fn help(ctx: Context, args: Args) -> Outcome {
    let path: Vec<&str> = ["command", "subcommand"]
        .into_iter()
        .filter_map(|name| args.get(name))
        .collect();
    ctx.tree().usage(path.as_slice()).map(Output::Text)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proxyctl_core::testing::FakeTransport;
    use proxyctl_core::{ErrorKind, Output};

    use crate::cli::Format;
    use crate::commands::test_support::context;

    async fn run(tokens: &[&str]) -> proxyctl_core::Outcome {
        let fake = Arc::new(FakeTransport::new());
        let ctx = context(&fake, &["http://a:8989"], Format::Table);
        let out = ctx.tree().dispatch(tokens, ctx.clone()).await;
        assert_eq!(fake.call_count(), 0);
        out
    }

    #[tokio::test]
    async fn root_help_lists_commands() {
        let Output::Text(text) = run(&["help"]).await.expect("help") else {
            panic!("expected text");
        };
        for name in ["clear", "set", "list", "show", "help"] {
            assert!(text.contains(name), "{name} missing from:\n{text}");
        }
    }

    #[tokio::test]
    async fn leaf_help_shows_params_and_epilog() {
        let Output::Text(text) = run(&["help", "clear", "server"]).await.expect("help") else {
            panic!("expected text");
        };
        assert!(text.contains("clear server <server> <state>"));
        assert!(text.contains("set server <server> <state>"));
    }

    #[tokio::test]
    async fn help_for_unknown_command() {
        let err = run(&["help", "frobnicate"]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownCommand);
    }
}
