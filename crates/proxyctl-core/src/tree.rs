//! Command tree and router.
//!
//! The tree is built once at startup with [`CommandTree::register`] and is
//! read-only afterwards. [`CommandTree::resolve`] maps a token sequence to a
//! handler and its bound arguments without any I/O:
//!
//! ```text
//! ["clear", "server", "db1", "maintenance"]
//!    │        │       └──────┬──────┘
//!  branch   leaf       positional params
//!                   {server: db1, state: maintenance}
//! ```

use std::collections::btree_map::Entry;
use std::fmt::Write as _;

use tracing::debug;

use crate::error::{CtlError, RegisterError};
use crate::node::{Args, CommandNode, Context, FALLBACK_ARG, Handler, NodeKind};
use crate::outcome::Outcome;

/// A resolved invocation: the handler to run and what to run it with.
pub struct Resolved<'t> {
    /// Path of the matched node.
    pub path: Vec<String>,
    /// The matched node. For a fallback this is the branch.
    pub node: &'t CommandNode,
    /// Bound arguments.
    pub args: Args,
    /// Whether the branch fallback was selected.
    pub is_fallback: bool,
    handler: &'t Handler,
}

impl std::fmt::Debug for Resolved<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolved")
            .field("path", &self.path)
            .field("args", &self.args)
            .field("is_fallback", &self.is_fallback)
            .finish_non_exhaustive()
    }
}

impl Resolved<'_> {
    /// Run the handler.
    pub async fn invoke(self, ctx: Context) -> Outcome {
        (self.handler)(ctx, self.args).await
    }
}

/// Hierarchy of command nodes rooted at the program itself.
#[derive(Debug)]
pub struct CommandTree {
    root: CommandNode,
}

impl CommandTree {
    /// Create an empty tree for program `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            root: CommandNode::branch(name, description),
        }
    }

    /// The root branch.
    #[must_use]
    pub const fn root(&self) -> &CommandNode {
        &self.root
    }

    /// Program name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.root.name
    }

    /// Set the handler for unknown top-level commands.
    pub fn set_root_fallback(&mut self, handler: Handler) {
        if let NodeKind::Branch { fallback, .. } = &mut self.root.kind {
            *fallback = Some(handler);
        }
    }

    /// Insert `node` under `parent`, creating intermediate branches as needed.
    ///
    /// A branch registered where an intermediate was created implicitly takes
    /// over its description and fallback. On error the tree is unchanged.
    ///
    /// # Errors
    ///
    /// - [`RegisterError::DuplicateCommand`] if the path is taken, or if a
    ///   leaf sits on the way to it.
    /// - [`RegisterError::InvalidSchema`] if the node's parameters are
    ///   malformed.
    pub fn register(&mut self, parent: &[&str], node: CommandNode) -> Result<(), RegisterError> {
        let full_path = join_path(parent.iter().copied().chain([node.name.as_str()]));

        if let Some(reason) = node.schema_error() {
            return Err(RegisterError::InvalidSchema {
                path: full_path,
                reason,
            });
        }
        self.check_free(parent, &node, &full_path)?;

        // validated above, nothing below can fail
        let mut current = &mut self.root;
        for name in parent {
            let NodeKind::Branch { children, .. } = &mut current.kind else {
                return Err(RegisterError::DuplicateCommand { path: full_path });
            };
            current = children
                .entry((*name).to_string())
                .or_insert_with(|| CommandNode::implicit_branch(name));
        }
        let NodeKind::Branch { children, .. } = &mut current.kind else {
            return Err(RegisterError::DuplicateCommand { path: full_path });
        };

        match children.entry(node.name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(node);
            }
            Entry::Occupied(mut slot) => claim_implicit(slot.get_mut(), node),
        }

        debug!(path = %full_path, "Registered command");
        Ok(())
    }

    fn check_free(&self, parent: &[&str], node: &CommandNode, full_path: &str) -> Result<(), RegisterError> {
        let duplicate = || RegisterError::DuplicateCommand {
            path: full_path.to_string(),
        };

        let mut current = &self.root;
        for (depth, name) in parent.iter().enumerate() {
            match current.child(name) {
                Some(child) if child.is_leaf() => {
                    return Err(RegisterError::DuplicateCommand {
                        path: join_path(parent[..=depth].iter().copied()),
                    });
                }
                Some(child) => current = child,
                // the rest of the path will be created fresh
                None => return Ok(()),
            }
        }

        match current.child(&node.name) {
            None => Ok(()),
            Some(existing) => match (&existing.kind, &node.kind) {
                (NodeKind::Branch { implicit: true, .. }, NodeKind::Branch { .. }) => Ok(()),
                _ => Err(duplicate()),
            },
        }
    }

    /// Resolve tokens to a handler and bound arguments.
    ///
    /// # Errors
    ///
    /// - [`CtlError::Usage`] if a leaf gets too few or too many positional
    ///   tokens, or a branch gets no subcommand.
    /// - [`CtlError::UnknownCommand`] if a branch without a fallback gets a
    ///   token matching no child.
    pub fn resolve<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Resolved<'_>, CtlError> {
        let mut node = &self.root;
        let mut path: Vec<String> = Vec::new();
        let mut rest = tokens;

        while let Some((first, tail)) = rest.split_first() {
            let Some(child) = node.child(first.as_ref()) else {
                break;
            };
            path.push(child.name.clone());
            node = child;
            rest = tail;
        }

        match &node.kind {
            NodeKind::Leaf(handler) => {
                let args = self.bind(node, &path, rest)?;
                Ok(Resolved {
                    path,
                    node,
                    args,
                    is_fallback: false,
                    handler,
                })
            }
            NodeKind::Branch { fallback, .. } => match (rest.first(), fallback) {
                (Some(token), Some(handler)) => Ok(Resolved {
                    path,
                    node,
                    args: Args::default().with(FALLBACK_ARG, token.as_ref()),
                    is_fallback: true,
                    handler,
                }),
                (Some(token), None) => Err(CtlError::unknown_command(format!(
                    "Unknown command '{}'. See output of `{}` for a list of commands.",
                    token.as_ref(),
                    help_hint(&path),
                ))),
                (None, _) => Err(CtlError::usage(
                    if path.is_empty() {
                        "No command given".to_string()
                    } else {
                        format!("Missing subcommand for '{}'", path.join(" "))
                    },
                    self.render_usage(node, &path),
                )),
            },
        }
    }

    /// Resolve `tokens` and run the selected handler.
    ///
    /// Nothing is executed when resolution fails.
    pub async fn dispatch<S: AsRef<str>>(&self, tokens: &[S], ctx: Context) -> Outcome {
        let resolved = self.resolve(tokens)?;
        debug!(path = ?resolved.path, fallback = resolved.is_fallback, "Dispatching");
        resolved.invoke(ctx).await
    }

    /// Render help for the node at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CtlError::UnknownCommand`] if no node exists at `path`.
    pub fn usage<S: AsRef<str>>(&self, path: &[S]) -> Result<String, CtlError> {
        let mut node = &self.root;
        let mut names = Vec::with_capacity(path.len());
        for name in path {
            node = node.child(name.as_ref()).ok_or_else(|| {
                CtlError::unknown_command(format!(
                    "Unknown command '{}'. See output of `{}` for a list of commands.",
                    name.as_ref(),
                    help_hint(&names),
                ))
            })?;
            names.push(node.name.clone());
        }
        Ok(self.render_usage(node, &names))
    }

    fn bind<S: AsRef<str>>(&self, node: &CommandNode, path: &[String], rest: &[S]) -> Result<Args, CtlError> {
        let required = node.params.iter().filter(|p| p.required).count();
        let max = node.params.len();

        if rest.len() < required || rest.len() > max {
            let expected = if node.params.is_empty() {
                "no arguments".to_string()
            } else {
                node.param_synopsis()
            };
            return Err(CtlError::usage(
                format!(
                    "Wrong number of arguments for '{}': expected {expected}, got {}",
                    path.join(" "),
                    rest.len()
                ),
                self.render_usage(node, path),
            ));
        }

        Ok(node
            .params
            .iter()
            .zip(rest)
            .fold(Args::default(), |args, (param, value)| {
                args.with(param.name.clone(), value.as_ref())
            }))
    }

    fn usage_line(&self, node: &CommandNode, path: &[String]) -> String {
        if let Some(usage) = &node.usage {
            return usage.clone();
        }
        let mut line = String::from("Usage: ");
        if path.is_empty() {
            line.push_str(self.name());
        } else {
            line.push_str(&path.join(" "));
        }
        if node.is_leaf() {
            if !node.params.is_empty() {
                line.push(' ');
                line.push_str(&node.param_synopsis());
            }
        } else {
            line.push_str(" <command>");
        }
        line
    }

    fn render_usage(&self, node: &CommandNode, path: &[String]) -> String {
        let mut out = self.usage_line(node, path);
        if !node.description.is_empty() {
            let _ = write!(out, "\n\n{}", node.description);
        }

        let children: Vec<&CommandNode> = node.children().collect();
        if !children.is_empty() {
            let entries: Vec<(String, &str)> = children
                .iter()
                .map(|child| {
                    let mut synopsis = child.name.clone();
                    if child.is_leaf() && !child.params.is_empty() {
                        synopsis.push(' ');
                        synopsis.push_str(&child.param_synopsis());
                    } else if !child.is_leaf() {
                        synopsis.push_str(" <command>");
                    }
                    (synopsis, child.description.as_str())
                })
                .collect();
            let width = entries.iter().map(|(s, _)| s.len()).max().unwrap_or(0);

            out.push_str("\n\nCommands:");
            for (synopsis, description) in entries {
                let _ = write!(out, "\n  {synopsis:<width$}  {description}");
            }
        }

        if let Some(epilog) = &node.epilog {
            let _ = write!(out, "\n\n{epilog}");
        }
        out
    }
}

fn claim_implicit(existing: &mut CommandNode, node: CommandNode) {
    let CommandNode {
        description,
        usage,
        epilog,
        kind,
        ..
    } = node;
    existing.description = description;
    existing.usage = usage;
    existing.epilog = epilog;
    if let (
        NodeKind::Branch {
            fallback, implicit, ..
        },
        NodeKind::Branch {
            fallback: new_fallback,
            ..
        },
    ) = (&mut existing.kind, kind)
    {
        *fallback = new_fallback;
        *implicit = false;
    }
}

fn join_path<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(" ")
}

fn help_hint(path: &[String]) -> String {
    if path.is_empty() {
        "help".to_string()
    } else {
        format!("help {}", path.join(" "))
    }
}
