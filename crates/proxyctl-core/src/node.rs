//! Command nodes.
//!
//! A [`CommandNode`] is either a leaf carrying a handler or a branch carrying
//! children and an optional fallback for unmatched subcommands. Nodes are
//! plain data; they are assembled into a [`CommandTree`](crate::tree::CommandTree)
//! once at startup and never mutated afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::CtlError;
use crate::executor::{ExecutionPolicy, Executor};
use crate::host::Host;
use crate::outcome::Outcome;
use crate::request::RequestDescriptor;
use crate::transport::BoxFuture;
use crate::tree::CommandTree;

/// Name of the argument a fallback handler receives the unmatched token in.
pub const FALLBACK_ARG: &str = "command";

/// Boxed command handler.
pub type Handler = Arc<dyn Fn(Context, Args) -> BoxFuture<'static, Outcome> + Send + Sync>;

/// Wrap an async function as a [`Handler`].
///
/// ```rust
/// use proxyctl_core::node::{handler, Args, Context};
/// use proxyctl_core::{Outcome, Output};
///
/// async fn ping(_ctx: Context, _args: Args) -> Outcome {
///     Ok(Output::Text("pong".into()))
/// }
///
/// let _h = handler(ping);
/// ```
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Context, Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    Arc::new(move |ctx: Context, args: Args| -> BoxFuture<'static, Outcome> {
        Box::pin(f(ctx, args))
    })
}

/// A positional parameter in a node's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Whether the parameter must be supplied.
    pub required: bool,
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.required {
            write!(f, "<{}>", self.name)
        } else {
            write!(f, "[{}]", self.name)
        }
    }
}

/// Positional arguments bound to a node's parameters, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    values: Vec<(String, String)>,
}

impl Args {
    /// Bind a value to a parameter name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.push((name.into(), value.into()));
        self
    }

    /// Value of a parameter, if bound.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of a required parameter.
    ///
    /// The router has already checked arity, so this only fails when a
    /// handler asks for a parameter its node does not declare.
    pub fn require(&self, name: &str) -> Result<&str, CtlError> {
        self.get(name).ok_or_else(|| {
            CtlError::usage(format!("missing argument <{name}>"), String::new())
        })
    }

    /// Number of bound values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// What a handler can reach during dispatch.
///
/// Cheap to clone; everything behind it is shared and read-only.
#[derive(Clone)]
pub struct Context {
    executor: Arc<Executor>,
    hosts: Arc<[Host]>,
    policy: ExecutionPolicy,
    tree: Arc<CommandTree>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("hosts", &self.hosts)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Create a dispatch context.
    #[must_use]
    pub fn new(
        executor: Arc<Executor>,
        hosts: impl Into<Arc<[Host]>>,
        policy: ExecutionPolicy,
        tree: Arc<CommandTree>,
    ) -> Self {
        Self {
            executor,
            hosts: hosts.into(),
            policy,
            tree,
        }
    }

    /// Candidate hosts in failover order.
    #[must_use]
    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// Default execution policy of this invocation.
    #[must_use]
    pub const fn policy(&self) -> &ExecutionPolicy {
        &self.policy
    }

    /// The command tree being dispatched.
    #[must_use]
    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    /// Execute a request against the configured hosts under the default policy.
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Outcome {
        self.executor
            .execute(descriptor, &self.hosts, &self.policy)
            .await
    }

    /// Execute a request under an explicit policy.
    pub async fn execute_with(
        &self,
        descriptor: &RequestDescriptor,
        policy: &ExecutionPolicy,
    ) -> Outcome {
        self.executor.execute(descriptor, &self.hosts, policy).await
    }
}

pub(crate) enum NodeKind {
    Leaf(Handler),
    Branch {
        children: BTreeMap<String, CommandNode>,
        fallback: Option<Handler>,
        // created as an intermediate by register(), may still be claimed
        implicit: bool,
    },
}

/// A unit of the command tree.
pub struct CommandNode {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) params: Vec<Param>,
    pub(crate) usage: Option<String>,
    pub(crate) epilog: Option<String>,
    pub(crate) kind: NodeKind,
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("CommandNode");
        s.field("name", &self.name).field("params", &self.params);
        if let NodeKind::Branch { children, fallback, .. } = &self.kind {
            s.field("children", &children.keys().collect::<Vec<_>>())
                .field("fallback", &fallback.is_some());
        }
        s.finish_non_exhaustive()
    }
}

impl CommandNode {
    /// A leaf command with a handler.
    #[must_use]
    pub fn leaf(name: impl Into<String>, description: impl Into<String>, handler: Handler) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            usage: None,
            epilog: None,
            kind: NodeKind::Leaf(handler),
        }
    }

    /// A branch grouping subcommands.
    #[must_use]
    pub fn branch(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            usage: None,
            epilog: None,
            kind: NodeKind::Branch {
                children: BTreeMap::new(),
                fallback: None,
                implicit: false,
            },
        }
    }

    pub(crate) fn implicit_branch(name: &str) -> Self {
        let mut node = Self::branch(name, "");
        if let NodeKind::Branch { implicit, .. } = &mut node.kind {
            *implicit = true;
        }
        node
    }

    /// Add a required positional parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            required: true,
        });
        self
    }

    /// Add an optional positional parameter.
    #[must_use]
    pub fn optional_param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            required: false,
        });
        self
    }

    /// Override the generated usage line.
    #[must_use]
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Text shown after the description in help output.
    #[must_use]
    pub fn epilog(mut self, epilog: impl Into<String>) -> Self {
        self.epilog = Some(epilog.into());
        self
    }

    /// Handler for tokens that match no child. Ignored on leaves.
    ///
    /// The handler receives the unmatched token as [`FALLBACK_ARG`].
    #[must_use]
    pub fn fallback(mut self, handler: Handler) -> Self {
        if let NodeKind::Branch { fallback, .. } = &mut self.kind {
            *fallback = Some(handler);
        }
        self
    }

    /// Command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Positional parameter schema.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Whether this node carries a handler.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Whether this branch has a fallback handler.
    #[must_use]
    pub const fn has_fallback(&self) -> bool {
        matches!(self.kind, NodeKind::Branch { fallback: Some(_), .. })
    }

    /// Child by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        match &self.kind {
            NodeKind::Branch { children, .. } => children.get(name),
            NodeKind::Leaf(_) => None,
        }
    }

    /// Children in name order. Empty for leaves.
    pub fn children(&self) -> impl Iterator<Item = &Self> {
        let children = match &self.kind {
            NodeKind::Branch { children, .. } => Some(children.values()),
            NodeKind::Leaf(_) => None,
        };
        children.into_iter().flatten()
    }

    /// Parameter list as shown in usage lines, e.g. `<server> <state>`.
    #[must_use]
    pub fn param_synopsis(&self) -> String {
        self.params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Required parameters must come before optional ones.
    pub(crate) fn schema_error(&self) -> Option<String> {
        if let Some(pos) = self.params.windows(2).position(|w| !w[0].required && w[1].required) {
            return Some(format!(
                "required parameter <{}> follows an optional one",
                self.params[pos + 1].name
            ));
        }
        let mut names: Vec<&str> = self.params.iter().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        if names.windows(2).any(|w| w[0] == w[1]) {
            return Some("parameter names must be unique".into());
        }
        if !self.is_leaf() && !self.params.is_empty() {
            return Some("branches cannot declare parameters".into());
        }
        None
    }
}
