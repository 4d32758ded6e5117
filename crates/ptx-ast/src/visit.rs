//! Visitor dispatch over schema-driven trees.
//!
//! A [`Visitor`] is a table from kind name to handler plus one default
//! handler. Dispatching a node runs the handler registered for its kind, or
//! the default, which out of the box descends into every child in field
//! order. A pass therefore only names the kinds it cares about:
//!
//! ```rust,ignore
//! let labels = Visitor::new().on("Label", |v, names: &mut Vec<String>, node| {
//!     names.push(node.attr("name").unwrap().as_str().unwrap_or("").to_string());
//!     v.descend(node, names);
//! });
//! let mut names = Vec::new();
//! labels.dispatch(ast.get(root)?, &mut names);
//! ```
//!
//! Handlers receive the visitor itself so they can recurse selectively, or
//! stop by not recursing at all.
//!
//! Generic descent keeps its own worklist, so kinds without handlers can be
//! nested arbitrarily deep. Handlers that call back into the visitor use the
//! call stack as usual.

use std::collections::HashMap;
use std::fmt;

use crate::error::{AstError, Result};
use crate::node::NodeRef;
use crate::schema::Registry;

pub type Handler<S> = Box<dyn Fn(&Visitor<S>, &mut S, NodeRef<'_>) + Send + Sync>;

pub struct Visitor<S> {
    handlers: HashMap<String, Handler<S>>,
    default: Option<Handler<S>>,
}

impl<S> Visitor<S> {
    /// A visitor with no handlers and generic descent as the default
    pub fn new() -> Self {
        Self { handlers: HashMap::new(), default: None }
    }

    /// Registers `handler` for nodes of `kind`, replacing any earlier one.
    pub fn on<F>(mut self, kind: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Visitor<S>, &mut S, NodeRef<'_>) + Send + Sync + 'static,
    {
        self.handlers.insert(kind.into(), Box::new(handler));
        self
    }

    /// Replaces generic descent for kinds without a handler.
    pub fn with_default<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Visitor<S>, &mut S, NodeRef<'_>) + Send + Sync + 'static,
    {
        self.default = Some(Box::new(handler));
        self
    }

    pub fn has_handler(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    pub fn dispatch(&self, node: NodeRef<'_>, state: &mut S) {
        self.run(vec![node], state);
    }

    /// Generic descent: dispatches every child of `node` in field order.
    pub fn descend(&self, node: NodeRef<'_>, state: &mut S) {
        self.run(pending_children(node), state);
    }

    /// Dispatches the nodes on `pending`, last one first.
    fn run<'a>(&self, mut pending: Vec<NodeRef<'a>>, state: &mut S) {
        while let Some(node) = pending.pop() {
            if let Some(handler) = self.handlers.get(node.kind_name()) {
                handler(self, state, node);
            } else if let Some(default) = &self.default {
                default(self, state, node);
            } else {
                pending.extend(pending_children(node));
            }
        }
    }

    /// Checks that every handler names a kind declared in `registry`.
    pub fn validate(&self, registry: &Registry) -> Result<()> {
        let mut kinds: Vec<&String> = self.handlers.keys().collect();
        kinds.sort();
        match kinds.into_iter().find(|kind| !registry.contains(kind)) {
            Some(kind) => Err(AstError::UnknownKind { kind: kind.clone() }),
            None => Ok(()),
        }
    }
}

impl<S> Default for Visitor<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for Visitor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&String> = self.handlers.keys().collect();
        kinds.sort();
        f.debug_struct("Visitor")
            .field("handlers", &kinds)
            .field("custom_default", &self.default.is_some())
            .finish()
    }
}

/// Children of `node` in reverse field order, ready to be popped
fn pending_children(node: NodeRef<'_>) -> Vec<NodeRef<'_>> {
    node.children_of().into_iter().rev().map(|(_, child)| child).collect()
}

/// Pre-order walk calling `f` on `node` and every node below it.
pub fn walk<F>(node: NodeRef<'_>, f: &mut F)
where
    F: FnMut(NodeRef<'_>),
{
    for node in node.descendants() {
        f(node);
    }
}
