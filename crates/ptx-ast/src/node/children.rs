use std::fmt;

use super::{Ast, NodeId, NodeRef, Slot};
use crate::error::Result;

/// Where a child sits inside its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildPath<'a> {
    pub field: &'a str,
    /// Element index for sequence fields
    pub index: Option<usize>,
}

impl fmt::Display for ChildPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{}]", self.field, i),
            None => f.write_str(self.field),
        }
    }
}

impl<'a> NodeRef<'a> {
    /// Child nodes in declared field order.
    ///
    /// Sequences are flattened element by element; absent single children and
    /// attributes contribute nothing.
    pub fn children_of(&self) -> Vec<(ChildPath<'a>, NodeRef<'a>)> {
        let ast = self.ast();
        let mut out = Vec::new();

        for (field, slot) in self.kind().fields().iter().zip(self.slots()) {
            match slot {
                Slot::Attr(_) | Slot::Child(None) => {}
                Slot::Child(Some(id)) => {
                    out.push((ChildPath { field: &field.name, index: None }, NodeRef { ast, id: *id }));
                }
                Slot::Children(ids) => {
                    out.extend(ids.iter().enumerate().map(|(i, &id)| {
                        (ChildPath { field: &field.name, index: Some(i) }, NodeRef { ast, id })
                    }));
                }
            }
        }

        out
    }

    /// Pre-order iterator over this node and everything below it
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants { stack: vec![*self] }
    }
}

impl Ast {
    pub fn children_of(&self, id: NodeId) -> Result<Vec<(ChildPath<'_>, NodeRef<'_>)>> {
        Ok(self.get(id)?.children_of())
    }
}

pub struct Descendants<'a> {
    stack: Vec<NodeRef<'a>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children_of().into_iter().rev().map(|(_, child)| child));
        Some(node)
    }
}
