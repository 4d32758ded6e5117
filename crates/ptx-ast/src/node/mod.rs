//! Node instances and the tree that owns them.
//!
//! Nodes are built bottom-up with [`Ast::construct`]. Every node records its
//! single owner, so a child can be attached to exactly one parent and the
//! tree stays acyclic: a node can only reference ids that already exist.
//!
//! Nodes are never edited in place. To change one, [`Ast::release`] the root
//! node, which hands back its values and frees its children, then build a new
//! node from the edited values. [`Ast::discard`] drops a whole subtree.

pub mod children;

use std::fmt;
use std::sync::Arc;

use crate::error::{AstError, Result};
use crate::schema::{FieldCategory, FieldDescriptor, KindDescriptor, KindId, Registry};
pub use children::{ChildPath, Descendants};

/// Node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    fn from_index(index: usize) -> Result<Self> {
        u32::try_from(index).map(NodeId).map_err(|_| AstError::TooManyNodes { limit: u32::MAX })
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque attribute value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    Str(String),
    Int(i128),
    /// Attribute present in the schema but left empty
    None,
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            Scalar::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Scalar::None)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<i128> for Scalar {
    fn from(n: i128) -> Self {
        Scalar::Int(n)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n.into())
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::None, Into::into)
    }
}

/// One construction argument
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Node(NodeId),
    /// Explicitly empty single-child slot
    Absent,
    Nodes(Vec<NodeId>),
}

impl Value {
    /// Short description used in shape errors
    pub fn shape(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "a scalar",
            Value::Node(_) => "a node",
            Value::Absent => "an absent marker",
            Value::Nodes(_) => "a node sequence",
        }
    }

    fn fits(&self, category: FieldCategory) -> bool {
        matches!(
            (category, self),
            (FieldCategory::Attribute, Value::Scalar(_))
                | (FieldCategory::SingleChild, Value::Node(_) | Value::Absent)
                | (FieldCategory::ChildSequence, Value::Nodes(_))
        )
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Scalar(n.into())
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Value::Node(id)
    }
}

impl From<Option<NodeId>> for Value {
    fn from(id: Option<NodeId>) -> Self {
        id.map_or(Value::Absent, Value::Node)
    }
}

impl From<Vec<NodeId>> for Value {
    fn from(ids: Vec<NodeId>) -> Self {
        Value::Nodes(ids)
    }
}

/// Stored field contents, one per declared field
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot {
    Attr(Scalar),
    Child(Option<NodeId>),
    Children(Vec<NodeId>),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: KindId,
    slots: Vec<Slot>,
    parent: Option<NodeId>,
    released: bool,
}

/// Arena owning every node built against one registry.
#[derive(Debug, Clone)]
pub struct Ast {
    registry: Arc<Registry>,
    nodes: Vec<NodeData>,
    live: usize,
}

impl Ast {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry, nodes: Vec::new(), live: 0 }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Builds a node of `kind` from values given in declared field order.
    ///
    /// Children passed in are taken over by the new node. Nothing is recorded
    /// unless every value is valid.
    ///
    /// Ids are plain indices: an id taken from a different `Ast` is only
    /// rejected when it is out of range or released here. Mixing trees is not
    /// detected otherwise.
    pub fn construct(&mut self, kind: &str, values: Vec<Value>) -> Result<NodeId> {
        let desc = self.registry.lookup(kind)?;

        if values.len() != desc.arity() {
            return Err(AstError::ArityMismatch {
                kind: desc.name.clone(),
                expected: desc.arity(),
                found: values.len(),
            });
        }

        let mut claimed = Vec::new();
        for (field, value) in desc.fields().iter().zip(&values) {
            if !value.fits(field.category) {
                return Err(AstError::FieldShapeMismatch {
                    kind: desc.name.clone(),
                    field: field.name.clone(),
                    index: field.index,
                    expected: field.category,
                    found: value.shape(),
                });
            }

            let ids: &[NodeId] = match value {
                Value::Node(id) => std::slice::from_ref(id),
                Value::Nodes(ids) => ids.as_slice(),
                Value::Scalar(_) | Value::Absent => &[],
            };
            for &child in ids {
                let data = self.data(child)?;
                if data.parent.is_some() || claimed.contains(&child) {
                    return Err(AstError::OwnershipConflict {
                        kind: desc.name.clone(),
                        field: field.name.clone(),
                        child,
                    });
                }
                claimed.push(child);
            }
        }

        let kind_id = desc.id;
        let id = NodeId::from_index(self.nodes.len())?;
        let slots = values
            .into_iter()
            .map(|value| match value {
                Value::Scalar(s) => Slot::Attr(s),
                Value::Node(child) => Slot::Child(Some(child)),
                Value::Absent => Slot::Child(None),
                Value::Nodes(ids) => Slot::Children(ids),
            })
            .collect();

        for child in claimed {
            self.nodes[child.0 as usize].parent = Some(id);
        }
        self.nodes.push(NodeData { kind: kind_id, slots, parent: None, released: false });
        self.live += 1;

        log::trace!("constructed {} {}", kind, id);

        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Result<NodeRef<'_>> {
        self.data(id)?;
        Ok(NodeRef { ast: self, id })
    }

    /// Releases the root node `id` and returns its values in declared order.
    ///
    /// Its children lose their owner and become roots again, so the returned
    /// values can be edited and passed straight back to [`Ast::construct`].
    pub fn release(&mut self, id: NodeId) -> Result<Vec<Value>> {
        let data = self.data(id)?;
        if let Some(parent) = data.parent {
            return Err(AstError::StillOwned { id, parent });
        }

        let slots = std::mem::take(&mut self.nodes[id.0 as usize].slots);
        self.nodes[id.0 as usize].released = true;
        self.live -= 1;

        let values: Vec<Value> = slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Attr(s) => Value::Scalar(s),
                Slot::Child(Some(child)) => Value::Node(child),
                Slot::Child(None) => Value::Absent,
                Slot::Children(ids) => Value::Nodes(ids),
            })
            .collect();
        for child in child_ids(&values) {
            self.nodes[child.0 as usize].parent = None;
        }

        log::trace!("released {}", id);

        Ok(values)
    }

    /// Releases the root node `id` together with everything below it.
    ///
    /// Returns the number of nodes released.
    pub fn discard(&mut self, id: NodeId) -> Result<usize> {
        let mut pending = vec![id];
        let mut count = 0;

        while let Some(id) = pending.pop() {
            let values = self.release(id)?;
            pending.extend(child_ids(&values));
            count += 1;
        }

        Ok(count)
    }

    /// Nodes without an owner, in construction order
    pub fn roots(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, data)| data.parent.is_none() && !data.released)
            .map(move |(i, _)| NodeRef { ast: self, id: NodeId(i as u32) })
    }

    /// Number of nodes that have not been released
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn data(&self, id: NodeId) -> Result<&NodeData> {
        match self.nodes.get(id.0 as usize) {
            Some(data) if data.released => Err(AstError::ReleasedNode { id }),
            Some(data) => Ok(data),
            None => Err(AstError::UnknownNode { id }),
        }
    }
}

fn child_ids(values: &[Value]) -> impl Iterator<Item = NodeId> + '_ {
    values.iter().flat_map(|value| {
        let ids: &[NodeId] = match value {
            Value::Node(id) => std::slice::from_ref(id),
            Value::Nodes(ids) => ids.as_slice(),
            Value::Scalar(_) | Value::Absent => &[],
        };
        ids.iter().copied()
    })
}

/// Borrowed view of one node; the accessor surface shared by every kind.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    ast: &'a Ast,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn ast(&self) -> &'a Ast {
        self.ast
    }

    pub fn kind(&self) -> &'a KindDescriptor {
        self.ast.registry.descriptor(self.data().kind)
    }

    pub fn kind_name(&self) -> &'a str {
        &self.kind().name
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.data().parent.map(|id| NodeRef { ast: self.ast, id })
    }

    pub fn attr(&self, name: &str) -> Result<&'a Scalar> {
        let field = self.field(name, FieldCategory::Attribute)?;
        match &self.data().slots[field.index] {
            Slot::Attr(value) => Ok(value),
            _ => Err(self.wrong_accessor(field, FieldCategory::Attribute)),
        }
    }

    /// The single child in `name`, `None` when absent
    pub fn child(&self, name: &str) -> Result<Option<NodeRef<'a>>> {
        let field = self.field(name, FieldCategory::SingleChild)?;
        match &self.data().slots[field.index] {
            Slot::Child(id) => Ok(id.map(|id| NodeRef { ast: self.ast, id })),
            _ => Err(self.wrong_accessor(field, FieldCategory::SingleChild)),
        }
    }

    pub fn children(&self, name: &str) -> Result<Vec<NodeRef<'a>>> {
        let field = self.field(name, FieldCategory::ChildSequence)?;
        match &self.data().slots[field.index] {
            Slot::Children(ids) => {
                Ok(ids.iter().map(|&id| NodeRef { ast: self.ast, id }).collect())
            }
            _ => Err(self.wrong_accessor(field, FieldCategory::ChildSequence)),
        }
    }

    pub(crate) fn slots(&self) -> &'a [Slot] {
        &self.data().slots
    }

    fn data(&self) -> &'a NodeData {
        &self.ast.nodes[self.id.0 as usize]
    }

    fn field(&self, name: &str, wanted: FieldCategory) -> Result<&'a FieldDescriptor> {
        let kind = self.kind();
        let field = kind.field(name).ok_or_else(|| AstError::UnknownField {
            kind: kind.name.clone(),
            field: name.to_string(),
        })?;
        if field.category != wanted {
            return Err(self.wrong_accessor(field, wanted));
        }
        Ok(field)
    }

    fn wrong_accessor(&self, field: &FieldDescriptor, wanted: FieldCategory) -> AstError {
        AstError::FieldShapeMismatch {
            kind: self.kind().name.clone(),
            field: field.name.clone(),
            index: field.index,
            expected: field.category,
            found: match wanted {
                FieldCategory::Attribute => "an attribute read",
                FieldCategory::SingleChild => "a single child read",
                FieldCategory::ChildSequence => "a child sequence read",
            },
        }
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind_name(), self.id)
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.ast, other.ast) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}
