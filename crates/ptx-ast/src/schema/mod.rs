//! Node kind declarations and the registry built from them.
//!
//! A schema is written one kind per line:
//!
//! ```text
//! # comment
//! Label: [name, stmt*]
//! Entry: [linking, kernel_name, param_list**, performance_tuning, kernel_body**]
//! ```
//!
//! A bare field name is an attribute, `name*` is a single (optional) child and
//! `name**` is an ordered sequence of children.

pub mod lexer;
pub mod parser;

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::{AstError, Position, Result, SchemaError};
pub use parser::{FieldDecl, KindDecl, Parser};

/// What a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldCategory {
    Attribute,
    SingleChild,
    ChildSequence,
}

impl FieldCategory {
    pub fn is_child(self) -> bool {
        !matches!(self, FieldCategory::Attribute)
    }

    /// The marker written after a field name in schema text
    pub fn marker(self) -> &'static str {
        match self {
            FieldCategory::Attribute => "",
            FieldCategory::SingleChild => "*",
            FieldCategory::ChildSequence => "**",
        }
    }
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldCategory::Attribute => "an attribute",
            FieldCategory::SingleChild => "a single child",
            FieldCategory::ChildSequence => "a child sequence",
        };
        f.write_str(name)
    }
}

/// Index of a kind inside its registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct KindId(pub u32);

impl KindId {
    fn from_index(index: usize) -> std::result::Result<Self, SchemaError> {
        u32::try_from(index).map(KindId).map_err(|_| SchemaError::TooManyKinds { limit: u32::MAX })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub index: usize,
    pub category: FieldCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindDescriptor {
    pub id: KindId,
    pub name: String,
    fields: Vec<FieldDescriptor>,
}

impl KindDescriptor {
    /// Fields in declared order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Number of values `construct` expects
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    pub fn attr_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter(|f| !f.category.is_child()).map(|f| f.name.as_str())
    }

    pub fn child_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.category.is_child())
    }
}

impl fmt::Display for KindDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [", self.name)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}{}", field.name, field.category.marker())?;
        }
        f.write_str("]")
    }
}

/// Immutable table of node kinds.
///
/// Built once by [`Registry::load`] and shared read-only afterwards
/// (usually behind an `Arc`). Independent registries can coexist.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Registry {
    kinds: Vec<KindDescriptor>,
    #[serde(skip)]
    by_name: HashMap<String, KindId>,
}

impl Registry {
    /// Parses and validates schema text.
    pub fn load(text: &str) -> std::result::Result<Self, SchemaError> {
        let decls = Parser::parse_str(text)?;
        Self::from_declarations(decls)
    }

    /// Validates already parsed declarations.
    pub fn from_declarations(decls: Vec<KindDecl>) -> std::result::Result<Self, SchemaError> {
        let mut kinds = Vec::with_capacity(decls.len());
        let mut by_name = HashMap::with_capacity(decls.len());
        let mut first_seen: HashMap<String, Position> = HashMap::new();

        for decl in decls {
            check_name("kind", &decl.name, decl.pos)?;
            if let Some(first) = first_seen.get(&decl.name) {
                return Err(SchemaError::DuplicateKind {
                    kind: decl.name,
                    pos: decl.pos,
                    first: *first,
                });
            }

            let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(decl.fields.len());
            for (index, field) in decl.fields.into_iter().enumerate() {
                check_name("field", &field.name, field.pos)?;
                if fields.iter().any(|f| f.name == field.name) {
                    return Err(SchemaError::DuplicateField {
                        kind: decl.name,
                        field: field.name,
                        pos: field.pos,
                    });
                }
                fields.push(FieldDescriptor { name: field.name, index, category: field.category });
            }

            let id = KindId::from_index(kinds.len())?;
            first_seen.insert(decl.name.clone(), decl.pos);
            by_name.insert(decl.name.clone(), id);
            kinds.push(KindDescriptor { id, name: decl.name, fields });
        }

        log::debug!("loaded schema with {} node kinds", kinds.len());

        Ok(Self { kinds, by_name })
    }

    pub fn lookup(&self, kind: &str) -> Result<&KindDescriptor> {
        self.by_name
            .get(kind)
            .map(|id| &self.kinds[id.0 as usize])
            .ok_or_else(|| AstError::UnknownKind { kind: kind.to_string() })
    }

    pub fn get(&self, id: KindId) -> Option<&KindDescriptor> {
        self.kinds.get(id.0 as usize)
    }

    /// Nodes are only built from kinds of their own registry, so ids handed
    /// out by `lookup` always index in bounds.
    pub(crate) fn descriptor(&self, id: KindId) -> &KindDescriptor {
        &self.kinds[id.0 as usize]
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.by_name.contains_key(kind)
    }

    /// All kinds in declaration order
    pub fn kinds(&self) -> impl Iterator<Item = &KindDescriptor> {
        self.kinds.iter()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Declarations built by hand must obey the same identifier rules as text.
fn check_name(what: &'static str, name: &str, pos: Position) -> std::result::Result<(), SchemaError> {
    if name.is_empty() {
        return Err(SchemaError::MissingName { what, pos });
    }
    if !lexer::is_identifier(name) {
        return Err(SchemaError::InvalidName { what, name: name.to_string(), pos });
    }
    Ok(())
}
