//! Node kinds of the PTX front end.
//!
//! The framework itself knows nothing about these kinds; they are declared
//! in [`SCHEMA`] like any other schema and loaded with [`registry`].

use std::fmt;

use crate::error::SchemaError;
use crate::node::NodeRef;
use crate::schema::Registry;

pub const SCHEMA: &str = "\
# Top level module: .version / .target / .address_size header and statements
Ptx: [version, target, address_size, statements**]

# A label, optionally followed by the statement it marks
Label: [name, stmt*]

LinkingDirective: [directive]

Entry: [linking, kernel_name, param_list**, performance_tuning, kernel_body**]

# Parameter declarations may come in pairs, hence the *2 fields
EntryParam: [space, align, param_type, name, array_spec, name2, param_type2, align2, array_spec2]

IdentifierDecl: [space, align, variable_declarator**]
";

pub fn registry() -> Result<Registry, SchemaError> {
    Registry::load(SCHEMA)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PtxKind {
    Ptx,
    Label,
    LinkingDirective,
    Entry,
    EntryParam,
    IdentifierDecl,
}

impl PtxKind {
    pub const ALL: [PtxKind; 6] = [
        PtxKind::Ptx,
        PtxKind::Label,
        PtxKind::LinkingDirective,
        PtxKind::Entry,
        PtxKind::EntryParam,
        PtxKind::IdentifierDecl,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PtxKind::Ptx => "Ptx",
            PtxKind::Label => "Label",
            PtxKind::LinkingDirective => "LinkingDirective",
            PtxKind::Entry => "Entry",
            PtxKind::EntryParam => "EntryParam",
            PtxKind::IdentifierDecl => "IdentifierDecl",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn of(node: NodeRef<'_>) -> Option<Self> {
        Self::from_name(node.kind_name())
    }
}

impl fmt::Display for PtxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
