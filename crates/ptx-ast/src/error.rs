use std::fmt;

use crate::node::NodeId;
use crate::schema::FieldCategory;

/// Position in schema text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub offset: usize, // Byte offset
    pub line: usize,   // Line number (1-based)
    pub column: usize, // Column number (1-based)
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self { offset, line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Lexer errors
#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("Unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: Position },
}

/// Errors raised while loading a schema declaration
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Expected {expected}, found {found} at {pos}")]
    Expected { expected: String, found: String, pos: Position },

    #[error("Missing {what} name at {pos}")]
    MissingName { what: &'static str, pos: Position },

    #[error("Unterminated field list for kind '{kind}' opened at {pos}")]
    UnterminatedBracket { kind: String, pos: Position },

    #[error("Invalid {what} name '{name}' at {pos}")]
    InvalidName { what: &'static str, name: String, pos: Position },

    #[error("Invalid marker '{marker}' on '{name}' at {pos}")]
    InvalidMarker { name: String, marker: String, pos: Position },

    #[error("Duplicate node kind '{kind}' at {pos} (first declared at {first})")]
    DuplicateKind { kind: String, pos: Position, first: Position },

    #[error("Duplicate field '{field}' in kind '{kind}' at {pos}")]
    DuplicateField { kind: String, field: String, pos: Position },

    #[error("Node kind ids exhausted (largest id is {limit})")]
    TooManyKinds { limit: u32 },

    #[error("Lexer error: {0}")]
    LexError(#[from] LexError),
}

/// Errors raised while looking up kinds, constructing or reading nodes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AstError {
    #[error("Unknown node kind '{kind}'")]
    UnknownKind { kind: String },

    #[error("Node kind '{kind}' has no field '{field}'")]
    UnknownField { kind: String, field: String },

    #[error("Node {id:?} does not belong to this tree")]
    UnknownNode { id: NodeId },

    #[error("Node {id:?} has been released")]
    ReleasedNode { id: NodeId },

    #[error("Node {id:?} is still owned by {parent:?} and cannot be released")]
    StillOwned { id: NodeId, parent: NodeId },

    #[error("Node ids exhausted (largest id is {limit})")]
    TooManyNodes { limit: u32 },

    #[error("'{kind}' takes {expected} values, got {found}")]
    ArityMismatch { kind: String, expected: usize, found: usize },

    #[error("Field '{field}' (#{index}) of '{kind}' is {expected}, got {found}")]
    FieldShapeMismatch {
        kind: String,
        field: String,
        index: usize,
        expected: FieldCategory,
        found: &'static str,
    },

    #[error("Node {child:?} passed to '{kind}.{field}' already has an owner")]
    OwnershipConflict { kind: String, field: String, child: NodeId },
}

pub type Result<T> = std::result::Result<T, AstError>;
