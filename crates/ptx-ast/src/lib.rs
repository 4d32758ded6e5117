pub mod error;
pub mod node;
pub mod printer;
pub mod ptx;
pub mod schema;
pub mod visit;

// Re-export commonly used items
pub use error::{AstError, LexError, Position, Result, SchemaError};
pub use node::{Ast, ChildPath, NodeId, NodeRef, Scalar, Value};
pub use printer::{print_node, Printer};
pub use ptx::PtxKind;
pub use schema::{FieldCategory, FieldDescriptor, KindDescriptor, Registry};
pub use visit::{walk, Visitor};
