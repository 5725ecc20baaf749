//! skiff_binder: Name resolution, type checking and the bound tree.
//!
//! Turns syntax trees into a typed bound tree: scopes and symbols,
//! table-driven operator resolution, conversion classification, and the
//! rewriter infrastructure that lowering builds on. Submissions chain
//! through `BoundGlobalScope` so a REPL session accumulates symbols.

pub mod binder;
pub mod conversion;
pub mod node;
pub mod operators;
pub mod printer;
pub mod program;
pub mod rewriter;
pub mod scope;

// Re-export key types
pub use binder::{Binder, DEFAULT_PACKAGE_NAME};
pub use conversion::Conversion;
pub use node::{
    BoundBlockStatement, BoundExpression, BoundLabel, BoundStatement,
};
pub use operators::{
    BoundBinaryOperator, BoundBinaryOperatorKind, BoundUnaryOperator, BoundUnaryOperatorKind,
};
pub use program::{BoundGlobalScope, BoundProgram};
pub use rewriter::BoundTreeRewriter;
pub use scope::{BoundScope, Symbol};
