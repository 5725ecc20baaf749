//! Runtime faults.

use std::sync::Arc;

use thiserror::Error;

use skiff_binder::node::{BoundExpression, BoundLabel, BoundStatement};
use skiff_symbols::{TypeSymbol, Value};

/// A fault raised during evaluation. Faults carry the offending node
/// or value so the host can report what failed, not just that
/// something did.
#[derive(Debug, Error)]
pub enum EvaluatorFault {
    /// A structured statement reached the evaluator; the input was not
    /// lowered.
    #[error("unexpected statement: {}", .statement.kind_name())]
    UnexpectedStatement { statement: Arc<BoundStatement> },

    /// An error expression survived binding; the program should have
    /// been rejected by its diagnostics.
    #[error("unexpected expression: {}", .expression.kind_name())]
    UnexpectedExpression { expression: Arc<BoundExpression> },

    /// A value did not have the type its expression was bound with.
    #[error("a value of type '{expected}' was expected")]
    TypeMismatch { expected: TypeSymbol },

    #[error("cannot convert '{value}' to type '{target}'")]
    InvalidCast { value: Value, target: TypeSymbol },

    #[error("division by zero")]
    DivisionByZero,

    #[error("variable '{name}' has no value")]
    UndefinedVariable { name: String },

    #[error("function '{name}' has no body")]
    MissingBody { name: String },

    #[error("label '{label}' is not defined")]
    MissingLabel { label: BoundLabel },
}
