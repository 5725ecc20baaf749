//! skiff_eval: A tree-walking evaluator for lowered programs.
//!
//! Runs the flat label/jump form the lowerer produces: a program
//! counter walks each block, labels map to indices, and function calls
//! push local frames. Anything that goes wrong at runtime surfaces as
//! an `EvaluatorFault`; host failures never escape as panics.

pub mod evaluator;
pub mod fault;

// Re-export key types
pub use evaluator::{Evaluator, Variables};
pub use fault::EvaluatorFault;
