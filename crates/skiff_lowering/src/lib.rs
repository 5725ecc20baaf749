//! skiff_lowering: Rewrites structured control flow into labels and jumps.
//!
//! The lowerer turns `if`, `for` and range-`for` statements into
//! conditional gotos and flattens nested blocks, producing the flat
//! statement lists the control flow graph and the evaluator consume.

pub mod lowerer;

// Re-export key types
pub use lowerer::Lowerer;
