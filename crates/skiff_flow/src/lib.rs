//! skiff_flow: Control flow graphs over lowered bodies.
//!
//! Partitions a flat label/jump statement list into basic blocks, wires
//! them into a directed graph between synthetic start and end blocks,
//! prunes unreachable blocks, and answers the reachability questions
//! the compiler asks, chiefly whether every path through a function
//! body ends in a return.

pub mod graph;

// Re-export key types
pub use graph::{BasicBlock, Branch, ControlFlowGraph};
