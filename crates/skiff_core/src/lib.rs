//! skiff_core: Core utilities for the skiff compiler.
//!
//! Provides text spans and the source-text/line-table type used
//! throughout the compiler pipeline.

pub mod source;
pub mod text;

// Re-export commonly used types
pub use source::{LineAndColumn, SourceText};
pub use text::{TextPos, TextSpan};
