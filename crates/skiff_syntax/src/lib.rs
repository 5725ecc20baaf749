//! skiff_syntax: Lexer, parser and syntax tree for the skiff language.
//!
//! A `SyntaxTree` is one parsed compilation unit: its source text, its
//! ordered top-level members, and every lexer/parser diagnostic. Parsing
//! never fails; malformed input yields a tree with diagnostics.

pub mod kind;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod token;

// Re-export key types
pub use kind::SyntaxKind;
pub use node::*;
pub use token::{SyntaxToken, TokenValue};

use std::sync::Arc;

use skiff_core::SourceText;
use skiff_diagnostics::Diagnostic;

use crate::parser::Parser;

/// One parsed compilation unit.
#[derive(Debug)]
pub struct SyntaxTree {
    source: Arc<SourceText>,
    members: Vec<MemberSyntax>,
    eof_token: SyntaxToken,
    diagnostics: Vec<Diagnostic>,
}

impl SyntaxTree {
    /// Parse unnamed source text (REPL input, tests).
    pub fn parse(text: impl Into<String>) -> SyntaxTree {
        Self::parse_source(SourceText::new(text))
    }

    /// Parse source text read from a named file. Diagnostics carry the name.
    pub fn parse_with_file(text: impl Into<String>, file_name: impl Into<String>) -> SyntaxTree {
        Self::parse_source(SourceText::with_file(text, file_name))
    }

    fn parse_source(source: SourceText) -> SyntaxTree {
        let source = Arc::new(source);
        let parser = Parser::new(Arc::clone(&source));
        let (members, eof_token, collection) = parser.parse_compilation_unit();
        let diagnostics = match source.file_name() {
            Some(file) => collection
                .into_iter()
                .map(|d| d.with_file(file))
                .collect(),
            None => collection.into_diagnostics(),
        };
        SyntaxTree {
            source,
            members,
            eof_token,
            diagnostics,
        }
    }

    #[inline]
    pub fn source(&self) -> &Arc<SourceText> {
        &self.source
    }

    /// Top-level members in declaration order.
    #[inline]
    pub fn members(&self) -> &[MemberSyntax] {
        &self.members
    }

    #[inline]
    pub fn eof_token(&self) -> &SyntaxToken {
        &self.eof_token
    }

    /// Lexer and parser diagnostics for this unit.
    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
