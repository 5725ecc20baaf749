//! skiff_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Every compile-time problem in skiff is a `Diagnostic`: a source span plus
//! a message realized from a template in the `messages` catalog. Diagnostics
//! are accumulated, never thrown; each pipeline phase completes and hands its
//! collection to the caller.

use serde::Serialize;
use skiff_core::text::TextSpan;
use std::fmt;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic error code (e.g., 1002, 2304).
    pub code: u32,
    /// The category of this diagnostic.
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
///
/// The serialized form is the wire shape consumed by external tooling:
/// `{"span": {"start": …, "length": …}, "message": …}`.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// The file this diagnostic points into, if the source had a name.
    #[serde(skip)]
    pub file: Option<String>,
    /// The source text span where this diagnostic occurred.
    pub span: TextSpan,
    /// The resolved message text.
    #[serde(rename = "message")]
    pub message_text: String,
    /// The diagnostic error code.
    #[serde(skip)]
    pub code: u32,
    /// The category.
    #[serde(skip)]
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// Create a new diagnostic at a span.
    pub fn new(span: TextSpan, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// Attach the file name of the source this diagnostic points into.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Whether this is an error diagnostic.
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}({}): ", file, self.span.start)?;
        }
        write!(f, "{} SK{}: {}", self.category, self.code, self.message_text)
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A collection of diagnostics accumulated during compilation.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Realize a message at a span and add it.
    pub fn report(&mut self, span: TextSpan, message: &DiagnosticMessage, args: &[&str]) {
        self.add(Diagnostic::new(span, message, args));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.category == DiagnosticCategory::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Error)
            .count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Move the accumulated diagnostics out, leaving the collection empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn extend_from_slice(&mut self, diagnostics: &[Diagnostic]) {
        self.diagnostics.extend_from_slice(diagnostics);
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Sort diagnostics by file and span.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then_with(|| a.span.cmp(&b.span))
        });
    }
}

impl IntoIterator for DiagnosticCollection {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Lexer errors (1000-1099)
    // ========================================================================
    pub const BAD_CHARACTER_0: DiagnosticMessage = diag!(1001, Error, "Bad character in input: '{0}'.");
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = diag!(1002, Error, "Unterminated string literal.");
    pub const UNTERMINATED_BLOCK_COMMENT: DiagnosticMessage = diag!(1003, Error, "Unterminated block comment.");
    pub const INVALID_INT_LITERAL_0: DiagnosticMessage = diag!(1004, Error, "The number '{0}' is not a valid 'int'.");

    // ========================================================================
    // Parser errors (1100-1199)
    // ========================================================================
    pub const UNEXPECTED_TOKEN_0_EXPECTED_1: DiagnosticMessage = diag!(1101, Error, "Unexpected token <{0}>, expected <{1}>.");

    // ========================================================================
    // Binder errors (2000-2999)
    // ========================================================================
    pub const UNDEFINED_VARIABLE_0: DiagnosticMessage = diag!(2001, Error, "Variable '{0}' doesn't exist.");
    pub const UNDEFINED_FUNCTION_0: DiagnosticMessage = diag!(2002, Error, "Function '{0}' doesn't exist.");
    pub const UNDEFINED_TYPE_0: DiagnosticMessage = diag!(2003, Error, "Type '{0}' doesn't exist.");
    pub const SYMBOL_ALREADY_DECLARED_0: DiagnosticMessage = diag!(2004, Error, "'{0}' is already declared.");
    pub const PARAMETER_ALREADY_DECLARED_0: DiagnosticMessage = diag!(2005, Error, "A parameter with the name '{0}' already exists.");
    pub const NOT_A_VARIABLE_0: DiagnosticMessage = diag!(2006, Error, "'{0}' is not a variable.");
    pub const NOT_A_FUNCTION_0: DiagnosticMessage = diag!(2007, Error, "'{0}' is not a function.");
    pub const CANNOT_CONVERT_0_TO_1: DiagnosticMessage = diag!(2008, Error, "Cannot convert type '{0}' to '{1}'.");
    pub const CANNOT_CONVERT_0_TO_1_IMPLICITLY: DiagnosticMessage = diag!(2009, Error, "Cannot convert type '{0}' to '{1}'. An explicit conversion exists (are you missing a cast?)");
    pub const VARIABLE_0_IS_READ_ONLY: DiagnosticMessage = diag!(2010, Error, "Variable '{0}' is read-only and cannot be assigned to.");
    pub const UNDEFINED_UNARY_OPERATOR_0_FOR_1: DiagnosticMessage = diag!(2011, Error, "Unary operator '{0}' is not defined for type '{1}'.");
    pub const UNDEFINED_BINARY_OPERATOR_0_FOR_1_AND_2: DiagnosticMessage = diag!(2012, Error, "Binary operator '{0}' is not defined for types '{1}' and '{2}'.");
    pub const WRONG_ARGUMENT_COUNT_0_EXPECTS_1_GOT_2: DiagnosticMessage = diag!(2013, Error, "Function '{0}' requires {1} argument(s) but was given {2}.");
    pub const EXPRESSION_MUST_HAVE_VALUE: DiagnosticMessage = diag!(2014, Error, "Expression must have a value.");
    pub const INVALID_BREAK_OR_CONTINUE_0: DiagnosticMessage = diag!(2015, Error, "The keyword '{0}' can only be used inside of loops.");
    pub const INVALID_RETURN_EXPRESSION_0: DiagnosticMessage = diag!(2016, Error, "Since the function '{0}' does not return a value the 'return' keyword cannot be followed by an expression.");
    pub const MISSING_RETURN_EXPRESSION_0: DiagnosticMessage = diag!(2017, Error, "An expression of type '{0}' is expected.");
    pub const UNDEFINED_PACKAGE_0: DiagnosticMessage = diag!(2018, Error, "Package '{0}' doesn't exist.");
    pub const PACKAGE_0_NOT_IMPORTED: DiagnosticMessage = diag!(2019, Error, "Package '{0}' has not been imported.");
    pub const PACKAGE_0_HAS_NO_FUNCTION_1: DiagnosticMessage = diag!(2020, Error, "Package '{0}' has no function named '{1}'.");
    pub const NO_OVERLOAD_OF_0_1_MATCHES_2: DiagnosticMessage = diag!(2021, Error, "No overload of '{0}.{1}' matches the argument types ({2}).");
    pub const MEMBER_ACCESS_NOT_SUPPORTED_0_1: DiagnosticMessage = diag!(2022, Error, "Member access is not supported; '{0}.{1}' can only be called.");
    pub const PACKAGE_NAME_ALREADY_DECLARED: DiagnosticMessage = diag!(2023, Error, "The package name has already been declared.");

    // ========================================================================
    // Flow analysis errors (3000-3099)
    // ========================================================================
    pub const ALL_PATHS_MUST_RETURN: DiagnosticMessage = diag!(3001, Error, "Not all code paths return a value.");
}
