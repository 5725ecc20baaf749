//! Lexed tokens.

use skiff_core::TextSpan;

use crate::kind::SyntaxKind;

/// The cooked value of a literal token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Int(i64),
    String(String),
}

/// A single token produced by the lexer.
///
/// Missing tokens are fabricated by the parser when the input does not match
/// the grammar; they carry an empty span at the current position so later
/// phases still have a location to report against.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxToken {
    pub kind: SyntaxKind,
    pub span: TextSpan,
    pub text: String,
    pub value: Option<TokenValue>,
    pub is_missing: bool,
}

impl SyntaxToken {
    pub fn new(kind: SyntaxKind, span: TextSpan, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
            value: None,
            is_missing: false,
        }
    }

    pub fn with_value(
        kind: SyntaxKind,
        span: TextSpan,
        text: impl Into<String>,
        value: TokenValue,
    ) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
            value: Some(value),
            is_missing: false,
        }
    }

    /// Fabricates a zero-width token of `kind` at `position`.
    pub fn missing(kind: SyntaxKind, position: skiff_core::TextPos) -> Self {
        Self {
            kind,
            span: TextSpan::empty(position),
            text: String::new(),
            value: None,
            is_missing: true,
        }
    }

    /// The integer value of an `IntToken`.
    pub fn int_value(&self) -> i64 {
        match &self.value {
            Some(TokenValue::Int(value)) => *value,
            _ => 0,
        }
    }

    /// The cooked (escape-processed) value of a `StringToken`.
    pub fn string_value(&self) -> &str {
        match &self.value {
            Some(TokenValue::String(value)) => value,
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_is_zero_width() {
        let token = SyntaxToken::missing(SyntaxKind::IdentifierToken, 7);
        assert!(token.is_missing);
        assert!(token.span.is_empty());
        assert_eq!(token.span.start, 7);
        assert_eq!(token.text, "");
    }

    #[test]
    fn test_literal_value_accessors() {
        let span = TextSpan::new(0, 2);
        let int = SyntaxToken::with_value(SyntaxKind::IntToken, span, "42", TokenValue::Int(42));
        assert_eq!(int.int_value(), 42);

        let string = SyntaxToken::with_value(
            SyntaxKind::StringToken,
            TextSpan::new(0, 4),
            "\"ab\"",
            TokenValue::String("ab".to_string()),
        );
        assert_eq!(string.string_value(), "ab");
    }
}
