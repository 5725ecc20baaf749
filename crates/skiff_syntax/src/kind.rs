//! Token kinds and syntax facts.
//!
//! `SyntaxKind` enumerates every token the lexer can produce. The associated
//! functions are the single source of truth for keyword recognition, fixed
//! token spellings, and operator precedence.

use std::fmt;

/// The kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    EndOfFileToken,
    BadToken,

    // Literals and names
    IntToken,
    StringToken,
    IdentifierToken,

    // Punctuation
    PlusToken,
    MinusToken,
    StarToken,
    SlashToken,
    PercentToken,
    BangToken,
    TildeToken,
    AmpersandToken,
    AmpersandAmpersandToken,
    PipeToken,
    PipePipeToken,
    CaretToken,
    EqualsToken,
    EqualsEqualsToken,
    BangEqualsToken,
    LessToken,
    LessOrEqualsToken,
    GreaterToken,
    GreaterOrEqualsToken,
    OpenParenToken,
    CloseParenToken,
    OpenBraceToken,
    CloseBraceToken,
    ColonToken,
    ColonEqualsToken,
    CommaToken,
    DotToken,
    DotDotDotToken,

    // Keywords
    PackageKeyword,
    ImportKeyword,
    FuncKeyword,
    ConstKeyword,
    IfKeyword,
    ElseKeyword,
    ForKeyword,
    BreakKeyword,
    ContinueKeyword,
    ReturnKeyword,
    TrueKeyword,
    FalseKeyword,
}

impl SyntaxKind {
    /// The keyword kind for an identifier's text, or `IdentifierToken`.
    pub fn keyword_kind(text: &str) -> SyntaxKind {
        match text {
            "package" => SyntaxKind::PackageKeyword,
            "import" => SyntaxKind::ImportKeyword,
            "func" => SyntaxKind::FuncKeyword,
            "const" => SyntaxKind::ConstKeyword,
            "if" => SyntaxKind::IfKeyword,
            "else" => SyntaxKind::ElseKeyword,
            "for" => SyntaxKind::ForKeyword,
            "break" => SyntaxKind::BreakKeyword,
            "continue" => SyntaxKind::ContinueKeyword,
            "return" => SyntaxKind::ReturnKeyword,
            "true" => SyntaxKind::TrueKeyword,
            "false" => SyntaxKind::FalseKeyword,
            _ => SyntaxKind::IdentifierToken,
        }
    }

    /// The fixed spelling of this kind, if it has one.
    pub fn text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::PlusToken => Some("+"),
            SyntaxKind::MinusToken => Some("-"),
            SyntaxKind::StarToken => Some("*"),
            SyntaxKind::SlashToken => Some("/"),
            SyntaxKind::PercentToken => Some("%"),
            SyntaxKind::BangToken => Some("!"),
            SyntaxKind::TildeToken => Some("~"),
            SyntaxKind::AmpersandToken => Some("&"),
            SyntaxKind::AmpersandAmpersandToken => Some("&&"),
            SyntaxKind::PipeToken => Some("|"),
            SyntaxKind::PipePipeToken => Some("||"),
            SyntaxKind::CaretToken => Some("^"),
            SyntaxKind::EqualsToken => Some("="),
            SyntaxKind::EqualsEqualsToken => Some("=="),
            SyntaxKind::BangEqualsToken => Some("!="),
            SyntaxKind::LessToken => Some("<"),
            SyntaxKind::LessOrEqualsToken => Some("<="),
            SyntaxKind::GreaterToken => Some(">"),
            SyntaxKind::GreaterOrEqualsToken => Some(">="),
            SyntaxKind::OpenParenToken => Some("("),
            SyntaxKind::CloseParenToken => Some(")"),
            SyntaxKind::OpenBraceToken => Some("{"),
            SyntaxKind::CloseBraceToken => Some("}"),
            SyntaxKind::ColonToken => Some(":"),
            SyntaxKind::ColonEqualsToken => Some(":="),
            SyntaxKind::CommaToken => Some(","),
            SyntaxKind::DotToken => Some("."),
            SyntaxKind::DotDotDotToken => Some("..."),
            SyntaxKind::PackageKeyword => Some("package"),
            SyntaxKind::ImportKeyword => Some("import"),
            SyntaxKind::FuncKeyword => Some("func"),
            SyntaxKind::ConstKeyword => Some("const"),
            SyntaxKind::IfKeyword => Some("if"),
            SyntaxKind::ElseKeyword => Some("else"),
            SyntaxKind::ForKeyword => Some("for"),
            SyntaxKind::BreakKeyword => Some("break"),
            SyntaxKind::ContinueKeyword => Some("continue"),
            SyntaxKind::ReturnKeyword => Some("return"),
            SyntaxKind::TrueKeyword => Some("true"),
            SyntaxKind::FalseKeyword => Some("false"),
            _ => None,
        }
    }

    /// Precedence when this kind is used as a prefix operator; 0 if it is not one.
    pub fn unary_operator_precedence(self) -> u8 {
        match self {
            SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::BangToken
            | SyntaxKind::TildeToken => 6,
            _ => 0,
        }
    }

    /// Precedence when this kind is used as an infix operator; 0 if it is not one.
    pub fn binary_operator_precedence(self) -> u8 {
        match self {
            SyntaxKind::StarToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => 5,
            SyntaxKind::PlusToken | SyntaxKind::MinusToken => 4,
            SyntaxKind::EqualsEqualsToken
            | SyntaxKind::BangEqualsToken
            | SyntaxKind::LessToken
            | SyntaxKind::LessOrEqualsToken
            | SyntaxKind::GreaterToken
            | SyntaxKind::GreaterOrEqualsToken => 3,
            SyntaxKind::AmpersandToken | SyntaxKind::AmpersandAmpersandToken => 2,
            SyntaxKind::PipeToken | SyntaxKind::PipePipeToken | SyntaxKind::CaretToken => 1,
            _ => 0,
        }
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::PackageKeyword
                | SyntaxKind::ImportKeyword
                | SyntaxKind::FuncKeyword
                | SyntaxKind::ConstKeyword
                | SyntaxKind::IfKeyword
                | SyntaxKind::ElseKeyword
                | SyntaxKind::ForKeyword
                | SyntaxKind::BreakKeyword
                | SyntaxKind::ContinueKeyword
                | SyntaxKind::ReturnKeyword
                | SyntaxKind::TrueKeyword
                | SyntaxKind::FalseKeyword
        )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        for kind in [
            SyntaxKind::PackageKeyword,
            SyntaxKind::ImportKeyword,
            SyntaxKind::FuncKeyword,
            SyntaxKind::ConstKeyword,
            SyntaxKind::IfKeyword,
            SyntaxKind::ElseKeyword,
            SyntaxKind::ForKeyword,
            SyntaxKind::BreakKeyword,
            SyntaxKind::ContinueKeyword,
            SyntaxKind::ReturnKeyword,
            SyntaxKind::TrueKeyword,
            SyntaxKind::FalseKeyword,
        ] {
            let text = kind.text().expect("keywords have fixed text");
            assert_eq!(SyntaxKind::keyword_kind(text), kind);
            assert!(kind.is_keyword());
        }
        assert_eq!(
            SyntaxKind::keyword_kind("funcs"),
            SyntaxKind::IdentifierToken
        );
    }

    #[test]
    fn test_product_binds_tighter_than_sum() {
        assert!(
            SyntaxKind::StarToken.binary_operator_precedence()
                > SyntaxKind::PlusToken.binary_operator_precedence()
        );
        assert!(
            SyntaxKind::PlusToken.binary_operator_precedence()
                > SyntaxKind::EqualsEqualsToken.binary_operator_precedence()
        );
        assert_eq!(SyntaxKind::CommaToken.binary_operator_precedence(), 0);
    }

    #[test]
    fn test_unary_binds_tighter_than_any_binary() {
        assert!(
            SyntaxKind::MinusToken.unary_operator_precedence()
                > SyntaxKind::StarToken.binary_operator_precedence()
        );
    }
}
