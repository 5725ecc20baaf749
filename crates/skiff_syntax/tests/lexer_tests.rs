//! Lexer integration tests.
//!
//! Verifies token kinds, spans, literal values and lexer diagnostics.

use skiff_syntax::lexer::Lexer;
use skiff_syntax::{SyntaxKind, SyntaxToken, TokenValue};

/// Helper: lex source, assert no diagnostics, and return the tokens without
/// the trailing EOF.
fn lex(source: &str) -> Vec<SyntaxToken> {
    let (tokens, diagnostics) = Lexer::lex(source);
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics for {:?}: {:?}",
        source,
        diagnostics.diagnostics()
    );
    let mut tokens = tokens;
    assert_eq!(tokens.pop().map(|t| t.kind), Some(SyntaxKind::EndOfFileToken));
    tokens
}

/// Helper: lex source and return the token kinds without the trailing EOF.
fn lex_kinds(source: &str) -> Vec<SyntaxKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

// ============================================================================
// Tokens
// ============================================================================

#[test]
fn test_single_char_operators() {
    assert_eq!(
        lex_kinds("+ - * / % ! ~ ^ < > = ( ) { } : , ."),
        vec![
            SyntaxKind::PlusToken,
            SyntaxKind::MinusToken,
            SyntaxKind::StarToken,
            SyntaxKind::SlashToken,
            SyntaxKind::PercentToken,
            SyntaxKind::BangToken,
            SyntaxKind::TildeToken,
            SyntaxKind::CaretToken,
            SyntaxKind::LessToken,
            SyntaxKind::GreaterToken,
            SyntaxKind::EqualsToken,
            SyntaxKind::OpenParenToken,
            SyntaxKind::CloseParenToken,
            SyntaxKind::OpenBraceToken,
            SyntaxKind::CloseBraceToken,
            SyntaxKind::ColonToken,
            SyntaxKind::CommaToken,
            SyntaxKind::DotToken,
        ]
    );
}

#[test]
fn test_compound_operators() {
    assert_eq!(
        lex_kinds("&& || == != <= >= := ... & |"),
        vec![
            SyntaxKind::AmpersandAmpersandToken,
            SyntaxKind::PipePipeToken,
            SyntaxKind::EqualsEqualsToken,
            SyntaxKind::BangEqualsToken,
            SyntaxKind::LessOrEqualsToken,
            SyntaxKind::GreaterOrEqualsToken,
            SyntaxKind::ColonEqualsToken,
            SyntaxKind::DotDotDotToken,
            SyntaxKind::AmpersandToken,
            SyntaxKind::PipeToken,
        ]
    );
}

#[test]
fn test_compound_operators_lex_greedily() {
    // Without whitespace, `:=` must not split into `:` and `=`.
    assert_eq!(
        lex_kinds("x:=1"),
        vec![
            SyntaxKind::IdentifierToken,
            SyntaxKind::ColonEqualsToken,
            SyntaxKind::IntToken,
        ]
    );
}

#[test]
fn test_keywords_and_identifiers() {
    assert_eq!(
        lex_kinds("func main if else for x true false"),
        vec![
            SyntaxKind::FuncKeyword,
            SyntaxKind::IdentifierToken,
            SyntaxKind::IfKeyword,
            SyntaxKind::ElseKeyword,
            SyntaxKind::ForKeyword,
            SyntaxKind::IdentifierToken,
            SyntaxKind::TrueKeyword,
            SyntaxKind::FalseKeyword,
        ]
    );
}

#[test]
fn test_range_in_number_context() {
    assert_eq!(
        lex_kinds("1...3"),
        vec![
            SyntaxKind::IntToken,
            SyntaxKind::DotDotDotToken,
            SyntaxKind::IntToken,
        ]
    );
}

#[test]
fn test_empty_input_is_just_eof() {
    let (tokens, diagnostics) = Lexer::lex("");
    assert!(diagnostics.is_empty());
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, SyntaxKind::EndOfFileToken);
    assert!(tokens[0].span.is_empty());
}

// ============================================================================
// Spans
// ============================================================================

#[test]
fn test_token_spans_are_byte_offsets() {
    let tokens = lex("x := 42");
    assert_eq!(tokens[0].span.start, 0);
    assert_eq!(tokens[0].span.length, 1);
    assert_eq!(tokens[1].span.start, 2);
    assert_eq!(tokens[1].span.length, 2);
    assert_eq!(tokens[2].span.start, 5);
    assert_eq!(tokens[2].span.length, 2);
}

#[test]
fn test_unicode_identifier_span() {
    // `ï` is two bytes; the span length counts bytes, not characters.
    let tokens = lex("naïve := 1");
    assert_eq!(tokens[0].kind, SyntaxKind::IdentifierToken);
    assert_eq!(tokens[0].text, "naïve");
    assert_eq!(tokens[0].span.length, 6);
    assert_eq!(tokens[1].kind, SyntaxKind::ColonEqualsToken);
    assert_eq!(tokens[1].span.start, 7);
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_int_literal_value() {
    let tokens = lex("1234");
    assert_eq!(tokens[0].kind, SyntaxKind::IntToken);
    assert_eq!(tokens[0].int_value(), 1234);
}

#[test]
fn test_int_literal_overflow() {
    let (tokens, diagnostics) = Lexer::lex("99999999999999999999");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.diagnostics()[0]
        .message_text
        .contains("not a valid 'int'"));
    // Still a usable token with a placeholder value.
    assert_eq!(tokens[0].kind, SyntaxKind::IntToken);
    assert_eq!(tokens[0].int_value(), 0);
}

#[test]
fn test_string_literal() {
    let tokens = lex(r#""hello""#);
    assert_eq!(tokens[0].kind, SyntaxKind::StringToken);
    assert_eq!(tokens[0].string_value(), "hello");
    assert_eq!(tokens[0].text, r#""hello""#);
}

#[test]
fn test_string_escapes() {
    let tokens = lex(r#""a\"b\\c\nd\te\rf\0g""#);
    assert_eq!(tokens[0].string_value(), "a\"b\\c\nd\te\rf\0g");
}

#[test]
fn test_unterminated_string_at_eof() {
    let (tokens, diagnostics) = Lexer::lex(r#""abc"#);
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.diagnostics()[0]
        .message_text
        .contains("Unterminated string"));
    assert_eq!(tokens[0].kind, SyntaxKind::StringToken);
    assert_eq!(tokens[0].string_value(), "abc");
}

#[test]
fn test_unterminated_string_at_line_break() {
    let (tokens, diagnostics) = Lexer::lex("\"abc\nx");
    assert_eq!(diagnostics.len(), 1);
    // Lexing continues on the next line.
    assert_eq!(tokens[1].kind, SyntaxKind::IdentifierToken);
}

#[test]
fn test_string_value_is_cooked() {
    let tokens = lex(r#""\n""#);
    match &tokens[0].value {
        Some(TokenValue::String(value)) => assert_eq!(value, "\n"),
        other => panic!("expected string value, got {:?}", other),
    }
}

// ============================================================================
// Trivia
// ============================================================================

#[test]
fn test_line_comment_skipped() {
    assert_eq!(
        lex_kinds("1 // comment with := tokens\n2"),
        vec![SyntaxKind::IntToken, SyntaxKind::IntToken]
    );
}

#[test]
fn test_block_comment_skipped() {
    assert_eq!(
        lex_kinds("1 /* multi\nline */ 2"),
        vec![SyntaxKind::IntToken, SyntaxKind::IntToken]
    );
}

#[test]
fn test_unterminated_block_comment() {
    let (tokens, diagnostics) = Lexer::lex("1 /* never closed");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.diagnostics()[0]
        .message_text
        .contains("Unterminated block comment"));
    assert_eq!(tokens[0].kind, SyntaxKind::IntToken);
    assert_eq!(tokens[1].kind, SyntaxKind::EndOfFileToken);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_bad_character() {
    let (tokens, diagnostics) = Lexer::lex("1 + $");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.diagnostics()[0].message_text.contains("'$'"));
    assert_eq!(tokens[2].kind, SyntaxKind::BadToken);
}
