//! The lexer.
//!
//! Converts source text into a stream of tokens the parser consumes. The
//! lexer never fails: malformed input produces a diagnostic and either a
//! `BadToken` or a best-effort token, and scanning continues.

use skiff_core::{TextPos, TextSpan};
use skiff_diagnostics::{messages, DiagnosticCollection};
use unicode_xid::UnicodeXID;

use crate::kind::SyntaxKind;
use crate::token::{SyntaxToken, TokenValue};

/// The lexer converts skiff source text into tokens.
///
/// Positions are byte offsets into the original text, so token spans can be
/// sliced back out of the `SourceText` directly.
pub struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    diagnostics: DiagnosticCollection,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Lex the entire input. The returned stream always ends with an
    /// `EndOfFileToken` whose span is empty at the end of the text.
    pub fn lex(text: &'a str) -> (Vec<SyntaxToken>, DiagnosticCollection) {
        let mut lexer = Lexer::new(text);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let at_end = token.kind == SyntaxKind::EndOfFileToken;
            tokens.push(token);
            if at_end {
                break;
            }
        }
        (tokens, lexer.diagnostics)
    }

    /// Take the accumulated diagnostics, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    // ========================================================================
    // Character access
    // ========================================================================

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// The character at the current position without advancing.
    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    /// The character after the current one.
    #[inline]
    fn peek_char(&self) -> Option<char> {
        let mut chars = self.text[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advance past the current character.
    #[inline]
    fn bump(&mut self) {
        if let Some(ch) = self.current_char() {
            self.pos += ch.len_utf8();
        }
    }

    #[inline]
    fn span_from(&self, start: usize) -> TextSpan {
        TextSpan::from_bounds(start as TextPos, self.pos as TextPos)
    }

    #[inline]
    fn slice_from(&self, start: usize) -> &'a str {
        &self.text[start..self.pos]
    }

    // ========================================================================
    // Trivia
    // ========================================================================

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.current_char() {
                Some(ch) if ch.is_whitespace() => self.bump(),
                Some('/') if self.peek_char() == Some('/') => {
                    while let Some(ch) = self.current_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('/') if self.peek_char() == Some('*') => {
                    let start = self.pos;
                    self.bump();
                    self.bump();
                    let mut terminated = false;
                    while let Some(ch) = self.current_char() {
                        if ch == '*' && self.peek_char() == Some('/') {
                            self.bump();
                            self.bump();
                            terminated = true;
                            break;
                        }
                        self.bump();
                    }
                    if !terminated {
                        self.diagnostics.report(
                            TextSpan::new(start as TextPos, 2),
                            &messages::UNTERMINATED_BLOCK_COMMENT,
                            &[],
                        );
                    }
                }
                _ => return,
            }
        }
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    /// Scan the next token.
    pub fn next_token(&mut self) -> SyntaxToken {
        self.skip_trivia();
        let start = self.pos;

        let ch = match self.current_char() {
            Some(ch) => ch,
            None => {
                return SyntaxToken::new(
                    SyntaxKind::EndOfFileToken,
                    TextSpan::empty(self.pos as TextPos),
                    "",
                );
            }
        };

        match ch {
            '+' => self.single(start, SyntaxKind::PlusToken),
            '-' => self.single(start, SyntaxKind::MinusToken),
            '*' => self.single(start, SyntaxKind::StarToken),
            '/' => self.single(start, SyntaxKind::SlashToken),
            '%' => self.single(start, SyntaxKind::PercentToken),
            '~' => self.single(start, SyntaxKind::TildeToken),
            '^' => self.single(start, SyntaxKind::CaretToken),
            '(' => self.single(start, SyntaxKind::OpenParenToken),
            ')' => self.single(start, SyntaxKind::CloseParenToken),
            '{' => self.single(start, SyntaxKind::OpenBraceToken),
            '}' => self.single(start, SyntaxKind::CloseBraceToken),
            ',' => self.single(start, SyntaxKind::CommaToken),
            '!' => self.one_or_two(start, '=', SyntaxKind::BangEqualsToken, SyntaxKind::BangToken),
            '=' => self.one_or_two(
                start,
                '=',
                SyntaxKind::EqualsEqualsToken,
                SyntaxKind::EqualsToken,
            ),
            '<' => self.one_or_two(
                start,
                '=',
                SyntaxKind::LessOrEqualsToken,
                SyntaxKind::LessToken,
            ),
            '>' => self.one_or_two(
                start,
                '=',
                SyntaxKind::GreaterOrEqualsToken,
                SyntaxKind::GreaterToken,
            ),
            '&' => self.one_or_two(
                start,
                '&',
                SyntaxKind::AmpersandAmpersandToken,
                SyntaxKind::AmpersandToken,
            ),
            '|' => self.one_or_two(start, '|', SyntaxKind::PipePipeToken, SyntaxKind::PipeToken),
            ':' => self.one_or_two(
                start,
                '=',
                SyntaxKind::ColonEqualsToken,
                SyntaxKind::ColonToken,
            ),
            '.' => self.scan_dot(start),
            '"' => self.scan_string(start),
            '0'..='9' => self.scan_number(start),
            _ if is_identifier_start(ch) => self.scan_identifier(start),
            _ => {
                self.bump();
                let span = self.span_from(start);
                let text = self.slice_from(start);
                self.diagnostics
                    .report(span, &messages::BAD_CHARACTER_0, &[text]);
                SyntaxToken::new(SyntaxKind::BadToken, span, text)
            }
        }
    }

    fn single(&mut self, start: usize, kind: SyntaxKind) -> SyntaxToken {
        self.bump();
        SyntaxToken::new(kind, self.span_from(start), self.slice_from(start))
    }

    fn one_or_two(
        &mut self,
        start: usize,
        second: char,
        two_kind: SyntaxKind,
        one_kind: SyntaxKind,
    ) -> SyntaxToken {
        self.bump();
        let kind = if self.current_char() == Some(second) {
            self.bump();
            two_kind
        } else {
            one_kind
        };
        SyntaxToken::new(kind, self.span_from(start), self.slice_from(start))
    }

    // ========================================================================
    // Token-specific scanning methods
    // ========================================================================

    fn scan_dot(&mut self, start: usize) -> SyntaxToken {
        self.bump();
        let kind = if self.current_char() == Some('.') && self.peek_char() == Some('.') {
            self.bump();
            self.bump();
            SyntaxKind::DotDotDotToken
        } else {
            SyntaxKind::DotToken
        };
        SyntaxToken::new(kind, self.span_from(start), self.slice_from(start))
    }

    fn scan_number(&mut self, start: usize) -> SyntaxToken {
        while matches!(self.current_char(), Some('0'..='9')) {
            self.bump();
        }
        let text = self.slice_from(start);
        let span = self.span_from(start);
        let value = match text.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                self.diagnostics
                    .report(span, &messages::INVALID_INT_LITERAL_0, &[text]);
                0
            }
        };
        SyntaxToken::with_value(SyntaxKind::IntToken, span, text, TokenValue::Int(value))
    }

    fn scan_string(&mut self, start: usize) -> SyntaxToken {
        self.bump(); // skip opening quote
        let mut value = String::new();
        loop {
            match self.current_char() {
                None | Some('\n') => {
                    self.diagnostics.report(
                        TextSpan::new(start as TextPos, 1),
                        &messages::UNTERMINATED_STRING_LITERAL,
                        &[],
                    );
                    break;
                }
                Some('"') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    match self.current_char() {
                        Some('"') => value.push('"'),
                        Some('\\') => value.push('\\'),
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some('0') => value.push('\0'),
                        // Unknown escapes keep the escaped character.
                        Some(ch) => value.push(ch),
                        None => continue,
                    }
                    self.bump();
                }
                Some(ch) => {
                    value.push(ch);
                    self.bump();
                }
            }
        }
        SyntaxToken::with_value(
            SyntaxKind::StringToken,
            self.span_from(start),
            self.slice_from(start),
            TokenValue::String(value),
        )
    }

    fn scan_identifier(&mut self, start: usize) -> SyntaxToken {
        self.bump();
        while let Some(ch) = self.current_char() {
            if !is_identifier_continue(ch) {
                break;
            }
            self.bump();
        }
        let text = self.slice_from(start);
        let kind = SyntaxKind::keyword_kind(text);
        SyntaxToken::new(kind, self.span_from(start), text)
    }
}

#[inline]
fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch.is_xid_start()
}

#[inline]
fn is_identifier_continue(ch: char) -> bool {
    ch == '_' || ch.is_xid_continue()
}
