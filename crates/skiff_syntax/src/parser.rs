//! The parser.
//!
//! A recursive descent parser over a pre-lexed token vector. It never fails:
//! unexpected input produces a diagnostic plus a fabricated "missing" token,
//! and a stuck-position guard in the member and block loops skips one token
//! whenever a parse made no progress, so the parser always terminates.

use std::sync::Arc;

use skiff_core::SourceText;
use skiff_diagnostics::{messages, DiagnosticCollection};

use crate::kind::SyntaxKind;
use crate::lexer::Lexer;
use crate::node::*;
use crate::token::SyntaxToken;

/// Maximum recursion depth to prevent stack overflow on deeply nested input.
const MAX_RECURSION_DEPTH: u32 = 200;

pub struct Parser {
    source: Arc<SourceText>,
    tokens: Vec<SyntaxToken>,
    position: usize,
    diagnostics: DiagnosticCollection,
    recursion_depth: u32,
}

impl Parser {
    pub fn new(source: Arc<SourceText>) -> Self {
        let (all_tokens, diagnostics) = Lexer::lex(source.text());
        // Bad characters were already reported by the lexer.
        let tokens = all_tokens
            .into_iter()
            .filter(|t| t.kind != SyntaxKind::BadToken)
            .collect();
        Self {
            source,
            tokens,
            position: 0,
            diagnostics,
            recursion_depth: 0,
        }
    }

    /// Parse the whole input into top-level members plus the EOF token.
    pub fn parse_compilation_unit(
        mut self,
    ) -> (Vec<MemberSyntax>, SyntaxToken, DiagnosticCollection) {
        let members = self.parse_members();
        let eof_token = self.match_token(SyntaxKind::EndOfFileToken);
        (members, eof_token, self.diagnostics)
    }

    // ========================================================================
    // Token management
    // ========================================================================

    fn peek(&self, offset: usize) -> &SyntaxToken {
        let index = self.position + offset;
        // The token stream always ends with EOF, so clamp to the last token.
        if index >= self.tokens.len() {
            &self.tokens[self.tokens.len() - 1]
        } else {
            &self.tokens[index]
        }
    }

    #[inline]
    fn current(&self) -> &SyntaxToken {
        self.peek(0)
    }

    fn next_token(&mut self) -> SyntaxToken {
        let token = self.current().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    /// Consume a token of `kind`, or report a diagnostic and fabricate a
    /// missing token at the current position without advancing.
    fn match_token(&mut self, kind: SyntaxKind) -> SyntaxToken {
        if self.current().kind == kind {
            return self.next_token();
        }
        let current_kind = self.current().kind;
        let span = self.current().span;
        self.diagnostics.report(
            span,
            &messages::UNEXPECTED_TOKEN_0_EXPECTED_1,
            &[&current_kind.to_string(), &kind.to_string()],
        );
        SyntaxToken::missing(kind, span.start)
    }

    fn optional_token(&mut self, kind: SyntaxKind) -> Option<SyntaxToken> {
        if self.current().kind == kind {
            Some(self.next_token())
        } else {
            None
        }
    }

    // ========================================================================
    // Members
    // ========================================================================

    fn parse_members(&mut self) -> Vec<MemberSyntax> {
        let mut members = Vec::new();
        while self.current().kind != SyntaxKind::EndOfFileToken {
            let start_position = self.position;
            members.push(self.parse_member());
            // A parse that consumed nothing would loop forever; skip a token.
            if self.position == start_position {
                self.next_token();
            }
        }
        members
    }

    fn parse_member(&mut self) -> MemberSyntax {
        match self.current().kind {
            SyntaxKind::PackageKeyword => MemberSyntax::Package(self.parse_package_clause()),
            SyntaxKind::ImportKeyword => MemberSyntax::Import(self.parse_import_declaration()),
            SyntaxKind::FuncKeyword => {
                MemberSyntax::Function(Arc::new(self.parse_function_declaration()))
            }
            _ => MemberSyntax::GlobalStatement(self.parse_statement()),
        }
    }

    fn parse_package_clause(&mut self) -> PackageClauseSyntax {
        let keyword = self.match_token(SyntaxKind::PackageKeyword);
        let identifier = self.match_token(SyntaxKind::IdentifierToken);
        PackageClauseSyntax {
            keyword,
            identifier,
        }
    }

    fn parse_import_declaration(&mut self) -> ImportDeclarationSyntax {
        let keyword = self.match_token(SyntaxKind::ImportKeyword);
        let identifier = self.match_token(SyntaxKind::IdentifierToken);
        ImportDeclarationSyntax {
            keyword,
            identifier,
        }
    }

    fn parse_function_declaration(&mut self) -> FunctionDeclarationSyntax {
        let func_keyword = self.match_token(SyntaxKind::FuncKeyword);
        let identifier = self.match_token(SyntaxKind::IdentifierToken);
        let open_paren = self.match_token(SyntaxKind::OpenParenToken);
        let parameters = self.parse_parameter_list();
        let close_paren = self.match_token(SyntaxKind::CloseParenToken);
        let type_clause = self.parse_optional_type_clause();
        let body = self.parse_block_statement();
        FunctionDeclarationSyntax {
            func_keyword,
            identifier,
            open_paren,
            parameters,
            close_paren,
            type_clause,
            body,
        }
    }

    fn parse_parameter_list(&mut self) -> Vec<ParameterSyntax> {
        let mut parameters = Vec::new();
        let mut parse_next = true;
        while parse_next
            && self.current().kind != SyntaxKind::CloseParenToken
            && self.current().kind != SyntaxKind::EndOfFileToken
        {
            parameters.push(self.parse_parameter());
            if self.current().kind == SyntaxKind::CommaToken {
                self.next_token();
            } else {
                parse_next = false;
            }
        }
        parameters
    }

    fn parse_parameter(&mut self) -> ParameterSyntax {
        let identifier = self.match_token(SyntaxKind::IdentifierToken);
        let type_clause = self.parse_type_clause();
        ParameterSyntax {
            identifier,
            type_clause,
        }
    }

    fn parse_optional_type_clause(&mut self) -> Option<TypeClauseSyntax> {
        if self.current().kind != SyntaxKind::ColonToken {
            return None;
        }
        Some(self.parse_type_clause())
    }

    fn parse_type_clause(&mut self) -> TypeClauseSyntax {
        let colon = self.match_token(SyntaxKind::ColonToken);
        let identifier = self.match_token(SyntaxKind::IdentifierToken);
        TypeClauseSyntax { colon, identifier }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_statement(&mut self) -> StatementSyntax {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            self.recursion_depth -= 1;
            let span = self.current().span;
            let current_kind = self.current().kind;
            self.diagnostics.report(
                span,
                &messages::UNEXPECTED_TOKEN_0_EXPECTED_1,
                &[
                    &current_kind.to_string(),
                    &SyntaxKind::IdentifierToken.to_string(),
                ],
            );
            return StatementSyntax::Expression(ExpressionStatementSyntax {
                expression: ExpressionSyntax::Name(NameExpressionSyntax {
                    identifier: SyntaxToken::missing(SyntaxKind::IdentifierToken, span.start),
                }),
            });
        }

        let statement = match self.current().kind {
            SyntaxKind::OpenBraceToken => StatementSyntax::Block(self.parse_block_statement()),
            SyntaxKind::ConstKeyword => {
                StatementSyntax::VariableDeclaration(self.parse_variable_declaration())
            }
            SyntaxKind::IdentifierToken if self.peek(1).kind == SyntaxKind::ColonEqualsToken => {
                StatementSyntax::VariableDeclaration(self.parse_variable_declaration())
            }
            SyntaxKind::IfKeyword => StatementSyntax::If(self.parse_if_statement()),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::BreakKeyword => StatementSyntax::Break(BreakStatementSyntax {
                keyword: self.next_token(),
            }),
            SyntaxKind::ContinueKeyword => StatementSyntax::Continue(ContinueStatementSyntax {
                keyword: self.next_token(),
            }),
            SyntaxKind::ReturnKeyword => StatementSyntax::Return(self.parse_return_statement()),
            _ => StatementSyntax::Expression(ExpressionStatementSyntax {
                expression: self.parse_expression(),
            }),
        };
        self.recursion_depth -= 1;
        statement
    }

    fn parse_block_statement(&mut self) -> BlockStatementSyntax {
        let open_brace = self.match_token(SyntaxKind::OpenBraceToken);
        let mut statements = Vec::new();
        while self.current().kind != SyntaxKind::EndOfFileToken
            && self.current().kind != SyntaxKind::CloseBraceToken
        {
            let start_position = self.position;
            statements.push(self.parse_statement());
            if self.position == start_position {
                self.next_token();
            }
        }
        let close_brace = self.match_token(SyntaxKind::CloseBraceToken);
        BlockStatementSyntax {
            open_brace,
            statements,
            close_brace,
        }
    }

    fn parse_variable_declaration(&mut self) -> VariableDeclarationSyntax {
        let const_keyword = self.optional_token(SyntaxKind::ConstKeyword);
        let identifier = self.match_token(SyntaxKind::IdentifierToken);
        let colon_equals = self.match_token(SyntaxKind::ColonEqualsToken);
        let initializer = self.parse_expression();
        VariableDeclarationSyntax {
            const_keyword,
            identifier,
            colon_equals,
            initializer,
        }
    }

    fn parse_if_statement(&mut self) -> IfStatementSyntax {
        let keyword = self.match_token(SyntaxKind::IfKeyword);
        let condition = self.parse_expression();
        let then_statement = Box::new(self.parse_statement());
        let else_clause = self.parse_optional_else_clause();
        IfStatementSyntax {
            keyword,
            condition,
            then_statement,
            else_clause,
        }
    }

    fn parse_optional_else_clause(&mut self) -> Option<ElseClauseSyntax> {
        let keyword = self.optional_token(SyntaxKind::ElseKeyword)?;
        let statement = Box::new(self.parse_statement());
        Some(ElseClauseSyntax { keyword, statement })
    }

    /// `for { ... }` is the infinite loop; `for v := lo ... hi { ... }` the
    /// bounded one. The next token after `for` decides.
    fn parse_for_statement(&mut self) -> StatementSyntax {
        let keyword = self.match_token(SyntaxKind::ForKeyword);
        if self.current().kind == SyntaxKind::OpenBraceToken {
            let body = self.parse_block_statement();
            return StatementSyntax::For(ForStatementSyntax { keyword, body });
        }
        let identifier = self.match_token(SyntaxKind::IdentifierToken);
        let colon_equals = self.match_token(SyntaxKind::ColonEqualsToken);
        let lower_bound = self.parse_expression();
        let dots = self.match_token(SyntaxKind::DotDotDotToken);
        let upper_bound = self.parse_expression();
        let body = self.parse_block_statement();
        StatementSyntax::RangeFor(RangeForStatementSyntax {
            keyword,
            identifier,
            colon_equals,
            lower_bound,
            dots,
            upper_bound,
            body,
        })
    }

    /// The return value expression must start on the same line as the
    /// keyword; otherwise the next line is a separate statement.
    fn parse_return_statement(&mut self) -> ReturnStatementSyntax {
        let keyword = self.match_token(SyntaxKind::ReturnKeyword);
        let keyword_line = self.source.line_of(keyword.span.start);
        let current = self.current();
        let same_line = current.kind != SyntaxKind::EndOfFileToken
            && self.source.line_of(current.span.start) == keyword_line;
        let expression = if same_line && starts_expression(current.kind) {
            Some(self.parse_expression())
        } else {
            None
        };
        ReturnStatementSyntax {
            keyword,
            expression,
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expression(&mut self) -> ExpressionSyntax {
        self.parse_assignment_expression()
    }

    /// Assignment is right-associative and restricted to plain names, so it
    /// is handled ahead of the precedence climber.
    fn parse_assignment_expression(&mut self) -> ExpressionSyntax {
        if self.current().kind == SyntaxKind::IdentifierToken
            && self.peek(1).kind == SyntaxKind::EqualsToken
        {
            let identifier = self.next_token();
            let equals = self.next_token();
            let expression = Box::new(self.parse_assignment_expression());
            return ExpressionSyntax::Assignment(AssignmentExpressionSyntax {
                identifier,
                equals,
                expression,
            });
        }
        self.parse_binary_expression(0)
    }

    fn parse_binary_expression(&mut self, parent_precedence: u8) -> ExpressionSyntax {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            self.recursion_depth -= 1;
            let span = self.current().span;
            let current_kind = self.current().kind;
            self.diagnostics.report(
                span,
                &messages::UNEXPECTED_TOKEN_0_EXPECTED_1,
                &[
                    &current_kind.to_string(),
                    &SyntaxKind::IdentifierToken.to_string(),
                ],
            );
            return ExpressionSyntax::Name(NameExpressionSyntax {
                identifier: SyntaxToken::missing(SyntaxKind::IdentifierToken, span.start),
            });
        }

        let unary_precedence = self.current().kind.unary_operator_precedence();
        let mut left = if unary_precedence != 0 && unary_precedence >= parent_precedence {
            let operator = self.next_token();
            let operand = Box::new(self.parse_binary_expression(unary_precedence));
            ExpressionSyntax::Unary(UnaryExpressionSyntax { operator, operand })
        } else {
            self.parse_primary_expression()
        };

        loop {
            let precedence = self.current().kind.binary_operator_precedence();
            if precedence == 0 || precedence <= parent_precedence {
                break;
            }
            let operator = self.next_token();
            let right = Box::new(self.parse_binary_expression(precedence));
            left = ExpressionSyntax::Binary(BinaryExpressionSyntax {
                left: Box::new(left),
                operator,
                right,
            });
        }
        self.recursion_depth -= 1;
        left
    }

    fn parse_primary_expression(&mut self) -> ExpressionSyntax {
        match self.current().kind {
            SyntaxKind::OpenParenToken => {
                let open_paren = self.next_token();
                let expression = Box::new(self.parse_expression());
                let close_paren = self.match_token(SyntaxKind::CloseParenToken);
                ExpressionSyntax::Parenthesized(ParenthesizedExpressionSyntax {
                    open_paren,
                    expression,
                    close_paren,
                })
            }
            SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::IntToken
            | SyntaxKind::StringToken => ExpressionSyntax::Literal(LiteralExpressionSyntax {
                token: self.next_token(),
            }),
            _ => self.parse_name_or_call_expression(),
        }
    }

    fn parse_name_or_call_expression(&mut self) -> ExpressionSyntax {
        let identifier = self.match_token(SyntaxKind::IdentifierToken);
        match self.current().kind {
            SyntaxKind::OpenParenToken => {
                let open_paren = self.next_token();
                let arguments = self.parse_arguments();
                let close_paren = self.match_token(SyntaxKind::CloseParenToken);
                ExpressionSyntax::Call(CallExpressionSyntax {
                    identifier,
                    open_paren,
                    arguments,
                    close_paren,
                })
            }
            SyntaxKind::DotToken => {
                let dot = self.next_token();
                let member = self.match_token(SyntaxKind::IdentifierToken);
                let invocation = if self.current().kind == SyntaxKind::OpenParenToken {
                    let open_paren = self.next_token();
                    let arguments = self.parse_arguments();
                    let close_paren = self.match_token(SyntaxKind::CloseParenToken);
                    Some(InvocationSyntax {
                        open_paren,
                        arguments,
                        close_paren,
                    })
                } else {
                    None
                };
                ExpressionSyntax::Accessor(AccessorExpressionSyntax {
                    target: identifier,
                    dot,
                    member,
                    invocation,
                })
            }
            _ => ExpressionSyntax::Name(NameExpressionSyntax { identifier }),
        }
    }

    fn parse_arguments(&mut self) -> Vec<ExpressionSyntax> {
        let mut arguments = Vec::new();
        let mut parse_next = true;
        while parse_next
            && self.current().kind != SyntaxKind::CloseParenToken
            && self.current().kind != SyntaxKind::EndOfFileToken
        {
            let start_position = self.position;
            arguments.push(self.parse_expression());
            if self.current().kind == SyntaxKind::CommaToken {
                self.next_token();
            } else {
                parse_next = false;
            }
            if self.position == start_position {
                break;
            }
        }
        arguments
    }
}

/// Whether a token of `kind` can start an expression.
fn starts_expression(kind: SyntaxKind) -> bool {
    kind.unary_operator_precedence() != 0
        || matches!(
            kind,
            SyntaxKind::IntToken
                | SyntaxKind::StringToken
                | SyntaxKind::TrueKeyword
                | SyntaxKind::FalseKeyword
                | SyntaxKind::IdentifierToken
                | SyntaxKind::OpenParenToken
        )
}
