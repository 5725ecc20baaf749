//! AST node definitions.
//!
//! The tree is a set of owned enums with exhaustive matching: every consumer
//! that walks it is forced by the compiler to handle every node kind.
//! Function declarations are `Arc`-shared because symbols keep a handle to
//! their declaration site. Nodes do not store their span; `span()` computes
//! it from the first and last child token.

use std::sync::Arc;

use skiff_core::TextSpan;

use crate::token::SyntaxToken;

// ============================================================================
// Members
// ============================================================================

/// A top-level member of a compilation unit.
#[derive(Debug, Clone)]
pub enum MemberSyntax {
    Package(PackageClauseSyntax),
    Import(ImportDeclarationSyntax),
    Function(Arc<FunctionDeclarationSyntax>),
    GlobalStatement(StatementSyntax),
}

impl MemberSyntax {
    pub fn span(&self) -> TextSpan {
        match self {
            MemberSyntax::Package(p) => p.span(),
            MemberSyntax::Import(i) => i.span(),
            MemberSyntax::Function(f) => f.span(),
            MemberSyntax::GlobalStatement(s) => s.span(),
        }
    }
}

/// `package IDENT`
#[derive(Debug, Clone)]
pub struct PackageClauseSyntax {
    pub keyword: SyntaxToken,
    pub identifier: SyntaxToken,
}

impl PackageClauseSyntax {
    pub fn span(&self) -> TextSpan {
        self.keyword.span.union(&self.identifier.span)
    }
}

/// `import IDENT`
#[derive(Debug, Clone)]
pub struct ImportDeclarationSyntax {
    pub keyword: SyntaxToken,
    pub identifier: SyntaxToken,
}

impl ImportDeclarationSyntax {
    pub fn span(&self) -> TextSpan {
        self.keyword.span.union(&self.identifier.span)
    }
}

/// `func IDENT(param, ...)(: type)? { ... }`
#[derive(Debug, Clone)]
pub struct FunctionDeclarationSyntax {
    pub func_keyword: SyntaxToken,
    pub identifier: SyntaxToken,
    pub open_paren: SyntaxToken,
    pub parameters: Vec<ParameterSyntax>,
    pub close_paren: SyntaxToken,
    pub type_clause: Option<TypeClauseSyntax>,
    pub body: BlockStatementSyntax,
}

impl FunctionDeclarationSyntax {
    pub fn span(&self) -> TextSpan {
        self.func_keyword.span.union(&self.body.span())
    }
}

/// `IDENT: type`
#[derive(Debug, Clone)]
pub struct ParameterSyntax {
    pub identifier: SyntaxToken,
    pub type_clause: TypeClauseSyntax,
}

impl ParameterSyntax {
    pub fn span(&self) -> TextSpan {
        self.identifier.span.union(&self.type_clause.span())
    }
}

/// `: IDENT`
#[derive(Debug, Clone)]
pub struct TypeClauseSyntax {
    pub colon: SyntaxToken,
    pub identifier: SyntaxToken,
}

impl TypeClauseSyntax {
    pub fn span(&self) -> TextSpan {
        self.colon.span.union(&self.identifier.span)
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone)]
pub enum StatementSyntax {
    Block(BlockStatementSyntax),
    VariableDeclaration(VariableDeclarationSyntax),
    If(IfStatementSyntax),
    For(ForStatementSyntax),
    RangeFor(RangeForStatementSyntax),
    Break(BreakStatementSyntax),
    Continue(ContinueStatementSyntax),
    Return(ReturnStatementSyntax),
    Expression(ExpressionStatementSyntax),
}

impl StatementSyntax {
    pub fn span(&self) -> TextSpan {
        match self {
            StatementSyntax::Block(s) => s.span(),
            StatementSyntax::VariableDeclaration(s) => s.span(),
            StatementSyntax::If(s) => s.span(),
            StatementSyntax::For(s) => s.span(),
            StatementSyntax::RangeFor(s) => s.span(),
            StatementSyntax::Break(s) => s.keyword.span,
            StatementSyntax::Continue(s) => s.keyword.span,
            StatementSyntax::Return(s) => s.span(),
            StatementSyntax::Expression(s) => s.expression.span(),
        }
    }
}

/// `{ statement* }`
#[derive(Debug, Clone)]
pub struct BlockStatementSyntax {
    pub open_brace: SyntaxToken,
    pub statements: Vec<StatementSyntax>,
    pub close_brace: SyntaxToken,
}

impl BlockStatementSyntax {
    pub fn span(&self) -> TextSpan {
        self.open_brace.span.union(&self.close_brace.span)
    }
}

/// `IDENT := expr` or `const IDENT := expr`
#[derive(Debug, Clone)]
pub struct VariableDeclarationSyntax {
    pub const_keyword: Option<SyntaxToken>,
    pub identifier: SyntaxToken,
    pub colon_equals: SyntaxToken,
    pub initializer: ExpressionSyntax,
}

impl VariableDeclarationSyntax {
    pub fn is_read_only(&self) -> bool {
        self.const_keyword.is_some()
    }

    pub fn span(&self) -> TextSpan {
        let start = match &self.const_keyword {
            Some(keyword) => keyword.span,
            None => self.identifier.span,
        };
        start.union(&self.initializer.span())
    }
}

/// `if expr statement (else statement)?`
#[derive(Debug, Clone)]
pub struct IfStatementSyntax {
    pub keyword: SyntaxToken,
    pub condition: ExpressionSyntax,
    pub then_statement: Box<StatementSyntax>,
    pub else_clause: Option<ElseClauseSyntax>,
}

impl IfStatementSyntax {
    pub fn span(&self) -> TextSpan {
        let end = match &self.else_clause {
            Some(clause) => clause.statement.span(),
            None => self.then_statement.span(),
        };
        self.keyword.span.union(&end)
    }
}

#[derive(Debug, Clone)]
pub struct ElseClauseSyntax {
    pub keyword: SyntaxToken,
    pub statement: Box<StatementSyntax>,
}

/// `for { ... }` without a header runs until `break`.
#[derive(Debug, Clone)]
pub struct ForStatementSyntax {
    pub keyword: SyntaxToken,
    pub body: BlockStatementSyntax,
}

impl ForStatementSyntax {
    pub fn span(&self) -> TextSpan {
        self.keyword.span.union(&self.body.span())
    }
}

/// `for IDENT := lower ... upper { ... }`, inclusive on both bounds.
#[derive(Debug, Clone)]
pub struct RangeForStatementSyntax {
    pub keyword: SyntaxToken,
    pub identifier: SyntaxToken,
    pub colon_equals: SyntaxToken,
    pub lower_bound: ExpressionSyntax,
    pub dots: SyntaxToken,
    pub upper_bound: ExpressionSyntax,
    pub body: BlockStatementSyntax,
}

impl RangeForStatementSyntax {
    pub fn span(&self) -> TextSpan {
        self.keyword.span.union(&self.body.span())
    }
}

#[derive(Debug, Clone)]
pub struct BreakStatementSyntax {
    pub keyword: SyntaxToken,
}

#[derive(Debug, Clone)]
pub struct ContinueStatementSyntax {
    pub keyword: SyntaxToken,
}

/// `return` with an optional same-line expression.
#[derive(Debug, Clone)]
pub struct ReturnStatementSyntax {
    pub keyword: SyntaxToken,
    pub expression: Option<ExpressionSyntax>,
}

impl ReturnStatementSyntax {
    pub fn span(&self) -> TextSpan {
        match &self.expression {
            Some(expression) => self.keyword.span.union(&expression.span()),
            None => self.keyword.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExpressionStatementSyntax {
    pub expression: ExpressionSyntax,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone)]
pub enum ExpressionSyntax {
    Literal(LiteralExpressionSyntax),
    Name(NameExpressionSyntax),
    Unary(UnaryExpressionSyntax),
    Binary(BinaryExpressionSyntax),
    Parenthesized(ParenthesizedExpressionSyntax),
    Assignment(AssignmentExpressionSyntax),
    Call(CallExpressionSyntax),
    Accessor(AccessorExpressionSyntax),
}

impl ExpressionSyntax {
    pub fn span(&self) -> TextSpan {
        match self {
            ExpressionSyntax::Literal(e) => e.token.span,
            ExpressionSyntax::Name(e) => e.identifier.span,
            ExpressionSyntax::Unary(e) => e.operator.span.union(&e.operand.span()),
            ExpressionSyntax::Binary(e) => e.left.span().union(&e.right.span()),
            ExpressionSyntax::Parenthesized(e) => e.open_paren.span.union(&e.close_paren.span),
            ExpressionSyntax::Assignment(e) => e.identifier.span.union(&e.expression.span()),
            ExpressionSyntax::Call(e) => e.identifier.span.union(&e.close_paren.span),
            ExpressionSyntax::Accessor(e) => e.span(),
        }
    }
}

/// An integer, string, `true`, or `false` token.
#[derive(Debug, Clone)]
pub struct LiteralExpressionSyntax {
    pub token: SyntaxToken,
}

#[derive(Debug, Clone)]
pub struct NameExpressionSyntax {
    pub identifier: SyntaxToken,
}

#[derive(Debug, Clone)]
pub struct UnaryExpressionSyntax {
    pub operator: SyntaxToken,
    pub operand: Box<ExpressionSyntax>,
}

#[derive(Debug, Clone)]
pub struct BinaryExpressionSyntax {
    pub left: Box<ExpressionSyntax>,
    pub operator: SyntaxToken,
    pub right: Box<ExpressionSyntax>,
}

#[derive(Debug, Clone)]
pub struct ParenthesizedExpressionSyntax {
    pub open_paren: SyntaxToken,
    pub expression: Box<ExpressionSyntax>,
    pub close_paren: SyntaxToken,
}

/// `IDENT = expr`; assignment is an expression and yields the assigned value.
#[derive(Debug, Clone)]
pub struct AssignmentExpressionSyntax {
    pub identifier: SyntaxToken,
    pub equals: SyntaxToken,
    pub expression: Box<ExpressionSyntax>,
}

/// `IDENT(arg, ...)` names either a function or, for a single argument,
/// a type cast.
#[derive(Debug, Clone)]
pub struct CallExpressionSyntax {
    pub identifier: SyntaxToken,
    pub open_paren: SyntaxToken,
    pub arguments: Vec<ExpressionSyntax>,
    pub close_paren: SyntaxToken,
}

/// `IDENT.IDENT` with an optional invocation. Only the invoked form binds;
/// plain member access is rejected later.
#[derive(Debug, Clone)]
pub struct AccessorExpressionSyntax {
    pub target: SyntaxToken,
    pub dot: SyntaxToken,
    pub member: SyntaxToken,
    pub invocation: Option<InvocationSyntax>,
}

impl AccessorExpressionSyntax {
    pub fn span(&self) -> TextSpan {
        match &self.invocation {
            Some(invocation) => self.target.span.union(&invocation.close_paren.span),
            None => self.target.span.union(&self.member.span),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InvocationSyntax {
    pub open_paren: SyntaxToken,
    pub arguments: Vec<ExpressionSyntax>,
    pub close_paren: SyntaxToken,
}
