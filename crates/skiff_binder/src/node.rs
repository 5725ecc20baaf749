//! The bound tree: typed statements and expressions produced by the binder.
//!
//! Bound nodes are immutable and share children through `Arc`, so a
//! rewriter can return an unchanged subtree without copying it. Every
//! expression knows its static type; the evaluator dispatches on that
//! type rather than inspecting runtime values.

use std::fmt;
use std::sync::Arc;

use skiff_symbols::{
    FunctionSymbol, HostSignature, ImportedFunctionSymbol, PackageSymbol, TypeSymbol, Value,
    VariableSymbol,
};

use crate::operators::{BoundBinaryOperator, BoundUnaryOperator};

/// A jump target inside a lowered body. Labels compare by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundLabel {
    name: Arc<str>,
}

impl BoundLabel {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for BoundLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug)]
pub enum BoundStatement {
    Block(BoundBlockStatement),
    VariableDeclaration(BoundVariableDeclaration),
    If(BoundIfStatement),
    For(BoundForStatement),
    RangeFor(BoundRangeForStatement),
    Label(BoundLabelStatement),
    Goto(BoundGotoStatement),
    ConditionalGoto(BoundConditionalGotoStatement),
    Return(BoundReturnStatement),
    Expression(BoundExpressionStatement),
}

impl BoundStatement {
    /// Human-readable node kind, used by faults and debug output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            BoundStatement::Block(_) => "BlockStatement",
            BoundStatement::VariableDeclaration(_) => "VariableDeclaration",
            BoundStatement::If(_) => "IfStatement",
            BoundStatement::For(_) => "ForStatement",
            BoundStatement::RangeFor(_) => "RangeForStatement",
            BoundStatement::Label(_) => "LabelStatement",
            BoundStatement::Goto(_) => "GotoStatement",
            BoundStatement::ConditionalGoto(_) => "ConditionalGotoStatement",
            BoundStatement::Return(_) => "ReturnStatement",
            BoundStatement::Expression(_) => "ExpressionStatement",
        }
    }
}

/// A sequence of statements. Also used standalone for lowered bodies,
/// which are flat: no nested blocks, no structured control flow.
#[derive(Debug)]
pub struct BoundBlockStatement {
    pub statements: Vec<Arc<BoundStatement>>,
}

#[derive(Debug)]
pub struct BoundVariableDeclaration {
    pub variable: VariableSymbol,
    pub initializer: Arc<BoundExpression>,
}

#[derive(Debug)]
pub struct BoundIfStatement {
    pub condition: Arc<BoundExpression>,
    pub then_statement: Arc<BoundStatement>,
    pub else_statement: Option<Arc<BoundStatement>>,
}

/// `for { ... }`: loops until `break`.
#[derive(Debug)]
pub struct BoundForStatement {
    pub body: Arc<BoundStatement>,
    pub break_label: BoundLabel,
    pub continue_label: BoundLabel,
}

/// `for i := lo ... hi { ... }`: inclusive bounds, evaluated once.
#[derive(Debug)]
pub struct BoundRangeForStatement {
    pub variable: VariableSymbol,
    pub lower_bound: Arc<BoundExpression>,
    pub upper_bound: Arc<BoundExpression>,
    pub body: Arc<BoundStatement>,
    pub break_label: BoundLabel,
    pub continue_label: BoundLabel,
}

#[derive(Debug)]
pub struct BoundLabelStatement {
    pub label: BoundLabel,
}

#[derive(Debug)]
pub struct BoundGotoStatement {
    pub label: BoundLabel,
}

/// Jumps to `label` when the condition matches `jump_if_true`,
/// otherwise falls through.
#[derive(Debug)]
pub struct BoundConditionalGotoStatement {
    pub label: BoundLabel,
    pub condition: Arc<BoundExpression>,
    pub jump_if_true: bool,
}

#[derive(Debug)]
pub struct BoundReturnStatement {
    pub expression: Option<Arc<BoundExpression>>,
}

#[derive(Debug)]
pub struct BoundExpressionStatement {
    pub expression: Arc<BoundExpression>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug)]
pub enum BoundExpression {
    /// Produced wherever binding failed; silences downstream diagnostics.
    Error,
    Literal(BoundLiteralExpression),
    Variable(BoundVariableExpression),
    Assignment(BoundAssignmentExpression),
    Unary(BoundUnaryExpression),
    Binary(BoundBinaryExpression),
    Call(BoundCallExpression),
    ImportedCall(BoundImportedCallExpression),
    Conversion(BoundConversionExpression),
}

impl BoundExpression {
    /// The static type of this expression.
    pub fn ty(&self) -> TypeSymbol {
        match self {
            BoundExpression::Error => TypeSymbol::Error,
            BoundExpression::Literal(e) => e.value.ty(),
            BoundExpression::Variable(e) => e.variable.ty(),
            BoundExpression::Assignment(e) => e.expression.ty(),
            BoundExpression::Unary(e) => e.operator.result_type,
            BoundExpression::Binary(e) => e.operator.result_type,
            BoundExpression::Call(e) => e.function.return_type(),
            BoundExpression::ImportedCall(e) => e.signature.return_type,
            BoundExpression::Conversion(e) => e.ty,
        }
    }

    /// Human-readable node kind, used by faults and debug output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            BoundExpression::Error => "ErrorExpression",
            BoundExpression::Literal(_) => "LiteralExpression",
            BoundExpression::Variable(_) => "VariableExpression",
            BoundExpression::Assignment(_) => "AssignmentExpression",
            BoundExpression::Unary(_) => "UnaryExpression",
            BoundExpression::Binary(_) => "BinaryExpression",
            BoundExpression::Call(_) => "CallExpression",
            BoundExpression::ImportedCall(_) => "ImportedCallExpression",
            BoundExpression::Conversion(_) => "ConversionExpression",
        }
    }
}

#[derive(Debug)]
pub struct BoundLiteralExpression {
    pub value: Value,
}

#[derive(Debug)]
pub struct BoundVariableExpression {
    pub variable: VariableSymbol,
}

#[derive(Debug)]
pub struct BoundAssignmentExpression {
    pub variable: VariableSymbol,
    pub expression: Arc<BoundExpression>,
}

#[derive(Debug)]
pub struct BoundUnaryExpression {
    pub operator: &'static BoundUnaryOperator,
    pub operand: Arc<BoundExpression>,
}

#[derive(Debug)]
pub struct BoundBinaryExpression {
    pub left: Arc<BoundExpression>,
    pub operator: &'static BoundBinaryOperator,
    pub right: Arc<BoundExpression>,
}

#[derive(Debug)]
pub struct BoundCallExpression {
    pub function: FunctionSymbol,
    pub arguments: Vec<Arc<BoundExpression>>,
}

/// A call into a host package, `pkg.name(args)`. The signature was
/// matched against the argument types at bind time; the evaluator only
/// has to invoke its callback.
#[derive(Debug)]
pub struct BoundImportedCallExpression {
    pub package: PackageSymbol,
    pub function: ImportedFunctionSymbol,
    pub signature: HostSignature,
    pub arguments: Vec<Arc<BoundExpression>>,
}

#[derive(Debug)]
pub struct BoundConversionExpression {
    pub ty: TypeSymbol,
    pub expression: Arc<BoundExpression>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_syntax::SyntaxKind;

    #[test]
    fn test_expression_types() {
        let literal = BoundExpression::Literal(BoundLiteralExpression {
            value: Value::Int(3),
        });
        assert_eq!(literal.ty(), TypeSymbol::Int);

        let operator =
            BoundBinaryOperator::bind(SyntaxKind::PlusToken, TypeSymbol::Int, TypeSymbol::Int)
                .unwrap();
        let binary = BoundExpression::Binary(BoundBinaryExpression {
            left: Arc::new(literal),
            operator,
            right: Arc::new(BoundExpression::Literal(BoundLiteralExpression {
                value: Value::Int(4),
            })),
        });
        assert_eq!(binary.ty(), TypeSymbol::Int);
        assert_eq!(BoundExpression::Error.ty(), TypeSymbol::Error);
    }

    #[test]
    fn test_labels_compare_by_name() {
        assert_eq!(BoundLabel::new("Label1"), BoundLabel::new("Label1"));
        assert_ne!(BoundLabel::new("Label1"), BoundLabel::new("Label2"));
    }
}
