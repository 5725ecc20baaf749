//! Table-driven unary and binary operator resolution.
//!
//! Every operator the language defines is one row in a static table:
//! a source token kind plus the operand type(s) it applies to and the
//! result type it produces. Binding an operator is a table lookup, so
//! the full operator surface is visible in one place.

use skiff_symbols::TypeSymbol;
use skiff_syntax::SyntaxKind;

/// Semantic kinds for unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundUnaryOperatorKind {
    Identity,
    Negation,
    LogicalNegation,
    OnesComplement,
}

/// A resolved unary operator: token kind, semantics, and typing.
#[derive(Debug)]
pub struct BoundUnaryOperator {
    pub syntax_kind: SyntaxKind,
    pub kind: BoundUnaryOperatorKind,
    pub operand_type: TypeSymbol,
    pub result_type: TypeSymbol,
}

impl BoundUnaryOperator {
    const fn new(
        syntax_kind: SyntaxKind,
        kind: BoundUnaryOperatorKind,
        operand_type: TypeSymbol,
        result_type: TypeSymbol,
    ) -> Self {
        Self {
            syntax_kind,
            kind,
            operand_type,
            result_type,
        }
    }

    const OPERATORS: [BoundUnaryOperator; 4] = [
        Self::new(
            SyntaxKind::BangToken,
            BoundUnaryOperatorKind::LogicalNegation,
            TypeSymbol::Bool,
            TypeSymbol::Bool,
        ),
        Self::new(
            SyntaxKind::PlusToken,
            BoundUnaryOperatorKind::Identity,
            TypeSymbol::Int,
            TypeSymbol::Int,
        ),
        Self::new(
            SyntaxKind::MinusToken,
            BoundUnaryOperatorKind::Negation,
            TypeSymbol::Int,
            TypeSymbol::Int,
        ),
        Self::new(
            SyntaxKind::TildeToken,
            BoundUnaryOperatorKind::OnesComplement,
            TypeSymbol::Int,
            TypeSymbol::Int,
        ),
    ];

    /// Look up the operator for a token kind applied to an operand type.
    pub fn bind(
        syntax_kind: SyntaxKind,
        operand_type: TypeSymbol,
    ) -> Option<&'static BoundUnaryOperator> {
        Self::OPERATORS
            .iter()
            .find(|op| op.syntax_kind == syntax_kind && op.operand_type == operand_type)
    }
}

/// Semantic kinds for binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundBinaryOperatorKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Remainder,
    LogicalAnd,
    LogicalOr,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    Equals,
    NotEquals,
    Less,
    LessOrEquals,
    Greater,
    GreaterOrEquals,
}

/// A resolved binary operator: token kind, semantics, and typing.
#[derive(Debug)]
pub struct BoundBinaryOperator {
    pub syntax_kind: SyntaxKind,
    pub kind: BoundBinaryOperatorKind,
    pub left_type: TypeSymbol,
    pub right_type: TypeSymbol,
    pub result_type: TypeSymbol,
}

impl BoundBinaryOperator {
    const fn new(
        syntax_kind: SyntaxKind,
        kind: BoundBinaryOperatorKind,
        left_type: TypeSymbol,
        right_type: TypeSymbol,
        result_type: TypeSymbol,
    ) -> Self {
        Self {
            syntax_kind,
            kind,
            left_type,
            right_type,
            result_type,
        }
    }

    /// Shorthand for operators whose operands and result share one type.
    const fn same(syntax_kind: SyntaxKind, kind: BoundBinaryOperatorKind, ty: TypeSymbol) -> Self {
        Self::new(syntax_kind, kind, ty, ty, ty)
    }

    /// Shorthand for comparisons: both operands one type, result bool.
    const fn comparison(
        syntax_kind: SyntaxKind,
        kind: BoundBinaryOperatorKind,
        operand_type: TypeSymbol,
    ) -> Self {
        Self::new(syntax_kind, kind, operand_type, operand_type, TypeSymbol::Bool)
    }

    const OPERATORS: [BoundBinaryOperator; 24] = [
        // int arithmetic
        Self::same(SyntaxKind::PlusToken, BoundBinaryOperatorKind::Addition, TypeSymbol::Int),
        Self::same(SyntaxKind::MinusToken, BoundBinaryOperatorKind::Subtraction, TypeSymbol::Int),
        Self::same(SyntaxKind::StarToken, BoundBinaryOperatorKind::Multiplication, TypeSymbol::Int),
        Self::same(SyntaxKind::SlashToken, BoundBinaryOperatorKind::Division, TypeSymbol::Int),
        Self::same(SyntaxKind::PercentToken, BoundBinaryOperatorKind::Remainder, TypeSymbol::Int),
        // int bitwise
        Self::same(SyntaxKind::AmpersandToken, BoundBinaryOperatorKind::BitwiseAnd, TypeSymbol::Int),
        Self::same(SyntaxKind::PipeToken, BoundBinaryOperatorKind::BitwiseOr, TypeSymbol::Int),
        Self::same(SyntaxKind::CaretToken, BoundBinaryOperatorKind::BitwiseXor, TypeSymbol::Int),
        // int comparison
        Self::comparison(SyntaxKind::EqualsEqualsToken, BoundBinaryOperatorKind::Equals, TypeSymbol::Int),
        Self::comparison(SyntaxKind::BangEqualsToken, BoundBinaryOperatorKind::NotEquals, TypeSymbol::Int),
        Self::comparison(SyntaxKind::LessToken, BoundBinaryOperatorKind::Less, TypeSymbol::Int),
        Self::comparison(SyntaxKind::LessOrEqualsToken, BoundBinaryOperatorKind::LessOrEquals, TypeSymbol::Int),
        Self::comparison(SyntaxKind::GreaterToken, BoundBinaryOperatorKind::Greater, TypeSymbol::Int),
        Self::comparison(SyntaxKind::GreaterOrEqualsToken, BoundBinaryOperatorKind::GreaterOrEquals, TypeSymbol::Int),
        // bool logic
        Self::same(SyntaxKind::AmpersandAmpersandToken, BoundBinaryOperatorKind::LogicalAnd, TypeSymbol::Bool),
        Self::same(SyntaxKind::PipePipeToken, BoundBinaryOperatorKind::LogicalOr, TypeSymbol::Bool),
        Self::same(SyntaxKind::AmpersandToken, BoundBinaryOperatorKind::BitwiseAnd, TypeSymbol::Bool),
        Self::same(SyntaxKind::PipeToken, BoundBinaryOperatorKind::BitwiseOr, TypeSymbol::Bool),
        Self::same(SyntaxKind::CaretToken, BoundBinaryOperatorKind::BitwiseXor, TypeSymbol::Bool),
        Self::comparison(SyntaxKind::EqualsEqualsToken, BoundBinaryOperatorKind::Equals, TypeSymbol::Bool),
        Self::comparison(SyntaxKind::BangEqualsToken, BoundBinaryOperatorKind::NotEquals, TypeSymbol::Bool),
        // string concatenation and equality
        Self::same(SyntaxKind::PlusToken, BoundBinaryOperatorKind::Addition, TypeSymbol::String),
        Self::comparison(SyntaxKind::EqualsEqualsToken, BoundBinaryOperatorKind::Equals, TypeSymbol::String),
        Self::comparison(SyntaxKind::BangEqualsToken, BoundBinaryOperatorKind::NotEquals, TypeSymbol::String),
    ];

    /// Look up the operator for a token kind applied to a pair of operand types.
    pub fn bind(
        syntax_kind: SyntaxKind,
        left_type: TypeSymbol,
        right_type: TypeSymbol,
    ) -> Option<&'static BoundBinaryOperator> {
        Self::OPERATORS.iter().find(|op| {
            op.syntax_kind == syntax_kind && op.left_type == left_type && op.right_type == right_type
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unary_lookup() {
        let op = BoundUnaryOperator::bind(SyntaxKind::MinusToken, TypeSymbol::Int).unwrap();
        assert_eq!(op.kind, BoundUnaryOperatorKind::Negation);
        assert_eq!(op.result_type, TypeSymbol::Int);
        assert!(BoundUnaryOperator::bind(SyntaxKind::MinusToken, TypeSymbol::Bool).is_none());
        assert!(BoundUnaryOperator::bind(SyntaxKind::BangToken, TypeSymbol::Int).is_none());
    }

    #[test]
    fn test_binary_lookup() {
        let op =
            BoundBinaryOperator::bind(SyntaxKind::PlusToken, TypeSymbol::Int, TypeSymbol::Int)
                .unwrap();
        assert_eq!(op.kind, BoundBinaryOperatorKind::Addition);
        assert_eq!(op.result_type, TypeSymbol::Int);

        let concat =
            BoundBinaryOperator::bind(SyntaxKind::PlusToken, TypeSymbol::String, TypeSymbol::String)
                .unwrap();
        assert_eq!(concat.kind, BoundBinaryOperatorKind::Addition);
        assert_eq!(concat.result_type, TypeSymbol::String);
    }

    #[test]
    fn test_comparisons_produce_bool() {
        let op =
            BoundBinaryOperator::bind(SyntaxKind::LessToken, TypeSymbol::Int, TypeSymbol::Int)
                .unwrap();
        assert_eq!(op.result_type, TypeSymbol::Bool);
    }

    #[test]
    fn test_mixed_operand_types_are_undefined() {
        assert!(
            BoundBinaryOperator::bind(SyntaxKind::PlusToken, TypeSymbol::Int, TypeSymbol::String)
                .is_none()
        );
        assert!(BoundBinaryOperator::bind(
            SyntaxKind::AmpersandAmpersandToken,
            TypeSymbol::Int,
            TypeSymbol::Int
        )
        .is_none());
    }
}
