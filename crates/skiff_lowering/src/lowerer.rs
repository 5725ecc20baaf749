//! Lowering of structured statements to label/jump form.
//!
//! Each structured construct is rewritten into a block of simpler
//! statements and that block is immediately rewritten again, so
//! constructs nested inside the generated code are lowered too. A final
//! flattening pass splices blocks into one statement list.

use std::sync::Arc;

use skiff_binder::node::{
    BoundAssignmentExpression, BoundBinaryExpression, BoundBlockStatement,
    BoundConditionalGotoStatement, BoundExpression, BoundExpressionStatement, BoundForStatement,
    BoundGotoStatement, BoundIfStatement, BoundLabel, BoundLabelStatement,
    BoundLiteralExpression, BoundRangeForStatement, BoundStatement, BoundVariableDeclaration,
    BoundVariableExpression,
};
use skiff_binder::operators::BoundBinaryOperator;
use skiff_binder::rewriter::BoundTreeRewriter;
use skiff_symbols::{TypeSymbol, Value, VariableSymbol};
use skiff_syntax::SyntaxKind;

/// Rewrites structured control flow into conditional jumps.
///
/// Lowering never fails and is idempotent: running it over an already
/// lowered tree returns the same statements unchanged.
pub struct Lowerer {
    label_count: u32,
}

impl Lowerer {
    fn new() -> Self {
        Self { label_count: 0 }
    }

    /// Lowers a statement into a flat block. Structured control flow
    /// becomes labels and jumps; nested blocks are spliced into a
    /// single statement list.
    pub fn lower(statement: &Arc<BoundStatement>) -> Arc<BoundBlockStatement> {
        let mut lowerer = Lowerer::new();
        let rewritten = lowerer.rewrite_statement(statement);
        Arc::new(flatten(rewritten))
    }

    fn generate_label(&mut self) -> BoundLabel {
        self.label_count += 1;
        BoundLabel::new(format!("Label{}", self.label_count))
    }
}

impl BoundTreeRewriter for Lowerer {
    fn rewrite_if_statement(
        &mut self,
        _statement: &Arc<BoundStatement>,
        node: &BoundIfStatement,
    ) -> Arc<BoundStatement> {
        let result = match &node.else_statement {
            None => {
                // gotoFalse <end> <condition>
                // <then>
                // end:
                let end_label = self.generate_label();
                block(vec![
                    goto_if(end_label.clone(), Arc::clone(&node.condition), false),
                    Arc::clone(&node.then_statement),
                    label(end_label),
                ])
            }
            Some(else_statement) => {
                // gotoFalse <else> <condition>
                // <then>
                // goto end
                // else:
                // <else>
                // end:
                let else_label = self.generate_label();
                let end_label = self.generate_label();
                block(vec![
                    goto_if(else_label.clone(), Arc::clone(&node.condition), false),
                    Arc::clone(&node.then_statement),
                    goto(end_label.clone()),
                    label(else_label),
                    Arc::clone(else_statement),
                    label(end_label),
                ])
            }
        };
        self.rewrite_statement(&result)
    }

    fn rewrite_for_statement(
        &mut self,
        _statement: &Arc<BoundStatement>,
        node: &BoundForStatement,
    ) -> Arc<BoundStatement> {
        // continue:
        // <body>
        // goto continue
        // break:
        let result = block(vec![
            label(node.continue_label.clone()),
            Arc::clone(&node.body),
            goto(node.continue_label.clone()),
            label(node.break_label.clone()),
        ]);
        self.rewrite_statement(&result)
    }

    fn rewrite_range_for_statement(
        &mut self,
        _statement: &Arc<BoundStatement>,
        node: &BoundRangeForStatement,
    ) -> Arc<BoundStatement> {
        // <var> := <lower>
        // const upperBound := <upper>
        // goto check
        // body:
        // <body>
        // continue:
        // <var> = <var> + 1
        // check:
        // gotoTrue <body> <var> <= upperBound
        // break:
        //
        // The upper bound is captured in its own variable so it is
        // evaluated once, before the first iteration.
        let upper_bound = VariableSymbol::local("upperBound", true, TypeSymbol::Int);
        let body_label = self.generate_label();
        let check_label = self.generate_label();

        let increment = Arc::new(BoundExpression::Assignment(BoundAssignmentExpression {
            variable: node.variable.clone(),
            expression: Arc::new(BoundExpression::Binary(BoundBinaryExpression {
                left: variable(node.variable.clone()),
                operator: int_operator(SyntaxKind::PlusToken),
                right: literal(Value::Int(1)),
            })),
        }));
        let condition = Arc::new(BoundExpression::Binary(BoundBinaryExpression {
            left: variable(node.variable.clone()),
            operator: int_operator(SyntaxKind::LessOrEqualsToken),
            right: variable(upper_bound.clone()),
        }));

        let result = block(vec![
            declare(node.variable.clone(), Arc::clone(&node.lower_bound)),
            declare(upper_bound, Arc::clone(&node.upper_bound)),
            goto(check_label.clone()),
            label(body_label.clone()),
            Arc::clone(&node.body),
            label(node.continue_label.clone()),
            Arc::new(BoundStatement::Expression(BoundExpressionStatement {
                expression: increment,
            })),
            label(check_label),
            goto_if(body_label, condition, true),
            label(node.break_label.clone()),
        ]);
        self.rewrite_statement(&result)
    }
}

/// Splices nested blocks into one flat statement list, depth first.
fn flatten(statement: Arc<BoundStatement>) -> BoundBlockStatement {
    let mut statements = Vec::new();
    let mut stack = vec![statement];
    while let Some(current) = stack.pop() {
        match current.as_ref() {
            BoundStatement::Block(b) => {
                stack.extend(b.statements.iter().rev().cloned());
            }
            _ => statements.push(current),
        }
    }
    BoundBlockStatement { statements }
}

fn int_operator(kind: SyntaxKind) -> &'static BoundBinaryOperator {
    // Both operators the lowerer emits are rows in the built-in table.
    BoundBinaryOperator::bind(kind, TypeSymbol::Int, TypeSymbol::Int)
        .expect("operator is defined for int operands")
}

fn block(statements: Vec<Arc<BoundStatement>>) -> Arc<BoundStatement> {
    Arc::new(BoundStatement::Block(BoundBlockStatement { statements }))
}

fn label(label: BoundLabel) -> Arc<BoundStatement> {
    Arc::new(BoundStatement::Label(BoundLabelStatement { label }))
}

fn goto(label: BoundLabel) -> Arc<BoundStatement> {
    Arc::new(BoundStatement::Goto(BoundGotoStatement { label }))
}

fn goto_if(
    label: BoundLabel,
    condition: Arc<BoundExpression>,
    jump_if_true: bool,
) -> Arc<BoundStatement> {
    Arc::new(BoundStatement::ConditionalGoto(BoundConditionalGotoStatement {
        label,
        condition,
        jump_if_true,
    }))
}

fn declare(variable: VariableSymbol, initializer: Arc<BoundExpression>) -> Arc<BoundStatement> {
    Arc::new(BoundStatement::VariableDeclaration(BoundVariableDeclaration {
        variable,
        initializer,
    }))
}

fn variable(variable: VariableSymbol) -> Arc<BoundExpression> {
    Arc::new(BoundExpression::Variable(BoundVariableExpression { variable }))
}

fn literal(value: Value) -> Arc<BoundExpression> {
    Arc::new(BoundExpression::Literal(BoundLiteralExpression { value }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expression(value: i64) -> Arc<BoundStatement> {
        Arc::new(BoundStatement::Expression(BoundExpressionStatement {
            expression: literal(Value::Int(value)),
        }))
    }

    fn literal_of(statement: &BoundStatement) -> Option<i64> {
        match statement {
            BoundStatement::Expression(e) => match e.expression.as_ref() {
                BoundExpression::Literal(l) => l.value.as_int(),
                _ => None,
            },
            _ => None,
        }
    }

    #[test]
    fn test_flatten_splices_nested_blocks_in_order() {
        let nested = block(vec![
            expression(1),
            block(vec![expression(2), block(vec![expression(3)])]),
            expression(4),
        ]);
        let flat = flatten(nested);
        let values: Vec<_> = flat
            .statements
            .iter()
            .map(|s| literal_of(s).unwrap())
            .collect();
        assert_eq!(values, [1, 2, 3, 4]);
    }

    #[test]
    fn test_flatten_wraps_a_single_statement() {
        let flat = flatten(expression(7));
        assert_eq!(flat.statements.len(), 1);
        assert_eq!(literal_of(&flat.statements[0]), Some(7));
    }
}
