//! Bound tree rewriting with structural sharing.
//!
//! The rewriter visits every statement and rebuilds a node only when
//! one of its children actually changed; untouched subtrees are
//! returned as the same `Arc`. Rewriting an already-rewritten tree is
//! therefore a no-op that allocates nothing.

use std::sync::Arc;

use crate::node::{
    BoundBlockStatement, BoundConditionalGotoStatement, BoundExpression,
    BoundExpressionStatement, BoundForStatement, BoundGotoStatement, BoundIfStatement,
    BoundLabelStatement, BoundRangeForStatement, BoundReturnStatement, BoundStatement,
    BoundVariableDeclaration,
};

fn unchanged<T>(new: &Option<Arc<T>>, old: &Option<Arc<T>>) -> bool {
    match (new, old) {
        (Some(new), Some(old)) => Arc::ptr_eq(new, old),
        (None, None) => true,
        _ => false,
    }
}

pub trait BoundTreeRewriter {
    fn rewrite_statement(&mut self, statement: &Arc<BoundStatement>) -> Arc<BoundStatement> {
        match statement.as_ref() {
            BoundStatement::Block(block) => self.rewrite_block_statement(statement, block),
            BoundStatement::VariableDeclaration(declaration) => {
                self.rewrite_variable_declaration(statement, declaration)
            }
            BoundStatement::If(node) => self.rewrite_if_statement(statement, node),
            BoundStatement::For(node) => self.rewrite_for_statement(statement, node),
            BoundStatement::RangeFor(node) => self.rewrite_range_for_statement(statement, node),
            BoundStatement::Label(node) => self.rewrite_label_statement(statement, node),
            BoundStatement::Goto(node) => self.rewrite_goto_statement(statement, node),
            BoundStatement::ConditionalGoto(node) => {
                self.rewrite_conditional_goto_statement(statement, node)
            }
            BoundStatement::Return(node) => self.rewrite_return_statement(statement, node),
            BoundStatement::Expression(node) => self.rewrite_expression_statement(statement, node),
        }
    }

    fn rewrite_block_statement(
        &mut self,
        statement: &Arc<BoundStatement>,
        block: &BoundBlockStatement,
    ) -> Arc<BoundStatement> {
        // Copy-on-first-change: children before the first changed one are
        // shared from the original list.
        let mut rewritten: Option<Vec<Arc<BoundStatement>>> = None;
        for (index, child) in block.statements.iter().enumerate() {
            let new_child = self.rewrite_statement(child);
            if rewritten.is_none() && !Arc::ptr_eq(&new_child, child) {
                let mut statements = Vec::with_capacity(block.statements.len());
                statements.extend(block.statements[..index].iter().cloned());
                rewritten = Some(statements);
            }
            if let Some(statements) = rewritten.as_mut() {
                statements.push(new_child);
            }
        }
        match rewritten {
            Some(statements) => Arc::new(BoundStatement::Block(BoundBlockStatement { statements })),
            None => Arc::clone(statement),
        }
    }

    fn rewrite_variable_declaration(
        &mut self,
        statement: &Arc<BoundStatement>,
        declaration: &BoundVariableDeclaration,
    ) -> Arc<BoundStatement> {
        let initializer = self.rewrite_expression(&declaration.initializer);
        if Arc::ptr_eq(&initializer, &declaration.initializer) {
            return Arc::clone(statement);
        }
        Arc::new(BoundStatement::VariableDeclaration(BoundVariableDeclaration {
            variable: declaration.variable.clone(),
            initializer,
        }))
    }

    fn rewrite_if_statement(
        &mut self,
        statement: &Arc<BoundStatement>,
        node: &BoundIfStatement,
    ) -> Arc<BoundStatement> {
        let condition = self.rewrite_expression(&node.condition);
        let then_statement = self.rewrite_statement(&node.then_statement);
        let else_statement = node
            .else_statement
            .as_ref()
            .map(|statement| self.rewrite_statement(statement));
        if Arc::ptr_eq(&condition, &node.condition)
            && Arc::ptr_eq(&then_statement, &node.then_statement)
            && unchanged(&else_statement, &node.else_statement)
        {
            return Arc::clone(statement);
        }
        Arc::new(BoundStatement::If(BoundIfStatement {
            condition,
            then_statement,
            else_statement,
        }))
    }

    fn rewrite_for_statement(
        &mut self,
        statement: &Arc<BoundStatement>,
        node: &BoundForStatement,
    ) -> Arc<BoundStatement> {
        let body = self.rewrite_statement(&node.body);
        if Arc::ptr_eq(&body, &node.body) {
            return Arc::clone(statement);
        }
        Arc::new(BoundStatement::For(BoundForStatement {
            body,
            break_label: node.break_label.clone(),
            continue_label: node.continue_label.clone(),
        }))
    }

    fn rewrite_range_for_statement(
        &mut self,
        statement: &Arc<BoundStatement>,
        node: &BoundRangeForStatement,
    ) -> Arc<BoundStatement> {
        let lower_bound = self.rewrite_expression(&node.lower_bound);
        let upper_bound = self.rewrite_expression(&node.upper_bound);
        let body = self.rewrite_statement(&node.body);
        if Arc::ptr_eq(&lower_bound, &node.lower_bound)
            && Arc::ptr_eq(&upper_bound, &node.upper_bound)
            && Arc::ptr_eq(&body, &node.body)
        {
            return Arc::clone(statement);
        }
        Arc::new(BoundStatement::RangeFor(BoundRangeForStatement {
            variable: node.variable.clone(),
            lower_bound,
            upper_bound,
            body,
            break_label: node.break_label.clone(),
            continue_label: node.continue_label.clone(),
        }))
    }

    fn rewrite_label_statement(
        &mut self,
        statement: &Arc<BoundStatement>,
        _node: &BoundLabelStatement,
    ) -> Arc<BoundStatement> {
        Arc::clone(statement)
    }

    fn rewrite_goto_statement(
        &mut self,
        statement: &Arc<BoundStatement>,
        _node: &BoundGotoStatement,
    ) -> Arc<BoundStatement> {
        Arc::clone(statement)
    }

    fn rewrite_conditional_goto_statement(
        &mut self,
        statement: &Arc<BoundStatement>,
        node: &BoundConditionalGotoStatement,
    ) -> Arc<BoundStatement> {
        let condition = self.rewrite_expression(&node.condition);
        if Arc::ptr_eq(&condition, &node.condition) {
            return Arc::clone(statement);
        }
        Arc::new(BoundStatement::ConditionalGoto(BoundConditionalGotoStatement {
            label: node.label.clone(),
            condition,
            jump_if_true: node.jump_if_true,
        }))
    }

    fn rewrite_return_statement(
        &mut self,
        statement: &Arc<BoundStatement>,
        node: &BoundReturnStatement,
    ) -> Arc<BoundStatement> {
        let expression = node
            .expression
            .as_ref()
            .map(|expression| self.rewrite_expression(expression));
        if unchanged(&expression, &node.expression) {
            return Arc::clone(statement);
        }
        Arc::new(BoundStatement::Return(BoundReturnStatement { expression }))
    }

    fn rewrite_expression_statement(
        &mut self,
        statement: &Arc<BoundStatement>,
        node: &BoundExpressionStatement,
    ) -> Arc<BoundStatement> {
        let expression = self.rewrite_expression(&node.expression);
        if Arc::ptr_eq(&expression, &node.expression) {
            return Arc::clone(statement);
        }
        Arc::new(BoundStatement::Expression(BoundExpressionStatement { expression }))
    }

    /// Expression hook; the default leaves expressions untouched.
    fn rewrite_expression(&mut self, expression: &Arc<BoundExpression>) -> Arc<BoundExpression> {
        Arc::clone(expression)
    }
}
