//! Renders bound trees back to readable source-like text.
//!
//! Used for control flow graph labels and for dumping the lowered
//! program. The output mirrors the surface syntax where one exists
//! (`goto` and labels have none).

use std::fmt::Write;

use skiff_symbols::{FunctionSymbol, TypeSymbol, Value};

use crate::node::{BoundBlockStatement, BoundExpression, BoundStatement};

const INDENT: &str = "    ";

/// Render a single statement on one line, without indentation.
/// Intended for the flat statements of a lowered body.
pub fn statement_line(statement: &BoundStatement) -> String {
    let mut out = String::new();
    write_statement(&mut out, statement, 0);
    out.trim_end().to_string()
}

/// Render an expression to a string.
pub fn expression_to_string(expression: &BoundExpression) -> String {
    let mut out = String::new();
    write_expression(&mut out, expression);
    out
}

/// Write a function header and its lowered body.
pub fn write_function(out: &mut String, function: &FunctionSymbol, body: &BoundBlockStatement) {
    write_function_header(out, function);
    out.push_str(" {\n");
    for statement in &body.statements {
        write_statement(out, statement, 1);
    }
    out.push_str("}\n");
}

/// Write `func name(p: ty, ...)` with the return type clause unless void.
pub fn write_function_header(out: &mut String, function: &FunctionSymbol) {
    out.push_str("func ");
    out.push_str(function.name());
    out.push('(');
    for (index, parameter) in function.parameters().iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        out.push_str(parameter.name());
        out.push_str(": ");
        out.push_str(parameter.ty().name());
    }
    out.push(')');
    if function.return_type() != TypeSymbol::Void {
        out.push_str(": ");
        out.push_str(function.return_type().name());
    }
}

/// Write a statement at the given indent level, terminated by a newline.
pub fn write_statement(out: &mut String, statement: &BoundStatement, indent: usize) {
    match statement {
        BoundStatement::Block(block) => {
            write_indent(out, indent);
            out.push_str("{\n");
            for child in &block.statements {
                write_statement(out, child, indent + 1);
            }
            write_indent(out, indent);
            out.push_str("}\n");
        }
        BoundStatement::VariableDeclaration(declaration) => {
            write_indent(out, indent);
            if declaration.variable.is_read_only() {
                out.push_str("const ");
            }
            out.push_str(declaration.variable.name());
            out.push_str(" := ");
            write_expression(out, &declaration.initializer);
            out.push('\n');
        }
        BoundStatement::If(node) => {
            write_indent(out, indent);
            out.push_str("if ");
            write_expression(out, &node.condition);
            out.push('\n');
            write_nested(out, &node.then_statement, indent);
            if let Some(else_statement) = &node.else_statement {
                write_indent(out, indent);
                out.push_str("else\n");
                write_nested(out, else_statement, indent);
            }
        }
        BoundStatement::For(node) => {
            write_indent(out, indent);
            out.push_str("for\n");
            write_nested(out, &node.body, indent);
        }
        BoundStatement::RangeFor(node) => {
            write_indent(out, indent);
            out.push_str("for ");
            out.push_str(node.variable.name());
            out.push_str(" := ");
            write_expression(out, &node.lower_bound);
            out.push_str(" ... ");
            write_expression(out, &node.upper_bound);
            out.push('\n');
            write_nested(out, &node.body, indent);
        }
        BoundStatement::Label(node) => {
            write_indent(out, indent);
            let _ = write!(out, "{}:", node.label);
            out.push('\n');
        }
        BoundStatement::Goto(node) => {
            write_indent(out, indent);
            let _ = write!(out, "goto {}", node.label);
            out.push('\n');
        }
        BoundStatement::ConditionalGoto(node) => {
            write_indent(out, indent);
            let keyword = if node.jump_if_true { "if" } else { "unless" };
            let _ = write!(out, "goto {} {} ", node.label, keyword);
            write_expression(out, &node.condition);
            out.push('\n');
        }
        BoundStatement::Return(node) => {
            write_indent(out, indent);
            out.push_str("return");
            if let Some(expression) = &node.expression {
                out.push(' ');
                write_expression(out, expression);
            }
            out.push('\n');
        }
        BoundStatement::Expression(node) => {
            write_indent(out, indent);
            write_expression(out, &node.expression);
            out.push('\n');
        }
    }
}

/// Write an expression, parenthesizing composite children.
pub fn write_expression(out: &mut String, expression: &BoundExpression) {
    match expression {
        BoundExpression::Error => out.push('?'),
        BoundExpression::Literal(node) => write_value(out, &node.value),
        BoundExpression::Variable(node) => out.push_str(node.variable.name()),
        BoundExpression::Assignment(node) => {
            out.push_str(node.variable.name());
            out.push_str(" = ");
            write_expression(out, &node.expression);
        }
        BoundExpression::Unary(node) => {
            out.push_str(node.operator.syntax_kind.text().unwrap_or("?"));
            write_operand(out, &node.operand);
        }
        BoundExpression::Binary(node) => {
            write_operand(out, &node.left);
            out.push(' ');
            out.push_str(node.operator.syntax_kind.text().unwrap_or("?"));
            out.push(' ');
            write_operand(out, &node.right);
        }
        BoundExpression::Call(node) => {
            out.push_str(node.function.name());
            write_arguments(out, &node.arguments);
        }
        BoundExpression::ImportedCall(node) => {
            out.push_str(node.package.name());
            out.push('.');
            out.push_str(node.function.name());
            write_arguments(out, &node.arguments);
        }
        BoundExpression::Conversion(node) => {
            out.push_str(node.ty.name());
            out.push('(');
            write_expression(out, &node.expression);
            out.push(')');
        }
    }
}

fn write_arguments(out: &mut String, arguments: &[std::sync::Arc<BoundExpression>]) {
    out.push('(');
    for (index, argument) in arguments.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        write_expression(out, argument);
    }
    out.push(')');
}

fn write_operand(out: &mut String, expression: &BoundExpression) {
    let composite = matches!(
        expression,
        BoundExpression::Binary(_) | BoundExpression::Unary(_) | BoundExpression::Assignment(_)
    );
    if composite {
        out.push('(');
    }
    write_expression(out, expression);
    if composite {
        out.push(')');
    }
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::String(text) => {
            let _ = write!(out, "{text:?}");
        }
        other => {
            let _ = write!(out, "{other}");
        }
    }
}

fn write_nested(out: &mut String, statement: &BoundStatement, indent: usize) {
    if matches!(statement, BoundStatement::Block(_)) {
        write_statement(out, statement, indent);
    } else {
        write_statement(out, statement, indent + 1);
    }
}

fn write_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str(INDENT);
    }
}
