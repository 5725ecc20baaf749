//! Lowering tests: structured statements become flat label/jump lists.

use std::sync::Arc;

use skiff_binder::node::{BoundBlockStatement, BoundExpression, BoundStatement};
use skiff_binder::operators::BoundBinaryOperatorKind;
use skiff_binder::Binder;
use skiff_lowering::Lowerer;
use skiff_symbols::HostRegistry;
use skiff_syntax::SyntaxTree;

// ============================================================================
// Helpers
// ============================================================================

/// Binds `source` as a single top-level submission and returns its
/// statements wrapped in one block. Fails the test on any diagnostic.
fn bind(source: &str) -> Arc<BoundStatement> {
    let tree = SyntaxTree::parse(source);
    assert!(
        tree.diagnostics().is_empty(),
        "unexpected parse diagnostics for {:?}: {:?}",
        source,
        tree.diagnostics()
    );
    let scope = Binder::bind_global_scope(None, std::slice::from_ref(&tree), &HostRegistry::new());
    assert!(
        scope.diagnostics.is_empty(),
        "unexpected diagnostics for {:?}: {:?}",
        source,
        scope.diagnostics
    );
    Arc::new(BoundStatement::Block(BoundBlockStatement {
        statements: scope.statements,
    }))
}

fn lower(source: &str) -> Arc<BoundBlockStatement> {
    Lowerer::lower(&bind(source))
}

fn kinds(block: &BoundBlockStatement) -> Vec<&'static str> {
    block.statements.iter().map(|s| s.kind_name()).collect()
}

/// The label a `Label`, `Goto` or `ConditionalGoto` statement carries.
fn label_of(statement: &BoundStatement) -> &str {
    match statement {
        BoundStatement::Label(s) => s.label.name(),
        BoundStatement::Goto(s) => s.label.name(),
        BoundStatement::ConditionalGoto(s) => s.label.name(),
        other => panic!("statement {} carries no label", other.kind_name()),
    }
}

// ============================================================================
// If statements
// ============================================================================

#[test]
fn test_if_without_else_lowers_to_goto_false() {
    let lowered = lower("x := 0\nif x == 0 {\n    x = 1\n}");
    assert_eq!(
        kinds(&lowered),
        [
            "VariableDeclaration",
            "ConditionalGotoStatement",
            "ExpressionStatement",
            "LabelStatement",
        ]
    );
    match lowered.statements[1].as_ref() {
        BoundStatement::ConditionalGoto(goto) => {
            assert!(!goto.jump_if_true);
            assert_eq!(goto.label.name(), "Label1");
        }
        other => panic!("expected a conditional goto, got {}", other.kind_name()),
    }
    assert_eq!(label_of(&lowered.statements[3]), "Label1");
}

#[test]
fn test_if_else_lowers_to_two_jumps() {
    let lowered = lower("x := 0\nif x == 0 {\n    x = 1\n} else {\n    x = 2\n}");
    assert_eq!(
        kinds(&lowered),
        [
            "VariableDeclaration",
            "ConditionalGotoStatement",
            "ExpressionStatement",
            "GotoStatement",
            "LabelStatement",
            "ExpressionStatement",
            "LabelStatement",
        ]
    );
    // The false branch of the condition jumps over the then body.
    assert_eq!(label_of(&lowered.statements[1]), "Label1");
    assert_eq!(label_of(&lowered.statements[4]), "Label1");
    // The then body jumps over the else body.
    assert_eq!(label_of(&lowered.statements[3]), "Label2");
    assert_eq!(label_of(&lowered.statements[6]), "Label2");
}

// ============================================================================
// Loops
// ============================================================================

#[test]
fn test_infinite_for_lowers_to_loop_labels() {
    let lowered = lower("for {\n    break\n}");
    assert_eq!(
        kinds(&lowered),
        [
            "LabelStatement",
            "GotoStatement",
            "GotoStatement",
            "LabelStatement",
        ]
    );
    assert_eq!(label_of(&lowered.statements[0]), "continue1");
    assert_eq!(label_of(&lowered.statements[1]), "break1");
    assert_eq!(label_of(&lowered.statements[2]), "continue1");
    assert_eq!(label_of(&lowered.statements[3]), "break1");
}

#[test]
fn test_range_for_lowers_to_counted_loop() {
    let lowered = lower("for i := 1 ... 3 {\n    print(\"x\")\n}");
    assert_eq!(
        kinds(&lowered),
        [
            "VariableDeclaration",
            "VariableDeclaration",
            "GotoStatement",
            "LabelStatement",
            "ExpressionStatement",
            "LabelStatement",
            "ExpressionStatement",
            "LabelStatement",
            "ConditionalGotoStatement",
            "LabelStatement",
        ]
    );

    // The bound is captured in a read-only helper variable.
    match lowered.statements[1].as_ref() {
        BoundStatement::VariableDeclaration(declaration) => {
            assert_eq!(declaration.variable.name(), "upperBound");
            assert!(declaration.variable.is_read_only());
        }
        other => panic!("expected a declaration, got {}", other.kind_name()),
    }

    // Entry jumps to the check, which jumps back to the body.
    assert_eq!(label_of(&lowered.statements[2]), "Label2");
    assert_eq!(label_of(&lowered.statements[3]), "Label1");
    assert_eq!(label_of(&lowered.statements[5]), "continue1");
    assert_eq!(label_of(&lowered.statements[7]), "Label2");
    assert_eq!(label_of(&lowered.statements[9]), "break1");

    // The continue target increments the loop variable.
    match lowered.statements[6].as_ref() {
        BoundStatement::Expression(statement) => match statement.expression.as_ref() {
            BoundExpression::Assignment(assignment) => {
                assert_eq!(assignment.variable.name(), "i");
                match assignment.expression.as_ref() {
                    BoundExpression::Binary(binary) => {
                        assert_eq!(binary.operator.kind, BoundBinaryOperatorKind::Addition);
                    }
                    other => panic!("expected an addition, got {}", other.kind_name()),
                }
            }
            other => panic!("expected an assignment, got {}", other.kind_name()),
        },
        other => panic!("expected an expression statement, got {}", other.kind_name()),
    }

    // The check compares against the captured bound and jumps on true.
    match lowered.statements[8].as_ref() {
        BoundStatement::ConditionalGoto(goto) => {
            assert!(goto.jump_if_true);
            assert_eq!(goto.label.name(), "Label1");
            match goto.condition.as_ref() {
                BoundExpression::Binary(binary) => {
                    assert_eq!(binary.operator.kind, BoundBinaryOperatorKind::LessOrEquals);
                }
                other => panic!("expected a comparison, got {}", other.kind_name()),
            }
        }
        other => panic!("expected a conditional goto, got {}", other.kind_name()),
    }
}

#[test]
fn test_continue_lowers_to_goto_continue_label() {
    let lowered = lower("for i := 1 ... 3 {\n    continue\n}");
    let gotos: Vec<_> = lowered
        .statements
        .iter()
        .filter_map(|s| match s.as_ref() {
            BoundStatement::Goto(goto) => Some(goto.label.name()),
            _ => None,
        })
        .collect();
    assert!(gotos.contains(&"continue1"), "gotos were {:?}", gotos);
}

// ============================================================================
// Flattening and idempotence
// ============================================================================

#[test]
fn test_nested_control_flow_is_fully_flat() {
    let lowered = lower(
        "for i := 1 ... 10 {\n    if i == 2 {\n        continue\n    } else {\n        print(\"x\")\n    }\n}",
    );
    for statement in &lowered.statements {
        match statement.as_ref() {
            BoundStatement::Block(_)
            | BoundStatement::If(_)
            | BoundStatement::For(_)
            | BoundStatement::RangeFor(_) => {
                panic!("structured statement survived lowering: {}", statement.kind_name())
            }
            _ => {}
        }
    }
}

#[test]
fn test_lowering_an_already_flat_program_shares_statements() {
    let bound = bind("x := 1\nprint(\"a\")");
    let originals = match bound.as_ref() {
        BoundStatement::Block(block) => block.statements.clone(),
        other => panic!("expected a block, got {}", other.kind_name()),
    };
    let lowered = Lowerer::lower(&bound);
    assert_eq!(lowered.statements.len(), originals.len());
    for (lowered, original) in lowered.statements.iter().zip(&originals) {
        assert!(Arc::ptr_eq(lowered, original));
    }
}

#[test]
fn test_lowering_is_idempotent() {
    let first = lower("x := 0\nif x == 0 {\n    x = 1\n}\nfor {\n    break\n}");
    let again = Lowerer::lower(&Arc::new(BoundStatement::Block(BoundBlockStatement {
        statements: first.statements.clone(),
    })));
    assert_eq!(first.statements.len(), again.statements.len());
    for (first, again) in first.statements.iter().zip(&again.statements) {
        assert!(Arc::ptr_eq(first, again));
    }
}
