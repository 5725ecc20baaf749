//! End-to-end tests for `Compilation`: evaluation, diagnostic gating,
//! submission chaining, emit and the program/CFG writers.

use std::sync::Arc;

use skiff_compiler::{Compilation, EvaluationResult};
use skiff_eval::{EvaluatorFault, Variables};
use skiff_symbols::{
    HostRegistry, HostSignature, ImportedFunctionSymbol, PackageSymbol, TypeSymbol, Value,
};
use skiff_syntax::SyntaxTree;

// ============================================================================
// Helpers
// ============================================================================

fn compile(source: &str) -> Compilation {
    Compilation::new(vec![SyntaxTree::parse(source)])
}

fn evaluate(source: &str) -> EvaluationResult {
    let mut variables = Variables::default();
    compile(source).evaluate(&mut variables).unwrap()
}

fn value_of(source: &str) -> Value {
    let result = evaluate(source);
    assert!(
        result.diagnostics.is_empty(),
        "unexpected diagnostics for {:?}: {:?}",
        source,
        result.diagnostics
    );
    result.value.expect("expected a value")
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_well_typed_program_evaluates_without_diagnostics() {
    let source = "func add(a: int, b: int): int {\n    return a + b\n}\nadd(2, 3)";
    let result = evaluate(source);
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.value, Some(Value::Int(5)));
}

#[test]
fn test_void_program_yields_no_value() {
    let source = "func noop() {\n}\nnoop()";
    let result = evaluate(source);
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.value, None);
}

#[test]
fn test_fault_is_returned_not_converted_to_a_diagnostic() {
    let mut variables = Variables::default();
    let fault = compile("1 / 0").evaluate(&mut variables).unwrap_err();
    assert!(matches!(fault, EvaluatorFault::DivisionByZero));
}

// ============================================================================
// Diagnostic gating
// ============================================================================

#[test]
fn test_type_error_reports_one_diagnostic_and_no_value() {
    let result = evaluate("x := 1\nx = \"s\"");
    assert_eq!(result.diagnostics.len(), 1, "{:?}", result.diagnostics);
    assert!(result.diagnostics[0].message_text.contains("Cannot convert"));
    assert_eq!(result.value, None);
}

#[test]
fn test_parse_diagnostics_suppress_evaluation() {
    let result = evaluate("x := (1");
    assert!(!result.diagnostics.is_empty());
    assert_eq!(result.value, None);
}

#[test]
fn test_missing_return_path_is_reported_on_the_function_name() {
    let source = "func f(): int {\n    if true {\n        return 1\n    }\n}";
    let result = evaluate(source);
    assert_eq!(result.diagnostics.len(), 1, "{:?}", result.diagnostics);
    assert_eq!(result.diagnostics[0].code, 3001);
    // The span points at the name, not the body.
    let span = result.diagnostics[0].span;
    assert_eq!(&source[span.to_range()], "f");
    assert_eq!(result.value, None);
}

#[test]
fn test_diagnostics_are_sorted_by_span() {
    let result = evaluate("y = 1\nz = 2");
    assert_eq!(result.diagnostics.len(), 2);
    assert!(result.diagnostics[0].span.start < result.diagnostics[1].span.start);
}

// ============================================================================
// Submission chaining
// ============================================================================

#[test]
fn test_later_submissions_see_earlier_symbols() {
    let mut variables = Variables::default();
    let first = Arc::new(Compilation::new(vec![SyntaxTree::parse(
        "x := 10\nfunc double(n: int): int {\n    return n * 2\n}",
    )]));
    let result = first.evaluate(&mut variables).unwrap();
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);

    let second = Compilation::continue_with(Arc::clone(&first), vec![SyntaxTree::parse(
        "double(x + 1)",
    )]);
    let result = second.evaluate(&mut variables).unwrap();
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.value, Some(Value::Int(22)));
}

#[test]
fn test_redeclaration_in_a_later_submission_shadows() {
    let mut variables = Variables::default();
    let first = Arc::new(Compilation::new(vec![SyntaxTree::parse("x := 1")]));
    first.evaluate(&mut variables).unwrap();

    // Same name, new symbol: the old binding stays in the store.
    let second = Compilation::continue_with(first, vec![SyntaxTree::parse("x := \"next\"\nx")]);
    let result = second.evaluate(&mut variables).unwrap();
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.value, Some(Value::from("next")));
    assert_eq!(variables.len(), 2);
}

#[test]
fn test_diagnostics_accumulate_down_the_chain() {
    let first = Arc::new(Compilation::new(vec![SyntaxTree::parse("missing + 1")]));
    let second = Compilation::continue_with(first, vec![SyntaxTree::parse("1 + 1")]);
    let mut variables = Variables::default();
    let result = second.evaluate(&mut variables).unwrap();
    // The chained unit's error still gates evaluation; the REPL avoids
    // this by only chaining successful submissions.
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.value, None);
}

// ============================================================================
// Host imports
// ============================================================================

#[test]
fn test_imports_resolve_through_the_host_registry() {
    let mut host = HostRegistry::new();
    host.register_package(PackageSymbol::new(
        "strings",
        vec![ImportedFunctionSymbol::new(
            "upper",
            vec![HostSignature::new(
                vec![TypeSymbol::String],
                TypeSymbol::String,
                |arguments| match arguments[0].as_string() {
                    Some(text) => Value::from(text.to_uppercase().as_str()),
                    None => Value::from(""),
                },
            )],
        )],
        Vec::new(),
    ));
    let compilation = Compilation::with_host(
        host,
        vec![SyntaxTree::parse("import strings\nstrings.upper(\"abc\")")],
    );
    let mut variables = Variables::default();
    let result = compilation.evaluate(&mut variables).unwrap();
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.value, Some(Value::from("ABC")));
}

// ============================================================================
// Package names
// ============================================================================

#[test]
fn test_package_clause_names_the_unit() {
    assert_eq!(compile("package calc").global_scope().package_name, "calc");
    assert_eq!(compile("1 + 1").global_scope().package_name, "main");
}

// ============================================================================
// Emit
// ============================================================================

#[test]
fn test_emit_writes_the_placeholder_artifact() {
    let path = std::env::temp_dir().join("skiff-emit-artifact-test.skbc");
    let compilation = compile("package calc\nfunc one(): int {\n    return 1\n}");
    let result = compilation.emit(&path).unwrap();
    assert!(result.success);
    assert!(result.diagnostics.is_empty());

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[0..4], b"SKBC");
    assert!(bytes.windows(4).any(|window| window == b"calc"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_emit_is_suppressed_by_diagnostics() {
    let path = std::env::temp_dir().join("skiff-emit-suppressed-test.skbc");
    let _ = std::fs::remove_file(&path);
    let result = compile("x = 1").emit(&path).unwrap();
    assert!(!result.success);
    assert!(!result.diagnostics.is_empty());
    assert!(!path.exists());
}

// ============================================================================
// Writers and the side artifact
// ============================================================================

#[test]
fn test_write_control_flow_graph_renders_dot() {
    let mut out = Vec::new();
    compile("x := 0\nif x == 0 {\n    x = 1\n}")
        .write_control_flow_graph(&mut out)
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("digraph G {"), "{text}");
    assert!(text.contains("shape = box"), "{text}");
    assert!(text.contains("x == 0"), "{text}");
}

#[test]
fn test_cfg_falls_back_to_the_last_function_when_top_level_is_empty() {
    let mut out = Vec::new();
    compile("func f(): int {\n    return 100\n}\nfunc g(): int {\n    return 200\n}")
        .write_control_flow_graph(&mut out)
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("200"), "{text}");
    assert!(!text.contains("100"), "{text}");
}

#[test]
fn test_write_program_shows_the_lowered_form() {
    let mut out = Vec::new();
    compile("func f(a: int): int {\n    if a > 0 {\n        return 1\n    }\n    return 2\n}")
        .write_program(&mut out)
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("func f(a: int): int {"), "{text}");
    // Structured control flow is gone after lowering.
    assert!(text.contains("goto"), "{text}");
    assert!(!text.contains("if a > 0\n"), "{text}");
}

#[test]
fn test_evaluate_writes_the_cfg_side_artifact() {
    value_of("1 + 2");
    let path = std::env::temp_dir().join("skiff-cfg.dot");
    assert!(path.exists());
}

// ============================================================================
// Fixture programs
// ============================================================================

#[test]
fn test_fib_fixture() {
    let source = include_str!("../../../tests/fixtures/fib.sk");
    assert_eq!(value_of(source), Value::Int(55));
}

#[test]
fn test_primes_fixture() {
    let source = include_str!("../../../tests/fixtures/primes.sk");
    assert_eq!(value_of(source), Value::Int(15));
}

#[test]
fn test_collatz_fixture() {
    let source = include_str!("../../../tests/fixtures/collatz.sk");
    assert_eq!(value_of(source), Value::Int(111));
}
