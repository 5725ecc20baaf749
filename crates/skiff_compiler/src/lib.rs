//! skiff_compiler: Compilation orchestration.
//!
//! `Compilation` ties the pipeline together. It owns the syntax trees of
//! one submission, chains to the previous submission, computes the global
//! scope lazily, and drives binding, lowering, control flow analysis and
//! evaluation. The REPL keeps a chain of compilations alive; batch
//! compilation uses a single link.

use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use skiff_binder::node::{BoundBlockStatement, BoundStatement};
use skiff_binder::{printer, Binder, BoundGlobalScope, BoundProgram};
use skiff_core::TextSpan;
use skiff_diagnostics::{messages, Diagnostic, DiagnosticCollection};
use skiff_eval::{Evaluator, EvaluatorFault, Variables};
use skiff_flow::ControlFlowGraph;
use skiff_lowering::Lowerer;
use skiff_symbols::{FunctionSymbol, HostRegistry, TypeSymbol, Value};
use skiff_syntax::SyntaxTree;

/// Magic bytes at the start of an emitted artifact.
const EMIT_MAGIC: &[u8; 4] = b"SKBC";
/// Bumped whenever the artifact layout changes.
const EMIT_FORMAT_VERSION: u16 = 1;

/// File name of the control flow graph written on every evaluation,
/// placed in the system temp directory.
const CFG_ARTIFACT_FILE: &str = "skiff-cfg.dot";

/// The outcome of `Compilation::evaluate`.
///
/// Either `diagnostics` is non-empty and nothing ran, or it is empty and
/// `value` holds the result (`None` when the program produced no value).
#[derive(Debug)]
pub struct EvaluationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub value: Option<Value>,
}

/// The outcome of `Compilation::emit`.
#[derive(Debug)]
pub struct EmitResult {
    pub success: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// One compilation unit: a set of syntax trees bound against the chain of
/// previous submissions.
///
/// The global scope is computed on first use and published through a
/// single-assignment cell, so concurrent readers racing to trigger the
/// first bind converge on one shared result without locking.
pub struct Compilation {
    previous: Option<Arc<Compilation>>,
    syntax_trees: Vec<SyntaxTree>,
    host: Arc<HostRegistry>,
    global_scope: OnceLock<Arc<BoundGlobalScope>>,
}

impl Compilation {
    /// A compilation with no previous submission and no host imports.
    pub fn new(syntax_trees: Vec<SyntaxTree>) -> Compilation {
        Compilation::with_host(HostRegistry::new(), syntax_trees)
    }

    /// A compilation resolving `import` declarations against `host`.
    pub fn with_host(host: HostRegistry, syntax_trees: Vec<SyntaxTree>) -> Compilation {
        Compilation {
            previous: None,
            syntax_trees,
            host: Arc::new(host),
            global_scope: OnceLock::new(),
        }
    }

    /// A compilation that sees every symbol `previous` declared. The host
    /// registry is inherited.
    pub fn continue_with(previous: Arc<Compilation>, syntax_trees: Vec<SyntaxTree>) -> Compilation {
        Compilation {
            host: Arc::clone(&previous.host),
            previous: Some(previous),
            syntax_trees,
            global_scope: OnceLock::new(),
        }
    }

    /// The syntax trees of this submission (not of the chain).
    pub fn syntax_trees(&self) -> &[SyntaxTree] {
        &self.syntax_trees
    }

    /// The bound top level of this submission, computed on first call.
    pub fn global_scope(&self) -> &Arc<BoundGlobalScope> {
        self.global_scope.get_or_init(|| {
            let previous = self
                .previous
                .as_ref()
                .map(|previous| Arc::clone(previous.global_scope()));
            Arc::new(Binder::bind_global_scope(
                previous,
                &self.syntax_trees,
                &self.host,
            ))
        })
    }

    /// Evaluate the program against `variables`, which holds the global
    /// store and survives across submissions.
    ///
    /// Parse and binding diagnostics suppress evaluation entirely. A
    /// Graphviz rendering of the control flow graph is written to the
    /// temp directory as a side artifact, best effort.
    pub fn evaluate(&self, variables: &mut Variables) -> Result<EvaluationResult, EvaluatorFault> {
        let mut diagnostics = DiagnosticCollection::new();
        for tree in &self.syntax_trees {
            diagnostics.extend_from_slice(tree.diagnostics());
        }
        diagnostics.extend_from_slice(&self.global_scope().diagnostics);
        if !diagnostics.is_empty() {
            diagnostics.sort();
            return Ok(EvaluationResult {
                diagnostics: diagnostics.into_diagnostics(),
                value: None,
            });
        }

        let program = self.bind_program();

        let path = env::temp_dir().join(CFG_ARTIFACT_FILE);
        if let Ok(file) = File::create(path) {
            let mut writer = BufWriter::new(file);
            let _ = Self::select_control_flow_graph(&program).write_to(&mut writer);
        }

        if !program.diagnostics.is_empty() {
            return Ok(EvaluationResult {
                diagnostics: program.diagnostics,
                value: None,
            });
        }

        let value = Evaluator::new(&program, variables).evaluate()?;
        Ok(EvaluationResult {
            diagnostics: Vec::new(),
            value: match value {
                Value::Unit => None,
                value => Some(value),
            },
        })
    }

    /// Write a placeholder binary artifact to `path`: magic, format
    /// version, package name and function count. Diagnostics suppress the
    /// write the same way they suppress evaluation.
    pub fn emit(&self, path: &Path) -> io::Result<EmitResult> {
        let mut diagnostics = DiagnosticCollection::new();
        for tree in &self.syntax_trees {
            diagnostics.extend_from_slice(tree.diagnostics());
        }
        diagnostics.extend_from_slice(&self.global_scope().diagnostics);
        if !diagnostics.is_empty() {
            diagnostics.sort();
            return Ok(EmitResult {
                success: false,
                diagnostics: diagnostics.into_diagnostics(),
            });
        }

        let program = self.bind_program();
        if !program.diagnostics.is_empty() {
            return Ok(EmitResult {
                success: false,
                diagnostics: program.diagnostics,
            });
        }

        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(EMIT_MAGIC)?;
        writer.write_all(&EMIT_FORMAT_VERSION.to_le_bytes())?;
        let name = program.package_name.as_bytes();
        writer.write_all(&(name.len() as u16).to_le_bytes())?;
        writer.write_all(name)?;
        writer.write_all(&(program.functions.len() as u32).to_le_bytes())?;
        writer.flush()?;

        Ok(EmitResult {
            success: true,
            diagnostics: Vec::new(),
        })
    }

    /// Write the Graphviz control flow graph of the top-level block, or of
    /// the last declared function's body when the top level is empty.
    pub fn write_control_flow_graph<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        let program = self.bind_program();
        Self::select_control_flow_graph(&program).write_to(writer)
    }

    /// Pretty-print every lowered function body followed by the lowered
    /// top-level statements.
    pub fn write_program<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        let program = self.bind_program();
        let mut out = String::new();
        for (function, body) in &program.functions {
            printer::write_function(&mut out, function, body);
        }
        for statement in &program.statement.statements {
            printer::write_statement(&mut out, statement, 0);
        }
        writer.write_all(out.as_bytes())
    }

    /// Bind and lower every chained function body plus the newest
    /// submission's top-level statements.
    ///
    /// Bodies are re-bound per unit, oldest unit first, each against the
    /// scope chain as it was when that unit was bound; the function map
    /// therefore ends with the most recently declared function.
    fn bind_program(&self) -> BoundProgram {
        let scope = self.global_scope();
        let mut diagnostics = DiagnosticCollection::new();
        let mut functions: IndexMap<FunctionSymbol, Arc<BoundBlockStatement>, FxBuildHasher> =
            IndexMap::default();

        for unit in scope.chain() {
            for function in &unit.functions {
                let (body, body_diagnostics) = Binder::bind_function_body(&unit, function);
                let lowered = Lowerer::lower(&body);
                if function.return_type() != TypeSymbol::Void
                    && !ControlFlowGraph::all_paths_return(&lowered)
                {
                    diagnostics.add(Self::all_paths_diagnostic(function));
                }
                diagnostics.extend(body_diagnostics);
                functions.insert(function.clone(), lowered);
            }
        }

        let statement = Lowerer::lower(&Arc::new(BoundStatement::Block(BoundBlockStatement {
            statements: scope.statements.clone(),
        })));

        diagnostics.sort();
        BoundProgram {
            package_name: scope.package_name.clone(),
            diagnostics: diagnostics.into_diagnostics(),
            functions,
            statement,
        }
    }

    fn all_paths_diagnostic(function: &FunctionSymbol) -> Diagnostic {
        // Declared functions always carry their declaration; the span is
        // the function name.
        let span = function
            .declaration()
            .map(|declaration| declaration.identifier.span)
            .unwrap_or_else(|| TextSpan::new(0, 0));
        let mut diagnostic = Diagnostic::new(span, &messages::ALL_PATHS_MUST_RETURN, &[]);
        if let Some(file) = function.source().and_then(|source| source.file_name()) {
            diagnostic = diagnostic.with_file(file);
        }
        diagnostic
    }

    /// The block the side artifact and `--cfg` render: the top-level
    /// statements, unless there are none and a function exists.
    fn select_control_flow_graph(program: &BoundProgram) -> ControlFlowGraph {
        if program.statement.statements.is_empty() {
            if let Some((_, body)) = program.functions.last() {
                return ControlFlowGraph::create(body);
            }
        }
        ControlFlowGraph::create(&program.statement)
    }
}
