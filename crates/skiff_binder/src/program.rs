//! Results of the two binding phases.
//!
//! `BoundGlobalScope` is the per-submission surface: declared symbols,
//! imports, and bound top-level statements, chained to the scope of the
//! previous submission. `BoundProgram` is the executable form: every
//! chained function body lowered, plus the newest submission's
//! top-level statements as one flat block.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use skiff_diagnostics::Diagnostic;
use skiff_symbols::{FunctionSymbol, PackageSymbol, VariableSymbol};

use crate::node::{BoundBlockStatement, BoundStatement};

/// Everything one submission declares, linked to the submission before it.
#[derive(Debug)]
pub struct BoundGlobalScope {
    pub previous: Option<Arc<BoundGlobalScope>>,
    pub package_name: String,
    pub diagnostics: Vec<Diagnostic>,
    /// Packages visible to this submission: inherited plus newly imported.
    pub packages: Vec<PackageSymbol>,
    /// Functions declared by this submission, in declaration order.
    pub functions: Vec<FunctionSymbol>,
    /// Global variables declared by this submission, in declaration order.
    pub variables: Vec<VariableSymbol>,
    /// Bound top-level statements of this submission.
    pub statements: Vec<Arc<BoundStatement>>,
}

impl BoundGlobalScope {
    /// The chain of submissions, oldest first.
    pub fn chain(self: &Arc<Self>) -> Vec<Arc<BoundGlobalScope>> {
        let mut chain = Vec::new();
        let mut current = Some(Arc::clone(self));
        while let Some(scope) = current {
            current = scope.previous.clone();
            chain.push(scope);
        }
        chain.reverse();
        chain
    }
}

/// A fully bound and lowered program, ready to evaluate.
#[derive(Debug)]
pub struct BoundProgram {
    pub package_name: String,
    pub diagnostics: Vec<Diagnostic>,
    /// Lowered body for every chained function, oldest declaration first.
    pub functions: IndexMap<FunctionSymbol, Arc<BoundBlockStatement>, FxBuildHasher>,
    /// The newest submission's top-level statements, lowered.
    pub statement: Arc<BoundBlockStatement>,
}
