//! Built-in functions.
//!
//! Each built-in is a process-wide singleton so the evaluator can dispatch
//! on symbol identity no matter which compilation resolved the call.

use std::sync::OnceLock;

use crate::symbol::{FunctionSymbol, ParameterSymbol};
use crate::types::TypeSymbol;

/// `print(text: string): void` writes a line to standard output.
pub fn print() -> FunctionSymbol {
    static PRINT: OnceLock<FunctionSymbol> = OnceLock::new();
    PRINT
        .get_or_init(|| {
            FunctionSymbol::new(
                "print",
                vec![ParameterSymbol::new("text", TypeSymbol::String)],
                TypeSymbol::Void,
            )
        })
        .clone()
}

/// `input(): string` reads a line from standard input.
pub fn input() -> FunctionSymbol {
    static INPUT: OnceLock<FunctionSymbol> = OnceLock::new();
    INPUT
        .get_or_init(|| FunctionSymbol::new("input", Vec::new(), TypeSymbol::String))
        .clone()
}

/// `rnd(max: int): int` returns a pseudo-random integer in `[0, max)`.
pub fn rnd() -> FunctionSymbol {
    static RND: OnceLock<FunctionSymbol> = OnceLock::new();
    RND.get_or_init(|| {
        FunctionSymbol::new(
            "rnd",
            vec![ParameterSymbol::new("max", TypeSymbol::Int)],
            TypeSymbol::Int,
        )
    })
    .clone()
}

/// Every built-in, for seeding the root scope.
pub fn all() -> Vec<FunctionSymbol> {
    vec![print(), input(), rnd()]
}
