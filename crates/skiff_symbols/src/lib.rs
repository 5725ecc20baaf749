//! skiff_symbols: Symbols, types, values and the host import registry.
//!
//! The symbol model the binder and evaluator share: the closed type set,
//! runtime values, identity-compared symbol handles, the built-in functions,
//! and the host-supplied package registry that backs `import`.

pub mod builtins;
pub mod host;
pub mod symbol;
pub mod types;
pub mod value;

// Re-export key types
pub use host::{
    HostCallback, HostRegistry, HostSignature, ImportedClassSymbol, ImportedFunctionSymbol,
    PackageSymbol,
};
pub use symbol::{FunctionSymbol, ParameterSymbol, SymbolKind, VariableKind, VariableSymbol};
pub use types::TypeSymbol;
pub use value::Value;
