//! Lexical scopes for the binder.
//!
//! A scope maps names to symbols and chains to its parent. Declaring
//! a name that already exists in the same scope fails; lookup falls
//! back through the chain. Insertion order is preserved so declared
//! symbols can be reported back in source order.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use skiff_symbols::{FunctionSymbol, VariableSymbol};

/// A name bound in a scope.
#[derive(Debug, Clone)]
pub enum Symbol {
    Variable(VariableSymbol),
    Function(FunctionSymbol),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Variable(variable) => variable.name(),
            Symbol::Function(function) => function.name(),
        }
    }
}

/// One level of the scope chain.
#[derive(Debug, Default)]
pub struct BoundScope {
    parent: Option<Box<BoundScope>>,
    symbols: IndexMap<String, Symbol, FxBuildHasher>,
}

impl BoundScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: BoundScope) -> Self {
        Self {
            parent: Some(Box::new(parent)),
            symbols: IndexMap::default(),
        }
    }

    /// Declare a variable in this scope. Fails if the name is taken here;
    /// shadowing an outer scope is fine.
    pub fn try_declare_variable(&mut self, variable: VariableSymbol) -> bool {
        self.try_declare(Symbol::Variable(variable))
    }

    /// Declare a function in this scope. Fails if the name is taken here.
    pub fn try_declare_function(&mut self, function: FunctionSymbol) -> bool {
        self.try_declare(Symbol::Function(function))
    }

    fn try_declare(&mut self, symbol: Symbol) -> bool {
        let name = symbol.name().to_string();
        if self.symbols.contains_key(&name) {
            return false;
        }
        self.symbols.insert(name, symbol);
        true
    }

    /// Resolve a name here or in any ancestor scope.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        match self.symbols.get(name) {
            Some(symbol) => Some(symbol),
            None => self.parent.as_deref()?.lookup(name),
        }
    }

    /// Variables declared directly in this scope, in declaration order.
    pub fn declared_variables(&self) -> Vec<VariableSymbol> {
        self.symbols
            .values()
            .filter_map(|symbol| match symbol {
                Symbol::Variable(variable) => Some(variable.clone()),
                _ => None,
            })
            .collect()
    }

    /// Functions declared directly in this scope, in declaration order.
    pub fn declared_functions(&self) -> Vec<FunctionSymbol> {
        self.symbols
            .values()
            .filter_map(|symbol| match symbol {
                Symbol::Function(function) => Some(function.clone()),
                _ => None,
            })
            .collect()
    }

    /// Detach and return the parent scope, leaving the chain one level
    /// shorter. Returns an empty root if this already was the root.
    pub fn take_parent(&mut self) -> BoundScope {
        debug_assert!(self.parent.is_some(), "popped the root scope");
        match self.parent.take() {
            Some(parent) => *parent,
            None => BoundScope::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_symbols::TypeSymbol;

    #[test]
    fn test_declare_once_per_scope() {
        let mut scope = BoundScope::new();
        let x = VariableSymbol::global("x".to_string(), false, TypeSymbol::Int);
        assert!(scope.try_declare_variable(x));
        let shadow = VariableSymbol::global("x".to_string(), false, TypeSymbol::String);
        assert!(!scope.try_declare_variable(shadow));
    }

    #[test]
    fn test_lookup_walks_chain() {
        let mut root = BoundScope::new();
        root.try_declare_variable(VariableSymbol::global(
            "x".to_string(),
            false,
            TypeSymbol::Int,
        ));
        let child = BoundScope::with_parent(root);
        assert!(matches!(child.lookup("x"), Some(Symbol::Variable(_))));
        assert!(child.lookup("y").is_none());
    }

    #[test]
    fn test_inner_declaration_shadows_outer() {
        let mut root = BoundScope::new();
        root.try_declare_variable(VariableSymbol::global(
            "x".to_string(),
            false,
            TypeSymbol::Int,
        ));
        let mut child = BoundScope::with_parent(root);
        let inner = VariableSymbol::local("x".to_string(), false, TypeSymbol::String);
        assert!(child.try_declare_variable(inner));
        match child.lookup("x") {
            Some(Symbol::Variable(variable)) => assert_eq!(variable.ty(), TypeSymbol::String),
            other => panic!("expected shadowing variable, got {other:?}"),
        }
    }

    #[test]
    fn test_declared_symbols_preserve_order() {
        let mut scope = BoundScope::new();
        for name in ["c", "a", "b"] {
            scope.try_declare_variable(VariableSymbol::global(
                name.to_string(),
                false,
                TypeSymbol::Int,
            ));
        }
        let names: Vec<_> = scope
            .declared_variables()
            .iter()
            .map(|v| v.name().to_string())
            .collect();
        assert_eq!(names, ["c", "a", "b"]);
    }
}
