//! Variable and function symbols.
//!
//! Symbols are cheap-to-clone handles over shared immutable data. Equality
//! and hashing go by handle identity, never by name: two same-named
//! declarations from different submissions are distinct symbols, and a
//! re-bound built-in stays the same symbol everywhere.

use std::sync::Arc;

use skiff_core::SourceText;
use skiff_syntax::FunctionDeclarationSyntax;

use crate::types::TypeSymbol;

/// The kind of a named symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    GlobalVariable,
    LocalVariable,
    Parameter,
    Type,
    Package,
    ImportedClass,
    ImportedFunction,
}

/// Implements identity equality and hashing for an `Arc`-backed handle.
macro_rules! ptr_identity {
    ($ty:ident) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                ::std::sync::Arc::ptr_eq(&self.0, &other.0)
            }
        }

        impl Eq for $ty {}

        impl ::std::hash::Hash for $ty {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                ::std::ptr::hash(::std::sync::Arc::as_ptr(&self.0), state);
            }
        }
    };
}
pub(crate) use ptr_identity;

// ============================================================================
// Variables
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Global,
    Local,
    Parameter,
}

#[derive(Debug)]
struct VariableData {
    name: String,
    kind: VariableKind,
    is_read_only: bool,
    ty: TypeSymbol,
}

/// A declared variable. Identity-compared.
#[derive(Debug, Clone)]
pub struct VariableSymbol(Arc<VariableData>);

ptr_identity!(VariableSymbol);

impl VariableSymbol {
    fn new(name: impl Into<String>, kind: VariableKind, is_read_only: bool, ty: TypeSymbol) -> Self {
        Self(Arc::new(VariableData {
            name: name.into(),
            kind,
            is_read_only,
            ty,
        }))
    }

    /// A top-level variable, stored in the global store.
    pub fn global(name: impl Into<String>, is_read_only: bool, ty: TypeSymbol) -> Self {
        Self::new(name, VariableKind::Global, is_read_only, ty)
    }

    /// A variable local to a function body, stored in its frame.
    pub fn local(name: impl Into<String>, is_read_only: bool, ty: TypeSymbol) -> Self {
        Self::new(name, VariableKind::Local, is_read_only, ty)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[inline]
    pub fn kind(&self) -> VariableKind {
        self.0.kind
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.0.is_read_only
    }

    #[inline]
    pub fn ty(&self) -> TypeSymbol {
        self.0.ty
    }

    pub fn symbol_kind(&self) -> SymbolKind {
        match self.0.kind {
            VariableKind::Global => SymbolKind::GlobalVariable,
            VariableKind::Local => SymbolKind::LocalVariable,
            VariableKind::Parameter => SymbolKind::Parameter,
        }
    }
}

/// A function parameter: a read-only variable in the function's frame.
///
/// The wrapper shares the inner handle, so the parameter declared in the
/// function signature and the variable looked up in the body are the same
/// symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterSymbol(VariableSymbol);

impl ParameterSymbol {
    pub fn new(name: impl Into<String>, ty: TypeSymbol) -> Self {
        Self(VariableSymbol::new(name, VariableKind::Parameter, true, ty))
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.0.name()
    }

    #[inline]
    pub fn ty(&self) -> TypeSymbol {
        self.0.ty()
    }

    /// The variable handle this parameter declares.
    #[inline]
    pub fn as_variable(&self) -> &VariableSymbol {
        &self.0
    }
}

// ============================================================================
// Functions
// ============================================================================

#[derive(Debug)]
struct FunctionData {
    name: String,
    parameters: Vec<ParameterSymbol>,
    return_type: TypeSymbol,
    declaration: Option<Arc<FunctionDeclarationSyntax>>,
    source: Option<Arc<SourceText>>,
}

/// A declared or built-in function. Identity-compared.
#[derive(Debug, Clone)]
pub struct FunctionSymbol(Arc<FunctionData>);

ptr_identity!(FunctionSymbol);

impl FunctionSymbol {
    /// A function without a declaration site (built-ins).
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<ParameterSymbol>,
        return_type: TypeSymbol,
    ) -> Self {
        Self(Arc::new(FunctionData {
            name: name.into(),
            parameters,
            return_type,
            declaration: None,
            source: None,
        }))
    }

    /// A function declared in source. The symbol keeps its declaration and
    /// the unit it came from so the body can be bound later.
    pub fn with_declaration(
        name: impl Into<String>,
        parameters: Vec<ParameterSymbol>,
        return_type: TypeSymbol,
        declaration: Arc<FunctionDeclarationSyntax>,
        source: Arc<SourceText>,
    ) -> Self {
        Self(Arc::new(FunctionData {
            name: name.into(),
            parameters,
            return_type,
            declaration: Some(declaration),
            source: Some(source),
        }))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[inline]
    pub fn parameters(&self) -> &[ParameterSymbol] {
        &self.0.parameters
    }

    #[inline]
    pub fn return_type(&self) -> TypeSymbol {
        self.0.return_type
    }

    #[inline]
    pub fn declaration(&self) -> Option<&Arc<FunctionDeclarationSyntax>> {
        self.0.declaration.as_ref()
    }

    #[inline]
    pub fn source(&self) -> Option<&Arc<SourceText>> {
        self.0.source.as_ref()
    }
}
