//! Host import registry.
//!
//! `import name` resolves against a registry of packages supplied by the
//! embedding application. Each imported function carries one or more host
//! signatures; a signature pairs positional parameter types with a callback
//! the evaluator invokes directly. Nothing here is discovered by reflection;
//! the host declares exactly what scripts may call.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::symbol::ptr_identity;
use crate::types::TypeSymbol;
use crate::value::Value;

/// The host side of an imported function.
pub type HostCallback = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// One overload of an imported function.
#[derive(Clone)]
pub struct HostSignature {
    pub parameter_types: Vec<TypeSymbol>,
    pub return_type: TypeSymbol,
    pub callback: HostCallback,
}

impl HostSignature {
    pub fn new(
        parameter_types: Vec<TypeSymbol>,
        return_type: TypeSymbol,
        callback: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            parameter_types,
            return_type,
            callback: Arc::new(callback),
        }
    }

    /// Whether the argument types match this overload positionally.
    pub fn matches(&self, argument_types: &[TypeSymbol]) -> bool {
        self.parameter_types.as_slice() == argument_types
    }
}

impl fmt::Debug for HostSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostSignature")
            .field("parameter_types", &self.parameter_types)
            .field("return_type", &self.return_type)
            .field("callback", &"<host callback>")
            .finish()
    }
}

// ============================================================================
// Imported symbols
// ============================================================================

#[derive(Debug)]
struct ImportedFunctionData {
    name: String,
    signatures: Vec<HostSignature>,
}

/// A function exposed by a package. Identity-compared.
#[derive(Debug, Clone)]
pub struct ImportedFunctionSymbol(Arc<ImportedFunctionData>);

ptr_identity!(ImportedFunctionSymbol);

impl ImportedFunctionSymbol {
    pub fn new(name: impl Into<String>, signatures: Vec<HostSignature>) -> Self {
        Self(Arc::new(ImportedFunctionData {
            name: name.into(),
            signatures,
        }))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[inline]
    pub fn signatures(&self) -> &[HostSignature] {
        &self.0.signatures
    }

    /// The unique overload matching the argument types, if any.
    pub fn find_signature(&self, argument_types: &[TypeSymbol]) -> Option<&HostSignature> {
        self.0.signatures.iter().find(|s| s.matches(argument_types))
    }
}

#[derive(Debug)]
struct ImportedClassData {
    name: String,
    methods: Vec<ImportedFunctionSymbol>,
}

/// A class exposed by a package. Present in the symbol model, but the
/// accessor path never reaches methods; only package functions bind.
#[derive(Debug, Clone)]
pub struct ImportedClassSymbol(Arc<ImportedClassData>);

ptr_identity!(ImportedClassSymbol);

impl ImportedClassSymbol {
    pub fn new(name: impl Into<String>, methods: Vec<ImportedFunctionSymbol>) -> Self {
        Self(Arc::new(ImportedClassData {
            name: name.into(),
            methods,
        }))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[inline]
    pub fn methods(&self) -> &[ImportedFunctionSymbol] {
        &self.0.methods
    }
}

#[derive(Debug)]
struct PackageData {
    name: String,
    functions: Vec<ImportedFunctionSymbol>,
    classes: Vec<ImportedClassSymbol>,
}

/// An importable package. Identity-compared.
#[derive(Debug, Clone)]
pub struct PackageSymbol(Arc<PackageData>);

ptr_identity!(PackageSymbol);

impl PackageSymbol {
    pub fn new(
        name: impl Into<String>,
        functions: Vec<ImportedFunctionSymbol>,
        classes: Vec<ImportedClassSymbol>,
    ) -> Self {
        Self(Arc::new(PackageData {
            name: name.into(),
            functions,
            classes,
        }))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[inline]
    pub fn functions(&self) -> &[ImportedFunctionSymbol] {
        &self.0.functions
    }

    #[inline]
    pub fn classes(&self) -> &[ImportedClassSymbol] {
        &self.0.classes
    }

    pub fn function(&self, name: &str) -> Option<&ImportedFunctionSymbol> {
        self.0.functions.iter().find(|f| f.name() == name)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Maps import names to packages. Shared by every compilation in a chain.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    packages: FxHashMap<String, PackageSymbol>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package under its own name. A later registration with the
    /// same name replaces the earlier one.
    pub fn register_package(&mut self, package: PackageSymbol) {
        self.packages.insert(package.name().to_string(), package);
    }

    pub fn resolve(&self, name: &str) -> Option<&PackageSymbol> {
        self.packages.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_package() -> PackageSymbol {
        let double = ImportedFunctionSymbol::new(
            "double",
            vec![HostSignature::new(
                vec![TypeSymbol::Int],
                TypeSymbol::Int,
                |args| match &args[0] {
                    Value::Int(n) => Value::Int(n * 2),
                    _ => Value::Unit,
                },
            )],
        );
        PackageSymbol::new("demo", vec![double], Vec::new())
    }

    #[test]
    fn test_registry_resolves_registered_packages() {
        let mut registry = HostRegistry::new();
        assert!(registry.resolve("demo").is_none());
        registry.register_package(test_package());
        let package = registry.resolve("demo").unwrap();
        assert_eq!(package.name(), "demo");
        assert!(package.function("double").is_some());
        assert!(package.function("missing").is_none());
    }

    #[test]
    fn test_signature_matching_is_positional_and_exact() {
        let package = test_package();
        let double = package.function("double").unwrap();
        assert!(double.find_signature(&[TypeSymbol::Int]).is_some());
        assert!(double.find_signature(&[TypeSymbol::String]).is_none());
        assert!(double.find_signature(&[]).is_none());
        assert!(double
            .find_signature(&[TypeSymbol::Int, TypeSymbol::Int])
            .is_none());
    }

    #[test]
    fn test_callback_invocation() {
        let package = test_package();
        let double = package.function("double").unwrap();
        let signature = double.find_signature(&[TypeSymbol::Int]).unwrap();
        let result = (signature.callback)(&[Value::Int(21)]);
        assert_eq!(result, Value::Int(42));
    }
}
