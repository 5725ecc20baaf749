//! The type system.
//!
//! skiff has a closed set of types. `Error` is the poisoned type produced by
//! failed binding; diagnostics mentioning it are suppressed so one mistake
//! does not cascade.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSymbol {
    Bool,
    Int,
    String,
    Void,
    Error,
}

impl TypeSymbol {
    /// The source-level name of this type.
    pub fn name(self) -> &'static str {
        match self {
            TypeSymbol::Bool => "bool",
            TypeSymbol::Int => "int",
            TypeSymbol::String => "string",
            TypeSymbol::Void => "void",
            TypeSymbol::Error => "?",
        }
    }

    /// Resolve a type name written in source. `void` and `error` are not
    /// denotable.
    pub fn lookup(name: &str) -> Option<TypeSymbol> {
        match name {
            "bool" => Some(TypeSymbol::Bool),
            "int" => Some(TypeSymbol::Int),
            "string" => Some(TypeSymbol::String),
            _ => None,
        }
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self == TypeSymbol::Error
    }
}

impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_resolves_only_denotable_types() {
        assert_eq!(TypeSymbol::lookup("bool"), Some(TypeSymbol::Bool));
        assert_eq!(TypeSymbol::lookup("int"), Some(TypeSymbol::Int));
        assert_eq!(TypeSymbol::lookup("string"), Some(TypeSymbol::String));
        assert_eq!(TypeSymbol::lookup("void"), None);
        assert_eq!(TypeSymbol::lookup("error"), None);
        assert_eq!(TypeSymbol::lookup("float"), None);
    }

    #[test]
    fn test_display_uses_source_names() {
        assert_eq!(TypeSymbol::Int.to_string(), "int");
        assert_eq!(TypeSymbol::Void.to_string(), "void");
    }
}
