//! Conversion classification between types.
//!
//! The language has no implicit conversions between distinct types.
//! `bool` and `int` convert to and from `string` explicitly, via the
//! cast form `type(expression)`. Everything else is either identity
//! or impossible.

use skiff_symbols::TypeSymbol;

/// The result of classifying a conversion from one type to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub exists: bool,
    pub is_identity: bool,
    pub is_implicit: bool,
}

impl Conversion {
    pub const NONE: Conversion = Conversion {
        exists: false,
        is_identity: false,
        is_implicit: false,
    };

    pub const IDENTITY: Conversion = Conversion {
        exists: true,
        is_identity: true,
        is_implicit: true,
    };

    pub const EXPLICIT: Conversion = Conversion {
        exists: true,
        is_identity: false,
        is_implicit: false,
    };

    /// Classify the conversion from `from` to `to`.
    pub fn classify(from: TypeSymbol, to: TypeSymbol) -> Conversion {
        if from == to {
            return Conversion::IDENTITY;
        }
        match (from, to) {
            (TypeSymbol::Bool | TypeSymbol::Int, TypeSymbol::String) => Conversion::EXPLICIT,
            (TypeSymbol::String, TypeSymbol::Bool | TypeSymbol::Int) => Conversion::EXPLICIT,
            _ => Conversion::NONE,
        }
    }

    /// An existing conversion that requires the cast form.
    pub fn is_explicit(&self) -> bool {
        self.exists && !self.is_implicit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        for ty in [TypeSymbol::Bool, TypeSymbol::Int, TypeSymbol::String, TypeSymbol::Void] {
            let conversion = Conversion::classify(ty, ty);
            assert!(conversion.is_identity);
            assert!(conversion.is_implicit);
        }
    }

    #[test]
    fn test_string_casts_are_explicit() {
        for ty in [TypeSymbol::Bool, TypeSymbol::Int] {
            assert!(Conversion::classify(ty, TypeSymbol::String).is_explicit());
            assert!(Conversion::classify(TypeSymbol::String, ty).is_explicit());
        }
    }

    #[test]
    fn test_unrelated_types_do_not_convert() {
        assert!(!Conversion::classify(TypeSymbol::Int, TypeSymbol::Bool).exists);
        assert!(!Conversion::classify(TypeSymbol::Bool, TypeSymbol::Int).exists);
        assert!(!Conversion::classify(TypeSymbol::Void, TypeSymbol::Int).exists);
    }
}
