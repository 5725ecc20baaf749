//! Runtime values.

use std::fmt;
use std::sync::Arc;

use crate::types::TypeSymbol;

/// A value produced by evaluation. Strings are shared so copies are cheap.
///
/// `Unit` is the result of statements and void calls; it never reaches the
/// user (the compilation API maps it to "no value").
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    String(Arc<str>),
    Unit,
}

impl Value {
    pub fn ty(&self) -> TypeSymbol {
        match self {
            Value::Int(_) => TypeSymbol::Int,
            Value::Bool(_) => TypeSymbol::Bool,
            Value::String(_) => TypeSymbol::String,
            Value::Unit => TypeSymbol::Void,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Bool(value) => write!(f, "{}", value),
            Value::String(value) => f.write_str(value),
            Value::Unit => Ok(()),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Arc::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_types() {
        assert_eq!(Value::Int(1).ty(), TypeSymbol::Int);
        assert_eq!(Value::Bool(true).ty(), TypeSymbol::Bool);
        assert_eq!(Value::from("x").ty(), TypeSymbol::String);
        assert_eq!(Value::Unit.ty(), TypeSymbol::Void);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::from("ab").to_string(), "ab");
        assert_eq!(Value::Unit.to_string(), "");
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Value::from("ab"), Value::from("ab"));
        assert_ne!(Value::Int(1), Value::Int(2));
        assert_ne!(Value::Int(1), Value::Bool(true));
    }
}
