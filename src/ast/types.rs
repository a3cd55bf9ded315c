use std::fmt::Display;

use crate::Span;

/// A type name as written in the source, resolved later by the type checker.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int32,
    Float64,
}

impl Type {
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "int" => Some(Type::Int32),
            "float" => Some(Type::Float64),
            _ => None,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int32 => write!(f, "int"),
            Type::Float64 => write!(f, "float"),
        }
    }
}

/// Parameter types plus an optional result type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FunctionSignature {
    pub parameters: Vec<Type>,
    pub result: Option<Type>,
}

impl Display for FunctionSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parameters = self
            .parameters
            .iter()
            .map(|ty| ty.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        match self.result {
            Some(result) => write!(f, "({}) -> {}", parameters, result),
            None => write!(f, "({})", parameters),
        }
    }
}
