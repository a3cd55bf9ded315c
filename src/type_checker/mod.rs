//! Type checking module for the compiler.
//!
//! This module performs semantic analysis and type checking on the AST.
//! It ensures type safety and builds a typed AST. The type checker:
//!
//! - Collects every function and import signature up front
//! - Resolves names to per-function local slots
//! - Validates operand, argument and return types without coercion
//! - Infers unannotated import signatures from their first call
//! - Rejects value-returning functions that can fall off their end

pub mod type_checker;
pub mod typed_ast;

#[cfg(test)]
mod tests;
