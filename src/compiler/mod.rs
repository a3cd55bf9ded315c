//! Lowering of typed functions to WebAssembly instructions.
//!
//! `compiler` drives one function at a time and assembles the module,
//! `stmt` and `expr` emit the instructions, and `verify` checks the
//! operand stack of each body before it is accepted.

pub mod compiler;
pub mod expr;
pub mod stmt;
pub mod verify;

#[cfg(test)]
mod tests;
