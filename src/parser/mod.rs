//! Recursive-descent parser producing the untyped AST.
//!
//! Statements dispatch on their leading keyword through a lookup table.
//! Expressions use binding powers (`or` < `and` < comparisons < `+ -` <
//! `* /` < unary minus < calls), so precedence lives in one place in
//! `lookups`. Blocks are delimited by the lexer's Indent/Dedent tokens.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;
