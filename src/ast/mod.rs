/// Untyped syntax tree built by the parser
///
/// - ast: `Module`, and the `Stmt` / `Expr` enums
/// - expressions, statements: node payloads
/// - types: annotations, `Type` and `FunctionSignature`
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
