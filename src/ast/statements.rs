use std::slice::Iter;

use crate::Span;

use super::{
    ast::{Expr, Stmt},
    types::TypeAnnotation,
};

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl BlockStmt {
    pub fn iter(&self) -> Iter<'_, Stmt> {
        self.body.iter()
    }
}

/// `<name> = <expr>`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStmt {
    pub target: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStmt {
    pub expression: Expr,
    pub span: Span,
}

/// `elif` chains are stored as a nested `IfStmt` alone in `else_body`.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_body: BlockStmt,
    pub else_body: Option<BlockStmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: BlockStmt,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// Explicit parameter and result types written after an imported name.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSignature {
    pub parameters: Vec<TypeAnnotation>,
    pub return_type: Option<TypeAnnotation>,
}

/// One imported name from `from <module> import <name>, ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    pub module: String,
    pub name: String,
    pub signature: Option<ImportSignature>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub type_: TypeAnnotation,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDeclStmt {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeAnnotation>,
    pub body: BlockStmt,
    pub span: Span,
}
