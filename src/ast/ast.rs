use crate::Span;

use super::{
    expressions::{
        BinaryExpr, BoolOpExpr, CallExpr, CharExpr, CompareExpr, FloatExpr, NumberExpr,
        PrefixExpr, SymbolExpr,
    },
    statements::{
        AssignmentStmt, ExpressionStmt, FnDeclStmt, IfStmt, ImportStmt, ReturnStmt, WhileStmt,
    },
};

/// Root of the tree: every import and function in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub imports: Vec<ImportStmt>,
    pub functions: Vec<FnDeclStmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assignment(AssignmentStmt),
    Expression(ExpressionStmt),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
    Pass(Span),
    Break(Span),
    Continue(Span),
}

impl Stmt {
    pub fn get_span(&self) -> &Span {
        match self {
            Stmt::Assignment(stmt) => &stmt.span,
            Stmt::Expression(stmt) => &stmt.span,
            Stmt::If(stmt) => &stmt.span,
            Stmt::While(stmt) => &stmt.span,
            Stmt::Return(stmt) => &stmt.span,
            Stmt::Pass(span) | Stmt::Break(span) | Stmt::Continue(span) => span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(NumberExpr),
    Float(FloatExpr),
    /// `ord(<char>)`
    Char(CharExpr),
    Symbol(SymbolExpr),
    Binary(BinaryExpr),
    Compare(CompareExpr),
    BoolOp(BoolOpExpr),
    Prefix(PrefixExpr),
    Call(CallExpr),
}

impl Expr {
    pub fn get_span(&self) -> &Span {
        match self {
            Expr::Number(expr) => &expr.span,
            Expr::Float(expr) => &expr.span,
            Expr::Char(expr) => &expr.span,
            Expr::Symbol(expr) => &expr.span,
            Expr::Binary(expr) => &expr.span,
            Expr::Compare(expr) => &expr.span,
            Expr::BoolOp(expr) => &expr.span,
            Expr::Prefix(expr) => &expr.span,
            Expr::Call(expr) => &expr.span,
        }
    }
}
