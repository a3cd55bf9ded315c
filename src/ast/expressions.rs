use std::fmt::Display;

use crate::Span;

use super::ast::Expr;

#[derive(Debug, Clone, PartialEq)]
pub struct NumberExpr {
    pub value: i32,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatExpr {
    pub value: f64,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharExpr {
    pub value: char,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolExpr {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOperator::Add => write!(f, "+"),
            BinaryOperator::Sub => write!(f, "-"),
            BinaryOperator::Mul => write!(f, "*"),
            BinaryOperator::Div => write!(f, "/"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOperator,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOperator {
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Equals,
    NotEquals,
}

impl Display for CompareOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareOperator::Less => write!(f, "<"),
            CompareOperator::LessEquals => write!(f, "<="),
            CompareOperator::Greater => write!(f, ">"),
            CompareOperator::GreaterEquals => write!(f, ">="),
            CompareOperator::Equals => write!(f, "=="),
            CompareOperator::NotEquals => write!(f, "!="),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompareExpr {
    pub left: Box<Expr>,
    pub operator: CompareOperator,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOperator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoolOpExpr {
    pub left: Box<Expr>,
    pub operator: BoolOperator,
    pub right: Box<Expr>,
    pub span: Span,
}

/// Unary minus.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpr {
    pub right_expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: String,
    pub arguments: Vec<Expr>,
    pub span: Span,
}
