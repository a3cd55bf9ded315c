//! Output of the type checker.
//!
//! Names are already resolved: locals to slot numbers, calls to an import
//! or function index. Every expression carries its `ExprType`, so code
//! generation never has to look anything up by name.

use std::fmt::Display;

use crate::{
    ast::{
        expressions::{BinaryOperator, BoolOperator, CompareOperator},
        types::{FunctionSignature, Type},
    },
    Span,
};

/// The type of an expression. Comparisons and `and`/`or` produce `Bool`,
/// which may only be used as a condition. Calls to functions without a
/// result produce `Void`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprType {
    Value(Type),
    Bool,
    Void,
}

impl Display for ExprType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprType::Value(ty) => write!(f, "{}", ty),
            ExprType::Bool => write!(f, "bool"),
            ExprType::Void => write!(f, "None"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callee {
    /// Index into `TypedModule::imports`
    Import(usize),
    /// Index into `TypedModule::functions`
    Function(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedExprKind {
    Int(i32),
    Float(f64),
    Local(u32),
    Binary {
        operator: BinaryOperator,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    Negate(Box<TypedExpr>),
    Compare {
        operator: CompareOperator,
        operand_type: Type,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    BoolOp {
        operator: BoolOperator,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    Call {
        callee: Callee,
        arguments: Vec<TypedExpr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    pub kind: TypedExprKind,
    pub ty: ExprType,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedStmt {
    Assign {
        slot: u32,
        value: TypedExpr,
        span: Span,
    },
    Expression {
        expression: TypedExpr,
        span: Span,
    },
    If {
        condition: TypedExpr,
        then_body: Vec<TypedStmt>,
        else_body: Vec<TypedStmt>,
        span: Span,
    },
    While {
        condition: TypedExpr,
        body: Vec<TypedStmt>,
        span: Span,
    },
    Return {
        value: Option<TypedExpr>,
        span: Span,
    },
    Pass,
    Break(Span),
    Continue(Span),
}

impl TypedStmt {
    /// True when every path through this statement ends in a `return`.
    /// Loops never count, their body may run zero times.
    pub fn always_returns(&self) -> bool {
        match self {
            TypedStmt::Return { .. } => true,
            TypedStmt::If {
                then_body,
                else_body,
                ..
            } => block_always_returns(then_body) && block_always_returns(else_body),
            _ => false,
        }
    }
}

pub fn block_always_returns(body: &[TypedStmt]) -> bool {
    body.iter().any(TypedStmt::always_returns)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedImport {
    pub module: String,
    pub name: String,
    pub signature: FunctionSignature,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedFunction {
    pub name: String,
    pub signature: FunctionSignature,
    /// Types of the locals declared in the body, in slot order after the
    /// parameters.
    pub locals: Vec<Type>,
    pub body: Vec<TypedStmt>,
    pub span: Span,
}

impl TypedFunction {
    /// Type of any slot, parameters first.
    pub fn slot_type(&self, slot: u32) -> Option<Type> {
        let slot = slot as usize;
        let parameters = &self.signature.parameters;
        if slot < parameters.len() {
            Some(parameters[slot])
        } else {
            self.locals.get(slot - parameters.len()).copied()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypedModule {
    pub imports: Vec<TypedImport>,
    pub functions: Vec<TypedFunction>,
}
