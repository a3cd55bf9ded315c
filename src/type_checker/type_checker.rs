use std::collections::HashMap;

use log::debug;

use crate::{
    ast::{
        ast::{Expr, Module, Stmt},
        statements::{BlockStmt, FnDeclStmt},
        types::{FunctionSignature, Type, TypeAnnotation},
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::typed_ast::{
    block_always_returns, Callee, ExprType, TypedExpr, TypedExprKind, TypedFunction, TypedImport,
    TypedModule, TypedStmt,
};

/// Name reserved for the `ord(<char>)` builtin.
pub const ORD_BUILTIN: &str = "ord";

/// Per-function symbol table. Parameters occupy the first slots, every
/// other name gets the next free slot the first time it is assigned.
#[derive(Debug)]
pub struct Environment {
    pub variable_lookup: HashMap<String, (Type, u32)>,
    pub locals: Vec<Type>,
    pub parameter_count: u32,
    pub function_name: String,
    pub return_type: Option<Type>,
}

impl Environment {
    pub fn new(function_name: &str, return_type: Option<Type>) -> Self {
        Environment {
            variable_lookup: HashMap::new(),
            locals: Vec::new(),
            parameter_count: 0,
            function_name: function_name.to_string(),
            return_type,
        }
    }

    pub fn declare_parameter(
        &mut self,
        name: &str,
        ty: Type,
        position: Position,
    ) -> Result<u32, Error> {
        if self.variable_lookup.contains_key(name) {
            return Err(Error::new(
                ErrorImpl::VariableAlreadyDeclared {
                    variable: name.to_string(),
                },
                position,
            ));
        }

        let slot = self.parameter_count;
        self.parameter_count += 1;
        self.variable_lookup.insert(name.to_string(), (ty, slot));
        Ok(slot)
    }

    pub fn declare_variable(&mut self, name: &str, ty: Type) -> u32 {
        let slot = self.parameter_count + self.locals.len() as u32;
        self.locals.push(ty);
        self.variable_lookup.insert(name.to_string(), (ty, slot));
        slot
    }

    pub fn get_variable(&self, name: &str) -> Option<&(Type, u32)> {
        self.variable_lookup.get(name)
    }
}

#[derive(Debug, Default)]
pub struct TypeChecker {
    pub imports: Vec<TypedImport>,
    /// Imports without an explicit signature that have not been called yet
    pub pending_imports: Vec<bool>,
    pub function_signatures: Vec<FunctionSignature>,
    pub callees: HashMap<String, Callee>,
}

impl TypeChecker {
    fn declare_callee(&mut self, name: &str, callee: Callee, position: Position) -> Result<(), Error> {
        if name == ORD_BUILTIN || self.callees.contains_key(name) {
            return Err(Error::new(
                ErrorImpl::FunctionAlreadyDeclared {
                    function: name.to_string(),
                },
                position,
            ));
        }

        self.callees.insert(name.to_string(), callee);
        Ok(())
    }

    pub fn get_signature(&self, callee: Callee) -> &FunctionSignature {
        match callee {
            Callee::Import(index) => &self.imports[index].signature,
            Callee::Function(index) => &self.function_signatures[index],
        }
    }
}

pub fn resolve_type(annotation: &TypeAnnotation) -> Result<Type, Error> {
    Type::from_name(&annotation.name).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnknownType {
                type_: annotation.name.clone(),
            },
            annotation.span.start,
        )
    })
}

fn resolve_signature(function: &FnDeclStmt) -> Result<FunctionSignature, Error> {
    let parameters = function
        .parameters
        .iter()
        .map(|parameter| resolve_type(&parameter.type_))
        .collect::<Result<Vec<_>, _>>()?;

    let result = function.return_type.as_ref().map(resolve_type).transpose()?;

    Ok(FunctionSignature { parameters, result })
}

/// Requires a numeric value, rejecting booleans and void calls.
pub fn check_value(expr: &TypedExpr) -> Result<Type, Error> {
    match expr.ty {
        ExprType::Value(ty) => Ok(ty),
        other => Err(Error::new(
            ErrorImpl::ExpectedValue {
                received: other.to_string(),
            },
            expr.span.start,
        )),
    }
}

fn check_condition(expr: &TypedExpr) -> Result<(), Error> {
    match expr.ty {
        ExprType::Bool => Ok(()),
        other => Err(Error::new(
            ErrorImpl::ConditionTypeError {
                received: other.to_string(),
            },
            expr.span.start,
        )),
    }
}

fn check_same_type(expected: Type, right: &TypedExpr) -> Result<(), Error> {
    let received = check_value(right)?;
    if received != expected {
        return Err(Error::new(
            ErrorImpl::TypeMatchError {
                expected: expected.to_string(),
                received: received.to_string(),
            },
            right.span.start,
        ));
    }

    Ok(())
}

pub fn type_check_expr(
    type_checker: &mut TypeChecker,
    environment: &Environment,
    ast: &Expr,
) -> Result<TypedExpr, Error> {
    let span = *ast.get_span();

    match ast {
        Expr::Number(number) => Ok(TypedExpr {
            kind: TypedExprKind::Int(number.value),
            ty: ExprType::Value(Type::Int32),
            span,
        }),
        Expr::Float(float) => Ok(TypedExpr {
            kind: TypedExprKind::Float(float.value),
            ty: ExprType::Value(Type::Float64),
            span,
        }),
        Expr::Char(literal) => Ok(TypedExpr {
            kind: TypedExprKind::Int(literal.value as u32 as i32),
            ty: ExprType::Value(Type::Int32),
            span,
        }),
        Expr::Symbol(symbol) => match environment.get_variable(&symbol.value) {
            Some((ty, slot)) => Ok(TypedExpr {
                kind: TypedExprKind::Local(*slot),
                ty: ExprType::Value(*ty),
                span,
            }),
            None => Err(Error::new(
                ErrorImpl::VariableNotDeclared {
                    variable: symbol.value.clone(),
                },
                span.start,
            )),
        },
        Expr::Binary(binary) => {
            let left = type_check_expr(type_checker, environment, &binary.left)?;
            let right = type_check_expr(type_checker, environment, &binary.right)?;
            let ty = check_value(&left)?;
            check_same_type(ty, &right)?;

            Ok(TypedExpr {
                kind: TypedExprKind::Binary {
                    operator: binary.operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                ty: ExprType::Value(ty),
                span,
            })
        }
        Expr::Compare(compare) => {
            let left = type_check_expr(type_checker, environment, &compare.left)?;
            let right = type_check_expr(type_checker, environment, &compare.right)?;
            let operand_type = check_value(&left)?;
            check_same_type(operand_type, &right)?;

            Ok(TypedExpr {
                kind: TypedExprKind::Compare {
                    operator: compare.operator,
                    operand_type,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                ty: ExprType::Bool,
                span,
            })
        }
        Expr::BoolOp(bool_op) => {
            let left = type_check_expr(type_checker, environment, &bool_op.left)?;
            let right = type_check_expr(type_checker, environment, &bool_op.right)?;
            check_condition(&left)?;
            check_condition(&right)?;

            Ok(TypedExpr {
                kind: TypedExprKind::BoolOp {
                    operator: bool_op.operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                ty: ExprType::Bool,
                span,
            })
        }
        Expr::Prefix(prefix) => {
            let operand = type_check_expr(type_checker, environment, &prefix.right_expr)?;
            let ty = check_value(&operand)?;

            Ok(TypedExpr {
                kind: TypedExprKind::Negate(Box::new(operand)),
                ty: ExprType::Value(ty),
                span,
            })
        }
        Expr::Call(call) => {
            let Some(callee) = type_checker.callees.get(&call.callee).copied() else {
                return Err(Error::new(
                    ErrorImpl::VariableNotDeclared {
                        variable: call.callee.clone(),
                    },
                    span.start,
                ));
            };

            let arguments = call
                .arguments
                .iter()
                .map(|argument| type_check_expr(type_checker, environment, argument))
                .collect::<Result<Vec<_>, _>>()?;

            if let Callee::Import(index) = callee {
                if type_checker.pending_imports[index] {
                    // First call site fixes the signature of an unannotated import
                    let parameters = arguments
                        .iter()
                        .map(check_value)
                        .collect::<Result<Vec<_>, _>>()?;
                    let import = &mut type_checker.imports[index];
                    import.signature = FunctionSignature {
                        parameters,
                        result: None,
                    };
                    type_checker.pending_imports[index] = false;
                    debug!(
                        "Inferred signature {} for import {}.{}",
                        import.signature, import.module, import.name
                    );
                }
            }

            let signature = type_checker.get_signature(callee).clone();

            if arguments.len() > signature.parameters.len() {
                return Err(Error::new(
                    ErrorImpl::UnexpectedArguments {
                        expected: signature.parameters.len(),
                        received: arguments.len(),
                    },
                    span.start,
                ));
            } else if arguments.len() < signature.parameters.len() {
                return Err(Error::new(
                    ErrorImpl::MissingArguments {
                        expected: signature.parameters.len(),
                        received: arguments.len(),
                    },
                    span.start,
                ));
            }

            for (argument, expected) in arguments.iter().zip(&signature.parameters) {
                let received = check_value(argument)?;
                if received != *expected {
                    return Err(Error::new(
                        ErrorImpl::ArgumentTypeMatchError {
                            expected: expected.to_string(),
                            received: received.to_string(),
                        },
                        argument.span.start,
                    ));
                }
            }

            Ok(TypedExpr {
                kind: TypedExprKind::Call { callee, arguments },
                ty: signature.result.map_or(ExprType::Void, ExprType::Value),
                span,
            })
        }
    }
}

pub fn type_check_stmt(
    type_checker: &mut TypeChecker,
    environment: &mut Environment,
    ast: &Stmt,
) -> Result<TypedStmt, Error> {
    match ast {
        Stmt::Assignment(assignment) => {
            let value = type_check_expr(type_checker, environment, &assignment.value)?;
            let ty = check_value(&value)?;

            let slot = match environment.get_variable(&assignment.target) {
                Some((existing, slot)) => {
                    if *existing != ty {
                        return Err(Error::new(
                            ErrorImpl::TypeMatchError {
                                expected: existing.to_string(),
                                received: ty.to_string(),
                            },
                            value.span.start,
                        ));
                    }
                    *slot
                }
                None => environment.declare_variable(&assignment.target, ty),
            };

            Ok(TypedStmt::Assign {
                slot,
                value,
                span: assignment.span,
            })
        }
        Stmt::Expression(expression) => Ok(TypedStmt::Expression {
            expression: type_check_expr(type_checker, environment, &expression.expression)?,
            span: expression.span,
        }),
        Stmt::If(if_stmt) => {
            let condition = type_check_expr(type_checker, environment, &if_stmt.condition)?;
            check_condition(&condition)?;

            let then_body = type_check_block(type_checker, environment, &if_stmt.then_body)?;
            let else_body = match &if_stmt.else_body {
                Some(block) => type_check_block(type_checker, environment, block)?,
                None => vec![],
            };

            Ok(TypedStmt::If {
                condition,
                then_body,
                else_body,
                span: if_stmt.span,
            })
        }
        Stmt::While(while_stmt) => {
            let condition = type_check_expr(type_checker, environment, &while_stmt.condition)?;
            check_condition(&condition)?;

            let body = type_check_block(type_checker, environment, &while_stmt.body)?;

            Ok(TypedStmt::While {
                condition,
                body,
                span: while_stmt.span,
            })
        }
        Stmt::Return(return_stmt) => {
            let value = match (&return_stmt.value, environment.return_type) {
                (None, None) => None,
                (None, Some(expected)) => {
                    return Err(Error::new(
                        ErrorImpl::ExpectedReturnValue {
                            function: environment.function_name.clone(),
                            expected: expected.to_string(),
                        },
                        return_stmt.span.start,
                    ))
                }
                (Some(value), None) => {
                    return Err(Error::new(
                        ErrorImpl::UnexpectedReturnValue {
                            function: environment.function_name.clone(),
                        },
                        value.get_span().start,
                    ))
                }
                (Some(value), Some(expected)) => {
                    let value = type_check_expr(type_checker, environment, value)?;
                    check_same_type(expected, &value)?;
                    Some(value)
                }
            };

            Ok(TypedStmt::Return {
                value,
                span: return_stmt.span,
            })
        }
        Stmt::Pass(_) => Ok(TypedStmt::Pass),
        Stmt::Break(span) => Ok(TypedStmt::Break(*span)),
        Stmt::Continue(span) => Ok(TypedStmt::Continue(*span)),
    }
}

pub fn type_check_block(
    type_checker: &mut TypeChecker,
    environment: &mut Environment,
    block: &BlockStmt,
) -> Result<Vec<TypedStmt>, Error> {
    block
        .iter()
        .map(|stmt| type_check_stmt(type_checker, environment, stmt))
        .collect()
}

fn type_check_function(
    type_checker: &mut TypeChecker,
    index: usize,
    function: &FnDeclStmt,
) -> Result<TypedFunction, Error> {
    let signature = type_checker.function_signatures[index].clone();
    let mut environment = Environment::new(&function.name, signature.result);

    for (parameter, ty) in function.parameters.iter().zip(&signature.parameters) {
        environment.declare_parameter(&parameter.name, *ty, parameter.span.start)?;
    }

    let body = type_check_block(type_checker, &mut environment, &function.body)?;

    if signature.result.is_some() && !block_always_returns(&body) {
        return Err(Error::new(
            ErrorImpl::MissingReturn {
                function: function.name.clone(),
            },
            function.span.start,
        ));
    }

    debug!(
        "Checked function {}{} with {} locals",
        function.name,
        signature,
        environment.locals.len()
    );

    Ok(TypedFunction {
        name: function.name.clone(),
        signature,
        locals: environment.locals,
        body,
        span: function.span,
    })
}

/// Checks a parsed module and produces its typed form.
///
/// All signatures are collected before any body is checked, so functions
/// may call each other regardless of declaration order. Bodies are then
/// checked in declaration order, which is also the order in which
/// unannotated imports get their signature from their first call.
pub fn type_check(module: &Module) -> Result<TypedModule, Error> {
    let mut type_checker = TypeChecker::default();

    for import in &module.imports {
        let index = type_checker.imports.len();
        type_checker.declare_callee(&import.name, Callee::Import(index), import.span.start)?;

        let signature = match &import.signature {
            Some(signature) => Some(FunctionSignature {
                parameters: signature
                    .parameters
                    .iter()
                    .map(resolve_type)
                    .collect::<Result<Vec<_>, _>>()?,
                result: signature.return_type.as_ref().map(resolve_type).transpose()?,
            }),
            None => None,
        };

        type_checker.pending_imports.push(signature.is_none());
        type_checker.imports.push(TypedImport {
            module: import.module.clone(),
            name: import.name.clone(),
            signature: signature.unwrap_or_default(),
            span: import.span,
        });
    }

    for (index, function) in module.functions.iter().enumerate() {
        type_checker.declare_callee(&function.name, Callee::Function(index), function.span.start)?;
        let signature = resolve_signature(function)?;
        type_checker.function_signatures.push(signature);
    }

    let functions = module
        .functions
        .iter()
        .enumerate()
        .map(|(index, function)| type_check_function(&mut type_checker, index, function))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TypedModule {
        imports: type_checker.imports,
        functions,
    })
}
