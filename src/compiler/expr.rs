use crate::{
    ast::{
        expressions::{BinaryOperator, BoolOperator, CompareOperator},
        types::Type,
    },
    errors::errors::Error,
    type_checker::typed_ast::{ExprType, TypedExpr, TypedExprKind},
    wasm::instructions::Instruction,
};

use super::compiler::Compiler;

fn binary_instruction(operator: BinaryOperator, ty: Type) -> Instruction {
    match (ty, operator) {
        (Type::Int32, BinaryOperator::Add) => Instruction::I32Add,
        (Type::Int32, BinaryOperator::Sub) => Instruction::I32Sub,
        (Type::Int32, BinaryOperator::Mul) => Instruction::I32Mul,
        (Type::Int32, BinaryOperator::Div) => Instruction::I32DivS,
        (Type::Float64, BinaryOperator::Add) => Instruction::F64Add,
        (Type::Float64, BinaryOperator::Sub) => Instruction::F64Sub,
        (Type::Float64, BinaryOperator::Mul) => Instruction::F64Mul,
        (Type::Float64, BinaryOperator::Div) => Instruction::F64Div,
    }
}

fn compare_instruction(operator: CompareOperator, ty: Type) -> Instruction {
    match (ty, operator) {
        (Type::Int32, CompareOperator::Less) => Instruction::I32LtS,
        (Type::Int32, CompareOperator::LessEquals) => Instruction::I32LeS,
        (Type::Int32, CompareOperator::Greater) => Instruction::I32GtS,
        (Type::Int32, CompareOperator::GreaterEquals) => Instruction::I32GeS,
        (Type::Int32, CompareOperator::Equals) => Instruction::I32Eq,
        (Type::Int32, CompareOperator::NotEquals) => Instruction::I32Ne,
        (Type::Float64, CompareOperator::Less) => Instruction::F64Lt,
        (Type::Float64, CompareOperator::LessEquals) => Instruction::F64Le,
        (Type::Float64, CompareOperator::Greater) => Instruction::F64Gt,
        (Type::Float64, CompareOperator::GreaterEquals) => Instruction::F64Ge,
        (Type::Float64, CompareOperator::Equals) => Instruction::F64Eq,
        (Type::Float64, CompareOperator::NotEquals) => Instruction::F64Ne,
    }
}

fn numeric_type(compiler: &Compiler, expression: &TypedExpr) -> Result<Type, Error> {
    match expression.ty {
        ExprType::Value(ty) => Ok(ty),
        other => Err(compiler.unsupported(
            &format!("arithmetic on a `{}` value", other),
            expression.span.start,
        )),
    }
}

/// Generates instructions that leave the value of `expression` on the
/// operand stack. Booleans are left as an `i32` that is 0 or 1.
pub fn gen_expression(compiler: &mut Compiler, expression: &TypedExpr) -> Result<(), Error> {
    match &expression.kind {
        TypedExprKind::Int(value) => compiler.emit(Instruction::I32Const(*value)),
        TypedExprKind::Float(value) => compiler.emit(Instruction::F64Const(*value)),
        TypedExprKind::Local(slot) => compiler.emit(Instruction::LocalGet(*slot)),
        TypedExprKind::Binary {
            operator,
            left,
            right,
        } => {
            let ty = numeric_type(compiler, expression)?;

            gen_expression(compiler, left)?;
            gen_expression(compiler, right)?;
            compiler.emit(binary_instruction(*operator, ty));
        }
        TypedExprKind::Negate(operand) => match numeric_type(compiler, expression)? {
            Type::Int32 => {
                compiler.emit(Instruction::I32Const(0));
                gen_expression(compiler, operand)?;
                compiler.emit(Instruction::I32Sub);
            }
            Type::Float64 => {
                gen_expression(compiler, operand)?;
                compiler.emit(Instruction::F64Neg);
            }
        },
        TypedExprKind::Compare {
            operator,
            operand_type,
            left,
            right,
        } => {
            gen_expression(compiler, left)?;
            gen_expression(compiler, right)?;
            compiler.emit(compare_instruction(*operator, *operand_type));
        }
        TypedExprKind::BoolOp {
            operator,
            left,
            right,
        } => {
            // Both sides are evaluated, there is no short circuit
            gen_expression(compiler, left)?;
            gen_expression(compiler, right)?;
            compiler.emit(match operator {
                BoolOperator::And => Instruction::I32And,
                BoolOperator::Or => Instruction::I32Or,
            });
        }
        TypedExprKind::Call { callee, arguments } => {
            for argument in arguments.iter() {
                gen_expression(compiler, argument)?;
            }
            let index = compiler.function_index(*callee);
            compiler.emit(Instruction::Call(index));
        }
    }

    Ok(())
}
