use crate::{
    errors::errors::Error,
    type_checker::typed_ast::{ExprType, TypedStmt},
    wasm::instructions::Instruction,
};

use super::{
    compiler::{Compiler, Label},
    expr::gen_expression,
};

pub fn gen_statement(compiler: &mut Compiler, statement: &TypedStmt) -> Result<(), Error> {
    match statement {
        TypedStmt::Assign { slot, value, .. } => {
            gen_expression(compiler, value)?;
            compiler.emit(Instruction::LocalSet(*slot));
        }
        TypedStmt::Expression { expression, .. } => {
            gen_expression(compiler, expression)?;

            if expression.ty != ExprType::Void {
                compiler.emit(Instruction::Drop);
            }
        }
        TypedStmt::If {
            condition,
            then_body,
            else_body,
            ..
        } => {
            gen_expression(compiler, condition)?;

            compiler.open(Label::If);
            for stmt in then_body.iter() {
                gen_statement(compiler, stmt)?;
            }

            if !else_body.is_empty() {
                compiler.emit(Instruction::Else);
                for stmt in else_body.iter() {
                    gen_statement(compiler, stmt)?;
                }
            }
            compiler.close();
        }
        TypedStmt::While {
            condition, body, ..
        } => {
            /*
                block
                  loop
                    <condition>
                    i32.eqz
                    br_if 1
                    <body>
                    br 0
                  end
                end
            */
            compiler.open(Label::Block);
            compiler.open(Label::Loop);

            gen_expression(compiler, condition)?;
            compiler.emit(Instruction::I32Eqz);
            compiler.emit(Instruction::BrIf(1));

            for stmt in body.iter() {
                gen_statement(compiler, stmt)?;
            }
            compiler.emit(Instruction::Br(0));

            compiler.close();
            compiler.close();
        }
        TypedStmt::Return { value, .. } => {
            if let Some(value) = value {
                gen_expression(compiler, value)?;
            }
            compiler.emit(Instruction::Return);
        }
        TypedStmt::Pass => {}
        TypedStmt::Break(span) => {
            let depth = compiler.break_depth("break", *span)?;
            compiler.emit(Instruction::Br(depth));
        }
        TypedStmt::Continue(span) => {
            let depth = compiler.continue_depth("continue", *span)?;
            compiler.emit(Instruction::Br(depth));
        }
    }

    Ok(())
}
