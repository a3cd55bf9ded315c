//! Operand-stack verification for generated function bodies.
//!
//! Simulates a body over value types the way a WebAssembly validator does,
//! tracking one frame per open `block`, `loop` or `if`. Code after `br`,
//! `return` or `unreachable` is stack-polymorphic until the enclosing frame
//! ends. Structured constructs always use the empty block type, so only
//! branches to the function frame carry values.

use crate::{
    ast::types::FunctionSignature,
    errors::errors::{Error, ErrorImpl},
    type_checker::typed_ast::{TypedFunction, TypedModule},
    wasm::instructions::{Instruction, ValueType},
};

use super::compiler::func_type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Function,
    Block,
    Loop,
    If,
    Else,
}

#[derive(Debug, Clone)]
struct Frame {
    kind: FrameKind,
    height: usize,
    unreachable: bool,
}

struct StackVerifier<'a> {
    module: &'a TypedModule,
    function: &'a TypedFunction,
    slots: Vec<ValueType>,
    results: Vec<ValueType>,
    stack: Vec<ValueType>,
    frames: Vec<Frame>,
}

impl<'a> StackVerifier<'a> {
    fn new(module: &'a TypedModule, function: &'a TypedFunction) -> Self {
        let signature = func_type(&function.signature);

        let mut slots = signature.params;
        slots.extend(function.locals.iter().map(|ty| ValueType::from(*ty)));

        StackVerifier {
            module,
            function,
            slots,
            results: signature.results,
            stack: Vec::new(),
            frames: vec![Frame {
                kind: FrameKind::Function,
                height: 0,
                unreachable: false,
            }],
        }
    }

    fn error(&self, message: String) -> Error {
        Error::new(
            ErrorImpl::StackMismatch {
                function: self.function.name.clone(),
                message,
            },
            self.function.span.start,
        )
    }

    fn frame(&self) -> Result<&Frame, Error> {
        self.frames
            .last()
            .ok_or_else(|| self.error("no open control frame".to_string()))
    }

    fn push(&mut self, ty: ValueType) {
        self.stack.push(ty);
    }

    /// Pops one value, checking it against `expected` when given. Returns
    /// `None` when an unreachable frame supplies a value of any type.
    fn pop(&mut self, expected: Option<ValueType>) -> Result<Option<ValueType>, Error> {
        let frame = self.frame()?;

        if self.stack.len() == frame.height {
            if frame.unreachable {
                return Ok(None);
            }
            return Err(match expected {
                Some(ty) => self.error(format!("expected {} but the stack is empty", ty)),
                None => self.error("expected a value but the stack is empty".to_string()),
            });
        }

        let actual = self
            .stack
            .pop()
            .ok_or_else(|| self.error("stack underflow".to_string()))?;

        match expected {
            Some(ty) if ty != actual => {
                Err(self.error(format!("expected {} but found {}", ty, actual)))
            }
            _ => Ok(Some(actual)),
        }
    }

    fn pop_all(&mut self, types: &[ValueType]) -> Result<(), Error> {
        for ty in types.iter().rev() {
            self.pop(Some(*ty))?;
        }
        Ok(())
    }

    fn set_unreachable(&mut self) -> Result<(), Error> {
        let height = match self.frames.last_mut() {
            Some(frame) => {
                frame.unreachable = true;
                frame.height
            }
            None => return Err(self.error("no open control frame".to_string())),
        };
        self.stack.truncate(height);
        Ok(())
    }

    fn open(&mut self, kind: FrameKind) {
        self.frames.push(Frame {
            kind,
            height: self.stack.len(),
            unreachable: false,
        });
    }

    /// Checks that the innermost frame ends with exactly its (empty) result.
    fn check_frame_empty(&self) -> Result<(), Error> {
        let frame = self.frame()?;
        if self.stack.len() != frame.height {
            return Err(self.error(format!(
                "{} values left on the stack at the end of a block",
                self.stack.len() - frame.height
            )));
        }
        Ok(())
    }

    fn label_types(&self, depth: u32) -> Result<Vec<ValueType>, Error> {
        let depth = depth as usize;
        if depth >= self.frames.len() {
            return Err(self.error(format!("branch depth {} out of range", depth)));
        }

        match self.frames[self.frames.len() - 1 - depth].kind {
            FrameKind::Function => Ok(self.results.clone()),
            _ => Ok(Vec::new()),
        }
    }

    fn callee_signature(&self, index: u32) -> Result<&'a FunctionSignature, Error> {
        let index = index as usize;
        let module = self.module;

        if index < module.imports.len() {
            return Ok(&module.imports[index].signature);
        }

        module
            .functions
            .get(index - module.imports.len())
            .map(|function| &function.signature)
            .ok_or_else(|| self.error(format!("call to unknown function {}", index)))
    }

    fn binary(&mut self, ty: ValueType, result: ValueType) -> Result<(), Error> {
        self.pop(Some(ty))?;
        self.pop(Some(ty))?;
        self.push(result);
        Ok(())
    }

    fn step(&mut self, instruction: &Instruction) -> Result<(), Error> {
        match instruction {
            Instruction::Unreachable => self.set_unreachable()?,
            Instruction::Block => self.open(FrameKind::Block),
            Instruction::Loop => self.open(FrameKind::Loop),
            Instruction::If => {
                self.pop(Some(ValueType::I32))?;
                self.open(FrameKind::If);
            }
            Instruction::Else => {
                if self.frame()?.kind != FrameKind::If {
                    return Err(self.error("`else` without a matching `if`".to_string()));
                }
                self.check_frame_empty()?;

                if let Some(frame) = self.frames.last_mut() {
                    frame.kind = FrameKind::Else;
                    frame.unreachable = false;
                }
            }
            Instruction::End => {
                if self.frame()?.kind == FrameKind::Function {
                    return Err(self.error("`end` without an open block".to_string()));
                }
                self.check_frame_empty()?;
                self.frames.pop();
            }
            Instruction::Br(depth) => {
                let types = self.label_types(*depth)?;
                self.pop_all(&types)?;
                self.set_unreachable()?;
            }
            Instruction::BrIf(depth) => {
                self.pop(Some(ValueType::I32))?;
                let types = self.label_types(*depth)?;
                self.pop_all(&types)?;
                for ty in types {
                    self.push(ty);
                }
            }
            Instruction::Return => {
                let results = self.results.clone();
                self.pop_all(&results)?;
                self.set_unreachable()?;
            }
            Instruction::Call(index) => {
                let signature = self.callee_signature(*index)?;
                let func_type = func_type(signature);
                self.pop_all(&func_type.params)?;
                for ty in func_type.results {
                    self.push(ty);
                }
            }
            Instruction::Drop => {
                self.pop(None)?;
            }
            Instruction::LocalGet(slot) | Instruction::LocalSet(slot) => {
                let ty = *self
                    .slots
                    .get(*slot as usize)
                    .ok_or_else(|| self.error(format!("unknown local {}", slot)))?;

                if let Instruction::LocalGet(_) = instruction {
                    self.push(ty);
                } else {
                    self.pop(Some(ty))?;
                }
            }
            Instruction::I32Const(_) => self.push(ValueType::I32),
            Instruction::F64Const(_) => self.push(ValueType::F64),
            Instruction::I32Eqz => {
                self.pop(Some(ValueType::I32))?;
                self.push(ValueType::I32);
            }
            Instruction::I32Eq
            | Instruction::I32Ne
            | Instruction::I32LtS
            | Instruction::I32GtS
            | Instruction::I32LeS
            | Instruction::I32GeS
            | Instruction::I32Add
            | Instruction::I32Sub
            | Instruction::I32Mul
            | Instruction::I32DivS
            | Instruction::I32And
            | Instruction::I32Or => self.binary(ValueType::I32, ValueType::I32)?,
            Instruction::F64Eq
            | Instruction::F64Ne
            | Instruction::F64Lt
            | Instruction::F64Gt
            | Instruction::F64Le
            | Instruction::F64Ge => self.binary(ValueType::F64, ValueType::I32)?,
            Instruction::F64Add
            | Instruction::F64Sub
            | Instruction::F64Mul
            | Instruction::F64Div => self.binary(ValueType::F64, ValueType::F64)?,
            Instruction::F64Neg => {
                self.pop(Some(ValueType::F64))?;
                self.push(ValueType::F64);
            }
        }

        Ok(())
    }

    /// The implicit final `end` closes the function frame with its results.
    fn finish(&mut self) -> Result<(), Error> {
        if self.frames.len() != 1 {
            return Err(self.error(format!(
                "{} blocks left open at the end of the function",
                self.frames.len() - 1
            )));
        }

        let results = self.results.clone();
        self.pop_all(&results)?;

        if !self.stack.is_empty() {
            return Err(self.error(format!(
                "{} values left on the stack at the end of the function",
                self.stack.len()
            )));
        }

        Ok(())
    }
}

/// Checks that `body` keeps the operand stack consistent on every path and
/// leaves exactly the declared results when the function ends.
pub fn verify_function(
    module: &TypedModule,
    function: &TypedFunction,
    body: &[Instruction],
) -> Result<(), Error> {
    let mut verifier = StackVerifier::new(module, function);

    for instruction in body.iter() {
        verifier.step(instruction)?;
    }

    verifier.finish()
}
