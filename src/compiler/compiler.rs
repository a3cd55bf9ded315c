//! Main code generation module.
//!
//! This module contains the core Compiler structure that lowers one typed
//! function into a flat sequence of WebAssembly instructions, and the
//! module-level driver that assembles every import and function into a
//! `WasmModule` ready for emission.

use log::debug;

use crate::{
    ast::types::FunctionSignature,
    errors::errors::{Error, ErrorImpl},
    type_checker::typed_ast::{Callee, TypedFunction, TypedModule},
    wasm::{
        instructions::{Instruction, ValueType},
        module::{FuncType, WasmModule},
    },
    Position, Span,
};

use super::{stmt::gen_statement, verify::verify_function};

/// A structured control construct that is currently open. Branch depths
/// are counted from the innermost entry outwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// The `block` wrapped around a `while`, target of `break`
    Block,
    /// The `loop` of a `while`, target of `continue`
    Loop,
    If,
}

/// The state of code generation for a single function.
///
/// This structure holds:
/// - The typed module, for resolving call targets
/// - The function being lowered
/// - The instructions generated so far
/// - The stack of open control constructs
pub struct Compiler<'a> {
    pub module: &'a TypedModule,
    pub function: &'a TypedFunction,
    pub instructions: Vec<Instruction>,
    pub labels: Vec<Label>,
}

impl<'a> Compiler<'a> {
    pub fn new(module: &'a TypedModule, function: &'a TypedFunction) -> Self {
        Compiler {
            module,
            function,
            instructions: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Emits the opening instruction of a structured construct and records it.
    pub fn open(&mut self, label: Label) {
        let instruction = match label {
            Label::Block => Instruction::Block,
            Label::Loop => Instruction::Loop,
            Label::If => Instruction::If,
        };
        self.emit(instruction);
        self.labels.push(label);
    }

    pub fn close(&mut self) {
        self.emit(Instruction::End);
        self.labels.pop();
    }

    /// Imports take the first function indices, defined functions follow.
    pub fn function_index(&self, callee: Callee) -> u32 {
        match callee {
            Callee::Import(index) => index as u32,
            Callee::Function(index) => (self.module.imports.len() + index) as u32,
        }
    }

    /// Distance from the innermost construct to the innermost enclosing loop.
    fn loop_depth(&self) -> Option<u32> {
        self.labels
            .iter()
            .rev()
            .position(|label| *label == Label::Loop)
            .map(|depth| depth as u32)
    }

    pub fn continue_depth(&self, keyword: &str, span: Span) -> Result<u32, Error> {
        self.loop_depth()
            .ok_or_else(|| break_outside_loop(keyword, span))
    }

    /// The block wrapping a loop sits directly outside it.
    pub fn break_depth(&self, keyword: &str, span: Span) -> Result<u32, Error> {
        self.loop_depth()
            .map(|depth| depth + 1)
            .ok_or_else(|| break_outside_loop(keyword, span))
    }

    pub fn unsupported(&self, construct: &str, position: Position) -> Error {
        Error::new(
            ErrorImpl::UnsupportedConstruct {
                construct: construct.to_string(),
            },
            position,
        )
    }

    fn gen(&mut self) -> Result<(), Error> {
        let function = self.function;
        for statement in function.body.iter() {
            gen_statement(self, statement)?;
        }

        // Every path of a value-returning function has already returned
        if function.signature.result.is_some() {
            self.emit(Instruction::Unreachable);
        }

        Ok(())
    }
}

fn break_outside_loop(keyword: &str, span: Span) -> Error {
    Error::new(
        ErrorImpl::BreakOutsideLoop {
            keyword: keyword.to_string(),
        },
        span.start,
    )
}

pub fn func_type(signature: &FunctionSignature) -> FuncType {
    FuncType {
        params: signature
            .parameters
            .iter()
            .map(|ty| ValueType::from(*ty))
            .collect(),
        results: signature.result.iter().map(|ty| ValueType::from(*ty)).collect(),
    }
}

/// Lowers the body of `function` into instructions, without the closing `end`.
pub fn generate(module: &TypedModule, function: &TypedFunction) -> Result<Vec<Instruction>, Error> {
    let mut compiler = Compiler::new(module, function);
    compiler.gen()?;
    Ok(compiler.instructions)
}

/// Builds the complete WebAssembly module. Every defined function is
/// exported under its source name and its body is checked against the
/// operand-stack rules before it is added.
pub fn compile(module: &TypedModule) -> Result<WasmModule, Error> {
    let mut wasm_module = WasmModule::new();

    for import in module.imports.iter() {
        debug!(
            "Import {}.{} {}",
            import.module, import.name, import.signature
        );
        wasm_module.add_import(&import.module, &import.name, func_type(&import.signature));
    }

    for function in module.functions.iter() {
        let body = generate(module, function)?;
        verify_function(module, function, &body)?;

        debug!(
            "Function {} {} with {} instructions",
            function.name,
            function.signature,
            body.len()
        );

        let locals = function
            .locals
            .iter()
            .map(|ty| ValueType::from(*ty))
            .collect();
        let index = wasm_module.add_function(
            func_type(&function.signature),
            locals,
            body,
        );
        wasm_module.add_export(&function.name, index);
    }

    Ok(wasm_module)
}
