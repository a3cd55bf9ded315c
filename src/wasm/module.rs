use std::collections::HashMap;

use super::instructions::{Instruction, ValueType};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FuncType {
    pub params: Vec<ValueType>,
    pub results: Vec<ValueType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub module: String,
    pub name: String,
    pub type_index: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub type_index: u32,
    /// Declared locals after the parameters
    pub locals: Vec<ValueType>,
    /// Body without the closing `end`, which the emitter appends
    pub body: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub name: String,
    pub function_index: u32,
}

/// In-memory WebAssembly module. Imported functions occupy the first
/// function indices, so every import must be added before any function.
#[derive(Debug, Clone, Default)]
pub struct WasmModule {
    pub types: Vec<FuncType>,
    pub imports: Vec<Import>,
    pub functions: Vec<Function>,
    pub exports: Vec<Export>,
    type_lookup: HashMap<FuncType, u32>,
}

impl WasmModule {
    pub fn new() -> Self {
        WasmModule::default()
    }

    /// Returns the index of `func_type`, adding it on first use. Identical
    /// signatures share one entry, in first-seen order.
    pub fn add_type(&mut self, func_type: FuncType) -> u32 {
        if let Some(index) = self.type_lookup.get(&func_type) {
            return *index;
        }

        let index = self.types.len() as u32;
        self.type_lookup.insert(func_type.clone(), index);
        self.types.push(func_type);
        index
    }

    /// Adds an import and returns its function index.
    pub fn add_import(&mut self, module: &str, name: &str, func_type: FuncType) -> u32 {
        let type_index = self.add_type(func_type);
        self.imports.push(Import {
            module: module.to_string(),
            name: name.to_string(),
            type_index,
        });
        (self.imports.len() - 1) as u32
    }

    /// Adds a function definition and returns its function index.
    pub fn add_function(
        &mut self,
        func_type: FuncType,
        locals: Vec<ValueType>,
        body: Vec<Instruction>,
    ) -> u32 {
        let type_index = self.add_type(func_type);
        self.functions.push(Function {
            type_index,
            locals,
            body,
        });
        (self.imports.len() + self.functions.len() - 1) as u32
    }

    pub fn add_export(&mut self, name: &str, function_index: u32) {
        self.exports.push(Export {
            name: name.to_string(),
            function_index,
        });
    }
}
