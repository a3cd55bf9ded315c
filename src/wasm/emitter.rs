//! Serializes a `WasmModule` into the WebAssembly binary format.
//!
//! Sections are written in the required order (type, import, function,
//! export, code). Sections with no entries are left out entirely, so an
//! empty module is just the 8-byte header.

use log::debug;

use super::{
    instructions::{Instruction, ValueType},
    leb128::{write_name, write_sized, write_u32},
    module::{Function, WasmModule},
};

pub const MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6D];
pub const VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

pub const SECTION_TYPE: u8 = 1;
pub const SECTION_IMPORT: u8 = 2;
pub const SECTION_FUNCTION: u8 = 3;
pub const SECTION_EXPORT: u8 = 7;
pub const SECTION_CODE: u8 = 10;

const FUNC_TYPE_FORM: u8 = 0x60;
const EXTERNAL_KIND_FUNCTION: u8 = 0x00;

fn write_section(sink: &mut Vec<u8>, id: u8, count: usize, payload: Vec<u8>) {
    if count == 0 {
        return;
    }

    let mut contents = Vec::new();
    write_u32(&mut contents, count as u32);
    contents.extend(payload);

    debug!("Section {} with {} entries, {} bytes", id, count, contents.len());

    sink.push(id);
    write_sized(sink, &contents);
}

fn write_value_types(sink: &mut Vec<u8>, types: &[ValueType]) {
    write_u32(sink, types.len() as u32);
    sink.extend(types.iter().map(ValueType::byte));
}

/// Groups consecutive locals of the same type into `(count, type)` runs.
pub fn compress_locals(locals: &[ValueType]) -> Vec<(u32, ValueType)> {
    let mut runs: Vec<(u32, ValueType)> = Vec::new();

    for local in locals {
        match runs.last_mut() {
            Some((count, ty)) if ty == local => *count += 1,
            _ => runs.push((1, *local)),
        }
    }

    runs
}

fn encode_body(function: &Function) -> Vec<u8> {
    let mut body = Vec::new();

    let runs = compress_locals(&function.locals);
    write_u32(&mut body, runs.len() as u32);
    for (count, ty) in runs {
        write_u32(&mut body, count);
        body.push(ty.byte());
    }

    for instruction in &function.body {
        instruction.encode(&mut body);
    }
    Instruction::End.encode(&mut body);

    body
}

/// Produces the complete binary for `module`. The output depends only on
/// the module contents, in insertion order.
pub fn emit(module: &WasmModule) -> Vec<u8> {
    let mut output = Vec::new();
    output.extend_from_slice(&MAGIC);
    output.extend_from_slice(&VERSION);

    let mut payload = Vec::new();
    for func_type in &module.types {
        payload.push(FUNC_TYPE_FORM);
        write_value_types(&mut payload, &func_type.params);
        write_value_types(&mut payload, &func_type.results);
    }
    write_section(&mut output, SECTION_TYPE, module.types.len(), payload);

    let mut payload = Vec::new();
    for import in &module.imports {
        write_name(&mut payload, &import.module);
        write_name(&mut payload, &import.name);
        payload.push(EXTERNAL_KIND_FUNCTION);
        write_u32(&mut payload, import.type_index);
    }
    write_section(&mut output, SECTION_IMPORT, module.imports.len(), payload);

    let mut payload = Vec::new();
    for function in &module.functions {
        write_u32(&mut payload, function.type_index);
    }
    write_section(&mut output, SECTION_FUNCTION, module.functions.len(), payload);

    let mut payload = Vec::new();
    for export in &module.exports {
        write_name(&mut payload, &export.name);
        payload.push(EXTERNAL_KIND_FUNCTION);
        write_u32(&mut payload, export.function_index);
    }
    write_section(&mut output, SECTION_EXPORT, module.exports.len(), payload);

    let mut payload = Vec::new();
    for function in &module.functions {
        write_sized(&mut payload, &encode_body(function));
    }
    write_section(&mut output, SECTION_CODE, module.functions.len(), payload);

    output
}
