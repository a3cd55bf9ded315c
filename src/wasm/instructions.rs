use std::fmt::Display;

use crate::ast::types::Type;

use super::leb128::{write_i32, write_u32};

/// Empty block type for `block`, `loop` and `if`.
pub const BLOCK_TYPE_EMPTY: u8 = 0x40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    I32,
    F64,
}

impl ValueType {
    pub fn byte(&self) -> u8 {
        match self {
            ValueType::I32 => 0x7F,
            ValueType::F64 => 0x7C,
        }
    }
}

impl From<Type> for ValueType {
    fn from(ty: Type) -> Self {
        match ty {
            Type::Int32 => ValueType::I32,
            Type::Float64 => ValueType::F64,
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::I32 => write!(f, "i32"),
            ValueType::F64 => write!(f, "f64"),
        }
    }
}

/// The subset of WebAssembly instructions the code generator produces.
/// Structured control instructions always use the empty block type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    Unreachable,
    Block,
    Loop,
    If,
    Else,
    End,
    Br(u32),
    BrIf(u32),
    Return,
    Call(u32),
    Drop,

    LocalGet(u32),
    LocalSet(u32),

    I32Const(i32),
    F64Const(f64),

    I32Eqz,
    I32Eq,
    I32Ne,
    I32LtS,
    I32GtS,
    I32LeS,
    I32GeS,

    F64Eq,
    F64Ne,
    F64Lt,
    F64Gt,
    F64Le,
    F64Ge,

    I32Add,
    I32Sub,
    I32Mul,
    I32DivS,
    I32And,
    I32Or,

    F64Neg,
    F64Add,
    F64Sub,
    F64Mul,
    F64Div,
}

impl Instruction {
    pub fn opcode(&self) -> u8 {
        match self {
            Instruction::Unreachable => 0x00,
            Instruction::Block => 0x02,
            Instruction::Loop => 0x03,
            Instruction::If => 0x04,
            Instruction::Else => 0x05,
            Instruction::End => 0x0B,
            Instruction::Br(_) => 0x0C,
            Instruction::BrIf(_) => 0x0D,
            Instruction::Return => 0x0F,
            Instruction::Call(_) => 0x10,
            Instruction::Drop => 0x1A,
            Instruction::LocalGet(_) => 0x20,
            Instruction::LocalSet(_) => 0x21,
            Instruction::I32Const(_) => 0x41,
            Instruction::F64Const(_) => 0x44,
            Instruction::I32Eqz => 0x45,
            Instruction::I32Eq => 0x46,
            Instruction::I32Ne => 0x47,
            Instruction::I32LtS => 0x48,
            Instruction::I32GtS => 0x4A,
            Instruction::I32LeS => 0x4C,
            Instruction::I32GeS => 0x4E,
            Instruction::F64Eq => 0x61,
            Instruction::F64Ne => 0x62,
            Instruction::F64Lt => 0x63,
            Instruction::F64Gt => 0x64,
            Instruction::F64Le => 0x65,
            Instruction::F64Ge => 0x66,
            Instruction::I32Add => 0x6A,
            Instruction::I32Sub => 0x6B,
            Instruction::I32Mul => 0x6C,
            Instruction::I32DivS => 0x6D,
            Instruction::I32And => 0x71,
            Instruction::I32Or => 0x72,
            Instruction::F64Neg => 0x9A,
            Instruction::F64Add => 0xA0,
            Instruction::F64Sub => 0xA1,
            Instruction::F64Mul => 0xA2,
            Instruction::F64Div => 0xA3,
        }
    }

    /// Appends the binary encoding of this instruction to `sink`.
    pub fn encode(&self, sink: &mut Vec<u8>) {
        sink.push(self.opcode());

        match self {
            Instruction::Block | Instruction::Loop | Instruction::If => {
                sink.push(BLOCK_TYPE_EMPTY)
            }
            Instruction::Br(depth) | Instruction::BrIf(depth) => write_u32(sink, *depth),
            Instruction::Call(index)
            | Instruction::LocalGet(index)
            | Instruction::LocalSet(index) => write_u32(sink, *index),
            Instruction::I32Const(value) => write_i32(sink, *value),
            Instruction::F64Const(value) => sink.extend_from_slice(&value.to_le_bytes()),
            _ => {}
        }
    }
}
