//! WebAssembly module model and binary encoding.

pub mod emitter;
pub mod instructions;
pub mod leb128;
pub mod module;
