//! LEB128 variable-length integer encoding.
//!
//! Counts, indices and sizes use the unsigned form. Constant immediates
//! (`i32.const`) use the signed form.

pub fn write_u32(sink: &mut Vec<u8>, value: u32) {
    // Writing into a Vec cannot fail
    let _ = ::leb128::write::unsigned(sink, u64::from(value));
}

pub fn write_i32(sink: &mut Vec<u8>, value: i32) {
    let _ = ::leb128::write::signed(sink, i64::from(value));
}

/// Writes a length-prefixed UTF-8 name.
pub fn write_name(sink: &mut Vec<u8>, name: &str) {
    write_u32(sink, name.len() as u32);
    sink.extend_from_slice(name.as_bytes());
}

/// Writes a length-prefixed vector of already encoded bytes.
pub fn write_sized(sink: &mut Vec<u8>, bytes: &[u8]) {
    write_u32(sink, bytes.len() as u32);
    sink.extend_from_slice(bytes);
}

#[cfg(test)]
pub fn encode_u32(value: u32) -> Vec<u8> {
    let mut sink = Vec::new();
    write_u32(&mut sink, value);
    sink
}

#[cfg(test)]
pub fn encode_i32(value: i32) -> Vec<u8> {
    let mut sink = Vec::new();
    write_i32(&mut sink, value);
    sink
}
