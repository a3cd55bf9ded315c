#![allow(clippy::module_inception)]

use log::info;

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;
pub mod wasm;

/// A location in the source text. `line` and `column` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Position {
            offset,
            line,
            column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Compiles Python source text into a WebAssembly binary module.
///
/// Runs the whole pipeline: tokenize, parse, type check, generate and emit.
/// The first error raised by any stage is returned unchanged.
pub fn compile(source: &str) -> Result<Vec<u8>, Error> {
    let tokens = lexer::lexer::tokenize(source)?;
    info!("Tokenized {} tokens", tokens.len());

    let module = parser::parser::parse(tokens)?;
    info!(
        "Parsed {} imports and {} functions",
        module.imports.len(),
        module.functions.len()
    );

    let typed = type_checker::type_checker::type_check(&module)?;
    info!("Type checked {} functions", typed.functions.len());

    let wasm_module = compiler::compiler::compile(&typed)?;
    info!("Generated code for {} functions", wasm_module.functions.len());

    let bytes = wasm::emitter::emit(&wasm_module);
    info!("Emitted {} bytes", bytes.len());

    Ok(bytes)
}

/// Returns the 1-based line number, the line's text and the byte offset of
/// `position` within that line.
pub fn line_at_position(source: &str, position: usize) -> Option<(usize, String, usize)> {
    let mut start = 0;
    let mut line_number = 1;

    for line in source.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&position) {
            return Some((line_number, line.to_string(), position - start));
        }

        start = end;
        line_number += 1;
    }

    // End of input sits just past the final line
    if position == source.len() {
        let last = source.lines().last().unwrap_or("");
        let line_number = source.lines().count().max(1);
        return Some((line_number, last.to_string(), last.len()));
    }

    None
}

pub fn format_error(error: &Error, source: &str, file: &str) -> String {
    /*
        Error: TypeMatchError (Expected type `int`, received `float`)
        -> mandel.py
           |
        20 | x = 1 + 2.0
           | ----^
    */

    let mut output = String::new();

    if let ErrorTip::None = error.get_tip() {
        output.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        output.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_tip()
        ));
    }
    output.push_str(&format!("-> {}\n", file));

    let position = error.get_position();
    let Some((line, line_text, line_pos)) = line_at_position(source, position.offset) else {
        output.push_str(&format!("   {}\n", error));
        return output;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    output.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    output.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;
    output.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));

    output
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count();

    (String::from(&string[start..]), start)
}

#[cfg(test)]
mod tests {
    use crate::{
        errors::errors::{Error, ErrorImpl},
        Position,
    };

    #[test]
    fn test_line_at_position() {
        let source = "def f():\n    pass\n\ndef g():\n    pass\n";

        let (line_number, line, line_pos) = super::line_at_position(source, 4).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "def f():\n");
        assert_eq!(line_pos, 4);

        let (line_number, line, line_pos) = super::line_at_position(source, 23).unwrap();
        assert_eq!(line_number, 4);
        assert_eq!(line, "def g():\n");
        assert_eq!(line_pos, 4);
    }

    #[test]
    fn test_line_at_end_of_input() {
        let source = "x";
        let (line_number, _, line_pos) = super::line_at_position(source, 1).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line_pos, 1);
        assert!(super::line_at_position(source, 5).is_none());
    }

    #[test]
    fn test_format_error_points_at_column() {
        let source = "def f():\n    x = $\n";
        let error = Error::new(
            ErrorImpl::UnrecognisedToken {
                token: "$".to_string(),
            },
            Position::new(17, 2, 9),
        );

        let report = super::format_error(&error, source, "test.py");
        assert!(report.starts_with("Error: UnrecognisedToken\n-> test.py\n"));
        assert!(report.contains("2 | x = $"));
        assert!(report.contains("| ----^"));
    }
}
