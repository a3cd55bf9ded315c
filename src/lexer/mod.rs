//! Tokenizer for the Python subset.
//!
//! A table of anchored regexes is tried in order at the cursor; the first
//! match runs its handler. Leading whitespace at the start of each logical
//! line is measured against an indentation stack to produce Indent and
//! Dedent tokens. Newlines inside parentheses or after a `\` do not end a
//! logical line, and blank or comment-only lines are skipped.

pub mod lexer;
pub mod tokens;
