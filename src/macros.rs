//! Token construction helpers for the lexer.

/// Builds a `Token` from its kind, text and span.
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Integer, "42".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// Expands to a lexer handler for a fixed operator or punctuation string:
/// it pushes one token covering `$value` and steps over it.
///
/// ```ignore
/// RegexPattern {
///     regex: Regex::new("^<=").unwrap(),
///     handler: MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<="),
/// }
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| -> Result<(), Error> {
            let span = lexer.span_of($value.len());
            lexer.push(MK_TOKEN!($kind, String::from($value), span));
            lexer.advance_n($value.len());
            Ok(())
        }
    };
}
