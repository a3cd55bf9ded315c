use std::cmp::Ordering;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

const TAB_WIDTH: usize = 8;

lazy_static! {
    // Every pattern is anchored, the first match at the cursor wins.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new(r"^\\\r?\n").unwrap(), handler: continuation_handler },
        RegexPattern { regex: Regex::new(r"^\r?\n").unwrap(), handler: newline_handler },
        RegexPattern { regex: Regex::new(r"^[ \t\r\x0c]+").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^#[^\n]*").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*").unwrap(), handler: symbol_handler },
        RegexPattern { regex: Regex::new(r"^0[xX][0-9a-fA-F]+").unwrap(), handler: hex_handler },
        RegexPattern { regex: Regex::new(r"^[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?").unwrap(), handler: float_handler },
        RegexPattern { regex: Regex::new(r"^[0-9]+").unwrap(), handler: integer_handler },
        RegexPattern { regex: Regex::new(r#"^'((?:\\.|[^'\\\n])*)('?)"#).unwrap(), handler: char_handler },
        RegexPattern { regex: Regex::new(r#"^"((?:\\.|[^"\\\n])*)("?)"#).unwrap(), handler: char_handler },
        RegexPattern { regex: Regex::new(r"^\(").unwrap(), handler: open_paren_handler },
        RegexPattern { regex: Regex::new(r"^\)").unwrap(), handler: close_paren_handler },
        RegexPattern { regex: Regex::new("^->").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->") },
        RegexPattern { regex: Regex::new("^==").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Equals, "==") },
        RegexPattern { regex: Regex::new("^!=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=") },
        RegexPattern { regex: Regex::new("^=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=") },
        RegexPattern { regex: Regex::new("^<=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=") },
        RegexPattern { regex: Regex::new("^<").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Less, "<") },
        RegexPattern { regex: Regex::new("^>=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=") },
        RegexPattern { regex: Regex::new("^>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Greater, ">") },
        RegexPattern { regex: Regex::new("^:").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Colon, ":") },
        RegexPattern { regex: Regex::new("^,").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Comma, ",") },
        RegexPattern { regex: Regex::new(r"^\+").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+") },
        RegexPattern { regex: Regex::new("^-").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dash, "-") },
        RegexPattern { regex: Regex::new(r"^\*").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Star, "*") },
        RegexPattern { regex: Regex::new("^/").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Slash, "/") },
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    line: usize,
    line_start: usize,
    /// Column widths of the currently open blocks, always starting with 0.
    indentations: Vec<usize>,
    paren_depth: usize,
    at_line_start: bool,
    line_has_tokens: bool,
}

impl Lexer {
    pub fn new(source: &str) -> Lexer {
        Lexer {
            tokens: vec![],
            source: source.to_string(),
            pos: 0,
            line: 1,
            line_start: 0,
            indentations: vec![0],
            paren_depth: 0,
            at_line_start: true,
            line_has_tokens: false,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        self.line_has_tokens = true;
        self.tokens.push(token);
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn position_at(&self, offset: usize) -> Position {
        Position::new(offset, self.line, offset - self.line_start + 1)
    }

    pub fn position(&self) -> Position {
        self.position_at(self.pos)
    }

    /// Span covering the next `len` bytes from the cursor.
    pub fn span_of(&self, len: usize) -> Span {
        Span {
            start: self.position(),
            end: self.position_at(self.pos + len),
        }
    }

    fn matched(&self, regex: &Regex) -> String {
        regex
            .find(self.remainder())
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    fn push_synthetic(&mut self, kind: TokenKind) {
        let span = self.span_of(0);
        self.tokens.push(MK_TOKEN!(kind, String::new(), span));
    }

    fn start_new_line(&mut self) {
        self.line += 1;
        self.line_start = self.pos;
    }

    /// Measures the leading whitespace of the current line and emits the
    /// Indent/Dedent tokens needed to reach it. Blank and comment-only
    /// lines leave the indentation untouched.
    fn process_indentation(&mut self) -> Result<(), Error> {
        self.at_line_start = false;

        let mut width = 0;
        let mut consumed = 0;
        for c in self.remainder().chars() {
            match c {
                ' ' => width += 1,
                '\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
                '\x0c' => width = 0,
                _ => break,
            }
            consumed += 1;
        }
        self.advance_n(consumed);

        match self.remainder().chars().next() {
            None | Some('\n') | Some('\r') | Some('#') => return Ok(()),
            _ => {}
        }

        let current = self.indentations.last().copied().unwrap_or(0);
        match width.cmp(&current) {
            Ordering::Greater => {
                self.indentations.push(width);
                self.push_synthetic(TokenKind::Indent);
            }
            Ordering::Less => {
                while self.indentations.last().is_some_and(|top| *top > width) {
                    self.indentations.pop();
                    self.push_synthetic(TokenKind::Dedent);
                }

                if self.indentations.last() != Some(&width) {
                    return Err(Error::new(
                        ErrorImpl::InconsistentIndentation { width },
                        self.position(),
                    ));
                }
            }
            Ordering::Equal => {}
        }

        Ok(())
    }

    fn finish(&mut self) {
        if self.line_has_tokens {
            self.push_synthetic(TokenKind::Newline);
        }

        while self.indentations.len() > 1 {
            self.indentations.pop();
            self.push_synthetic(TokenKind::Dedent);
        }

        self.push_synthetic(TokenKind::EOF);
    }
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    lexer.advance_n(matched.len());
    Ok(())
}

fn continuation_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    lexer.advance_n(matched.len());
    lexer.start_new_line();
    Ok(())
}

fn newline_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);

    // Newlines inside brackets join lines, blank lines produce nothing
    if lexer.paren_depth == 0 && lexer.line_has_tokens {
        let span = lexer.span_of(matched.len());
        lexer
            .tokens
            .push(MK_TOKEN!(TokenKind::Newline, String::from("\\n"), span));
        lexer.line_has_tokens = false;
    }

    lexer.advance_n(matched.len());
    lexer.start_new_line();
    if lexer.paren_depth == 0 {
        lexer.at_line_start = true;
    }

    Ok(())
}

fn open_paren_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    let span = lexer.span_of(1);
    lexer.push(MK_TOKEN!(TokenKind::OpenParen, String::from("("), span));
    lexer.paren_depth += 1;
    lexer.advance_n(1);
    Ok(())
}

fn close_paren_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    let span = lexer.span_of(1);
    lexer.push(MK_TOKEN!(TokenKind::CloseParen, String::from(")"), span));
    lexer.paren_depth = lexer.paren_depth.saturating_sub(1);
    lexer.advance_n(1);
    Ok(())
}

fn integer_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let span = lexer.span_of(matched.len());

    lexer.push(MK_TOKEN!(TokenKind::Integer, matched.clone(), span));
    lexer.advance_n(matched.len());
    Ok(())
}

fn hex_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let span = lexer.span_of(matched.len());

    lexer.push(MK_TOKEN!(TokenKind::Integer, matched.clone(), span));
    lexer.advance_n(matched.len());
    Ok(())
}

fn float_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let span = lexer.span_of(matched.len());

    lexer.push(MK_TOKEN!(TokenKind::Float, matched.clone(), span));
    lexer.advance_n(matched.len());
    Ok(())
}

fn char_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let Some((matched, body, closed)) = regex.captures(lexer.remainder()).map(|captures| {
        (
            captures[0].to_string(),
            captures[1].to_string(),
            !captures[2].is_empty(),
        )
    }) else {
        return Err(Error::new(
            ErrorImpl::UnrecognisedToken {
                token: lexer.remainder().chars().take(1).collect(),
            },
            lexer.position(),
        ));
    };

    if !closed {
        return Err(Error::new(
            ErrorImpl::UnterminatedLiteral { literal: matched },
            lexer.position(),
        ));
    }

    let decoded = match unescape(&body) {
        Some(decoded) if decoded.chars().count() == 1 => decoded,
        _ => {
            return Err(Error::new(
                ErrorImpl::InvalidCharLiteral { literal: matched },
                lexer.position(),
            ))
        }
    };

    let span = lexer.span_of(matched.len());
    lexer.push(MK_TOKEN!(TokenKind::Char, decoded, span));
    lexer.advance_n(matched.len());
    Ok(())
}

fn unescape(literal: &str) -> Option<String> {
    let mut result = String::new();
    let mut chars = literal.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.next()? {
            'n' => result.push('\n'),
            't' => result.push('\t'),
            'r' => result.push('\r'),
            '0' => result.push('\0'),
            '\\' => result.push('\\'),
            '\'' => result.push('\''),
            '"' => result.push('"'),
            'x' => {
                let mut hex = String::new();
                for _ in 0..2 {
                    match chars.peek() {
                        Some(ch) if ch.is_ascii_hexdigit() => {
                            hex.push(*ch);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                result.push(u8::from_str_radix(&hex, 16).ok()? as char);
            }
            _ => return None,
        }
    }

    Some(result)
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let value = lexer.matched(regex);
    let span = lexer.span_of(value.len());

    if let Some(kind) = RESERVED_LOOKUP.get(value.as_str()) {
        lexer.push(MK_TOKEN!(*kind, value.clone(), span));
    } else {
        lexer.push(MK_TOKEN!(TokenKind::Identifier, value.clone(), span));
    }

    lexer.advance_n(value.len());
    Ok(())
}

/// Converts source text into a token stream terminated by `EOF`.
///
/// Leading whitespace is turned into `Indent`/`Dedent` tokens using a stack
/// of column widths. Every logical line ends with a `Newline` token, and all
/// open blocks are closed before `EOF`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source);

    while !lex.at_eof() {
        if lex.at_line_start && lex.paren_depth == 0 {
            lex.process_indentation()?;
            continue;
        }

        let remainder = lex.remainder();
        let pattern = PATTERNS
            .iter()
            .find(|pattern| pattern.regex.is_match(remainder));

        match pattern {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex)?,
            None => {
                let token = lex.remainder().chars().next().unwrap_or(' ').to_string();
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken { token },
                    lex.position(),
                ));
            }
        }
    }

    lex.finish();
    debug!("Lexed {} tokens over {} lines", lex.tokens.len(), lex.line);
    Ok(lex.tokens)
}
