use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("def", TokenKind::Def);
        map.insert("while", TokenKind::While);
        map.insert("if", TokenKind::If);
        map.insert("elif", TokenKind::Elif);
        map.insert("else", TokenKind::Else);
        map.insert("return", TokenKind::Return);
        map.insert("import", TokenKind::Import);
        map.insert("from", TokenKind::From);
        map.insert("and", TokenKind::And);
        map.insert("or", TokenKind::Or);
        map.insert("pass", TokenKind::Pass);
        map.insert("break", TokenKind::Break);
        map.insert("continue", TokenKind::Continue);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Newline,
    Indent,
    Dedent,

    Integer,
    Float,
    Char,
    Identifier,

    OpenParen,
    CloseParen,

    Assignment,    // =
    Equals,        // ==
    NotEquals,     // !=
    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Colon,
    Comma,
    Arrow,

    Plus,
    Dash,
    Slash,
    Star,

    // Reserved
    Def,
    While,
    If,
    Elif,
    Else,
    Return,
    Import,
    From,
    And,
    Or,
    Pass,
    Break,
    Continue,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_one_of_many(&[
            TokenKind::Identifier,
            TokenKind::Integer,
            TokenKind::Float,
            TokenKind::Char,
        ]) {
            write!(f, "{} ({})", self.kind, self.value)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl Token {
    pub fn is_one_of_many(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }
}
