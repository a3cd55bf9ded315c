//! Token stream cursor and the module-level parse loop.
//!
//! Expressions are parsed Pratt style: every token kind may register a
//! prefix (NUD) handler, an infix (LED) handler and a binding power, while
//! statements and type annotations have their own handler tables. A module
//! is a flat list of `from ... import` lines and `def` blocks.

use std::collections::HashMap;

use log::debug;

use crate::{
    ast::ast::Module,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span, MK_TOKEN,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    stmt::{parse_fn_decl_stmt, parse_import_stmt},
    types::{create_token_type_lookups, TypeNUDHandler, TypeNUDLookup},
};

/// Cursor over the token stream plus the handler tables that drive it.
pub struct Parser {
    /// Always terminated by `EOF`
    tokens: Vec<Token>,
    pos: usize,
    stmt_lookup: StmtLookup,
    nud_lookup: NUDLookup,
    led_lookup: LEDLookup,
    binding_power_lookup: BPLookup,
    type_nud_lookup: TypeNUDLookup,
}

impl Parser {
    /// Wraps `tokens`, appending an `EOF` if the stream lacks one. The
    /// handler tables stay empty until `create_token_lookups` fills them.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let span = tokens
                .last()
                .map(|token| Span {
                    start: token.span.end,
                    end: token.span.end,
                })
                .unwrap_or_default();
            tokens.push(MK_TOKEN!(TokenKind::EOF, String::new(), span));
        }

        Parser {
            tokens,
            pos: 0,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            type_nud_lookup: HashMap::new(),
        }
    }

    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Returns the kind of the token after the current one.
    pub fn peek_kind(&self) -> TokenKind {
        self.tokens[(self.pos + 1).min(self.tokens.len() - 1)].kind
    }

    /// Steps past the current token and hands it back. Sticks at `EOF`.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos.min(self.tokens.len() - 1);
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    /// Consumes a token of `expected_kind`, failing with `error` (or a
    /// generic "expected" message) on anything else.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        if self.current_token_kind() != expected_kind {
            match error {
                Some(error) => Err(error),
                None => Err(self.unexpected(&format!("expected {}", expected_kind))),
            }
        } else {
            Ok(self.advance().clone())
        }
    }

    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Builds an `UnexpectedTokenDetailed` error for the current token.
    pub fn unexpected(&self, message: &str) -> Error {
        let token = self.current_token();
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: token.to_string(),
                message: String::from(message),
            },
            token.span.start,
        )
    }

    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    pub fn get_type_nud_lookup(&self) -> &TypeNUDLookup {
        &self.type_nud_lookup
    }

    /// Registers an infix handler together with its binding power.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a prefix handler. Prefix handlers do not touch the binding power table, so a token may
    /// act as both a prefix and an infix operator (`-`, `(`).
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    pub fn type_nud(&mut self, kind: TokenKind, nud_fn: TypeNUDHandler) {
        self.type_nud_lookup.insert(kind, nud_fn);
    }

    /// Returns the source position of the current token.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start
    }

    /// Returns the end position of the most recently consumed token.
    pub fn previous_end(&self) -> Position {
        if self.pos == 0 {
            self.get_position()
        } else {
            self.tokens[(self.pos - 1).min(self.tokens.len() - 1)].span.end
        }
    }
}

/// Parses a token stream into a `Module` of imports and function
/// definitions, stopping at the first error.
pub fn parse(tokens: Vec<Token>) -> Result<Module, Error> {
    let mut parser = Parser::new(tokens);
    create_token_lookups(&mut parser);
    create_token_type_lookups(&mut parser);

    let mut module = Module::default();

    while parser.has_tokens() {
        match parser.current_token_kind() {
            TokenKind::Newline => {
                parser.advance();
            }
            TokenKind::From => {
                let imports = parse_import_stmt(&mut parser)?;
                for import in &imports {
                    debug!("Parsed import {}.{}", import.module, import.name);
                }
                module.imports.extend(imports);
            }
            TokenKind::Def => {
                let function = parse_fn_decl_stmt(&mut parser)?;
                debug!(
                    "Parsed function {} with {} statements",
                    function.name,
                    function.body.body.len()
                );
                module.functions.push(function);
            }
            _ => {
                return Err(parser.unexpected(
                    "only `from ... import` and `def` are allowed at module level",
                ))
            }
        }
    }

    Ok(module)
}
