//! Type annotation parsing.
//!
//! Annotations are bare names (`int`, `float`). They are resolved to
//! numeric types by the type checker, so an unknown name still parses.

use std::collections::HashMap;

use crate::{ast::types::TypeAnnotation, errors::errors::Error, lexer::tokens::TokenKind};

use super::parser::Parser;

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<TypeAnnotation, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Initializes the type parsing lookup table.
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
}

pub fn parse_type(parser: &mut Parser) -> Result<TypeAnnotation, Error> {
    let Some(nud_fn) = parser
        .get_type_nud_lookup()
        .get(&parser.current_token_kind())
        .copied()
    else {
        return Err(parser.unexpected("expected a type name"));
    };

    nud_fn(parser)
}

pub fn parse_symbol_type(parser: &mut Parser) -> Result<TypeAnnotation, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    Ok(TypeAnnotation {
        name: token.value,
        span: token.span,
    })
}
