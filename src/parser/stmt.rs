use crate::{
    ast::{
        ast::{Expr, Stmt},
        statements::{
            AssignmentStmt, BlockStmt, ExpressionStmt, FnDeclStmt, IfStmt, ImportSignature,
            ImportStmt, Parameter, ReturnStmt, WhileStmt,
        },
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Span,
};

use super::{parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if let Some(stmt_fn) = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied()
    {
        return stmt_fn(parser);
    }

    let expr = parse_expr(parser, BindingPower::Default)?;

    if parser.current_token_kind() == TokenKind::Assignment {
        let Expr::Symbol(target) = expr else {
            return Err(parser.unexpected("only a plain name can be assigned to"));
        };

        parser.advance();
        let value = parse_expr(parser, BindingPower::Default)?;
        let span = Span {
            start: target.span.start,
            end: value.get_span().end,
        };
        end_simple_stmt(parser)?;

        return Ok(Stmt::Assignment(AssignmentStmt {
            target: target.value,
            value,
            span,
        }));
    }

    if !matches!(expr, Expr::Call(_)) {
        return Err(parser.unexpected("expected `=` after expression, only calls may stand alone"));
    }

    end_simple_stmt(parser)?;

    Ok(Stmt::Expression(ExpressionStmt {
        span: *expr.get_span(),
        expression: expr,
    }))
}

/// A simple statement ends at the end of its logical line.
fn end_simple_stmt(parser: &mut Parser) -> Result<(), Error> {
    match parser.current_token_kind() {
        TokenKind::Newline => {
            parser.advance();
            Ok(())
        }
        // The lexer always closes the last line, tolerate streams that do not
        TokenKind::EOF | TokenKind::Dedent => Ok(()),
        _ => Err(parser.unexpected("expected end of line")),
    }
}

/// Parses `: <suite>` where the suite is either an indented block or a
/// single simple statement on the same line.
pub fn parse_block_stmt(parser: &mut Parser) -> Result<BlockStmt, Error> {
    parser.expect(TokenKind::Colon)?;
    let start = parser.get_position();

    if parser.current_token_kind() != TokenKind::Newline {
        if matches!(
            parser.current_token_kind(),
            TokenKind::If | TokenKind::While | TokenKind::Def
        ) {
            return Err(parser.unexpected("compound statements must start on their own line"));
        }

        let stmt = parse_stmt(parser)?;
        return Ok(BlockStmt {
            span: *stmt.get_span(),
            body: vec![stmt],
        });
    }

    parser.advance();
    parser.expect_error(
        TokenKind::Indent,
        Some(parser.unexpected("expected an indented block")),
    )?;

    let mut body = Vec::new();
    while !matches!(
        parser.current_token_kind(),
        TokenKind::Dedent | TokenKind::EOF
    ) {
        body.push(parse_stmt(parser)?);
    }

    let end = parser.previous_end();
    parser.expect(TokenKind::Dedent)?;

    Ok(BlockStmt {
        body,
        span: Span { start, end },
    })
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let condition = parse_expr(parser, BindingPower::Default)?;
    let then_body = parse_block_stmt(parser)?;

    let else_body = match parser.current_token_kind() {
        TokenKind::Elif => {
            // elif behaves as an `if` nested alone in the else branch
            let nested = parse_if_stmt(parser)?;
            Some(BlockStmt {
                span: *nested.get_span(),
                body: vec![nested],
            })
        }
        TokenKind::Else => {
            parser.advance();
            Some(parse_block_stmt(parser)?)
        }
        _ => None,
    };

    Ok(Stmt::If(IfStmt {
        condition,
        then_body,
        else_body,
        span: Span {
            start,
            end: parser.previous_end(),
        },
    }))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block_stmt(parser)?;

    Ok(Stmt::While(WhileStmt {
        condition,
        body,
        span: Span {
            start,
            end: parser.previous_end(),
        },
    }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let value = if matches!(
        parser.current_token_kind(),
        TokenKind::Newline | TokenKind::EOF | TokenKind::Dedent
    ) {
        None
    } else {
        Some(parse_expr(parser, BindingPower::Default)?)
    };

    let span = Span {
        start,
        end: parser.previous_end(),
    };
    end_simple_stmt(parser)?;

    Ok(Stmt::Return(ReturnStmt { value, span }))
}

pub fn parse_pass_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let span = parser.advance().span;
    end_simple_stmt(parser)?;
    Ok(Stmt::Pass(span))
}

pub fn parse_break_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let span = parser.advance().span;
    end_simple_stmt(parser)?;
    Ok(Stmt::Break(span))
}

pub fn parse_continue_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let span = parser.advance().span;
    end_simple_stmt(parser)?;
    Ok(Stmt::Continue(span))
}

/// Parses `from <module> import <name>[(<type>, ...)[ -> <type>]], ...`,
/// producing one `ImportStmt` per imported name.
pub fn parse_import_stmt(parser: &mut Parser) -> Result<Vec<ImportStmt>, Error> {
    parser.expect(TokenKind::From)?;

    let module = parser
        .expect_error(
            TokenKind::Identifier,
            Some(parser.unexpected("expected a module name after `from`")),
        )?
        .value;
    parser.expect(TokenKind::Import)?;

    let mut imports = Vec::new();

    loop {
        let name_token = parser.expect_error(
            TokenKind::Identifier,
            Some(parser.unexpected("expected a function name to import")),
        )?;

        let signature = if parser.current_token_kind() == TokenKind::OpenParen {
            parser.advance();

            let mut parameters = Vec::new();
            while parser.current_token_kind() != TokenKind::CloseParen {
                parameters.push(parse_type(parser)?);

                if parser.current_token_kind() == TokenKind::Comma {
                    parser.advance();
                } else if parser.current_token_kind() != TokenKind::CloseParen {
                    return Err(parser.unexpected("expected `,` or `)` in import signature"));
                }
            }
            parser.expect(TokenKind::CloseParen)?;

            let return_type = if parser.current_token_kind() == TokenKind::Arrow {
                parser.advance();
                Some(parse_type(parser)?)
            } else {
                None
            };

            Some(ImportSignature {
                parameters,
                return_type,
            })
        } else {
            None
        };

        imports.push(ImportStmt {
            module: module.clone(),
            name: name_token.value,
            signature,
            span: Span {
                start: name_token.span.start,
                end: parser.previous_end(),
            },
        });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    end_simple_stmt(parser)?;

    Ok(imports)
}

pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<FnDeclStmt, Error> {
    let start = parser.expect(TokenKind::Def)?.span.start;

    let name = parser
        .expect_error(
            TokenKind::Identifier,
            Some(parser.unexpected("expected a function name after `def`")),
        )?
        .value;

    parser.expect(TokenKind::OpenParen)?;

    let mut parameters = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseParen {
        let name_token = parser.expect_error(
            TokenKind::Identifier,
            Some(parser.unexpected("expected a parameter name")),
        )?;
        parser.expect_error(
            TokenKind::Colon,
            Some(parser.unexpected("parameters need a type annotation such as `: int`")),
        )?;
        let type_ = parse_type(parser)?;

        parameters.push(Parameter {
            name: name_token.value,
            span: Span {
                start: name_token.span.start,
                end: type_.span.end,
            },
            type_,
        });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != TokenKind::CloseParen {
            return Err(parser.unexpected("expected `,` or `)` in parameter list"));
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let return_type = if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        Some(parse_type(parser)?)
    } else {
        None
    };

    let body = parse_block_stmt(parser)?;

    Ok(FnDeclStmt {
        name,
        parameters,
        return_type,
        span: Span {
            start,
            end: body.span.end,
        },
        body,
    })
}
