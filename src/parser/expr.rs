use crate::{
    ast::{
        ast::Expr,
        expressions::{
            BinaryExpr, BinaryOperator, BoolOpExpr, BoolOperator, CallExpr, CharExpr, CompareExpr,
            CompareOperator, FloatExpr, NumberExpr, PrefixExpr, SymbolExpr,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud_fn) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected("expected an expression"));
    };

    let mut left = nud_fn(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);

        if next_bp <= bp {
            break;
        }

        let Some(led_fn) = parser.get_led_lookup().get(&token_kind).copied() else {
            break;
        };

        left = led_fn(parser, left, next_bp)?;
    }

    Ok(left)
}

/// Parses a decimal or `0x` hexadecimal integer literal into an `i32`.
/// Hexadecimal literals are read as 32-bit two's complement.
fn parse_integer_literal(token: &Token) -> Result<i32, Error> {
    let text = token.value.as_str();
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok().map(|value| value as i32)
    } else {
        text.parse::<i32>().ok()
    };

    parsed.ok_or_else(|| {
        Error::new(
            ErrorImpl::NumberParseError {
                token: token.value.clone(),
            },
            token.span.start,
        )
    })
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    match parser.current_token_kind() {
        TokenKind::Integer => {
            let value = parse_integer_literal(parser.current_token())?;
            Ok(Expr::Number(NumberExpr {
                value,
                span: parser.advance().span,
            }))
        }
        TokenKind::Float => {
            let token = parser.current_token().clone();
            let value = token.value.parse::<f64>().map_err(|_| {
                Error::new(
                    ErrorImpl::NumberParseError {
                        token: token.value.clone(),
                    },
                    token.span.start,
                )
            })?;
            parser.advance();
            Ok(Expr::Float(FloatExpr {
                value,
                span: token.span,
            }))
        }
        TokenKind::Identifier => {
            let token = parser.advance().clone();
            Ok(Expr::Symbol(SymbolExpr {
                value: token.value,
                span: token.span,
            }))
        }
        _ => Err(parser.unexpected("expected a literal or a name")),
    }
}

pub fn parse_char_expr(parser: &mut Parser) -> Result<Expr, Error> {
    Err(parser.unexpected("character literals are only allowed as the argument of `ord`"))
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = match operator_token.kind {
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Dash => BinaryOperator::Sub,
        TokenKind::Star => BinaryOperator::Mul,
        TokenKind::Slash => BinaryOperator::Div,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value,
                },
                operator_token.span.start,
            ))
        }
    };

    let right = parse_expr(parser, bp)?;

    Ok(Expr::Binary(BinaryExpr {
        span: Span {
            start: left.get_span().start,
            end: right.get_span().end,
        },
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }))
}

pub fn parse_compare_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = match operator_token.kind {
        TokenKind::Less => CompareOperator::Less,
        TokenKind::LessEquals => CompareOperator::LessEquals,
        TokenKind::Greater => CompareOperator::Greater,
        TokenKind::GreaterEquals => CompareOperator::GreaterEquals,
        TokenKind::Equals => CompareOperator::Equals,
        TokenKind::NotEquals => CompareOperator::NotEquals,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value,
                },
                operator_token.span.start,
            ))
        }
    };

    let right = parse_expr(parser, bp)?;

    // `a < b < c` would otherwise compare a bool against a number
    if is_compare_operator(parser.current_token_kind()) {
        return Err(parser.unexpected("chained comparisons are not supported, use `and`"));
    }

    Ok(Expr::Compare(CompareExpr {
        span: Span {
            start: left.get_span().start,
            end: right.get_span().end,
        },
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }))
}

fn is_compare_operator(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Less
            | TokenKind::LessEquals
            | TokenKind::Greater
            | TokenKind::GreaterEquals
            | TokenKind::Equals
            | TokenKind::NotEquals
    )
}

pub fn parse_bool_op_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator = match parser.advance().kind {
        TokenKind::And => BoolOperator::And,
        _ => BoolOperator::Or,
    };

    let right = parse_expr(parser, bp)?;

    Ok(Expr::BoolOp(BoolOpExpr {
        span: Span {
            start: left.get_span().start,
            end: right.get_span().end,
        },
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }))
}

/// Unary minus. Literal operands are folded into a negative literal, which
/// also admits `-2147483648`.
pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();

    if parser.current_token_kind() == TokenKind::Integer
        && parser.peek_kind() != TokenKind::OpenParen
    {
        let token = parser.current_token().clone();
        let magnitude = if token.value.starts_with("0x") || token.value.starts_with("0X") {
            parse_integer_literal(&token)? as i64
        } else {
            token.value.parse::<i64>().unwrap_or(i64::MAX)
        };

        if magnitude > i32::MAX as i64 + 1 {
            return Err(Error::new(
                ErrorImpl::NumberParseError {
                    token: format!("-{}", token.value),
                },
                operator_token.span.start,
            ));
        }

        parser.advance();
        return Ok(Expr::Number(NumberExpr {
            value: (-magnitude) as i32,
            span: Span {
                start: operator_token.span.start,
                end: token.span.end,
            },
        }));
    }

    let rhs = parse_expr(parser, BindingPower::Unary)?;
    let span = Span {
        start: operator_token.span.start,
        end: rhs.get_span().end,
    };

    Ok(match rhs {
        Expr::Float(literal) => Expr::Float(FloatExpr {
            value: -literal.value,
            span,
        }),
        other => Expr::Prefix(PrefixExpr {
            right_expr: Box::new(other),
            span,
        }),
    })
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let Expr::Symbol(callee) = left else {
        return Err(parser.unexpected("only named functions can be called"));
    };

    parser.advance();

    // ord('c') is resolved here into the character's code point
    if callee.value == "ord" && parser.current_token_kind() == TokenKind::Char {
        let literal = parser.advance().clone();
        let value = literal.value.chars().next().unwrap_or('\0');
        let end = parser.expect(TokenKind::CloseParen)?.span.end;

        return Ok(Expr::Char(CharExpr {
            value,
            span: Span {
                start: callee.span.start,
                end,
            },
        }));
    }

    let mut arguments = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        arguments.push(parse_expr(parser, BindingPower::Default)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != TokenKind::CloseParen {
            return Err(parser.unexpected("expected `,` or `)` in argument list"));
        }
    }

    let end = parser.expect(TokenKind::CloseParen)?.span.end;

    Ok(Expr::Call(CallExpr {
        callee: callee.value,
        arguments,
        span: Span {
            start: callee.span.start,
            end,
        },
    }))
}
