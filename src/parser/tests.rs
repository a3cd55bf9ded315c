//! Unit tests for the parser module.
//!
//! This module contains tests for parsing including:
//! - Imports and function declarations
//! - Control flow statements (if/elif/else, while, break, continue)
//! - Expressions and operator precedence
//! - The `ord` builtin
//! - Error cases

use crate::{
    ast::{
        ast::{Expr, Module, Stmt},
        expressions::{BinaryOperator, BoolOperator, CompareOperator},
    },
    errors::errors::{Error, ErrorKind},
    lexer::lexer::tokenize,
};

use super::parser::parse;

fn parse_source(source: &str) -> Result<Module, Error> {
    let tokens = tokenize(source).unwrap();
    parse(tokens)
}

fn first_body(source: &str) -> Vec<Stmt> {
    let module = parse_source(source).unwrap();
    module.functions[0].body.body.clone()
}

fn returned_expr(source: &str) -> Expr {
    match first_body(source).remove(0) {
        Stmt::Return(ret) => ret.value.unwrap(),
        other => panic!("Expected return, found {:?}", other),
    }
}

#[test]
fn test_parse_function_declaration() {
    let module = parse_source("def add(a: int, b: int) -> int:\n    return a + b\n").unwrap();

    assert_eq!(module.functions.len(), 1);
    let function = &module.functions[0];
    assert_eq!(function.name, "add");
    assert_eq!(function.parameters.len(), 2);
    assert_eq!(function.parameters[0].name, "a");
    assert_eq!(function.parameters[0].type_.name, "int");
    assert_eq!(function.return_type.as_ref().unwrap().name, "int");
    assert_eq!(function.body.body.len(), 1);
}

#[test]
fn test_parse_function_without_return_type() {
    let module = parse_source("def main():\n    pass\n").unwrap();

    assert!(module.functions[0].return_type.is_none());
    assert!(module.functions[0].parameters.is_empty());
    assert!(matches!(module.functions[0].body.body[0], Stmt::Pass(_)));
}

#[test]
fn test_parse_imports() {
    let module = parse_source("from x import putc, put_float(float)\nfrom y import get() -> int\n")
        .unwrap();

    assert_eq!(module.imports.len(), 3);
    assert_eq!(module.imports[0].module, "x");
    assert_eq!(module.imports[0].name, "putc");
    assert!(module.imports[0].signature.is_none());

    let signature = module.imports[1].signature.as_ref().unwrap();
    assert_eq!(signature.parameters.len(), 1);
    assert_eq!(signature.parameters[0].name, "float");
    assert!(signature.return_type.is_none());

    assert_eq!(module.imports[2].module, "y");
    let signature = module.imports[2].signature.as_ref().unwrap();
    assert!(signature.parameters.is_empty());
    assert_eq!(signature.return_type.as_ref().unwrap().name, "int");
}

#[test]
fn test_parse_precedence() {
    let expr = returned_expr("def f(a: int, b: int) -> int:\n    return a + b * 2\n");

    let Expr::Binary(add) = expr else {
        panic!("Expected binary expression");
    };
    assert_eq!(add.operator, BinaryOperator::Add);
    let Expr::Binary(mul) = *add.right else {
        panic!("Expected multiplication on the right");
    };
    assert_eq!(mul.operator, BinaryOperator::Mul);
}

#[test]
fn test_parse_left_associative() {
    let expr = returned_expr("def f(a: int, b: int) -> int:\n    return a - b - 2\n");

    let Expr::Binary(outer) = expr else {
        panic!("Expected binary expression");
    };
    assert_eq!(outer.operator, BinaryOperator::Sub);
    assert!(matches!(*outer.left, Expr::Binary(_)));
    assert!(matches!(*outer.right, Expr::Number(_)));
}

#[test]
fn test_parse_grouping() {
    let expr = returned_expr("def f(a: int, b: int) -> int:\n    return (a + b) * 2\n");

    let Expr::Binary(mul) = expr else {
        panic!("Expected binary expression");
    };
    assert_eq!(mul.operator, BinaryOperator::Mul);
    assert!(matches!(*mul.left, Expr::Binary(_)));
}

#[test]
fn test_parse_bool_ops_bind_looser_than_comparisons() {
    let source = "def f(i: int, t: float):\n    while i < 50 and t <= 4.0 or i == 0:\n        pass\n";
    let Stmt::While(stmt) = first_body(source).remove(0) else {
        panic!("Expected while");
    };

    let Expr::BoolOp(or) = stmt.condition else {
        panic!("Expected `or` at the root");
    };
    assert_eq!(or.operator, BoolOperator::Or);
    let Expr::BoolOp(and) = *or.left else {
        panic!("Expected `and` on the left");
    };
    assert_eq!(and.operator, BoolOperator::And);
    let Expr::Compare(less) = *and.left else {
        panic!("Expected comparison");
    };
    assert_eq!(less.operator, CompareOperator::Less);
}

#[test]
fn test_parse_unary_minus() {
    let expr = returned_expr("def f(a: int) -> int:\n    return -a * 2\n");

    let Expr::Binary(mul) = expr else {
        panic!("Expected binary expression");
    };
    assert!(matches!(*mul.left, Expr::Prefix(_)));

    let expr = returned_expr("def f() -> int:\n    return -2147483648\n");
    let Expr::Number(number) = expr else {
        panic!("Expected folded literal");
    };
    assert_eq!(number.value, i32::MIN);

    let expr = returned_expr("def f() -> float:\n    return -1.5\n");
    let Expr::Float(float) = expr else {
        panic!("Expected folded literal");
    };
    assert_eq!(float.value, -1.5);
}

#[test]
fn test_parse_hex_literal() {
    let expr = returned_expr("def f() -> int:\n    return 0x2A\n");
    assert!(matches!(expr, Expr::Number(ref n) if n.value == 42));

    let expr = returned_expr("def f() -> int:\n    return 0xFFFFFFFF\n");
    assert!(matches!(expr, Expr::Number(ref n) if n.value == -1));
}

#[test]
fn test_parse_ord() {
    let expr = returned_expr("def f() -> int:\n    return ord('*')\n");
    let Expr::Char(literal) = expr else {
        panic!("Expected char literal");
    };
    assert_eq!(literal.value, '*');
}

#[test]
fn test_parse_calls() {
    let body = first_body("def f():\n    putc(ord('a'))\n    g(1, 2.0, h())\n");

    let Stmt::Expression(first) = &body[0] else {
        panic!("Expected expression statement");
    };
    let Expr::Call(call) = &first.expression else {
        panic!("Expected call");
    };
    assert_eq!(call.callee, "putc");
    assert!(matches!(call.arguments[0], Expr::Char(_)));

    let Stmt::Expression(second) = &body[1] else {
        panic!("Expected expression statement");
    };
    let Expr::Call(call) = &second.expression else {
        panic!("Expected call");
    };
    assert_eq!(call.arguments.len(), 3);
    assert!(matches!(call.arguments[2], Expr::Call(_)));
}

#[test]
fn test_parse_if_elif_else() {
    let source = "def f(a: int) -> int:\n    if a < 0:\n        return 0\n    elif a == 0:\n        return 1\n    else:\n        return 2\n";
    let Stmt::If(stmt) = first_body(source).remove(0) else {
        panic!("Expected if");
    };

    let else_body = stmt.else_body.unwrap();
    assert_eq!(else_body.body.len(), 1);
    let Stmt::If(nested) = &else_body.body[0] else {
        panic!("Expected elif as nested if");
    };
    assert!(nested.else_body.is_some());
}

#[test]
fn test_parse_single_line_suite() {
    let source = "def f(a: int) -> int:\n    if a < 0: return 0\n    else: return a\n";
    let Stmt::If(stmt) = first_body(source).remove(0) else {
        panic!("Expected if");
    };

    assert_eq!(stmt.then_body.body.len(), 1);
    assert!(matches!(stmt.then_body.body[0], Stmt::Return(_)));
    assert!(stmt.else_body.is_some());
}

#[test]
fn test_parse_loop_control() {
    let source = "def f():\n    while 1 < 2:\n        break\n        continue\n";
    let Stmt::While(stmt) = first_body(source).remove(0) else {
        panic!("Expected while");
    };

    assert!(matches!(stmt.body.body[0], Stmt::Break(_)));
    assert!(matches!(stmt.body.body[1], Stmt::Continue(_)));
}

#[test]
fn test_parse_assignment() {
    let body = first_body("def f():\n    x = 1\n    y = x + 2.5\n");

    let Stmt::Assignment(assignment) = &body[0] else {
        panic!("Expected assignment");
    };
    assert_eq!(assignment.target, "x");
    assert!(matches!(body[1], Stmt::Assignment(_)));
}

#[test]
fn test_parse_bare_return() {
    let body = first_body("def f():\n    return\n");
    let Stmt::Return(ret) = &body[0] else {
        panic!("Expected return");
    };
    assert!(ret.value.is_none());
}

#[test]
fn test_parse_error_bare_expression_statement() {
    let error = parse_source("def f(a: int):\n    a + 1\n").unwrap_err();
    assert_eq!(error.get_kind(), ErrorKind::Parse);
    assert_eq!(error.get_position().line, 2);
}

#[test]
fn test_parse_error_char_outside_ord() {
    let error = parse_source("def f():\n    x = 'a'\n").unwrap_err();
    assert_eq!(error.get_kind(), ErrorKind::Parse);
}

#[test]
fn test_parse_error_missing_annotation() {
    let error = parse_source("def f(a):\n    pass\n").unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_error_top_level_statement() {
    let error = parse_source("x = 1\n").unwrap_err();
    assert_eq!(error.get_kind(), ErrorKind::Parse);
    assert_eq!(error.get_position().line, 1);
}

#[test]
fn test_parse_error_missing_block() {
    let error = parse_source("def f():\nreturn 1\n").unwrap_err();
    assert_eq!(error.get_kind(), ErrorKind::Parse);
}

#[test]
fn test_parse_error_chained_comparison() {
    let error = parse_source("def f(a: int) -> int:\n    if 0 < a < 5:\n        return 1\n    return 0\n").unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
    assert_eq!(error.get_position().line, 2);
    assert_eq!(error.get_position().column, 14);

    // A parenthesised comparison is an ordinary operand
    assert!(parse_source("def f(a: int, b: int) -> int:\n    if (a < b) == (b < a):\n        return 1\n    return 0\n").is_ok());
}

#[test]
fn test_parse_error_integer_overflow() {
    let error = parse_source("def f() -> int:\n    return 2147483648\n").unwrap_err();
    assert_eq!(error.get_error_name(), "NumberParseError");
}

#[test]
fn test_parse_error_unclosed_call() {
    let error = parse_source("def f():\n    g(1 2)\n").unwrap_err();
    assert_eq!(error.get_kind(), ErrorKind::Parse);
}
