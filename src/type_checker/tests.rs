//! Unit tests for the type checker.

use crate::{
    ast::types::{FunctionSignature, Type},
    errors::errors::{Error, ErrorKind},
    lexer::lexer::tokenize,
    parser::parser::parse,
};

use super::{
    type_checker::type_check,
    typed_ast::{Callee, ExprType, TypedExprKind, TypedModule, TypedStmt},
};

fn check(source: &str) -> Result<TypedModule, Error> {
    let tokens = tokenize(source).unwrap();
    let module = parse(tokens).unwrap();
    type_check(&module)
}

fn check_error(source: &str) -> Error {
    let error = check(source).unwrap_err();
    assert_eq!(error.get_kind(), ErrorKind::Type);
    error
}

#[test]
fn test_type_check_simple_function() {
    let typed = check("def add(a: int, b: int) -> int:\n    return a + b + 2\n").unwrap();

    let function = &typed.functions[0];
    assert_eq!(function.name, "add");
    assert_eq!(
        function.signature,
        FunctionSignature {
            parameters: vec![Type::Int32, Type::Int32],
            result: Some(Type::Int32),
        }
    );
    assert!(function.locals.is_empty());
}

#[test]
fn test_locals_get_dense_slots_after_parameters() {
    let source = "def f(a: float) -> float:\n    x = 1\n    y = a * 2.0\n    x = x + 1\n    return y\n";
    let typed = check(source).unwrap();
    let function = &typed.functions[0];

    assert_eq!(function.locals, vec![Type::Int32, Type::Float64]);
    assert_eq!(function.slot_type(0), Some(Type::Float64));
    assert_eq!(function.slot_type(1), Some(Type::Int32));
    assert_eq!(function.slot_type(2), Some(Type::Float64));

    let TypedStmt::Assign { slot, .. } = &function.body[2] else {
        panic!("Expected assignment");
    };
    assert_eq!(*slot, 1);
}

#[test]
fn test_ord_becomes_int_literal() {
    let typed = check("def f() -> int:\n    return ord('*')\n").unwrap();

    let TypedStmt::Return { value: Some(value), .. } = &typed.functions[0].body[0] else {
        panic!("Expected return");
    };
    assert_eq!(value.kind, TypedExprKind::Int(42));
    assert_eq!(value.ty, ExprType::Value(Type::Int32));
}

#[test]
fn test_forward_and_recursive_calls() {
    let source = "def f(n: int) -> int:\n    return g(n)\n\ndef g(n: int) -> int:\n    if n < 1:\n        return 0\n    return g(n - 1)\n";
    let typed = check(source).unwrap();

    let TypedStmt::Return { value: Some(value), .. } = &typed.functions[0].body[0] else {
        panic!("Expected return");
    };
    let TypedExprKind::Call { callee, .. } = &value.kind else {
        panic!("Expected call");
    };
    assert_eq!(*callee, Callee::Function(1));
}

#[test]
fn test_import_signature_inferred_from_first_call() {
    let source = "from x import putc, unused\n\ndef main():\n    putc(ord('a'))\n    putc(66)\n";
    let typed = check(source).unwrap();

    assert_eq!(
        typed.imports[0].signature,
        FunctionSignature {
            parameters: vec![Type::Int32],
            result: None,
        }
    );
    assert_eq!(typed.imports[1].signature, FunctionSignature::default());
}

#[test]
fn test_import_inferred_signature_enforced_on_later_calls() {
    let error = check_error("from x import out\n\ndef main():\n    out(1)\n    out(1.5)\n");
    assert_eq!(error.get_error_name(), "ArgumentTypeMatchError");
    assert_eq!(error.get_position().line, 5);
}

#[test]
fn test_explicit_import_signature() {
    let source = "from host import get() -> float, put_float(float)\n\ndef main():\n    put_float(get() * 2.0)\n";
    let typed = check(source).unwrap();

    assert_eq!(typed.imports[0].signature.result, Some(Type::Float64));
    assert_eq!(typed.imports[1].signature.parameters, vec![Type::Float64]);
}

#[test]
fn test_void_call_statement() {
    let typed = check("from x import putc\n\ndef main():\n    putc(1)\n").unwrap();

    let TypedStmt::Expression { expression, .. } = &typed.functions[0].body[0] else {
        panic!("Expected expression statement");
    };
    assert_eq!(expression.ty, ExprType::Void);
}

#[test]
fn test_mixed_arithmetic_rejected() {
    let error = check_error("def f(a: int, b: float) -> float:\n    return a + b\n");
    assert_eq!(error.get_error_name(), "TypeMatchError");
}

#[test]
fn test_mixed_comparison_rejected() {
    let error = check_error("def f(a: int) -> int:\n    if a < 1.0:\n        return 1\n    return 0\n");
    assert_eq!(error.get_error_name(), "TypeMatchError");
}

#[test]
fn test_reassignment_with_different_type_rejected() {
    let error = check_error("def f():\n    x = 1\n    x = 2.0\n");
    assert_eq!(error.get_error_name(), "TypeMatchError");
    assert_eq!(error.get_position().line, 3);
}

#[test]
fn test_undefined_name() {
    let error = check_error("def f() -> int:\n    return y\n");
    assert_eq!(error.get_error_name(), "VariableNotDeclared");

    let error = check_error("def f():\n    g()\n");
    assert_eq!(error.get_error_name(), "VariableNotDeclared");
}

#[test]
fn test_arity_mismatch() {
    let source = "def g(a: int) -> int:\n    return a\n\ndef f() -> int:\n    return g(1, 2)\n";
    assert_eq!(check_error(source).get_error_name(), "UnexpectedArguments");

    let source = "def g(a: int) -> int:\n    return a\n\ndef f() -> int:\n    return g()\n";
    assert_eq!(check_error(source).get_error_name(), "MissingArguments");
}

#[test]
fn test_argument_type_mismatch() {
    let source = "def g(a: int) -> int:\n    return a\n\ndef f() -> int:\n    return g(1.0)\n";
    assert_eq!(check_error(source).get_error_name(), "ArgumentTypeMatchError");
}

#[test]
fn test_return_checks() {
    let error = check_error("def f() -> int:\n    return 1.0\n");
    assert_eq!(error.get_error_name(), "TypeMatchError");

    let error = check_error("def f():\n    return 1\n");
    assert_eq!(error.get_error_name(), "UnexpectedReturnValue");

    let error = check_error("def f() -> int:\n    return\n");
    assert_eq!(error.get_error_name(), "ExpectedReturnValue");
}

#[test]
fn test_missing_return_rejected() {
    let error = check_error("def f(a: int) -> int:\n    if a < 0:\n        return 0\n");
    assert_eq!(error.get_error_name(), "MissingReturn");

    let error = check_error("def f(a: int) -> int:\n    while a < 0:\n        return 0\n");
    assert_eq!(error.get_error_name(), "MissingReturn");
}

#[test]
fn test_if_else_returning_on_both_paths_accepted() {
    let source = "def f(a: int) -> int:\n    if a < 0:\n        return 0\n    elif a == 0:\n        return 1\n    else:\n        return 2\n";
    assert!(check(source).is_ok());
}

#[test]
fn test_condition_must_be_boolean() {
    let error = check_error("def f(a: int):\n    while a:\n        pass\n");
    assert_eq!(error.get_error_name(), "ConditionTypeError");

    let error = check_error("def f(a: int):\n    if a < 1 and a:\n        pass\n");
    assert_eq!(error.get_error_name(), "ConditionTypeError");
}

#[test]
fn test_boolean_is_not_a_value() {
    let error = check_error("def f(a: int):\n    x = a < 1\n");
    assert_eq!(error.get_error_name(), "ExpectedValue");
}

#[test]
fn test_void_call_is_not_a_value() {
    let error = check_error("from x import putc\n\ndef f():\n    putc(1)\n    y = putc(2)\n");
    assert_eq!(error.get_error_name(), "ExpectedValue");
}

#[test]
fn test_duplicate_declarations() {
    let error = check_error("def f():\n    pass\n\ndef f():\n    pass\n");
    assert_eq!(error.get_error_name(), "FunctionAlreadyDeclared");

    let error = check_error("from x import f\n\ndef f():\n    pass\n");
    assert_eq!(error.get_error_name(), "FunctionAlreadyDeclared");

    let error = check_error("def ord(a: int) -> int:\n    return a\n");
    assert_eq!(error.get_error_name(), "FunctionAlreadyDeclared");

    let error = check_error("def f(a: int, a: int):\n    pass\n");
    assert_eq!(error.get_error_name(), "VariableAlreadyDeclared");
}

#[test]
fn test_unknown_type() {
    let error = check_error("def f(a: str):\n    pass\n");
    assert_eq!(error.get_error_name(), "UnknownType");
    assert_eq!(error.get_position().column, 10);
}
