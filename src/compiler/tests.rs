//! Unit tests for code generation and stack verification.

use crate::{
    ast::types::{FunctionSignature, Type},
    errors::errors::{Error, ErrorImpl, ErrorKind},
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::{
        type_checker::type_check,
        typed_ast::{TypedFunction, TypedModule},
    },
    wasm::instructions::{Instruction, ValueType},
    Span,
};

use super::{
    compiler::{compile, generate},
    verify::verify_function,
};

use Instruction::*;

fn typed(source: &str) -> TypedModule {
    let tokens = tokenize(source).unwrap();
    let module = parse(tokens).unwrap();
    type_check(&module).unwrap()
}

/// Instructions of the first function in `source`.
fn gen(source: &str) -> Result<Vec<Instruction>, Error> {
    let module = typed(source);
    generate(&module, &module.functions[0])
}

fn function(name: &str, signature: FunctionSignature, locals: Vec<Type>) -> TypedFunction {
    TypedFunction {
        name: name.to_string(),
        signature,
        locals,
        body: vec![],
        span: Span::default(),
    }
}

#[test]
fn test_gen_add_two() {
    let body = gen("def myAddTwo(a: int, b: int) -> int:\n    return a + b + 2\n").unwrap();

    assert_eq!(
        body,
        vec![
            LocalGet(0),
            LocalGet(1),
            I32Add,
            I32Const(2),
            I32Add,
            Return,
            Unreachable
        ]
    );
}

#[test]
fn test_gen_float_arithmetic() {
    let body = gen("def f(x: float) -> float:\n    return -x * 2.5 / x - 1.0\n").unwrap();

    assert_eq!(
        body,
        vec![
            LocalGet(0),
            F64Neg,
            F64Const(2.5),
            F64Mul,
            LocalGet(0),
            F64Div,
            F64Const(1.0),
            F64Sub,
            Return,
            Unreachable
        ]
    );
}

#[test]
fn test_gen_int_negation_and_division() {
    let body = gen("def f(a: int) -> int:\n    return -a / 3\n").unwrap();

    assert_eq!(
        body,
        vec![
            I32Const(0),
            LocalGet(0),
            I32Sub,
            I32Const(3),
            I32DivS,
            Return,
            Unreachable
        ]
    );
}

#[test]
fn test_gen_assignment_uses_slots() {
    let body = gen("def f(a: int):\n    x = a\n    y = 2.0\n    x = x * 2\n").unwrap();

    assert_eq!(
        body,
        vec![
            LocalGet(0),
            LocalSet(1),
            F64Const(2.0),
            LocalSet(2),
            LocalGet(1),
            I32Const(2),
            I32Mul,
            LocalSet(1)
        ]
    );
}

#[test]
fn test_gen_ord_is_constant() {
    let body = gen("def f() -> int:\n    return ord('*')\n").unwrap();

    assert_eq!(body[0], I32Const(42));
}

#[test]
fn test_gen_while_loop() {
    let body = gen("def f(n: int):\n    i = 0\n    while i < n:\n        i = i + 1\n").unwrap();

    assert_eq!(
        body,
        vec![
            I32Const(0),
            LocalSet(1),
            Block,
            Loop,
            LocalGet(1),
            LocalGet(0),
            I32LtS,
            I32Eqz,
            BrIf(1),
            LocalGet(1),
            I32Const(1),
            I32Add,
            LocalSet(1),
            Br(0),
            End,
            End
        ]
    );
}

#[test]
fn test_gen_and_condition_is_a_single_loop() {
    let source = "def f(a: float, b: float):\n    i = 0\n    while i < 50 and a + b <= 4.0:\n        i = i + 1\n";
    let body = gen(source).unwrap();

    assert_eq!(body.iter().filter(|i| **i == Loop).count(), 1);

    let and = body.iter().position(|i| *i == I32And).unwrap();
    assert_eq!(&body[and..and + 3], &[I32And, I32Eqz, BrIf(1)]);
}

#[test]
fn test_gen_or_condition() {
    let body = gen("def f(a: int) -> int:\n    if a < 0 or a > 9:\n        return 1\n    return 0\n").unwrap();

    assert!(body.contains(&I32Or));
    assert!(!body.contains(&Else));
}

#[test]
fn test_gen_if_else() {
    let body = gen("def f(a: int) -> int:\n    if a == 0:\n        return 1\n    else:\n        return 2\n").unwrap();

    assert_eq!(
        body,
        vec![
            LocalGet(0),
            I32Const(0),
            I32Eq,
            If,
            I32Const(1),
            Return,
            Else,
            I32Const(2),
            Return,
            End,
            Unreachable
        ]
    );
}

#[test]
fn test_gen_float_comparisons() {
    let body = gen("def f(a: float) -> int:\n    if a != 1.0:\n        return 1\n    return 0\n").unwrap();

    assert!(body.contains(&F64Ne));
}

#[test]
fn test_gen_break_and_continue_depths() {
    let source = "def f(n: int):\n    while n > 0:\n        n = n - 1\n        if n == 5:\n            continue\n        if n == 2:\n            break\n";
    let body = gen(source).unwrap();

    // Inside `if`, the loop is one level out and its block two levels out
    let continue_at = body.iter().position(|i| *i == Br(1)).unwrap();
    let break_at = body.iter().position(|i| *i == Br(2)).unwrap();
    assert!(continue_at < break_at);
}

#[test]
fn test_gen_break_outside_loop() {
    let error = gen("def f():\n    break\n").unwrap_err();

    assert_eq!(error.get_kind(), ErrorKind::CodeGen);
    assert_eq!(error.get_error_name(), "BreakOutsideLoop");
    assert_eq!(error.get_position().line, 2);
}

#[test]
fn test_gen_calls_resolve_indices() {
    let source = "from x import putc\n\ndef helper(c: int) -> int:\n    return c\n\ndef main():\n    putc(helper(65))\n    helper(1)\n";
    let module = typed(source);
    let body = generate(&module, &module.functions[1]).unwrap();

    assert_eq!(
        body,
        vec![I32Const(65), Call(1), Call(0), I32Const(1), Call(1), Drop]
    );
}

#[test]
fn test_compile_exports_every_function() {
    let module = typed("from x import putc\n\ndef a():\n    putc(1)\n\ndef b() -> float:\n    return 1.0\n");
    let wasm = compile(&module).unwrap();

    assert_eq!(wasm.imports.len(), 1);
    assert_eq!(wasm.functions.len(), 2);

    let exports: Vec<(&str, u32)> = wasm
        .exports
        .iter()
        .map(|export| (export.name.as_str(), export.function_index))
        .collect();
    assert_eq!(exports, vec![("a", 1), ("b", 2)]);

    // putc(int) and a() differ, b() -> float adds a third type
    assert_eq!(wasm.types.len(), 3);
    assert_eq!(wasm.types[2].results, vec![ValueType::F64]);
}

#[test]
fn test_compile_shares_identical_signatures() {
    let module = typed("def a(x: int) -> int:\n    return x\n\ndef b(y: int) -> int:\n    return y\n");
    let wasm = compile(&module).unwrap();

    assert_eq!(wasm.types.len(), 1);
    assert_eq!(wasm.functions[0].type_index, wasm.functions[1].type_index);
}

#[test]
fn test_compile_declares_locals_after_parameters() {
    let module = typed("def f(a: int):\n    x = 1.0\n    y = a\n");
    let wasm = compile(&module).unwrap();

    assert_eq!(wasm.functions[0].locals, vec![ValueType::F64, ValueType::I32]);
}

#[test]
fn test_verify_accepts_generated_code() {
    let source = "from x import putc\n\ndef main():\n    y = 0.0\n    while y < 2.0:\n        if y == 1.0:\n            putc(42)\n        else:\n            pass\n        y = y + 1.0\n";
    let module = typed(source);
    let body = generate(&module, &module.functions[0]).unwrap();

    assert!(verify_function(&module, &module.functions[0], &body).is_ok());
}

fn stack_error(error: Error) -> String {
    match error.get_internal_error() {
        ErrorImpl::StackMismatch { message, .. } => message.clone(),
        other => panic!("Expected StackMismatch, got {:?}", other),
    }
}

#[test]
fn test_verify_rejects_missing_result() {
    let module = TypedModule::default();
    let f = function(
        "f",
        FunctionSignature {
            parameters: vec![],
            result: Some(Type::Int32),
        },
        vec![],
    );

    let error = verify_function(&module, &f, &[]).unwrap_err();
    assert_eq!(error.get_kind(), ErrorKind::CodeGen);
    assert!(stack_error(error).contains("expected i32"));
}

#[test]
fn test_verify_rejects_type_mismatch() {
    let module = TypedModule::default();
    let f = function(
        "f",
        FunctionSignature {
            parameters: vec![Type::Float64],
            result: None,
        },
        vec![],
    );

    let error = verify_function(&module, &f, &[LocalGet(0), I32Const(1), I32Add, Drop]).unwrap_err();
    assert_eq!(stack_error(error), "expected i32 but found f64");
}

#[test]
fn test_verify_rejects_leftover_values() {
    let module = TypedModule::default();
    let f = function("f", FunctionSignature::default(), vec![]);

    assert!(verify_function(&module, &f, &[I32Const(1)]).is_err());
    assert!(verify_function(&module, &f, &[Block, I32Const(1), End]).is_err());
}

#[test]
fn test_verify_rejects_unbalanced_blocks() {
    let module = TypedModule::default();
    let f = function("f", FunctionSignature::default(), vec![]);

    assert!(verify_function(&module, &f, &[Block]).is_err());
    assert!(verify_function(&module, &f, &[End]).is_err());
    assert!(verify_function(&module, &f, &[Block, Else, End]).is_err());
    assert!(verify_function(&module, &f, &[Block, Br(2), End]).is_err());
}

#[test]
fn test_verify_unreachable_is_polymorphic() {
    let module = TypedModule::default();
    let f = function(
        "f",
        FunctionSignature {
            parameters: vec![],
            result: Some(Type::Float64),
        },
        vec![],
    );

    assert!(verify_function(&module, &f, &[Unreachable]).is_ok());
    assert!(verify_function(&module, &f, &[F64Const(1.0), Return, F64Add]).is_ok());
    assert!(verify_function(&module, &f, &[I32Const(1), Return]).is_err());
}

#[test]
fn test_verify_checks_locals_and_calls() {
    let module = TypedModule::default();
    let f = function("f", FunctionSignature::default(), vec![Type::Int32]);

    assert!(verify_function(&module, &f, &[I32Const(3), LocalSet(0)]).is_ok());
    assert!(verify_function(&module, &f, &[LocalGet(1), Drop]).is_err());
    assert!(verify_function(&module, &f, &[Call(0)]).is_err());
}
