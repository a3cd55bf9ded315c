use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// The stage of the pipeline an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Parse,
    Type,
    CodeGen,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Lex => write!(f, "LexError"),
            ErrorKind::Parse => write!(f, "ParseError"),
            ErrorKind::Type => write!(f, "TypeError"),
            ErrorKind::CodeGen => write!(f, "CodeGenError"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::InconsistentIndentation { .. }
            | ErrorImpl::UnterminatedLiteral { .. }
            | ErrorImpl::InvalidCharLiteral { .. } => ErrorKind::Lex,
            ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::NumberParseError { .. } => ErrorKind::Parse,
            ErrorImpl::VariableNotDeclared { .. }
            | ErrorImpl::VariableAlreadyDeclared { .. }
            | ErrorImpl::UnexpectedArguments { .. }
            | ErrorImpl::MissingArguments { .. }
            | ErrorImpl::ArgumentTypeMatchError { .. }
            | ErrorImpl::TypeMatchError { .. }
            | ErrorImpl::ConditionTypeError { .. }
            | ErrorImpl::ExpectedValue { .. }
            | ErrorImpl::FunctionAlreadyDeclared { .. }
            | ErrorImpl::UnknownType { .. }
            | ErrorImpl::UnexpectedReturnValue { .. }
            | ErrorImpl::ExpectedReturnValue { .. }
            | ErrorImpl::MissingReturn { .. } => ErrorKind::Type,
            ErrorImpl::BreakOutsideLoop { .. }
            | ErrorImpl::UnsupportedConstruct { .. }
            | ErrorImpl::StackMismatch { .. } => ErrorKind::CodeGen,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::InconsistentIndentation { .. } => "InconsistentIndentation",
            ErrorImpl::UnterminatedLiteral { .. } => "UnterminatedLiteral",
            ErrorImpl::InvalidCharLiteral { .. } => "InvalidCharLiteral",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::ConditionTypeError { .. } => "ConditionTypeError",
            ErrorImpl::ExpectedValue { .. } => "ExpectedValue",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::UnexpectedReturnValue { .. } => "UnexpectedReturnValue",
            ErrorImpl::ExpectedReturnValue { .. } => "ExpectedReturnValue",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
            ErrorImpl::BreakOutsideLoop { .. } => "BreakOutsideLoop",
            ErrorImpl::UnsupportedConstruct { .. } => "UnsupportedConstruct",
            ErrorImpl::StackMismatch { .. } => "StackMismatch",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::InconsistentIndentation { width } => ErrorTip::Suggestion(format!(
                "Dedent to column {} does not match any enclosing block",
                width
            )),
            ErrorImpl::UnterminatedLiteral { .. } => {
                ErrorTip::Suggestion(String::from("Close the literal with a matching quote"))
            }
            ErrorImpl::InvalidCharLiteral { literal } => ErrorTip::Suggestion(format!(
                "Character literal `{}` must contain exactly one character",
                literal
            )),
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`", token))
            }
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::VariableNotDeclared { variable } => {
                ErrorTip::Suggestion(format!("Name `{}` is not defined", variable))
            }
            ErrorImpl::VariableAlreadyDeclared { variable } => {
                ErrorTip::Suggestion(format!("Parameter `{}` is declared twice", variable))
            }
            ErrorImpl::UnexpectedArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::MissingArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::ArgumentTypeMatchError { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Expected argument type `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::ConditionTypeError { received } => ErrorTip::Suggestion(format!(
                "Conditions must be comparisons or `and`/`or` of comparisons, received `{}`",
                received
            )),
            ErrorImpl::ExpectedValue { received } => ErrorTip::Suggestion(format!(
                "Expected an `int` or `float` value, received `{}`",
                received
            )),
            ErrorImpl::FunctionAlreadyDeclared { function } => {
                ErrorTip::Suggestion(format!("Function `{}` already declared", function))
            }
            ErrorImpl::UnknownType { type_ } => ErrorTip::Suggestion(format!(
                "Unknown type `{}` found, use `int` or `float`",
                type_
            )),
            ErrorImpl::UnexpectedReturnValue { function } => ErrorTip::Suggestion(format!(
                "Function `{}` declares no return type, add `-> <type>` to its signature",
                function
            )),
            ErrorImpl::ExpectedReturnValue { function, expected } => ErrorTip::Suggestion(
                format!("Function `{}` must return a value of type `{}`", function, expected),
            ),
            ErrorImpl::MissingReturn { function } => ErrorTip::Suggestion(format!(
                "Function `{}` can reach its end without returning a value",
                function
            )),
            ErrorImpl::BreakOutsideLoop { keyword } => {
                ErrorTip::Suggestion(format!("`{}` can only be used inside `while`", keyword))
            }
            ErrorImpl::UnsupportedConstruct { .. } | ErrorImpl::StackMismatch { .. } => {
                ErrorTip::None
            }
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.position.line,
            self.position.column,
            self.get_kind(),
            self.internal_error
        )
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unindent to width {width} does not match any outer indentation level")]
    InconsistentIndentation { width: usize },
    #[error("unterminated literal: {literal:?}")]
    UnterminatedLiteral { literal: String },
    #[error("invalid character literal: {literal:?}")]
    InvalidCharLiteral { literal: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("name {variable:?} not declared")]
    VariableNotDeclared { variable: String },
    #[error("variable {variable:?} already declared")]
    VariableAlreadyDeclared { variable: String },
    #[error("unexpected arguments: expected {expected}, received {received}")]
    UnexpectedArguments { expected: usize, received: usize },
    #[error("missing arguments: expected {expected}, received {received}")]
    MissingArguments { expected: usize, received: usize },
    #[error("argument types do not match: expected {expected}, received {received}")]
    ArgumentTypeMatchError { expected: String, received: String },
    #[error("types do not match: expected {expected}, received {received}")]
    TypeMatchError { expected: String, received: String },
    #[error("condition must be boolean, received {received}")]
    ConditionTypeError { received: String },
    #[error("expected a numeric value, received {received}")]
    ExpectedValue { received: String },
    #[error("function {function:?} already declared")]
    FunctionAlreadyDeclared { function: String },
    #[error("unknown type {type_} found")]
    UnknownType { type_: String },
    #[error("function {function:?} has no return type but returns a value")]
    UnexpectedReturnValue { function: String },
    #[error("function {function:?} must return a value of type {expected}")]
    ExpectedReturnValue { function: String, expected: String },
    #[error("function {function:?} is missing a return on some path")]
    MissingReturn { function: String },
    #[error("{keyword:?} outside of loop")]
    BreakOutsideLoop { keyword: String },
    #[error("cannot generate code for {construct}")]
    UnsupportedConstruct { construct: String },
    #[error("operand stack mismatch in {function:?}: {message}")]
    StackMismatch { function: String, message: String },
}
