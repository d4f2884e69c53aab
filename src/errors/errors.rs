use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
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

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::CannotFindValueInScope { .. } => "CannotFindValueInScope",
            ErrorImpl::AmbiguousReference { .. } => "AmbiguousReference",
            ErrorImpl::CannotFindTypeInScope { .. } => "CannotFindTypeInScope",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::InvalidExplicitCast { .. } => "InvalidExplicitCast",
            ErrorImpl::CannotInferType { .. } => "CannotInferType",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            ErrorImpl::NoSuchMember { .. } => "NoSuchMember",
            ErrorImpl::InvalidOperands { .. } => "InvalidOperands",
            ErrorImpl::InvalidOperand { .. } => "InvalidOperand",
            ErrorImpl::IntegerLiteralOverflow { .. } => "IntegerLiteralOverflow",
            ErrorImpl::NotAssignable { .. } => "NotAssignable",
            ErrorImpl::ConditionNotBool { .. } => "ConditionNotBool",
            ErrorImpl::NotAMaybe { .. } => "NotAMaybe",
            ErrorImpl::ValueAlreadyDefined { .. } => "ValueAlreadyDefined",
            ErrorImpl::DuplicatePatternBinding { .. } => "DuplicatePatternBinding",
            ErrorImpl::DuplicateParameter { .. } => "DuplicateParameter",
            ErrorImpl::CannotCaptureLocalValue { .. } => "CannotCaptureLocalValue",
            ErrorImpl::CannotDereference { .. } => "CannotDereference",
            ErrorImpl::CannotForceUnwrap { .. } => "CannotForceUnwrap",
            ErrorImpl::ArrowBaseNotReference { .. } => "ArrowBaseNotReference",
            ErrorImpl::DotBaseIsReference { .. } => "DotBaseIsReference",
            ErrorImpl::ConditionalBranchMismatch { .. } => "ConditionalBranchMismatch",
            ErrorImpl::CannotTakeAddressOfLiteral => "CannotTakeAddressOfLiteral",
            ErrorImpl::CannotTakeAddressOfFunction { .. } => "CannotTakeAddressOfFunction",
            ErrorImpl::CannotTakeAddressOfTemporary => "CannotTakeAddressOfTemporary",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`", token))
            }
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => {
                ErrorTip::Suggestion(format!("Invalid number literal: `{}`", token))
            }
            ErrorImpl::CannotFindValueInScope { identifier } => {
                ErrorTip::Suggestion(format!("Cannot find value `{}` in scope", identifier))
            }
            ErrorImpl::AmbiguousReference {
                identifier,
                candidates,
            } => ErrorTip::Suggestion(format!(
                "Reference to `{}` is ambiguous, {} candidates found",
                identifier, candidates
            )),
            ErrorImpl::CannotFindTypeInScope { type_ } => {
                ErrorTip::Suggestion(format!("Cannot find type `{}` in scope", type_))
            }
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::InvalidExplicitCast { from, to } => ErrorTip::Suggestion(format!(
                "Cannot cast a value of type `{}` to `{}`",
                from, to
            )),
            ErrorImpl::CannotInferType { what } => ErrorTip::Suggestion(format!(
                "Type of {} could not be inferred, add an annotation",
                what
            )),
            ErrorImpl::NotCallable { type_ } => {
                ErrorTip::Suggestion(format!("Value of type `{}` is not a function", type_))
            }
            ErrorImpl::ArgumentCountMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::NoSuchMember { type_, member } => {
                ErrorTip::Suggestion(format!("Type `{}` has no member named `{}`", type_, member))
            }
            ErrorImpl::InvalidOperands {
                operator,
                lhs,
                rhs,
            } => ErrorTip::Suggestion(format!(
                "Cannot apply `{}` to `{}` and `{}`",
                operator, lhs, rhs
            )),
            ErrorImpl::InvalidOperand { operator, type_ } => {
                ErrorTip::Suggestion(format!("Cannot apply `{}` to `{}`", operator, type_))
            }
            ErrorImpl::IntegerLiteralOverflow { literal, type_ } => ErrorTip::Suggestion(format!(
                "Integer literal `{}` does not fit in `{}`",
                literal, type_
            )),
            ErrorImpl::NotAssignable { type_ } => {
                ErrorTip::Suggestion(format!("Expression of type `{}` is not assignable", type_))
            }
            ErrorImpl::ConditionNotBool { received } => {
                ErrorTip::Suggestion(format!("Condition must be `bool`, received `{}`", received))
            }
            ErrorImpl::NotAMaybe { received } => ErrorTip::Suggestion(format!(
                "Conditional binding requires a `maybe` type, received `{}`",
                received
            )),
            ErrorImpl::ValueAlreadyDefined { identifier } => {
                ErrorTip::Suggestion(format!("`{}` is already defined in this scope", identifier))
            }
            ErrorImpl::DuplicatePatternBinding { identifier } => ErrorTip::Suggestion(format!(
                "`{}` is bound more than once in the same pattern",
                identifier
            )),
            ErrorImpl::DuplicateParameter { identifier } => ErrorTip::Suggestion(format!(
                "`{}` is used more than once in the same parameter list",
                identifier
            )),
            ErrorImpl::CannotCaptureLocalValue { identifier } => ErrorTip::Suggestion(format!(
                "Local functions cannot capture `{}`, pass it as a parameter instead",
                identifier
            )),
            ErrorImpl::CannotDereference { type_ } => ErrorTip::Suggestion(format!(
                "Cannot dereference a value of non-reference type `{}`",
                type_
            )),
            ErrorImpl::CannotForceUnwrap { type_ } => ErrorTip::Suggestion(format!(
                "Cannot force unwrap a value of non-maybe type `{}`",
                type_
            )),
            ErrorImpl::ArrowBaseNotReference { type_ } => ErrorTip::Suggestion(format!(
                "Base of `->` must be a reference, found `{}`, use `.` instead",
                type_
            )),
            ErrorImpl::DotBaseIsReference { type_ } => ErrorTip::Suggestion(format!(
                "Base of `.` has reference type `{}`, use `->` instead",
                type_
            )),
            ErrorImpl::ConditionalBranchMismatch {
                then_type,
                else_type,
            } => ErrorTip::Suggestion(format!(
                "Branches of the conditional have different types `{}` and `{}`",
                then_type, else_type
            )),
            ErrorImpl::CannotTakeAddressOfLiteral => {
                ErrorTip::Suggestion(String::from("Cannot take the address of a literal"))
            }
            ErrorImpl::CannotTakeAddressOfFunction { identifier } => ErrorTip::Suggestion(
                format!("Cannot take the address of function `{}`", identifier),
            ),
            ErrorImpl::CannotTakeAddressOfTemporary => ErrorTip::Suggestion(String::from(
                "Cannot take the address of a temporary value",
            )),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.internal_error)
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
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("cannot find value {identifier:?} in scope")]
    CannotFindValueInScope { identifier: String },
    #[error("reference to {identifier:?} is ambiguous")]
    AmbiguousReference { identifier: String, candidates: usize },
    #[error("cannot find type {type_:?} in scope")]
    CannotFindTypeInScope { type_: String },
    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMatchError { expected: String, received: String },
    #[error("cannot cast {from:?} to {to:?}")]
    InvalidExplicitCast { from: String, to: String },
    #[error("cannot infer the type of {what}")]
    CannotInferType { what: String },
    #[error("value of type {type_:?} is not callable")]
    NotCallable { type_: String },
    #[error("wrong number of arguments: expected {expected:?}, received {received:?}")]
    ArgumentCountMismatch { expected: usize, received: usize },
    #[error("type {type_:?} has no member {member:?}")]
    NoSuchMember { type_: String, member: String },
    #[error("invalid operands to {operator}: {lhs:?} and {rhs:?}")]
    InvalidOperands {
        operator: String,
        lhs: String,
        rhs: String,
    },
    #[error("invalid operand to {operator}: {type_:?}")]
    InvalidOperand { operator: String, type_: String },
    #[error("integer literal {literal} overflows {type_:?}")]
    IntegerLiteralOverflow { literal: String, type_: String },
    #[error("cannot assign to a value of type {type_:?}")]
    NotAssignable { type_: String },
    #[error("condition has type {received:?}, expected bool")]
    ConditionNotBool { received: String },
    #[error("conditional binding of non-maybe type {received:?}")]
    NotAMaybe { received: String },
    #[error("invalid redeclaration of {identifier:?}")]
    ValueAlreadyDefined { identifier: String },
    #[error("{identifier:?} is bound multiple times in the same pattern")]
    DuplicatePatternBinding { identifier: String },
    #[error("{identifier:?} is used multiple times in the same parameter list")]
    DuplicateParameter { identifier: String },
    #[error("local function cannot capture {identifier:?}")]
    CannotCaptureLocalValue { identifier: String },
    #[error("cannot dereference a value of type {type_:?}")]
    CannotDereference { type_: String },
    #[error("cannot force unwrap a value of type {type_:?}")]
    CannotForceUnwrap { type_: String },
    #[error("base of '->' has non-reference type {type_:?}")]
    ArrowBaseNotReference { type_: String },
    #[error("base of '.' has reference type {type_:?}")]
    DotBaseIsReference { type_: String },
    #[error("conditional branches have different types {then_type:?} and {else_type:?}")]
    ConditionalBranchMismatch { then_type: String, else_type: String },
    #[error("cannot take the address of a literal")]
    CannotTakeAddressOfLiteral,
    #[error("cannot take the address of function {identifier:?}")]
    CannotTakeAddressOfFunction { identifier: String },
    #[error("cannot take the address of a temporary value")]
    CannotTakeAddressOfTemporary,
}
