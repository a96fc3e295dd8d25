use thiserror::Error;

/// Typed errors produced during evaluation. The first error aborts the whole
/// program; there is no recovery.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Unresolved identifier '{name}'")]
    UnresolvedIdentifier { name: String },
    #[error("Variable '{name}' is already declared")]
    AlreadyDeclared { name: String },
    #[error("Cannot reassign constant '{name}'")]
    ConstantReassignment { name: String },
    #[error("Invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("Operator '{op}' expects numeric operands, got {left} and {right}")]
    UnsupportedOperand {
        op: String,
        left: &'static str,
        right: &'static str,
    },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Cannot access property '{property}' on a value of type {type_name}")]
    NotAnObject {
        property: String,
        type_name: &'static str,
    },
    #[error("Property '{property}' does not exist")]
    MissingProperty { property: String },
    #[error("Value of type {type_name} is not callable")]
    NotCallable { type_name: &'static str },
    #[error("Function '{name}' expected {expected} arguments, got {found}")]
    FunctionArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Condition must evaluate to a boolean, got {type_name}")]
    ExpectedBooleanCondition { type_name: &'static str },
    #[error("'break' outside of a while loop")]
    BreakOutsideLoop,
    #[error("Thrown: {value}")]
    UserThrown { value: String },
    #[error("I/O error: {message}")]
    Io { message: String },
}
