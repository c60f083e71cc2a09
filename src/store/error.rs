//! Defines the error types raised while evaluating a code block.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("No binding named '{name}' in the evaluation context")]
    MissingBinding { name: String },
    #[error("Binding '{name}' has type {found}, expected {expected}")]
    TypeMismatch { name: String, expected: &'static str, found: &'static str },
    #[error("Index {index} out of bounds for array '{name}' of length {len}")]
    IndexOutOfBounds { name: String, index: usize, len: usize },
    #[error("Code block '{0}' has no direct evaluator")]
    NotEvaluable(String),
}
