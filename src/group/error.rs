//! Defines the error types for group resolution and code assembly.
use crate::analysis::CycleError;
use thiserror::Error;

/// Failure reported by an external equation body generator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to generate code for equation class '{class_name}': {message}")]
pub struct GenerateError {
    pub class_name: String,
    pub message: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error(transparent)]
    Cycle(#[from] CycleError),
    #[error("Equation '{equation}' references unknown symbol '{symbol}' in its {phase} phase")]
    UnknownSymbol { equation: String, symbol: String, phase: String },
    #[error(transparent)]
    Generator(#[from] GenerateError),
}
