//! Defines the error types for the analysis module.
use thiserror::Error;

/// A code fragment could not be scanned for symbols.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Parse error on line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }
}

/// A dependency cycle among precomputed symbols prevents ordering them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cycle detected among precomputed symbols {cycle:?}")]
pub struct CycleError {
    /// Names lying on a dependency cycle, sorted.
    pub cycle: Vec<String>,
    /// Names that are not on a cycle themselves but depend on one, sorted.
    pub blocked: Vec<String>,
}
