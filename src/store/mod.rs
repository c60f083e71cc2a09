//! Code blocks, their typed bindings and the precomputed symbol registry.
pub mod code_block;
pub mod error;
pub mod registry;
pub mod types;

pub use code_block::{CodeBlock, Evaluator};
pub use error::EvalError;
pub use registry::PrecomputedLibrary;
pub use types::{Context, Value};
