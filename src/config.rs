//! Configuration for group code assembly.
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid assembler configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Controls the spelling of generated code and the strictness of symbol checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Receiver through which generated code reaches equation instances.
    /// Also the implicit first parameter dropped from behavior signatures.
    pub receiver: String,
    /// Method of the kernel object that evaluates the kernel value.
    pub kernel_method: String,
    /// Method of the kernel object that evaluates the kernel gradient.
    pub gradient_method: String,
    /// Fail group resolution on per-pair parameters outside the symbol
    /// vocabulary instead of silently dropping them.
    pub strict_symbols: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            receiver: "self".to_string(),
            kernel_method: "kernel".to_string(),
            gradient_method: "gradient".to_string(),
            strict_symbols: false,
        }
    }
}

impl AssemblerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn strict() -> Self {
        Self { strict_symbols: true, ..Default::default() }
    }
}
