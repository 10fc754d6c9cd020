//! Error types for sweep and comparison runs.

use qwalk_sim::SimError;
use thiserror::Error;

/// Errors produced while loading a configuration or running an analysis.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    /// The walk engine rejected an input.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// The configuration file could not be read.
    #[error("IO error: {0}")]
    Io(String),

    /// The configuration text is not valid YAML for the expected schema.
    #[error("Parse error: {0}")]
    Config(String),

    /// The configuration parsed but describes an impossible run.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
