//! Error types for Oolong

use thiserror::Error;

/// Oolong error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// A selection name was registered twice within one batch
    #[error("duplicate selection '{0}'")]
    DuplicateSelection(String),

    /// A region or mask lookup referenced a selection that was never added
    #[error("unknown selection '{0}'")]
    UnknownSelection(String),

    /// Histogram fill error
    #[error("Histogram fill error: {0}")]
    HistogramFill(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
