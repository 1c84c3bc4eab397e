//! Error types for analysis.

use thiserror::Error;

/// Errors raised while analyzing a prompt.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The analyzer reported a failure.
    #[error("{0}")]
    Failed(String),

    /// The analyzer panicked.
    #[error("analyzer panicked: {0}")]
    Panicked(String),

    /// Recording a flagged interaction failed.
    #[error("sink error: {0}")]
    Sink(String),
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors from updating a single setting by name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// The key names no setting.
    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    /// The value could not be parsed for the key.
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
