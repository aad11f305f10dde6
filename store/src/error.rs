//! Error types for store operations.
//!
//! One error type covers every way loading a schema document, writing
//! artifacts, or reading a config or manifest can fail.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The schema file extension names no supported document format.
    #[error("unsupported schema format: {0}")]
    UnsupportedFormat(String),

    /// An artifact path is absolute or climbs out of the output root.
    #[error("artifact path escapes the output root: {0}")]
    PathEscapesRoot(String),
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
