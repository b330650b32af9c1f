//! Error types for flowmood.

use std::path::PathBuf;
use thiserror::Error;

/// Central error type for all flowmood operations.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error accessing {path}: {error}")]
    IoWithPath {
        error: std::io::Error,
        path: PathBuf,
    },

    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Unsupported language for file: {0}")]
    UnsupportedLanguage(String),

    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    #[error("Malformed statement: {0}")]
    MalformedStatement(String),

    #[error("Flow-graph invariant violated: {0}")]
    Invariant(String),

    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Convenience result type used throughout.
pub type Result<T> = std::result::Result<T, FlowError>;

impl FlowError {
    /// Wrap an IO error with the path that produced it.
    pub fn io_with_path(error: std::io::Error, path: impl Into<PathBuf>) -> Self {
        FlowError::IoWithPath {
            error,
            path: path.into(),
        }
    }
}
