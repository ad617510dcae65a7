//! Error types for qexpand

use thiserror::Error;

/// A bracketed placeholder was bound to something other than a sequence.
///
/// `token` is the literal text found in the query, e.g. `[?]` or `[:ids]`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("found {token} in query, but its parameter is not a sequence")]
pub struct ShapeError {
    pub token: String,
}

impl ShapeError {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

/// Core error type for qexpand operations
#[derive(Error, Debug)]
pub enum QexpandError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for qexpand operations
pub type Result<T> = std::result::Result<T, QexpandError>;
