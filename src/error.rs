//! Error types for CIM.

use thiserror::Error;

/// CIM error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Entity names must contain at least one byte
    #[error("Entity name is empty")]
    EmptyEntityName,

    /// Remote fetch failed before a response arrived, or returned a non-success status
    #[error("Transport error: {0}")]
    Transport(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON syntax error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed JSON that is not an entity document
    #[error("Invalid entity document: {0}")]
    InvalidDocument(String),
}

/// Result type alias for CIM operations.
pub type Result<T> = std::result::Result<T, Error>;
