//! Error types for contentops.

use thiserror::Error;

/// Errors produced by the content automation engine and its storage.
#[derive(Debug, Error)]
pub enum ContentOpsError {
    /// Configuration could not be read, written or understood.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A `SQLite` operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// A requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// YAML (de)serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A template could not be rendered.
    #[error("Template error: {0}")]
    Template(String),

    /// An entity failed validation before being saved.
    #[error("Invalid {0}")]
    Validation(String),

    /// The requested operation is not available.
    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl From<rusqlite::Error> for ContentOpsError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}
