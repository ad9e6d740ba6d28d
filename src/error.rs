//! Error types for `claude_hooks`.

use std::path::PathBuf;

/// Errors that can occur in the hooks and the event log.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing or serialization error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The hook input was not a JSON object.
    #[error("Invalid hook input: {0}")]
    InvalidInput(String),

    /// A session backup could not be written.
    #[error("Could not write session backup {path}: {source}")]
    Backup {
        /// The backup file that was being written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
