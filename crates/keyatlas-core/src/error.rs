//! Error types for document loading

use std::path::PathBuf;

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while reading or writing cheat sheet documents
#[derive(Error, Debug)]
pub enum CoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid YAML or does not match the data model
    #[error("Failed to parse {}: {message}", .path.display())]
    Parse {
        /// Offending document
        path: PathBuf,
        /// Parser diagnostic
        message: String,
    },

    /// The document could not be written back out as YAML
    #[error("Failed to serialize document: {0}")]
    Serialize(String),
}
