//! Error types for PDF generation

use thiserror::Error;

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Errors that can occur during PDF generation
#[derive(Error, Debug)]
pub enum PdfError {
    /// Typst rejected the sources; carries the engine's diagnostic text
    #[error("Typst compilation failed: {0}")]
    Compilation(String),

    /// The engine cannot be used at all
    #[error("Typst engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Font loading error
    #[error("Font error: {0}")]
    Font(String),

    /// The platform data could not be serialized for the engine
    #[error("Failed to serialize sheet data: {0}")]
    Serialize(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<keyatlas_core::CoreError> for PdfError {
    fn from(err: keyatlas_core::CoreError) -> Self {
        match err {
            keyatlas_core::CoreError::Io(e) => PdfError::Io(e),
            other => PdfError::Serialize(other.to_string()),
        }
    }
}
