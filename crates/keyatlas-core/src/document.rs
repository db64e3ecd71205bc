//! Reading and writing cheat sheet YAML

use std::fs;
use std::path::Path;

use keyatlas_ast::Document;
use tracing::debug;

use crate::error::{CoreError, Result};

/// Load a document from a YAML file
pub fn load_document(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path)?;
    let doc = parse_document(&content).map_err(|e| match e {
        CoreError::Parse { message, .. } => CoreError::Parse {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })?;
    debug!(
        path = %path.display(),
        sections = doc.sections.len(),
        "loaded document"
    );
    Ok(doc)
}

/// Parse a document from YAML text
///
/// Parse errors carry an empty path; [`load_document`] fills it in.
pub fn parse_document(yaml: &str) -> Result<Document> {
    serde_yaml::from_str(yaml).map_err(|e| CoreError::Parse {
        path: Default::default(),
        message: e.to_string(),
    })
}

/// Serialize a document back to YAML, e.g. after a platform rewrite
pub fn to_yaml(doc: &Document) -> Result<String> {
    serde_yaml::to_string(doc).map_err(|e| CoreError::Serialize(e.to_string()))
}
