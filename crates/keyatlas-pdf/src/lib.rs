//! keyatlas-pdf - Cheat sheet PDFs via Typst
//!
//! This crate turns a platform-rewritten document and its resolved settings
//! into a PDF using Typst as the typesetting backend.
//!
//! # Architecture
//!
//! The PDF generation pipeline consists of two stages:
//!
//! 1. **Payload** - Generates the Typst entrypoint from a `ResolvedConfig`
//!    and bundles it with the YAML data and the shared template
//! 2. **Engine** - Compiles the bundle to a PDF file
//!
//! # Example
//!
//! ```ignore
//! use keyatlas_core::{CallerOptions, ResolvedConfig};
//! use keyatlas_pdf::{Engine, EmbeddedTypst, Payload};
//!
//! let config = ResolvedConfig::resolve(&doc, &CallerOptions::default());
//! let bundle = Payload::bundle(&doc, &config)?;
//! EmbeddedTypst::new().compile(&bundle, "sheet.pdf".as_ref())?;
//! ```

mod engine;
mod error;
pub mod payload;

pub use engine::{EmbeddedTypst, Engine, TypstCli};
pub use error::{PdfError, Result};
pub use payload::{literal, string_literal, Payload, SourceBundle, TEMPLATE};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        // Verify exports are accessible
        let _ = Payload::entrypoint;
        let _ = Payload::bundle;
        let _ = TypstCli::new;
        let _ = EmbeddedTypst::new;
    }
}
