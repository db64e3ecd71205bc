//! Every shipped cheat sheet compiles to a PDF for every platform

use std::fs;
use std::path::{Path, PathBuf};

use keyatlas_core::{load_document, rewrite_for_platform, CallerOptions, Platform, ResolvedConfig};
use keyatlas_pdf::{EmbeddedTypst, Payload};

fn shipped_documents() -> Vec<PathBuf> {
    let data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
    let mut docs: Vec<PathBuf> = fs::read_dir(data_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "yaml"))
        .collect();
    docs.sort();
    docs
}

#[test]
fn test_shipped_data_compiles_with_embedded_typst() {
    let docs = shipped_documents();
    assert!(!docs.is_empty());

    let engine = EmbeddedTypst::new();
    for path in docs {
        let doc = load_document(&path).unwrap();
        let config = ResolvedConfig::resolve(&doc, &CallerOptions::default());

        for platform in Platform::ALL {
            let data = rewrite_for_platform(&doc, platform);
            let bundle = Payload::bundle(&data, &config).unwrap();

            let result = engine.compile_to_bytes(&bundle);
            assert!(
                result.is_ok(),
                "{} ({}) failed: {:?}",
                path.display(),
                platform,
                result.err()
            );
            let pdf = result.unwrap();
            assert!(pdf.starts_with(b"%PDF"));
        }
    }
}
