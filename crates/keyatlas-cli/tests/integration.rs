//! Integration tests for keyatlas batches
//!
//! These tests drive the whole pipeline (load, rewrite, resolve, bundle)
//! through a fake engine that records what it was asked to compile.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use keyatlas_ast::{Document, KeyCombo};
use clap::Parser;
use keyatlas_cli::{
    compile_batch, compile_with_engine, BatchError, BatchRequest, Cli, Inputs, OutputTarget,
    UnitOutcome, UnitStage,
};
use keyatlas_core::{CallerOptions, Platform};
use keyatlas_pdf::{Engine, PdfError, SourceBundle};
use tempfile::TempDir;

const EDITOR_YAML: &str = r#"app: Editor
subtitle: Essentials
columns: 2
sections:
  - name: Edit
    entries:
      - action: Copy
        keys: ["⌘", "C"]
      - action: Save all
        keys: ["⌘", "⌥", "S"]
        win_keys: ["Ctrl", "K", "S"]
"#;

const SHELL_YAML: &str = r#"app: Shell
sections:
  - name: Line
    entries:
      - action: Clear screen
        keys: ["⌃", "L"]
"#;

/// Engine that writes a placeholder PDF and can refuse chosen documents
#[derive(Default)]
struct FakeEngine {
    unavailable: bool,
    fail_marker: Option<String>,
    calls: RefCell<Vec<(PathBuf, SourceBundle)>>,
}

impl FakeEngine {
    fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            ..Default::default()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Engine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn ensure_available(&self) -> keyatlas_pdf::Result<()> {
        if self.unavailable {
            Err(PdfError::EngineUnavailable("fake engine is switched off".into()))
        } else {
            Ok(())
        }
    }

    fn compile(&self, bundle: &SourceBundle, output: &Path) -> keyatlas_pdf::Result<()> {
        self.calls
            .borrow_mut()
            .push((output.to_path_buf(), bundle.clone()));

        if let Some(marker) = &self.fail_marker {
            if bundle.data.contains(marker.as_str()) {
                return Err(PdfError::Compilation("simulated engine failure".into()));
            }
        }
        fs::write(output, b"%PDF-1.7 placeholder")?;
        Ok(())
    }
}

fn workspace() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let editor = dir.path().join("editor.yaml");
    let shell = dir.path().join("shell.yaml");
    fs::write(&editor, EDITOR_YAML).unwrap();
    fs::write(&shell, SHELL_YAML).unwrap();
    (dir, editor, shell)
}

fn request(inputs: Vec<PathBuf>, platforms: Vec<Platform>, target: OutputTarget) -> BatchRequest {
    BatchRequest {
        inputs: Inputs::Files(inputs),
        platforms,
        target,
        caller: CallerOptions::default(),
    }
}

fn pdf_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".pdf"))
        .collect();
    names.sort();
    names
}

#[test]
fn test_both_platforms_into_directory() {
    let (dir, editor, shell) = workspace();
    let out = dir.path().join("out");
    let engine = FakeEngine::default();

    let report = compile_batch(
        &request(
            vec![editor, shell],
            Platform::ALL.to_vec(),
            OutputTarget::Directory(out.clone()),
        ),
        &engine,
    )
    .unwrap();

    assert!(report.is_success());
    assert_eq!(report.units.len(), 4);
    assert_eq!(
        pdf_names(&out),
        vec![
            "editor-mac.pdf",
            "editor-windows.pdf",
            "shell-mac.pdf",
            "shell-windows.pdf"
        ]
    );
}

#[test]
fn test_single_platform_names_without_suffix() {
    let (dir, editor, shell) = workspace();
    let out = dir.path().join("out");
    let engine = FakeEngine::default();

    let report = compile_batch(
        &request(
            vec![editor, shell],
            vec![Platform::Windows],
            OutputTarget::Directory(out.clone()),
        ),
        &engine,
    )
    .unwrap();

    assert!(report.is_success());
    assert_eq!(pdf_names(&out), vec!["editor.pdf", "shell.pdf"]);
}

#[test]
fn test_windows_data_reaches_engine() {
    let (dir, editor, _) = workspace();
    let engine = FakeEngine::default();

    compile_batch(
        &request(
            vec![editor],
            vec![Platform::Windows],
            OutputTarget::File(dir.path().join("sheet.pdf")),
        ),
        &engine,
    )
    .unwrap();

    let calls = engine.calls.borrow();
    assert_eq!(calls.len(), 1);
    let (output, bundle) = &calls[0];
    assert_eq!(output, &dir.path().join("sheet.pdf"));

    let data: Document = serde_yaml::from_str(&bundle.data).unwrap();
    let entries = &data.sections[0].entries;
    assert_eq!(entries[0].keys, KeyCombo::chord(["Ctrl", "C"]));
    assert_eq!(entries[1].keys, KeyCombo::chord(["Ctrl", "K", "S"]));
    assert!(!bundle.data.contains("win_keys"));

    // Document setting reaches the template; untouched ones fall back.
    assert!(bundle.entrypoint.contains("  columns: 2,\n"));
    assert!(bundle.entrypoint.contains("  paper: \"us-letter\",\n"));
}

#[test]
fn test_caller_options_win_over_document() {
    let (dir, editor, _) = workspace();
    let engine = FakeEngine::default();
    let mut req = request(
        vec![editor],
        vec![Platform::Mac],
        OutputTarget::Directory(dir.path().to_path_buf()),
    );
    req.caller = CallerOptions {
        columns: Some(4),
        ..Default::default()
    };

    compile_batch(&req, &engine).unwrap();

    let calls = engine.calls.borrow();
    assert!(calls[0].1.entrypoint.contains("  columns: 4,\n"));
    assert!(calls[0].1.data.contains("⌘"));
}

#[test]
fn test_output_file_with_both_platforms_is_rejected() {
    let (dir, editor, _) = workspace();
    let engine = FakeEngine::default();

    let result = compile_batch(
        &request(
            vec![editor],
            Platform::ALL.to_vec(),
            OutputTarget::File(dir.path().join("sheet.pdf")),
        ),
        &engine,
    );

    assert!(matches!(
        result,
        Err(BatchError::OutputFileWithMultipleUnits { units: 2 })
    ));
    assert_eq!(engine.call_count(), 0);
    assert!(!dir.path().join("sheet.pdf").exists());
}

#[test]
fn test_output_file_with_two_documents_is_rejected() {
    let (dir, editor, shell) = workspace();
    let engine = FakeEngine::default();

    let result = compile_batch(
        &request(
            vec![editor, shell],
            vec![Platform::Mac],
            OutputTarget::File(dir.path().join("sheet.pdf")),
        ),
        &engine,
    );

    assert!(matches!(
        result,
        Err(BatchError::OutputFileWithMultipleUnits { .. })
    ));
    assert_eq!(engine.call_count(), 0);
}

#[test]
fn test_failing_document_does_not_stop_batch() {
    let (dir, editor, shell) = workspace();
    let out = dir.path().join("out");
    let engine = FakeEngine::failing_on("Shell");

    let report = compile_batch(
        &request(
            vec![shell, editor],
            vec![Platform::Mac],
            OutputTarget::Directory(out.clone()),
        ),
        &engine,
    )
    .unwrap();

    assert_eq!(report.failures(), 1);
    assert_eq!(report.successes(), 1);
    assert_eq!(engine.call_count(), 2);
    assert_eq!(pdf_names(&out), vec!["editor.pdf"]);

    let failed = report.failed().next().unwrap();
    assert!(failed.unit.input.ends_with("shell.yaml"));
    assert_eq!(
        failed.outcome,
        UnitOutcome::Failed {
            stage: UnitStage::EngineInvoked,
            message: "Typst compilation failed: simulated engine failure".into(),
        }
    );
}

#[test]
fn test_malformed_document_fails_its_units() {
    let (dir, editor, _) = workspace();
    let broken = dir.path().join("broken.yaml");
    fs::write(&broken, "sections: [unclosed").unwrap();
    let out = dir.path().join("out");
    let engine = FakeEngine::default();

    let report = compile_batch(
        &request(
            vec![broken, editor],
            Platform::ALL.to_vec(),
            OutputTarget::Directory(out.clone()),
        ),
        &engine,
    )
    .unwrap();

    assert_eq!(report.failures(), 2);
    assert_eq!(engine.call_count(), 2);
    assert_eq!(pdf_names(&out), vec!["editor-mac.pdf", "editor-windows.pdf"]);
    for failed in report.failed() {
        assert!(failed.unit.input.ends_with("broken.yaml"));
        assert!(matches!(
            failed.outcome,
            UnitOutcome::Failed {
                stage: UnitStage::Pending,
                ..
            }
        ));
    }
}

#[test]
fn test_unavailable_engine_stops_before_planning() {
    let (dir, editor, _) = workspace();
    let out = dir.path().join("out");
    let engine = FakeEngine {
        unavailable: true,
        ..Default::default()
    };

    let result = compile_batch(
        &request(vec![editor], vec![Platform::Mac], OutputTarget::Directory(out.clone())),
        &engine,
    );

    assert!(matches!(result, Err(BatchError::EngineUnavailable(_))));
    assert!(!out.exists());
    assert_eq!(engine.call_count(), 0);
}

#[test]
fn test_missing_input_is_precondition_failure() {
    let (dir, editor, _) = workspace();
    let engine = FakeEngine::default();

    let result = compile_batch(
        &request(
            vec![editor, dir.path().join("missing.yaml")],
            vec![Platform::Mac],
            OutputTarget::Directory(dir.path().to_path_buf()),
        ),
        &engine,
    );

    assert!(matches!(result, Err(BatchError::InputNotFound(_))));
    assert_eq!(engine.call_count(), 0);
}

#[test]
fn test_directory_discovery() {
    let (dir, _, _) = workspace();
    let out = dir.path().join("out");
    let engine = FakeEngine::default();

    let report = compile_batch(
        &BatchRequest {
            inputs: Inputs::Directory(dir.path().to_path_buf()),
            platforms: vec![Platform::Mac],
            target: OutputTarget::Directory(out.clone()),
            caller: CallerOptions::default(),
        },
        &engine,
    )
    .unwrap();

    assert!(report.is_success());
    let order: Vec<_> = report
        .units
        .iter()
        .map(|u| u.unit.input.file_name().unwrap().to_owned())
        .collect();
    assert_eq!(order, vec!["editor.yaml", "shell.yaml"]);
    assert_eq!(pdf_names(&out), vec!["editor.pdf", "shell.pdf"]);
}

#[test]
fn test_empty_data_directory() {
    let dir = TempDir::new().unwrap();
    let engine = FakeEngine::default();

    let result = compile_batch(
        &BatchRequest {
            inputs: Inputs::Directory(dir.path().to_path_buf()),
            platforms: vec![Platform::Mac],
            target: OutputTarget::CurrentDir,
            caller: CallerOptions::default(),
        },
        &engine,
    );

    assert!(matches!(result, Err(BatchError::NoInputs(_))));
}

#[test]
fn test_shipped_data_compiles() {
    let data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
    let out = TempDir::new().unwrap();
    let engine = FakeEngine::default();

    let report = compile_batch(
        &BatchRequest {
            inputs: Inputs::Directory(data_dir),
            platforms: Platform::ALL.to_vec(),
            target: OutputTarget::Directory(out.path().to_path_buf()),
            caller: CallerOptions::default(),
        },
        &engine,
    )
    .unwrap();

    assert!(report.is_success());
    assert!(report.units.len() >= 4);
    for (_, bundle) in engine.calls.borrow().iter() {
        assert!(serde_yaml::from_str::<Document>(&bundle.data).is_ok());
    }
}

fn cli_for(dir: &Path, inputs: &[&Path], extra: &[&str]) -> Cli {
    let config = dir.join("keyatlas.toml");
    fs::write(&config, "paper = \"a4\"\n").unwrap();

    let mut args = vec!["keyatlas".to_string()];
    args.extend(inputs.iter().map(|p| p.display().to_string()));
    args.push("--config".into());
    args.push(config.display().to_string());
    args.extend(extra.iter().map(|s| s.to_string()));
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn test_run_with_failures_is_an_error() {
    let (dir, editor, shell) = workspace();
    let out = dir.path().join("out");
    let cli = cli_for(
        dir.path(),
        &[&shell, &editor],
        &["--platform", "both", "-d", out.to_str().unwrap()],
    );
    let engine = FakeEngine::failing_on("Shell");

    let err = compile_with_engine(&cli, &engine).unwrap_err();

    assert_eq!(err.to_string(), "2 file(s) failed to compile");
    assert_eq!(engine.call_count(), 4);
    assert_eq!(pdf_names(&out), vec!["editor-mac.pdf", "editor-windows.pdf"]);
}

#[test]
fn test_run_without_failures_is_ok() {
    let (dir, editor, _) = workspace();
    let cli = cli_for(
        dir.path(),
        &[&editor],
        &["-o", dir.path().join("editor.pdf").to_str().unwrap()],
    );
    let engine = FakeEngine::default();

    compile_with_engine(&cli, &engine).unwrap();

    assert!(dir.path().join("editor.pdf").is_file());
    let calls = engine.calls.borrow();
    assert!(calls[0].1.entrypoint.contains("  paper: \"a4\",\n"));
}

#[test]
fn test_run_precondition_failure_is_an_error() {
    let (dir, editor, _) = workspace();
    let cli = cli_for(
        dir.path(),
        &[&editor],
        &["--platform", "both", "-o", dir.path().join("sheet.pdf").to_str().unwrap()],
    );
    let engine = FakeEngine::default();

    let err = compile_with_engine(&cli, &engine).unwrap_err();

    assert!(err.to_string().contains("-o/--output"));
    assert_eq!(engine.call_count(), 0);
}
