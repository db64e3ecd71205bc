//! Typst engines
//!
//! An [`Engine`] turns a [`SourceBundle`] into a PDF file. Two engines are
//! provided: [`TypstCli`] runs the external `typst` binary inside a scratch
//! directory, and [`EmbeddedTypst`] compiles in-process with typst-as-lib.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};
use typst_as_lib::TypstEngine;

use crate::error::{PdfError, Result};
use crate::payload::{SourceBundle, DATA_PATH, ENTRYPOINT_PATH, TEMPLATE_PATH};

/// Something that can typeset a cheat sheet
pub trait Engine {
    /// Human-readable engine name for messages
    fn name(&self) -> &str;

    /// Fail early if the engine cannot be used at all
    fn ensure_available(&self) -> Result<()>;

    /// Compile `bundle` and write the PDF to `output`
    fn compile(&self, bundle: &SourceBundle, output: &Path) -> Result<()>;
}

/// The external `typst` command-line compiler
#[derive(Debug, Clone)]
pub struct TypstCli {
    program: OsString,
}

impl TypstCli {
    /// Use `typst` from `PATH`
    pub fn new() -> Self {
        Self::with_program("typst")
    }

    /// Use a specific typst executable
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The program to spawn, fixed against the current directory
    ///
    /// `compile` runs inside a scratch directory, so a relative path such
    /// as `./tools/typst` has to be pinned before that happens.
    fn program_path(&self) -> Result<OsString> {
        Ok(resolve_program(&self.program, &std::env::current_dir()?))
    }
}

impl Default for TypstCli {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for TypstCli {
    fn name(&self) -> &str {
        "typst CLI"
    }

    fn ensure_available(&self) -> Result<()> {
        let program = self.program_path()?;
        let status = Command::new(&program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(PdfError::EngineUnavailable(format!(
                "{} CLI not found. Install it from https://github.com/typst/typst",
                Path::new(&program).display()
            ))),
        }
    }

    fn compile(&self, bundle: &SourceBundle, output: &Path) -> Result<()> {
        // The engine runs inside the scratch directory, so the output path
        // must not be relative to our own working directory.
        let output = absolute(output)?;
        let program = self.program_path()?;

        let scratch = tempfile::Builder::new().prefix("keyatlas-").tempdir()?;
        bundle.write_to(scratch.path())?;
        debug!(dir = %scratch.path().display(), "wrote typst sources");

        let result = Command::new(&program)
            .arg("compile")
            .arg(ENTRYPOINT_PATH)
            .arg(&output)
            .current_dir(scratch.path())
            .output()?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            return Err(PdfError::Compilation(if stderr.is_empty() {
                format!("typst exited with {}", result.status)
            } else {
                stderr
            }));
        }

        info!(output = %output.display(), "typst CLI wrote PDF");
        Ok(())
    }
}

/// In-process Typst via typst-as-lib
#[derive(Debug, Clone, Default)]
pub struct EmbeddedTypst {
    fonts: Vec<Vec<u8>>,
}

impl EmbeddedTypst {
    /// Engine with no extra fonts
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that loads the given font files
    ///
    /// # Arguments
    /// * `font_paths` - Paths to font files to include
    pub fn with_fonts(font_paths: &[PathBuf]) -> Result<Self> {
        let mut fonts = Vec::with_capacity(font_paths.len());
        for font_path in font_paths {
            let font_bytes = fs::read(font_path).map_err(|e| {
                PdfError::Font(format!("Failed to read font {}: {}", font_path.display(), e))
            })?;
            fonts.push(font_bytes);
        }
        Ok(Self { fonts })
    }

    /// Compile a bundle to PDF bytes
    pub fn compile_to_bytes(&self, bundle: &SourceBundle) -> Result<Vec<u8>> {
        let mut builder = TypstEngine::builder()
            .main_file(bundle.entrypoint.clone())
            .with_static_source_file_resolver([(TEMPLATE_PATH, bundle.template.to_string())])
            .with_static_file_resolver([(DATA_PATH, bundle.data.as_bytes().to_vec())]);

        for font_bytes in &self.fonts {
            builder = builder.fonts([font_bytes.clone()]);
        }

        let engine = builder.build();

        // compiled is Warned<Result<Document, Error>>
        let compiled = engine.compile();
        let document = compiled
            .output
            .map_err(|e| PdfError::Compilation(format!("{:?}", e)))?;

        let options = typst_pdf::PdfOptions::default();
        let pdf_bytes = typst_pdf::pdf(&document, &options)
            .map_err(|e| PdfError::Compilation(format!("PDF generation failed: {:?}", e)))?;

        Ok(pdf_bytes.into())
    }
}

impl Engine for EmbeddedTypst {
    fn name(&self) -> &str {
        "embedded typst"
    }

    fn ensure_available(&self) -> Result<()> {
        Ok(())
    }

    fn compile(&self, bundle: &SourceBundle, output: &Path) -> Result<()> {
        let pdf = self.compile_to_bytes(bundle)?;
        fs::write(output, &pdf)?;
        info!(output = %output.display(), bytes = pdf.len(), "embedded typst wrote PDF");
        Ok(())
    }
}

/// Bare names are left for `PATH` lookup; relative paths join `cwd`
fn resolve_program(program: &OsStr, cwd: &Path) -> OsString {
    let path = Path::new(program);
    if path.is_relative() && path.components().count() > 1 {
        cwd.join(path).into_os_string()
    } else {
        program.to_os_string()
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
