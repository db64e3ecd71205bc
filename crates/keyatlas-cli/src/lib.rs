//! keyatlas CLI - Command-line interface library
//!
//! This library provides the CLI functionality for keyatlas:
//! - Batch: compile every (document, platform) pair into a PDF
//! - App: argument parsing, caller config loading and logging setup
//!
//! # Library Usage
//!
//! ```ignore
//! use keyatlas_cli::{compile_batch, BatchRequest, Inputs, OutputTarget};
//! use keyatlas_core::{CallerOptions, Platform};
//! use keyatlas_pdf::EmbeddedTypst;
//!
//! let request = BatchRequest {
//!     inputs: Inputs::Directory("data".into()),
//!     platforms: Platform::ALL.to_vec(),
//!     target: OutputTarget::Directory("out".into()),
//!     caller: CallerOptions::default(),
//! };
//! let report = compile_batch(&request, &EmbeddedTypst::new())?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Every data/*.yaml, macOS labels, into the working directory
//! keyatlas
//!
//! # Both platforms into out/
//! keyatlas data/vscode.yaml --platform both -d out
//!
//! # One sheet, explicit path and settings
//! keyatlas data/vscode.yaml -o vscode.pdf -p a4 -n 2 --orientation portrait
//! ```

pub mod app;
pub mod batch;

// Re-export main entry point and types
pub use app::{
    compile_command, compile_with_engine, load_caller_options, run_cli, Cli, EngineArg, PlatformArg,
};
pub use batch::{
    compile_batch, BatchError, BatchReport, BatchRequest, CompilationUnit, Inputs, OutputTarget,
    UnitOutcome, UnitStage,
};
