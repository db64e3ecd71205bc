//! Batch compilation
//!
//! A batch is every input document crossed with every requested platform.
//! Units run one at a time, documents in the outer loop and platforms in
//! the inner loop. A failing unit is reported and counted, and the batch
//! moves on; only precondition failures stop a run before it starts.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::{glob, Pattern};
use keyatlas_ast::Document;
use keyatlas_core::{load_document, rewrite_for_platform, CallerOptions, Platform, ResolvedConfig};
use keyatlas_pdf::{Engine, Payload};
use thiserror::Error;
use tracing::{debug, info_span, warn};

/// Directory searched when no inputs are given
pub const DEFAULT_DATA_DIR: &str = "data";

/// Failures that abort a batch before any compilation starts
#[derive(Error, Debug)]
pub enum BatchError {
    /// The engine cannot run at all
    #[error("{0}")]
    EngineUnavailable(String),

    /// Input discovery found nothing
    #[error("No YAML files found in {}", .0.display())]
    NoInputs(PathBuf),

    /// An explicitly named input does not exist
    #[error("{} not found", .0.display())]
    InputNotFound(PathBuf),

    /// Nothing to build for
    #[error("No target platform requested")]
    NoPlatforms,

    /// A single output path was given but several sheets would be produced
    #[error(
        "-o/--output can only be used when exactly one PDF is produced \
         ({units} would share the same output path)"
    )]
    OutputFileWithMultipleUnits {
        /// Number of sheets that would have been produced
        units: usize,
    },

    /// The output location could not be prepared
    #[error("Failed to prepare output directory {}: {source}", .path.display())]
    OutputDir {
        /// Directory that could not be created or resolved
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
}

/// Where input documents come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inputs {
    /// These files, in this order
    Files(Vec<PathBuf>),
    /// Every `*.yaml` file in a directory, sorted
    Directory(PathBuf),
}

/// Where PDFs are written
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputTarget {
    /// One explicit file; valid only for a single unit
    File(PathBuf),
    /// Auto-named files in this directory (created if missing)
    Directory(PathBuf),
    /// Auto-named files in the working directory
    #[default]
    CurrentDir,
}

/// Everything a batch needs besides the engine
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// Input documents
    pub inputs: Inputs,
    /// Platforms to build each document for, in order
    pub platforms: Vec<Platform>,
    /// Output location
    pub target: OutputTarget,
    /// Caller-tier settings
    pub caller: CallerOptions,
}

/// One sheet to produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    /// Source document
    pub input: PathBuf,
    /// Target label convention
    pub platform: Platform,
    /// PDF to write
    pub output: PathBuf,
}

/// Progress of a unit through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStage {
    /// Not started
    Pending,
    /// Key labels rewritten for the platform
    Mapped,
    /// Engine payload generated
    PayloadBuilt,
    /// Engine called
    EngineInvoked,
    /// PDF written
    Succeeded,
    /// Gave up; see the failure message
    Failed,
}

impl fmt::Display for UnitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitStage::Pending => "pending",
            UnitStage::Mapped => "mapped",
            UnitStage::PayloadBuilt => "payload-built",
            UnitStage::EngineInvoked => "engine-invoked",
            UnitStage::Succeeded => "succeeded",
            UnitStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// The PDF was written
    Succeeded,
    /// The unit failed after reaching `stage`
    Failed {
        /// Last stage reached before the failure
        stage: UnitStage,
        /// Diagnostic text
        message: String,
    },
}

/// A unit and what happened to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    /// The unit
    pub unit: CompilationUnit,
    /// Its outcome
    pub outcome: UnitOutcome,
}

/// Outcome of a whole batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Every unit, in execution order
    pub units: Vec<UnitReport>,
}

impl BatchReport {
    /// Number of failed units
    pub fn failures(&self) -> usize {
        self.failed().count()
    }

    /// Number of PDFs written
    pub fn successes(&self) -> usize {
        self.units.len() - self.failures()
    }

    /// Check if every unit succeeded
    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    /// Failed units
    pub fn failed(&self) -> impl Iterator<Item = &UnitReport> {
        self.units
            .iter()
            .filter(|r| matches!(r.outcome, UnitOutcome::Failed { .. }))
    }

    fn record(&mut self, unit: CompilationUnit, outcome: UnitOutcome) {
        self.units.push(UnitReport { unit, outcome });
    }
}

/// Units grouped by source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// `(document, units for that document)` in input order
    pub documents: Vec<(PathBuf, Vec<CompilationUnit>)>,
}

impl Plan {
    /// Total number of units
    pub fn unit_count(&self) -> usize {
        self.documents.iter().map(|(_, units)| units.len()).sum()
    }
}

enum Placement {
    Fixed(PathBuf),
    Named(PathBuf),
}

impl BatchRequest {
    /// Validate the request and lay out every unit
    ///
    /// Creates the output directory in [`OutputTarget::Directory`] mode.
    pub fn plan(&self) -> Result<Plan, BatchError> {
        let inputs = resolve_inputs(&self.inputs)?;
        if self.platforms.is_empty() {
            return Err(BatchError::NoPlatforms);
        }

        let units = inputs.len() * self.platforms.len();
        let placement = match &self.target {
            OutputTarget::File(_) if units > 1 => {
                return Err(BatchError::OutputFileWithMultipleUnits { units });
            }
            OutputTarget::File(path) => Placement::Fixed(absolute(path)?),
            OutputTarget::Directory(dir) => {
                fs::create_dir_all(dir).map_err(|source| BatchError::OutputDir {
                    path: dir.clone(),
                    source,
                })?;
                Placement::Named(absolute(dir)?)
            }
            OutputTarget::CurrentDir => Placement::Named(absolute(Path::new("."))?),
        };

        let suffixed = self.platforms.len() > 1;
        let mut documents = Vec::with_capacity(inputs.len());
        for input in inputs {
            let mut doc_units = Vec::with_capacity(self.platforms.len());
            for &platform in &self.platforms {
                let output = match &placement {
                    Placement::Fixed(path) => path.clone(),
                    Placement::Named(dir) => dir.join(output_file_name(&input, platform, suffixed)),
                };
                doc_units.push(CompilationUnit {
                    input: input.clone(),
                    platform,
                    output,
                });
            }
            documents.push((input, doc_units));
        }

        Ok(Plan { documents })
    }
}

/// Check preconditions, then compile every unit of the batch
pub fn compile_batch(request: &BatchRequest, engine: &dyn Engine) -> Result<BatchReport, BatchError> {
    engine
        .ensure_available()
        .map_err(|e| BatchError::EngineUnavailable(e.to_string()))?;

    let plan = request.plan()?;
    debug!(
        engine = engine.name(),
        units = plan.unit_count(),
        "planned batch"
    );

    Ok(run_plan(&plan, &request.caller, engine))
}

/// Compile a validated plan
pub fn run_plan(plan: &Plan, caller: &CallerOptions, engine: &dyn Engine) -> BatchReport {
    let mut report = BatchReport::default();

    for (input, units) in &plan.documents {
        let doc = match load_document(input) {
            Ok(doc) => doc,
            Err(e) => {
                report_failure(input, &e.to_string());
                for unit in units {
                    report.record(
                        unit.clone(),
                        UnitOutcome::Failed {
                            stage: UnitStage::Pending,
                            message: e.to_string(),
                        },
                    );
                }
                continue;
            }
        };

        // Settings do not depend on the platform, so resolve them once.
        let config = ResolvedConfig::resolve(&doc, caller);

        for unit in units {
            let outcome = compile_unit(&doc, &config, unit, engine);
            match &outcome {
                UnitOutcome::Succeeded => println!("Compiled {}", unit.output.display()),
                UnitOutcome::Failed { message, .. } => report_failure(input, message),
            }
            report.record(unit.clone(), outcome);
        }
    }

    if !report.is_success() {
        warn!(failures = report.failures(), "batch finished with failures");
    }
    report
}

/// Run one unit through mapping, payload generation and the engine
pub fn compile_unit(
    doc: &Document,
    config: &ResolvedConfig,
    unit: &CompilationUnit,
    engine: &dyn Engine,
) -> UnitOutcome {
    let span = info_span!("unit", input = %unit.input.display(), platform = %unit.platform);
    let _guard = span.enter();

    let mut stage = UnitStage::Pending;
    debug!(%stage);

    let data = rewrite_for_platform(doc, unit.platform);
    stage = UnitStage::Mapped;
    debug!(%stage);

    let bundle = match Payload::bundle(&data, config) {
        Ok(bundle) => bundle,
        Err(e) => return failed(stage, e.to_string()),
    };
    stage = UnitStage::PayloadBuilt;
    debug!(%stage);

    stage = UnitStage::EngineInvoked;
    debug!(%stage, engine = engine.name());
    if let Err(e) = engine.compile(&bundle, &unit.output) {
        return failed(stage, e.to_string());
    }

    debug!(stage = %UnitStage::Succeeded, output = %unit.output.display());
    UnitOutcome::Succeeded
}

fn failed(stage: UnitStage, message: String) -> UnitOutcome {
    debug!(stage = %UnitStage::Failed, after = %stage, %message);
    UnitOutcome::Failed { stage, message }
}

fn report_failure(input: &Path, message: &str) {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    eprintln!("Error compiling {}:", name);
    eprintln!("{}", message);
}

/// Resolve the input list, checking explicit files exist
pub fn resolve_inputs(inputs: &Inputs) -> Result<Vec<PathBuf>, BatchError> {
    match inputs {
        Inputs::Files(files) if files.is_empty() => Err(BatchError::NoInputs(PathBuf::from("."))),
        Inputs::Files(files) => {
            for file in files {
                if !file.exists() {
                    return Err(BatchError::InputNotFound(file.clone()));
                }
            }
            Ok(files.clone())
        }
        Inputs::Directory(dir) => {
            let found = discover_inputs(dir);
            if found.is_empty() {
                Err(BatchError::NoInputs(dir.clone()))
            } else {
                Ok(found)
            }
        }
    }
}

/// Every `*.yaml` file directly under `dir`, sorted
pub fn discover_inputs(dir: &Path) -> Vec<PathBuf> {
    let pattern = format!(
        "{}/*.yaml",
        Pattern::escape(&dir.display().to_string())
    );

    let mut found = Vec::new();
    match glob(&pattern) {
        Ok(paths) => {
            for entry in paths {
                match entry {
                    Ok(path) if path.is_file() => found.push(path),
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "could not read input candidate"),
                }
            }
        }
        Err(e) => warn!(%pattern, error = %e, "invalid input pattern"),
    }
    found.sort();
    found
}

/// `{stem}.pdf`, or `{stem}-{platform}.pdf` when several platforms are built
pub fn output_file_name(input: &Path, platform: Platform, suffixed: bool) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cheatsheet".to_string());
    if suffixed {
        format!("{}-{}.pdf", stem, platform.name())
    } else {
        format!("{}.pdf", stem)
    }
}

fn absolute(path: &Path) -> Result<PathBuf, BatchError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|source| BatchError::OutputDir {
            path: path.to_path_buf(),
            source,
        })
}
