//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{debug, warn, Level};

use keyatlas_core::{CallerOptions, Orientation, Platform};
use keyatlas_pdf::{EmbeddedTypst, Engine, TypstCli};

use crate::batch::{compile_batch, BatchRequest, Inputs, OutputTarget, DEFAULT_DATA_DIR};

/// Caller config file picked up from the working directory
pub const CONFIG_FILE: &str = "keyatlas.toml";

/// Which platforms to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    /// macOS symbols (the labels as written)
    #[default]
    Mac,
    /// Windows names
    Windows,
    /// One sheet per platform
    Both,
}

impl PlatformArg {
    /// Platforms in build order
    pub fn platforms(self) -> Vec<Platform> {
        match self {
            PlatformArg::Mac => vec![Platform::Mac],
            PlatformArg::Windows => vec![Platform::Windows],
            PlatformArg::Both => Platform::ALL.to_vec(),
        }
    }
}

/// Typesetting backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    /// External `typst` binary
    #[default]
    Typst,
    /// Typst compiled into keyatlas
    Embedded,
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrientationArg {
    /// Wide pages
    Landscape,
    /// Tall pages
    Portrait,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Landscape => Orientation::Landscape,
            OrientationArg::Portrait => Orientation::Portrait,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "keyatlas")]
#[command(
    author,
    version = keyatlas_core::VERSION,
    about = "Compile keybinding cheat sheet PDFs from YAML files",
    long_about = None
)]
pub struct Cli {
    /// YAML files to compile (default: every *.yaml in data/)
    #[arg(value_name = "YAML")]
    pub inputs: Vec<PathBuf>,

    /// Output PDF path (only valid when a single PDF is produced)
    #[arg(short, long, value_name = "FILE", conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Output directory for auto-named PDFs
    #[arg(short = 'd', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Paper size (e.g. "us-letter", "a4")
    #[arg(short, long)]
    pub paper: Option<String>,

    /// Accent color as hex (e.g. "#4a90d9")
    #[arg(short, long)]
    pub color: Option<String>,

    /// Font scale multiplier
    #[arg(short = 's', long)]
    pub font_scale: Option<f64>,

    /// Page orientation
    #[arg(long, value_enum)]
    pub orientation: Option<OrientationArg>,

    /// Number of columns
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub columns: Option<u32>,

    /// Target platform for key labels
    #[arg(long, value_enum, default_value = "mac")]
    pub platform: PlatformArg,

    /// Caller config file (default: keyatlas.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Typesetting engine
    #[arg(long, value_enum, default_value = "typst")]
    pub engine: EngineArg,

    /// Typst executable used by the typst engine
    #[arg(long, value_name = "PATH", default_value = "typst")]
    pub typst_bin: PathBuf,

    /// Extra font file for the embedded engine
    #[arg(long = "font", value_name = "PATH")]
    pub fonts: Vec<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Settings given as flags
    pub fn caller_options(&self) -> CallerOptions {
        CallerOptions {
            paper: self.paper.clone(),
            color: self.color.clone(),
            font_scale: self.font_scale,
            orientation: self.orientation.map(Orientation::from),
            columns: self.columns,
        }
    }

    /// Where the inputs come from
    pub fn inputs(&self) -> Inputs {
        if self.inputs.is_empty() {
            Inputs::Directory(PathBuf::from(DEFAULT_DATA_DIR))
        } else {
            Inputs::Files(self.inputs.clone())
        }
    }

    /// Where the PDFs go
    pub fn output_target(&self) -> OutputTarget {
        match (&self.output, &self.output_dir) {
            (Some(file), _) => OutputTarget::File(file.clone()),
            (None, Some(dir)) => OutputTarget::Directory(dir.clone()),
            (None, None) => OutputTarget::CurrentDir,
        }
    }

    /// Build the selected engine
    pub fn engine(&self) -> Result<Box<dyn Engine>> {
        match self.engine {
            EngineArg::Typst => Ok(Box::new(TypstCli::with_program(self.typst_bin.as_os_str()))),
            EngineArg::Embedded => {
                let engine = EmbeddedTypst::with_fonts(&self.fonts)
                    .context("Failed to load fonts for the embedded engine")?;
                Ok(Box::new(engine))
            }
        }
    }

    /// Combine the config file with the flags, flags winning
    pub fn batch_request(&self, file_options: CallerOptions) -> BatchRequest {
        BatchRequest {
            inputs: self.inputs(),
            platforms: self.platform.platforms(),
            target: self.output_target(),
            caller: file_options.overlay(self.caller_options()),
        }
    }
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments, sets up logging and compiles the batch.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    compile_command(&cli)
}

/// Execute a compilation run
pub fn compile_command(cli: &Cli) -> Result<()> {
    if !cli.fonts.is_empty() && cli.engine != EngineArg::Embedded {
        warn!("--font only applies to the embedded engine");
    }

    let engine = cli.engine()?;
    compile_with_engine(cli, engine.as_ref())
}

/// Execute a compilation run with an already chosen engine
///
/// Fails when any sheet failed, so the process exits non-zero.
pub fn compile_with_engine(cli: &Cli, engine: &dyn Engine) -> Result<()> {
    let file_options = load_caller_options(cli.config.as_deref())?;
    let request = cli.batch_request(file_options);
    debug!(?request, "batch request");

    let report = compile_batch(&request, engine)?;
    if report.failures() > 0 {
        anyhow::bail!("{} file(s) failed to compile", report.failures());
    }

    Ok(())
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` directives still apply on top of the level picked here.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    // A subscriber may already be installed when embedded in another tool.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load caller settings from a config file if available
pub fn load_caller_options(config_path: Option<&Path>) -> Result<CallerOptions> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            parse_caller_options(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        }
        None => {
            let candidate = Path::new(CONFIG_FILE);
            if candidate.exists() {
                let content = fs::read_to_string(candidate)?;
                match parse_caller_options(&content) {
                    Ok(options) => {
                        debug!(path = CONFIG_FILE, "loaded caller config");
                        return Ok(options);
                    }
                    Err(e) => warn!(path = CONFIG_FILE, error = %e, "ignoring invalid config"),
                }
            }
            Ok(CallerOptions::default())
        }
    }
}

/// Parse a caller config document
pub fn parse_caller_options(content: &str) -> Result<CallerOptions> {
    Ok(toml::from_str(content)?)
}
