//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use cleansource_scanner::DigestAlgorithm;

/// cleansource -- source-tree fingerprint and dependency inspection.
///
/// Use `cleansource <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "cleansource", version, about, long_about = None)]
pub struct Cli {
    /// Path to the cleansource.toml configuration file.
    ///
    /// A missing file falls back to built-in defaults.
    #[arg(short, long, global = true, default_value = "cleansource.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fingerprint a source tree and resolve build-tool dependencies.
    Scan(ScanArgs),

    /// Generate only the fingerprint artifact.
    Fingerprint(FingerprintArgs),

    /// List build tools detected in a directory.
    Detect(DetectArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

/// Digest algorithm selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DigestArg {
    Md5,
    Sha256,
}

impl From<DigestArg> for DigestAlgorithm {
    fn from(arg: DigestArg) -> Self {
        match arg {
            DigestArg::Md5 => DigestAlgorithm::Md5,
            DigestArg::Sha256 => DigestAlgorithm::Sha256,
        }
    }
}

// ---- scan ----

/// Run fingerprinting and dependency resolution on a project directory.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Path to scan (default: `scan.root_dir` from config).
    pub path: Option<PathBuf>,

    /// Directory for the artifacts (default: parent of the scan root).
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Skip build-tool dependency resolution.
    #[arg(long)]
    pub no_build_depend: bool,

    /// Digest algorithm for file records.
    #[arg(long)]
    pub digest: Option<DigestArg>,
}

// ---- fingerprint ----

/// Generate the fingerprint artifact only.
#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// Path to fingerprint (default: `scan.root_dir` from config).
    pub path: Option<PathBuf>,

    /// Directory for the artifact (default: parent of the scan root).
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Digest algorithm for file records.
    #[arg(long)]
    pub digest: Option<DigestArg>,
}

// ---- detect ----

/// Detect build tools by marker files.
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Directory to inspect.
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

// ---- config ----

/// Manage cleansource configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, scan, tools).
        #[arg(long)]
        section: Option<String>,
    },
}
