//! `cleansource fingerprint` command handler

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use cleansource_core::config::CleansourceConfig;
use cleansource_scanner::{FingerprintConfig, FingerprintEngine, FingerprintSummary};

use crate::cli::{DigestArg, FingerprintArgs};
use crate::commands::resolve_root;
use crate::error::CliError;
use crate::output::{OutputWriter, Render, human_bytes};

/// Execute the `fingerprint` command.
pub async fn execute(
    args: FingerprintArgs,
    config: &CleansourceConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = run(args, config).await?;
    writer.render(&report)?;
    Ok(())
}

/// Generate the fingerprint artifact and build the report.
pub async fn run(
    args: FingerprintArgs,
    config: &CleansourceConfig,
) -> Result<FingerprintReport, CliError> {
    let root = resolve_root(args.path, config);
    let engine_config = engine_config(config, args.output_dir, args.digest)?;
    let summary = generate(&root, engine_config).await?;
    Ok(FingerprintReport::new(&root, &summary))
}

/// Build the engine configuration from the loaded config and CLI overrides.
pub(crate) fn engine_config(
    config: &CleansourceConfig,
    output_dir: Option<PathBuf>,
    digest: Option<DigestArg>,
) -> Result<FingerprintConfig, CliError> {
    let mut engine_config = FingerprintConfig::from_core(&config.scan);
    if let Some(dir) = output_dir {
        engine_config.output_dir = Some(dir);
    }
    if let Some(digest) = digest {
        engine_config.digest = digest.into();
    }
    engine_config.validate()?;
    Ok(engine_config)
}

pub(crate) async fn generate(
    root: &Path,
    engine_config: FingerprintConfig,
) -> Result<FingerprintSummary, CliError> {
    if let Some(dir) = &engine_config.output_dir {
        tokio::fs::create_dir_all(dir).await?;
    }

    let digest = engine_config.digest;
    let engine = FingerprintEngine::builder()
        .config(engine_config)
        .span(tracing::info_span!("fingerprint", root = %root.display()))
        .build()?;

    info!(root = %root.display(), digest = %digest, "generating fingerprint file");
    Ok(engine.generate_with_summary(root).await?)
}

/// Fingerprint artifact report.
#[derive(Debug, Serialize)]
pub struct FingerprintReport {
    pub root: String,
    pub artifact: String,
    pub files_written: u64,
    pub files_failed: u64,
    pub bytes_hashed: u64,
}

impl FingerprintReport {
    pub(crate) fn new(root: &Path, summary: &FingerprintSummary) -> Self {
        Self {
            root: root.display().to_string(),
            artifact: summary.artifact.display().to_string(),
            files_written: summary.files_written,
            files_failed: summary.files_failed,
            bytes_hashed: summary.bytes_hashed,
        }
    }
}

impl Render for FingerprintReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Fingerprint: {}", self.root.bold())?;
        writeln!(w, "  Artifact: {}", self.artifact)?;
        writeln!(
            w,
            "  Files:    {} written ({})",
            self.files_written.to_string().green(),
            human_bytes(self.bytes_hashed)
        )?;
        if self.files_failed > 0 {
            writeln!(
                w,
                "  Skipped:  {} unreadable",
                self.files_failed.to_string().yellow()
            )?;
        }
        Ok(())
    }
}
