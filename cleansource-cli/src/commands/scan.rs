//! `cleansource scan` command handler
//!
//! 디렉토리 크기 합산, 핑거프린트 생성, 의존성 분석을 순서대로 수행합니다.
//! 디렉토리 크기와 의존성 분석 실패는 경고만 남기며, 핑거프린트 실패만 명령을 실패시킵니다.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use cleansource_core::config::CleansourceConfig;
use cleansource_core::types::{BuildTool, DependencyRoot};
use cleansource_scanner::fingerprint::dirsize::default_size_workers;
use cleansource_scanner::{BuildToolResolver, ResolveReport, ResolverConfig, directory_size};

use crate::cli::ScanArgs;
use crate::commands::fingerprint::{FingerprintReport, engine_config, generate};
use crate::commands::resolve_root;
use crate::error::CliError;
use crate::output::{OutputWriter, Render, human_bytes};

/// Execute the `scan` command.
pub async fn execute(
    args: ScanArgs,
    config: &CleansourceConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = run(args, config).await?;
    writer.render(&report)?;
    Ok(())
}

/// Run the scan and build the report.
pub async fn run(args: ScanArgs, config: &CleansourceConfig) -> Result<ScanReport, CliError> {
    let root = resolve_root(args.path, config);
    if !root.is_dir() {
        return Err(CliError::Scan(format!(
            "scan directory does not exist: {}",
            root.display()
        )));
    }

    let engine_config = engine_config(config, args.output_dir, args.digest)?;
    let build_depend = config.scan.build_depend && !args.no_build_depend;

    let dir_size = measure(&root).await;
    info!(root = %root.display(), dir_size, "scan directory");

    let summary = generate(&root, engine_config).await?;
    let fingerprint = FingerprintReport::new(&root, &summary);

    let dependencies = if build_depend {
        // 산출물과 같은 디렉토리에 기록
        let out_dir = summary
            .artifact
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.clone());
        Some(resolve_dependencies(&root, &out_dir, config).await)
    } else {
        info!("build dependency resolution disabled");
        None
    };

    Ok(ScanReport {
        root: root.display().to_string(),
        dir_size,
        fingerprint,
        dependencies,
    })
}

/// 디렉토리 크기 합산 (실패 시 0)
async fn measure(root: &Path) -> u64 {
    let size_root = root.to_path_buf();
    let workers = default_size_workers();
    match tokio::task::spawn_blocking(move || directory_size(&size_root, workers)).await {
        Ok(Ok(size)) => size,
        Ok(Err(e)) => {
            warn!(error = %e, "failed to calculate directory size");
            0
        }
        Err(e) => {
            warn!(error = %e, "directory size task failed");
            0
        }
    }
}

async fn resolve_dependencies(
    root: &Path,
    out_dir: &Path,
    config: &CleansourceConfig,
) -> DependencyReport {
    let resolver = BuildToolResolver::builder()
        .config(ResolverConfig::from_core(&config.tools))
        .span(tracing::info_span!("resolver", root = %root.display()))
        .build();

    info!("building dependency information");
    let (roots, resolve_report) = resolver.resolve_with_report(root).await;

    let path = out_dir.join(&config.scan.dependency_file);
    let artifact = match write_dependencies(&path, &roots).await {
        Ok(()) => Some(path.display().to_string()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to write dependency file");
            None
        }
    };

    DependencyReport::new(artifact, &roots, &resolve_report)
}

/// 의존성 목록을 pretty JSON으로 기록합니다.
pub(crate) async fn write_dependencies(
    path: &Path,
    roots: &[DependencyRoot],
) -> Result<(), CliError> {
    let json = serde_json::to_vec_pretty(roots)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Scan result.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub root: String,
    /// Total size of every regular file under the root (bytes)
    pub dir_size: u64,
    pub fingerprint: FingerprintReport,
    /// `None` when dependency resolution is disabled
    pub dependencies: Option<DependencyReport>,
}

#[derive(Debug, Serialize)]
pub struct DependencyReport {
    /// `dependencies.json` path, `None` if it could not be written
    pub artifact: Option<String>,
    pub detected: Vec<BuildTool>,
    pub roots: Vec<RootEntry>,
    pub failed: Vec<FailureEntry>,
    /// Tools scanned without their executable (manifest only)
    pub without_executable: Vec<BuildTool>,
}

impl DependencyReport {
    fn new(artifact: Option<String>, roots: &[DependencyRoot], report: &ResolveReport) -> Self {
        Self {
            artifact,
            detected: report.detected.clone(),
            roots: roots.iter().map(RootEntry::from).collect(),
            failed: report
                .failed
                .iter()
                .map(|f| FailureEntry {
                    build_tool: f.tool,
                    stage: f.stage.to_string(),
                    reason: f.reason.clone(),
                })
                .collect(),
            without_executable: report.without_executable.clone(),
        }
    }

    /// Total dependency count across all roots
    pub fn total_dependencies(&self) -> usize {
        self.roots.iter().map(|r| r.dependencies).sum()
    }
}

#[derive(Debug, Serialize)]
pub struct RootEntry {
    pub build_tool: BuildTool,
    pub project_name: String,
    pub project_version: String,
    pub dependencies: usize,
}

impl From<&DependencyRoot> for RootEntry {
    fn from(root: &DependencyRoot) -> Self {
        Self {
            build_tool: root.build_tool,
            project_name: root.project_name.clone(),
            project_version: root.project_version.clone(),
            dependencies: root.dependency_count(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FailureEntry {
    pub build_tool: BuildTool,
    pub stage: String,
    pub reason: String,
}

impl Render for ScanReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Scan: {}", self.root.bold())?;
        writeln!(w, "Directory size: {}", human_bytes(self.dir_size))?;
        writeln!(w)?;
        self.fingerprint.render_text(w)?;
        writeln!(w)?;

        let Some(deps) = &self.dependencies else {
            writeln!(w, "Dependencies: {}", "skipped (--no-build-depend)".dimmed())?;
            return Ok(());
        };

        writeln!(
            w,
            "Dependencies: {} in {} project(s)",
            deps.total_dependencies().to_string().green().bold(),
            deps.roots.len()
        )?;
        if let Some(artifact) = &deps.artifact {
            writeln!(w, "  Artifact: {artifact}")?;
        }

        if deps.roots.is_empty() {
            writeln!(w, "  {}", "No dependency roots resolved.".yellow())?;
        } else {
            writeln!(w)?;
            writeln!(
                w,
                "  {:<8} {:<30} {:<15} Deps",
                "Tool", "Project", "Version"
            )?;
            writeln!(w, "  {}", "-".repeat(60))?;
            for r in &deps.roots {
                writeln!(
                    w,
                    "  {:<8} {:<30} {:<15} {}",
                    r.build_tool.as_str().cyan(),
                    r.project_name,
                    r.project_version,
                    r.dependencies
                )?;
            }
        }

        for f in &deps.failed {
            writeln!(
                w,
                "  {} {} ({}): {}",
                "failed".red().bold(),
                f.build_tool,
                f.stage,
                f.reason
            )?;
        }
        for tool in &deps.without_executable {
            writeln!(
                w,
                "  {} {}: executable not found, manifest only",
                "note".yellow(),
                tool
            )?;
        }

        Ok(())
    }
}
