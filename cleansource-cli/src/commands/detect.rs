//! `cleansource detect` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use cleansource_core::types::BuildTool;
use cleansource_scanner::buildtools::markers_for;
use cleansource_scanner::detect_build_tools;

use crate::cli::DetectArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `detect` command.
pub async fn execute(args: DetectArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let report = run(&args.path)?;
    writer.render(&report)?;
    Ok(())
}

/// Detect build tools under `root` without running any scanner.
pub fn run(root: &Path) -> Result<DetectReport, CliError> {
    if !root.is_dir() {
        return Err(CliError::Scan(format!(
            "directory not found: {}",
            root.display()
        )));
    }

    let build_tools = detect_build_tools(root)
        .into_iter()
        .map(|tool| DetectedTool::new(root, tool))
        .collect();

    Ok(DetectReport {
        root: root.display().to_string(),
        build_tools,
    })
}

#[derive(Debug, Serialize)]
pub struct DetectReport {
    pub root: String,
    pub build_tools: Vec<DetectedTool>,
}

#[derive(Debug, Serialize)]
pub struct DetectedTool {
    pub build_tool: BuildTool,
    /// Marker files present for this tool
    pub markers: Vec<String>,
}

impl DetectedTool {
    fn new(root: &Path, build_tool: BuildTool) -> Self {
        let markers = markers_for(build_tool)
            .filter(|marker| root.join(marker).is_file())
            .map(str::to_owned)
            .collect();
        Self {
            build_tool,
            markers,
        }
    }
}

impl Render for DetectReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Detect: {}", self.root.bold())?;
        if self.build_tools.is_empty() {
            writeln!(w, "  {}", "No build tools detected.".yellow())?;
            return Ok(());
        }

        writeln!(w, "  {:<10} Markers", "Tool")?;
        writeln!(w, "  {}", "-".repeat(40))?;
        for tool in &self.build_tools {
            writeln!(
                w,
                "  {:<10} {}",
                tool.build_tool.as_str().cyan(),
                tool.markers.join(", ")
            )?;
        }
        Ok(())
    }
}
