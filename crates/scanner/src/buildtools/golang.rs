//! Go 모듈 스캐너
//!
//! go.mod에서 모듈 경로와 `require` 목록을 읽고, `go`가 있으면 `go list -m -json all`로
//! 빌드 목록 전체(전이 의존성 포함)를 얻어 `require` 목록을 대체합니다.

use std::path::PathBuf;

use tracing::{info, warn};

use cleansource_core::types::{BuildTool, DependencyRoot};

use crate::buildtools::exec::read_manifest_lines;
use crate::buildtools::{BuildToolScanner, ScanTarget, markers_for};
use crate::error::ScannerError;
use crate::parser::gomod::{parse_go_list, parse_go_mod};

const LIST_ARGS: &[&str] = &["list", "-m", "-json", "all"];

pub struct GoScanner {
    target: ScanTarget,
}

impl GoScanner {
    pub fn new(target: ScanTarget) -> Self {
        Self { target }
    }
}

impl BuildToolScanner for GoScanner {
    fn build_tool(&self) -> BuildTool {
        BuildTool::Go
    }

    fn find_executable(&mut self) -> Result<PathBuf, ScannerError> {
        self.target.locate_executable(&["go"], &[])
    }

    fn find_manifest(&mut self) -> Result<PathBuf, ScannerError> {
        self.target.locate_manifest(markers_for(BuildTool::Go))
    }

    async fn execute(&self) -> Result<Vec<DependencyRoot>, ScannerError> {
        let manifest = self.target.manifest()?;
        let content = read_manifest_lines(&manifest).await?;
        let mut parsed = parse_go_mod(&content);

        if let Some(output) = self.target.run_tool(LIST_ARGS).await {
            match parse_go_list(&output) {
                Ok(modules) if !modules.is_empty() => parsed.dependencies = modules,
                Ok(_) => {}
                Err(e) => warn!(error = %e, "failed to parse go list output, keeping go.mod entries"),
            }
        }

        info!(
            module = %parsed.project_name,
            dependencies = parsed.dependencies.len(),
            "go scan completed"
        );
        Ok(vec![parsed.into_root(BuildTool::Go)])
    }
}
