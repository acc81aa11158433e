//! npm 스캐너 -- package.json만 파싱합니다.

use std::path::PathBuf;

use tracing::info;

use cleansource_core::types::{BuildTool, DependencyRoot};

use crate::buildtools::exec::read_manifest;
use crate::buildtools::{BuildToolScanner, ScanTarget, markers_for};
use crate::error::ScannerError;
use crate::parser::npm::parse_package_json;

pub struct NpmScanner {
    target: ScanTarget,
}

impl NpmScanner {
    pub fn new(target: ScanTarget) -> Self {
        Self { target }
    }
}

impl BuildToolScanner for NpmScanner {
    fn build_tool(&self) -> BuildTool {
        BuildTool::Npm
    }

    fn find_executable(&mut self) -> Result<PathBuf, ScannerError> {
        self.target.locate_executable(&["npm", "npm.cmd"], &[])
    }

    fn find_manifest(&mut self) -> Result<PathBuf, ScannerError> {
        self.target.locate_manifest(markers_for(BuildTool::Npm))
    }

    async fn execute(&self) -> Result<Vec<DependencyRoot>, ScannerError> {
        let manifest = self.target.manifest()?;
        let content = read_manifest(&manifest).await?;
        let parsed = parse_package_json(&content, &manifest.display().to_string())?;

        info!(
            project = %parsed.project_name,
            dependencies = parsed.dependencies.len(),
            "npm scan completed"
        );
        Ok(vec![parsed.into_root(BuildTool::Npm)])
    }
}
