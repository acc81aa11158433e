//! Gradle 스캐너
//!
//! Gradle 실행은 데몬 기동과 네트워크 접근이 필요하므로 사용하지 않습니다.
//! 실행 파일 탐색은 진단 로그 용도이며 결과는 빌드 스크립트의 텍스트 스캔으로만 만듭니다.

use std::path::PathBuf;

use tracing::info;

use cleansource_core::types::{BuildTool, DependencyRoot};

use crate::buildtools::exec::read_manifest_lines;
use crate::buildtools::{BuildToolScanner, ScanTarget, markers_for};
use crate::error::ScannerError;
use crate::parser::gradle::parse_build_gradle;

pub struct GradleScanner {
    target: ScanTarget,
}

impl GradleScanner {
    pub fn new(target: ScanTarget) -> Self {
        Self { target }
    }
}

impl BuildToolScanner for GradleScanner {
    fn build_tool(&self) -> BuildTool {
        BuildTool::Gradle
    }

    fn find_executable(&mut self) -> Result<PathBuf, ScannerError> {
        self.target
            .locate_executable(&["gradle"], &["gradlew", "gradlew.bat"])
    }

    /// `build.gradle`, `build.gradle.kts` 순서로 탐색
    fn find_manifest(&mut self) -> Result<PathBuf, ScannerError> {
        self.target.locate_manifest(markers_for(BuildTool::Gradle))
    }

    async fn execute(&self) -> Result<Vec<DependencyRoot>, ScannerError> {
        let manifest = self.target.manifest()?;
        let content = read_manifest_lines(&manifest).await?;
        let parsed = parse_build_gradle(&content, &manifest.display().to_string())?;

        info!(
            project = %parsed.project_name,
            dependencies = parsed.dependencies.len(),
            "gradle scan completed"
        );
        Ok(vec![parsed.into_root(BuildTool::Gradle)])
    }
}
