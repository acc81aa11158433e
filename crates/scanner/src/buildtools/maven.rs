//! Maven 스캐너
//!
//! pom.xml에서 프로젝트 식별자와 직접 의존성을 읽고, `mvn`(또는 `mvnw`)이 있으면
//! `dependency:tree` 출력으로 전이 의존성까지 포함한 목록을 얻습니다.

use std::path::PathBuf;

use tracing::{debug, info};

use cleansource_core::types::{BuildTool, DependencyRoot};

use crate::buildtools::exec::read_manifest;
use crate::buildtools::{BuildToolScanner, ScanTarget, markers_for};
use crate::error::ScannerError;
use crate::parser::maven::{parse_dependency_tree, parse_pom};

const TREE_ARGS: &[&str] = &["dependency:tree", "-DoutputType=text", "--batch-mode"];

pub struct MavenScanner {
    target: ScanTarget,
}

impl MavenScanner {
    pub fn new(target: ScanTarget) -> Self {
        Self { target }
    }
}

impl BuildToolScanner for MavenScanner {
    fn build_tool(&self) -> BuildTool {
        BuildTool::Maven
    }

    fn find_executable(&mut self) -> Result<PathBuf, ScannerError> {
        self.target.locate_executable(&["mvn"], &["mvnw", "mvnw.cmd"])
    }

    fn find_manifest(&mut self) -> Result<PathBuf, ScannerError> {
        self.target.locate_manifest(markers_for(BuildTool::Maven))
    }

    async fn execute(&self) -> Result<Vec<DependencyRoot>, ScannerError> {
        let manifest = self.target.manifest()?;
        let content = read_manifest(&manifest).await?;
        let mut parsed = parse_pom(&content, &manifest.display().to_string())?;

        if let Some(output) = self.target.run_tool(TREE_ARGS).await {
            let tree = parse_dependency_tree(&output);
            if tree.is_empty() {
                debug!("dependency:tree produced no dependencies, keeping pom.xml entries");
            } else {
                parsed.dependencies = tree;
            }
        }

        info!(
            project = %parsed.project_name,
            dependencies = parsed.dependencies.len(),
            "maven scan completed"
        );
        Ok(vec![parsed.into_root(BuildTool::Maven)])
    }
}
