//! Pipenv 스캐너
//!
//! Pipfile의 선언을 기준으로 하고, pipenv가 있으면 `pipenv run pip freeze`로 가상환경에 실제
//! 설치된 버전을 얻어 와일드카드(`*`) 선언을 채웁니다. 병합 규칙은 pip 스캐너와 같습니다.

use std::path::PathBuf;

use tracing::info;

use cleansource_core::types::{BuildTool, Dependency, DependencyRoot};

use crate::buildtools::exec::read_manifest_lines;
use crate::buildtools::{BuildToolScanner, ScanTarget, markers_for};
use crate::error::ScannerError;
use crate::parser::pip::{merge_declared, parse_freeze};
use crate::parser::pipenv::parse_pipfile;

const FREEZE_ARGS: &[&str] = &["run", "pip", "freeze"];

pub struct PipenvScanner {
    target: ScanTarget,
}

impl PipenvScanner {
    pub fn new(target: ScanTarget) -> Self {
        Self { target }
    }
}

impl BuildToolScanner for PipenvScanner {
    fn build_tool(&self) -> BuildTool {
        BuildTool::Pipenv
    }

    fn find_executable(&mut self) -> Result<PathBuf, ScannerError> {
        self.target.locate_executable(&["pipenv", "pipenv.exe"], &[])
    }

    fn find_manifest(&mut self) -> Result<PathBuf, ScannerError> {
        self.target.locate_manifest(markers_for(BuildTool::Pipenv))
    }

    async fn execute(&self) -> Result<Vec<DependencyRoot>, ScannerError> {
        let manifest = self.target.manifest()?;
        let mut parsed = parse_pipfile(&read_manifest_lines(&manifest).await?);

        if let Some(output) = self.target.run_tool(FREEZE_ARGS).await {
            let kind = BuildTool::Pipenv.dependency_type();
            let installed = parse_freeze(&output)
                .into_iter()
                .map(|d| Dependency::new("", d.name, d.version, kind, d.scope))
                .collect();
            parsed.dependencies = merge_declared(std::mem::take(&mut parsed.dependencies), installed);
        }

        info!(
            project = %parsed.project_name,
            dependencies = parsed.dependencies.len(),
            "pipenv scan completed"
        );
        Ok(vec![parsed.into_root(BuildTool::Pipenv)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;

    #[tokio::test]
    async fn pipfile_only_scan() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Pipfile"),
            "[packages]\nrequests = \"*\"\n\n[dev-packages]\nblack = \"==23.11.0\"\n",
        )
        .unwrap();

        let mut scanner = PipenvScanner::new(ScanTarget::new(
            BuildTool::Pipenv,
            dir.path(),
            &ResolverConfig::manifest_only(),
        ));
        scanner.find_manifest().unwrap();
        let roots = scanner.execute().await.unwrap();

        let root = &roots[0];
        assert_eq!(root.build_tool, BuildTool::Pipenv);
        assert_eq!(root.find_dependency("requests").unwrap().version, "*");
        assert_eq!(root.find_dependency("black").unwrap().scope, "development");
    }
}
