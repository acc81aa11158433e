//! 빌드 도구 스캐너 -- 생태계별 3단계 스캔 프로토콜
//!
//! 각 스캐너는 다음 순서로 호출됩니다.
//!
//! 1. [`find_executable`](BuildToolScanner::find_executable): 외부 도구 탐색 (실패해도 계속 진행)
//! 2. [`find_manifest`](BuildToolScanner::find_manifest): 필수 매니페스트 확인 (실패 시 해당 생태계 제외)
//! 3. [`execute`](BuildToolScanner::execute): 의존성 수집
//!
//! 외부 도구가 있으면 도구 출력을 우선 사용하고, 없거나 실패하면 매니페스트만 파싱합니다.
//! 스캐너 목록은 [`markers::MARKERS`] 테이블이 결정하며 [`EcosystemScanner`]가 닫힌 집합으로 보관합니다.

pub mod exec;
pub mod golang;
pub mod gradle;
pub mod markers;
pub mod maven;
pub mod npm;
pub mod pip;
pub mod pipenv;

use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::warn;

use cleansource_core::types::{BuildTool, DependencyRoot};

use crate::config::ResolverConfig;
use crate::error::ScannerError;

use exec::{Lookup, ToolCommand, first_manifest};

pub use golang::GoScanner;
pub use gradle::GradleScanner;
pub use markers::{MARKERS, ScannerDescriptor, detect_build_tools, markers_for, tool_for_marker};
pub use maven::MavenScanner;
pub use npm::NpmScanner;
pub use pip::PipScanner;
pub use pipenv::PipenvScanner;

/// 빌드 도구 스캐너 trait
///
/// `find_executable`과 `find_manifest`는 탐색 결과를 내부에 저장하므로 `execute` 이전에 호출해야 합니다.
/// `find_manifest`를 호출하지 않았으면 `execute`가 마커 파일을 직접 탐색합니다.
pub trait BuildToolScanner: Send + Sync {
    /// 대상 빌드 도구
    fn build_tool(&self) -> BuildTool;

    /// 외부 도구 실행 파일을 탐색합니다.
    ///
    /// 실패는 치명적이지 않습니다. 리졸버는 경고만 남기고 매니페스트 파싱으로 진행합니다.
    fn find_executable(&mut self) -> Result<PathBuf, ScannerError>;

    /// 필수 매니페스트를 탐색합니다.
    fn find_manifest(&mut self) -> Result<PathBuf, ScannerError>;

    /// 의존성을 수집합니다.
    fn execute(&self)
    -> impl Future<Output = Result<Vec<DependencyRoot>, ScannerError>> + Send;
}

/// 생태계별 스캐너의 닫힌 집합
pub enum EcosystemScanner {
    Maven(MavenScanner),
    Gradle(GradleScanner),
    Pip(PipScanner),
    Pipenv(PipenvScanner),
    Npm(NpmScanner),
    Go(GoScanner),
}

impl EcosystemScanner {
    /// 빌드 도구에 맞는 스캐너를 생성합니다.
    pub fn for_tool(tool: BuildTool, root: &Path, config: &ResolverConfig) -> Self {
        let target = ScanTarget::new(tool, root, config);
        match tool {
            BuildTool::Maven => Self::Maven(MavenScanner::new(target)),
            BuildTool::Gradle => Self::Gradle(GradleScanner::new(target)),
            BuildTool::Pip => Self::Pip(PipScanner::new(target)),
            BuildTool::Pipenv => Self::Pipenv(PipenvScanner::new(target)),
            BuildTool::Npm => Self::Npm(NpmScanner::new(target)),
            BuildTool::Go => Self::Go(GoScanner::new(target)),
        }
    }
}

macro_rules! delegate {
    ($self:ident, $scanner:ident => $body:expr) => {
        match $self {
            EcosystemScanner::Maven($scanner) => $body,
            EcosystemScanner::Gradle($scanner) => $body,
            EcosystemScanner::Pip($scanner) => $body,
            EcosystemScanner::Pipenv($scanner) => $body,
            EcosystemScanner::Npm($scanner) => $body,
            EcosystemScanner::Go($scanner) => $body,
        }
    };
}

impl BuildToolScanner for EcosystemScanner {
    fn build_tool(&self) -> BuildTool {
        delegate!(self, s => s.build_tool())
    }

    fn find_executable(&mut self) -> Result<PathBuf, ScannerError> {
        delegate!(self, s => s.find_executable())
    }

    fn find_manifest(&mut self) -> Result<PathBuf, ScannerError> {
        delegate!(self, s => s.find_manifest())
    }

    async fn execute(&self) -> Result<Vec<DependencyRoot>, ScannerError> {
        delegate!(self, s => s.execute().await)
    }
}

/// 스캐너 공통 상태 -- 스캔 루트, 설정, 탐색 결과
#[derive(Debug, Clone)]
pub struct ScanTarget {
    tool: BuildTool,
    root: PathBuf,
    config: ResolverConfig,
    executable: Option<ToolCommand>,
    manifest: Option<PathBuf>,
}

impl ScanTarget {
    /// 스캔 대상을 생성합니다.
    pub fn new(tool: BuildTool, root: &Path, config: &ResolverConfig) -> Self {
        Self {
            tool,
            root: root.to_path_buf(),
            config: config.clone(),
            executable: None,
            manifest: None,
        }
    }

    pub fn tool(&self) -> BuildTool {
        self.tool
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// 설정된 명시적 경로를 포함한 탐색을 수행하고 결과를 저장합니다.
    pub(crate) fn locate_executable(
        &mut self,
        path_candidates: &[&str],
        wrappers: &[&str],
    ) -> Result<PathBuf, ScannerError> {
        let lookup = Lookup {
            explicit: self.config.explicit_path(self.tool),
            path_candidates,
            wrappers,
        };
        let path = lookup.locate(self.tool, &self.root)?;
        self.executable = Some(ToolCommand::new(&path));
        Ok(path)
    }

    pub(crate) fn set_executable(&mut self, command: ToolCommand) {
        self.executable = Some(command);
    }

    /// 후보 중 첫 번째로 존재하는 매니페스트를 찾아 저장합니다.
    pub(crate) fn locate_manifest<I, P>(&mut self, candidates: I) -> Result<PathBuf, ScannerError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let path = first_manifest(self.tool, &self.root, candidates)?;
        self.manifest = Some(path.clone());
        Ok(path)
    }

    /// 저장된 매니페스트, 없으면 마커 파일 중 첫 번째로 존재하는 것
    pub(crate) fn manifest(&self) -> Result<PathBuf, ScannerError> {
        match &self.manifest {
            Some(path) => Ok(path.clone()),
            None => first_manifest(self.tool, &self.root, markers_for(self.tool)),
        }
    }

    /// 외부 도구 실행이 허용되고 실행 파일이 탐색된 경우의 명령
    pub(crate) fn command(&self) -> Option<&ToolCommand> {
        self.executable
            .as_ref()
            .filter(|_| self.config.external_tools)
    }

    /// 외부 도구를 실행합니다. 실행 파일이 없거나 실패하면 경고를 남기고 `None`.
    pub(crate) async fn run_tool(&self, args: &[&str]) -> Option<String> {
        let command = self.command()?;
        match command.run(self.tool, args, &self.root).await {
            Ok(output) => Some(output),
            Err(e) => {
                warn!(
                    build_tool = %self.tool,
                    error = %e,
                    "build tool execution failed, falling back to manifest"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_tool_builds_matching_variant() {
        let dir = tempfile::tempdir().unwrap();
        let config = ResolverConfig::manifest_only();
        for tool in BuildTool::ALL {
            let scanner = EcosystemScanner::for_tool(tool, dir.path(), &config);
            assert_eq!(scanner.build_tool(), tool);
        }
    }

    #[test]
    fn command_is_hidden_when_external_tools_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut target = ScanTarget::new(BuildTool::Npm, dir.path(), &ResolverConfig::manifest_only());
        target.set_executable(ToolCommand::new("npm"));
        assert!(target.command().is_none());

        let config = ResolverConfig {
            external_tools: true,
            ..ResolverConfig::manifest_only()
        };
        let mut target = ScanTarget::new(BuildTool::Npm, dir.path(), &config);
        target.set_executable(ToolCommand::new("npm"));
        assert!(target.command().is_some());
    }

    #[test]
    fn manifest_falls_back_to_markers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("build.gradle.kts"), "").unwrap();
        let target = ScanTarget::new(BuildTool::Gradle, dir.path(), &ResolverConfig::manifest_only());
        assert!(target.manifest().unwrap().ends_with("build.gradle.kts"));
    }

    #[tokio::test]
    async fn find_manifest_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut scanner =
            EcosystemScanner::for_tool(BuildTool::Go, dir.path(), &ResolverConfig::manifest_only());
        let err = scanner.find_manifest().unwrap_err();
        assert!(matches!(err, ScannerError::ManifestNotFound { tool: BuildTool::Go, .. }));
        assert!(scanner.execute().await.is_err());
    }
}
