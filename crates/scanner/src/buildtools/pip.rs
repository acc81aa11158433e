//! pip 스캐너
//!
//! 선언된 요구사항(requirements.txt, pyproject.toml, setup.py)을 모으고, pip이 있으면
//! `pip list --format=freeze`로 설치된 패키지를 얻어 병합합니다. 병합 시 선언된 버전이 우선합니다.
//!
//! 프로젝트 식별자는 pyproject.toml, setup.py 순서로 찾습니다.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use cleansource_core::types::{BuildTool, DependencyRoot};

use crate::buildtools::exec::{ToolCommand, first_manifest, read_manifest, read_manifest_lines};
use crate::buildtools::{BuildToolScanner, ScanTarget};
use crate::error::ScannerError;
use crate::parser::pip::{
    merge_declared, parse_freeze, parse_pyproject, parse_requirements, parse_setup_py,
};
use crate::parser::{ParsedManifest, UNKNOWN};

const REQUIREMENTS: &str = "requirements.txt";
const SETUP_PY: &str = "setup.py";
const PYPROJECT: &str = "pyproject.toml";

const FREEZE_ARGS: &[&str] = &["list", "--format=freeze", "--disable-pip-version-check"];

pub struct PipScanner {
    target: ScanTarget,
}

impl PipScanner {
    pub fn new(target: ScanTarget) -> Self {
        Self { target }
    }

    /// 설정된 requirements 경로, 없으면 루트의 requirements.txt
    ///
    /// 상대 경로는 스캔 루트 기준입니다.
    fn requirements_path(&self) -> PathBuf {
        let root = self.target.root();
        match self.target.config().pip_requirements() {
            Some(path) => root.join(path),
            None => root.join(REQUIREMENTS),
        }
    }

    fn manifest_candidates(&self) -> [PathBuf; 3] {
        [
            self.requirements_path(),
            PathBuf::from(SETUP_PY),
            PathBuf::from(PYPROJECT),
        ]
    }
}

impl BuildToolScanner for PipScanner {
    fn build_tool(&self) -> BuildTool {
        BuildTool::Pip
    }

    /// `pip3`, `pip`을 찾고, 없으면 `python3 -m pip`을 사용합니다.
    fn find_executable(&mut self) -> Result<PathBuf, ScannerError> {
        match self.target.locate_executable(&["pip3", "pip"], &[]) {
            Ok(path) => Ok(path),
            Err(err) => {
                let python = which::which("python3").map_err(|_| err)?;
                debug!(python = %python.display(), "using python3 -m pip");
                self.target
                    .set_executable(ToolCommand::new(&python).with_prefix(["-m", "pip"]));
                Ok(python)
            }
        }
    }

    fn find_manifest(&mut self) -> Result<PathBuf, ScannerError> {
        let candidates = self.manifest_candidates();
        self.target.locate_manifest(candidates)
    }

    async fn execute(&self) -> Result<Vec<DependencyRoot>, ScannerError> {
        let root = self.target.root();
        first_manifest(BuildTool::Pip, root, self.manifest_candidates())?;

        let mut declared = Vec::new();
        let mut identity: Vec<ParsedManifest> = Vec::new();

        let requirements = self.requirements_path();
        if requirements.is_file() {
            declared.extend(parse_requirements(&read_manifest_lines(&requirements).await?));
        }

        let pyproject = root.join(PYPROJECT);
        if pyproject.is_file() {
            let content = read_manifest(&pyproject).await?;
            match parse_pyproject(&content, &pyproject.display().to_string()) {
                Ok(mut parsed) => {
                    declared.append(&mut parsed.dependencies);
                    identity.push(parsed);
                }
                Err(e) => warn!(error = %e, "skipping malformed pyproject.toml"),
            }
        }

        let setup = root.join(SETUP_PY);
        if setup.is_file() {
            let content = read_manifest_lines(&setup).await?;
            let mut parsed = parse_setup_py(&content, &setup.display().to_string())?;
            declared.append(&mut parsed.dependencies);
            identity.push(parsed);
        }

        let installed = match self.target.run_tool(FREEZE_ARGS).await {
            Some(output) => parse_freeze(&output),
            None => Vec::new(),
        };
        debug!(
            declared = declared.len(),
            installed = installed.len(),
            "merging pip dependencies"
        );

        let parsed = ParsedManifest {
            project_name: first_known(identity.iter().map(|p| p.project_name.as_str())),
            project_version: first_known(identity.iter().map(|p| p.project_version.as_str())),
            dependencies: merge_declared(declared, installed),
        };

        info!(
            project = %parsed.project_name,
            dependencies = parsed.dependencies.len(),
            "pip scan completed"
        );
        Ok(vec![parsed.into_root(BuildTool::Pip)])
    }
}

/// `unknown`이 아닌 첫 번째 값
fn first_known<'a>(mut values: impl Iterator<Item = &'a str>) -> String {
    values.find(|v| *v != UNKNOWN).unwrap_or(UNKNOWN).to_owned()
}
