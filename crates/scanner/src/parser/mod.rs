//! 매니페스트 파서 -- pom.xml, package.json, build.gradle 등
//!
//! 모든 파서는 파일 내용(`&str`)을 받는 순수 함수이며 [`ParsedManifest`]를 반환합니다.
//! 파일 읽기와 외부 도구 실행은 [`buildtools`](crate::buildtools) 스캐너가 담당합니다.
//!
//! # 지원 형식
//!
//! - `pom.xml`, `mvn dependency:tree` 출력 -- [`maven`]
//! - `package.json` -- [`npm`]
//! - `build.gradle`, `build.gradle.kts` -- [`gradle`]
//! - `requirements.txt`, `pip freeze` 출력, `setup.py`, `pyproject.toml` -- [`pip`]
//! - `Pipfile` -- [`pipenv`]
//! - `go.mod`, `go list -m -json all` 출력 -- [`gomod`]
//!
//! # 실패 모드
//!
//! 구조적 형식(XML/JSON/TOML)이 손상되면 `ScannerError::ManifestParse`를 반환합니다.
//! 줄 단위 형식은 잘못된 줄만 건너뛰고 나머지를 계속 파싱합니다.

pub mod gomod;
pub mod gradle;
pub mod maven;
pub mod npm;
pub mod pip;
pub mod pipenv;

use cleansource_core::types::{BuildTool, Dependency, DependencyRoot};

use crate::error::ScannerError;

/// 프로젝트 이름/버전이 없을 때 사용하는 값
pub const UNKNOWN: &str = "unknown";

/// 매니페스트 파싱 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedManifest {
    /// 프로젝트 이름 (없으면 `unknown`)
    pub project_name: String,
    /// 프로젝트 버전 (없으면 `unknown`)
    pub project_version: String,
    /// 선언된 의존성 (매니페스트 순서)
    pub dependencies: Vec<Dependency>,
}

impl Default for ParsedManifest {
    fn default() -> Self {
        Self {
            project_name: UNKNOWN.to_owned(),
            project_version: UNKNOWN.to_owned(),
            dependencies: Vec::new(),
        }
    }
}

impl ParsedManifest {
    /// 빌드 도구를 지정하여 [`DependencyRoot`]로 변환합니다.
    pub fn into_root(self, build_tool: BuildTool) -> DependencyRoot {
        DependencyRoot {
            project_name: self.project_name,
            project_version: self.project_version,
            build_tool,
            dependencies: self.dependencies,
        }
    }
}

/// 비어 있거나 없는 값을 `unknown`으로 대체합니다.
pub(crate) fn or_unknown(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_owned(),
        _ => UNKNOWN.to_owned(),
    }
}

/// 파싱 에러를 생성합니다.
pub(crate) fn parse_error(source_path: &str, reason: impl ToString) -> ScannerError {
    ScannerError::ManifestParse {
        path: source_path.to_owned(),
        reason: reason.to_string(),
    }
}

/// 따옴표로 시작하는 표현식에서 첫 번째 문자열 리터럴을 추출합니다.
///
/// `"1.0.0", # comment` 에서 `1.0.0`을 반환합니다.
pub(crate) fn quoted_literal(expr: &str) -> Option<&str> {
    let expr = expr.trim_start();
    let quote = expr.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &expr[1..];
    let end = rest.find(quote)?;
    Some(&rest[..end])
}
