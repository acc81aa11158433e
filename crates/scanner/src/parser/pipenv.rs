//! Pipfile 파서
//!
//! Pipfile은 TOML 형식이지만, 사람이 편집하다 일부가 깨진 파일도 최대한 읽을 수 있도록
//! 줄 단위로 해석합니다. 해석할 수 없는 줄은 건너뜁니다.
//!
//! `[packages]`는 `runtime`, `[dev-packages]`는 `development` scope가 되며
//! 버전은 requirements.txt와 같이 연산자를 뗀 값(`"==2.31.0"`은 `2.31.0`)으로 기록합니다.
//! 와일드카드 `*`는 그대로 남아 pip freeze 병합 시 설치 버전으로 채워집니다.

use cleansource_core::types::{BuildTool, Dependency};

use crate::parser::pip::strip_version_operator;
use crate::parser::{ParsedManifest, UNKNOWN, or_unknown, quoted_literal};

/// 현재 줄이 속한 섹션
#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    /// 첫 섹션 헤더 이전 또는 알 수 없는 테이블
    Other,
    /// `[[source]]` -- `name` 키가 인덱스 이름이므로 식별 정보로 쓰지 않음
    Source,
    Packages(&'static str),
}

impl Section {
    fn from_header(header: &str) -> Self {
        match header {
            "[packages]" => Self::Packages("runtime"),
            "[dev-packages]" => Self::Packages("development"),
            "[[source]]" => Self::Source,
            _ => Self::Other,
        }
    }
}

/// Pipfile을 파싱합니다.
///
/// 프로젝트 이름/버전은 표준 키가 아니므로 패키지/소스 섹션 밖의 `name`/`version` 키가 있을 때만 사용합니다.
pub fn parse_pipfile(content: &str) -> ParsedManifest {
    let kind = BuildTool::Pipenv.dependency_type();

    let mut section = Section::Other;
    let mut name = None;
    let mut version = None;
    let mut dependencies = Vec::new();

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            section = Section::from_header(line);
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().trim_matches('"');
        let value = value.trim();
        if key.is_empty() {
            continue;
        }

        match section {
            Section::Packages(scope) => {
                let Some(spec) = version_spec(value) else {
                    continue;
                };
                dependencies.push(Dependency::new("", key, spec, kind, scope));
            }
            Section::Other if key == "name" => name = quoted_literal(value).or(name),
            Section::Other if key == "version" => version = quoted_literal(value).or(version),
            _ => {}
        }
    }

    ParsedManifest {
        project_name: or_unknown(name),
        project_version: or_unknown(version),
        dependencies,
    }
}

/// `"==2.31.0"` 또는 `{version = "==2.31.0", extras = [...]}`
///
/// git/path 참조처럼 버전이 없는 인라인 테이블은 `unknown`, 해석할 수 없는 값은 `None`.
fn version_spec(value: &str) -> Option<&str> {
    if let Some(table) = value.strip_prefix('{') {
        let spec = table
            .split(',')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| k.trim() == "version")
            .and_then(|(_, v)| quoted_literal(v))
            .map(strip_version_operator)
            .filter(|v| !v.is_empty());
        return Some(spec.unwrap_or(UNKNOWN));
    }
    quoted_literal(value).map(|v| match strip_version_operator(v) {
        "" => UNKNOWN,
        spec => spec,
    })
}
