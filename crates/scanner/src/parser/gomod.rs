//! Go 모듈 파서 -- go.mod, `go list -m -json all` 출력
//!
//! go.mod에는 모듈 버전이 없으므로 프로젝트 버전은 `go` 지시어의 언어 버전을 사용합니다.
//! `// indirect` 주석이 붙은 요구사항과 `go list`의 `"Indirect": true` 모듈은 `indirect` scope가 됩니다.

use serde::Deserialize;

use cleansource_core::types::{BuildTool, Dependency};

use crate::error::ScannerError;
use crate::parser::{ParsedManifest, UNKNOWN, or_unknown, parse_error};

const INDIRECT: &str = "indirect";

fn go_dependency(path: &str, version: &str, indirect: bool) -> Dependency {
    let scope = if indirect {
        INDIRECT
    } else {
        BuildTool::Go.default_scope()
    };
    Dependency::new("", path, version, BuildTool::Go.dependency_type(), scope)
}

/// 현재 파싱 중인 블록
#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Require,
    Replace,
    Other,
}

/// go.mod를 파싱합니다.
///
/// `require` 한 줄/블록 형식을 모두 인식하고, 버전이 지정된 `replace` 지시어는
/// 해당 요구사항의 버전을 교체합니다. 잘못된 줄은 건너뛰며 실패하지 않습니다.
pub fn parse_go_mod(content: &str) -> ParsedManifest {
    let mut module = None;
    let mut go_version = None;
    let mut requires: Vec<Dependency> = Vec::new();
    let mut replaces: Vec<(String, String)> = Vec::new();
    let mut block = Block::None;

    for raw in content.lines() {
        let (line, comment) = match raw.split_once("//") {
            Some((code, comment)) => (code.trim(), comment.trim()),
            None => (raw.trim(), ""),
        };
        if line.is_empty() {
            continue;
        }

        if block != Block::None {
            if line == ")" {
                block = Block::None;
                continue;
            }
            match block {
                Block::Require => requires.extend(require_entry(line, comment)),
                Block::Replace => replaces.extend(replace_entry(line)),
                _ => {}
            }
            continue;
        }

        let (directive, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match directive {
            "module" => module = Some(rest.trim_matches('"')),
            "go" => go_version = Some(rest),
            "require" if rest == "(" => block = Block::Require,
            "require" => requires.extend(require_entry(rest, comment)),
            "replace" if rest == "(" => block = Block::Replace,
            "replace" => replaces.extend(replace_entry(rest)),
            _ if rest.ends_with('(') => block = Block::Other,
            _ => {}
        }
    }

    let requires = requires
        .into_iter()
        .map(|dep| match replaces.iter().rev().find(|(path, _)| *path == dep.name) {
            Some((_, version)) => dep.with_version(version.as_str()),
            None => dep,
        })
        .collect();

    ParsedManifest {
        project_name: or_unknown(module),
        project_version: or_unknown(go_version),
        dependencies: requires,
    }
}

/// `path version` [`// indirect`], 버전이 없으면 `unknown`
fn require_entry(line: &str, comment: &str) -> Option<Dependency> {
    let mut parts = line.split_whitespace();
    let path = parts.next()?;
    let version = parts.next().unwrap_or(UNKNOWN);
    let indirect = comment.split(';').any(|c| c.trim() == INDIRECT);
    Some(go_dependency(path, version, indirect))
}

/// `old [version] => new version` 중 새 버전이 있는 경우만 반환
fn replace_entry(line: &str) -> Option<(String, String)> {
    let (old, new) = line.split_once("=>")?;
    let old_path = old.split_whitespace().next()?;
    let mut new_parts = new.split_whitespace();
    let _new_path = new_parts.next()?;
    let new_version = new_parts.next()?;
    Some((old_path.to_owned(), new_version.to_owned()))
}

/// `go list -m -json` 모듈 항목
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ModuleInfo {
    #[serde(default)]
    path: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    main: bool,
    #[serde(default)]
    indirect: bool,
}

/// `go list -m -json all` 출력을 파싱합니다.
///
/// 출력은 연속된 JSON 객체 스트림입니다. 메인 모듈은 제외합니다.
///
/// # Errors
///
/// 스트림 중간에 손상된 객체가 있으면 `ManifestParse`
pub fn parse_go_list(output: &str) -> Result<Vec<Dependency>, ScannerError> {
    let stream = serde_json::Deserializer::from_str(output).into_iter::<ModuleInfo>();

    let mut dependencies = Vec::new();
    for module in stream {
        let module = module.map_err(|e| parse_error("go list -m -json all", e))?;
        if module.main || module.path.is_empty() {
            continue;
        }
        let version = if module.version.is_empty() {
            UNKNOWN
        } else {
            module.version.as_str()
        };
        dependencies.push(go_dependency(&module.path, version, module.indirect));
    }
    Ok(dependencies)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GO_MOD: &str = r#"
module github.com/example/service

go 1.21

require github.com/google/uuid v1.4.0

require (
	github.com/pkg/errors v0.9.1
	golang.org/x/text v0.14.0 // indirect
	github.com/stretchr/testify v1.8.4
)

exclude (
	github.com/bad/module v0.1.0
)

replace github.com/pkg/errors => github.com/pkg/errors v0.9.2
replace github.com/local/mod => ../mod
"#;

    #[test]
    fn module_and_go_directive() {
        let parsed = parse_go_mod(GO_MOD);
        assert_eq!(parsed.project_name, "github.com/example/service");
        assert_eq!(parsed.project_version, "1.21");
    }

    #[test]
    fn require_line_and_block() {
        let parsed = parse_go_mod(GO_MOD);
        let names: Vec<&str> = parsed.dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "github.com/google/uuid",
                "github.com/pkg/errors",
                "golang.org/x/text",
                "github.com/stretchr/testify",
            ]
        );
        assert_eq!(parsed.dependencies[2].scope, "indirect");
        assert_eq!(parsed.dependencies[0].scope, "runtime");
        assert_eq!(parsed.dependencies[0].kind, "go");
    }

    #[test]
    fn replace_overrides_version() {
        let parsed = parse_go_mod(GO_MOD);
        let errors = parsed
            .dependencies
            .iter()
            .find(|d| d.name == "github.com/pkg/errors")
            .unwrap();
        assert_eq!(errors.version, "v0.9.2");
        assert_eq!(errors.id.version, "v0.9.2");
        assert_eq!(errors.id.name, "github.com/pkg/errors");
    }

    #[test]
    fn require_without_version_is_unknown() {
        let parsed = parse_go_mod("module m\nrequire example.com/x\n");
        assert_eq!(parsed.dependencies[0].version, "unknown");
    }

    #[test]
    fn empty_go_mod_is_unknown() {
        let parsed = parse_go_mod("");
        assert_eq!(parsed.project_name, "unknown");
        assert_eq!(parsed.project_version, "unknown");
        assert!(parsed.dependencies.is_empty());
    }

    #[test]
    fn go_list_stream_skips_main() {
        let output = r#"{
	"Path": "github.com/example/service",
	"Main": true,
	"Dir": "/src/service",
	"GoVersion": "1.21"
}
{
	"Path": "github.com/pkg/errors",
	"Version": "v0.9.1"
}
{
	"Path": "golang.org/x/text",
	"Version": "v0.14.0",
	"Indirect": true
}
"#;
        let deps = parse_go_list(output).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].name, "github.com/pkg/errors");
        assert_eq!(deps[0].scope, "runtime");
        assert_eq!(deps[1].scope, "indirect");
    }

    #[test]
    fn go_list_empty_output() {
        assert!(parse_go_list("").unwrap().is_empty());
    }

    #[test]
    fn go_list_truncated_stream_is_error() {
        let err = parse_go_list(r#"{"Path": "a", "Version": "v1"} {"Path": "#).unwrap_err();
        assert!(matches!(err, ScannerError::ManifestParse { .. }));
    }
}
