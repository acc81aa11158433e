//! pip 파서 -- requirements.txt, pip freeze 출력, setup.py, pyproject.toml
//!
//! # 병합 정책
//!
//! 선언된 요구사항(requirements.txt, pyproject.toml)과 설치된 패키지 목록(`pip list --format=freeze`)이
//! 같은 패키지를 포함하면 선언된 버전이 우선합니다. 이름 비교는 PEP 503 정규화를 따릅니다.
//! 설치 목록에만 있는 패키지는 그대로 뒤에 추가됩니다.

use std::collections::{HashMap, HashSet};

use regex::Regex;

use cleansource_core::types::{BuildTool, Dependency};

use crate::error::ScannerError;
use crate::parser::{ParsedManifest, UNKNOWN, or_unknown, parse_error};

/// 버전 연산자 (먼저 일치하는 것을 사용)
const OPERATORS: &[&str] = &["===", "==", ">=", "<=", "~=", "!=", ">", "<"];

fn pip_dependency(name: &str, version: &str, scope: &str) -> Dependency {
    Dependency::new("", name, version, BuildTool::Pip.dependency_type(), scope)
}

/// requirement 한 줄을 파싱합니다.
///
/// 빈 줄, 주석, 옵션(`-r`, `-e`, `--index-url` 등)이거나 이름이 유효하지 않으면 `None`.
pub fn parse_requirement_line(line: &str) -> Option<Dependency> {
    let line = strip_comment(line).trim();
    if line.is_empty() || line.starts_with('-') {
        return None;
    }

    // 환경 마커 제거: `pkg==1.0; python_version < "3.8"`
    let spec = line.split(';').next().unwrap_or_default().trim();

    // PEP 508 직접 참조: `pkg @ https://...`
    let (name, version) = match spec.split_once('@') {
        Some((name, _url)) => (name, UNKNOWN),
        None => OPERATORS
            .iter()
            .find_map(|op| spec.split_once(op))
            .map(|(n, v)| (n, v.trim()))
            .unwrap_or((spec, UNKNOWN)),
    };

    let name = match name.find('[') {
        Some(idx) => &name[..idx],
        None => name,
    }
    .trim();

    if !is_valid_name(name) {
        return None;
    }

    let version = if version.is_empty() { UNKNOWN } else { version };
    Some(pip_dependency(name, version, BuildTool::Pip.default_scope()))
}

/// 버전 지정자 앞의 연산자를 제거합니다. `"==2.31.0"`은 `2.31.0`, `*`는 그대로.
pub(crate) fn strip_version_operator(spec: &str) -> &str {
    let spec = spec.trim();
    OPERATORS
        .iter()
        .find_map(|op| spec.strip_prefix(op))
        .map_or(spec, str::trim)
}

/// requirements.txt를 파싱합니다. 잘못된 줄은 건너뜁니다.
pub fn parse_requirements(content: &str) -> Vec<Dependency> {
    content.lines().filter_map(parse_requirement_line).collect()
}

/// `pip freeze` / `pip list --format=freeze` 출력을 파싱합니다.
///
/// `name==version` 형식이 아닌 줄(`-e`, `pkg @ file://...`)은 건너뜁니다.
pub fn parse_freeze(output: &str) -> Vec<Dependency> {
    output
        .lines()
        .filter_map(|line| {
            let (name, version) = line.trim().split_once("==")?;
            let (name, version) = (name.trim(), version.trim());
            if !is_valid_name(name) || version.is_empty() {
                return None;
            }
            Some(pip_dependency(name, version, BuildTool::Pip.default_scope()))
        })
        .collect()
}

/// PEP 503 패키지 이름 정규화
///
/// 소문자로 바꾸고 연속된 `-`, `_`, `.`을 하나의 `-`로 치환합니다.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    out
}

/// 선언된 요구사항과 설치된 패키지를 병합합니다.
///
/// 선언된 항목이 먼저 선언 순서대로 나오며, 버전이 `unknown`이거나 와일드카드(`*`)인 선언은
/// 설치된 버전으로 채웁니다.
/// 설치 목록에만 있는 패키지는 설치 목록 순서대로 뒤에 추가됩니다.
pub fn merge_declared(declared: Vec<Dependency>, installed: Vec<Dependency>) -> Vec<Dependency> {
    let installed_versions: HashMap<String, String> = installed
        .iter()
        .map(|d| (normalize_name(&d.name), d.version.clone()))
        .collect();

    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(declared.len() + installed.len());

    for dep in declared {
        let key = normalize_name(&dep.name);
        if !seen.insert(key.clone()) {
            continue;
        }
        match installed_versions.get(&key) {
            Some(installed) if dep.version == UNKNOWN || dep.version == "*" => {
                merged.push(dep.with_version(installed.clone()))
            }
            _ => merged.push(dep),
        }
    }

    for dep in installed {
        if seen.insert(normalize_name(&dep.name)) {
            merged.push(dep);
        }
    }

    merged
}

/// setup.py에서 `name=`/`version=` 리터럴과 `install_requires` 목록을 추출합니다.
///
/// 파이썬을 실행하지 않으므로 변수나 함수 호출로 지정된 값은 인식하지 않습니다.
pub fn parse_setup_py(content: &str, source_path: &str) -> Result<ParsedManifest, ScannerError> {
    let keyword = |key: &str| {
        Regex::new(&format!(r#"(?:^|[^\w]){key}\s*=\s*['"]([^'"]+)['"]"#))
            .map_err(|e| parse_error(source_path, e))
    };
    let name_re = keyword("name")?;
    let version_re = keyword("version")?;
    let requires_re = Regex::new(r"install_requires\s*=\s*\[([^\]]*)\]")
        .map_err(|e| parse_error(source_path, e))?;
    let literal_re = Regex::new(r#"['"]([^'"]+)['"]"#).map_err(|e| parse_error(source_path, e))?;

    let capture = |re: &Regex| {
        re.captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    };

    let dependencies = requires_re
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|list| {
            literal_re
                .captures_iter(list.as_str())
                .filter_map(|c| c.get(1))
                .filter_map(|m| parse_requirement_line(m.as_str()))
                .collect()
        })
        .unwrap_or_default();

    Ok(ParsedManifest {
        project_name: or_unknown(capture(&name_re)),
        project_version: or_unknown(capture(&version_re)),
        dependencies,
    })
}

/// pyproject.toml을 파싱합니다.
///
/// `[project]` (PEP 621)를 우선 사용하고, 없으면 `[tool.poetry]`를 사용합니다.
///
/// # Errors
///
/// TOML이 손상되었으면 `ManifestParse`
pub fn parse_pyproject(content: &str, source_path: &str) -> Result<ParsedManifest, ScannerError> {
    let doc: toml::Table = toml::from_str(content).map_err(|e| parse_error(source_path, e))?;

    let project = doc.get("project").and_then(toml::Value::as_table);
    let poetry = doc
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(toml::Value::as_table);

    let field = |key: &str| {
        project
            .and_then(|p| p.get(key))
            .or_else(|| poetry.and_then(|p| p.get(key)))
            .and_then(toml::Value::as_str)
    };

    let mut dependencies: Vec<Dependency> = project
        .and_then(|p| p.get("dependencies"))
        .and_then(toml::Value::as_array)
        .map(|deps| {
            deps.iter()
                .filter_map(toml::Value::as_str)
                .filter_map(parse_requirement_line)
                .collect()
        })
        .unwrap_or_default();

    if let Some(poetry) = poetry {
        let runtime = poetry.get("dependencies").and_then(toml::Value::as_table);
        let dev = poetry
            .get("group")
            .and_then(|g| g.get("dev"))
            .and_then(|d| d.get("dependencies"))
            .or_else(|| poetry.get("dev-dependencies"))
            .and_then(toml::Value::as_table);

        for (table, scope) in [(runtime, "runtime"), (dev, "development")] {
            let Some(table) = table else { continue };
            for (name, spec) in table {
                // 인터프리터 제약은 의존성이 아님
                if name == "python" {
                    continue;
                }
                let version = match spec {
                    toml::Value::String(v) => v.as_str(),
                    toml::Value::Table(t) => t
                        .get("version")
                        .and_then(toml::Value::as_str)
                        .unwrap_or(UNKNOWN),
                    _ => UNKNOWN,
                };
                dependencies.push(pip_dependency(name, version, scope));
            }
        }
    }

    Ok(ParsedManifest {
        project_name: or_unknown(field("name")),
        project_version: or_unknown(field("version")),
        dependencies,
    })
}

/// 공백 뒤(또는 줄 시작)의 `#`부터 주석으로 제거합니다.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
            return &line[..i];
        }
    }
    line
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_line_operators() {
        let cases = [
            ("requests==2.31.0", "requests", "2.31.0"),
            ("flask>=2.0", "flask", "2.0"),
            ("numpy<=1.26", "numpy", "1.26"),
            ("django~=4.2", "django", "4.2"),
            ("urllib3!=2.0.0", "urllib3", "2.0.0"),
            ("six>1.0", "six", "1.0"),
            ("attrs<23", "attrs", "23"),
            ("pytest", "pytest", "unknown"),
            ("requests[security]==2.31.0", "requests", "2.31.0"),
            ("pandas == 2.1.0  # pinned", "pandas", "2.1.0"),
            ("pywin32==306; sys_platform == 'win32'", "pywin32", "306"),
            ("mypkg @ https://example.com/mypkg.whl", "mypkg", "unknown"),
        ];
        for (line, name, version) in cases {
            let dep = parse_requirement_line(line).unwrap_or_else(|| panic!("line: {line}"));
            assert_eq!(dep.name, name, "line: {line}");
            assert_eq!(dep.version, version, "line: {line}");
            assert_eq!(dep.scope, "runtime");
            assert_eq!(dep.kind, "pip");
        }
    }

    #[test]
    fn requirement_line_skips_options_and_comments() {
        for line in ["", "   ", "# comment", "-r base.txt", "--index-url https://x", "-e ."] {
            assert!(parse_requirement_line(line).is_none(), "line: {line:?}");
        }
        assert!(parse_requirement_line("not a package!").is_none());
    }

    #[test]
    fn requirements_file() {
        let content = "# deps\nrequests==2.31.0\n\n-r dev.txt\nflask>=2.0\n";
        let deps = parse_requirements(content);
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].name, "requests");
        assert_eq!(deps[1].name, "flask");
    }

    #[test]
    fn freeze_output() {
        let output = "requests==2.31.0\n-e git+https://x#egg=local\nidna==3.4\nbroken\n";
        let deps = parse_freeze(output);
        let names: Vec<&str> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["requests", "idna"]);
    }

    #[test]
    fn pep503_normalization() {
        assert_eq!(normalize_name("Django_REST.framework"), "django-rest-framework");
        assert_eq!(normalize_name("zope..interface"), "zope-interface");
        assert_eq!(normalize_name("PyYAML"), "pyyaml");
    }

    #[test]
    fn merge_prefers_declared_version() {
        let declared = parse_requirements("X==1.2.0\nflask");
        let installed = parse_freeze("x==1.1.0\nFlask==3.0.0\nclick==8.1.7\n");
        let merged = merge_declared(declared, installed);

        let names: Vec<&str> = merged.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["X", "flask", "click"]);
        assert_eq!(merged[0].version, "1.2.0");
        // 버전 없는 선언은 설치 버전으로 채움
        assert_eq!(merged[1].version, "3.0.0");
        assert_eq!(merged[1].id.version, "3.0.0");
        assert_eq!(merged[2].version, "8.1.7");
    }

    #[test]
    fn merge_without_installed_keeps_declared() {
        let declared = parse_requirements("a==1\nb==2");
        let merged = merge_declared(declared.clone(), Vec::new());
        assert_eq!(merged, declared);
    }

    #[test]
    fn setup_py_identity_and_requires() {
        let setup = r#"
from setuptools import setup

setup(
    name="billing",
    version='0.9.1',
    package_name="ignored",
    install_requires=[
        "requests>=2.0",
        'click',
    ],
)
"#;
        let parsed = parse_setup_py(setup, "setup.py").unwrap();
        assert_eq!(parsed.project_name, "billing");
        assert_eq!(parsed.project_version, "0.9.1");
        assert_eq!(parsed.dependencies.len(), 2);
        assert_eq!(parsed.dependencies[1].name, "click");
    }

    #[test]
    fn setup_py_without_literals_is_unknown() {
        let parsed = parse_setup_py("setup(name=NAME)", "setup.py").unwrap();
        assert_eq!(parsed.project_name, "unknown");
    }

    #[test]
    fn pyproject_pep621() {
        let toml = r#"
[project]
name = "analytics"
version = "1.0.0"
dependencies = ["pandas>=2.0", "numpy==1.26.0; python_version >= '3.9'"]
"#;
        let parsed = parse_pyproject(toml, "pyproject.toml").unwrap();
        assert_eq!(parsed.project_name, "analytics");
        assert_eq!(parsed.dependencies.len(), 2);
        assert_eq!(parsed.dependencies[1].version, "1.26.0");
    }

    #[test]
    fn pyproject_poetry() {
        let toml = r#"
[tool.poetry]
name = "svc"
version = "0.1.0"

[tool.poetry.dependencies]
python = "^3.11"
fastapi = "^0.104"
uvicorn = { version = "^0.24", extras = ["standard"] }

[tool.poetry.group.dev.dependencies]
pytest = "^7.4"
"#;
        let parsed = parse_pyproject(toml, "pyproject.toml").unwrap();
        assert_eq!(parsed.project_name, "svc");
        assert_eq!(parsed.project_version, "0.1.0");
        assert_eq!(parsed.dependencies.len(), 3);
        let pytest = parsed.dependencies.iter().find(|d| d.name == "pytest").unwrap();
        assert_eq!(pytest.scope, "development");
        let uvicorn = parsed.dependencies.iter().find(|d| d.name == "uvicorn").unwrap();
        assert_eq!(uvicorn.version, "^0.24");
    }

    #[test]
    fn pyproject_malformed_is_error() {
        let err = parse_pyproject("[project\nname=", "pyproject.toml").unwrap_err();
        assert!(matches!(err, ScannerError::ManifestParse { .. }));
    }

    #[test]
    fn version_operator_is_stripped() {
        assert_eq!(strip_version_operator("==2.31.0"), "2.31.0");
        assert_eq!(strip_version_operator(" >= 4.2 "), "4.2");
        assert_eq!(strip_version_operator("===1.0"), "1.0");
        assert_eq!(strip_version_operator("*"), "*");
        assert_eq!(strip_version_operator("1.2"), "1.2");
    }
}
