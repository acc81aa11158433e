//! build.gradle / build.gradle.kts 파서
//!
//! 빌드 스크립트를 평가하지 않는 줄 단위 정규식 스캔입니다. 여러 줄에 걸친 선언이나
//! 변수 보간(`"g:a:$ver"`)이 포함된 선언은 인식을 보장하지 않습니다.
//!
//! # 인식하는 형식
//!
//! ```text
//! implementation 'org.slf4j:slf4j-api:2.0.9'
//! testImplementation("org.junit.jupiter:junit-jupiter:5.10.0")
//! compileOnly group: 'org.projectlombok', name: 'lombok', version: '1.18.30'
//! ```

use regex::Regex;

use cleansource_core::types::{BuildTool, Dependency};

use crate::error::ScannerError;
use crate::parser::{ParsedManifest, UNKNOWN, or_unknown, parse_error, quoted_literal};

/// 인식하는 configuration 키워드
pub const CONFIGURATIONS: &[&str] = &[
    "implementation",
    "api",
    "compile",
    "runtimeOnly",
    "runtime",
    "compileOnly",
    "annotationProcessor",
    "kapt",
    "testImplementation",
    "testCompile",
    "testRuntimeOnly",
    "testCompileOnly",
    "testAnnotationProcessor",
];

/// configuration 키워드에서 scope를 결정합니다.
///
/// `test`로 시작하면 `test`, `compileOnly`는 `provided`, 그 외는 `runtime`.
pub fn scope_for(configuration: &str) -> &'static str {
    if configuration.starts_with("test") {
        "test"
    } else if configuration == "compileOnly" {
        "provided"
    } else {
        BuildTool::Gradle.default_scope()
    }
}

/// 컴파일된 정규식 묶음
struct GradlePatterns {
    /// `conf 'g:a:v'` / `conf("g:a:v")`
    coordinate: Regex,
    /// `conf group: 'g', name: 'a', version: 'v'`
    map_form: Regex,
}

impl GradlePatterns {
    fn compile() -> Result<Self, regex::Error> {
        let keywords = CONFIGURATIONS.join("|");
        let coordinate = Regex::new(&format!(
            r#"^\s*({keywords})\s*\(?\s*['"]([^:'"\s]+):([^:'"\s]+):([^'"\s]+)['"]"#
        ))?;
        let map_form = Regex::new(&format!(
            r#"^\s*({keywords})\s*\(?\s*group\s*[:=]\s*['"]([^'"]+)['"]\s*,\s*name\s*[:=]\s*['"]([^'"]+)['"](?:\s*,\s*version\s*[:=]\s*['"]([^'"]+)['"])?"#
        ))?;
        Ok(Self {
            coordinate,
            map_form,
        })
    }

    fn match_line(&self, line: &str) -> Option<Dependency> {
        let kind = BuildTool::Gradle.dependency_type();

        if let Some(caps) = self.coordinate.captures(line) {
            let scope = scope_for(&caps[1]);
            return Some(Dependency::new(&caps[2], &caps[3], &caps[4], kind, scope));
        }

        let caps = self.map_form.captures(line)?;
        let version = caps.get(4).map_or(UNKNOWN, |m| m.as_str());
        Some(Dependency::new(
            &caps[2],
            &caps[3],
            version,
            kind,
            scope_for(&caps[1]),
        ))
    }
}

/// build.gradle(.kts)를 파싱합니다.
///
/// 인식되지 않는 줄은 무시하며, 내용이 무엇이든 실패하지 않습니다.
pub fn parse_build_gradle(
    content: &str,
    source_path: &str,
) -> Result<ParsedManifest, ScannerError> {
    let patterns = GradlePatterns::compile().map_err(|e| parse_error(source_path, e))?;

    let mut name = None;
    let mut version = None;
    let mut dependencies = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with('*') {
            continue;
        }

        if let Some(dep) = patterns.match_line(trimmed) {
            dependencies.push(dep);
            continue;
        }

        // rootProject.name이 일반 name보다 우선
        if let Some(value) = assignment(trimmed, "rootProject.name") {
            name = Some(value);
        } else if let Some(value) = assignment(trimmed, "name") {
            name.get_or_insert(value);
        } else if let Some(value) = assignment(trimmed, "version") {
            version = Some(value);
        }
    }

    Ok(ParsedManifest {
        project_name: or_unknown(name),
        project_version: or_unknown(version),
        dependencies,
    })
}

/// `key = 'value'` / `key "value"` 형식의 값을 추출합니다.
fn assignment<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(key)?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest);
    quoted_literal(rest)
}
