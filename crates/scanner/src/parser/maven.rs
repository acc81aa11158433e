//! Maven 파서 -- pom.xml, `mvn dependency:tree` 출력
//!
//! # pom.xml 규칙
//!
//! - 프로젝트 식별자는 `artifactId`/`version`이며, `version`과 `groupId`가 없으면 `<parent>`에서 상속
//! - `project/dependencies/dependency`만 대상 (`dependencyManagement`, `plugins` 제외)
//! - `scope` 기본값 `compile`, `type` 기본값 `jar`
//! - `${prop}` 참조는 `<properties>`, `project.version`, `project.groupId`로 치환
//!
//! # dependency:tree 출력 예시
//!
//! ```text
//! [INFO] com.example:demo:jar:1.0.0
//! [INFO] +- org.slf4j:slf4j-api:jar:2.0.9:compile
//! [INFO] |  \- org.hamcrest:hamcrest:jar:2.2:test
//! [INFO] \- junit:junit:jar:4.13.2:test
//! ```

use std::collections::HashMap;

use roxmltree::{Document, Node};
use tracing::debug;

use cleansource_core::types::{BuildTool, Dependency};

use crate::error::ScannerError;
use crate::parser::{ParsedManifest, UNKNOWN, or_unknown, parse_error};

/// `${...}` 치환 최대 반복 횟수 (순환 참조 방지)
const MAX_INTERPOLATION_PASSES: usize = 8;

/// 4필드 좌표에서 네 번째 필드를 scope로 판정하는 키워드
const SCOPE_KEYWORDS: &[&str] = &["compile", "test", "provided", "runtime", "system", "import"];

/// pom.xml을 파싱합니다.
///
/// # Errors
///
/// XML이 손상되었거나 루트 요소가 `project`가 아니면 `ManifestParse`
pub fn parse_pom(content: &str, source_path: &str) -> Result<ParsedManifest, ScannerError> {
    let doc = Document::parse(content).map_err(|e| parse_error(source_path, e))?;
    let project = doc.root_element();
    if project.tag_name().name() != "project" {
        return Err(parse_error(
            source_path,
            format!("unexpected root element <{}>", project.tag_name().name()),
        ));
    }

    let parent = child(project, "parent");
    let artifact_id = child_text(project, "artifactId");
    let group_id =
        child_text(project, "groupId").or_else(|| parent.and_then(|p| child_text(p, "groupId")));
    let version =
        child_text(project, "version").or_else(|| parent.and_then(|p| child_text(p, "version")));

    let mut properties: HashMap<String, String> = HashMap::new();
    if let Some(props) = child(project, "properties") {
        for prop in props.children().filter(Node::is_element) {
            properties.insert(
                prop.tag_name().name().to_owned(),
                prop.text().unwrap_or_default().trim().to_owned(),
            );
        }
    }
    for (key, value) in [
        ("project.version", version),
        ("pom.version", version),
        ("version", version),
        ("project.groupId", group_id),
        ("project.artifactId", artifact_id),
    ] {
        if let Some(value) = value {
            properties
                .entry(key.to_owned())
                .or_insert_with(|| value.to_owned());
        }
    }
    if let Some(parent_version) = parent.and_then(|p| child_text(p, "version")) {
        properties
            .entry("project.parent.version".to_owned())
            .or_insert_with(|| parent_version.to_owned());
    }

    let mut dependencies = Vec::new();
    if let Some(deps) = child(project, "dependencies") {
        for dep in deps
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "dependency")
        {
            let Some(name) = child_text(dep, "artifactId") else {
                debug!(path = source_path, "dependency without artifactId, skipping");
                continue;
            };
            let resolve = |field: &str| child_text(dep, field).map(|v| interpolate(v, &properties));

            let group = resolve("groupId").unwrap_or_default();
            let version = resolve("version").unwrap_or_else(|| UNKNOWN.to_owned());
            let kind = resolve("type").unwrap_or_else(|| BuildTool::Maven.dependency_type().to_owned());
            let scope = resolve("scope").unwrap_or_else(|| BuildTool::Maven.default_scope().to_owned());

            dependencies.push(Dependency::new(
                group,
                interpolate(name, &properties),
                version,
                kind,
                scope,
            ));
        }
    }

    Ok(ParsedManifest {
        project_name: or_unknown(artifact_id.map(|a| interpolate(a, &properties)).as_deref()),
        project_version: or_unknown(version.map(|v| interpolate(v, &properties)).as_deref()),
        dependencies,
    })
}

/// `mvn dependency:tree` 텍스트 출력을 파싱합니다.
///
/// 트리 기호(`+-`, `\-`)가 있는 줄만 대상이며, 형식이 맞지 않는 줄은 건너뜁니다.
pub fn parse_dependency_tree(output: &str) -> Vec<Dependency> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| line.contains(':') && (line.contains("+-") || line.contains("\\-")))
        .filter_map(parse_tree_line)
        .collect()
}

fn parse_tree_line(line: &str) -> Option<Dependency> {
    let cleaned = line
        .replace("[INFO]", "")
        .replace("+-", "")
        .replace("\\-", "")
        .replace('|', "");
    // "(optional)", "- omitted for duplicate" 등 좌표 뒤의 주석 제거
    let coords = cleaned.split_whitespace().next()?;
    let parts: Vec<&str> = coords.split(':').collect();
    if parts.len() < 3 || parts[..2].iter().any(|p| p.is_empty()) {
        return None;
    }

    let (group, name) = (parts[0], parts[1]);
    let default_type = BuildTool::Maven.dependency_type();
    let default_scope = BuildTool::Maven.default_scope();

    let (kind, version, scope) = match parts.len() {
        3 => (default_type, parts[2], default_scope),
        4 if SCOPE_KEYWORDS.iter().any(|k| parts[3].contains(k)) => {
            (default_type, parts[2], parts[3])
        }
        4 => (parts[2], parts[3], default_scope),
        5 => (parts[2], parts[3], parts[4]),
        // group:artifact:type:classifier:version:scope
        _ => (parts[2], parts[4], parts[5]),
    };

    if version.is_empty() {
        return None;
    }

    Some(Dependency::new(group, name, version, kind, scope))
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// `${key}` 참조를 속성 값으로 치환합니다. 알 수 없는 참조는 그대로 둡니다.
fn interpolate(value: &str, properties: &HashMap<String, String>) -> String {
    let mut current = value.to_owned();

    for _ in 0..MAX_INTERPOLATION_PASSES {
        if !current.contains("${") {
            break;
        }
        let mut out = String::with_capacity(current.len());
        let mut rest = current.as_str();
        let mut changed = false;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let key = &after[..end];
                    match properties.get(key) {
                        Some(v) => {
                            out.push_str(v);
                            changed = true;
                        }
                        None => {
                            out.push_str("${");
                            out.push_str(key);
                            out.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        current = out;

        if !changed {
            break;
        }
    }

    current
}
