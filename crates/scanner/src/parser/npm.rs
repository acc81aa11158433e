//! package.json 파서
//!
//! `dependencies`, `devDependencies`, `peerDependencies` 세 맵을 각각 독립적으로 순회하며
//! scope를 `runtime`, `development`, `peer`로 지정합니다. 버전은 선언된 범위 문자열을 그대로 사용합니다.
//!
//! # package.json 예시
//!
//! ```json
//! {
//!   "name": "my-app",
//!   "version": "1.0.0",
//!   "dependencies": { "express": "^4.18.2", "lodash": "^4.17.21" },
//!   "devDependencies": { "jest": "^29.0.0" }
//! }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use cleansource_core::types::{BuildTool, Dependency};

use crate::error::ScannerError;
use crate::parser::{ParsedManifest, UNKNOWN, or_unknown, parse_error};

/// package.json 구조 (파싱용)
#[derive(Deserialize)]
struct PackageJson {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "peerDependencies")]
    peer_dependencies: BTreeMap<String, serde_json::Value>,
}

/// package.json을 파싱합니다.
///
/// # Errors
///
/// JSON이 손상되었거나 최상위 값이 객체가 아니면 `ManifestParse`
pub fn parse_package_json(
    content: &str,
    source_path: &str,
) -> Result<ParsedManifest, ScannerError> {
    let package: PackageJson =
        serde_json::from_str(content).map_err(|e| parse_error(source_path, e))?;

    let kind = BuildTool::Npm.dependency_type();
    let sections = [
        (&package.dependencies, "runtime"),
        (&package.dev_dependencies, "development"),
        (&package.peer_dependencies, "peer"),
    ];

    let dependencies = sections
        .into_iter()
        .flat_map(|(map, scope)| {
            map.iter()
                .map(move |(name, range)| Dependency::new("", name, version_of(range), kind, scope))
        })
        .collect();

    Ok(ParsedManifest {
        project_name: or_unknown(package.name.as_deref()),
        project_version: or_unknown(package.version.as_deref()),
        dependencies,
    })
}

/// 버전 범위 값을 문자열로 변환합니다. 문자열이 아니면 `unknown`.
fn version_of(value: &serde_json::Value) -> String {
    match value.as_str() {
        Some(v) if !v.trim().is_empty() => v.trim().to_owned(),
        _ => UNKNOWN.to_owned(),
    }
}
