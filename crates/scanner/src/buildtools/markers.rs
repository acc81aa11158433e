//! 마커 파일 테이블 -- 파일 이름으로 빌드 도구 판별
//!
//! 스캔 루트 바로 아래(재귀하지 않음)에 마커 파일이 있으면 해당 빌드 도구를 사용하는 프로젝트로 판단합니다.
//! 테이블 순서가 곧 리졸버의 스캐너 실행 순서입니다.

use std::path::Path;

use cleansource_core::types::BuildTool;

/// 마커 파일과 빌드 도구의 대응
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerDescriptor {
    /// 스캔 루트 바로 아래의 파일 이름
    pub marker: &'static str,
    /// 대응하는 빌드 도구
    pub tool: BuildTool,
}

const fn marker(marker: &'static str, tool: BuildTool) -> ScannerDescriptor {
    ScannerDescriptor { marker, tool }
}

/// 마커 테이블
pub const MARKERS: &[ScannerDescriptor] = &[
    marker("pom.xml", BuildTool::Maven),
    marker("build.gradle", BuildTool::Gradle),
    marker("build.gradle.kts", BuildTool::Gradle),
    marker("requirements.txt", BuildTool::Pip),
    marker("setup.py", BuildTool::Pip),
    marker("pyproject.toml", BuildTool::Pip),
    marker("Pipfile", BuildTool::Pipenv),
    marker("package.json", BuildTool::Npm),
    marker("go.mod", BuildTool::Go),
];

/// 마커 파일 이름에 대응하는 빌드 도구를 반환합니다.
pub fn tool_for_marker(file_name: &str) -> Option<BuildTool> {
    MARKERS
        .iter()
        .find(|d| d.marker == file_name)
        .map(|d| d.tool)
}

/// 빌드 도구의 마커 파일 이름들 (테이블 순서)
pub fn markers_for(tool: BuildTool) -> impl Iterator<Item = &'static str> {
    MARKERS
        .iter()
        .filter(move |d| d.tool == tool)
        .map(|d| d.marker)
}

/// 스캔 루트에서 감지된 빌드 도구를 테이블 순서대로 중복 없이 반환합니다.
///
/// 디렉토리인 마커 경로는 무시합니다.
pub fn detect_build_tools(root: &Path) -> Vec<BuildTool> {
    let mut detected = Vec::new();
    for descriptor in MARKERS {
        if detected.contains(&descriptor.tool) {
            continue;
        }
        if root.join(descriptor.marker).is_file() {
            detected.push(descriptor.tool);
        }
    }
    detected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_for_marker_lookup() {
        assert_eq!(tool_for_marker("pom.xml"), Some(BuildTool::Maven));
        assert_eq!(tool_for_marker("build.gradle.kts"), Some(BuildTool::Gradle));
        assert_eq!(tool_for_marker("pyproject.toml"), Some(BuildTool::Pip));
        assert_eq!(tool_for_marker("Pipfile"), Some(BuildTool::Pipenv));
        assert_eq!(tool_for_marker("Cargo.toml"), None);
        assert_eq!(tool_for_marker("POM.XML"), None);
    }

    #[test]
    fn every_tool_has_a_marker() {
        for tool in BuildTool::ALL {
            assert!(markers_for(tool).next().is_some(), "{tool} has no marker");
        }
        let gradle: Vec<&str> = markers_for(BuildTool::Gradle).collect();
        assert_eq!(gradle, vec!["build.gradle", "build.gradle.kts"]);
    }

    #[test]
    fn detect_in_table_order_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["go.mod", "package.json", "setup.py", "requirements.txt", "pom.xml"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let tools = detect_build_tools(dir.path());
        assert_eq!(
            tools,
            vec![BuildTool::Maven, BuildTool::Pip, BuildTool::Npm, BuildTool::Go]
        );
    }

    #[test]
    fn detect_ignores_nested_and_directory_markers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/pom.xml"), "").unwrap();
        std::fs::create_dir(dir.path().join("package.json")).unwrap();
        assert!(detect_build_tools(dir.path()).is_empty());
    }
}
