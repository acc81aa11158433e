//! 도메인 타입 -- 의존성 모델
//!
//! 빌드 도구 스캐너가 생성하고 업로드 협력자가 직렬화하는 정규화된 의존성 구조를 정의합니다.
//! JSON 필드명은 업로드 서버 스키마에 맞춰 camelCase를 사용합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 빌드 도구 / 패키지 생태계 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildTool {
    /// Java (pom.xml)
    Maven,
    /// Java/Kotlin (build.gradle, build.gradle.kts)
    Gradle,
    /// Python (requirements.txt, setup.py, pyproject.toml)
    Pip,
    /// Python (Pipfile)
    Pipenv,
    /// JavaScript/TypeScript (package.json)
    Npm,
    /// Go (go.mod)
    Go,
}

impl BuildTool {
    /// 전체 빌드 도구 목록 (마커 테이블 순서)
    pub const ALL: [BuildTool; 6] = [
        Self::Maven,
        Self::Gradle,
        Self::Pip,
        Self::Pipenv,
        Self::Npm,
        Self::Go,
    ];

    /// 업로드 스키마에서 사용하는 식별자를 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maven => "maven",
            Self::Gradle => "gradle",
            Self::Pip => "pip",
            Self::Pipenv => "pipenv",
            Self::Npm => "npm",
            Self::Go => "go",
        }
    }

    /// 매니페스트에 scope가 없을 때 사용하는 기본 scope
    pub fn default_scope(&self) -> &'static str {
        match self {
            Self::Maven => "compile",
            Self::Gradle | Self::Pip | Self::Pipenv | Self::Npm | Self::Go => "runtime",
        }
    }

    /// 의존성 `type` 필드의 기본값
    ///
    /// Maven은 생태계 이름 대신 아티팩트 패키징(`jar`)을 사용합니다.
    pub fn dependency_type(&self) -> &'static str {
        match self {
            Self::Maven => "jar",
            other => other.as_str(),
        }
    }

    /// 문자열에서 빌드 도구를 파싱합니다 (대소문자 구분 없음).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "maven" | "mvn" => Some(Self::Maven),
            "gradle" => Some(Self::Gradle),
            "pip" | "python" | "pypi" => Some(Self::Pip),
            "pipenv" => Some(Self::Pipenv),
            "npm" | "node" | "javascript" | "js" => Some(Self::Npm),
            "go" | "golang" => Some(Self::Go),
            _ => None,
        }
    }
}

impl fmt::Display for BuildTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 의존성 고유 식별자
///
/// 의존성이 어느 매니페스트에 나타났는지와 무관하게 동일한 의존성을 식별합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyId {
    /// 그룹 (Maven groupId 등, 없으면 빈 문자열)
    pub group: String,
    /// 이름
    pub name: String,
    /// 버전
    pub version: String,
    /// 생태계 태그
    #[serde(rename = "type")]
    pub kind: String,
}

/// 단일 의존성
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub id: DependencyId,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group_id: String,
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scope: String,
    /// 전이 의존성 (현재 스캐너는 채우지 않음)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Dependency>,
}

impl Dependency {
    /// `id`와 평탄화된 필드가 항상 일치하도록 의존성을 생성합니다.
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        let group = group.into();
        let name = name.into();
        let version = version.into();
        let kind = kind.into();

        Self {
            id: DependencyId {
                group: group.clone(),
                name: name.clone(),
                version: version.clone(),
                kind: kind.clone(),
            },
            name,
            group_id: group,
            version,
            kind,
            scope: scope.into(),
            children: Vec::new(),
        }
    }

    /// 버전을 교체합니다. `id.version`도 함께 갱신됩니다.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.id.version = version.clone();
        self.version = version;
        self
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group_id.is_empty() {
            write!(f, "{}@{} ({})", self.name, self.version, self.scope)
        } else {
            write!(
                f,
                "{}:{}@{} ({})",
                self.group_id, self.name, self.version, self.scope
            )
        }
    }
}

/// 생태계별 스캔 결과 -- 프로젝트 정보와 의존성 목록
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRoot {
    pub project_name: String,
    pub project_version: String,
    pub build_tool: BuildTool,
    pub dependencies: Vec<Dependency>,
}

impl DependencyRoot {
    /// 의존성 수를 반환합니다.
    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }

    /// 이름으로 의존성을 검색합니다.
    pub fn find_dependency(&self, name: &str) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.name == name)
    }
}

impl fmt::Display for DependencyRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DependencyRoot({}@{}, {} dependencies, build_tool={})",
            self.project_name,
            self.project_version,
            self.dependencies.len(),
            self.build_tool,
        )
    }
}
