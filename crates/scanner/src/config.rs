//! 스캐너 설정
//!
//! [`FingerprintConfig`]와 [`ResolverConfig`]는 core의
//! [`ScanConfig`](cleansource_core::config::ScanConfig) /
//! [`ToolPaths`](cleansource_core::config::ToolPaths)에서 파생되며,
//! 엔진과 리졸버가 실제로 소비하는 값만 담습니다.
//!
//! # 사용 예시
//!
//! ```
//! use cleansource_scanner::{DigestAlgorithm, FingerprintConfigBuilder};
//!
//! let config = FingerprintConfigBuilder::new()
//!     .output_dir("/tmp/out")
//!     .digest(DigestAlgorithm::Sha256)
//!     .workers(4)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.workers, 4);
//! ```

use std::path::{Path, PathBuf};

use cleansource_core::config::{DEFAULT_MAX_FILE_SIZE, ScanConfig, ToolPaths};
use cleansource_core::types::BuildTool;

use crate::error::ScannerError;
use crate::fingerprint::digest::DigestAlgorithm;

/// 설정 상한값 상수
const MAX_FILE_SIZE_LIMIT: u64 = 100 * 1024 * 1024; // 100 MiB
const MAX_WORKERS: usize = 256;

/// 핑거프린트 엔진 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintConfig {
    /// 산출물 디렉토리 (`None`이면 스캔 루트의 상위 디렉토리)
    pub output_dir: Option<PathBuf>,
    /// 산출물 파일명
    pub file_name: String,
    /// 다이제스트 알고리즘
    pub digest: DigestAlgorithm,
    /// 대상 파일 최대 크기 (바이트)
    pub max_file_size: u64,
    /// 동시 다이제스트 작업 수
    pub workers: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            file_name: "fingerprints.wfp".to_owned(),
            digest: DigestAlgorithm::Md5,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            workers: default_workers(),
        }
    }
}

impl FingerprintConfig {
    /// core의 `ScanConfig`에서 엔진 설정을 생성합니다.
    ///
    /// 알 수 없는 다이제스트 이름은 MD5로 대체됩니다 (core 검증을 통과한 설정이라면 발생하지 않음).
    pub fn from_core(core: &ScanConfig) -> Self {
        let output_dir = if core.output_dir.is_empty() {
            None
        } else {
            Some(PathBuf::from(&core.output_dir))
        };

        Self {
            output_dir,
            file_name: core.fingerprint_file.clone(),
            digest: DigestAlgorithm::from_str_loose(&core.digest).unwrap_or_default(),
            max_file_size: core.max_file_size,
            workers: core.effective_workers(),
        }
    }

    /// 스캔 루트에 대한 산출물 경로를 결정합니다.
    pub fn artifact_path(&self, root: &Path) -> PathBuf {
        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => match root.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => root.to_path_buf(),
            },
        };
        dir.join(&self.file_name)
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `file_name`: 비어 있지 않고 경로 구분자를 포함하지 않음
    /// - `max_file_size`: 1-104857600
    /// - `workers`: 1-256
    pub fn validate(&self) -> Result<(), ScannerError> {
        if self.file_name.is_empty() || self.file_name.contains(['/', '\\']) {
            return Err(ScannerError::Config {
                field: "file_name".to_owned(),
                reason: "must be a plain file name".to_owned(),
            });
        }

        if self.max_file_size == 0 || self.max_file_size > MAX_FILE_SIZE_LIMIT {
            return Err(ScannerError::Config {
                field: "max_file_size".to_owned(),
                reason: format!("must be 1-{MAX_FILE_SIZE_LIMIT}"),
            });
        }

        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(ScannerError::Config {
                field: "workers".to_owned(),
                reason: format!("must be 1-{MAX_WORKERS}"),
            });
        }

        Ok(())
    }
}

/// [`FingerprintConfig`] 빌더
#[derive(Default)]
pub struct FingerprintConfigBuilder {
    config: FingerprintConfig,
}

impl FingerprintConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 산출물 디렉토리를 설정합니다.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    /// 산출물 파일명을 설정합니다.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.config.file_name = name.into();
        self
    }

    /// 다이제스트 알고리즘을 설정합니다.
    pub fn digest(mut self, digest: DigestAlgorithm) -> Self {
        self.config.digest = digest;
        self
    }

    /// 최대 파일 크기(바이트)를 설정합니다.
    pub fn max_file_size(mut self, size: u64) -> Self {
        self.config.max_file_size = size;
        self
    }

    /// 동시 다이제스트 작업 수를 설정합니다.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `ScannerError::Config` 반환
    pub fn build(self) -> Result<FingerprintConfig, ScannerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// 빌드 도구 리졸버 설정
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    /// 빌드 도구별 명시적 실행 파일 경로
    pub tool_paths: ToolPaths,
    /// 외부 빌드 도구 실행 여부
    ///
    /// `false`이면 실행 파일 탐색 결과와 무관하게 매니페스트만 파싱합니다.
    pub external_tools: bool,
}

impl ResolverConfig {
    /// core의 `ToolPaths`에서 리졸버 설정을 생성합니다.
    pub fn from_core(tools: &ToolPaths) -> Self {
        Self {
            tool_paths: tools.clone(),
            external_tools: true,
        }
    }

    /// 외부 도구를 실행하지 않는 설정을 생성합니다.
    pub fn manifest_only() -> Self {
        Self {
            tool_paths: ToolPaths::default(),
            external_tools: false,
        }
    }

    /// 빌드 도구에 대해 설정된 실행 파일 경로를 반환합니다.
    pub fn explicit_path(&self, tool: BuildTool) -> Option<PathBuf> {
        let raw = match tool {
            BuildTool::Maven => &self.tool_paths.maven,
            BuildTool::Gradle => &self.tool_paths.gradle,
            BuildTool::Pip => &self.tool_paths.pip,
            BuildTool::Pipenv => &self.tool_paths.pipenv,
            BuildTool::Npm => &self.tool_paths.npm,
            BuildTool::Go => &self.tool_paths.go,
        };
        non_empty_path(raw)
    }

    /// requirements.txt 대체 경로
    pub fn pip_requirements(&self) -> Option<PathBuf> {
        non_empty_path(&self.tool_paths.pip_requirements)
    }
}

fn non_empty_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
