//! 설정 관리 -- cleansource.toml 파싱 및 런타임 설정
//!
//! [`CleansourceConfig`]는 스캔 코어가 소비하는 모든 설정을 담는 최상위 구조체입니다.
//! 코어가 실제로 읽는 값은 스캔 루트, 출력 디렉토리, 외부 도구 경로뿐이며
//! 나머지는 CLI와 로깅 초기화에서 사용합니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`CLEANSOURCE_SCAN_ROOT_DIR=/src` 형식)
//! 3. 설정 파일 (`cleansource.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), cleansource_core::error::CleansourceError> {
//! use cleansource_core::config::CleansourceConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = CleansourceConfig::load("cleansource.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = CleansourceConfig::parse("[scan]\nroot_dir = \"/src\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CleansourceError, ConfigError};

/// 핑거프린트 대상 파일 최대 크기 기본값 (1 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// 설정 상한값 상수
const MAX_FILE_SIZE_LIMIT: u64 = 100 * 1024 * 1024; // 100 MiB
const MAX_WORKERS: usize = 256;

/// cleansource 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleansourceConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 스캔 설정
    #[serde(default)]
    pub scan: ScanConfig,
    /// 외부 빌드 도구 경로
    #[serde(default)]
    pub tools: ToolPaths,
}

impl CleansourceConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CleansourceError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, CleansourceError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CleansourceError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                CleansourceError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, CleansourceError> {
        toml::from_str(toml_str).map_err(|e| {
            CleansourceError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `CLEANSOURCE_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "CLEANSOURCE_GENERAL_LOG_LEVEL");
        override_string(
            &mut self.general.log_format,
            "CLEANSOURCE_GENERAL_LOG_FORMAT",
        );

        // Scan
        override_string(&mut self.scan.root_dir, "CLEANSOURCE_SCAN_ROOT_DIR");
        override_string(&mut self.scan.output_dir, "CLEANSOURCE_SCAN_OUTPUT_DIR");
        override_string(
            &mut self.scan.fingerprint_file,
            "CLEANSOURCE_SCAN_FINGERPRINT_FILE",
        );
        override_string(
            &mut self.scan.dependency_file,
            "CLEANSOURCE_SCAN_DEPENDENCY_FILE",
        );
        override_string(&mut self.scan.digest, "CLEANSOURCE_SCAN_DIGEST");
        override_u64(
            &mut self.scan.max_file_size,
            "CLEANSOURCE_SCAN_MAX_FILE_SIZE",
        );
        override_usize(&mut self.scan.workers, "CLEANSOURCE_SCAN_WORKERS");
        override_bool(&mut self.scan.build_depend, "CLEANSOURCE_SCAN_BUILD_DEPEND");

        // Tools
        override_string(&mut self.tools.maven, "CLEANSOURCE_TOOLS_MAVEN");
        override_string(&mut self.tools.gradle, "CLEANSOURCE_TOOLS_GRADLE");
        override_string(&mut self.tools.pip, "CLEANSOURCE_TOOLS_PIP");
        override_string(
            &mut self.tools.pip_requirements,
            "CLEANSOURCE_TOOLS_PIP_REQUIREMENTS",
        );
        override_string(&mut self.tools.pipenv, "CLEANSOURCE_TOOLS_PIPENV");
        override_string(&mut self.tools.npm, "CLEANSOURCE_TOOLS_NPM");
        override_string(&mut self.tools.go, "CLEANSOURCE_TOOLS_GO");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), CleansourceError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        let valid_digests = ["md5", "sha256"];
        if !valid_digests.contains(&self.scan.digest.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "scan.digest".to_owned(),
                reason: format!("must be one of: {}", valid_digests.join(", ")),
            }
            .into());
        }

        if self.scan.root_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scan.root_dir".to_owned(),
                reason: "root_dir must not be empty".to_owned(),
            }
            .into());
        }

        if self.scan.max_file_size == 0 || self.scan.max_file_size > MAX_FILE_SIZE_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "scan.max_file_size".to_owned(),
                reason: format!("must be 1-{MAX_FILE_SIZE_LIMIT}"),
            }
            .into());
        }

        if self.scan.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidValue {
                field: "scan.workers".to_owned(),
                reason: format!("must be 0 (auto) or 1-{MAX_WORKERS}"),
            }
            .into());
        }

        for (field, name) in [
            ("scan.fingerprint_file", &self.scan.fingerprint_file),
            ("scan.dependency_file", &self.scan.dependency_file),
        ] {
            if name.is_empty() || name.contains('/') || name.contains('\\') {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: "must be a plain file name".to_owned(),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 스캔 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 스캔 루트 디렉토리
    pub root_dir: String,
    /// 산출물 디렉토리 (비어 있으면 스캔 루트의 상위 디렉토리)
    pub output_dir: String,
    /// 핑거프린트 파일명
    pub fingerprint_file: String,
    /// 의존성 JSON 파일명
    pub dependency_file: String,
    /// 다이제스트 알고리즘 (md5, sha256)
    pub digest: String,
    /// 핑거프린트 대상 파일 최대 크기 (바이트)
    pub max_file_size: u64,
    /// 동시 다이제스트 작업 수 (0이면 가용 병렬도)
    pub workers: usize,
    /// 의존성 분석 수행 여부
    pub build_depend: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root_dir: ".".to_owned(),
            output_dir: String::new(),
            fingerprint_file: "fingerprints.wfp".to_owned(),
            dependency_file: "dependencies.json".to_owned(),
            digest: "md5".to_owned(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            workers: 0,
            build_depend: true,
        }
    }
}

impl ScanConfig {
    /// 산출물 디렉토리를 결정합니다.
    ///
    /// `output_dir`가 비어 있으면 스캔 루트의 상위 디렉토리를 사용하고,
    /// 상위가 없으면 스캔 루트 자체를 사용합니다.
    pub fn resolve_output_dir(&self, root: &Path) -> PathBuf {
        if !self.output_dir.is_empty() {
            return PathBuf::from(&self.output_dir);
        }
        match root.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => root.to_path_buf(),
        }
    }

    /// 실제 사용할 작업자 수를 반환합니다.
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }
}

/// 외부 빌드 도구 실행 파일 경로
///
/// 비어 있는 값은 `PATH` 탐색으로 대체됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub maven: String,
    pub gradle: String,
    pub pip: String,
    /// requirements.txt 대체 경로
    pub pip_requirements: String,
    pub pipenv: String,
    pub npm: String,
    pub go: String,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
