//! 스캐너 에러 타입
//!
//! [`ScannerError`]는 핑거프린트 엔진, 매니페스트 파서, 빌드 도구 스캐너에서 발생할 수 있는
//! 모든 에러를 나타냅니다. `From<ScannerError> for CleansourceError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **엔진 치명적**: `DirectoryNotFound`, `Io`, `Task`
//! - **생태계 국소**: `ManifestNotFound`, `ManifestParse`, `ToolExecution`
//! - **소프트**: `ExecutableNotFound` (리졸버는 로그만 남기고 계속 진행)
//! - **설정**: `Config`

use cleansource_core::error::{CleansourceError, ConfigError, ScanError};
use cleansource_core::types::BuildTool;

/// 스캐너 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    /// 스캔 루트가 없거나 디렉토리가 아님
    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 필수 매니페스트 없음
    #[error("{tool}: manifest not found in {dir}")]
    ManifestNotFound {
        /// 대상 빌드 도구
        tool: BuildTool,
        /// 탐색한 디렉토리
        dir: String,
    },

    /// 외부 도구 실행 파일 없음
    #[error("{tool}: executable not found")]
    ExecutableNotFound {
        /// 대상 빌드 도구
        tool: BuildTool,
    },

    /// 매니페스트 파싱 실패
    #[error("manifest parse error: {path}: {reason}")]
    ManifestParse {
        /// 파싱 대상 파일 경로
        path: String,
        /// 파싱 실패 사유
        reason: String,
    },

    /// 외부 도구 실행 실패
    #[error("{tool}: tool execution failed: {reason}")]
    ToolExecution {
        /// 대상 빌드 도구
        tool: BuildTool,
        /// 실패 사유
        reason: String,
    },

    /// 백그라운드 태스크 실패 (join 에러, 채널 종료)
    #[error("task error: {0}")]
    Task(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl ScannerError {
    /// 경로와 I/O 에러로 `Io` 변형을 생성합니다.
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

impl From<ScannerError> for CleansourceError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::DirectoryNotFound(path) => {
                CleansourceError::Scan(ScanError::DirectoryNotFound(path))
            }
            ScannerError::Io { path, source } => CleansourceError::Scan(
                ScanError::FingerprintFailed(format!("io error: {path}: {source}")),
            ),
            ScannerError::Task(msg) => CleansourceError::Scan(ScanError::FingerprintFailed(msg)),
            ScannerError::ManifestParse { path, reason } => CleansourceError::Scan(
                ScanError::ManifestParse(format!("{path}: {reason}")),
            ),
            err @ (ScannerError::ManifestNotFound { .. }
            | ScannerError::ExecutableNotFound { .. }
            | ScannerError::ToolExecution { .. }) => {
                CleansourceError::Scan(ScanError::BuildTool(err.to_string()))
            }
            ScannerError::Config { field, reason } => {
                CleansourceError::Config(ConfigError::InvalidValue { field, reason })
            }
        }
    }
}
