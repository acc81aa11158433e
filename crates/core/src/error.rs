//! 에러 타입 -- 도메인별 에러 정의

/// cleansource 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum CleansourceError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 스캔 처리 에러
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 스캔 처리 에러
///
/// 스캐너 크레이트의 세부 에러는 이 분류로 변환되어 상위로 전파됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// 스캔 대상 디렉토리 없음
    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    /// 핑거프린트 생성 실패
    #[error("fingerprint failed: {0}")]
    FingerprintFailed(String),

    /// 매니페스트 파싱 실패
    #[error("manifest parse failed: {0}")]
    ManifestParse(String),

    /// 외부 빌드 도구 실행 실패
    #[error("build tool failed: {0}")]
    BuildTool(String),
}
