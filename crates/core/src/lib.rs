//! cleansource 공통 크레이트
//!
//! 소스 트리 검사 파이프라인이 공유하는 의존성 모델, 에러 분류, 설정, 메트릭 이름을 제공합니다.

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{CleansourceError, ConfigError, ScanError};

// 설정
pub use config::{CleansourceConfig, GeneralConfig, ScanConfig, ToolPaths};

// 도메인 타입
pub use types::{BuildTool, Dependency, DependencyId, DependencyRoot};
