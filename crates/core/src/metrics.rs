//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 스캐너 크레이트는 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 레코더가 설치되지 않은 경우 모든 호출은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `cleansource_`
//! - 모듈명: `fingerprint_`, `resolver_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(cleansource_core::metrics::FINGERPRINT_FILES_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 빌드 도구 레이블 키 (maven, gradle, pip, pipenv, npm, go)
pub const LABEL_BUILD_TOOL: &str = "build_tool";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Fingerprint 메트릭 ─────────────────────────────────────────────

/// Fingerprint: 기록된 파일 수 (counter)
pub const FINGERPRINT_FILES_TOTAL: &str = "cleansource_fingerprint_files_total";

/// Fingerprint: 다이제스트 실패 수 (counter)
pub const FINGERPRINT_ERRORS_TOTAL: &str = "cleansource_fingerprint_errors_total";

/// Fingerprint: 해시된 바이트 수 (counter)
pub const FINGERPRINT_BYTES_TOTAL: &str = "cleansource_fingerprint_bytes_total";

/// Fingerprint: 생성 소요 시간 (histogram, 초)
pub const FINGERPRINT_DURATION_SECONDS: &str = "cleansource_fingerprint_duration_seconds";

// ─── Resolver 메트릭 ────────────────────────────────────────────────

/// Resolver: 스캐너 실행 수 (counter, labels: build_tool, result)
pub const RESOLVER_SCANS_TOTAL: &str = "cleansource_resolver_scans_total";

/// Resolver: 수집된 의존성 수 (counter, label: build_tool)
pub const RESOLVER_DEPENDENCIES_TOTAL: &str = "cleansource_resolver_dependencies_total";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 핑거프린트 소요 시간 히스토그램 버킷 (초)
///
/// 10ms ~ 600s 범위 (대형 모노레포 포함)
pub const FINGERPRINT_DURATION_BUCKETS: [f64; 9] =
    [0.01, 0.1, 0.5, 1.0, 5.0, 30.0, 60.0, 300.0, 600.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더가 없으면 아무 동작도 하지 않으므로 시작 시 한 번 호출하면 됩니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    // Fingerprint
    describe_counter!(
        FINGERPRINT_FILES_TOTAL,
        "Total number of file records written to the fingerprint artifact"
    );
    describe_counter!(
        FINGERPRINT_ERRORS_TOTAL,
        "Total number of files that failed to digest"
    );
    describe_counter!(
        FINGERPRINT_BYTES_TOTAL,
        "Total bytes read while computing file digests"
    );
    describe_histogram!(
        FINGERPRINT_DURATION_SECONDS,
        "Time to produce one fingerprint artifact in seconds"
    );

    // Resolver
    describe_counter!(
        RESOLVER_SCANS_TOTAL,
        "Build tool scanner runs by build tool and result"
    );
    describe_counter!(
        RESOLVER_DEPENDENCIES_TOTAL,
        "Dependencies collected by build tool"
    );
}
