//! 빌드 도구 리졸버 -- 감지된 생태계별 스캐너 실행과 결과 수집
//!
//! 생태계 하나의 실패가 다른 생태계 결과에 영향을 주지 않습니다. 실패는 로그와
//! [`ResolveReport`]로만 드러나며 `resolve`는 항상 성공한 결과 목록을 반환합니다.
//!
//! ```text
//! detect_build_tools(root) --> [EcosystemScanner] --(순차)--> find_executable (soft)
//!                                                          --> find_manifest   (실패 시 제외)
//!                                                          --> execute         (실패 시 제외)
//!                                                          --> Vec<DependencyRoot>
//! ```

use std::fmt;
use std::path::Path;

use metrics::counter;
use tracing::{Instrument, Span, debug, info, warn};

use cleansource_core::metrics as names;
use cleansource_core::types::{BuildTool, DependencyRoot};

use crate::buildtools::{BuildToolScanner, EcosystemScanner, detect_build_tools};
use crate::config::ResolverConfig;
use crate::error::ScannerError;

/// 스캐너 실패 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStage {
    Manifest,
    Execute,
}

impl fmt::Display for ResolveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manifest => f.write_str("manifest"),
            Self::Execute => f.write_str("execute"),
        }
    }
}

/// 제외된 생태계와 사유
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveFailure {
    pub tool: BuildTool,
    pub stage: ResolveStage,
    pub reason: String,
}

/// 리졸버 실행 보고서
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// 감지된 빌드 도구 (마커 테이블 순서)
    pub detected: Vec<BuildTool>,
    /// 결과를 생성한 빌드 도구
    pub succeeded: Vec<BuildTool>,
    /// 제외된 빌드 도구
    pub failed: Vec<ResolveFailure>,
    /// 실행 파일을 찾지 못해 매니페스트만 파싱한 빌드 도구
    pub without_executable: Vec<BuildTool>,
}

impl ResolveReport {
    /// 모든 감지된 생태계가 성공했는지 여부
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 빌드 도구 리졸버
pub struct BuildToolResolver {
    config: ResolverConfig,
    span: Span,
}

impl BuildToolResolver {
    /// 빌더를 생성합니다.
    pub fn builder() -> BuildToolResolverBuilder {
        BuildToolResolverBuilder::new()
    }

    /// 스캔 루트의 의존성을 수집합니다.
    ///
    /// 실패하지 않습니다. 생태계별 실패는 경고 로그를 남기고 결과에서 제외됩니다.
    pub async fn resolve(&self, root: &Path) -> Vec<DependencyRoot> {
        self.resolve_with_report(root).await.0
    }

    /// [`resolve`](Self::resolve)와 동일하며 생태계별 성공/실패 보고서를 함께 반환합니다.
    pub async fn resolve_with_report(&self, root: &Path) -> (Vec<DependencyRoot>, ResolveReport) {
        self.run(root).instrument(self.span.clone()).await
    }

    async fn run(&self, root: &Path) -> (Vec<DependencyRoot>, ResolveReport) {
        let mut report = ResolveReport {
            detected: detect_build_tools(root),
            ..Default::default()
        };
        info!(
            root = %root.display(),
            detected = ?report.detected,
            "resolving build tool dependencies"
        );

        let mut results = Vec::new();
        for tool in report.detected.clone() {
            let mut scanner = EcosystemScanner::for_tool(tool, root, &self.config);

            match scanner.find_executable() {
                Ok(path) => debug!(build_tool = %tool, executable = %path.display(), "executable found"),
                Err(e) => {
                    warn!(build_tool = %tool, error = %e, "executable not found, parsing manifest only");
                    report.without_executable.push(tool);
                }
            }

            let outcome = match scanner.find_manifest() {
                Ok(_) => scanner
                    .execute()
                    .await
                    .map_err(|e| (ResolveStage::Execute, e)),
                Err(e) => Err((ResolveStage::Manifest, e)),
            };

            match outcome {
                Ok(roots) => {
                    let dependencies: usize = roots.iter().map(DependencyRoot::dependency_count).sum();
                    counter!(
                        names::RESOLVER_SCANS_TOTAL,
                        names::LABEL_BUILD_TOOL => tool.as_str(),
                        names::LABEL_RESULT => "success"
                    )
                    .increment(1);
                    counter!(
                        names::RESOLVER_DEPENDENCIES_TOTAL,
                        names::LABEL_BUILD_TOOL => tool.as_str()
                    )
                    .increment(dependencies as u64);

                    report.succeeded.push(tool);
                    results.extend(roots);
                }
                Err((stage, e)) => {
                    counter!(
                        names::RESOLVER_SCANS_TOTAL,
                        names::LABEL_BUILD_TOOL => tool.as_str(),
                        names::LABEL_RESULT => "failure"
                    )
                    .increment(1);
                    warn!(build_tool = %tool, stage = %stage, error = %e, "scanner failed, skipping");
                    report.failed.push(failure(tool, stage, &e));
                }
            }
        }

        if results.is_empty() {
            warn!(root = %root.display(), "no dependency roots resolved");
        } else {
            info!(
                roots = results.len(),
                succeeded = report.succeeded.len(),
                failed = report.failed.len(),
                "dependency resolution completed"
            );
        }

        (results, report)
    }
}

fn failure(tool: BuildTool, stage: ResolveStage, error: &ScannerError) -> ResolveFailure {
    ResolveFailure {
        tool,
        stage,
        reason: error.to_string(),
    }
}

/// [`BuildToolResolver`] 빌더
pub struct BuildToolResolverBuilder {
    config: ResolverConfig,
    span: Option<Span>,
}

impl BuildToolResolverBuilder {
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::from_core(&Default::default()),
            span: None,
        }
    }

    /// 리졸버 설정을 지정합니다.
    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// 리졸버 로그를 기록할 span을 지정합니다.
    ///
    /// 지정하지 않으면 `resolver` span을 새로 생성합니다.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self) -> BuildToolResolver {
        BuildToolResolver {
            config: self.config,
            span: self.span.unwrap_or_else(|| tracing::info_span!("resolver")),
        }
    }
}

impl Default for BuildToolResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}
