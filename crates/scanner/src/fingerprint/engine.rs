//! 핑거프린트 엔진 -- 순회, 동시 다이제스트, 단일 writer
//!
//! # 내부 아키텍처
//!
//! ```text
//! walkdir (spawn_blocking) --path mpsc--> dispatcher --Semaphore--> JoinSet<spawn_blocking digest>
//!                                                                          |
//!                                                                   record mpsc (100)
//!                                                                          |
//!                                                                 writer task (BufWriter)
//! ```
//!
//! 순회는 다이제스트 완료와 독립적으로 진행됩니다. `generate`는 모든 다이제스트 태스크 종료,
//! 레코드 채널 닫힘, writer flush 완료 후에만 반환하므로 호출자는 반환 직후 산출물을 읽을 수 있습니다.
//! 레코드 순서는 완료 순서이며 보장되지 않습니다.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{Instrument, Span, debug, info, warn};
use walkdir::WalkDir;

use cleansource_core::metrics as names;

use crate::config::FingerprintConfig;
use crate::error::ScannerError;
use crate::fingerprint::digest::{DigestAlgorithm, digest_file};
use crate::fingerprint::skip::{EntryMeta, SkipPredicate};
use crate::fingerprint::{FileRecord, to_slash_path};

/// 레코드 채널 용량
const RECORD_CHANNEL_CAPACITY: usize = 100;

/// 순회 결과 경로 채널 용량
const PATH_CHANNEL_CAPACITY: usize = 256;

/// 핑거프린트 생성 결과 요약
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintSummary {
    /// 산출물 경로
    pub artifact: PathBuf,
    /// 기록된 레코드 수
    pub files_written: u64,
    /// 읽기 실패로 건너뛴 파일 수
    pub files_failed: u64,
    /// 다이제스트에 사용된 총 바이트
    pub bytes_hashed: u64,
}

/// 순회 대기 중인 파일
struct PendingFile {
    abs: PathBuf,
    rel: String,
}

/// 다이제스트 태스크 결과
enum DigestOutcome {
    Sent,
    Empty,
    Failed,
    WriterClosed,
}

/// writer 태스크 통계
#[derive(Debug, Default)]
struct WriterStats {
    records: u64,
    bytes: u64,
}

/// 핑거프린트 엔진
///
/// 스캔 루트마다 하나의 산출물을 생성합니다. 인스턴스는 상태를 갖지 않으므로
/// 여러 루트에 대해 재사용할 수 있습니다.
pub struct FingerprintEngine {
    config: FingerprintConfig,
    skip: SkipPredicate,
    span: Span,
}

impl FingerprintEngine {
    /// 빌더를 생성합니다.
    pub fn builder() -> FingerprintEngineBuilder {
        FingerprintEngineBuilder::new()
    }

    /// 엔진 설정을 반환합니다.
    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// 스캔 루트의 핑거프린트 산출물을 생성하고 경로를 반환합니다.
    ///
    /// # Errors
    ///
    /// - 루트가 없거나 디렉토리가 아니면 `DirectoryNotFound` (산출물 미생성)
    /// - 산출물 생성/쓰기 실패 시 `Io` (산출물 삭제)
    pub async fn generate(&self, root: &Path) -> Result<PathBuf, ScannerError> {
        self.generate_with_summary(root)
            .await
            .map(|summary| summary.artifact)
    }

    /// [`generate`](Self::generate)와 동일하며 생성 통계를 함께 반환합니다.
    pub async fn generate_with_summary(
        &self,
        root: &Path,
    ) -> Result<FingerprintSummary, ScannerError> {
        self.run(root).instrument(self.span.clone()).await
    }

    async fn run(&self, root: &Path) -> Result<FingerprintSummary, ScannerError> {
        let started = Instant::now();

        match tokio::fs::metadata(root).await {
            Ok(meta) if meta.is_dir() => {}
            _ => return Err(ScannerError::DirectoryNotFound(root.display().to_string())),
        }
        let root = tokio::fs::canonicalize(root)
            .await
            .map_err(|e| ScannerError::io(root, e))?;

        let artifact = self.config.artifact_path(&root);
        info!(
            root = %root.display(),
            artifact = %artifact.display(),
            digest = %self.config.digest,
            "starting fingerprint generation"
        );

        let file = tokio::fs::File::create(&artifact)
            .await
            .map_err(|e| ScannerError::io(&artifact, e))?;
        // 순회 경로는 정규화된 루트 기준이므로 제외 대상도 정규화
        let exclude = tokio::fs::canonicalize(&artifact)
            .await
            .unwrap_or_else(|_| artifact.clone());

        let (stats, failed) = self
            .fan_out_or_remove(root, &artifact, exclude, file)
            .await?;

        counter!(names::FINGERPRINT_FILES_TOTAL).increment(stats.records);
        counter!(names::FINGERPRINT_ERRORS_TOTAL).increment(failed);
        counter!(names::FINGERPRINT_BYTES_TOTAL).increment(stats.bytes);
        histogram!(names::FINGERPRINT_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());

        info!(
            artifact = %artifact.display(),
            files = stats.records,
            failed,
            bytes = stats.bytes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fingerprint file generated"
        );

        Ok(FingerprintSummary {
            artifact,
            files_written: stats.records,
            files_failed: failed,
            bytes_hashed: stats.bytes,
        })
    }

    /// [`fan_out`](Self::fan_out)이 실패하면 불완전한 산출물을 삭제합니다.
    async fn fan_out_or_remove(
        &self,
        root: PathBuf,
        artifact: &Path,
        exclude: PathBuf,
        file: tokio::fs::File,
    ) -> Result<(WriterStats, u64), ScannerError> {
        let result = self.fan_out(root, artifact, exclude, file).await;
        if result.is_err() {
            if let Err(rm) = tokio::fs::remove_file(artifact).await {
                warn!(artifact = %artifact.display(), error = %rm, "failed to remove partial artifact");
            }
        }
        result
    }

    /// 순회, 다이제스트, 쓰기를 조율합니다. 반환 시점에 writer는 flush를 마친 상태입니다.
    async fn fan_out(
        &self,
        root: PathBuf,
        artifact: &Path,
        exclude: PathBuf,
        file: tokio::fs::File,
    ) -> Result<(WriterStats, u64), ScannerError> {
        let (record_tx, record_rx) = mpsc::channel::<FileRecord>(RECORD_CHANNEL_CAPACITY);
        let (path_tx, mut path_rx) = mpsc::channel::<PendingFile>(PATH_CHANNEL_CAPACITY);

        let writer = tokio::spawn(write_records(file, record_rx).instrument(Span::current()));

        let walker = {
            let span = Span::current();
            let skip = self.skip;
            tokio::task::spawn_blocking(move || {
                let _guard = span.enter();
                walk(&root, &exclude, skip, &path_tx)
            })
        };

        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let algorithm = self.config.digest;
        let mut tasks: JoinSet<DigestOutcome> = JoinSet::new();
        let mut failed = 0u64;
        let mut task_error = None;

        while let Some(pending) = path_rx.recv().await {
            if record_tx.is_closed() {
                // writer가 종료됨: 더 이상 다이제스트할 필요 없음
                break;
            }

            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    task_error = Some(ScannerError::Task(format!("semaphore closed: {e}")));
                    break;
                }
            };

            let tx = record_tx.clone();
            let span = Span::current();
            tasks.spawn_blocking(move || {
                let _permit = permit;
                let _guard = span.enter();
                digest_one(pending, algorithm, &tx)
            });

            while let Some(joined) = tasks.try_join_next() {
                tally(joined, &mut failed, &mut task_error);
            }
        }

        // 순회가 끝났거나 중단됨: 남은 경로는 버리고 walker를 해제
        drop(path_rx);
        drop(record_tx);

        while let Some(joined) = tasks.join_next().await {
            tally(joined, &mut failed, &mut task_error);
        }

        match walker.await {
            Ok(visited) => debug!(visited, "directory walk finished"),
            Err(e) => {
                task_error.get_or_insert(ScannerError::Task(format!("walk task failed: {e}")));
            }
        }

        let stats = writer
            .await
            .map_err(|e| ScannerError::Task(format!("writer task failed: {e}")))?
            .map_err(|e| ScannerError::io(artifact, e))?;

        match task_error {
            Some(e) => Err(e),
            None => Ok((stats, failed)),
        }
    }
}

fn tally(
    joined: Result<DigestOutcome, tokio::task::JoinError>,
    failed: &mut u64,
    task_error: &mut Option<ScannerError>,
) {
    match joined {
        Ok(DigestOutcome::Failed) => *failed += 1,
        Ok(DigestOutcome::Sent | DigestOutcome::Empty | DigestOutcome::WriterClosed) => {}
        Err(e) => {
            task_error.get_or_insert(ScannerError::Task(format!("digest task failed: {e}")));
        }
    }
}

fn digest_one(
    pending: PendingFile,
    algorithm: DigestAlgorithm,
    tx: &mpsc::Sender<FileRecord>,
) -> DigestOutcome {
    match digest_file(&pending.abs, algorithm) {
        Ok(Some((hash, size))) => {
            let record = FileRecord {
                path: pending.rel,
                hash,
                size,
            };
            if tx.blocking_send(record).is_err() {
                DigestOutcome::WriterClosed
            } else {
                DigestOutcome::Sent
            }
        }
        Ok(None) => DigestOutcome::Empty,
        Err(e) => {
            debug!(path = %pending.abs.display(), error = %e, "failed to digest file, skipping");
            DigestOutcome::Failed
        }
    }
}

/// 스캔 루트를 순회하며 대상 파일을 경로 채널로 보냅니다. 방문한 대상 파일 수를 반환합니다.
fn walk(
    root: &Path,
    exclude: &Path,
    skip: SkipPredicate,
    tx: &mpsc::Sender<PendingFile>,
) -> u64 {
    let mut visited = 0u64;

    let entries = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            !skip.should_skip(rel, &EntryMeta::dir())
        });

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "walk error, skipping entry");
                continue;
            }
        };

        // 심볼릭 링크는 따라가지 않으며 일반 파일만 기록
        if !entry.file_type().is_file() || entry.path() == exclude {
            continue;
        }

        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(e) => {
                debug!(path = %entry.path().display(), error = %e, "failed to stat file, skipping");
                continue;
            }
        };

        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if skip.should_skip(rel, &EntryMeta::from(&meta)) {
            continue;
        }

        let Some(rel) = to_slash_path(rel) else {
            debug!(path = %entry.path().display(), "non UTF-8 path, skipping");
            continue;
        };
        let pending = PendingFile {
            rel,
            abs: entry.into_path(),
        };
        if tx.blocking_send(pending).is_err() {
            debug!("dispatcher stopped, ending walk");
            break;
        }
        visited += 1;
    }

    visited
}

async fn write_records(
    file: tokio::fs::File,
    mut rx: mpsc::Receiver<FileRecord>,
) -> std::io::Result<WriterStats> {
    let mut writer = BufWriter::new(file);
    let mut stats = WriterStats::default();

    while let Some(record) = rx.recv().await {
        writer.write_all(format!("{record}\n").as_bytes()).await?;
        stats.records += 1;
        stats.bytes += record.size;
    }

    writer.flush().await?;
    writer.into_inner().sync_all().await?;
    Ok(stats)
}

/// [`FingerprintEngine`] 빌더
#[derive(Default)]
pub struct FingerprintEngineBuilder {
    config: FingerprintConfig,
    span: Option<Span>,
}

impl FingerprintEngineBuilder {
    /// 기본 설정으로 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 엔진 설정을 지정합니다.
    pub fn config(mut self, config: FingerprintConfig) -> Self {
        self.config = config;
        self
    }

    /// 엔진 로그를 기록할 span을 지정합니다.
    ///
    /// 지정하지 않으면 `fingerprint` span을 새로 생성합니다.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// 설정을 검증하고 엔진을 생성합니다.
    ///
    /// # Errors
    ///
    /// 설정 검증 실패 시 `ScannerError::Config`
    pub fn build(self) -> Result<FingerprintEngine, ScannerError> {
        self.config.validate()?;
        let skip = SkipPredicate::new(self.config.max_file_size);
        Ok(FingerprintEngine {
            config: self.config,
            skip,
            span: self
                .span
                .unwrap_or_else(|| tracing::info_span!("fingerprint")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FingerprintConfigBuilder;

    fn engine_into(out: &Path) -> FingerprintEngine {
        let config = FingerprintConfigBuilder::new()
            .output_dir(out)
            .workers(2)
            .build()
            .unwrap();
        FingerprintEngine::builder().config(config).build().unwrap()
    }

    fn read_records(path: &Path) -> Vec<FileRecord> {
        let mut records: Vec<FileRecord> = std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| FileRecord::parse_line(l).unwrap())
            .collect();
        records.sort_by(|a, b| a.path.cmp(&b.path));
        records
    }

    #[tokio::test]
    async fn generates_records_for_eligible_files() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("src/nested")).unwrap();
        std::fs::write(src.path().join("src/main.rs"), "fn main() {}").unwrap();
        std::fs::write(src.path().join("src/nested/util.rs"), "pub fn u() {}").unwrap();
        std::fs::write(src.path().join("empty.txt"), "").unwrap();
        std::fs::write(src.path().join(".env"), "SECRET=1").unwrap();

        let summary = engine_into(out.path())
            .generate_with_summary(src.path())
            .await
            .unwrap();

        let records = read_records(&summary.artifact);
        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["src/main.rs", "src/nested/util.rs"]);
        assert_eq!(summary.files_written, 2);
        assert_eq!(summary.files_failed, 0);
        assert_eq!(summary.bytes_hashed, 12 + 13);
    }

    #[tokio::test]
    async fn missing_root_is_error_without_artifact() {
        let out = tempfile::tempdir().unwrap();
        let engine = engine_into(out.path());
        let err = engine
            .generate(Path::new("/nonexistent/cleansource/root"))
            .await
            .unwrap_err();
        assert!(matches!(err, ScannerError::DirectoryNotFound(_)));
        assert!(!out.path().join("fingerprints.wfp").exists());
    }

    #[tokio::test]
    async fn file_root_is_directory_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();

        let err = engine_into(dir.path()).generate(&file).await.unwrap_err();
        assert!(matches!(err, ScannerError::DirectoryNotFound(_)));
    }

    #[tokio::test]
    async fn uncreatable_artifact_is_io_error() {
        let src = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.txt"), "a").unwrap();

        let config = FingerprintConfigBuilder::new()
            .output_dir(src.path().join("missing/dir"))
            .build()
            .unwrap();
        let engine = FingerprintEngine::builder().config(config).build().unwrap();

        let err = engine.generate(src.path()).await.unwrap_err();
        assert!(matches!(err, ScannerError::Io { .. }));
    }

    #[tokio::test]
    async fn sha256_records_have_64_hex_chars() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.txt"), "hello").unwrap();

        let config = FingerprintConfigBuilder::new()
            .output_dir(out.path())
            .digest(DigestAlgorithm::Sha256)
            .build()
            .unwrap();
        let engine = FingerprintEngine::builder()
            .config(config)
            .span(tracing::info_span!("test"))
            .build()
            .unwrap();

        let artifact = engine.generate(src.path()).await.unwrap();
        let records = read_records(&artifact);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hash.len(), 64);
    }

    #[tokio::test]
    async fn write_failure_removes_artifact() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.txt"), "a").unwrap();

        let artifact = out.path().join("fingerprints.wfp");
        std::fs::write(&artifact, "").unwrap();
        // 읽기 전용 핸들이므로 writer의 flush가 실패
        let read_only = tokio::fs::File::open(&artifact).await.unwrap();

        let engine = engine_into(out.path());
        let root = std::fs::canonicalize(src.path()).unwrap();
        let err = engine
            .fan_out_or_remove(root, &artifact, artifact.clone(), read_only)
            .await
            .unwrap_err();

        assert!(matches!(err, ScannerError::Io { .. }));
        assert!(!artifact.exists());
    }
}
