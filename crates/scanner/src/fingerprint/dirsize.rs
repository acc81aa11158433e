//! 디렉토리 크기 합산
//!
//! 파일마다 태스크를 만들지 않고 `workers` 크기의 rayon 풀이 순회 결과를 나눠 받아
//! 하나의 `AtomicU64`에 크기를 더합니다. 스킵 판정은 적용하지 않습니다.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::ScannerError;

/// 기본 워커 수 (가용 병렬도의 2배)
pub fn default_size_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(8)
}

/// 루트 아래 모든 일반 파일의 크기 합계를 계산합니다.
///
/// 블로킹 함수이므로 async 컨텍스트에서는 `spawn_blocking`으로 호출해야 합니다.
///
/// # Errors
///
/// - 루트가 없거나 디렉토리가 아니면 `DirectoryNotFound`
/// - 워커 풀 생성 실패 시 `Task`
pub fn directory_size(root: &Path, workers: usize) -> Result<u64, ScannerError> {
    if !root.is_dir() {
        return Err(ScannerError::DirectoryNotFound(root.display().to_string()));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("dirsize-{i}"))
        .build()
        .map_err(|e| ScannerError::Task(format!("failed to build size pool: {e}")))?;

    let total = AtomicU64::new(0);
    pool.install(|| {
        WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .par_bridge()
            .for_each(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        debug!(error = %e, "walk error, skipping entry");
                        return;
                    }
                };
                if !entry.file_type().is_file() {
                    return;
                }
                match entry.metadata() {
                    Ok(meta) => {
                        total.fetch_add(meta.len(), Ordering::Relaxed);
                    }
                    Err(e) => debug!(path = %entry.path().display(), error = %e, "failed to stat file"),
                }
            });
    });

    Ok(total.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_all_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/x")).unwrap();
        std::fs::write(dir.path().join("a.txt"), vec![0u8; 100]).unwrap();
        std::fs::write(dir.path().join(".hidden"), vec![0u8; 10]).unwrap();
        std::fs::write(dir.path().join("node_modules/x/index.js"), vec![0u8; 5]).unwrap();

        assert_eq!(directory_size(dir.path(), 3).unwrap(), 115);
    }

    #[test]
    fn empty_directory_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(directory_size(dir.path(), 1).unwrap(), 0);
    }

    #[test]
    fn zero_workers_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "abc").unwrap();
        assert_eq!(directory_size(dir.path(), 0).unwrap(), 3);
    }

    #[test]
    fn missing_root_is_error() {
        let err = directory_size(Path::new("/nonexistent/cleansource"), 2).unwrap_err();
        assert!(matches!(err, ScannerError::DirectoryNotFound(_)));
    }

    #[test]
    fn default_workers_is_positive() {
        assert!(default_size_workers() >= 2);
    }
}
