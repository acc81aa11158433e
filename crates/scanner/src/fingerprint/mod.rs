//! 소스 트리 핑거프린트
//!
//! 스캔 루트 아래의 대상 파일마다 한 줄씩 `file=<상대경로>,hash=<hex>,size=<바이트>` 레코드를
//! 기록한 산출물(`fingerprints.wfp`)을 생성합니다.
//!
//! # 구성
//!
//! - [`skip`]: 대상 여부를 판정하는 순수 함수
//! - [`digest`]: 파일 다이제스트 계산
//! - [`engine`]: 순회, 동시 다이제스트, 단일 writer를 조율하는 엔진
//! - [`dirsize`]: 고정 크기 워커 풀 기반 디렉토리 크기 합산

pub mod digest;
pub mod dirsize;
pub mod engine;
pub mod skip;

use std::fmt;
use std::path::{Component, Path};

pub use digest::{DigestAlgorithm, digest_file};
pub use dirsize::directory_size;
pub use engine::{FingerprintEngine, FingerprintEngineBuilder, FingerprintSummary};
pub use skip::{EntryMeta, SkipPredicate};

/// 파일 하나의 핑거프린트 레코드
///
/// 산출물에 기록되기 전까지만 존재합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRecord {
    /// 스캔 루트 기준 상대 경로 (`/` 구분)
    pub path: String,
    /// 소문자 hex 다이제스트
    pub hash: String,
    /// 바이트 크기
    pub size: u64,
}

impl FileRecord {
    /// 산출물의 한 줄을 파싱합니다. 형식이 맞지 않으면 `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let rest = line.trim_end().strip_prefix("file=")?;
        // 경로에 쉼표가 있을 수 있으므로 뒤에서부터 분리
        let (rest, size) = rest.rsplit_once(",size=")?;
        let (path, hash) = rest.rsplit_once(",hash=")?;
        Some(Self {
            path: path.to_owned(),
            hash: hash.to_owned(),
            size: size.parse().ok()?,
        })
    }
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file={},hash={},size={}", self.path, self.hash, self.size)
    }
}

/// 상대 경로를 `/` 구분 문자열로 변환합니다.
///
/// 서로 다른 경로가 같은 레코드 경로로 합쳐지지 않도록 UTF-8이 아닌 경로는 `None`.
pub(crate) fn to_slash_path(rel: &Path) -> Option<String> {
    let mut segments = Vec::new();
    for component in rel.components() {
        if let Component::Normal(seg) = component {
            segments.push(seg.to_str()?);
        }
    }
    Some(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn record_display_format() {
        let record = FileRecord {
            path: "src/main.rs".to_owned(),
            hash: "5eb63bbbe01eeed093cb22bb8f5acdc3".to_owned(),
            size: 11,
        };
        assert_eq!(
            record.to_string(),
            "file=src/main.rs,hash=5eb63bbbe01eeed093cb22bb8f5acdc3,size=11"
        );
    }

    #[test]
    fn parse_line_handles_comma_in_path() {
        let record = FileRecord::parse_line("file=docs/a,b.md,hash=abc,size=3\n").unwrap();
        assert_eq!(record.path, "docs/a,b.md");
        assert_eq!(record.hash, "abc");
        assert_eq!(record.size, 3);
    }

    #[test]
    fn parse_line_rejects_garbage() {
        assert!(FileRecord::parse_line("hash=abc,size=3").is_none());
        assert!(FileRecord::parse_line("file=a,hash=abc,size=x").is_none());
    }

    #[test]
    fn slash_path_joins_components() {
        let rel: PathBuf = ["src", "nested", "lib.rs"].iter().collect();
        assert_eq!(to_slash_path(&rel).as_deref(), Some("src/nested/lib.rs"));
    }

    #[cfg(unix)]
    #[test]
    fn slash_path_rejects_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let rel = Path::new("src").join(OsStr::from_bytes(b"a\xff"));
        assert_eq!(to_slash_path(&rel), None);
    }
}
