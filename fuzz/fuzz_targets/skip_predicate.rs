#![no_main]

use std::path::PathBuf;

use arbitrary::Arbitrary;
use cleansource_scanner::fingerprint::{EntryMeta, SkipPredicate};
use libfuzzer_sys::fuzz_target;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 경로 세그먼트 (최대 8개 사용)
    segments: Vec<String>,
    size: u64,
    is_dir: bool,
    max_file_size: u64,
}

fuzz_target!(|input: FuzzInput| {
    let path: PathBuf = input
        .segments
        .iter()
        .take(8)
        .filter(|s| !s.is_empty())
        .collect();

    let meta = if input.is_dir {
        EntryMeta::dir()
    } else {
        EntryMeta::file(input.size)
    };
    let skip = SkipPredicate::new(input.max_file_size.max(1));

    let skipped = skip.should_skip(&path, &meta);

    // 크기 상한 초과 파일은 항상 제외
    if !input.is_dir && input.size > skip.max_file_size() {
        assert!(skipped);
    }
});
