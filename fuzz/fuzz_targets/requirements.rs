#![no_main]

use cleansource_scanner::parser::pip::{merge_declared, parse_freeze, parse_requirements};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let content = String::from_utf8_lossy(data);
    let declared = parse_requirements(&content);
    let installed = parse_freeze(&content);
    let bound = declared.len() + installed.len();
    let merged = merge_declared(declared, installed);
    // 병합 결과는 선언 + 설치 목록보다 길 수 없음
    assert!(merged.len() <= bound);
});
