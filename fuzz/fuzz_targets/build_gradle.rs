#![no_main]

use cleansource_scanner::parser::gradle::parse_build_gradle;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let content = String::from_utf8_lossy(data);
    // 줄 단위 스캔은 어떤 입력에도 실패하지 않음
    assert!(parse_build_gradle(&content, "fuzz/build.gradle").is_ok());
});
