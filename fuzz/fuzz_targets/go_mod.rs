#![no_main]

use cleansource_scanner::parser::gomod::{parse_go_list, parse_go_mod};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // go.mod는 손실 디코딩으로 읽으므로 임의 바이트를 그대로 사용
    let content = String::from_utf8_lossy(data);
    let parsed = parse_go_mod(&content);
    for dep in &parsed.dependencies {
        assert!(!dep.version.is_empty());
    }
    let _ = parse_go_list(&content);
});
