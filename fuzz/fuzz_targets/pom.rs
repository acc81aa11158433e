#![no_main]

use cleansource_scanner::parser::maven::parse_pom;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(parsed) = parse_pom(content, "fuzz/pom.xml") {
            // 파싱된 의존성은 항상 Maven 기본값을 가진다
            for dep in &parsed.dependencies {
                assert!(!dep.scope.is_empty());
                assert!(!dep.kind.is_empty());
            }
        }
    }
});
