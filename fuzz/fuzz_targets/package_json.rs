#![no_main]

use cleansource_scanner::parser::npm::parse_package_json;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = parse_package_json(content, "fuzz/package.json");
    }
});
