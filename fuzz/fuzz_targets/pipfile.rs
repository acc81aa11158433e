#![no_main]

use cleansource_scanner::parser::pipenv::parse_pipfile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let parsed = parse_pipfile(&String::from_utf8_lossy(data));
    for dep in &parsed.dependencies {
        assert!(!dep.version.is_empty());
    }
});
