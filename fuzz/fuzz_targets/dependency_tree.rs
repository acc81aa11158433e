#![no_main]

use cleansource_scanner::parser::maven::parse_dependency_tree;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(output) = std::str::from_utf8(data) {
        let _ = parse_dependency_tree(output);
    }
});
