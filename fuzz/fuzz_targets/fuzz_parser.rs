#![no_main]

use ecmaparse::{Options, parse};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only process valid UTF-8
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    // Limit input size to avoid timeout
    if source.len() > 100_000 {
        return;
    }

    // Parse should return Ok or Err, never panic
    for options in [Options::default(), Options::module()] {
        if let Ok(program) = parse(source, options) {
            assert_eq!(program.span.end, source.len());
            let _ = serde_json::to_string(&program);
        }
    }
});
