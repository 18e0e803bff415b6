#![no_main]

use ecmaparse::{Options, Tokenizer};
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

    // Consume all tokens - should never panic, and positions never go backwards
    let mut last_end = 0;
    for token in Tokenizer::new(source, Options::default()) {
        let Ok(token) = token else {
            break;
        };
        assert!(token.start >= last_end);
        assert!(token.end <= source.len());
        last_end = token.end;
    }
});
