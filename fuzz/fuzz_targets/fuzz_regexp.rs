#![no_main]

use ecmaparse::regexp::validate;
use libfuzzer_sys::fuzz_target;

const FLAG_SETS: [&str; 4] = ["", "u", "v", "dgimsy"];

fuzz_target!(|data: &[u8]| {
    let Ok(pattern) = std::str::from_utf8(data) else {
        return;
    };
    if pattern.len() > 10_000 {
        return;
    }

    // Validation should accept or reject, never panic
    for flags in FLAG_SETS {
        let _ = validate(pattern, flags);
    }
});
