//! Profiling binary for the lexer
//!
//! Build with: cargo build --profile profiling --features dev-tools --bin profile_lexer
//! Profile with perf: perf record --call-graph=dwarf ./target/profiling/profile_lexer
//!                    perf report
//! Or with flamegraph: cargo flamegraph --features dev-tools --bin profile_lexer

mod common;

use ecmaparse::{Options, Tokenizer};

fn main() {
    common::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    // Default to 1MB, can be overridden with command line arg
    let size: usize = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1_000_000);

    let iterations: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);

    eprintln!("Generating {}KB source...", size / 1024);
    let source = common::generate_source(size);
    eprintln!("Source size: {} bytes", source.len());

    eprintln!("Running {} iterations of lexer...", iterations);

    let start = std::time::Instant::now();
    let mut total_tokens = 0usize;

    for _ in 0..iterations {
        for token in Tokenizer::new(&source, Options::default()) {
            if let Err(e) = token {
                eprintln!("Lex error: {e}");
                std::process::exit(1);
            }
            total_tokens += 1;
        }
    }

    let elapsed = start.elapsed();
    let bytes_per_sec = (source.len() * iterations) as f64 / elapsed.as_secs_f64();

    eprintln!("Done in {:?}", elapsed);
    eprintln!("Total tokens: {}", total_tokens);
    eprintln!("Throughput: {:.2} MB/s", bytes_per_sec / 1_000_000.0);
}
