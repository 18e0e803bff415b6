//! Profiling binary for the parser
//!
//! Build with: cargo build --profile profiling --features dev-tools --bin profile_parser
//! Profile with perf: perf record --call-graph=dwarf ./target/profiling/profile_parser
//!                    perf report
//! Or with flamegraph: cargo flamegraph --features dev-tools --bin profile_parser
//!
//! Pass `--json` as the third argument to also time ESTree serialization.

mod common;

use ecmaparse::{Options, parse};

fn main() {
    common::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    // Default to 1MB, can be overridden with command line arg
    let size: usize = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1_000_000);

    let iterations: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);
    let serialize = args.get(3).is_some_and(|arg| arg == "--json");

    eprintln!("Generating {}KB source...", size / 1024);
    let source = common::generate_source(size);
    eprintln!("Source size: {} bytes", source.len());

    eprintln!("Running {} iterations of parser...", iterations);

    let start = std::time::Instant::now();
    let mut total_statements = 0usize;
    let mut json_bytes = 0usize;

    for i in 0..iterations {
        match parse(&source, Options::default()) {
            Ok(program) => {
                total_statements += program.body.len();
                if serialize {
                    match serde_json::to_string(&program) {
                        Ok(json) => json_bytes += json.len(),
                        Err(e) => eprintln!("Serialization error: {}", e),
                    }
                }
            }
            Err(e) => {
                if i == 0 {
                    eprintln!("Parse error: {}", e);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    let bytes_per_sec = (source.len() * iterations) as f64 / elapsed.as_secs_f64();

    eprintln!("Done in {:?}", elapsed);
    eprintln!("Total statements: {}", total_statements);
    if serialize {
        eprintln!("ESTree JSON: {} bytes", json_bytes);
    }
    eprintln!("Throughput: {:.2} MB/s", bytes_per_sec / 1_000_000.0);
}
