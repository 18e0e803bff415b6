//! Parser benchmarks
//!
//! Run with: cargo bench --bench parser
//! Profile with: cargo flamegraph --bench parser -- --bench

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ecmaparse::{Options, parse};

/// Simple expressions
const SIMPLE_EXPR: &str = "1 + 2 * 3 - 4 / 5";

/// Binary expression tree (deep nesting)
fn generate_binary_expr(depth: usize) -> String {
    if depth == 0 {
        "x".to_string()
    } else {
        format!(
            "({} + {})",
            generate_binary_expr(depth - 1),
            generate_binary_expr(depth - 1)
        )
    }
}

/// Variable declarations
const VARIABLES: &str = r#"
let x = 1;
const y = 2;
var z = 3;
let a = x + y + z;
const b = a * 2;
let { foo, bar: baz = 4, ...others } = obj;
const [first, second, ...rest] = arr;
"#;

/// Class definition
const CLASS_DEF: &str = r#"
class Counter extends Base {
    #count = 0;
    static instances = 0;

    constructor(name, initialValue = 0) {
        super();
        this.name = name;
        this.#count = initialValue;
        Counter.instances++;
    }

    get value() { return this.#count; }
    set value(n) { if (n >= 0) this.#count = n; }
    increment() { this.#count++; return this; }
    static isCounter(obj) { return #count in obj; }
    static { Counter.registry = new Map(); }
}
"#;

/// Arrow functions and parenthesized expressions, which the parser
/// cannot tell apart until it sees `=>`
const ARROWS: &str = r#"
const add = (a, b) => a + b;
const grouped = (a, b);
const nested = ({ x, y: [z = 1] }, ...rest) => ({ x, z, rest });
const asyncArrow = async ({ id }) => await fetch(id);
const chained = items.filter((item) => item.ok).map(({ value }) => value * 2);
const curried = (a) => (b) => (c) => a + b + c;
"#;

/// Control flow
const CONTROL_FLOW: &str = r#"
outer: for (let i = 0; i < 10; i++) {
    for (const item of items) {
        if (item === i) continue outer;
        switch (item.kind) {
            case "a": handleA(item); break;
            case "b": handleB(item); break;
            default: handleDefault(item);
        }
    }
}
for (const key in object) console.log(key);
while (running) tick();
do attempt(); while (shouldRetry);
try { risky(); } catch ({ message }) { report(message); } finally { cleanup(); }
"#;

/// Module syntax
const MODULES: &str = r#"
import defaultExport, { named as alias, "string name" as str } from "./module.js";
import * as namespace from "./namespace.js";
import data from "./data.json" with { type: "json" };
export const exported = await load(import.meta.url);
export { alias as renamed };
export * as everything from "./everything.js";
export default class {}
"#;

fn generate_large_source(size: usize) -> String {
    let snippets = [VARIABLES, CLASS_DEF, ARROWS, CONTROL_FLOW];
    let mut source = String::with_capacity(size);
    let mut i = 0;
    while source.len() < size {
        if let Some(snippet) = snippets.get(i % snippets.len()) {
            // a block per snippet keeps repeated declarations legal
            source.push('{');
            source.push_str(snippet);
            source.push_str("}\n");
        }
        i += 1;
    }
    source
}

fn bench_parser_individual(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let cases = [
        ("simple_expr", SIMPLE_EXPR, false),
        ("variables", VARIABLES, false),
        ("class_def", CLASS_DEF, false),
        ("arrows", ARROWS, false),
        ("control_flow", CONTROL_FLOW, false),
        ("modules", MODULES, true),
    ];

    for (name, source, module) in cases {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse", name), source, |b, s| {
            b.iter(|| {
                let options = if module { Options::module() } else { Options::default() };
                black_box(parse(black_box(s), options))
            });
        });
    }

    group.finish();
}

fn bench_parser_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser/throughput");

    for size in [1_000, 10_000, 100_000] {
        let source = generate_large_source(size);
        let actual_size = source.len();
        group.throughput(Throughput::Bytes(actual_size as u64));
        group.bench_with_input(
            BenchmarkId::new("generated", format!("{}KB", actual_size / 1000)),
            &source,
            |b, s| b.iter(|| black_box(parse(black_box(s), Options::default()))),
        );
    }

    group.finish();
}

fn bench_parser_expression_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser/expression_depth");

    // Test expression parsing at different nesting depths
    for depth in [5, 10, 15] {
        let source = generate_binary_expr(depth);

        group.bench_with_input(
            BenchmarkId::new("binary_tree", format!("depth_{}", depth)),
            &source,
            |b, s| b.iter(|| black_box(parse(black_box(s), Options::default()))),
        );
    }

    group.finish();
}

fn bench_parser_statements(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser/statements");

    // Generate many simple statements
    let many_lets: String = (0..1000)
        .map(|i| format!("let x{} = {};\n", i, i))
        .collect();
    let many_fns: String = (0..100)
        .map(|i| format!("function f{}(a, b) {{ return a + b; }}\n", i))
        .collect();
    let many_classes: String = (0..50)
        .map(|i| format!("class C{} {{ constructor() {{ this.x = {}; }} }}\n", i, i))
        .collect();

    let cases = [
        ("1000_let_statements", &many_lets),
        ("100_function_declarations", &many_fns),
        ("50_class_declarations", &many_classes),
    ];
    for (name, source) in cases {
        group.bench_function(name, |b| {
            b.iter(|| black_box(parse(black_box(source), Options::default())))
        });
    }

    group.finish();
}

fn bench_estree_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser/estree");

    let source = generate_large_source(10_000);
    let Ok(program) = parse(&source, Options::default().with_locations()) else {
        return;
    };
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("to_json_with_locations", |b| {
        b.iter(|| black_box(serde_json::to_string(black_box(&program))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parser_individual,
    bench_parser_throughput,
    bench_parser_expression_depth,
    bench_parser_statements,
    bench_estree_serialization
);
criterion_main!(benches);
