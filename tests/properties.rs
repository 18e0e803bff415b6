//! Whole-tree properties over a varied corpus
//!
//! Every node's span contains its children's spans, tokens and trivia
//! account for every byte of the source, and parsing is deterministic.

use std::cell::RefCell;
use std::rc::Rc;

use ecmaparse::ast::{Program, Statement};
use ecmaparse::{Comment, Options, TokenKind, parse, tokenize};
use serde_json::Value;

const SCRIPTS: &[&str] = &[
    "'use strict';\nvar a = 1, b = [1, 2, ...c], { d, e: [f = 2] } = g;\n\
     function add(x, y = 1, ...rest) { return x + y * rest.length; }\n",
    "label: for (let i = 0; i < 10; i++) { if (i % 2) continue label; else break; }",
    "for (const k in o) {} for (const v of list) {} while (a) a--; do { b++ } while (b < 3)",
    "switch (x) { case 1: y(); break; default: z() }",
    "try { risky() } catch ({ message }) { log(message) } finally { done() }",
    "const f = async (a, { b }) => { await a; return b?.c ?? d; };",
    "class Point extends Base {\n  #x = 0;\n  static count = 0;\n  static { Point.count++; }\n  \
     constructor(x) { super(); this.#x = x; }\n  get x() { return this.#x; }\n  \
     static #check(p) { return #x in p; }\n}",
    "const s = tag`a${b}c${`nested ${d}`}`;",
    "x = a ? b : c, y = /ab+c/gi.test(z), w = 0x1fn + 1_000n;",
    "function* gen() { yield* other(); const v = yield 1; }",
    "new Foo(...args).bar[baz]?.(qux);",
    "(function () { 'use strict'; return typeof this; })();",
    "if (a) { /* block comment */ } // trailing\nelse b = c ** 2;",
    "obj = { a, b: 1, [c]: 2, get d() { return 1 }, set d(v) {}, async *e() {}, ...f };",
    "({ a = 1, b: { c } } = source);",
    "const café = \"naïve ☃\"; // ümlaut\n",
    "a\n++b\nlet x = 1\nlet y = 2",
];

const MODULES: &[&str] = &[
    "import def, { a as b, c } from 'mod';\nimport * as ns from \"ns\";\n\
     export const e = 1;\nexport { b as renamed };\nexport default class {}\n",
    "export * from 'x';\nexport * as y from 'y';\n\
     export async function f() { await import('z'); return import.meta.url }",
    "const data = await load();\n/** doc */\nexport { data };",
];

fn corpus() -> impl Iterator<Item = (&'static str, fn() -> Options)> {
    let script: fn() -> Options = Options::default;
    let module: fn() -> Options = Options::module;
    SCRIPTS
        .iter()
        .map(move |s| (*s, script))
        .chain(MODULES.iter().map(move |s| (*s, module)))
}

fn parse_ok(source: &str, options: Options) -> Program {
    match parse(source, options) {
        Ok(program) => program,
        Err(e) => panic!("{source:?} failed: {e}"),
    }
}

fn node_extent(node: &serde_json::Map<String, Value>) -> Option<(u64, u64)> {
    Some((node.get("start")?.as_u64()?, node.get("end")?.as_u64()?))
}

/// Walk serialized nodes, checking each one against its nearest
/// enclosing node.
fn check_nested(value: &Value, parent: (u64, u64), source: &str) {
    match value {
        Value::Object(node) => {
            let mut extent = parent;
            if let Some((start, end)) = node_extent(node) {
                let kind = node.get("type").and_then(Value::as_str).unwrap_or("?");
                assert!(start <= end, "{kind} {start}..{end} is inverted in {source:?}");
                assert!(
                    parent.0 <= start && end <= parent.1,
                    "{kind} {start}..{end} escapes its parent {}..{} in {source:?}",
                    parent.0,
                    parent.1
                );
                extent = (start, end);
            }
            for child in node.values() {
                check_nested(child, extent, source);
            }
        }
        Value::Array(items) => {
            for item in items {
                check_nested(item, parent, source);
            }
        }
        _ => {}
    }
}

#[test]
fn test_children_lie_within_parents() {
    for (source, options) in corpus() {
        let program = parse_ok(source, options());
        let json = serde_json::to_value(&program).unwrap();
        assert_eq!(json["start"], 0);
        assert_eq!(json["end"], source.len());
        check_nested(&json, (0, source.len() as u64), source);
    }
}

fn check_statements(parent: &ecmaparse::ast::Span, body: &[Statement], source: &str) {
    for statement in body {
        assert!(parent.contains(statement.span()), "statement escapes in {source:?}");
        match statement {
            Statement::FunctionDeclaration(decl) => {
                let function = &decl.function;
                assert!(function.span.contains(&function.body.span));
                check_statements(&function.body.span, &function.body.body, source);
            }
            Statement::Block(block) => check_statements(&block.span, &block.body, source),
            Statement::Expression(stmt) => {
                assert!(statement.span().contains(stmt.expression.span()));
            }
            _ => {}
        }
    }
}

#[test]
fn test_typed_spans_contain_their_statements() {
    for (source, options) in corpus() {
        let program = parse_ok(source, options());
        check_statements(&program.span, &program.body, source);
    }
}

#[test]
fn test_ranges_match_offsets() {
    fn check(value: &Value) {
        match value {
            Value::Object(node) => {
                if let Some((start, end)) = node_extent(node) {
                    assert_eq!(node.get("range"), Some(&serde_json::json!([start, end])));
                }
                node.values().for_each(check);
            }
            Value::Array(items) => items.iter().for_each(check),
            _ => {}
        }
    }
    for (source, options) in corpus() {
        let program = parse_ok(source, options().with_ranges());
        check(&serde_json::to_value(&program).unwrap());
    }
}

/// Tokens, comments and the whitespace between them add up to the source.
fn check_token_cover(source: &str, options: Options) {
    let comments: Rc<RefCell<Vec<Comment>>> = Rc::default();
    let sink = Rc::clone(&comments);
    let options = options.on_comment(move |c| sink.borrow_mut().push(c.clone()));
    let tokens = match tokenize(source, options) {
        Ok(tokens) => tokens,
        Err(e) => panic!("{source:?} failed to tokenize: {e}"),
    };

    for pair in tokens.windows(2) {
        if let [prev, next] = pair {
            assert!(prev.end <= next.start, "tokens overlap in {source:?}");
        }
    }
    let Some(eof) = tokens.last() else {
        panic!("no tokens for {source:?}");
    };
    assert_eq!(eof.kind, TokenKind::Eof);
    assert_eq!((eof.start, eof.end), (source.len(), source.len()));

    let mut pieces: Vec<(usize, usize)> = tokens.iter().map(|t| (t.start, t.end)).collect();
    pieces.extend(comments.borrow().iter().map(|c| (c.start, c.end)));
    pieces.sort_unstable();

    let mut pos = 0;
    let mut covered = 0;
    for (start, end) in pieces {
        assert!(pos <= start && start <= end, "overlap at {start} in {source:?}");
        let Some(gap) = source.get(pos..start) else {
            panic!("gap {pos}..{start} is not on a char boundary in {source:?}");
        };
        assert!(
            gap.chars().all(char::is_whitespace),
            "unaccounted text {gap:?} in {source:?}"
        );
        covered += gap.len() + (end - start);
        pos = end;
    }
    assert_eq!(pos, source.len());
    assert_eq!(covered, source.len());
}

#[test]
fn test_tokens_and_trivia_cover_source() {
    for (source, options) in corpus() {
        check_token_cover(source, options());
    }
}

#[test]
fn test_reparse_is_identical() {
    for (source, options) in corpus() {
        let first = parse_ok(source, options().with_locations());
        let second = parse_ok(source, options().with_locations());
        assert_eq!(first, second);
        let first = serde_json::to_string(&first).unwrap();
        let second = serde_json::to_string(&second).unwrap();
        assert_eq!(first, second, "JSON differs for {source:?}");
    }
}
