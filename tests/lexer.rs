//! Tests for the lexer
//!
//! These tests go through the public `tokenize` entry point and the
//! `on_token`/`on_comment` callbacks, the way tooling consumes tokens.

use std::cell::RefCell;
use std::rc::Rc;

use ecmaparse::lexer::Position;
use ecmaparse::{Comment, CommentKind, Options, Token, TokenKind, TokenValue, parse, tokenize};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source, Options::default())
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .filter(|k| *k != TokenKind::Eof)
        .collect()
}

fn tokens(source: &str) -> Vec<Token> {
    tokenize(source, Options::default()).unwrap()
}

fn lex_err(source: &str) -> String {
    tokenize(source, Options::default()).unwrap_err().message
}

#[test]
fn test_numbers() {
    let values: Vec<TokenValue> = tokens("42 3.5 1e3 0xff 0b1010 0o17 1_000")
        .into_iter()
        .map(|t| t.value)
        .collect();
    assert_eq!(
        &values[..7],
        &[
            TokenValue::Number(42.0),
            TokenValue::Number(3.5),
            TokenValue::Number(1000.0),
            TokenValue::Number(255.0),
            TokenValue::Number(10.0),
            TokenValue::Number(15.0),
            TokenValue::Number(1000.0),
        ]
    );
}

#[test]
fn test_number_literal_with_trailing_dot() {
    assert_eq!(
        kinds("1..toString()"),
        vec![
            TokenKind::Num,
            TokenKind::Dot,
            TokenKind::Name,
            TokenKind::ParenL,
            TokenKind::ParenR
        ]
    );
}

#[test]
fn test_bigint_value_drops_separators() {
    let toks = tokens("1_000n");
    assert_eq!(toks[0].value, TokenValue::BigInt("1000".to_string()));
}

#[test]
fn test_eof_token_is_last() {
    let toks = tokens("a /* trailing */");
    let last = toks.last().unwrap();
    assert_eq!(last.kind, TokenKind::Eof);
    assert_eq!(last.start, 16);
    assert_eq!(last.end, 16);
}

#[test]
fn test_regexp_after_keywords_and_operators() {
    assert_eq!(
        kinds("return /a/g"),
        vec![TokenKind::Return, TokenKind::Regexp]
    );
    assert_eq!(kinds("x = a / b / c"), vec![
        TokenKind::Name,
        TokenKind::Eq,
        TokenKind::Name,
        TokenKind::Slash,
        TokenKind::Name,
        TokenKind::Slash,
        TokenKind::Name
    ]);
    // `}` closing a block statement is followed by an expression
    assert_eq!(
        kinds("{}/foo/"),
        vec![TokenKind::BraceL, TokenKind::BraceR, TokenKind::Regexp]
    );
    // `)` closing a call is followed by an operator
    assert_eq!(
        kinds("f()/2"),
        vec![
            TokenKind::Name,
            TokenKind::ParenL,
            TokenKind::ParenR,
            TokenKind::Slash,
            TokenKind::Num
        ]
    );
}

#[test]
fn test_regexp_value() {
    let toks = tokens("/[/]\\d+/giu");
    assert_eq!(
        toks[0].value,
        TokenValue::RegExp {
            pattern: "[/]\\d+".to_string(),
            flags: "giu".to_string(),
        }
    );
}

#[test]
fn test_invalid_regexp_is_reported_by_tokenize() {
    assert_eq!(
        lex_err("/(?<n>a)(?<n>b)/"),
        "Invalid regular expression: /(?<n>a)(?<n>b)/: Duplicate capture group name"
    );
    assert!(lex_err("/a/gg").ends_with("Duplicate regular expression flag"));
}

#[test]
fn test_template_with_nested_braces() {
    assert_eq!(
        kinds("`a${ {b: 1}.b }c`"),
        vec![
            TokenKind::BackQuote,
            TokenKind::Template,
            TokenKind::DollarBraceL,
            TokenKind::BraceL,
            TokenKind::Name,
            TokenKind::Colon,
            TokenKind::Num,
            TokenKind::BraceR,
            TokenKind::Dot,
            TokenKind::Name,
            TokenKind::BraceR,
            TokenKind::Template,
            TokenKind::BackQuote
        ]
    );
}

#[test]
fn test_keywords_escape_flag() {
    let toks = tokens("\\u0069f");
    assert_eq!(toks[0].kind, TokenKind::If);
    assert_eq!(toks[0].value, TokenValue::Name("if".to_string()));
}

#[test]
fn test_contextual_keywords_are_names() {
    assert_eq!(
        kinds("async await yield let of get set static using"),
        vec![TokenKind::Name; 9]
    );
}

#[test]
fn test_errors() {
    assert_eq!(lex_err("'abc"), "Unterminated string constant");
    assert_eq!(lex_err("/* abc"), "Unterminated comment");
    assert_eq!(lex_err("`abc"), "Unterminated template");
    assert_eq!(lex_err("3in x"), "Identifier directly after number");
    assert_eq!(lex_err("/abc"), "Unterminated regular expression");
}

#[test]
fn test_error_position() {
    let err = tokenize("a\n  'x", Options::default()).unwrap_err();
    assert_eq!(err.pos, 4);
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 2);
    assert_eq!(err.to_string(), "Unterminated string constant (2:2)");
}

#[test]
fn test_token_locations_and_ranges() {
    let options = Options::default().with_locations().with_ranges();
    let toks = tokenize("let x\n  = 1;", options).unwrap();
    let eq = &toks[2];
    assert_eq!(eq.kind, TokenKind::Eq);
    assert_eq!(eq.range, Some([8, 9]));
    let loc = eq.loc.as_ref().unwrap();
    assert_eq!(loc.start, Position::new(2, 2));
    assert_eq!(loc.end, Position::new(2, 3));
}

#[test]
fn test_crlf_counts_as_one_line_break() {
    let toks = tokenize("a\r\nb\u{2028}c", Options::default().with_locations()).unwrap();
    let lines: Vec<u32> = toks
        .iter()
        .filter_map(|t| t.loc.as_ref().map(|l| l.start.line))
        .collect();
    assert_eq!(lines, vec![1, 2, 3, 3]);
}

#[test]
fn test_on_token_sees_parser_tokens() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let options = Options::default().on_token(move |t: &Token| sink.borrow_mut().push(t.kind));
    parse("x = /re/.test(y)", options).unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![
            TokenKind::Name,
            TokenKind::Eq,
            TokenKind::Regexp,
            TokenKind::Dot,
            TokenKind::Name,
            TokenKind::ParenL,
            TokenKind::Name,
            TokenKind::ParenR,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_on_comment() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let options =
        Options::default().on_comment(move |c: &Comment| sink.borrow_mut().push(c.clone()));
    parse("// one\nx /* two */ + y", options).unwrap();
    let comments = seen.borrow();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].kind, CommentKind::Line);
    assert_eq!(comments[0].value, " one");
    assert_eq!((comments[0].start, comments[0].end), (0, 6));
    assert_eq!(comments[1].kind, CommentKind::Block);
    assert_eq!(comments[1].value, " two ");
}

#[test]
fn test_hashbang_only_at_start() {
    assert_eq!(kinds("#!/usr/bin/env node\nx"), vec![TokenKind::Name]);
    assert!(tokenize(" #!x", Options::default()).is_err());
}

#[test]
fn test_tokens_serialize() {
    let toks = tokens("a");
    let json = serde_json::to_value(&toks[0]).unwrap();
    assert_eq!(json["start"], 0);
    assert_eq!(json["end"], 1);
}
