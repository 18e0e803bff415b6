//! Regular expression validation through the public API and through
//! literals met during a parse.

use ecmaparse::regexp::{validate, validate_literal};
use ecmaparse::{Options, Severity, parse};

fn parse_err(source: &str, options: Options) -> String {
    match parse(source, options) {
        Ok(_) => panic!("expected an error for {source:?}"),
        Err(e) => e.message,
    }
}

#[test]
fn test_common_patterns_are_valid() {
    let patterns = [
        (r"^\d{3}-\d{4}$", ""),
        (r"[A-Za-z_$][\w$]*", "g"),
        (r"(?:https?|ftp)://[^\s/$.?#].[^\s]*", "i"),
        (r"(?<year>\d{4})-(?<month>\d{2})", "u"),
        (r"(?<=\$)\d+(?!\.)", ""),
        (r"\p{Script_Extensions=Latin}+", "u"),
        (r"[\p{Emoji}--\q{😀}]", "v"),
        (r"a.b", "s"),
        (r"x", "dy"),
    ];
    for (pattern, flags) in patterns {
        assert!(
            validate(pattern, flags).is_ok(),
            "/{pattern}/{flags} should be valid"
        );
    }
}

#[test]
fn test_annex_b_leniency_without_unicode() {
    // legacy syntax accepted only outside unicode mode
    for pattern in [r"]", r"{", r"a{1", r"\c", r"[\c]", r"\8", r"(?=a)+"] {
        assert!(validate(pattern, "").is_ok(), "/{pattern}/ should be valid");
        assert!(validate(pattern, "u").is_err(), "/{pattern}/u should be invalid");
    }
}

#[test]
fn test_error_messages() {
    let message = |pattern: &str, flags: &str| validate(pattern, flags).unwrap_err().message;
    assert_eq!(message("(", ""), "Unterminated group");
    assert_eq!(message("a**", ""), "Nothing to repeat");
    assert_eq!(message("(?<1a>x)", ""), "Invalid capture group name");
    assert_eq!(message("\\k<x>", "u"), "Invalid named capture referenced");
    assert_eq!(message("\\k", "u"), "Invalid named reference");
}

#[test]
fn test_version_gating() {
    assert!(validate_literal("(?<n>a)", "", 9).is_ok());
    assert!(validate_literal("(?<=a)b", "", 8).is_err());
    assert!(validate_literal("a", "d", 12).is_err());
    assert!(validate_literal("a", "d", 13).is_ok());
}

#[test]
fn test_invalid_literal_fails_parse() {
    let message = parse_err("let re = /(?<n>a)(?<n>b)/;", Options::default());
    assert_eq!(
        message,
        "Invalid regular expression: /(?<n>a)(?<n>b)/: Duplicate capture group name"
    );
}

#[test]
fn test_invalid_literal_error_points_at_literal() {
    let Err(err) = parse("x = /a/gg", Options::default()) else {
        panic!("duplicate flags must be rejected");
    };
    assert_eq!(err.pos, 4);
    assert_eq!(err.severity, Severity::Recoverable);
}

#[test]
fn test_literal_follows_parse_ecma_version() {
    let source = "/(?<n>a)|(?<n>b)/";
    assert!(parse(source, Options::default()).is_ok());
    assert!(parse(source, Options::default().with_ecma_version(2024)).is_err());
}

#[test]
fn test_slash_in_class_does_not_end_literal() {
    let program = parse("var r = /[/]/.source;", Options::default()).unwrap();
    assert_eq!(program.body.len(), 1);
}
