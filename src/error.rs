//! Error types for the parser

use serde::Serialize;
use thiserror::Error;

use crate::lexer::Position;

/// How a syntax error was raised.
///
/// Both severities abort the parse. `Recoverable` marks early errors that a
/// tolerant consumer could skip over (redeclarations, reserved words used as
/// names, invalid escapes in keywords and so on), `Fatal` marks errors after
/// which the token stream itself can no longer be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Fatal,
    Recoverable,
}

/// A syntax error with its source position.
///
/// `pos` is a byte offset into the source, `line` is 1-based and `column`
/// is a 0-based byte offset from the start of that line.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} ({line}:{column})")]
pub struct SyntaxError {
    pub message: String,
    pub pos: usize,
    pub line: u32,
    pub column: u32,
    pub severity: Severity,
}

impl SyntaxError {
    /// Build an error at `pos`, computing line and column from `input`.
    pub fn new(input: &str, pos: usize, message: impl Into<String>, severity: Severity) -> Self {
        let Position { line, column } = Position::at(input, pos);
        let message = message.into();
        tracing::debug!(pos, line, column, ?severity, %message, "syntax error");
        SyntaxError {
            message,
            pos,
            line,
            column,
            severity,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.severity == Severity::Recoverable
    }
}

/// Result type used throughout the lexer and parser
pub type PResult<T> = Result<T, SyntaxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_line_and_column() {
        let err = SyntaxError::new("a\nbc d", 5, "Unexpected token", Severity::Fatal);
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 3);
        assert_eq!(err.to_string(), "Unexpected token (2:3)");
    }

    #[test]
    fn test_severity() {
        let err = SyntaxError::new("x", 0, "dup", Severity::Recoverable);
        assert!(err.is_recoverable());
        let err = SyntaxError::new("x", 0, "bad", Severity::Fatal);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_position_past_end_clamps() {
        let err = SyntaxError::new("ab", 10, "eof", Severity::Fatal);
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 2);
    }
}
