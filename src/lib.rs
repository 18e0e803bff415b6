//! ECMAScript parser producing ESTree syntax trees
//!
//! # Example
//!
//! ```
//! use ecmaparse::{Options, parse};
//!
//! let program = parse("let answer = 6 * 7;", Options::default()).unwrap();
//! assert_eq!(program.body.len(), 1);
//! let json = serde_json::to_value(&program).unwrap();
//! assert_eq!(json["body"][0]["type"], "VariableDeclaration");
//! ```

pub mod ast;
pub mod charclass;
pub mod context;
pub mod error;
pub mod extension;
pub mod lexer;
pub mod limits;
pub mod options;
pub mod parser;
pub mod regexp;
pub mod scope;

pub use ast::{Expression, Program};
pub use error::{PResult, Severity, SyntaxError};
pub use lexer::{Comment, CommentKind, Lexer, Token, TokenKind, TokenValue, Tokenizer};
pub use options::{AllowReserved, EcmaVersion, Options, SourceType};
pub use parser::Parser;

/// Parse a complete script or module.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn parse(source: &str, options: Options) -> PResult<Program> {
    Parser::new(source, options).parse()
}

/// Parse a single expression starting at byte offset `pos`. Text after the
/// expression is ignored.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len(), pos))]
pub fn parse_expression_at(source: &str, pos: usize, options: Options) -> PResult<Expression> {
    Parser::new_at(source, options, pos).parse_expression_only()
}

/// Read every token up to and including end of input.
///
/// Regular expressions are recognized from the preceding token, the same
/// way a full parse would.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn tokenize(source: &str, options: Options) -> PResult<Vec<Token>> {
    Tokenizer::new(source, options).collect()
}
