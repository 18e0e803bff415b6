//! Extension points for custom syntax
//!
//! Two hooks let callers add syntax without forking the grammar:
//!
//! - [`TokenReaderExtension`] is consulted before the built-in lexer for
//!   every token and may also take over the context update for the tokens
//!   it produces.
//! - [`ExprAtomExtension`] is consulted before the built-in expression atom
//!   rules and may return an [`Expression::Extension`] node.
//!
//! ```
//! use ecmaparse::ast::{Expression, ExtensionNode, Statement};
//! use ecmaparse::extension::ExprAtomExtension;
//! use ecmaparse::lexer::TokenKind;
//! use ecmaparse::{Options, PResult, Parser};
//!
//! /// Parses a lone `?` in operand position as a "topic" reference.
//! struct Topic;
//!
//! impl ExprAtomExtension for Topic {
//!     fn parse_expr_atom(&mut self, parser: &mut Parser<'_>) -> Option<PResult<Expression>> {
//!         if parser.lexer.kind != TokenKind::Question {
//!             return None;
//!         }
//!         let start = parser.start_node();
//!         Some(parser.next().map(|()| {
//!             Expression::Extension(Box::new(ExtensionNode {
//!                 kind: "TopicReference".to_string(),
//!                 span: parser.finish_span(start),
//!                 fields: Default::default(),
//!             }))
//!         }))
//!     }
//! }
//!
//! let mut parser = Parser::new("f(?)", Options::default());
//! parser.set_expr_atom_extension(Box::new(Topic));
//! let program = parser.parse().unwrap();
//! let Statement::Expression(stmt) = &program.body[0] else { panic!() };
//! let Expression::Call(call) = &stmt.expression else { panic!() };
//! assert_eq!(call.arguments[0].type_name(), "TopicReference");
//! ```

use crate::ast::Expression;
use crate::error::PResult;
use crate::lexer::{Lexer, TokenKind, TokenValue};
use crate::parser::Parser;

/// Custom token reading.
pub trait TokenReaderExtension {
    /// Read a token at `lexer.pos` (whitespace already skipped).
    ///
    /// Return `None` to fall back to the built-in rules. On `Some(Ok(..))`
    /// the reader must have advanced `lexer.pos` past the token; the lexer
    /// records the end position and runs the context update.
    fn read_token(&mut self, lexer: &mut Lexer<'_>) -> Option<PResult<(TokenKind, TokenValue)>>;

    /// Update the context stack after `lexer.kind` was read. Return `true`
    /// if handled, `false` to run the built-in rules.
    fn update_context(&mut self, lexer: &mut Lexer<'_>, prev: TokenKind) -> bool {
        let _ = (lexer, prev);
        false
    }
}

/// Custom expression atoms.
pub trait ExprAtomExtension {
    /// Parse an atom at the current token, or return `None` to fall back to
    /// the built-in rules.
    fn parse_expr_atom(&mut self, parser: &mut Parser<'_>) -> Option<PResult<Expression>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExtensionNode, Statement};
    use crate::options::Options;

    /// `%%name%%` placeholders, as used by code templating tools
    struct Placeholders;

    const PLACEHOLDER: TokenKind = TokenKind::Custom(1);

    impl TokenReaderExtension for Placeholders {
        fn read_token(
            &mut self,
            lexer: &mut Lexer<'_>,
        ) -> Option<PResult<(TokenKind, TokenValue)>> {
            let rest = lexer.input().get(lexer.pos..)?;
            let body = rest.strip_prefix("%%")?;
            let Some(close) = body.find("%%") else {
                return Some(Err(lexer.raise(lexer.pos, "Unterminated placeholder")));
            };
            let name = body.get(..close).unwrap_or_default().to_string();
            lexer.pos += close + 4;
            Some(Ok((PLACEHOLDER, TokenValue::Name(name))))
        }

        fn update_context(&mut self, lexer: &mut Lexer<'_>, _prev: TokenKind) -> bool {
            if lexer.kind == PLACEHOLDER {
                lexer.expr_allowed = false;
                return true;
            }
            false
        }
    }

    struct PlaceholderAtoms;

    impl ExprAtomExtension for PlaceholderAtoms {
        fn parse_expr_atom(&mut self, parser: &mut Parser<'_>) -> Option<PResult<Expression>> {
            if parser.lexer.kind != PLACEHOLDER {
                return None;
            }
            let start = parser.start_node();
            let name = parser.lexer.value.as_str().unwrap_or_default().to_string();
            if let Err(err) = parser.next() {
                return Some(Err(err));
            }
            let mut fields = serde_json::Map::new();
            fields.insert("name".to_string(), serde_json::Value::String(name));
            Some(Ok(Expression::Extension(Box::new(ExtensionNode {
                kind: "Placeholder".to_string(),
                span: parser.finish_span(start),
                fields,
            }))))
        }
    }

    fn parse_with_placeholders(source: &str) -> PResult<crate::ast::Program> {
        let mut parser = Parser::new(source, Options::default());
        parser.lexer.set_reader(Box::new(Placeholders));
        parser.set_expr_atom_extension(Box::new(PlaceholderAtoms));
        parser.parse()
    }

    #[test]
    fn test_placeholder_expression() {
        let program = parse_with_placeholders("x = %%value%% + 1").unwrap();
        let json = serde_json::to_value(&program).unwrap();
        let left = &json["body"][0]["expression"]["right"]["left"];
        assert_eq!(left["type"], "Placeholder");
        assert_eq!(left["name"], "value");
        assert_eq!(left["start"], 4);
        assert_eq!(left["end"], 13);
    }

    #[test]
    fn test_placeholder_followed_by_divide() {
        // the context hook marks the placeholder as an operand
        let program = parse_with_placeholders("%%a%% / 2 / 1").unwrap();
        assert!(matches!(program.body[0], Statement::Expression(_)));
    }

    #[test]
    fn test_unterminated_placeholder() {
        let err = parse_with_placeholders("x = %%oops").unwrap_err();
        assert_eq!(err.message, "Unterminated placeholder");
        assert_eq!(err.pos, 4);
    }

    #[test]
    fn test_without_extensions_placeholders_are_errors() {
        assert!(crate::parse("x = %%a%%", Options::default()).is_err());
    }
}
