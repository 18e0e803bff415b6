//! Recursive descent parser producing an ESTree syntax tree
//!
//! The parser drives a [`Lexer`] token by token. Statements live in
//! `statement`, expressions in `expression`, and the conversion of
//! expressions into binding/assignment patterns in `lval`.

mod expression;
mod lval;
mod statement;

use crate::ast::{Expression, Identifier, Program, Span, Statement};
use crate::charclass::{ReservedWords, has_line_break, skip_white_space};
use crate::error::{PResult, SyntaxError};
use crate::extension::ExprAtomExtension;
use crate::lexer::{Lexer, Position, TokenKind, TokenValue};
use crate::limits::{MAX_NESTING_DEPTH, ensure_stack};
use crate::options::{AllowReserved, Options};
use crate::scope::{PrivateNameStack, ScopeFlags, ScopeStack};

/// Start position of a node under construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStart {
    pub pos: usize,
    pub loc: Position,
}

impl NodeStart {
    /// The start of an already finished node
    pub fn of(span: &Span) -> Self {
        NodeStart {
            pos: span.start,
            loc: span.loc.as_ref().map_or_else(Position::default, |loc| loc.start),
        }
    }
}

/// Positions of constructs that are only errors if an ambiguous expression
/// turns out to be an expression (or only if it turns out to be a pattern).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DestructuringErrors {
    /// `{a = 1}` outside a pattern
    pub shorthand_assign: Option<usize>,
    /// Comma after a rest or spread element
    pub trailing_comma: Option<usize>,
    /// Parenthesized non-simple target of an assignment
    pub parenthesized_assign: Option<usize>,
    /// Parenthesized binding target
    pub parenthesized_bind: Option<usize>,
    /// Second `__proto__` property
    pub double_proto: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LabelKind {
    Loop,
    Switch,
}

#[derive(Debug, Clone)]
pub(crate) struct Label {
    pub name: Option<String>,
    pub kind: Option<LabelKind>,
    pub statement_start: usize,
}

/// Where a statement appears when it is the body of another statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatementContext {
    If,
    Label,
    /// Loop and `with` bodies, and labels nested inside them
    Nested,
}

/// Whether an expression is the head of a `for` statement. `in` is not a
/// binary operator there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InitMode {
    None,
    For,
    ForAwait,
}

impl InitMode {
    fn in_for(self) -> bool {
        self != InitMode::None
    }
}

/// ECMAScript parser state for one source text
pub struct Parser<'a> {
    pub lexer: Lexer<'a>,
    reserved: ReservedWords,
    allow_reserved_never: bool,
    scope: ScopeStack,
    private_names: PrivateNameStack,
    labels: Vec<Label>,
    potential_arrow_at: Option<usize>,
    potential_arrow_in_for_await: bool,
    yield_pos: Option<usize>,
    await_pos: Option<usize>,
    await_ident_pos: Option<usize>,
    /// Guarded entry points currently on the stack
    depth: u32,
    expr_atom_ext: Option<Box<dyn ExprAtomExtension>>,
}

impl<'a> Parser<'a> {
    /// Create a parser. No token is read until [`Parser::parse`] is called.
    pub fn new(source: &'a str, options: Options) -> Self {
        Self::new_at(source, options, 0)
    }

    /// Create a parser that starts reading at byte offset `pos`.
    pub fn new_at(source: &'a str, options: Options, pos: usize) -> Self {
        let ecma_version = options.ecma_version.resolve();
        let in_module = options.is_module();
        let allow_reserved = options.allow_reserved();
        let reserved = ReservedWords::new(
            ecma_version,
            in_module,
            allow_reserved == AllowReserved::Yes,
        );
        let mut scope = ScopeStack::new(
            in_module,
            ecma_version,
            options.allow_await_outside_function,
            options.allow_super_outside_method,
        );
        scope.enter(ScopeFlags::TOP);
        let lexer = Lexer::new_at(source, options, pos);
        let mut parser = Parser {
            reserved,
            allow_reserved_never: allow_reserved == AllowReserved::Never,
            scope,
            private_names: PrivateNameStack::default(),
            labels: Vec::new(),
            potential_arrow_at: None,
            potential_arrow_in_for_await: false,
            yield_pos: None,
            await_pos: None,
            await_ident_pos: None,
            depth: 0,
            expr_atom_ext: None,
            lexer,
        };
        let start = parser.lexer.pos;
        parser.lexer.strict = in_module || parser.strict_directive(start);
        parser
    }

    /// Install an expression atom extension.
    pub fn set_expr_atom_extension(&mut self, ext: Box<dyn ExprAtomExtension>) {
        self.expr_atom_ext = Some(ext);
    }

    /// Parse the whole input as a program.
    pub fn parse(mut self) -> PResult<Program> {
        let start = self.start_node();
        self.lexer.read_next_token()?;
        self.parse_top_level(start)
    }

    /// Parse a single expression at the current position. Input after the
    /// expression is left unread.
    pub fn parse_expression_only(mut self) -> PResult<Expression> {
        self.lexer.read_next_token()?;
        self.parse_expression(InitMode::None, None)
    }

    fn parse_top_level(&mut self, start: NodeStart) -> PResult<Program> {
        let mut body = Vec::new();
        let mut exports = rustc_hash::FxHashSet::default();
        while self.lexer.kind != TokenKind::Eof {
            body.push(self.parse_statement(None, true, Some(&mut exports))?);
        }
        if self.lexer.in_module()
            && let Some((name, pos)) = self.scope.undefined_exports().first()
        {
            return Err(self.raise_recoverable(*pos, format!("Export '{name}' is not defined")));
        }
        self.adapt_directive_prologue(&mut body);
        self.next()?;
        Ok(Program {
            span: self.finish_span(start),
            body,
            source_type: self.lexer.options().source_type,
        })
    }

    // ============ TOKENS ============

    /// Advance to the next token.
    pub fn next(&mut self) -> PResult<()> {
        self.next_token(false)
    }

    fn next_token(&mut self, ignore_escape_in_keyword: bool) -> PResult<()> {
        if !ignore_escape_in_keyword && self.lexer.contains_esc {
            if let Some(keyword) = self.lexer.kind.keyword() {
                return Err(self.raise_recoverable(
                    self.lexer.start,
                    format!("Escape sequence in keyword {keyword}"),
                ));
            }
        }
        self.lexer.next_token()
    }

    fn ecma(&self) -> u32 {
        self.lexer.ecma_version
    }

    fn strict(&self) -> bool {
        self.lexer.strict
    }

    fn kind(&self) -> TokenKind {
        self.lexer.kind
    }

    /// Text of a name token
    fn value_str(&self) -> &str {
        self.lexer.value.as_str().unwrap_or_default()
    }

    fn eat(&mut self, kind: TokenKind) -> PResult<bool> {
        if self.lexer.kind == kind {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<()> {
        if self.eat(kind)? {
            Ok(())
        } else {
            Err(self.unexpected(None))
        }
    }

    /// Is the current token the unescaped contextual keyword `name`?
    fn is_contextual(&self, name: &str) -> bool {
        self.lexer.kind == TokenKind::Name
            && !self.lexer.contains_esc
            && matches!(&self.lexer.value, TokenValue::Name(v) if v == name)
    }

    fn eat_contextual(&mut self, name: &str) -> PResult<bool> {
        if !self.is_contextual(name) {
            return Ok(false);
        }
        self.next()?;
        Ok(true)
    }

    fn expect_contextual(&mut self, name: &str) -> PResult<()> {
        if self.eat_contextual(name)? {
            Ok(())
        } else {
            Err(self.unexpected(None))
        }
    }

    fn line_break_before_current(&self) -> bool {
        has_line_break(self.lexer.slice(self.lexer.last_tok_end, self.lexer.start))
    }

    fn can_insert_semicolon(&self) -> bool {
        matches!(self.lexer.kind, TokenKind::Eof | TokenKind::BraceR)
            || self.line_break_before_current()
    }

    fn semicolon(&mut self) -> PResult<()> {
        if !self.eat(TokenKind::Semi)? && !self.can_insert_semicolon() {
            return Err(self.unexpected(None));
        }
        Ok(())
    }

    /// Consume `close` if it follows a trailing comma.
    fn after_trailing_comma(&mut self, close: TokenKind, not_next: bool) -> PResult<bool> {
        if self.lexer.kind != close {
            return Ok(false);
        }
        if !not_next {
            self.next()?;
        }
        Ok(true)
    }

    /// Offset of the first significant character after the current token
    fn lookahead_pos(&self) -> usize {
        skip_white_space(self.lexer.input, self.lexer.pos)
    }

    /// Run one level of a recursive production, failing once nesting
    /// exceeds [`MAX_NESTING_DEPTH`].
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.raise(self.lexer.start, "Maximum nesting depth exceeded"));
        }
        self.depth += 1;
        let result = ensure_stack(|| f(self));
        self.depth -= 1;
        result
    }

    // ============ NODES ============

    /// Record the start of a node at the current token.
    pub fn start_node(&self) -> NodeStart {
        NodeStart {
            pos: self.lexer.start,
            loc: self.lexer.start_loc,
        }
    }

    /// Span from `start` to the end of the previous token.
    pub fn finish_span(&self, start: NodeStart) -> Span {
        self.finish_span_at(start, self.lexer.last_tok_end, self.lexer.last_tok_end_loc)
    }

    fn finish_span_at(&self, start: NodeStart, end: usize, end_loc: Position) -> Span {
        Span {
            start: start.pos,
            end,
            loc: self.lexer.source_location(start.loc, end_loc).map(Box::new),
            range: self.lexer.range(start.pos, end),
        }
    }

    // ============ ERRORS ============

    pub fn raise(&self, pos: usize, message: impl Into<String>) -> SyntaxError {
        self.lexer.raise(pos, message)
    }

    pub fn raise_recoverable(&self, pos: usize, message: impl Into<String>) -> SyntaxError {
        self.lexer.raise_recoverable(pos, message)
    }

    pub fn unexpected(&self, pos: Option<usize>) -> SyntaxError {
        self.lexer.unexpected(pos)
    }

    fn check_pattern_errors(
        &self,
        errors: Option<&DestructuringErrors>,
        is_assign: bool,
    ) -> PResult<()> {
        let Some(errors) = errors else {
            return Ok(());
        };
        if let Some(pos) = errors.trailing_comma {
            return Err(
                self.raise_recoverable(pos, "Comma is not permitted after the rest element")
            );
        }
        let parens = if is_assign {
            errors.parenthesized_assign
        } else {
            errors.parenthesized_bind
        };
        if let Some(pos) = parens {
            let message = if is_assign {
                "Assigning to rvalue"
            } else {
                "Parenthesized pattern"
            };
            return Err(self.raise_recoverable(pos, message));
        }
        Ok(())
    }

    /// Does `errors` hold a pending expression-only error?
    fn has_expression_errors(errors: Option<&DestructuringErrors>) -> bool {
        errors.is_some_and(|e| e.shorthand_assign.is_some() || e.double_proto.is_some())
    }

    fn check_expression_errors(&self, errors: Option<&DestructuringErrors>) -> PResult<()> {
        let Some(errors) = errors else {
            return Ok(());
        };
        if let Some(pos) = errors.shorthand_assign {
            return Err(self.raise(
                pos,
                "Shorthand property assignments are valid only in destructuring patterns",
            ));
        }
        if let Some(pos) = errors.double_proto {
            return Err(self.raise_recoverable(pos, "Redefinition of __proto__ property"));
        }
        Ok(())
    }

    fn check_yield_await_in_default_params(&self) -> PResult<()> {
        if let Some(yield_pos) = self.yield_pos
            && self.await_pos.is_none_or(|await_pos| yield_pos < await_pos)
        {
            return Err(self.raise(yield_pos, "Yield expression cannot be a default value"));
        }
        if let Some(await_pos) = self.await_pos {
            return Err(self.raise(await_pos, "Await expression cannot be a default value"));
        }
        Ok(())
    }

    // ============ SCOPES ============

    fn enter_scope(&mut self, flags: ScopeFlags) {
        tracing::trace!(?flags, depth = self.scope.depth(), "enter scope");
        self.scope.enter(flags);
    }

    fn exit_scope(&mut self) {
        self.scope.exit();
        tracing::trace!(depth = self.scope.depth(), "exit scope");
    }

    // ============ IDENTIFIERS ============

    /// Parse an identifier. `liberal` accepts keywords and skips the
    /// reserved-word checks (property names, meta properties).
    fn parse_ident(&mut self, liberal: bool) -> PResult<Identifier> {
        let start = self.start_node();
        let name = match self.lexer.kind {
            TokenKind::Name => self.value_str().to_string(),
            kind => {
                let Some(keyword) = kind.keyword() else {
                    return Err(self.unexpected(None));
                };
                // `class` and `function` pushed a context that no body will pop
                if matches!(kind, TokenKind::Class | TokenKind::Function)
                    && (self.lexer.last_tok_end != self.lexer.last_tok_start + 1
                        || self.lexer.byte_at(self.lexer.last_tok_start) != b'.')
                {
                    self.lexer.pop_context();
                }
                self.lexer.kind = TokenKind::Name;
                keyword.to_string()
            }
        };
        self.next_token(liberal)?;
        let id = Identifier {
            span: self.finish_span(start),
            name,
        };
        if !liberal {
            self.check_unreserved(&id)?;
            if id.name == "await" && self.await_ident_pos.is_none() {
                self.await_ident_pos = Some(id.span.start);
            }
        }
        Ok(id)
    }

    fn check_unreserved(&self, id: &Identifier) -> PResult<()> {
        let Identifier { span, name } = id;
        let start = span.start;
        if self.scope.in_generator() && name == "yield" {
            return Err(self.raise_recoverable(
                start,
                "Cannot use 'yield' as identifier inside a generator",
            ));
        }
        if self.scope.in_async() && name == "await" {
            return Err(self.raise_recoverable(
                start,
                "Cannot use 'await' as identifier inside an async function",
            ));
        }
        if !self.scope.current_this_scope().intersects(ScopeFlags::VAR) && name == "arguments" {
            return Err(self.raise_recoverable(
                start,
                "Cannot use 'arguments' in class field initializer",
            ));
        }
        if self.scope.in_class_static_block() && (name == "arguments" || name == "await") {
            return Err(self.raise(
                start,
                format!("Cannot use {name} in class static initialization block"),
            ));
        }
        if crate::charclass::is_keyword(name, self.ecma(), self.lexer.in_module()) {
            return Err(self.raise(start, format!("Unexpected keyword '{name}'")));
        }
        if self.ecma() < 6 && self.lexer.slice(span.start, span.end).contains('\\') {
            return Ok(());
        }
        let reserved = if self.strict() {
            self.reserved.is_reserved_strict(name)
        } else {
            self.reserved.is_reserved(name)
        };
        if reserved {
            if !self.scope.in_async() && name == "await" {
                return Err(self.raise_recoverable(
                    start,
                    "Cannot use keyword 'await' outside an async function",
                ));
            }
            return Err(self.raise_recoverable(start, format!("The keyword '{name}' is reserved")));
        }
        Ok(())
    }

    // ============ DIRECTIVES ============

    /// Does a `"use strict"` directive start at `start`?
    fn strict_directive(&self, mut start: usize) -> bool {
        if self.ecma() < 5 {
            return false;
        }
        let input = self.lexer.input;
        loop {
            start = skip_white_space(input, start);
            let Some((content, len)) = directive_literal(input.get(start..).unwrap_or_default())
            else {
                return false;
            };
            if content == "use strict" {
                let after = start + len;
                let end = skip_white_space(input, after);
                let space = input.get(after..end).unwrap_or_default();
                let mut rest = input.get(end..).unwrap_or_default().chars();
                return match rest.next() {
                    None | Some(';' | '}') => true,
                    Some(next) => {
                        has_line_break(space)
                            && !("(`.[+-/*%<>=,?^&".contains(next)
                                || (next == '!' && rest.next() == Some('=')))
                    }
                };
            }
            start = skip_white_space(input, start + len);
            if input.as_bytes().get(start) == Some(&b';') {
                start += 1;
            }
        }
    }

    /// Mark the leading string-literal statements of a body as directives.
    fn adapt_directive_prologue(&self, statements: &mut [Statement]) {
        if self.ecma() < 5 {
            return;
        }
        for statement in statements {
            let Statement::Expression(stmt) = statement else {
                break;
            };
            let Expression::Literal(lit) = &stmt.expression else {
                break;
            };
            let quoted = matches!(self.lexer.byte_at(stmt.span.start), b'"' | b'\'');
            if !quoted || !matches!(lit.value, crate::ast::LiteralValue::String(_)) {
                break;
            }
            let raw = lit.raw.as_str();
            let unquoted = raw.get(1..raw.len().saturating_sub(1)).unwrap_or_default();
            stmt.directive = Some(unquoted.to_string());
        }
    }
}

/// Match a string literal at the start of `text`, returning its unescaped-as-
/// written content and total length.
fn directive_literal(text: &str) -> Option<(&str, usize)> {
    let mut chars = text.char_indices();
    let (_, quote) = chars.next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let mut escaped = false;
    for (idx, ch) in chars {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == quote {
            return Some((text.get(1..idx)?, idx + 1));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        Parser::new(source, Options::default()).parse().unwrap()
    }

    #[test]
    fn test_strict_directive_detection() {
        let parser = Parser::new("'use strict'; x", Options::default());
        assert!(parser.lexer.strict);
        let parser = Parser::new("'a'; \"use strict\"\n x", Options::default());
        assert!(parser.lexer.strict);
        let parser = Parser::new("'use strict'\n + 1", Options::default());
        assert!(!parser.lexer.strict);
        let parser = Parser::new("x; 'use strict'", Options::default());
        assert!(!parser.lexer.strict);
    }

    #[test]
    fn test_directive_prologue() {
        let program = parse("'use strict'; \"other\"; ('paren'); 'late'");
        let directives: Vec<_> = program
            .body
            .iter()
            .map(|s| match s {
                Statement::Expression(e) => e.directive.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(
            directives,
            vec![Some("use strict".to_string()), Some("other".to_string()), None, None]
        );
    }

    #[test]
    fn test_program_span_covers_input() {
        let program = parse("  a;\n  b  ");
        assert_eq!(program.span.start, 0);
        assert_eq!(program.span.end, 10);
    }

    #[test]
    fn test_escaped_keyword_is_rejected() {
        let err = Parser::new("\\u0076ar x", Options::default()).parse().unwrap_err();
        assert_eq!(err.message, "Escape sequence in keyword var");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_directive_literal() {
        assert_eq!(directive_literal("'a\\'b' x"), Some(("a\\'b", 6)));
        assert_eq!(directive_literal("x"), None);
        assert_eq!(directive_literal("'open"), None);
    }
}
