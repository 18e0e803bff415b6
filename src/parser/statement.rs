//! Statements, declarations, classes and modules

use bitflags::bitflags;
use rustc_hash::FxHashSet;

use super::{
    DestructuringErrors, InitMode, Label, LabelKind, NodeStart, Parser, StatementContext,
};
use crate::ast::{
    BlockStatement, BreakStatement, CatchClause, Class, ClassBody, ClassDeclaration, ClassElement,
    ContinueStatement, DebuggerStatement, DoWhileStatement, EmptyStatement,
    ExportAllDeclaration, ExportDefaultDeclaration, ExportDefaultKind, ExportNamedDeclaration,
    ExportSpecifier, Expression, ExpressionStatement, ForInLeft, ForInStatement, ForInit,
    ForOfStatement, ForStatement, Function, FunctionDeclaration, Identifier, IfStatement,
    ImportAttribute, ImportDeclaration, ImportDeclarationSpecifier, ImportDefaultSpecifier,
    ImportNamespaceSpecifier, ImportSpecifier, LabeledStatement, Literal, LiteralValue,
    MethodDefinition, MethodKind, ModuleExportName, ObjectPatternMember, Pattern,
    PropertyDefinition, PropertyKind, ReturnStatement, Statement, StaticBlock, SwitchCase,
    SwitchStatement, ThrowStatement, TryStatement, VariableDeclaration, VariableDeclarator,
    VariableKind, WhileStatement, WithStatement,
};
use crate::charclass::{has_line_break, is_identifier_char, is_identifier_start, skip_white_space};
use crate::error::PResult;
use crate::lexer::TokenKind;
use crate::scope::{BindingKind, PrivateNameKind, ScopeFlags};

bitflags! {
    /// How a function is being parsed
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct FunctionContext: u8 {
        /// A declaration rather than an expression
        const STATEMENT = 1;
        /// Body of `if`/label, where the name is not bound
        const HANGING = 1 << 1;
        /// `export default function () {}`
        const NULLABLE_ID = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClassContext {
    Statement,
    /// `export default class {}`
    NullableStatement,
    Expression,
}

impl Label {
    fn anonymous(kind: LabelKind) -> Self {
        Label {
            name: None,
            kind: Some(kind),
            statement_start: usize::MAX,
        }
    }
}

/// Class member name and modifiers, before its value is parsed
struct ElementHead {
    start: NodeStart,
    is_static: bool,
    computed: bool,
    key: Expression,
}

impl ElementHead {
    fn key_is(&self, name: &str) -> bool {
        !self.computed
            && match &self.key {
                Expression::Identifier(id) => id.name == name,
                Expression::Literal(lit) => {
                    matches!(&lit.value, LiteralValue::String(s) if s == name)
                }
                _ => false,
            }
    }
}

impl<'a> Parser<'a> {
    /// Parse one statement. `context` is set when the statement is the body
    /// of another statement; `exports` collects exported names at the top
    /// level of a module.
    pub(super) fn parse_statement(
        &mut self,
        context: Option<StatementContext>,
        top_level: bool,
        exports: Option<&mut FxHashSet<String>>,
    ) -> PResult<Statement> {
        self.nested(|p| p.parse_statement_level(context, top_level, exports))
    }

    fn parse_statement_level(
        &mut self,
        context: Option<StatementContext>,
        top_level: bool,
        exports: Option<&mut FxHashSet<String>>,
    ) -> PResult<Statement> {
        let start = self.start_node();
        let mut kind = self.kind();
        let is_let = self.is_let(context);
        if is_let {
            kind = TokenKind::Var;
        }
        match kind {
            TokenKind::Break | TokenKind::Continue => {
                self.parse_break_continue(start, kind == TokenKind::Break)
            }
            TokenKind::Debugger => {
                self.next()?;
                self.semicolon()?;
                Ok(Statement::Debugger(DebuggerStatement {
                    span: self.finish_span(start),
                }))
            }
            TokenKind::Do => self.parse_do_statement(start),
            TokenKind::For => self.parse_for_statement(start),
            TokenKind::Function => {
                if let Some(context) = context
                    && (self.strict() || context == StatementContext::Nested)
                    && self.ecma() >= 6
                {
                    return Err(self.unexpected(None));
                }
                self.parse_function_statement(start, false, context.is_none())
            }
            TokenKind::Class => {
                if context.is_some() {
                    return Err(self.unexpected(None));
                }
                let class = self.parse_class(ClassContext::Statement)?;
                Ok(Statement::ClassDeclaration(Box::new(ClassDeclaration { class })))
            }
            TokenKind::If => self.parse_if_statement(start),
            TokenKind::Return => self.parse_return_statement(start),
            TokenKind::Switch => self.parse_switch_statement(start),
            TokenKind::Throw => self.parse_throw_statement(start),
            TokenKind::Try => self.parse_try_statement(start),
            TokenKind::Const | TokenKind::Var => {
                let var_kind = match (is_let, kind == TokenKind::Const) {
                    (true, _) => VariableKind::Let,
                    (false, true) => VariableKind::Const,
                    (false, false) => VariableKind::Var,
                };
                if context.is_some() && var_kind != VariableKind::Var {
                    return Err(self.unexpected(None));
                }
                self.next()?;
                let declarations = self.parse_var(false, var_kind)?;
                self.semicolon()?;
                Ok(Statement::VariableDeclaration(VariableDeclaration {
                    span: self.finish_span(start),
                    declarations,
                    kind: var_kind,
                }))
            }
            TokenKind::While => self.parse_while_statement(start),
            TokenKind::With => self.parse_with_statement(start),
            TokenKind::BraceL => Ok(Statement::Block(self.parse_block(true, false)?)),
            TokenKind::Semi => {
                self.next()?;
                Ok(Statement::Empty(EmptyStatement {
                    span: self.finish_span(start),
                }))
            }
            TokenKind::Export | TokenKind::Import => {
                if self.ecma() > 10 && kind == TokenKind::Import {
                    let next = self.lookahead_pos();
                    if matches!(self.lexer.char_at(next), Some('(' | '.')) {
                        let expr = self.parse_expression(InitMode::None, None)?;
                        return self.parse_expression_statement(start, expr);
                    }
                }
                if !self.lexer.options().allow_import_export_everywhere {
                    if !top_level {
                        return Err(self.raise(
                            self.lexer.start,
                            "'import' and 'export' may only appear at the top level",
                        ));
                    }
                    if !self.lexer.in_module() {
                        return Err(self.raise(
                            self.lexer.start,
                            "'import' and 'export' may appear only with 'sourceType: module'",
                        ));
                    }
                }
                if kind == TokenKind::Import {
                    self.parse_import(start)
                } else {
                    self.parse_export(start, exports)
                }
            }
            _ => self.parse_other_statement(start, context),
        }
    }

    /// Async functions, `using` declarations, labels and expression
    /// statements
    fn parse_other_statement(
        &mut self,
        start: NodeStart,
        context: Option<StatementContext>,
    ) -> PResult<Statement> {
        if self.is_async_function() {
            if context.is_some() {
                return Err(self.unexpected(None));
            }
            self.next()?;
            return self.parse_function_statement(start, true, true);
        }

        let using = if self.is_using_keyword(true, false) {
            Some(VariableKind::AwaitUsing)
        } else if self.is_using_keyword(false, false) {
            Some(VariableKind::Using)
        } else {
            None
        };
        if let Some(kind) = using {
            if !self.scope.allow_using() {
                return Err(self.raise(
                    self.lexer.start,
                    "Using declaration cannot appear in the top level when source type is `script` \
                     or in the bare case statement",
                ));
            }
            if kind == VariableKind::AwaitUsing {
                if !self.scope.can_await() {
                    return Err(self.raise(
                        self.lexer.start,
                        "Await using cannot appear outside of async function",
                    ));
                }
                self.next()?;
            }
            self.next()?;
            let declarations = self.parse_var(false, kind)?;
            self.semicolon()?;
            return Ok(Statement::VariableDeclaration(VariableDeclaration {
                span: self.finish_span(start),
                declarations,
                kind,
            }));
        }

        let starts_with_name = self.kind() == TokenKind::Name;
        let expr = self.parse_expression(InitMode::None, None)?;
        if let Expression::Identifier(label) = expr {
            if starts_with_name && self.eat(TokenKind::Colon)? {
                return self.parse_labeled_statement(start, label, context);
            }
            return self.parse_expression_statement(start, Expression::Identifier(label));
        }
        self.parse_expression_statement(start, expr)
    }

    fn parse_expression_statement(
        &mut self,
        start: NodeStart,
        expression: Expression,
    ) -> PResult<Statement> {
        self.semicolon()?;
        Ok(Statement::Expression(ExpressionStatement {
            span: self.finish_span(start),
            expression,
            directive: None,
        }))
    }

    // ============ LOOKAHEAD ============

    /// End of the identifier characters starting at `pos`
    fn identifier_end(&self, pos: usize) -> usize {
        let rest = self.lexer.input.get(pos..).unwrap_or_default();
        let len = rest
            .char_indices()
            .find(|&(_, ch)| !is_identifier_char(ch, true))
            .map_or(rest.len(), |(idx, _)| idx);
        pos + len
    }

    /// Does `let` start a lexical declaration here?
    fn is_let(&self, context: Option<StatementContext>) -> bool {
        if self.ecma() < 6 || !self.is_contextual("let") {
            return false;
        }
        let next = self.lookahead_pos();
        let Some(ch) = self.lexer.char_at(next) else {
            return false;
        };
        if ch == '[' || ch == '\\' {
            return true;
        }
        if context.is_some() {
            return false;
        }
        if ch == '{' {
            return true;
        }
        if is_identifier_start(ch, true) {
            let end = self.identifier_end(next);
            if self.lexer.char_at(end) == Some('\\') {
                return true;
            }
            let word = self.lexer.input.get(next..end).unwrap_or_default();
            return word != "in" && word != "instanceof";
        }
        false
    }

    /// `async function` with no line break in between
    fn is_async_function(&self) -> bool {
        if self.ecma() < 8 || !self.is_contextual("async") {
            return false;
        }
        let input = self.lexer.input;
        let next = self.lookahead_pos();
        if has_line_break(input.get(self.lexer.pos..next).unwrap_or_default()) {
            return false;
        }
        input.get(next..).is_some_and(|rest| rest.starts_with("function"))
            && !self
                .lexer
                .char_at(next + 8)
                .is_some_and(|ch| is_identifier_char(ch, true))
    }

    /// `using x` or `await using x` starting a declaration
    fn is_using_keyword(&self, is_await: bool, is_for: bool) -> bool {
        let keyword = if is_await { "await" } else { "using" };
        if self.ecma() < 17 || !self.is_contextual(keyword) {
            return false;
        }
        let input = self.lexer.input;
        let mut next = self.lookahead_pos();
        if has_line_break(input.get(self.lexer.pos..next).unwrap_or_default()) {
            return false;
        }
        if is_await {
            let end = next + 5;
            if input.get(next..end) != Some("using")
                || self.lexer.char_at(end).is_none_or(|ch| is_identifier_char(ch, true))
            {
                return false;
            }
            let after = skip_white_space(input, end);
            if has_line_break(input.get(end..after).unwrap_or_default()) {
                return false;
            }
            next = after;
        }
        let Some(ch) = self.lexer.char_at(next) else {
            return false;
        };
        if ch == '\\' {
            return true;
        }
        if !is_identifier_start(ch, true) {
            return false;
        }
        let end = self.identifier_end(next);
        if self.lexer.char_at(end) == Some('\\') {
            return true;
        }
        let word = input.get(next..end).unwrap_or_default();
        !(word == "in" || word == "instanceof" || (is_for && word == "of"))
    }

    // ============ CONTROL FLOW ============

    fn parse_break_continue(&mut self, start: NodeStart, is_break: bool) -> PResult<Statement> {
        self.next()?;
        let label = if self.eat(TokenKind::Semi)? || self.can_insert_semicolon() {
            None
        } else if self.kind() != TokenKind::Name {
            return Err(self.unexpected(None));
        } else {
            let label = self.parse_ident(false)?;
            self.semicolon()?;
            Some(label)
        };
        let target = label.as_ref().map(|l| l.name.as_str());
        let found = self.labels.iter().any(|lab| {
            (target.is_none() || lab.name.as_deref() == target)
                && ((lab.kind.is_some() && (is_break || lab.kind == Some(LabelKind::Loop)))
                    || (target.is_some() && is_break))
        });
        let keyword = if is_break { "break" } else { "continue" };
        if !found {
            return Err(self.raise(start.pos, format!("Unsyntactic {keyword}")));
        }
        let span = self.finish_span(start);
        Ok(if is_break {
            Statement::Break(BreakStatement { span, label })
        } else {
            Statement::Continue(ContinueStatement { span, label })
        })
    }

    fn parse_paren_expression(&mut self) -> PResult<Expression> {
        self.expect(TokenKind::ParenL)?;
        let expr = self.parse_expression(InitMode::None, None)?;
        self.expect(TokenKind::ParenR)?;
        Ok(expr)
    }

    /// Body of a loop, with an anonymous loop label in effect
    fn parse_loop_body(&mut self) -> PResult<Box<Statement>> {
        self.labels.push(Label::anonymous(LabelKind::Loop));
        let body = self.parse_statement(Some(StatementContext::Nested), false, None);
        self.labels.pop();
        Ok(Box::new(body?))
    }

    fn parse_do_statement(&mut self, start: NodeStart) -> PResult<Statement> {
        self.next()?;
        let body = self.parse_loop_body()?;
        self.expect(TokenKind::While)?;
        let test = self.parse_paren_expression()?;
        if self.ecma() >= 6 {
            self.eat(TokenKind::Semi)?;
        } else {
            self.semicolon()?;
        }
        Ok(Statement::DoWhile(DoWhileStatement {
            span: self.finish_span(start),
            body,
            test,
        }))
    }

    fn parse_while_statement(&mut self, start: NodeStart) -> PResult<Statement> {
        self.next()?;
        let test = self.parse_paren_expression()?;
        let body = self.parse_loop_body()?;
        Ok(Statement::While(WhileStatement {
            span: self.finish_span(start),
            test,
            body,
        }))
    }

    fn parse_with_statement(&mut self, start: NodeStart) -> PResult<Statement> {
        if self.strict() {
            return Err(self.raise(self.lexer.start, "'with' in strict mode"));
        }
        self.next()?;
        let object = self.parse_paren_expression()?;
        let body = self.parse_statement(Some(StatementContext::Nested), false, None)?;
        Ok(Statement::With(WithStatement {
            span: self.finish_span(start),
            object,
            body: Box::new(body),
        }))
    }

    fn parse_if_statement(&mut self, start: NodeStart) -> PResult<Statement> {
        self.next()?;
        let test = self.parse_paren_expression()?;
        let consequent = self.parse_statement(Some(StatementContext::If), false, None)?;
        let alternate = if self.eat(TokenKind::Else)? {
            Some(Box::new(self.parse_statement(Some(StatementContext::If), false, None)?))
        } else {
            None
        };
        Ok(Statement::If(IfStatement {
            span: self.finish_span(start),
            test,
            consequent: Box::new(consequent),
            alternate,
        }))
    }

    fn parse_return_statement(&mut self, start: NodeStart) -> PResult<Statement> {
        if !self.scope.in_function() && !self.lexer.options().allow_return_outside_function {
            return Err(self.raise(self.lexer.start, "'return' outside of function"));
        }
        self.next()?;
        let argument = if self.eat(TokenKind::Semi)? || self.can_insert_semicolon() {
            None
        } else {
            let argument = self.parse_expression(InitMode::None, None)?;
            self.semicolon()?;
            Some(argument)
        };
        Ok(Statement::Return(ReturnStatement {
            span: self.finish_span(start),
            argument,
        }))
    }

    fn parse_switch_statement(&mut self, start: NodeStart) -> PResult<Statement> {
        self.next()?;
        let discriminant = self.parse_paren_expression()?;
        self.expect(TokenKind::BraceL)?;
        self.labels.push(Label::anonymous(LabelKind::Switch));
        self.enter_scope(ScopeFlags::SWITCH);
        let mut cases = Vec::new();
        let mut current: Option<(NodeStart, Option<Expression>, Vec<Statement>)> = None;
        let mut saw_default = false;
        while self.kind() != TokenKind::BraceR {
            let kind = self.kind();
            if matches!(kind, TokenKind::Case | TokenKind::Default) {
                if let Some((case_start, test, consequent)) = current.take() {
                    cases.push(SwitchCase {
                        span: self.finish_span(case_start),
                        test,
                        consequent,
                    });
                }
                let case_start = self.start_node();
                self.next()?;
                let test = if kind == TokenKind::Case {
                    Some(self.parse_expression(InitMode::None, None)?)
                } else {
                    if saw_default {
                        return Err(self.raise_recoverable(
                            self.lexer.last_tok_start,
                            "Multiple default clauses",
                        ));
                    }
                    saw_default = true;
                    None
                };
                self.expect(TokenKind::Colon)?;
                current = Some((case_start, test, Vec::new()));
            } else {
                let statement = match current {
                    Some(_) => self.parse_statement(None, false, None)?,
                    None => return Err(self.unexpected(None)),
                };
                if let Some((_, _, consequent)) = current.as_mut() {
                    consequent.push(statement);
                }
            }
        }
        self.exit_scope();
        if let Some((case_start, test, consequent)) = current {
            cases.push(SwitchCase {
                span: self.finish_span(case_start),
                test,
                consequent,
            });
        }
        self.next()?;
        self.labels.pop();
        Ok(Statement::Switch(SwitchStatement {
            span: self.finish_span(start),
            discriminant,
            cases,
        }))
    }

    fn parse_throw_statement(&mut self, start: NodeStart) -> PResult<Statement> {
        self.next()?;
        let gap = self
            .lexer
            .input
            .get(self.lexer.last_tok_end..self.lexer.start)
            .unwrap_or_default();
        if has_line_break(gap) {
            return Err(self.raise(self.lexer.last_tok_end, "Illegal newline after throw"));
        }
        let argument = self.parse_expression(InitMode::None, None)?;
        self.semicolon()?;
        Ok(Statement::Throw(ThrowStatement {
            span: self.finish_span(start),
            argument,
        }))
    }

    fn parse_try_statement(&mut self, start: NodeStart) -> PResult<Statement> {
        self.next()?;
        let block = self.parse_block(true, false)?;
        let mut handler = None;
        if self.kind() == TokenKind::Catch {
            let clause_start = self.start_node();
            self.next()?;
            let param = if self.eat(TokenKind::ParenL)? {
                let param = self.parse_binding_atom()?;
                let simple = matches!(param, Pattern::Identifier(_));
                if simple {
                    self.enter_scope(ScopeFlags::SIMPLE_CATCH);
                    self.check_lval_pattern(&param, BindingKind::SimpleCatch, None)?;
                } else {
                    self.enter_scope(ScopeFlags::empty());
                    self.check_lval_pattern(&param, BindingKind::Lexical, None)?;
                }
                self.expect(TokenKind::ParenR)?;
                Some(param)
            } else {
                if self.ecma() < 10 {
                    return Err(self.unexpected(None));
                }
                self.enter_scope(ScopeFlags::empty());
                None
            };
            let body = self.parse_block(false, false)?;
            self.exit_scope();
            handler = Some(CatchClause {
                span: self.finish_span(clause_start),
                param,
                body,
            });
        }
        let finalizer = if self.eat(TokenKind::Finally)? {
            Some(self.parse_block(true, false)?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.raise(start.pos, "Missing catch or finally clause"));
        }
        Ok(Statement::Try(Box::new(TryStatement {
            span: self.finish_span(start),
            block,
            handler,
            finalizer,
        })))
    }

    fn parse_labeled_statement(
        &mut self,
        start: NodeStart,
        label: Identifier,
        context: Option<StatementContext>,
    ) -> PResult<Statement> {
        let name = label.name.clone();
        if self.labels.iter().any(|l| l.name.as_deref() == Some(name.as_str())) {
            return Err(self.raise(
                label.span.start,
                format!("Label '{name}' is already declared"),
            ));
        }
        let kind = if self.kind().is_loop() {
            Some(LabelKind::Loop)
        } else if self.kind() == TokenKind::Switch {
            Some(LabelKind::Switch)
        } else {
            None
        };
        let statement_start = self.lexer.start;
        // labels directly enclosing this one apply to the same statement
        for outer in self.labels.iter_mut().rev() {
            if outer.statement_start != start.pos {
                break;
            }
            outer.statement_start = statement_start;
            outer.kind = kind;
        }
        self.labels.push(Label {
            name: Some(name),
            kind,
            statement_start,
        });
        let body_context = match context {
            None | Some(StatementContext::Label) => StatementContext::Label,
            Some(_) => StatementContext::Nested,
        };
        let body = self.parse_statement(Some(body_context), false, None);
        self.labels.pop();
        Ok(Statement::Labeled(LabeledStatement {
            span: self.finish_span(start),
            label,
            body: Box::new(body?),
        }))
    }

    /// `{ ... }`. With `exit_strict` the strict mode entered by the
    /// enclosing function's directive ends before the next token is read.
    pub(super) fn parse_block(
        &mut self,
        create_scope: bool,
        exit_strict: bool,
    ) -> PResult<BlockStatement> {
        let start = self.start_node();
        self.expect(TokenKind::BraceL)?;
        if create_scope {
            self.enter_scope(ScopeFlags::empty());
        }
        let mut body = Vec::new();
        while self.kind() != TokenKind::BraceR {
            body.push(self.parse_statement(None, false, None)?);
        }
        if exit_strict {
            self.lexer.strict = false;
        }
        self.next()?;
        if create_scope {
            self.exit_scope();
        }
        Ok(BlockStatement {
            span: self.finish_span(start),
            body,
        })
    }

    // ============ FOR ============

    fn parse_for_statement(&mut self, start: NodeStart) -> PResult<Statement> {
        self.next()?;
        let await_at = if self.ecma() >= 9
            && self.scope.can_await()
            && self.eat_contextual("await")?
        {
            Some(self.lexer.last_tok_start)
        } else {
            None
        };
        self.labels.push(Label::anonymous(LabelKind::Loop));
        self.enter_scope(ScopeFlags::empty());
        let result = self.parse_for_head(start, await_at);
        self.exit_scope();
        self.labels.pop();
        result
    }

    fn parse_for_head(&mut self, start: NodeStart, await_at: Option<usize>) -> PResult<Statement> {
        self.expect(TokenKind::ParenL)?;
        if self.kind() == TokenKind::Semi {
            if let Some(pos) = await_at {
                return Err(self.unexpected(Some(pos)));
            }
            return self.parse_for(start, None);
        }

        let is_let = self.is_let(None);
        if matches!(self.kind(), TokenKind::Var | TokenKind::Const) || is_let {
            let kind = if is_let {
                VariableKind::Let
            } else if self.kind() == TokenKind::Const {
                VariableKind::Const
            } else {
                VariableKind::Var
            };
            let init_start = self.start_node();
            self.next()?;
            let declarations = self.parse_var(true, kind)?;
            let init = VariableDeclaration {
                span: self.finish_span(init_start),
                declarations,
                kind,
            };
            return self.parse_for_after_declaration(start, init, await_at);
        }

        let starts_with_let = self.is_contextual("let");
        let using = if self.is_using_keyword(false, true) {
            Some(VariableKind::Using)
        } else if self.is_using_keyword(true, true) {
            Some(VariableKind::AwaitUsing)
        } else {
            None
        };
        if let Some(kind) = using {
            let init_start = self.start_node();
            self.next()?;
            if kind == VariableKind::AwaitUsing {
                if !self.scope.can_await() {
                    return Err(self.raise(
                        self.lexer.start,
                        "Await using cannot appear outside of async function",
                    ));
                }
                self.next()?;
            }
            let declarations = self.parse_var(true, kind)?;
            let init = VariableDeclaration {
                span: self.finish_span(init_start),
                declarations,
                kind,
            };
            return self.parse_for_after_declaration(start, init, await_at);
        }

        let contains_esc = self.lexer.contains_esc;
        let mut errors = DestructuringErrors::default();
        let init_pos = self.lexer.start;
        let init = if await_at.is_some() {
            self.parse_expr_subscripts(Some(&mut errors), InitMode::ForAwait)?
        } else {
            self.parse_expression(InitMode::For, Some(&mut errors))?
        };
        let is_for_of = self.ecma() >= 6 && self.is_contextual("of");
        if self.kind() == TokenKind::In || is_for_of {
            let mut is_await = false;
            if let Some(pos) = await_at {
                if self.kind() == TokenKind::In {
                    return Err(self.unexpected(Some(pos)));
                }
                is_await = true;
            } else if is_for_of
                && self.ecma() >= 8
                && init.span().start == init_pos
                && !contains_esc
                && matches!(&init, Expression::Identifier(id) if id.name == "async")
            {
                return Err(self.unexpected(None));
            }
            if starts_with_let && is_for_of {
                return Err(self.raise(
                    init.span().start,
                    "The left-hand side of a for-of loop may not start with 'let'.",
                ));
            }
            let target = self.to_assignable(init, false, Some(&mut errors))?;
            self.check_lval_pattern(&target, BindingKind::None, None)?;
            return self.parse_for_in(start, ForInLeft::Pattern(target), is_await);
        }
        self.check_expression_errors(Some(&errors))?;
        if let Some(pos) = await_at {
            return Err(self.unexpected(Some(pos)));
        }
        self.parse_for(start, Some(ForInit::Expression(init)))
    }

    fn parse_for_after_declaration(
        &mut self,
        start: NodeStart,
        init: VariableDeclaration,
        await_at: Option<usize>,
    ) -> PResult<Statement> {
        let is_in = self.kind() == TokenKind::In;
        let is_of = self.ecma() >= 6 && self.is_contextual("of");
        if (is_in || is_of) && init.declarations.len() == 1 {
            if is_in && let Some(pos) = await_at {
                return Err(self.unexpected(Some(pos)));
            }
            let is_await = !is_in && await_at.is_some();
            return self.parse_for_in(start, ForInLeft::VariableDeclaration(init), is_await);
        }
        if let Some(pos) = await_at {
            return Err(self.unexpected(Some(pos)));
        }
        self.parse_for(start, Some(ForInit::VariableDeclaration(init)))
    }

    /// Classic `for (init; test; update)` after the init
    fn parse_for(&mut self, start: NodeStart, init: Option<ForInit>) -> PResult<Statement> {
        self.expect(TokenKind::Semi)?;
        let test = if self.kind() == TokenKind::Semi {
            None
        } else {
            Some(self.parse_expression(InitMode::None, None)?)
        };
        self.expect(TokenKind::Semi)?;
        let update = if self.kind() == TokenKind::ParenR {
            None
        } else {
            Some(self.parse_expression(InitMode::None, None)?)
        };
        self.expect(TokenKind::ParenR)?;
        let body = self.parse_statement(Some(StatementContext::Nested), false, None)?;
        Ok(Statement::For(Box::new(ForStatement {
            span: self.finish_span(start),
            init,
            test,
            update,
            body: Box::new(body),
        })))
    }

    /// `for (left in right)` or `for (left of right)`, at `in`/`of`
    fn parse_for_in(
        &mut self,
        start: NodeStart,
        left: ForInLeft,
        is_await: bool,
    ) -> PResult<Statement> {
        let is_for_in = self.kind() == TokenKind::In;
        self.next()?;
        if let ForInLeft::VariableDeclaration(decl) = &left
            && let Some(first) = decl.declarations.first()
            && first.init.is_some()
            && (!is_for_in
                || self.ecma() < 8
                || self.strict()
                || decl.kind != VariableKind::Var
                || !matches!(first.id, Pattern::Identifier(_)))
        {
            let head = if is_for_in { "for-in" } else { "for-of" };
            return Err(self.raise(
                decl.span.start,
                format!("{head} loop variable declaration may not have an initializer"),
            ));
        }
        let right = if is_for_in {
            self.parse_expression(InitMode::None, None)?
        } else {
            self.parse_maybe_assign(InitMode::None, None)?
        };
        self.expect(TokenKind::ParenR)?;
        let body = Box::new(self.parse_statement(Some(StatementContext::Nested), false, None)?);
        let span = self.finish_span(start);
        Ok(if is_for_in {
            Statement::ForIn(Box::new(ForInStatement {
                span,
                left,
                right,
                body,
            }))
        } else {
            Statement::ForOf(Box::new(ForOfStatement {
                span,
                is_await,
                left,
                right,
                body,
            }))
        })
    }

    // ============ DECLARATIONS ============

    /// Declarators after the `var`/`let`/`const`/`using` keyword
    fn parse_var(&mut self, is_for: bool, kind: VariableKind) -> PResult<Vec<VariableDeclarator>> {
        let mut declarations = Vec::new();
        loop {
            let start = self.start_node();
            let id = if kind.is_using() {
                Pattern::Identifier(self.parse_ident(false)?)
            } else {
                self.parse_binding_atom()?
            };
            let binding = if kind == VariableKind::Var {
                BindingKind::Var
            } else {
                BindingKind::Lexical
            };
            self.check_lval_pattern(&id, binding, None)?;
            let init = if self.eat(TokenKind::Eq)? {
                let mode = if is_for { InitMode::For } else { InitMode::None };
                Some(self.parse_maybe_assign(mode, None)?)
            } else {
                let loop_head = self.kind() == TokenKind::In
                    || (self.ecma() >= 6 && self.is_contextual("of"));
                if kind == VariableKind::Const && !loop_head {
                    return Err(self.unexpected(None));
                }
                if kind.is_using() && !loop_head {
                    return Err(self.raise(
                        self.lexer.last_tok_end,
                        format!("Missing initializer in {} declaration", kind.as_str()),
                    ));
                }
                if !matches!(id, Pattern::Identifier(_)) && !(is_for && loop_head) {
                    return Err(self.raise(
                        self.lexer.last_tok_end,
                        "Complex binding patterns require an initialization value",
                    ));
                }
                None
            };
            declarations.push(VariableDeclarator {
                span: self.finish_span(start),
                id,
                init,
            });
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        Ok(declarations)
    }

    /// `function` declaration; `async` has already been consumed
    fn parse_function_statement(
        &mut self,
        start: NodeStart,
        is_async: bool,
        declaration_position: bool,
    ) -> PResult<Statement> {
        self.next()?;
        let mut ctx = FunctionContext::STATEMENT;
        if !declaration_position {
            ctx |= FunctionContext::HANGING;
        }
        let function = self.parse_function(start, ctx, is_async)?;
        Ok(Statement::FunctionDeclaration(Box::new(FunctionDeclaration { function })))
    }

    /// Function after the `function` keyword
    pub(super) fn parse_function(
        &mut self,
        start: NodeStart,
        ctx: FunctionContext,
        is_async: bool,
    ) -> PResult<Function> {
        let mut generator = false;
        if self.ecma() >= 9 || (self.ecma() >= 6 && !is_async) {
            if self.kind() == TokenKind::Star && ctx.contains(FunctionContext::HANGING) {
                return Err(self.unexpected(None));
            }
            generator = self.eat(TokenKind::Star)?;
        }
        let is_async = is_async && self.ecma() >= 8;

        let mut id = None;
        if ctx.contains(FunctionContext::STATEMENT)
            && !(ctx.contains(FunctionContext::NULLABLE_ID) && self.kind() != TokenKind::Name)
        {
            let name = self.parse_ident(false)?;
            if !ctx.contains(FunctionContext::HANGING) {
                let binding = if self.strict() || generator || is_async {
                    if self.scope.treat_functions_as_var() {
                        BindingKind::Var
                    } else {
                        BindingKind::Lexical
                    }
                } else {
                    BindingKind::Function
                };
                self.check_lval_simple(&Pattern::Identifier(name.clone()), binding, None)?;
            }
            id = Some(name);
        }

        let old_yield_pos = self.yield_pos.take();
        let old_await_pos = self.await_pos.take();
        let old_await_ident_pos = self.await_ident_pos.take();
        self.enter_scope(ScopeFlags::function(is_async, generator));
        if !ctx.contains(FunctionContext::STATEMENT) && self.kind() == TokenKind::Name {
            id = Some(self.parse_ident(false)?);
        }
        self.expect(TokenKind::ParenL)?;
        let params: Vec<Pattern> = self
            .parse_binding_list(TokenKind::ParenR, false, self.ecma() >= 8)?
            .into_iter()
            .flatten()
            .collect();
        self.check_yield_await_in_default_params()?;
        let body = self.parse_function_body(&params, id.as_ref(), start.pos, false, false)?;
        self.yield_pos = old_yield_pos;
        self.await_pos = old_await_pos;
        self.await_ident_pos = old_await_ident_pos;
        Ok(Function {
            span: self.finish_span(start),
            id,
            expression: false,
            generator,
            is_async,
            params,
            body,
        })
    }

    // ============ CLASSES ============

    /// Class declaration or expression, starting at `class`
    pub(super) fn parse_class(&mut self, ctx: ClassContext) -> PResult<Class> {
        let start = self.start_node();
        self.next()?;
        let old_strict = self.strict();
        self.lexer.strict = true;

        let id = if self.kind() == TokenKind::Name {
            let id = self.parse_ident(false)?;
            if ctx != ClassContext::Expression {
                let target = Pattern::Identifier(id.clone());
                self.check_lval_simple(&target, BindingKind::Lexical, None)?;
            }
            Some(id)
        } else {
            if ctx == ClassContext::Statement {
                return Err(self.unexpected(None));
            }
            None
        };
        let super_class = if self.eat(TokenKind::Extends)? {
            Some(Box::new(self.parse_expr_subscripts(None, InitMode::None)?))
        } else {
            None
        };

        self.private_names.enter_class_body();
        let body_start = self.start_node();
        self.expect(TokenKind::BraceL)?;
        let mut body = Vec::new();
        let mut had_constructor = false;
        while self.kind() != TokenKind::BraceR {
            let Some(element) = self.parse_class_element(super_class.is_some())? else {
                continue;
            };
            match &element {
                ClassElement::Method(method) if method.kind == MethodKind::Constructor => {
                    if had_constructor {
                        return Err(self.raise_recoverable(
                            method.span.start,
                            "Duplicate constructor in the same class",
                        ));
                    }
                    had_constructor = true;
                }
                _ => self.declare_private_element(&element)?,
            }
            body.push(element);
        }
        self.lexer.strict = old_strict;
        self.next()?;
        let body = ClassBody {
            span: self.finish_span(body_start),
            body,
        };
        if let Some((name, pos)) = self.private_names.exit_class_body()
            && self.lexer.options().check_private_fields
        {
            return Err(self.raise_recoverable(
                pos,
                format!("Private field '#{name}' must be declared in an enclosing class"),
            ));
        }
        Ok(Class {
            span: self.finish_span(start),
            id,
            super_class,
            body,
        })
    }

    fn declare_private_element(&mut self, element: &ClassElement) -> PResult<()> {
        let (key, kind) = match element {
            ClassElement::Method(method) => {
                let kind = match (method.kind, method.is_static) {
                    (MethodKind::Get, false) => PrivateNameKind::InstanceGetter,
                    (MethodKind::Set, false) => PrivateNameKind::InstanceSetter,
                    (MethodKind::Get, true) => PrivateNameKind::StaticGetter,
                    (MethodKind::Set, true) => PrivateNameKind::StaticSetter,
                    _ => PrivateNameKind::Plain,
                };
                (&method.key, kind)
            }
            ClassElement::Property(prop) => (&prop.key, PrivateNameKind::Plain),
            ClassElement::StaticBlock(_) => return Ok(()),
        };
        let Expression::PrivateIdentifier(id) = key else {
            return Ok(());
        };
        if self.private_names.declare(&id.name, kind) {
            return Err(self.raise_recoverable(
                id.span.start,
                format!("Identifier '#{}' has already been declared", id.name),
            ));
        }
        Ok(())
    }

    fn is_class_element_name_start(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Name
                | TokenKind::PrivateId
                | TokenKind::Num
                | TokenKind::String
                | TokenKind::BracketL
        ) || self.kind().keyword().is_some()
    }

    /// One class member; `None` for a stray `;`
    fn parse_class_element(
        &mut self,
        constructor_allows_super: bool,
    ) -> PResult<Option<ClassElement>> {
        if self.eat(TokenKind::Semi)? {
            return Ok(None);
        }
        let ecma = self.ecma();
        let start = self.start_node();
        let mut key_name: Option<&'static str> = None;
        let mut generator = false;
        let mut is_async = false;
        let mut kind = MethodKind::Method;
        let mut is_static = false;

        if self.eat_contextual("static")? {
            if ecma >= 13 && self.kind() == TokenKind::BraceL {
                return self.parse_class_static_block(start).map(Some);
            }
            if self.is_class_element_name_start() || self.kind() == TokenKind::Star {
                is_static = true;
            } else {
                key_name = Some("static");
            }
        }
        if key_name.is_none() && ecma >= 8 && self.eat_contextual("async")? {
            if (self.is_class_element_name_start() || self.kind() == TokenKind::Star)
                && !self.can_insert_semicolon()
            {
                is_async = true;
            } else {
                key_name = Some("async");
            }
        }
        if key_name.is_none() && (ecma >= 9 || !is_async) && self.eat(TokenKind::Star)? {
            generator = true;
        }
        if key_name.is_none() && !is_async && !generator {
            let accessor = if self.eat_contextual("get")? {
                Some((MethodKind::Get, "get"))
            } else if self.eat_contextual("set")? {
                Some((MethodKind::Set, "set"))
            } else {
                None
            };
            if let Some((accessor, name)) = accessor {
                if self.is_class_element_name_start() {
                    kind = accessor;
                } else {
                    key_name = Some(name);
                }
            }
        }

        let (key, computed) = match key_name {
            // the modifier turned out to be the member name
            Some(name) => {
                let key_start = NodeStart {
                    pos: self.lexer.last_tok_start,
                    loc: self.lexer.last_tok_start_loc,
                };
                let key = Identifier {
                    span: self.finish_span(key_start),
                    name: name.to_string(),
                };
                (Expression::Identifier(key), false)
            }
            None => self.parse_class_element_name()?,
        };
        let head = ElementHead {
            start,
            is_static,
            computed,
            key,
        };

        if ecma < 13
            || self.kind() == TokenKind::ParenL
            || kind != MethodKind::Method
            || generator
            || is_async
        {
            let is_constructor = !head.is_static && head.key_is("constructor");
            if is_constructor && kind != MethodKind::Method {
                return Err(self.raise(
                    head.key.span().start,
                    "Constructor can't have get/set modifier",
                ));
            }
            if is_constructor {
                kind = MethodKind::Constructor;
            }
            let allows_direct_super = is_constructor && constructor_allows_super;
            let method =
                self.parse_class_method(head, kind, generator, is_async, allows_direct_super)?;
            return Ok(Some(ClassElement::Method(method)));
        }
        Ok(Some(ClassElement::Property(self.parse_class_field(head)?)))
    }

    fn parse_class_element_name(&mut self) -> PResult<(Expression, bool)> {
        if self.kind() == TokenKind::PrivateId {
            if self.value_str() == "constructor" {
                return Err(self.raise(
                    self.lexer.start,
                    "Classes can't have an element named '#constructor'",
                ));
            }
            return Ok((Expression::PrivateIdentifier(self.parse_private_ident()?), false));
        }
        self.parse_property_name()
    }

    fn parse_class_method(
        &mut self,
        head: ElementHead,
        kind: MethodKind,
        generator: bool,
        is_async: bool,
        allows_direct_super: bool,
    ) -> PResult<MethodDefinition> {
        let key_start = head.key.span().start;
        if kind == MethodKind::Constructor {
            if generator {
                return Err(self.raise(key_start, "Constructor can't be a generator"));
            }
            if is_async {
                return Err(self.raise(key_start, "Constructor can't be an async method"));
            }
        } else if head.is_static && head.key_is("prototype") {
            return Err(self.raise(
                key_start,
                "Classes may not have a static property named prototype",
            ));
        }
        let value = self.parse_method(generator, is_async, allows_direct_super)?;
        let accessor = match kind {
            MethodKind::Get => Some(PropertyKind::Get),
            MethodKind::Set => Some(PropertyKind::Set),
            _ => None,
        };
        if let Some(accessor) = accessor {
            self.check_accessor_params(accessor, &value.function)?;
        }
        Ok(MethodDefinition {
            span: self.finish_span(head.start),
            is_static: head.is_static,
            computed: head.computed,
            key: head.key,
            kind,
            value,
        })
    }

    fn parse_class_field(&mut self, head: ElementHead) -> PResult<PropertyDefinition> {
        let key_start = head.key.span().start;
        if head.key_is("constructor") {
            return Err(self.raise(key_start, "Classes can't have a field named 'constructor'"));
        }
        if head.is_static && head.key_is("prototype") {
            return Err(self.raise(
                key_start,
                "Classes can't have a static field named 'prototype'",
            ));
        }
        let value = if self.eat(TokenKind::Eq)? {
            self.enter_scope(ScopeFlags::CLASS_FIELD_INIT | ScopeFlags::SUPER);
            let value = self.parse_maybe_assign(InitMode::None, None);
            self.exit_scope();
            Some(value?)
        } else {
            None
        };
        self.semicolon()?;
        Ok(PropertyDefinition {
            span: self.finish_span(head.start),
            is_static: head.is_static,
            computed: head.computed,
            key: head.key,
            value,
        })
    }

    /// `static { ... }`, at the `{`
    fn parse_class_static_block(&mut self, start: NodeStart) -> PResult<ClassElement> {
        self.next()?;
        let old_labels = std::mem::take(&mut self.labels);
        self.enter_scope(ScopeFlags::CLASS_STATIC_BLOCK | ScopeFlags::SUPER);
        let mut body = Vec::new();
        while self.kind() != TokenKind::BraceR {
            body.push(self.parse_statement(None, false, None)?);
        }
        self.next()?;
        self.exit_scope();
        self.labels = old_labels;
        Ok(ClassElement::StaticBlock(StaticBlock {
            span: self.finish_span(start),
            body,
        }))
    }

    // ============ MODULES ============

    fn parse_string_literal(&mut self) -> PResult<Literal> {
        if self.kind() != TokenKind::String {
            return Err(self.unexpected(None));
        }
        match self.parse_literal()? {
            Expression::Literal(lit) => Ok(*lit),
            other => Err(self.unexpected(Some(other.span().start))),
        }
    }

    fn parse_module_export_name(&mut self) -> PResult<ModuleExportName> {
        if self.ecma() >= 13 && self.kind() == TokenKind::String {
            let lit = self.parse_string_literal()?;
            // lone surrogate escapes decode to U+FFFD
            if let LiteralValue::String(value) = &lit.value
                && value.contains('\u{FFFD}')
                && !lit.raw.contains('\u{FFFD}')
            {
                return Err(self.raise(
                    lit.span.start,
                    "An export name cannot include a lone surrogate.",
                ));
            }
            return Ok(ModuleExportName::Literal(lit));
        }
        Ok(ModuleExportName::Identifier(self.parse_ident(true)?))
    }

    /// `with { type: "json" }` after a module specifier, from ES2025
    fn parse_with_clause(&mut self) -> PResult<Option<Vec<ImportAttribute>>> {
        if self.ecma() < 16 {
            return Ok(None);
        }
        let mut attributes = Vec::new();
        if !self.eat(TokenKind::With)? {
            return Ok(Some(attributes));
        }
        self.expect(TokenKind::BraceL)?;
        let mut keys = FxHashSet::default();
        let mut first = true;
        while !self.eat(TokenKind::BraceR)? {
            if first {
                first = false;
            } else {
                self.expect(TokenKind::Comma)?;
                if self.after_trailing_comma(TokenKind::BraceR, false)? {
                    break;
                }
            }
            let start = self.start_node();
            let key = if self.kind() == TokenKind::String {
                ModuleExportName::Literal(self.parse_string_literal()?)
            } else {
                ModuleExportName::Identifier(self.parse_ident(!self.allow_reserved_never)?)
            };
            self.expect(TokenKind::Colon)?;
            let value = self.parse_string_literal()?;
            let name = key.name().to_string();
            if !keys.insert(name.clone()) {
                return Err(self.raise_recoverable(
                    key.span().start,
                    format!("Duplicate attribute key '{name}'"),
                ));
            }
            attributes.push(ImportAttribute {
                span: self.finish_span(start),
                key,
                value,
            });
        }
        Ok(Some(attributes))
    }

    fn parse_import(&mut self, start: NodeStart) -> PResult<Statement> {
        self.next()?;
        let specifiers = if self.kind() == TokenKind::String {
            Vec::new()
        } else {
            let specifiers = self.parse_import_specifiers()?;
            self.expect_contextual("from")?;
            specifiers
        };
        let source = self.parse_string_literal()?;
        let attributes = self.parse_with_clause()?;
        self.semicolon()?;
        Ok(Statement::ImportDeclaration(Box::new(ImportDeclaration {
            span: self.finish_span(start),
            specifiers,
            source,
            attributes,
        })))
    }

    fn parse_import_binding(&mut self) -> PResult<Identifier> {
        let local = self.parse_ident(false)?;
        self.check_lval_simple(&Pattern::Identifier(local.clone()), BindingKind::Lexical, None)?;
        Ok(local)
    }

    fn parse_import_specifiers(&mut self) -> PResult<Vec<ImportDeclarationSpecifier>> {
        let mut specifiers = Vec::new();
        if self.kind() == TokenKind::Name {
            let start = self.start_node();
            let local = self.parse_import_binding()?;
            specifiers.push(ImportDeclarationSpecifier::Default(ImportDefaultSpecifier {
                span: self.finish_span(start),
                local,
            }));
            if !self.eat(TokenKind::Comma)? {
                return Ok(specifiers);
            }
        }
        if self.kind() == TokenKind::Star {
            let start = self.start_node();
            self.next()?;
            self.expect_contextual("as")?;
            let local = self.parse_import_binding()?;
            specifiers.push(ImportDeclarationSpecifier::Namespace(ImportNamespaceSpecifier {
                span: self.finish_span(start),
                local,
            }));
            return Ok(specifiers);
        }
        self.expect(TokenKind::BraceL)?;
        let mut first = true;
        while !self.eat(TokenKind::BraceR)? {
            if first {
                first = false;
            } else {
                self.expect(TokenKind::Comma)?;
                if self.after_trailing_comma(TokenKind::BraceR, false)? {
                    break;
                }
            }
            let start = self.start_node();
            let imported = self.parse_module_export_name()?;
            let local = if self.eat_contextual("as")? {
                self.parse_import_binding()?
            } else {
                let ModuleExportName::Identifier(id) = &imported else {
                    return Err(self.raise(imported.span().start, "Binding rvalue"));
                };
                self.check_unreserved(id)?;
                let target = Pattern::Identifier(id.clone());
                self.check_lval_simple(&target, BindingKind::Lexical, None)?;
                id.clone()
            };
            specifiers.push(ImportDeclarationSpecifier::Named(ImportSpecifier {
                span: self.finish_span(start),
                imported,
                local,
            }));
        }
        Ok(specifiers)
    }

    fn check_export(
        &self,
        exports: Option<&mut FxHashSet<String>>,
        name: &str,
        pos: usize,
    ) -> PResult<()> {
        let Some(exports) = exports else {
            return Ok(());
        };
        if !exports.insert(name.to_string()) {
            return Err(self.raise_recoverable(pos, format!("Duplicate export '{name}'")));
        }
        Ok(())
    }

    fn check_pattern_export(
        &self,
        mut exports: Option<&mut FxHashSet<String>>,
        pattern: &Pattern,
    ) -> PResult<()> {
        match pattern {
            Pattern::Identifier(id) => self.check_export(exports, &id.name, id.span.start),
            Pattern::Object(object) => {
                for member in &object.properties {
                    let target = match member {
                        ObjectPatternMember::Property(prop) => &prop.value,
                        ObjectPatternMember::Rest(rest) => &rest.argument,
                    };
                    self.check_pattern_export(exports.as_deref_mut(), target)?;
                }
                Ok(())
            }
            Pattern::Array(array) => {
                for element in array.elements.iter().flatten() {
                    self.check_pattern_export(exports.as_deref_mut(), element)?;
                }
                Ok(())
            }
            Pattern::Assignment(default) => self.check_pattern_export(exports, &default.left),
            Pattern::Rest(rest) => self.check_pattern_export(exports, &rest.argument),
            Pattern::Member(_) => Ok(()),
        }
    }

    fn should_parse_export_statement(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Var | TokenKind::Const | TokenKind::Class | TokenKind::Function
        ) || self.is_let(None)
            || self.is_async_function()
    }

    fn parse_export(
        &mut self,
        start: NodeStart,
        mut exports: Option<&mut FxHashSet<String>>,
    ) -> PResult<Statement> {
        self.next()?;
        if self.eat(TokenKind::Star)? {
            return self.parse_export_all(start, exports);
        }
        if self.eat(TokenKind::Default)? {
            self.check_export(exports, "default", self.lexer.last_tok_start)?;
            let declaration = self.parse_export_default()?;
            return Ok(Statement::ExportDefault(Box::new(ExportDefaultDeclaration {
                span: self.finish_span(start),
                declaration,
            })));
        }

        if self.should_parse_export_statement() {
            let declaration = self.parse_statement(None, false, None)?;
            match &declaration {
                Statement::VariableDeclaration(decl) => {
                    for declarator in &decl.declarations {
                        self.check_pattern_export(exports.as_deref_mut(), &declarator.id)?;
                    }
                }
                Statement::FunctionDeclaration(decl) => {
                    if let Some(id) = &decl.function.id {
                        self.check_export(exports, &id.name, id.span.start)?;
                    }
                }
                Statement::ClassDeclaration(decl) => {
                    if let Some(id) = &decl.class.id {
                        self.check_export(exports, &id.name, id.span.start)?;
                    }
                }
                _ => {}
            }
            let attributes = (self.ecma() >= 16).then(Vec::new);
            return Ok(Statement::ExportNamed(Box::new(ExportNamedDeclaration {
                span: self.finish_span(start),
                declaration: Some(Box::new(declaration)),
                specifiers: Vec::new(),
                source: None,
                attributes,
            })));
        }

        let specifiers = self.parse_export_specifiers(exports)?;
        let (source, attributes) = if self.eat_contextual("from")? {
            let source = self.parse_string_literal()?;
            (Some(source), self.parse_with_clause()?)
        } else {
            for spec in &specifiers {
                match &spec.local {
                    ModuleExportName::Identifier(local) => {
                        self.check_unreserved(local)?;
                        self.scope.check_local_export(&local.name, local.span.start);
                    }
                    ModuleExportName::Literal(lit) => {
                        return Err(self.raise(
                            lit.span.start,
                            "A string literal cannot be used as an exported binding \
                             without `from`.",
                        ));
                    }
                }
            }
            (None, None)
        };
        self.semicolon()?;
        Ok(Statement::ExportNamed(Box::new(ExportNamedDeclaration {
            span: self.finish_span(start),
            declaration: None,
            specifiers,
            source,
            attributes,
        })))
    }

    fn parse_export_all(
        &mut self,
        start: NodeStart,
        exports: Option<&mut FxHashSet<String>>,
    ) -> PResult<Statement> {
        let mut exported = None;
        if self.ecma() >= 11 && self.eat_contextual("as")? {
            let name = self.parse_module_export_name()?;
            self.check_export(exports, name.name(), self.lexer.last_tok_start)?;
            exported = Some(name);
        }
        self.expect_contextual("from")?;
        let source = self.parse_string_literal()?;
        let attributes = self.parse_with_clause()?;
        self.semicolon()?;
        Ok(Statement::ExportAll(Box::new(ExportAllDeclaration {
            span: self.finish_span(start),
            exported,
            source,
            attributes,
        })))
    }

    fn parse_export_default(&mut self) -> PResult<ExportDefaultKind> {
        let is_async = self.is_async_function();
        if self.kind() == TokenKind::Function || is_async {
            let start = self.start_node();
            self.next()?;
            if is_async {
                self.next()?;
            }
            let ctx = FunctionContext::STATEMENT | FunctionContext::NULLABLE_ID;
            let function = self.parse_function(start, ctx, is_async)?;
            return Ok(ExportDefaultKind::Function(FunctionDeclaration { function }));
        }
        if self.kind() == TokenKind::Class {
            let class = self.parse_class(ClassContext::NullableStatement)?;
            return Ok(ExportDefaultKind::Class(ClassDeclaration { class }));
        }
        let expr = self.parse_maybe_assign(InitMode::None, None)?;
        self.semicolon()?;
        Ok(ExportDefaultKind::Expression(expr))
    }

    fn parse_export_specifiers(
        &mut self,
        mut exports: Option<&mut FxHashSet<String>>,
    ) -> PResult<Vec<ExportSpecifier>> {
        let mut specifiers = Vec::new();
        self.expect(TokenKind::BraceL)?;
        let mut first = true;
        while !self.eat(TokenKind::BraceR)? {
            if first {
                first = false;
            } else {
                self.expect(TokenKind::Comma)?;
                if self.after_trailing_comma(TokenKind::BraceR, false)? {
                    break;
                }
            }
            let start = self.start_node();
            let local = self.parse_module_export_name()?;
            let exported = if self.eat_contextual("as")? {
                self.parse_module_export_name()?
            } else {
                local.clone()
            };
            self.check_export(exports.as_deref_mut(), exported.name(), exported.span().start)?;
            specifiers.push(ExportSpecifier {
                span: self.finish_span(start),
                local,
                exported,
            });
        }
        Ok(specifiers)
    }
}
