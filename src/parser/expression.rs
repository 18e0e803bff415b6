//! Expression parsing
//!
//! Operator precedence is handled by `parse_expr_op`, which climbs
//! precedence levels using the binding power of each binary operator token.
//! Ambiguous prefixes (`(a, b)` before `=>`, `{a = 1}` before `=`) are parsed
//! as expressions first; `DestructuringErrors` remembers what would be
//! illegal once the caller knows which one it got.

use rustc_hash::{FxHashMap, FxHashSet};

use super::{DestructuringErrors, InitMode, NodeStart, Parser};
use crate::ast::{
    ArrayExpression, ArrowBody, ArrowFunctionExpression, AssignmentExpression, AssignmentOperator,
    AwaitExpression, BinaryExpression, BinaryOperator, BlockStatement, CallExpression,
    ChainExpression, ConditionalExpression, Expression, Function, FunctionExpression, Identifier,
    ImportExpression, Literal, LiteralValue, LogicalExpression, LogicalOperator, MemberExpression,
    MetaProperty, NewExpression, ObjectExpression, ObjectMember, Pattern, PrivateIdentifier,
    Property, PropertyKind, RegExpLiteral, RestElement, SequenceExpression, SpreadElement, Super,
    TaggedTemplateExpression, TemplateElement, TemplateElementValue, TemplateLiteral,
    ThisExpression, UnaryExpression, UnaryOperator, UpdateExpression, UpdateOperator,
    YieldExpression,
};
use crate::context::TokContext;
use crate::error::PResult;
use crate::lexer::{TokenKind, TokenValue};
use crate::scope::{BindingKind, ScopeFlags};

/// One step of a subscript chain
enum Subscript {
    /// A member access, call or tagged template was added
    Link { expr: Expression, optional: bool },
    /// Nothing more to add
    Done(Expression),
}

/// Property names already seen in an object literal
#[derive(Default)]
pub(super) struct PropertyNames {
    proto: bool,
    /// ES5 only: name to (init, get, set)
    seen: FxHashMap<String, (bool, bool, bool)>,
}

impl<'a> Parser<'a> {
    // ============ COMMA AND ASSIGNMENT ============

    /// Comma-separated expressions
    pub(super) fn parse_expression(
        &mut self,
        init: InitMode,
        mut errors: Option<&mut DestructuringErrors>,
    ) -> PResult<Expression> {
        let start = self.start_node();
        let expr = self.parse_maybe_assign(init, errors.as_deref_mut())?;
        if self.kind() != TokenKind::Comma {
            return Ok(expr);
        }
        let mut expressions = vec![expr];
        while self.eat(TokenKind::Comma)? {
            expressions.push(self.parse_maybe_assign(init, errors.as_deref_mut())?);
        }
        Ok(Expression::Sequence(SequenceExpression {
            span: self.finish_span(start),
            expressions,
        }))
    }

    /// Assignment expression, including `yield` and arrow functions
    pub(super) fn parse_maybe_assign(
        &mut self,
        init: InitMode,
        errors: Option<&mut DestructuringErrors>,
    ) -> PResult<Expression> {
        self.nested(|p| p.parse_assign_level(init, errors))
    }

    fn parse_assign_level(
        &mut self,
        init: InitMode,
        errors: Option<&mut DestructuringErrors>,
    ) -> PResult<Expression> {
        if self.is_contextual("yield") {
            if self.scope.in_generator() {
                return self.parse_yield(init);
            }
            // `yield` is a plain identifier here, so `yield / 2` divides
            self.lexer.expr_allowed = false;
        }

        let mut own = DestructuringErrors::default();
        let owns_errors = errors.is_none();
        let errors = match errors {
            Some(errors) => errors,
            None => &mut own,
        };
        let old_paren_assign = errors.parenthesized_assign;
        let old_trailing_comma = errors.trailing_comma;
        let old_double_proto = errors.double_proto;
        if !owns_errors {
            errors.parenthesized_assign = None;
            errors.trailing_comma = None;
        }

        let start = self.start_node();
        if matches!(self.kind(), TokenKind::ParenL | TokenKind::Name) {
            self.potential_arrow_at = Some(self.lexer.start);
            self.potential_arrow_in_for_await = init == InitMode::ForAwait;
        }
        let left = self.parse_maybe_conditional(init, Some(&mut *errors))?;

        if self.kind().is_assign() {
            let operator = assignment_operator(self.kind());
            let is_eq = self.kind() == TokenKind::Eq;
            let left_start = left.span().start;
            let left = if is_eq {
                self.to_assignable(left, false, Some(&mut *errors))?
            } else {
                self.to_simple_target(left)?
            };
            if !owns_errors {
                errors.parenthesized_assign = None;
                errors.trailing_comma = None;
                errors.double_proto = None;
            }
            // a shorthand default inside this target was legitimate
            if errors.shorthand_assign.is_some_and(|pos| pos >= left_start) {
                errors.shorthand_assign = None;
            }
            if is_eq {
                self.check_lval_pattern(&left, BindingKind::None, None)?;
            }
            self.next()?;
            let right = self.parse_maybe_assign(init, None)?;
            if old_double_proto.is_some() {
                errors.double_proto = old_double_proto;
            }
            return Ok(Expression::Assignment(AssignmentExpression {
                span: self.finish_span(start),
                operator,
                left: Box::new(left),
                right: Box::new(right),
            }));
        }
        if owns_errors {
            self.check_expression_errors(Some(&*errors))?;
        }
        if old_paren_assign.is_some() {
            errors.parenthesized_assign = old_paren_assign;
        }
        if old_trailing_comma.is_some() {
            errors.trailing_comma = old_trailing_comma;
        }
        Ok(left)
    }

    fn parse_maybe_conditional(
        &mut self,
        init: InitMode,
        mut errors: Option<&mut DestructuringErrors>,
    ) -> PResult<Expression> {
        let start = self.start_node();
        let expr = self.parse_expr_ops(init, errors.as_deref_mut())?;
        if Self::has_expression_errors(errors.as_deref()) {
            return Ok(expr);
        }
        if !self.eat(TokenKind::Question)? {
            return Ok(expr);
        }
        let consequent = self.parse_maybe_assign(InitMode::None, None)?;
        self.expect(TokenKind::Colon)?;
        let alternate = self.parse_maybe_assign(init, None)?;
        Ok(Expression::Conditional(ConditionalExpression {
            span: self.finish_span(start),
            test: Box::new(expr),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        }))
    }

    // ============ OPERATORS ============

    fn parse_expr_ops(
        &mut self,
        init: InitMode,
        mut errors: Option<&mut DestructuringErrors>,
    ) -> PResult<Expression> {
        let start = self.start_node();
        let expr = self.parse_maybe_unary(errors.as_deref_mut(), false, false, init)?;
        if Self::has_expression_errors(errors.as_deref()) {
            return Ok(expr);
        }
        if expr.span().start == start.pos && matches!(expr, Expression::Arrow(_)) {
            return Ok(expr);
        }
        self.parse_expr_op(expr, start, None, init)
    }

    /// Fold binary operators binding tighter than `min_prec` onto `left`.
    fn parse_expr_op(
        &mut self,
        mut left: Expression,
        left_start: NodeStart,
        min_prec: Option<u8>,
        init: InitMode,
    ) -> PResult<Expression> {
        loop {
            let kind = self.kind();
            let Some(mut prec) = kind.binop() else {
                return Ok(left);
            };
            if init.in_for() && kind == TokenKind::In {
                return Ok(left);
            }
            if min_prec.is_some_and(|min| prec <= min) {
                return Ok(left);
            }
            let logical = matches!(kind, TokenKind::PipePipe | TokenKind::AmpAmp);
            let coalesce = kind == TokenKind::QuestionQuestion;
            if coalesce {
                // `??` binds like `&&` on its right side
                prec = 2;
            }
            self.next()?;
            let right_start = self.start_node();
            let operand = self.parse_maybe_unary(None, false, false, init)?;
            // only tighter operators nest, so this recursion is shallow
            let right = self.parse_expr_op(operand, right_start, Some(prec), init)?;
            left = self.build_binary(left_start, left, right, kind)?;
            let next = self.kind();
            if (logical && next == TokenKind::QuestionQuestion)
                || (coalesce && matches!(next, TokenKind::PipePipe | TokenKind::AmpAmp))
            {
                return Err(self.raise_recoverable(
                    self.lexer.start,
                    "Logical expressions and coalesce expressions cannot be mixed. \
                     Wrap either by parentheses",
                ));
            }
        }
    }

    fn build_binary(
        &mut self,
        start: NodeStart,
        left: Expression,
        right: Expression,
        op: TokenKind,
    ) -> PResult<Expression> {
        if let Expression::PrivateIdentifier(id) = &right {
            return Err(self.raise(
                id.span.start,
                "Private identifier can only be left side of binary expression",
            ));
        }
        let span = self.finish_span(start);
        let left = Box::new(left);
        let right = Box::new(right);
        if let Some(operator) = logical_operator(op) {
            return Ok(Expression::Logical(LogicalExpression {
                span,
                left,
                operator,
                right,
            }));
        }
        let Some(operator) = binary_operator(op) else {
            return Err(self.unexpected(Some(span.start)));
        };
        Ok(Expression::Binary(BinaryExpression {
            span,
            left,
            operator,
            right,
        }))
    }

    /// Unary, update and `await` expressions, plus right-associative `**`
    pub(super) fn parse_maybe_unary(
        &mut self,
        errors: Option<&mut DestructuringErrors>,
        saw_unary: bool,
        inc_dec: bool,
        init: InitMode,
    ) -> PResult<Expression> {
        self.nested(|p| p.parse_unary_level(errors, saw_unary, inc_dec, init))
    }

    fn parse_unary_level(
        &mut self,
        mut errors: Option<&mut DestructuringErrors>,
        mut saw_unary: bool,
        inc_dec: bool,
        init: InitMode,
    ) -> PResult<Expression> {
        let start = self.start_node();
        let expr;
        if self.is_contextual("await") && self.scope.can_await() {
            expr = self.parse_await(init)?;
            saw_unary = true;
        } else if self.kind().is_prefix() {
            let kind = self.kind();
            let update = kind.is_update();
            self.next()?;
            let argument = self.parse_maybe_unary(None, true, update, init)?;
            self.check_expression_errors(errors.as_deref())?;
            if update {
                self.check_lval_simple_expr(&argument)?;
                let operator = if kind == TokenKind::PlusPlus {
                    UpdateOperator::Increment
                } else {
                    UpdateOperator::Decrement
                };
                expr = Expression::Update(UpdateExpression {
                    span: self.finish_span(start),
                    operator,
                    prefix: true,
                    argument: Box::new(argument),
                });
            } else {
                let operator = unary_operator(kind);
                if operator == UnaryOperator::Delete {
                    if self.strict() && matches!(argument, Expression::Identifier(_)) {
                        return Err(self.raise_recoverable(
                            start.pos,
                            "Deleting local variable in strict mode",
                        ));
                    }
                    if is_private_field_access(&argument) {
                        return Err(
                            self.raise_recoverable(start.pos, "Private fields can not be deleted")
                        );
                    }
                }
                saw_unary = true;
                expr = Expression::Unary(UnaryExpression {
                    span: self.finish_span(start),
                    operator,
                    prefix: true,
                    argument: Box::new(argument),
                });
            }
        } else if !saw_unary && self.kind() == TokenKind::PrivateId {
            if (init.in_for() || self.private_names.is_empty())
                && self.lexer.options().check_private_fields
            {
                return Err(self.unexpected(None));
            }
            expr = Expression::PrivateIdentifier(self.parse_private_ident()?);
            // only valid as the left side of `#x in obj`
            if self.kind() != TokenKind::In {
                return Err(self.unexpected(None));
            }
        } else {
            let mut subscripts = self.parse_expr_subscripts(errors.as_deref_mut(), init)?;
            if Self::has_expression_errors(errors.as_deref()) {
                return Ok(subscripts);
            }
            while self.kind().is_update() && !self.can_insert_semicolon() {
                let operator = if self.kind() == TokenKind::PlusPlus {
                    UpdateOperator::Increment
                } else {
                    UpdateOperator::Decrement
                };
                self.check_lval_simple_expr(&subscripts)?;
                self.next()?;
                subscripts = Expression::Update(UpdateExpression {
                    span: self.finish_span(start),
                    operator,
                    prefix: false,
                    argument: Box::new(subscripts),
                });
            }
            expr = subscripts;
        }

        if !inc_dec && self.kind() == TokenKind::StarStar {
            if saw_unary {
                return Err(self.unexpected(Some(self.lexer.start)));
            }
            self.next()?;
            let right = self.parse_maybe_unary(None, false, false, init)?;
            return self.build_binary(start, expr, right, TokenKind::StarStar);
        }
        Ok(expr)
    }

    fn parse_await(&mut self, init: InitMode) -> PResult<Expression> {
        if self.await_pos.is_none() {
            self.await_pos = Some(self.lexer.start);
        }
        let start = self.start_node();
        self.next()?;
        let argument = self.parse_maybe_unary(None, true, false, init)?;
        Ok(Expression::Await(AwaitExpression {
            span: self.finish_span(start),
            argument: Box::new(argument),
        }))
    }

    fn parse_yield(&mut self, init: InitMode) -> PResult<Expression> {
        if self.yield_pos.is_none() {
            self.yield_pos = Some(self.lexer.start);
        }
        let start = self.start_node();
        self.next()?;
        let kind = self.kind();
        let (delegate, argument) = if kind == TokenKind::Semi
            || self.can_insert_semicolon()
            || (kind != TokenKind::Star && !kind.starts_expr())
        {
            (false, None)
        } else {
            let delegate = self.eat(TokenKind::Star)?;
            (delegate, Some(Box::new(self.parse_maybe_assign(init, None)?)))
        };
        Ok(Expression::Yield(YieldExpression {
            span: self.finish_span(start),
            delegate,
            argument,
        }))
    }


    // ============ SUBSCRIPTS ============

    pub(super) fn parse_expr_subscripts(
        &mut self,
        mut errors: Option<&mut DestructuringErrors>,
        init: InitMode,
    ) -> PResult<Expression> {
        let start = self.start_node();
        let expr = self.parse_expr_atom(errors.as_deref_mut(), init, false)?;
        if matches!(expr, Expression::Arrow(_))
            && self.lexer.slice(self.lexer.last_tok_start, self.lexer.last_tok_end) != ")"
        {
            return Ok(expr);
        }
        let result = self.parse_subscripts(expr, start, false, init)?;
        // `(a).b = 1` and `[a][0] = 1` are valid simple targets
        if let (Some(errors), Expression::Member(member)) = (errors, &result) {
            let member_start = member.span.start;
            if errors.parenthesized_assign.is_some_and(|pos| pos >= member_start) {
                errors.parenthesized_assign = None;
            }
            if errors.parenthesized_bind.is_some_and(|pos| pos >= member_start) {
                errors.parenthesized_bind = None;
            }
            if errors.trailing_comma.is_some_and(|pos| pos >= member_start) {
                errors.trailing_comma = None;
            }
        }
        Ok(result)
    }

    pub(super) fn parse_subscripts(
        &mut self,
        base: Expression,
        start: NodeStart,
        no_calls: bool,
        init: InitMode,
    ) -> PResult<Expression> {
        let maybe_async_arrow = self.ecma() >= 8
            && matches!(&base, Expression::Identifier(id)
                if id.name == "async" && id.span.end - id.span.start == 5)
            && self.lexer.last_tok_end == base.span().end
            && !self.can_insert_semicolon()
            && self.potential_arrow_at == Some(base.span().start);
        let mut optional_chained = false;
        let mut base = base;
        loop {
            let step = self.parse_subscript(
                base,
                start,
                no_calls,
                maybe_async_arrow,
                optional_chained,
                init,
            )?;
            match step {
                Subscript::Link { expr, optional } => {
                    optional_chained |= optional;
                    base = expr;
                }
                Subscript::Done(expr) => {
                    if optional_chained && !matches!(expr, Expression::Arrow(_)) {
                        return Ok(Expression::Chain(ChainExpression {
                            span: self.finish_span(start),
                            expression: Box::new(expr),
                        }));
                    }
                    return Ok(expr);
                }
            }
        }
    }

    fn parse_subscript(
        &mut self,
        base: Expression,
        start: NodeStart,
        no_calls: bool,
        maybe_async_arrow: bool,
        optional_chained: bool,
        init: InitMode,
    ) -> PResult<Subscript> {
        let optional_supported = self.ecma() >= 11;
        let optional = optional_supported && self.eat(TokenKind::QuestionDot)?;
        if no_calls && optional {
            return Err(self.raise(
                self.lexer.last_tok_start,
                "Optional chaining cannot appear in the callee of new expressions",
            ));
        }
        let computed = self.eat(TokenKind::BracketL)?;
        if computed
            || (optional && !matches!(self.kind(), TokenKind::ParenL | TokenKind::BackQuote))
            || self.eat(TokenKind::Dot)?
        {
            let property = if computed {
                let property = self.parse_expression(InitMode::None, None)?;
                self.expect(TokenKind::BracketR)?;
                property
            } else if self.kind() == TokenKind::PrivateId && !matches!(base, Expression::Super(_)) {
                Expression::PrivateIdentifier(self.parse_private_ident()?)
            } else {
                Expression::Identifier(self.parse_ident(!self.allow_reserved_never)?)
            };
            let expr = Expression::Member(MemberExpression {
                span: self.finish_span(start),
                object: Box::new(base),
                property: Box::new(property),
                computed,
                optional,
            });
            return Ok(Subscript::Link { expr, optional });
        }

        if !no_calls && self.eat(TokenKind::ParenL)? {
            let mut errors = DestructuringErrors::default();
            let old_yield_pos = self.yield_pos.take();
            let old_await_pos = self.await_pos.take();
            let old_await_ident_pos = self.await_ident_pos.take();
            let allow_trailing_comma = self.ecma() >= 8;
            let arguments = self.parse_expr_list(
                TokenKind::ParenR,
                allow_trailing_comma,
                false,
                Some(&mut errors),
            )?;
            if maybe_async_arrow
                && !optional
                && !self.can_insert_semicolon()
                && self.eat(TokenKind::Arrow)?
            {
                self.check_pattern_errors(Some(&errors), false)?;
                self.check_yield_await_in_default_params()?;
                if let Some(pos) = self.await_ident_pos {
                    return Err(self.raise(
                        pos,
                        "Cannot use 'await' as identifier inside an async function",
                    ));
                }
                self.yield_pos = old_yield_pos;
                self.await_pos = old_await_pos;
                self.await_ident_pos = old_await_ident_pos;
                let arrow = self.parse_arrow_expression(start, arguments, None, true, init)?;
                return Ok(Subscript::Done(arrow));
            }
            self.check_expression_errors(Some(&errors))?;
            self.yield_pos = old_yield_pos.or(self.yield_pos);
            self.await_pos = old_await_pos.or(self.await_pos);
            self.await_ident_pos = old_await_ident_pos.or(self.await_ident_pos);
            let expr = Expression::Call(CallExpression {
                span: self.finish_span(start),
                callee: Box::new(base),
                arguments: arguments.into_iter().flatten().collect(),
                optional,
            });
            return Ok(Subscript::Link { expr, optional });
        }

        if self.kind() == TokenKind::BackQuote {
            if optional || optional_chained {
                return Err(self.raise(
                    self.lexer.start,
                    "Optional chaining cannot appear in the tag of tagged template expressions",
                ));
            }
            let quasi = self.parse_template(true)?;
            let expr = Expression::TaggedTemplate(Box::new(TaggedTemplateExpression {
                span: self.finish_span(start),
                tag: Box::new(base),
                quasi,
            }));
            return Ok(Subscript::Link {
                expr,
                optional: false,
            });
        }
        Ok(Subscript::Done(base))
    }

    /// Comma-separated list up to `close`. Holes (`None`) only appear when
    /// `allow_empty` is set.
    pub(super) fn parse_expr_list(
        &mut self,
        close: TokenKind,
        allow_trailing_comma: bool,
        allow_empty: bool,
        mut errors: Option<&mut DestructuringErrors>,
    ) -> PResult<Vec<Option<Expression>>> {
        let mut elements = Vec::new();
        let mut first = true;
        while !self.eat(close)? {
            if first {
                first = false;
            } else {
                self.expect(TokenKind::Comma)?;
                if allow_trailing_comma && self.after_trailing_comma(close, false)? {
                    break;
                }
            }
            let element = if allow_empty && self.kind() == TokenKind::Comma {
                None
            } else if self.kind() == TokenKind::Ellipsis {
                let spread = self.parse_spread(errors.as_deref_mut())?;
                if self.kind() == TokenKind::Comma
                    && let Some(errors) = errors.as_deref_mut()
                    && errors.trailing_comma.is_none()
                {
                    errors.trailing_comma = Some(self.lexer.start);
                }
                Some(Expression::Spread(spread))
            } else {
                Some(self.parse_maybe_assign(InitMode::None, errors.as_deref_mut())?)
            };
            elements.push(element);
        }
        Ok(elements)
    }

    fn parse_spread(&mut self, errors: Option<&mut DestructuringErrors>) -> PResult<SpreadElement> {
        let start = self.start_node();
        self.next()?;
        let argument = self.parse_maybe_assign(InitMode::None, errors)?;
        Ok(SpreadElement {
            span: self.finish_span(start),
            argument: Box::new(argument),
        })
    }

    // ============ ATOMS ============

    /// Identifier, literal, `this`, grouping, array or object literal,
    /// function, class, template, `new` or `import`
    fn parse_expr_atom(
        &mut self,
        errors: Option<&mut DestructuringErrors>,
        init: InitMode,
        for_new: bool,
    ) -> PResult<Expression> {
        self.nested(|p| p.parse_atom_level(errors, init, for_new))
    }

    fn parse_atom_level(
        &mut self,
        errors: Option<&mut DestructuringErrors>,
        init: InitMode,
        for_new: bool,
    ) -> PResult<Expression> {
        if let Some(mut ext) = self.expr_atom_ext.take() {
            let result = ext.parse_expr_atom(self);
            self.expr_atom_ext = Some(ext);
            if let Some(result) = result {
                return result;
            }
        }
        if matches!(self.kind(), TokenKind::Slash | TokenKind::SlashEq) {
            self.lexer.pos = self.lexer.start + 1;
            self.lexer.read_regexp()?;
        }
        let can_be_arrow = self.potential_arrow_at == Some(self.lexer.start);
        let start = self.start_node();
        match self.kind() {
            TokenKind::Super => {
                if !self.scope.allow_super() {
                    return Err(self.raise(start.pos, "'super' keyword outside a method"));
                }
                self.next()?;
                if self.kind() == TokenKind::ParenL && !self.scope.allow_direct_super() {
                    return Err(self.raise(
                        start.pos,
                        "super() call outside constructor of a subclass",
                    ));
                }
                if !matches!(
                    self.kind(),
                    TokenKind::Dot | TokenKind::BracketL | TokenKind::ParenL
                ) {
                    return Err(self.unexpected(None));
                }
                Ok(Expression::Super(Super {
                    span: self.finish_span(start),
                }))
            }
            TokenKind::This => {
                self.next()?;
                Ok(Expression::This(ThisExpression {
                    span: self.finish_span(start),
                }))
            }
            TokenKind::Name => self.parse_name_atom(start, can_be_arrow, init),
            TokenKind::Num | TokenKind::String | TokenKind::Regexp => self.parse_literal(),
            TokenKind::Null | TokenKind::True | TokenKind::False => {
                let kind = self.kind();
                let value = match kind {
                    TokenKind::Null => LiteralValue::Null,
                    _ => LiteralValue::Boolean(kind == TokenKind::True),
                };
                let raw = kind.label().to_string();
                self.next()?;
                Ok(Expression::Literal(Box::new(Literal {
                    span: self.finish_span(start),
                    value,
                    raw,
                    regex: None,
                    bigint: None,
                })))
            }
            TokenKind::ParenL => {
                let expr = self.parse_paren_and_distinguish(can_be_arrow, init)?;
                if let Some(errors) = errors {
                    if errors.parenthesized_assign.is_none() && !is_simple_assign_target(&expr) {
                        errors.parenthesized_assign = Some(start.pos);
                    }
                    if errors.parenthesized_bind.is_none() {
                        errors.parenthesized_bind = Some(start.pos);
                    }
                }
                Ok(expr)
            }
            TokenKind::BracketL => {
                self.next()?;
                let elements = self.parse_expr_list(TokenKind::BracketR, true, true, errors)?;
                Ok(Expression::Array(ArrayExpression {
                    span: self.finish_span(start),
                    elements,
                }))
            }
            TokenKind::BraceL => {
                self.lexer.override_context(TokContext::BExpr);
                self.parse_object_expression(errors)
            }
            TokenKind::Function => {
                self.next()?;
                let function =
                    self.parse_function(start, super::statement::FunctionContext::empty(), false)?;
                Ok(Expression::Function(Box::new(FunctionExpression { function })))
            }
            TokenKind::Class => {
                let class = self.parse_class(super::statement::ClassContext::Expression)?;
                Ok(Expression::Class(Box::new(crate::ast::ClassExpression { class })))
            }
            TokenKind::New => self.parse_new(),
            TokenKind::BackQuote => Ok(Expression::Template(self.parse_template(false)?)),
            TokenKind::Import if self.ecma() >= 11 => self.parse_expr_import(for_new),
            _ => Err(self.unexpected(None)),
        }
    }

    /// Identifier, `async function`, or a single-parameter arrow
    fn parse_name_atom(
        &mut self,
        start: NodeStart,
        can_be_arrow: bool,
        init: InitMode,
    ) -> PResult<Expression> {
        let contains_esc = self.lexer.contains_esc;
        let id = self.parse_ident(false)?;
        if self.ecma() >= 8
            && !contains_esc
            && id.name == "async"
            && !self.can_insert_semicolon()
            && self.eat(TokenKind::Function)?
        {
            self.lexer.override_context(TokContext::FExpr);
            let function =
                self.parse_function(start, super::statement::FunctionContext::empty(), true)?;
            return Ok(Expression::Function(Box::new(FunctionExpression { function })));
        }
        if can_be_arrow && !self.can_insert_semicolon() {
            if self.eat(TokenKind::Arrow)? {
                let params = vec![Some(Expression::Identifier(id))];
                return self.parse_arrow_expression(start, params, None, false, init);
            }
            if self.ecma() >= 8
                && id.name == "async"
                && self.kind() == TokenKind::Name
                && !contains_esc
                && (!self.potential_arrow_in_for_await
                    || self.value_str() != "of"
                    || self.lexer.contains_esc)
            {
                let param = self.parse_ident(false)?;
                if self.can_insert_semicolon() || !self.eat(TokenKind::Arrow)? {
                    return Err(self.unexpected(None));
                }
                let params = vec![Some(Expression::Identifier(param))];
                return self.parse_arrow_expression(start, params, None, true, init);
            }
        }
        Ok(Expression::Identifier(id))
    }

    /// Number, string, bigint or regexp literal at the current token
    pub(super) fn parse_literal(&mut self) -> PResult<Expression> {
        let start = self.start_node();
        let raw = self.lexer.slice(self.lexer.start, self.lexer.end).to_string();
        let (value, bigint, regex) = match &self.lexer.value {
            TokenValue::Number(n) => (LiteralValue::Number(*n), None, None),
            TokenValue::String(s) => (LiteralValue::String(s.clone()), None, None),
            TokenValue::BigInt(digits) => {
                let decimal = bigint_to_decimal(digits);
                (LiteralValue::BigInt(decimal.clone()), Some(decimal), None)
            }
            TokenValue::RegExp { pattern, flags } => (
                LiteralValue::RegExp,
                None,
                Some(RegExpLiteral {
                    pattern: pattern.clone(),
                    flags: flags.clone(),
                }),
            ),
            _ => return Err(self.unexpected(None)),
        };
        self.next()?;
        Ok(Expression::Literal(Box::new(Literal {
            span: self.finish_span(start),
            value,
            raw,
            regex,
            bigint,
        })))
    }

    /// `( ... )`: a grouping or the parameter list of an arrow function
    fn parse_paren_and_distinguish(
        &mut self,
        can_be_arrow: bool,
        init: InitMode,
    ) -> PResult<Expression> {
        let start = self.start_node();
        if self.ecma() < 6 {
            self.expect(TokenKind::ParenL)?;
            let expr = self.parse_expression(InitMode::None, None)?;
            self.expect(TokenKind::ParenR)?;
            return Ok(expr);
        }
        let allow_trailing_comma = self.ecma() >= 8;
        self.next()?;
        let inner_start = self.start_node();
        let mut exprs = Vec::new();
        let mut rest: Option<RestElement> = None;
        let mut first = true;
        let mut last_is_comma = false;
        let mut spread_start = None;
        let mut errors = DestructuringErrors::default();
        let old_yield_pos = self.yield_pos.take();
        let old_await_pos = self.await_pos.take();
        // await_ident_pos is kept so awaits nested in parameters are seen
        while self.kind() != TokenKind::ParenR {
            if first {
                first = false;
            } else {
                self.expect(TokenKind::Comma)?;
            }
            if allow_trailing_comma && self.after_trailing_comma(TokenKind::ParenR, true)? {
                last_is_comma = true;
                break;
            }
            if self.kind() == TokenKind::Ellipsis {
                spread_start = Some(self.lexer.start);
                rest = Some(self.parse_rest_binding()?);
                if self.kind() == TokenKind::Comma {
                    return Err(self.raise_recoverable(
                        self.lexer.start,
                        "Comma is not permitted after the rest element",
                    ));
                }
                break;
            }
            exprs.push(self.parse_maybe_assign(InitMode::None, Some(&mut errors))?);
        }
        let inner_end = self.lexer.last_tok_end;
        let inner_end_loc = self.lexer.last_tok_end_loc;
        self.expect(TokenKind::ParenR)?;

        if can_be_arrow && !self.can_insert_semicolon() && self.eat(TokenKind::Arrow)? {
            self.check_pattern_errors(Some(&errors), false)?;
            self.check_yield_await_in_default_params()?;
            self.yield_pos = old_yield_pos;
            self.await_pos = old_await_pos;
            let params = exprs.into_iter().map(Some).collect();
            return self.parse_arrow_expression(start, params, rest, false, init);
        }

        if exprs.is_empty() || last_is_comma {
            return Err(self.unexpected(Some(self.lexer.last_tok_start)));
        }
        if let Some(pos) = spread_start {
            return Err(self.unexpected(Some(pos)));
        }
        self.check_expression_errors(Some(&errors))?;
        self.yield_pos = old_yield_pos.or(self.yield_pos);
        self.await_pos = old_await_pos.or(self.await_pos);

        if exprs.len() == 1
            && let Some(expr) = exprs.pop()
        {
            return Ok(expr);
        }
        Ok(Expression::Sequence(SequenceExpression {
            span: self.finish_span_at(inner_start, inner_end, inner_end_loc),
            expressions: exprs,
        }))
    }

    // ============ FUNCTIONS ============

    /// Arrow function whose parameters were parsed as expressions
    fn parse_arrow_expression(
        &mut self,
        start: NodeStart,
        params: Vec<Option<Expression>>,
        rest: Option<RestElement>,
        is_async: bool,
        init: InitMode,
    ) -> PResult<Expression> {
        let old_yield_pos = self.yield_pos.take();
        let old_await_pos = self.await_pos.take();
        let old_await_ident_pos = self.await_ident_pos.take();
        self.enter_scope(ScopeFlags::function(is_async, false) | ScopeFlags::ARROW);
        let mut params: Vec<Pattern> = self
            .to_assignable_list(params, true)?
            .into_iter()
            .flatten()
            .collect();
        if let Some(rest) = rest {
            params.push(Pattern::Rest(rest));
        }
        let body = if self.kind() == TokenKind::BraceL {
            ArrowBody::Block(self.parse_function_body(&params, None, start.pos, true, false)?)
        } else {
            let body = self.parse_maybe_assign(init, None)?;
            self.check_params(&params, false)?;
            self.exit_scope();
            ArrowBody::Expression(Box::new(body))
        };
        let expression = matches!(body, ArrowBody::Expression(_));
        self.yield_pos = old_yield_pos;
        self.await_pos = old_await_pos;
        self.await_ident_pos = old_await_ident_pos;
        Ok(Expression::Arrow(Box::new(ArrowFunctionExpression {
            span: self.finish_span(start),
            id: None,
            expression,
            generator: false,
            is_async: is_async && self.ecma() >= 8,
            params,
            body,
        })))
    }

    /// Parse a function's block body, handle its `"use strict"` directive
    /// and validate its parameters. Leaves the function scope.
    pub(super) fn parse_function_body(
        &mut self,
        params: &[Pattern],
        id: Option<&Identifier>,
        start: usize,
        is_arrow: bool,
        is_method: bool,
    ) -> PResult<BlockStatement> {
        let old_strict = self.strict();
        let simple = is_simple_param_list(params);
        let non_simple = self.ecma() >= 7 && !simple;
        let mut use_strict = false;
        if !old_strict || non_simple {
            use_strict = self.strict_directive(self.lexer.end);
            if use_strict && non_simple {
                return Err(self.raise_recoverable(
                    start,
                    "Illegal 'use strict' directive in function with non-simple parameter list",
                ));
            }
        }
        let old_labels = std::mem::take(&mut self.labels);
        if use_strict {
            self.lexer.strict = true;
        }
        let allow_duplicates = !old_strict && !use_strict && !is_arrow && !is_method && simple;
        self.check_params(params, allow_duplicates)?;
        if self.strict()
            && let Some(id) = id
        {
            self.check_lval_simple(&Pattern::Identifier(id.clone()), BindingKind::Outside, None)?;
        }
        let mut body = self.parse_block(false, use_strict && !old_strict)?;
        self.adapt_directive_prologue(&mut body.body);
        self.labels = old_labels;
        self.exit_scope();
        Ok(body)
    }

    fn check_params(&mut self, params: &[Pattern], allow_duplicates: bool) -> PResult<()> {
        let mut names = FxHashSet::default();
        for param in params {
            let clashes = if allow_duplicates { None } else { Some(&mut names) };
            self.check_lval_inner_pattern(param, BindingKind::Var, clashes)?;
        }
        Ok(())
    }

    /// Method value starting at its parameter list
    pub(super) fn parse_method(
        &mut self,
        generator: bool,
        is_async: bool,
        allow_direct_super: bool,
    ) -> PResult<FunctionExpression> {
        let start = self.start_node();
        let old_yield_pos = self.yield_pos.take();
        let old_await_pos = self.await_pos.take();
        let old_await_ident_pos = self.await_ident_pos.take();
        let generator = generator && self.ecma() >= 6;
        let is_async = is_async && self.ecma() >= 8;
        let mut flags = ScopeFlags::function(is_async, generator) | ScopeFlags::SUPER;
        if allow_direct_super {
            flags |= ScopeFlags::DIRECT_SUPER;
        }
        self.enter_scope(flags);
        self.expect(TokenKind::ParenL)?;
        let params: Vec<Pattern> = self
            .parse_binding_list(TokenKind::ParenR, false, self.ecma() >= 8)?
            .into_iter()
            .flatten()
            .collect();
        self.check_yield_await_in_default_params()?;
        let body = self.parse_function_body(&params, None, start.pos, false, true)?;
        self.yield_pos = old_yield_pos;
        self.await_pos = old_await_pos;
        self.await_ident_pos = old_await_ident_pos;
        Ok(FunctionExpression {
            function: Function {
                span: self.finish_span(start),
                id: None,
                expression: false,
                generator,
                is_async,
                params,
                body,
            },
        })
    }

    // ============ NEW AND IMPORT ============

    fn parse_new(&mut self) -> PResult<Expression> {
        let start = self.start_node();
        self.next()?;
        if self.ecma() >= 6 && self.kind() == TokenKind::Dot {
            let meta = Identifier {
                span: self.finish_span(start),
                name: "new".to_string(),
            };
            self.next()?;
            let contains_esc = self.lexer.contains_esc;
            let property = self.parse_ident(true)?;
            if property.name != "target" {
                return Err(self.raise_recoverable(
                    property.span.start,
                    "The only valid meta property for new is 'new.target'",
                ));
            }
            if contains_esc {
                return Err(self.raise_recoverable(
                    start.pos,
                    "'new.target' must not contain escaped characters",
                ));
            }
            if !self.scope.allow_new_dot_target() {
                return Err(self.raise_recoverable(
                    start.pos,
                    "'new.target' can only be used in functions and class static block",
                ));
            }
            return Ok(Expression::MetaProperty(Box::new(MetaProperty {
                span: self.finish_span(start),
                meta,
                property,
            })));
        }
        let callee_start = self.start_node();
        let atom = self.parse_expr_atom(None, InitMode::None, true)?;
        let callee = self.parse_subscripts(atom, callee_start, true, InitMode::None)?;
        let arguments = if self.eat(TokenKind::ParenL)? {
            self.parse_expr_list(TokenKind::ParenR, self.ecma() >= 8, false, None)?
                .into_iter()
                .flatten()
                .collect()
        } else {
            Vec::new()
        };
        Ok(Expression::New(NewExpression {
            span: self.finish_span(start),
            callee: Box::new(callee),
            arguments,
        }))
    }

    /// `import(...)` or `import.meta`
    fn parse_expr_import(&mut self, for_new: bool) -> PResult<Expression> {
        let start = self.start_node();
        self.next()?;
        match self.kind() {
            TokenKind::ParenL if !for_new => self.parse_dynamic_import(start),
            TokenKind::Dot => {
                let meta = Identifier {
                    span: self.finish_span(start),
                    name: "import".to_string(),
                };
                self.parse_import_meta(start, meta)
            }
            _ => Err(self.unexpected(None)),
        }
    }

    fn parse_dynamic_import(&mut self, start: NodeStart) -> PResult<Expression> {
        self.next()?;
        let source = self.parse_maybe_assign(InitMode::None, None)?;
        let mut options = None;
        if self.ecma() >= 16 {
            if !self.eat(TokenKind::ParenR)? {
                self.expect(TokenKind::Comma)?;
                if !self.after_trailing_comma(TokenKind::ParenR, false)? {
                    options = Some(Box::new(self.parse_maybe_assign(InitMode::None, None)?));
                    if !self.eat(TokenKind::ParenR)? {
                        self.expect(TokenKind::Comma)?;
                        if !self.after_trailing_comma(TokenKind::ParenR, false)? {
                            return Err(self.unexpected(None));
                        }
                    }
                }
            }
        } else if !self.eat(TokenKind::ParenR)? {
            let error_pos = self.lexer.start;
            if self.eat(TokenKind::Comma)? && self.eat(TokenKind::ParenR)? {
                return Err(self.raise_recoverable(
                    error_pos,
                    "Trailing comma is not allowed in import()",
                ));
            }
            return Err(self.unexpected(Some(error_pos)));
        }
        Ok(Expression::Import(ImportExpression {
            span: self.finish_span(start),
            source: Box::new(source),
            options,
        }))
    }

    fn parse_import_meta(&mut self, start: NodeStart, meta: Identifier) -> PResult<Expression> {
        self.next()?;
        let contains_esc = self.lexer.contains_esc;
        let property = self.parse_ident(true)?;
        if property.name != "meta" {
            return Err(self.raise_recoverable(
                property.span.start,
                "The only valid meta property for import is 'import.meta'",
            ));
        }
        if contains_esc {
            return Err(self.raise_recoverable(
                start.pos,
                "'import.meta' must not contain escaped characters",
            ));
        }
        let options = self.lexer.options();
        if !options.is_module() && !options.allow_import_export_everywhere {
            return Err(self.raise_recoverable(
                start.pos,
                "Cannot use 'import.meta' outside a module",
            ));
        }
        Ok(Expression::MetaProperty(Box::new(MetaProperty {
            span: self.finish_span(start),
            meta,
            property,
        })))
    }

    // ============ TEMPLATES ============

    fn parse_template_element(&mut self, is_tagged: bool) -> PResult<TemplateElement> {
        let start = self.start_node();
        let raw = normalize_line_endings(self.lexer.slice(self.lexer.start, self.lexer.end));
        let cooked = match (self.kind(), &self.lexer.value) {
            (TokenKind::InvalidTemplate, _) => {
                if !is_tagged {
                    return Err(self.raise_recoverable(
                        self.lexer.start,
                        "Bad escape sequence in untagged template literal",
                    ));
                }
                None
            }
            (TokenKind::Template, TokenValue::String(cooked)) => Some(cooked.clone()),
            _ => return Err(self.unexpected(None)),
        };
        self.next()?;
        let tail = self.kind() == TokenKind::BackQuote;
        Ok(TemplateElement {
            span: self.finish_span(start),
            value: TemplateElementValue { raw, cooked },
            tail,
        })
    }

    pub(super) fn parse_template(&mut self, is_tagged: bool) -> PResult<TemplateLiteral> {
        let start = self.start_node();
        self.next()?;
        let mut expressions = Vec::new();
        let mut element = self.parse_template_element(is_tagged)?;
        let mut tail = element.tail;
        let mut quasis = vec![element];
        while !tail {
            if self.kind() == TokenKind::Eof {
                return Err(self.raise(self.lexer.pos, "Unterminated template literal"));
            }
            self.expect(TokenKind::DollarBraceL)?;
            expressions.push(self.parse_expression(InitMode::None, None)?);
            self.expect(TokenKind::BraceR)?;
            element = self.parse_template_element(is_tagged)?;
            tail = element.tail;
            quasis.push(element);
        }
        self.next()?;
        Ok(TemplateLiteral {
            span: self.finish_span(start),
            expressions,
            quasis,
        })
    }

    // ============ OBJECT LITERALS ============

    fn parse_object_expression(
        &mut self,
        mut errors: Option<&mut DestructuringErrors>,
    ) -> PResult<Expression> {
        let start = self.start_node();
        self.next()?;
        let mut properties = Vec::new();
        let mut names = PropertyNames::default();
        let mut first = true;
        while !self.eat(TokenKind::BraceR)? {
            if first {
                first = false;
            } else {
                self.expect(TokenKind::Comma)?;
                if self.ecma() >= 5 && self.after_trailing_comma(TokenKind::BraceR, false)? {
                    break;
                }
            }
            let member = self.parse_property(errors.as_deref_mut())?;
            if let ObjectMember::Property(prop) = &member {
                self.check_prop_clash(prop, &mut names, errors.as_deref_mut())?;
            }
            properties.push(member);
        }
        Ok(Expression::Object(ObjectExpression {
            span: self.finish_span(start),
            properties,
        }))
    }

    fn parse_property(
        &mut self,
        mut errors: Option<&mut DestructuringErrors>,
    ) -> PResult<ObjectMember> {
        let start = self.start_node();
        if self.ecma() >= 9 && self.eat(TokenKind::Ellipsis)? {
            let argument = self.parse_maybe_assign(InitMode::None, errors.as_deref_mut())?;
            if self.kind() == TokenKind::Comma
                && let Some(errors) = errors.as_deref_mut()
                && errors.trailing_comma.is_none()
            {
                errors.trailing_comma = Some(self.lexer.start);
            }
            return Ok(ObjectMember::Spread(SpreadElement {
                span: self.finish_span(start),
                argument: Box::new(argument),
            }));
        }
        let mut generator = self.ecma() >= 6 && self.eat(TokenKind::Star)?;
        let contains_esc = self.lexer.contains_esc;
        let (mut key, mut computed) = self.parse_property_name()?;
        let mut is_async = false;
        if !contains_esc && self.ecma() >= 8 && !generator && self.is_async_prop(&key, computed) {
            is_async = true;
            generator = self.ecma() >= 9 && self.eat(TokenKind::Star)?;
            (key, computed) = self.parse_property_name()?;
        }

        if (generator || is_async) && self.kind() == TokenKind::Colon {
            return Err(self.unexpected(None));
        }
        let mut method = false;
        let mut shorthand = false;
        let mut kind = PropertyKind::Init;
        let value = if self.eat(TokenKind::Colon)? {
            self.parse_maybe_assign(InitMode::None, errors)?
        } else if self.ecma() >= 6 && self.kind() == TokenKind::ParenL {
            method = true;
            Expression::Function(Box::new(self.parse_method(generator, is_async, false)?))
        } else if let Some(accessor) = self.accessor_kind(&key, computed, contains_esc) {
            if generator || is_async {
                return Err(self.unexpected(None));
            }
            kind = accessor;
            (key, computed) = self.parse_property_name()?;
            let value = self.parse_method(false, false, false)?;
            self.check_accessor_params(kind, &value.function)?;
            Expression::Function(Box::new(value))
        } else if let (true, false, Expression::Identifier(id)) =
            (self.ecma() >= 6, computed, &key)
        {
            if generator || is_async {
                return Err(self.unexpected(None));
            }
            self.check_unreserved(id)?;
            if id.name == "await" && self.await_ident_pos.is_none() {
                self.await_ident_pos = Some(start.pos);
            }
            shorthand = true;
            match errors {
                Some(errors) if self.kind() == TokenKind::Eq => {
                    if errors.shorthand_assign.is_none() {
                        errors.shorthand_assign = Some(self.lexer.start);
                    }
                    let target = Pattern::Identifier(id.clone());
                    self.next()?;
                    let right = self.parse_maybe_assign(InitMode::None, None)?;
                    Expression::Assignment(AssignmentExpression {
                        span: self.finish_span(start),
                        operator: AssignmentOperator::Assign,
                        left: Box::new(target),
                        right: Box::new(right),
                    })
                }
                _ => Expression::Identifier(id.clone()),
            }
        } else {
            return Err(self.unexpected(None));
        };
        Ok(ObjectMember::Property(Property {
            span: self.finish_span(start),
            method,
            shorthand,
            computed,
            key,
            value,
            kind,
        }))
    }

    /// `get`/`set` followed by a property name starts an accessor
    fn accessor_kind(
        &self,
        key: &Expression,
        computed: bool,
        contains_esc: bool,
    ) -> Option<PropertyKind> {
        if contains_esc || self.ecma() < 5 || computed {
            return None;
        }
        let Expression::Identifier(id) = key else {
            return None;
        };
        if matches!(
            self.kind(),
            TokenKind::Comma | TokenKind::BraceR | TokenKind::Eq
        ) {
            return None;
        }
        match id.name.as_str() {
            "get" => Some(PropertyKind::Get),
            "set" => Some(PropertyKind::Set),
            _ => None,
        }
    }

    pub(super) fn check_accessor_params(
        &self,
        kind: PropertyKind,
        function: &Function,
    ) -> PResult<()> {
        let expected = if kind == PropertyKind::Get { 0 } else { 1 };
        if function.params.len() != expected {
            let message = if kind == PropertyKind::Get {
                "getter should have no params"
            } else {
                "setter should have exactly one param"
            };
            return Err(self.raise_recoverable(function.span.start, message));
        }
        if kind == PropertyKind::Set
            && let Some(Pattern::Rest(rest)) = function.params.first()
        {
            return Err(self.raise_recoverable(rest.span.start, "Setter cannot use rest params"));
        }
        Ok(())
    }

    fn is_async_prop(&self, key: &Expression, computed: bool) -> bool {
        let kind = self.kind();
        !computed
            && matches!(key, Expression::Identifier(id) if id.name == "async")
            && (matches!(
                kind,
                TokenKind::Name | TokenKind::Num | TokenKind::String | TokenKind::BracketL
            ) || kind.keyword().is_some()
                || (self.ecma() >= 9 && kind == TokenKind::Star))
            && !self.line_break_before_current()
    }

    /// Property key: identifier (keywords allowed), string, number or
    /// `[computed]`. Returns the key and whether it was computed.
    pub(super) fn parse_property_name(&mut self) -> PResult<(Expression, bool)> {
        if self.ecma() >= 6 && self.eat(TokenKind::BracketL)? {
            let key = self.parse_maybe_assign(InitMode::None, None)?;
            self.expect(TokenKind::BracketR)?;
            return Ok((key, true));
        }
        let key = match self.kind() {
            TokenKind::Num | TokenKind::String => self.parse_literal()?,
            _ => Expression::Identifier(self.parse_ident(!self.allow_reserved_never)?),
        };
        Ok((key, false))
    }

    fn check_prop_clash(
        &self,
        prop: &Property,
        names: &mut PropertyNames,
        errors: Option<&mut DestructuringErrors>,
    ) -> PResult<()> {
        if self.ecma() >= 6 && (prop.computed || prop.method || prop.shorthand) {
            return Ok(());
        }
        let (name, key_start) = match &prop.key {
            Expression::Identifier(id) => (id.name.clone(), id.span.start),
            Expression::Literal(lit) => (literal_key_name(&lit.value), lit.span.start),
            _ => return Ok(()),
        };
        if self.ecma() >= 6 {
            if name == "__proto__" && prop.kind == PropertyKind::Init {
                if names.proto {
                    match errors {
                        Some(errors) => {
                            if errors.double_proto.is_none() {
                                errors.double_proto = Some(key_start);
                            }
                        }
                        None => {
                            return Err(self.raise_recoverable(
                                key_start,
                                "Redefinition of __proto__ property",
                            ));
                        }
                    }
                }
                names.proto = true;
            }
            return Ok(());
        }
        let strict = self.strict();
        let entry = names.seen.entry(name).or_default();
        let (init, get, set) = *entry;
        let redefinition = match prop.kind {
            PropertyKind::Init => (strict && init) || get || set,
            PropertyKind::Get => init || get,
            PropertyKind::Set => init || set,
        };
        if redefinition {
            return Err(self.raise_recoverable(key_start, "Redefinition of property"));
        }
        match prop.kind {
            PropertyKind::Init => entry.0 = true,
            PropertyKind::Get => entry.1 = true,
            PropertyKind::Set => entry.2 = true,
        }
        Ok(())
    }

    // ============ PRIVATE NAMES ============

    pub(super) fn parse_private_ident(&mut self) -> PResult<PrivateIdentifier> {
        let start = self.start_node();
        if self.kind() != TokenKind::PrivateId {
            return Err(self.unexpected(None));
        }
        let name = self.value_str().to_string();
        self.next()?;
        let span = self.finish_span(start);
        if self.lexer.options().check_private_fields
            && !self.private_names.use_name(&name, span.start)
        {
            return Err(self.raise(
                span.start,
                format!("Private field '#{name}' must be declared in an enclosing class"),
            ));
        }
        Ok(PrivateIdentifier { span, name })
    }
}

fn is_simple_assign_target(expr: &Expression) -> bool {
    matches!(expr, Expression::Identifier(_) | Expression::Member(_))
}

fn is_simple_param_list(params: &[Pattern]) -> bool {
    params.iter().all(|p| matches!(p, Pattern::Identifier(_)))
}

fn is_private_field_access(expr: &Expression) -> bool {
    match expr {
        Expression::Member(member) => matches!(*member.property, Expression::PrivateIdentifier(_)),
        Expression::Chain(chain) => is_private_field_access(&chain.expression),
        _ => false,
    }
}

fn normalize_line_endings(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

/// Property key text as used for duplicate detection
fn literal_key_name(value: &LiteralValue) -> String {
    match value {
        LiteralValue::String(s) => s.clone(),
        LiteralValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e21 => format!("{}", *n as i64),
        LiteralValue::Number(n) => n.to_string(),
        LiteralValue::BigInt(digits) => digits.clone(),
        LiteralValue::Boolean(b) => b.to_string(),
        LiteralValue::Null => "null".to_string(),
        LiteralValue::RegExp => String::new(),
    }
}

/// Convert bigint digits with an optional `0x`/`0o`/`0b` prefix to decimal.
pub(crate) fn bigint_to_decimal(digits: &str) -> String {
    const BASE: u64 = 1_000_000_000;
    let (radix, body) = match digits.get(..2) {
        Some("0x" | "0X") => (16, digits.get(2..).unwrap_or_default()),
        Some("0o" | "0O") => (8, digits.get(2..).unwrap_or_default()),
        Some("0b" | "0B") => (2, digits.get(2..).unwrap_or_default()),
        _ => return digits.to_string(),
    };
    // little-endian limbs in base 10^9
    let mut limbs: Vec<u64> = vec![0];
    for digit in body.chars().filter_map(|ch| ch.to_digit(radix)) {
        let mut carry = u64::from(digit);
        for limb in limbs.iter_mut() {
            let value = *limb * u64::from(radix) + carry;
            *limb = value % BASE;
            carry = value / BASE;
        }
        while carry > 0 {
            limbs.push(carry % BASE);
            carry /= BASE;
        }
    }
    let mut limbs = limbs.iter().rev();
    let mut out = limbs.next().map_or_else(String::new, u64::to_string);
    for limb in limbs {
        out.push_str(&format!("{limb:09}"));
    }
    out
}

fn assignment_operator(kind: TokenKind) -> AssignmentOperator {
    use AssignmentOperator as Op;
    match kind {
        TokenKind::PlusEq => Op::Add,
        TokenKind::MinusEq => Op::Sub,
        TokenKind::StarEq => Op::Mul,
        TokenKind::SlashEq => Op::Div,
        TokenKind::PercentEq => Op::Mod,
        TokenKind::StarStarEq => Op::Exp,
        TokenKind::LtLtEq => Op::LShift,
        TokenKind::GtGtEq => Op::RShift,
        TokenKind::GtGtGtEq => Op::URShift,
        TokenKind::PipeEq => Op::BitOr,
        TokenKind::CaretEq => Op::BitXor,
        TokenKind::AmpEq => Op::BitAnd,
        TokenKind::PipePipeEq => Op::Or,
        TokenKind::AmpAmpEq => Op::And,
        TokenKind::QuestionQuestionEq => Op::Coalesce,
        _ => Op::Assign,
    }
}

fn unary_operator(kind: TokenKind) -> UnaryOperator {
    match kind {
        TokenKind::Minus => UnaryOperator::Minus,
        TokenKind::Plus => UnaryOperator::Plus,
        TokenKind::Bang => UnaryOperator::Not,
        TokenKind::Tilde => UnaryOperator::BitNot,
        TokenKind::Typeof => UnaryOperator::Typeof,
        TokenKind::Void => UnaryOperator::Void,
        _ => UnaryOperator::Delete,
    }
}

fn logical_operator(kind: TokenKind) -> Option<LogicalOperator> {
    match kind {
        TokenKind::PipePipe => Some(LogicalOperator::Or),
        TokenKind::AmpAmp => Some(LogicalOperator::And),
        TokenKind::QuestionQuestion => Some(LogicalOperator::Coalesce),
        _ => None,
    }
}

fn binary_operator(kind: TokenKind) -> Option<BinaryOperator> {
    use BinaryOperator as Op;
    Some(match kind {
        TokenKind::EqEq => Op::Eq,
        TokenKind::NotEq => Op::NotEq,
        TokenKind::EqEqEq => Op::StrictEq,
        TokenKind::NotEqEq => Op::StrictNotEq,
        TokenKind::Lt => Op::Lt,
        TokenKind::LtEq => Op::LtEq,
        TokenKind::Gt => Op::Gt,
        TokenKind::GtEq => Op::GtEq,
        TokenKind::LtLt => Op::LShift,
        TokenKind::GtGt => Op::RShift,
        TokenKind::GtGtGt => Op::URShift,
        TokenKind::Plus => Op::Add,
        TokenKind::Minus => Op::Sub,
        TokenKind::Star => Op::Mul,
        TokenKind::Slash => Op::Div,
        TokenKind::Percent => Op::Mod,
        TokenKind::StarStar => Op::Exp,
        TokenKind::Pipe => Op::BitOr,
        TokenKind::Caret => Op::BitXor,
        TokenKind::Amp => Op::BitAnd,
        TokenKind::In => Op::In,
        TokenKind::Instanceof => Op::Instanceof,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Statement;
    use crate::options::Options;

    fn expr(source: &str) -> Expression {
        let program = Parser::new(source, Options::default()).parse().unwrap();
        match program.body.into_iter().next() {
            Some(Statement::Expression(stmt)) => stmt.expression,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    fn err(source: &str) -> String {
        Parser::new(source, Options::default())
            .parse()
            .unwrap_err()
            .message
    }

    #[test]
    fn test_precedence() {
        let Expression::Binary(add) = expr("1 + 2 * 3") else {
            panic!("expected binary");
        };
        assert_eq!(add.operator, BinaryOperator::Add);
        assert!(matches!(
            *add.right,
            Expression::Binary(ref mul) if mul.operator == BinaryOperator::Mul
        ));
    }

    #[test]
    fn test_exponent_is_right_associative() {
        let Expression::Binary(outer) = expr("2 ** 3 ** 2") else {
            panic!("expected binary");
        };
        assert!(matches!(*outer.left, Expression::Literal(_)));
        assert!(matches!(*outer.right, Expression::Binary(_)));
        assert_eq!(err("-2 ** 2"), "Unexpected token");
    }

    #[test]
    fn test_coalesce_mixing() {
        assert!(matches!(expr("a ?? b"), Expression::Logical(_)));
        assert_eq!(
            err("a ?? b || c"),
            "Logical expressions and coalesce expressions cannot be mixed. \
             Wrap either by parentheses"
        );
        assert!(matches!(expr("(a ?? b) || c"), Expression::Logical(_)));
    }

    #[test]
    fn test_optional_chain_wrapping() {
        let Expression::Chain(chain) = expr("a?.b.c()") else {
            panic!("expected chain");
        };
        assert!(matches!(*chain.expression, Expression::Call(_)));
        assert!(matches!(expr("(a?.b).c"), Expression::Member(_)));
        assert_eq!(
            err("new a?.b()"),
            "Optional chaining cannot appear in the callee of new expressions"
        );
    }

    #[test]
    fn test_arrow_functions() {
        let Expression::Arrow(arrow) = expr("(a, {b}, ...c) => a") else {
            panic!("expected arrow");
        };
        assert_eq!(arrow.params.len(), 3);
        assert!(arrow.expression);
        let Expression::Arrow(arrow) = expr("async x => { await x }") else {
            panic!("expected async arrow");
        };
        assert!(arrow.is_async);
        assert!(!arrow.expression);
        assert!(matches!(expr("async(x)"), Expression::Call(_)));
    }

    #[test]
    fn test_sequence_span_excludes_parens() {
        let Expression::Sequence(seq) = expr("(a, b)") else {
            panic!("expected sequence");
        };
        assert_eq!((seq.span.start, seq.span.end), (1, 5));
    }

    #[test]
    fn test_shorthand_default_outside_pattern() {
        assert_eq!(
            err("({a = 1})"),
            "Shorthand property assignments are valid only in destructuring patterns"
        );
        assert!(matches!(expr("({a = 1} = b)"), Expression::Assignment(_)));
    }

    #[test]
    fn test_duplicate_proto() {
        assert_eq!(err("({__proto__: 1, __proto__: 2})"), "Redefinition of __proto__ property");
        assert!(matches!(expr("({__proto__: a, __proto__: b} = c)"), Expression::Assignment(_)));
    }

    #[test]
    fn test_template_literal() {
        let Expression::Template(tpl) = expr("`a${b}c`") else {
            panic!("expected template");
        };
        assert_eq!(tpl.quasis.len(), 2);
        assert_eq!(tpl.quasis[0].value.cooked.as_deref(), Some("a"));
        assert!(tpl.quasis[1].tail);
        assert_eq!(err("`\\u{`"), "Bad escape sequence in untagged template literal");
        let Expression::TaggedTemplate(tagged) = expr("t`\\u{`") else {
            panic!("expected tagged template");
        };
        assert_eq!(tagged.quasi.quasis[0].value.cooked, None);
        assert_eq!(tagged.quasi.quasis[0].value.raw, "\\u{");
    }

    #[test]
    fn test_literals() {
        let Expression::Literal(lit) = expr("0x1Fn") else {
            panic!("expected literal");
        };
        assert_eq!(lit.bigint.as_deref(), Some("31"));
        assert_eq!(lit.raw, "0x1Fn");
        let Expression::Literal(lit) = expr("/a+/gi") else {
            panic!("expected regexp");
        };
        assert_eq!(lit.regex.as_ref().map(|r| r.flags.as_str()), Some("gi"));
    }

    #[test]
    fn test_bigint_to_decimal() {
        assert_eq!(bigint_to_decimal("123"), "123");
        assert_eq!(bigint_to_decimal("0b1010"), "10");
        assert_eq!(bigint_to_decimal("0o777"), "511");
        assert_eq!(bigint_to_decimal("0xFFFFFFFFFFFFFFFFFFFF"), "1208925819614629174706175");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(err("({get a(x) {}})"), "getter should have no params");
        assert_eq!(err("({set a() {}})"), "setter should have exactly one param");
        assert_eq!(err("({set a(...x) {}})"), "Setter cannot use rest params");
        let Expression::Object(obj) = expr("({get, set: 1, get a() {}})") else {
            panic!("expected object");
        };
        assert_eq!(obj.properties.len(), 3);
    }

    #[test]
    fn test_meta_properties() {
        assert_eq!(
            err("new.target"),
            "'new.target' can only be used in functions and class static block"
        );
        assert_eq!(err("import.meta"), "Cannot use 'import.meta' outside a module");
        let program = Parser::new("import.meta.url", Options::module()).parse().unwrap();
        assert_eq!(program.body.len(), 1);
    }

    #[test]
    fn test_delete_checks() {
        assert_eq!(err("'use strict'; delete x"), "Deleting local variable in strict mode");
        assert!(matches!(expr("delete x.y"), Expression::Unary(_)));
    }

    #[test]
    fn test_yield_outside_generator_is_identifier() {
        let Expression::Binary(div) = expr("yield / 2") else {
            panic!("expected division");
        };
        assert!(matches!(*div.left, Expression::Identifier(ref id) if id.name == "yield"));
    }

    #[test]
    fn test_dynamic_import() {
        let Expression::Import(import) = expr("import('a', { with: {} })") else {
            panic!("expected import");
        };
        assert!(import.options.is_some());
    }
}
