//! Assignment targets and binding patterns

use rustc_hash::FxHashSet;

use super::{DestructuringErrors, Parser};
use crate::ast::{
    ArrayPattern, AssignmentPattern, AssignmentProperty, Expression, Identifier, ObjectMember,
    ObjectPattern, ObjectPatternMember, Pattern, PropertyKind, RestElement,
};
use crate::error::PResult;
use crate::lexer::TokenKind;
use crate::parser::NodeStart;
use crate::scope::BindingKind;

impl<'a> Parser<'a> {
    /// Convert an expression that turned out to be the left side of `=`,
    /// a `for-in/of` head or an arrow parameter into a pattern.
    pub(super) fn to_assignable(
        &mut self,
        expr: Expression,
        is_binding: bool,
        errors: Option<&mut DestructuringErrors>,
    ) -> PResult<Pattern> {
        if self.ecma() < 6 {
            self.check_pattern_errors(errors.as_deref(), true)?;
            return match expr {
                Expression::Identifier(id) => Ok(Pattern::Identifier(id)),
                Expression::Member(member) => Ok(Pattern::Member(member)),
                other => Err(self.raise(other.span().start, "Assigning to rvalue")),
            };
        }
        match expr {
            Expression::Identifier(id) => {
                self.check_async_await_target(&id)?;
                Ok(Pattern::Identifier(id))
            }
            Expression::Object(object) => {
                self.check_pattern_errors(errors.as_deref(), true)?;
                let mut properties = Vec::with_capacity(object.properties.len());
                for member in object.properties {
                    match member {
                        ObjectMember::Property(prop) => {
                            if prop.kind != PropertyKind::Init {
                                return Err(self.raise(
                                    prop.key.span().start,
                                    "Object pattern can't contain getter or setter",
                                ));
                            }
                            let value = self.to_assignable(prop.value, is_binding, None)?;
                            properties.push(ObjectPatternMember::Property(AssignmentProperty {
                                span: prop.span,
                                method: prop.method,
                                shorthand: prop.shorthand,
                                computed: prop.computed,
                                key: prop.key,
                                value,
                                kind: PropertyKind::Init,
                            }));
                        }
                        ObjectMember::Spread(spread) => {
                            let argument = self.to_assignable(*spread.argument, is_binding, None)?;
                            if matches!(argument, Pattern::Array(_) | Pattern::Object(_)) {
                                return Err(self.unexpected(Some(argument.span().start)));
                            }
                            if let Pattern::Assignment(default) = &argument {
                                return Err(self.raise(
                                    default.span.start,
                                    "Rest elements cannot have a default value",
                                ));
                            }
                            properties.push(ObjectPatternMember::Rest(RestElement {
                                span: spread.span,
                                argument: Box::new(argument),
                            }));
                        }
                    }
                }
                Ok(Pattern::Object(ObjectPattern {
                    span: object.span,
                    properties,
                }))
            }
            Expression::Array(array) => {
                self.check_pattern_errors(errors.as_deref(), true)?;
                let elements = self.to_assignable_list(array.elements, is_binding)?;
                Ok(Pattern::Array(ArrayPattern {
                    span: array.span,
                    elements,
                }))
            }
            Expression::Spread(spread) => {
                let argument = self.to_assignable(*spread.argument, is_binding, None)?;
                if let Pattern::Assignment(default) = &argument {
                    return Err(self.raise(
                        default.span.start,
                        "Rest elements cannot have a default value",
                    ));
                }
                Ok(Pattern::Rest(RestElement {
                    span: spread.span,
                    argument: Box::new(argument),
                }))
            }
            Expression::Assignment(assign) => {
                if assign.operator != crate::ast::AssignmentOperator::Assign {
                    return Err(self.raise(
                        assign.left.span().end,
                        "Only '=' operator can be used for specifying default value.",
                    ));
                }
                let left = self.recheck_pattern(*assign.left, is_binding)?;
                Ok(Pattern::Assignment(AssignmentPattern {
                    span: assign.span,
                    left: Box::new(left),
                    right: assign.right,
                }))
            }
            Expression::Chain(chain) => Err(self.raise_recoverable(
                chain.span.start,
                "Optional chaining cannot appear in left-hand side",
            )),
            Expression::Member(member) if !is_binding => Ok(Pattern::Member(member)),
            other => Err(self.raise(other.span().start, "Assigning to rvalue")),
        }
    }

    /// Convert array elements. A rest element must come last.
    pub(super) fn to_assignable_list(
        &mut self,
        elements: Vec<Option<Expression>>,
        is_binding: bool,
    ) -> PResult<Vec<Option<Pattern>>> {
        let count = elements.len();
        let mut patterns = Vec::with_capacity(count);
        for (idx, element) in elements.into_iter().enumerate() {
            let Some(element) = element else {
                patterns.push(None);
                continue;
            };
            let pattern = self.to_assignable(element, is_binding, None)?;
            if let Pattern::Rest(rest) = &pattern
                && idx + 1 < count
            {
                return Err(self.raise(
                    rest.span.start,
                    "Comma is not permitted after the rest element",
                ));
            }
            patterns.push(Some(pattern));
        }
        if self.ecma() == 6
            && is_binding
            && let Some(Some(Pattern::Rest(rest))) = patterns.last()
            && !matches!(*rest.argument, Pattern::Identifier(_))
        {
            return Err(self.unexpected(Some(rest.argument.span().start)));
        }
        Ok(patterns)
    }

    /// Re-validate a node that was already parsed as a pattern (the target
    /// of a nested `=` default).
    fn recheck_pattern(&self, pattern: Pattern, is_binding: bool) -> PResult<Pattern> {
        match &pattern {
            Pattern::Identifier(id) => self.check_async_await_target(id)?,
            Pattern::Member(member) if is_binding => {
                return Err(self.raise(member.span.start, "Assigning to rvalue"));
            }
            _ => {}
        }
        Ok(pattern)
    }

    fn check_async_await_target(&self, id: &Identifier) -> PResult<()> {
        if self.scope.in_async() && id.name == "await" {
            return Err(self.raise(
                id.span.start,
                "Cannot use 'await' as identifier inside an async function",
            ));
        }
        Ok(())
    }

    /// Target of a compound assignment: only identifiers and member
    /// expressions qualify.
    pub(super) fn to_simple_target(&mut self, expr: Expression) -> PResult<Pattern> {
        self.check_lval_simple_expr(&expr)?;
        match expr {
            Expression::Identifier(id) => Ok(Pattern::Identifier(id)),
            Expression::Member(member) => Ok(Pattern::Member(member)),
            other => Err(self.raise(other.span().start, "Assigning to rvalue")),
        }
    }

    /// Check the operand of `++`/`--` or a compound assignment.
    pub(super) fn check_lval_simple_expr(&mut self, expr: &Expression) -> PResult<()> {
        match expr {
            Expression::Identifier(id) => self.check_lval_identifier(id, BindingKind::None, None),
            Expression::Member(_) => Ok(()),
            Expression::Chain(chain) => Err(self.raise_recoverable(
                chain.span.start,
                "Optional chaining cannot appear in left-hand side",
            )),
            other => Err(self.raise(other.span().start, "Assigning to rvalue")),
        }
    }

    // ============ LVALUE CHECKS ============

    pub(super) fn declare_name(
        &mut self,
        name: &str,
        kind: BindingKind,
        pos: usize,
    ) -> PResult<()> {
        if self.scope.declare_name(name, kind) {
            return Err(self.raise_recoverable(
                pos,
                format!("Identifier '{name}' has already been declared"),
            ));
        }
        Ok(())
    }

    fn check_lval_identifier(
        &mut self,
        id: &Identifier,
        binding: BindingKind,
        clashes: Option<&mut FxHashSet<String>>,
    ) -> PResult<()> {
        let is_bind = binding != BindingKind::None;
        let Identifier { span, name } = id;
        if self.strict() && self.reserved.is_reserved_strict_bind(name) {
            let verb = if is_bind { "Binding" } else { "Assigning to" };
            return Err(self.raise_recoverable(span.start, format!("{verb} {name} in strict mode")));
        }
        if !is_bind {
            return Ok(());
        }
        if binding == BindingKind::Lexical && name == "let" {
            return Err(self.raise_recoverable(
                span.start,
                "let is disallowed as a lexically bound name",
            ));
        }
        if let Some(clashes) = clashes
            && !clashes.insert(name.clone())
        {
            return Err(self.raise_recoverable(span.start, "Argument name clash"));
        }
        if binding != BindingKind::Outside {
            self.declare_name(name, binding, span.start)?;
        }
        Ok(())
    }

    pub(super) fn check_lval_simple(
        &mut self,
        pattern: &Pattern,
        binding: BindingKind,
        clashes: Option<&mut FxHashSet<String>>,
    ) -> PResult<()> {
        let is_bind = binding != BindingKind::None;
        match pattern {
            Pattern::Identifier(id) => self.check_lval_identifier(id, binding, clashes),
            Pattern::Member(member) if is_bind => {
                Err(self.raise_recoverable(member.span.start, "Binding member expression"))
            }
            Pattern::Member(_) => Ok(()),
            other => {
                let message = if is_bind {
                    "Binding rvalue"
                } else {
                    "Assigning to rvalue"
                };
                Err(self.raise(other.span().start, message))
            }
        }
    }

    /// Check every target inside a pattern, declaring bound names.
    pub(super) fn check_lval_pattern(
        &mut self,
        pattern: &Pattern,
        binding: BindingKind,
        mut clashes: Option<&mut FxHashSet<String>>,
    ) -> PResult<()> {
        match pattern {
            Pattern::Object(object) => {
                for member in &object.properties {
                    match member {
                        ObjectPatternMember::Property(prop) => self.check_lval_inner_pattern(
                            &prop.value,
                            binding,
                            clashes.as_deref_mut(),
                        )?,
                        ObjectPatternMember::Rest(rest) => self.check_lval_pattern(
                            &rest.argument,
                            binding,
                            clashes.as_deref_mut(),
                        )?,
                    }
                }
                Ok(())
            }
            Pattern::Array(array) => {
                for element in array.elements.iter().flatten() {
                    self.check_lval_inner_pattern(element, binding, clashes.as_deref_mut())?;
                }
                Ok(())
            }
            other => self.check_lval_simple(other, binding, clashes),
        }
    }

    pub(super) fn check_lval_inner_pattern(
        &mut self,
        pattern: &Pattern,
        binding: BindingKind,
        clashes: Option<&mut FxHashSet<String>>,
    ) -> PResult<()> {
        match pattern {
            Pattern::Assignment(default) => {
                self.check_lval_pattern(&default.left, binding, clashes)
            }
            Pattern::Rest(rest) => self.check_lval_pattern(&rest.argument, binding, clashes),
            other => self.check_lval_pattern(other, binding, clashes),
        }
    }

    // ============ BINDING PATTERNS ============

    pub(super) fn parse_rest_binding(&mut self) -> PResult<RestElement> {
        let start = self.start_node();
        self.next()?;
        if self.ecma() == 6 && self.kind() != TokenKind::Name {
            return Err(self.unexpected(None));
        }
        let argument = self.parse_binding_atom()?;
        Ok(RestElement {
            span: self.finish_span(start),
            argument: Box::new(argument),
        })
    }

    /// Identifier, or from ES2015 an array or object pattern
    pub(super) fn parse_binding_atom(&mut self) -> PResult<Pattern> {
        self.nested(Self::parse_binding_level)
    }

    fn parse_binding_level(&mut self) -> PResult<Pattern> {
        if self.ecma() >= 6 {
            match self.kind() {
                TokenKind::BracketL => {
                    let start = self.start_node();
                    self.next()?;
                    let elements = self.parse_binding_list(TokenKind::BracketR, true, true)?;
                    return Ok(Pattern::Array(ArrayPattern {
                        span: self.finish_span(start),
                        elements,
                    }));
                }
                TokenKind::BraceL => return self.parse_object_pattern(),
                _ => {}
            }
        }
        Ok(Pattern::Identifier(self.parse_ident(false)?))
    }

    /// Elements up to `close`, which is consumed. Holes are `None`.
    pub(super) fn parse_binding_list(
        &mut self,
        close: TokenKind,
        allow_empty: bool,
        allow_trailing_comma: bool,
    ) -> PResult<Vec<Option<Pattern>>> {
        let mut elements = Vec::new();
        let mut first = true;
        while !self.eat(close)? {
            if first {
                first = false;
            } else {
                self.expect(TokenKind::Comma)?;
            }
            if allow_empty && self.kind() == TokenKind::Comma {
                elements.push(None);
            } else if allow_trailing_comma && self.after_trailing_comma(close, false)? {
                break;
            } else if self.kind() == TokenKind::Ellipsis {
                let rest = self.parse_rest_binding()?;
                elements.push(Some(Pattern::Rest(rest)));
                if self.kind() == TokenKind::Comma {
                    return Err(self.raise_recoverable(
                        self.lexer.start,
                        "Comma is not permitted after the rest element",
                    ));
                }
                self.expect(close)?;
                break;
            } else {
                let start = self.start_node();
                elements.push(Some(self.parse_maybe_default(start, None)?));
            }
        }
        Ok(elements)
    }

    /// A binding target optionally followed by `= default`.
    pub(super) fn parse_maybe_default(
        &mut self,
        start: NodeStart,
        left: Option<Pattern>,
    ) -> PResult<Pattern> {
        let left = match left {
            Some(left) => left,
            None => self.parse_binding_atom()?,
        };
        if self.ecma() < 6 || !self.eat(TokenKind::Eq)? {
            return Ok(left);
        }
        let right = self.parse_maybe_assign(super::InitMode::None, None)?;
        Ok(Pattern::Assignment(AssignmentPattern {
            span: self.finish_span(start),
            left: Box::new(left),
            right: Box::new(right),
        }))
    }

    fn parse_object_pattern(&mut self) -> PResult<Pattern> {
        let start = self.start_node();
        self.next()?;
        let mut properties = Vec::new();
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
            properties.push(self.parse_pattern_property()?);
        }
        Ok(Pattern::Object(ObjectPattern {
            span: self.finish_span(start),
            properties,
        }))
    }

    fn parse_pattern_property(&mut self) -> PResult<ObjectPatternMember> {
        let start = self.start_node();
        if self.ecma() >= 9 && self.eat(TokenKind::Ellipsis)? {
            let argument = self.parse_ident(false)?;
            if self.kind() == TokenKind::Comma {
                return Err(self.raise_recoverable(
                    self.lexer.start,
                    "Comma is not permitted after the rest element",
                ));
            }
            return Ok(ObjectPatternMember::Rest(RestElement {
                span: self.finish_span(start),
                argument: Box::new(Pattern::Identifier(argument)),
            }));
        }
        let (key, computed) = self.parse_property_name()?;
        let (value, shorthand) = if self.eat(TokenKind::Colon)? {
            let value_start = self.start_node();
            (self.parse_maybe_default(value_start, None)?, false)
        } else if let (Expression::Identifier(id), false) = (&key, computed) {
            self.check_unreserved(id)?;
            if id.name == "await" && self.await_ident_pos.is_none() {
                self.await_ident_pos = Some(start.pos);
            }
            let target = Pattern::Identifier(id.clone());
            (self.parse_maybe_default(start, Some(target))?, true)
        } else {
            return Err(self.unexpected(None));
        };
        Ok(ObjectPatternMember::Property(AssignmentProperty {
            span: self.finish_span(start),
            method: false,
            shorthand,
            computed,
            key,
            value,
            kind: PropertyKind::Init,
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Pattern, Statement, VariableKind};
    use crate::options::Options;
    use crate::parser::Parser;

    fn parse_err(source: &str) -> String {
        Parser::new(source, Options::default())
            .parse()
            .unwrap_err()
            .message
    }

    #[test]
    fn test_object_and_array_patterns() {
        let program = Parser::new("let {a, b: [c, , ...d], e = 1} = x;", Options::default())
            .parse()
            .unwrap();
        let Statement::VariableDeclaration(decl) = &program.body[0] else {
            panic!("expected declaration");
        };
        assert_eq!(decl.kind, VariableKind::Let);
        let Pattern::Object(object) = &decl.declarations[0].id else {
            panic!("expected object pattern");
        };
        assert_eq!(object.properties.len(), 3);
    }

    #[test]
    fn test_assignment_destructuring_converts_expression() {
        let program = Parser::new("[a, {b = 2}] = c", Options::default()).parse().unwrap();
        let json = serde_json::to_value(&program).unwrap();
        let left = &json["body"][0]["expression"]["left"];
        assert_eq!(left["type"], "ArrayPattern");
        assert_eq!(left["elements"][1]["type"], "ObjectPattern");
        assert_eq!(left["elements"][1]["properties"][0]["value"]["type"], "AssignmentPattern");
    }

    #[test]
    fn test_rvalue_targets() {
        assert_eq!(parse_err("1 = 2"), "Assigning to rvalue");
        assert_eq!(parse_err("a + b = c"), "Assigning to rvalue");
        assert_eq!(parse_err("a?.b = c"), "Optional chaining cannot appear in left-hand side");
        assert_eq!(parse_err("++f()"), "Assigning to rvalue");
    }

    #[test]
    fn test_binding_errors() {
        assert_eq!(parse_err("let let = 1"), "let is disallowed as a lexically bound name");
        assert_eq!(parse_err("'use strict'; function f(a, a) {}"), "Argument name clash");
        assert_eq!(parse_err("'use strict'; eval = 1"), "Assigning to eval in strict mode");
        assert_eq!(parse_err("let [...a,] = b"), "Comma is not permitted after the rest element");
        assert_eq!(parse_err("({get a(){}} = 1)"), "Object pattern can't contain getter or setter");
    }

    #[test]
    fn test_redeclaration() {
        assert_eq!(parse_err("let a; var a;"), "Identifier 'a' has already been declared");
        assert!(Parser::new("var a; var a;", Options::default()).parse().is_ok());
    }
}
