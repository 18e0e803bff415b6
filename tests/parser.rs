//! Tests for the parser
//!
//! These tests verify that the parser turns JavaScript source into the
//! expected syntax tree shape, with correct spans.

use ecmaparse::ast::{
    ArrowBody, BinaryOperator, ClassElement, Expression, ForInLeft, ObjectMember, Pattern,
    Program, Statement, VariableKind,
};
use ecmaparse::{Options, SourceType, parse, parse_expression_at};

#[allow(clippy::unwrap_used)]
fn parse_script(source: &str) -> Program {
    parse(source, Options::default()).unwrap()
}

#[allow(clippy::unwrap_used)]
fn parse_module(source: &str) -> Program {
    parse(source, Options::module()).unwrap()
}

fn first_expression(program: &Program) -> &Expression {
    let Some(Statement::Expression(stmt)) = program.body.first() else {
        panic!("expected an expression statement");
    };
    &stmt.expression
}

#[test]
fn test_program_span_covers_whole_input() {
    let source = "  a;\n// trailing\n";
    let prog = parse_script(source);
    assert_eq!(prog.span.start, 0);
    assert_eq!(prog.span.end, source.len());
    assert_eq!(prog.source_type, SourceType::Script);
}

#[test]
fn test_empty_program() {
    let prog = parse_script("");
    assert!(prog.body.is_empty());
    assert_eq!(prog.span.end, 0);
}

#[test]
fn test_variable_declaration() {
    let prog = parse_script("let x = 1, [y] = z;");
    let Statement::VariableDeclaration(decl) = &prog.body[0] else {
        panic!("expected variable declaration");
    };
    assert_eq!(decl.kind, VariableKind::Let);
    assert_eq!(decl.declarations.len(), 2);
    assert!(matches!(decl.declarations[1].id, Pattern::Array(_)));
    assert_eq!((decl.span.start, decl.span.end), (0, 19));
}

#[test]
fn test_operator_precedence() {
    let prog = parse_script("1 + 2 * 3 - 4;");
    let Expression::Binary(sub) = first_expression(&prog) else {
        panic!("expected binary expression");
    };
    assert_eq!(sub.operator, BinaryOperator::Sub);
    let Expression::Binary(add) = sub.left.as_ref() else {
        panic!("expected nested binary");
    };
    assert_eq!(add.operator, BinaryOperator::Add);
    assert!(matches!(
        add.right.as_ref(),
        Expression::Binary(mul) if mul.operator == BinaryOperator::Mul
    ));
}

#[test]
fn test_exponent_is_right_associative() {
    let prog = parse_script("a ** b ** c;");
    let Expression::Binary(outer) = first_expression(&prog) else {
        panic!("expected binary expression");
    };
    assert!(matches!(outer.left.as_ref(), Expression::Identifier(id) if id.name == "a"));
    assert!(matches!(outer.right.as_ref(), Expression::Binary(_)));
}

#[test]
fn test_arrow_function_vs_parenthesized() {
    let prog = parse_script("(a, b) => a + b; (a, b);");
    let Expression::Arrow(arrow) = first_expression(&prog) else {
        panic!("expected arrow function");
    };
    assert_eq!(arrow.params.len(), 2);
    assert!(arrow.expression);
    assert!(matches!(arrow.body, ArrowBody::Expression(_)));
    let Statement::Expression(second) = &prog.body[1] else {
        panic!("expected expression statement");
    };
    assert!(matches!(second.expression, Expression::Sequence(_)));
    // parentheses are not part of the sequence span
    assert_eq!(second.expression.span().start, 18);
}

#[test]
fn test_arrow_with_destructuring_defaults() {
    let prog = parse_script("({ a = 1, b: [c] }, ...rest) => {};");
    let Expression::Arrow(arrow) = first_expression(&prog) else {
        panic!("expected arrow function");
    };
    assert!(matches!(arrow.params[0], Pattern::Object(_)));
    assert!(matches!(arrow.params[1], Pattern::Rest(_)));
    assert!(!arrow.expression);
}

#[test]
fn test_async_arrow_and_async_call() {
    let prog = parse_script("async (x) => x; async (x);");
    assert!(matches!(first_expression(&prog), Expression::Arrow(a) if a.is_async));
    let Statement::Expression(call) = &prog.body[1] else {
        panic!("expected expression statement");
    };
    let Expression::Call(c) = &call.expression else {
        panic!("expected a call to async");
    };
    assert!(matches!(c.callee.as_ref(), Expression::Identifier(id) if id.name == "async"));
}

#[test]
fn test_object_literal_members() {
    let prog = parse_script("({ a, b: 1, [c]: 2, d() {}, get e() { return 1 }, ...f });");
    let Expression::Object(obj) = first_expression(&prog) else {
        panic!("expected object expression");
    };
    assert_eq!(obj.properties.len(), 6);
    assert!(matches!(&obj.properties[0], ObjectMember::Property(p) if p.shorthand));
    assert!(matches!(&obj.properties[2], ObjectMember::Property(p) if p.computed));
    assert!(matches!(&obj.properties[3], ObjectMember::Property(p) if p.method));
    assert!(matches!(&obj.properties[5], ObjectMember::Spread(_)));
}

#[test]
fn test_optional_chain_wrapped_once() {
    let prog = parse_script("a?.b.c(d);");
    let Expression::Chain(chain) = first_expression(&prog) else {
        panic!("expected chain expression");
    };
    let Expression::Call(call) = chain.expression.as_ref() else {
        panic!("expected call inside chain");
    };
    assert!(!call.optional);
    let Expression::Member(member) = call.callee.as_ref() else {
        panic!("expected member callee");
    };
    assert!(matches!(member.object.as_ref(), Expression::Member(inner) if inner.optional));
}

#[test]
fn test_new_with_member_and_call() {
    let prog = parse_script("new a.b(c)(d);");
    let Expression::Call(call) = first_expression(&prog) else {
        panic!("expected call expression");
    };
    assert!(matches!(call.callee.as_ref(), Expression::New(n) if n.arguments.len() == 1));
}

#[test]
fn test_tagged_template_and_template_literal() {
    let prog = parse_script("tag`a${b}c`; `x${y}`;");
    let Expression::TaggedTemplate(tagged) = first_expression(&prog) else {
        panic!("expected tagged template");
    };
    assert_eq!(tagged.quasi.quasis.len(), 2);
    assert_eq!(tagged.quasi.expressions.len(), 1);
    assert!(tagged.quasi.quasis[1].tail);
}

#[test]
fn test_directives() {
    let prog = parse_script("'use strict'; \"other\"; x;");
    let directives: Vec<Option<&str>> = prog
        .body
        .iter()
        .map(|s| match s {
            Statement::Expression(e) => e.directive.as_deref(),
            _ => None,
        })
        .collect();
    assert_eq!(directives, vec![Some("use strict"), Some("other"), None]);
}

#[test]
fn test_use_strict_applies_to_whole_script() {
    assert!(parse("'use strict'; var let = 1;", Options::default()).is_err());
    assert!(parse("var let = 1;", Options::default()).is_ok());
}

#[test]
fn test_automatic_semicolon_insertion() {
    let prog = parse_script("a\n++b");
    assert_eq!(prog.body.len(), 2);
    let prog = parse_script("x = y\n(z)");
    // no insertion before `(`: this is a call
    assert_eq!(prog.body.len(), 1);
    let prog = parse_script("do x; while (y) z");
    assert_eq!(prog.body.len(), 2);
}

#[test]
fn test_regexp_and_division_in_expressions() {
    let prog = parse_script("x = a / b / c; y = /b/g.test(s);");
    assert_eq!(prog.body.len(), 2);
    let prog = parse_script("if (a) /re/.exec(b)");
    assert_eq!(prog.body.len(), 1);
}

#[test]
fn test_for_statements() {
    let prog = parse_script("for (x of y); for ([a, b] in c); for (;;) break;");
    assert!(matches!(
        &prog.body[0],
        Statement::ForOf(s) if matches!(s.left, ForInLeft::Pattern(Pattern::Identifier(_)))
    ));
    assert!(matches!(
        &prog.body[1],
        Statement::ForIn(s) if matches!(s.left, ForInLeft::Pattern(Pattern::Array(_)))
    ));
    assert!(matches!(&prog.body[2], Statement::For(s) if s.init.is_none() && s.test.is_none()));
}

#[test]
fn test_in_operator_allowed_inside_for_init_parens() {
    let prog = parse_script("for (var i = (a in b); i; ) ;");
    assert!(matches!(&prog.body[0], Statement::For(_)));
}

#[test]
fn test_class_expression_and_private_in() {
    let prog = parse_script("(class { #x; static has(o) { return #x in o; } });");
    let Expression::Class(class) = first_expression(&prog) else {
        panic!("expected class expression");
    };
    assert!(class.class.id.is_none());
    assert!(matches!(&class.class.body.body[1], ClassElement::Method(m) if m.is_static));
}

#[test]
fn test_generators_and_async_functions() {
    let prog = parse_script("function* g() { yield* h(); } async function f() { await x; }");
    let Statement::FunctionDeclaration(g) = &prog.body[0] else {
        panic!("expected function");
    };
    assert!(g.function.generator);
    let Statement::FunctionDeclaration(f) = &prog.body[1] else {
        panic!("expected function");
    };
    assert!(f.function.is_async);
}

#[test]
fn test_top_level_await_in_module() {
    let prog = parse_module("await x;");
    assert!(matches!(first_expression(&prog), Expression::Await(_)));
    assert_eq!(prog.source_type, SourceType::Module);
    // in a script `await` is an identifier
    let prog = parse_script("await;");
    assert!(matches!(first_expression(&prog), Expression::Identifier(_)));
}

#[test]
fn test_dynamic_import_in_script() {
    let prog = parse_script("import('./a.js', { with: { type: 'json' } });");
    let Expression::Import(import) = first_expression(&prog) else {
        panic!("expected import expression");
    };
    assert!(import.options.is_some());
    // import.meta needs a module
    assert!(parse("import.meta", Options::default()).is_err());
    assert!(parse("import.meta", Options::module()).is_ok());
}

#[test]
fn test_parse_expression_at() {
    let source = "let x = a + b; rest";
    let expr = parse_expression_at(source, 8, Options::default()).unwrap();
    let Expression::Binary(bin) = expr else {
        panic!("expected binary expression");
    };
    assert_eq!((bin.span.start, bin.span.end), (8, 13));
}

#[test]
fn test_ecma_version_gating() {
    let es10 = || Options::default().with_ecma_version(10);
    assert!(parse("a ?? b", es10()).is_err());
    assert!(parse("a?.b", es10()).is_err());
    assert!(parse("class A { x = 1 }", Options::default().with_ecma_version(12)).is_err());
    assert!(parse("let x = 1", Options::default().with_ecma_version(5)).is_err());
    assert!(parse("a ?? b", Options::default().with_ecma_version(2020)).is_ok());
    assert!(parse("{ using x = y }", Options::default().with_ecma_version(16)).is_err());
}

#[test]
fn test_locations_and_ranges_on_nodes() {
    let prog = parse("a;\n  b;", Options::default().with_locations().with_ranges()).unwrap();
    let span = prog.body[1].span();
    assert_eq!(span.range, Some([5, 7]));
    let loc = span.loc.as_ref().unwrap();
    assert_eq!((loc.start.line, loc.start.column), (2, 2));
    assert_eq!((loc.end.line, loc.end.column), (2, 4));
}

#[test]
fn test_allow_return_outside_function() {
    assert!(parse("return 1", Options::default()).is_err());
    let options = Options {
        allow_return_outside_function: true,
        ..Options::default()
    };
    assert!(parse("return 1", options).is_ok());
}

#[test]
fn test_html_comments_only_in_scripts() {
    assert_eq!(parse_script("x <!-- comment\n-->y\n").body.len(), 1);
    assert_eq!(parse_script("x\n--> y").body.len(), 1);
    assert!(parse("x\n--> y", Options::module()).is_err());
}
