//! ESTree JSON output
//!
//! Checks the serialized shape tools rely on: `type` tags, flattened
//! positions and the literal conventions for regexps and bigints.

use ecmaparse::{Options, parse};
use serde_json::{Value, json};

fn to_json(source: &str, options: Options) -> Value {
    let program = parse(source, options).unwrap();
    serde_json::to_value(&program).unwrap()
}

fn script(source: &str) -> Value {
    to_json(source, Options::default())
}

fn first_expression(source: &str) -> Value {
    script(source)["body"][0]["expression"].clone()
}

#[test]
fn test_program_shape() {
    let json = script("x;");
    assert_eq!(json["type"], "Program");
    assert_eq!(json["sourceType"], "script");
    assert_eq!(json["start"], 0);
    assert_eq!(json["end"], 2);
    // positions are only present when asked for
    assert!(json.get("loc").is_none());
    assert!(json.get("range").is_none());
    assert_eq!(to_json("x;", Options::module())["sourceType"], "module");
}

#[test]
fn test_identifier_is_flat() {
    assert_eq!(
        first_expression("foo"),
        json!({ "type": "Identifier", "start": 0, "end": 3, "name": "foo" })
    );
}

#[test]
fn test_literals() {
    let lit = first_expression("42");
    assert_eq!(lit["type"], "Literal");
    assert_eq!(lit["value"], 42);
    assert_eq!(lit["raw"], "42");
    assert!(lit.get("regex").is_none());

    let lit = first_expression("0.5");
    assert_eq!(lit["value"], 0.5);

    let lit = first_expression("'a\\nb'");
    assert_eq!(lit["value"], "a\nb");
    assert_eq!(lit["raw"], "'a\\nb'");

    assert_eq!(first_expression("null")["value"], Value::Null);
    assert_eq!(first_expression("true")["value"], true);
}

#[test]
fn test_regexp_literal() {
    let lit = first_expression("/a+/gi");
    assert_eq!(lit["type"], "Literal");
    assert_eq!(lit["value"], Value::Null);
    assert_eq!(lit["raw"], "/a+/gi");
    assert_eq!(lit["regex"], json!({ "pattern": "a+", "flags": "gi" }));
}

#[test]
fn test_bigint_literal() {
    let lit = first_expression("0x1_fn");
    assert_eq!(lit["value"], Value::Null);
    assert_eq!(lit["raw"], "0x1_fn");
    // the bigint field holds the decimal value
    assert_eq!(lit["bigint"], "31");
}

#[test]
fn test_operators_serialize_as_source_text() {
    let expr = first_expression("a ?? b");
    assert_eq!(expr["type"], "LogicalExpression");
    assert_eq!(expr["operator"], "??");
    let expr = first_expression("a instanceof b");
    assert_eq!(expr["type"], "BinaryExpression");
    assert_eq!(expr["operator"], "instanceof");
    let expr = first_expression("a >>>= 1");
    assert_eq!(expr["type"], "AssignmentExpression");
    assert_eq!(expr["operator"], ">>>=");
    let expr = first_expression("typeof a");
    assert_eq!(expr["operator"], "typeof");
    assert_eq!(expr["prefix"], true);
}

#[test]
fn test_function_fields() {
    let json = script("async function* f(a, ...b) {}");
    let func = &json["body"][0];
    assert_eq!(func["type"], "FunctionDeclaration");
    assert_eq!(func["id"]["name"], "f");
    assert_eq!(func["async"], true);
    assert_eq!(func["generator"], true);
    assert_eq!(func["expression"], false);
    assert_eq!(func["params"][1]["type"], "RestElement");
    assert_eq!(func["body"]["type"], "BlockStatement");
}

#[test]
fn test_property_kinds() {
    let obj = first_expression("({ a: 1, get b() {}, set b(v) {}, c() {} })");
    let kinds: Vec<&str> = obj["properties"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["init", "get", "set", "init"]);
    assert_eq!(obj["properties"][3]["method"], true);
}

#[test]
fn test_directive_field() {
    let json = script("'use strict'; x");
    assert_eq!(json["body"][0]["directive"], "use strict");
    assert!(json["body"][1].get("directive").is_none());
}

#[test]
fn test_template_elements() {
    let tpl = first_expression("`a${b}\\u0041`");
    assert_eq!(tpl["type"], "TemplateLiteral");
    assert_eq!(tpl["quasis"][0]["value"], json!({ "raw": "a", "cooked": "a" }));
    assert_eq!(tpl["quasis"][1]["value"]["cooked"], "A");
    assert_eq!(tpl["quasis"][1]["tail"], true);

    // invalid escapes are allowed in tagged templates and cook to null
    let tagged = first_expression("t`\\unicode`");
    assert_eq!(tagged["quasi"]["quasis"][0]["value"]["cooked"], Value::Null);
    assert_eq!(tagged["quasi"]["quasis"][0]["value"]["raw"], "\\unicode");
}

#[test]
fn test_import_expression_options() {
    let expr = first_expression("import('a')");
    assert_eq!(expr["type"], "ImportExpression");
    assert!(expr.get("options").is_none());
    let expr = first_expression("import('a', { with: {} })");
    assert_eq!(expr["options"]["type"], "ObjectExpression");
}

#[test]
fn test_module_declarations() {
    let json = to_json(
        "import d, { a as b } from 'm' with { type: 'json' }; \
         export * as ns from 'n'; export default class {}",
        Options::module(),
    );
    let import = &json["body"][0];
    assert_eq!(import["type"], "ImportDeclaration");
    assert_eq!(import["specifiers"][0]["type"], "ImportDefaultSpecifier");
    assert_eq!(import["specifiers"][1]["imported"]["name"], "a");
    assert_eq!(import["specifiers"][1]["local"]["name"], "b");
    assert_eq!(import["attributes"][0]["type"], "ImportAttribute");
    assert_eq!(import["attributes"][0]["value"]["value"], "json");

    let export_all = &json["body"][1];
    assert_eq!(export_all["type"], "ExportAllDeclaration");
    assert_eq!(export_all["exported"]["name"], "ns");

    let export_default = &json["body"][2];
    assert_eq!(export_default["type"], "ExportDefaultDeclaration");
    assert_eq!(export_default["declaration"]["type"], "ClassDeclaration");
    assert_eq!(export_default["declaration"]["id"], Value::Null);
}

#[test]
fn test_chain_expression() {
    let expr = first_expression("a?.[b]()");
    assert_eq!(expr["type"], "ChainExpression");
    let call = &expr["expression"];
    assert_eq!(call["type"], "CallExpression");
    assert_eq!(call["optional"], false);
    assert_eq!(call["callee"]["type"], "MemberExpression");
    assert_eq!(call["callee"]["computed"], true);
    assert_eq!(call["callee"]["optional"], true);
}

#[test]
fn test_class_members() {
    let class = first_expression("(class { static #x = 1; y; static {} })");
    let body = &class["body"]["body"];
    assert_eq!(body[0]["type"], "PropertyDefinition");
    assert_eq!(body[0]["static"], true);
    assert_eq!(body[0]["key"]["type"], "PrivateIdentifier");
    assert_eq!(body[0]["key"]["name"], "x");
    assert_eq!(body[1]["type"], "PropertyDefinition");
    assert_eq!(body[1]["key"]["name"], "y");
    assert_eq!(body[1]["value"], Value::Null);
    assert_eq!(body[2]["type"], "StaticBlock");
}

#[test]
fn test_locations_and_ranges() {
    let options = Options::default().with_locations().with_ranges();
    let json = to_json("a\n  + b", options);
    let expr = &json["body"][0]["expression"];
    assert_eq!(expr["range"], json!([0, 7]));
    assert_eq!(
        expr["loc"],
        json!({ "start": { "line": 1, "column": 0 }, "end": { "line": 2, "column": 5 } })
    );
    assert_eq!(expr["right"]["loc"]["start"], json!({ "line": 2, "column": 4 }));
}

#[test]
fn test_source_file_in_locations() {
    let options = Options {
        source_file: Some("input.js".to_string()),
        ..Options::default().with_locations()
    };
    let json = to_json("x", options);
    assert_eq!(json["loc"]["source"], "input.js");
}
