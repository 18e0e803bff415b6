//! ESTree syntax tree
//!
//! Every node serializes to the ESTree JSON shape: a `type` field, `start`
//! and `end` byte offsets, plus `loc` and `range` when the matching options
//! are set. Category enums (`Statement`, `Expression`, `Pattern`, ...) are
//! untagged; the node structs carry their own `type`.

use serde::{Serialize, Serializer};

use crate::lexer::SourceLocation;
use crate::options::SourceType;

/// Source extent shared by every node
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<Box<SourceLocation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[usize; 2]>,
}

impl Span {
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Program", rename_all = "camelCase")]
pub struct Program {
    #[serde(flatten)]
    pub span: Span,
    pub body: Vec<Statement>,
    pub source_type: SourceType,
}

// ============ STATEMENTS ============

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Statement {
    Expression(ExpressionStatement),
    Block(BlockStatement),
    Empty(EmptyStatement),
    Debugger(DebuggerStatement),
    With(WithStatement),
    Return(ReturnStatement),
    Labeled(LabeledStatement),
    Break(BreakStatement),
    Continue(ContinueStatement),
    If(IfStatement),
    Switch(SwitchStatement),
    Throw(ThrowStatement),
    Try(Box<TryStatement>),
    While(WhileStatement),
    DoWhile(DoWhileStatement),
    For(Box<ForStatement>),
    ForIn(Box<ForInStatement>),
    ForOf(Box<ForOfStatement>),
    FunctionDeclaration(Box<FunctionDeclaration>),
    VariableDeclaration(VariableDeclaration),
    ClassDeclaration(Box<ClassDeclaration>),
    ImportDeclaration(Box<ImportDeclaration>),
    ExportNamed(Box<ExportNamedDeclaration>),
    ExportDefault(Box<ExportDefaultDeclaration>),
    ExportAll(Box<ExportAllDeclaration>),
}

impl Statement {
    pub fn span(&self) -> &Span {
        match self {
            Statement::Expression(n) => &n.span,
            Statement::Block(n) => &n.span,
            Statement::Empty(n) => &n.span,
            Statement::Debugger(n) => &n.span,
            Statement::With(n) => &n.span,
            Statement::Return(n) => &n.span,
            Statement::Labeled(n) => &n.span,
            Statement::Break(n) => &n.span,
            Statement::Continue(n) => &n.span,
            Statement::If(n) => &n.span,
            Statement::Switch(n) => &n.span,
            Statement::Throw(n) => &n.span,
            Statement::Try(n) => &n.span,
            Statement::While(n) => &n.span,
            Statement::DoWhile(n) => &n.span,
            Statement::For(n) => &n.span,
            Statement::ForIn(n) => &n.span,
            Statement::ForOf(n) => &n.span,
            Statement::FunctionDeclaration(n) => &n.function.span,
            Statement::VariableDeclaration(n) => &n.span,
            Statement::ClassDeclaration(n) => &n.class.span,
            Statement::ImportDeclaration(n) => &n.span,
            Statement::ExportNamed(n) => &n.span,
            Statement::ExportDefault(n) => &n.span,
            Statement::ExportAll(n) => &n.span,
        }
    }
}

/// An expression statement. Directive prologue entries carry the raw
/// directive text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ExpressionStatement")]
pub struct ExpressionStatement {
    #[serde(flatten)]
    pub span: Span,
    pub expression: Expression,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "BlockStatement")]
pub struct BlockStatement {
    #[serde(flatten)]
    pub span: Span,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "EmptyStatement")]
pub struct EmptyStatement {
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "DebuggerStatement")]
pub struct DebuggerStatement {
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "WithStatement")]
pub struct WithStatement {
    #[serde(flatten)]
    pub span: Span,
    pub object: Expression,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ReturnStatement")]
pub struct ReturnStatement {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "LabeledStatement")]
pub struct LabeledStatement {
    #[serde(flatten)]
    pub span: Span,
    pub label: Identifier,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "BreakStatement")]
pub struct BreakStatement {
    #[serde(flatten)]
    pub span: Span,
    pub label: Option<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ContinueStatement")]
pub struct ContinueStatement {
    #[serde(flatten)]
    pub span: Span,
    pub label: Option<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "IfStatement")]
pub struct IfStatement {
    #[serde(flatten)]
    pub span: Span,
    pub test: Expression,
    pub consequent: Box<Statement>,
    pub alternate: Option<Box<Statement>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "SwitchStatement")]
pub struct SwitchStatement {
    #[serde(flatten)]
    pub span: Span,
    pub discriminant: Expression,
    pub cases: Vec<SwitchCase>,
}

/// `case test:` or, with no test, `default:`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "SwitchCase")]
pub struct SwitchCase {
    #[serde(flatten)]
    pub span: Span,
    pub test: Option<Expression>,
    pub consequent: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ThrowStatement")]
pub struct ThrowStatement {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "TryStatement")]
pub struct TryStatement {
    #[serde(flatten)]
    pub span: Span,
    pub block: BlockStatement,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<BlockStatement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "CatchClause")]
pub struct CatchClause {
    #[serde(flatten)]
    pub span: Span,
    pub param: Option<Pattern>,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "WhileStatement")]
pub struct WhileStatement {
    #[serde(flatten)]
    pub span: Span,
    pub test: Expression,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "DoWhileStatement")]
pub struct DoWhileStatement {
    #[serde(flatten)]
    pub span: Span,
    pub body: Box<Statement>,
    pub test: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ForStatement")]
pub struct ForStatement {
    #[serde(flatten)]
    pub span: Span,
    pub init: Option<ForInit>,
    pub test: Option<Expression>,
    pub update: Option<Expression>,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ForInit {
    VariableDeclaration(VariableDeclaration),
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ForInLeft {
    VariableDeclaration(VariableDeclaration),
    Pattern(Pattern),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ForInStatement")]
pub struct ForInStatement {
    #[serde(flatten)]
    pub span: Span,
    pub left: ForInLeft,
    pub right: Expression,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ForOfStatement")]
pub struct ForOfStatement {
    #[serde(flatten)]
    pub span: Span,
    #[serde(rename = "await")]
    pub is_await: bool,
    pub left: ForInLeft,
    pub right: Expression,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VariableKind {
    #[serde(rename = "var")]
    Var,
    #[serde(rename = "let")]
    Let,
    #[serde(rename = "const")]
    Const,
    #[serde(rename = "using")]
    Using,
    #[serde(rename = "await using")]
    AwaitUsing,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
            VariableKind::Using => "using",
            VariableKind::AwaitUsing => "await using",
        }
    }

    pub fn is_using(self) -> bool {
        matches!(self, VariableKind::Using | VariableKind::AwaitUsing)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "VariableDeclaration")]
pub struct VariableDeclaration {
    #[serde(flatten)]
    pub span: Span,
    pub declarations: Vec<VariableDeclarator>,
    pub kind: VariableKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "VariableDeclarator")]
pub struct VariableDeclarator {
    #[serde(flatten)]
    pub span: Span,
    pub id: Pattern,
    pub init: Option<Expression>,
}

// ============ FUNCTIONS AND CLASSES ============

/// Fields shared by function declarations, expressions and methods
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    #[serde(flatten)]
    pub span: Span,
    pub id: Option<Identifier>,
    pub expression: bool,
    pub generator: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
    pub params: Vec<Pattern>,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "FunctionDeclaration")]
pub struct FunctionDeclaration {
    #[serde(flatten)]
    pub function: Function,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "FunctionExpression")]
pub struct FunctionExpression {
    #[serde(flatten)]
    pub function: Function,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArrowBody {
    Block(BlockStatement),
    Expression(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ArrowFunctionExpression")]
pub struct ArrowFunctionExpression {
    #[serde(flatten)]
    pub span: Span,
    /// Always `None`; present for ESTree shape
    pub id: Option<Identifier>,
    pub expression: bool,
    pub generator: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
    pub params: Vec<Pattern>,
    pub body: ArrowBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    #[serde(flatten)]
    pub span: Span,
    pub id: Option<Identifier>,
    pub super_class: Option<Box<Expression>>,
    pub body: ClassBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ClassDeclaration")]
pub struct ClassDeclaration {
    #[serde(flatten)]
    pub class: Class,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ClassExpression")]
pub struct ClassExpression {
    #[serde(flatten)]
    pub class: Class,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ClassBody")]
pub struct ClassBody {
    #[serde(flatten)]
    pub span: Span,
    pub body: Vec<ClassElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClassElement {
    Method(MethodDefinition),
    Property(PropertyDefinition),
    StaticBlock(StaticBlock),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Constructor,
    Method,
    Get,
    Set,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "MethodDefinition")]
pub struct MethodDefinition {
    #[serde(flatten)]
    pub span: Span,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub computed: bool,
    pub key: Expression,
    pub kind: MethodKind,
    pub value: FunctionExpression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "PropertyDefinition")]
pub struct PropertyDefinition {
    #[serde(flatten)]
    pub span: Span,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub computed: bool,
    pub key: Expression,
    pub value: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "StaticBlock")]
pub struct StaticBlock {
    #[serde(flatten)]
    pub span: Span,
    pub body: Vec<Statement>,
}

// ============ MODULES ============

/// Module export names may be string literals from ES2022
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModuleExportName {
    Identifier(Identifier),
    Literal(Literal),
}

impl ModuleExportName {
    /// The exported name: identifier name or string value
    pub fn name(&self) -> &str {
        match self {
            ModuleExportName::Identifier(id) => &id.name,
            ModuleExportName::Literal(lit) => match &lit.value {
                LiteralValue::String(s) => s,
                _ => "",
            },
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            ModuleExportName::Identifier(id) => &id.span,
            ModuleExportName::Literal(lit) => &lit.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ImportDeclaration")]
pub struct ImportDeclaration {
    #[serde(flatten)]
    pub span: Span,
    pub specifiers: Vec<ImportDeclarationSpecifier>,
    pub source: Literal,
    /// Present from ES2025 on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<ImportAttribute>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImportDeclarationSpecifier {
    Named(ImportSpecifier),
    Default(ImportDefaultSpecifier),
    Namespace(ImportNamespaceSpecifier),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ImportSpecifier")]
pub struct ImportSpecifier {
    #[serde(flatten)]
    pub span: Span,
    pub imported: ModuleExportName,
    pub local: Identifier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ImportDefaultSpecifier")]
pub struct ImportDefaultSpecifier {
    #[serde(flatten)]
    pub span: Span,
    pub local: Identifier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ImportNamespaceSpecifier")]
pub struct ImportNamespaceSpecifier {
    #[serde(flatten)]
    pub span: Span,
    pub local: Identifier,
}

/// `with { type: "json" }` entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ImportAttribute")]
pub struct ImportAttribute {
    #[serde(flatten)]
    pub span: Span,
    pub key: ModuleExportName,
    pub value: Literal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ExportNamedDeclaration")]
pub struct ExportNamedDeclaration {
    #[serde(flatten)]
    pub span: Span,
    pub declaration: Option<Box<Statement>>,
    pub specifiers: Vec<ExportSpecifier>,
    pub source: Option<Literal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<ImportAttribute>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ExportSpecifier")]
pub struct ExportSpecifier {
    #[serde(flatten)]
    pub span: Span,
    pub local: ModuleExportName,
    pub exported: ModuleExportName,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportDefaultKind {
    Function(FunctionDeclaration),
    Class(ClassDeclaration),
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ExportDefaultDeclaration")]
pub struct ExportDefaultDeclaration {
    #[serde(flatten)]
    pub span: Span,
    pub declaration: ExportDefaultKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ExportAllDeclaration")]
pub struct ExportAllDeclaration {
    #[serde(flatten)]
    pub span: Span,
    pub exported: Option<ModuleExportName>,
    pub source: Literal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<ImportAttribute>>,
}

// ============ EXPRESSIONS ============

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Expression {
    Identifier(Identifier),
    PrivateIdentifier(PrivateIdentifier),
    Literal(Box<Literal>),
    This(ThisExpression),
    Super(Super),
    Array(ArrayExpression),
    Object(ObjectExpression),
    Function(Box<FunctionExpression>),
    Arrow(Box<ArrowFunctionExpression>),
    Class(Box<ClassExpression>),
    Template(TemplateLiteral),
    TaggedTemplate(Box<TaggedTemplateExpression>),
    Unary(UnaryExpression),
    Update(UpdateExpression),
    Binary(BinaryExpression),
    Logical(LogicalExpression),
    Assignment(AssignmentExpression),
    Conditional(ConditionalExpression),
    Call(CallExpression),
    New(NewExpression),
    Member(MemberExpression),
    Chain(ChainExpression),
    Sequence(SequenceExpression),
    Yield(YieldExpression),
    Await(AwaitExpression),
    Import(ImportExpression),
    MetaProperty(Box<MetaProperty>),
    /// Only valid as an array element or call argument
    Spread(SpreadElement),
    /// Node produced by an expression atom extension
    Extension(Box<ExtensionNode>),
}

impl Expression {
    pub fn span(&self) -> &Span {
        match self {
            Expression::Identifier(n) => &n.span,
            Expression::PrivateIdentifier(n) => &n.span,
            Expression::Literal(n) => &n.span,
            Expression::This(n) => &n.span,
            Expression::Super(n) => &n.span,
            Expression::Array(n) => &n.span,
            Expression::Object(n) => &n.span,
            Expression::Function(n) => &n.function.span,
            Expression::Arrow(n) => &n.span,
            Expression::Class(n) => &n.class.span,
            Expression::Template(n) => &n.span,
            Expression::TaggedTemplate(n) => &n.span,
            Expression::Unary(n) => &n.span,
            Expression::Update(n) => &n.span,
            Expression::Binary(n) => &n.span,
            Expression::Logical(n) => &n.span,
            Expression::Assignment(n) => &n.span,
            Expression::Conditional(n) => &n.span,
            Expression::Call(n) => &n.span,
            Expression::New(n) => &n.span,
            Expression::Member(n) => &n.span,
            Expression::Chain(n) => &n.span,
            Expression::Sequence(n) => &n.span,
            Expression::Yield(n) => &n.span,
            Expression::Await(n) => &n.span,
            Expression::Import(n) => &n.span,
            Expression::MetaProperty(n) => &n.span,
            Expression::Spread(n) => &n.span,
            Expression::Extension(n) => &n.span,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Expression::Identifier(_) => "Identifier",
            Expression::PrivateIdentifier(_) => "PrivateIdentifier",
            Expression::Literal(_) => "Literal",
            Expression::This(_) => "ThisExpression",
            Expression::Super(_) => "Super",
            Expression::Array(_) => "ArrayExpression",
            Expression::Object(_) => "ObjectExpression",
            Expression::Function(_) => "FunctionExpression",
            Expression::Arrow(_) => "ArrowFunctionExpression",
            Expression::Class(_) => "ClassExpression",
            Expression::Template(_) => "TemplateLiteral",
            Expression::TaggedTemplate(_) => "TaggedTemplateExpression",
            Expression::Unary(_) => "UnaryExpression",
            Expression::Update(_) => "UpdateExpression",
            Expression::Binary(_) => "BinaryExpression",
            Expression::Logical(_) => "LogicalExpression",
            Expression::Assignment(_) => "AssignmentExpression",
            Expression::Conditional(_) => "ConditionalExpression",
            Expression::Call(_) => "CallExpression",
            Expression::New(_) => "NewExpression",
            Expression::Member(_) => "MemberExpression",
            Expression::Chain(_) => "ChainExpression",
            Expression::Sequence(_) => "SequenceExpression",
            Expression::Yield(_) => "YieldExpression",
            Expression::Await(_) => "AwaitExpression",
            Expression::Import(_) => "ImportExpression",
            Expression::MetaProperty(_) => "MetaProperty",
            Expression::Spread(_) => "SpreadElement",
            Expression::Extension(n) => &n.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Identifier")]
pub struct Identifier {
    #[serde(flatten)]
    pub span: Span,
    pub name: String,
}

/// `#name` in classes. `name` excludes the `#`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "PrivateIdentifier")]
pub struct PrivateIdentifier {
    #[serde(flatten)]
    pub span: Span,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    /// Serialized as `null`; the digits are in `Literal::bigint`
    BigInt(String),
    /// Serialized as `null`; pattern and flags are in `Literal::regex`
    RegExp,
}

impl Serialize for LiteralValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LiteralValue::Null | LiteralValue::BigInt(_) | LiteralValue::RegExp => {
                serializer.serialize_unit()
            }
            LiteralValue::Boolean(b) => serializer.serialize_bool(*b),
            LiteralValue::Number(n) => {
                // integral values print without a fractional part, like JSON.stringify
                if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            LiteralValue::String(s) => serializer.serialize_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegExpLiteral {
    pub pattern: String,
    pub flags: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Literal")]
pub struct Literal {
    #[serde(flatten)]
    pub span: Span,
    pub value: LiteralValue,
    /// Exact source text of the literal
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<RegExpLiteral>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bigint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ThisExpression")]
pub struct ThisExpression {
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Super")]
pub struct Super {
    #[serde(flatten)]
    pub span: Span,
}

/// Holes are `None`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ArrayExpression")]
pub struct ArrayExpression {
    #[serde(flatten)]
    pub span: Span,
    pub elements: Vec<Option<Expression>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ObjectExpression")]
pub struct ObjectExpression {
    #[serde(flatten)]
    pub span: Span,
    pub properties: Vec<ObjectMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ObjectMember {
    Property(Property),
    Spread(SpreadElement),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Property")]
pub struct Property {
    #[serde(flatten)]
    pub span: Span,
    pub method: bool,
    pub shorthand: bool,
    pub computed: bool,
    pub key: Expression,
    pub value: Expression,
    pub kind: PropertyKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "SpreadElement")]
pub struct SpreadElement {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "TemplateLiteral")]
pub struct TemplateLiteral {
    #[serde(flatten)]
    pub span: Span,
    pub expressions: Vec<Expression>,
    pub quasis: Vec<TemplateElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateElementValue {
    pub raw: String,
    /// `None` for invalid escapes in tagged templates
    pub cooked: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "TemplateElement")]
pub struct TemplateElement {
    #[serde(flatten)]
    pub span: Span,
    pub value: TemplateElementValue,
    pub tail: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "TaggedTemplateExpression")]
pub struct TaggedTemplateExpression {
    #[serde(flatten)]
    pub span: Span,
    pub tag: Box<Expression>,
    pub quasi: TemplateLiteral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "~")]
    BitNot,
    #[serde(rename = "typeof")]
    Typeof,
    #[serde(rename = "void")]
    Void,
    #[serde(rename = "delete")]
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "UnaryExpression")]
pub struct UnaryExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: UnaryOperator,
    pub prefix: bool,
    pub argument: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateOperator {
    #[serde(rename = "++")]
    Increment,
    #[serde(rename = "--")]
    Decrement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "UpdateExpression")]
pub struct UpdateExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: UpdateOperator,
    pub prefix: bool,
    pub argument: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "===")]
    StrictEq,
    #[serde(rename = "!==")]
    StrictNotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "<<")]
    LShift,
    #[serde(rename = ">>")]
    RShift,
    #[serde(rename = ">>>")]
    URShift,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Mod,
    #[serde(rename = "**")]
    Exp,
    #[serde(rename = "|")]
    BitOr,
    #[serde(rename = "^")]
    BitXor,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "instanceof")]
    Instanceof,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "BinaryExpression")]
pub struct BinaryExpression {
    #[serde(flatten)]
    pub span: Span,
    pub left: Box<Expression>,
    pub operator: BinaryOperator,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogicalOperator {
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "??")]
    Coalesce,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "LogicalExpression")]
pub struct LogicalExpression {
    #[serde(flatten)]
    pub span: Span,
    pub left: Box<Expression>,
    pub operator: LogicalOperator,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignmentOperator {
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+=")]
    Add,
    #[serde(rename = "-=")]
    Sub,
    #[serde(rename = "*=")]
    Mul,
    #[serde(rename = "/=")]
    Div,
    #[serde(rename = "%=")]
    Mod,
    #[serde(rename = "**=")]
    Exp,
    #[serde(rename = "<<=")]
    LShift,
    #[serde(rename = ">>=")]
    RShift,
    #[serde(rename = ">>>=")]
    URShift,
    #[serde(rename = "|=")]
    BitOr,
    #[serde(rename = "^=")]
    BitXor,
    #[serde(rename = "&=")]
    BitAnd,
    #[serde(rename = "||=")]
    Or,
    #[serde(rename = "&&=")]
    And,
    #[serde(rename = "??=")]
    Coalesce,
}

impl AssignmentOperator {
    /// `&&=`, `||=` and `??=` only accept simple targets
    pub fn is_logical(self) -> bool {
        matches!(
            self,
            AssignmentOperator::Or | AssignmentOperator::And | AssignmentOperator::Coalesce
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "AssignmentExpression")]
pub struct AssignmentExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: AssignmentOperator,
    pub left: Box<Pattern>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ConditionalExpression")]
pub struct ConditionalExpression {
    #[serde(flatten)]
    pub span: Span,
    pub test: Box<Expression>,
    pub consequent: Box<Expression>,
    pub alternate: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "CallExpression")]
pub struct CallExpression {
    #[serde(flatten)]
    pub span: Span,
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "NewExpression")]
pub struct NewExpression {
    #[serde(flatten)]
    pub span: Span,
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "MemberExpression")]
pub struct MemberExpression {
    #[serde(flatten)]
    pub span: Span,
    pub object: Box<Expression>,
    pub property: Box<Expression>,
    pub computed: bool,
    pub optional: bool,
}

/// Wraps an optional chain (`a?.b.c`) so that short-circuiting stops at
/// the chain boundary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ChainExpression")]
pub struct ChainExpression {
    #[serde(flatten)]
    pub span: Span,
    pub expression: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "SequenceExpression")]
pub struct SequenceExpression {
    #[serde(flatten)]
    pub span: Span,
    pub expressions: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "YieldExpression")]
pub struct YieldExpression {
    #[serde(flatten)]
    pub span: Span,
    pub delegate: bool,
    pub argument: Option<Box<Expression>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "AwaitExpression")]
pub struct AwaitExpression {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Box<Expression>,
}

/// Dynamic `import(source, options)`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ImportExpression")]
pub struct ImportExpression {
    #[serde(flatten)]
    pub span: Span,
    pub source: Box<Expression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Box<Expression>>,
}

/// `new.target` or `import.meta`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "MetaProperty")]
pub struct MetaProperty {
    #[serde(flatten)]
    pub span: Span,
    pub meta: Identifier,
    pub property: Identifier,
}

/// A node of a type the core grammar does not know. Extensions fill in
/// `kind` (serialized as `type`) and arbitrary extra fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub span: Span,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

// ============ PATTERNS ============

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Pattern {
    Identifier(Identifier),
    Member(MemberExpression),
    Object(ObjectPattern),
    Array(ArrayPattern),
    Rest(RestElement),
    Assignment(AssignmentPattern),
}

impl Pattern {
    pub fn span(&self) -> &Span {
        match self {
            Pattern::Identifier(n) => &n.span,
            Pattern::Member(n) => &n.span,
            Pattern::Object(n) => &n.span,
            Pattern::Array(n) => &n.span,
            Pattern::Rest(n) => &n.span,
            Pattern::Assignment(n) => &n.span,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Pattern::Identifier(_) => "Identifier",
            Pattern::Member(_) => "MemberExpression",
            Pattern::Object(_) => "ObjectPattern",
            Pattern::Array(_) => "ArrayPattern",
            Pattern::Rest(_) => "RestElement",
            Pattern::Assignment(_) => "AssignmentPattern",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ObjectPattern")]
pub struct ObjectPattern {
    #[serde(flatten)]
    pub span: Span,
    pub properties: Vec<ObjectPatternMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ObjectPatternMember {
    Property(AssignmentProperty),
    Rest(RestElement),
}

/// A property inside an object pattern. Serialized as `Property` with
/// kind `init`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Property")]
pub struct AssignmentProperty {
    #[serde(flatten)]
    pub span: Span,
    pub method: bool,
    pub shorthand: bool,
    pub computed: bool,
    pub key: Expression,
    pub value: Pattern,
    pub kind: PropertyKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ArrayPattern")]
pub struct ArrayPattern {
    #[serde(flatten)]
    pub span: Span,
    pub elements: Vec<Option<Pattern>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "RestElement")]
pub struct RestElement {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Box<Pattern>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "AssignmentPattern")]
pub struct AssignmentPattern {
    #[serde(flatten)]
    pub span: Span,
    pub left: Box<Pattern>,
    pub right: Box<Expression>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn span(start: usize, end: usize) -> Span {
        Span {
            start,
            end,
            ..Span::default()
        }
    }

    #[test]
    fn test_identifier_serializes_with_type() {
        let id = Identifier {
            span: span(0, 1),
            name: "x".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&id).unwrap(),
            json!({"type": "Identifier", "start": 0, "end": 1, "name": "x"})
        );
    }

    #[test]
    fn test_integral_numbers_serialize_as_integers() {
        let lit = Literal {
            span: span(0, 2),
            value: LiteralValue::Number(42.0),
            raw: "42".to_string(),
            regex: None,
            bigint: None,
        };
        let value = serde_json::to_value(&lit).unwrap();
        assert_eq!(value["value"], json!(42));
        assert!(value.get("regex").is_none());
        let half = LiteralValue::Number(0.5);
        assert_eq!(serde_json::to_value(&half).unwrap(), json!(0.5));
    }

    #[test]
    fn test_function_declaration_flattens() {
        let decl = FunctionDeclaration {
            function: Function {
                span: span(0, 15),
                id: Some(Identifier {
                    span: span(9, 10),
                    name: "f".to_string(),
                }),
                expression: false,
                generator: false,
                is_async: false,
                params: vec![],
                body: BlockStatement {
                    span: span(13, 15),
                    body: vec![],
                },
            },
        };
        let value = serde_json::to_value(&decl).unwrap();
        assert_eq!(value["type"], "FunctionDeclaration");
        assert_eq!(value["async"], false);
        assert_eq!(value["body"]["type"], "BlockStatement");
        assert_eq!(value["start"], 0);
    }

    #[test]
    fn test_location_and_range_are_optional() {
        let mut s = span(1, 3);
        assert!(serde_json::to_value(&s).unwrap().get("range").is_none());
        s.range = Some([1, 3]);
        assert_eq!(serde_json::to_value(&s).unwrap()["range"], json!([1, 3]));
    }

    #[test]
    fn test_extension_node_fields() {
        let mut fields = serde_json::Map::new();
        fields.insert("name".to_string(), json!("x"));
        let node = ExtensionNode {
            kind: "Placeholder".to_string(),
            span: span(0, 5),
            fields,
        };
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"type": "Placeholder", "start": 0, "end": 5, "name": "x"})
        );
    }

    #[test]
    fn test_node_enums_stay_small() {
        // deep nesting recurses through these by value
        assert!(std::mem::size_of::<Span>() <= 48);
        assert!(std::mem::size_of::<Expression>() <= 128);
        assert!(std::mem::size_of::<Statement>() <= 256);
    }

    #[test]
    fn test_span_contains() {
        assert!(span(0, 10).contains(&span(2, 5)));
        assert!(!span(2, 5).contains(&span(0, 10)));
    }
}
