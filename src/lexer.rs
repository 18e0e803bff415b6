//! Lexer for ECMAScript source code
//!
//! Converts source text into a stream of tokens. Whether a `/` starts a
//! regular expression or is the division operator is decided from
//! `expr_allowed`, which the context rules in [`crate::context`] update after
//! every token.

use serde::{Serialize, Serializer};

use crate::charclass::{
    has_line_break, is_identifier_char, is_identifier_start, is_keyword, is_new_line,
    is_whitespace,
};
use crate::context::TokContext;
use crate::error::{PResult, Severity, SyntaxError};
use crate::extension::TokenReaderExtension;
use crate::options::Options;
use crate::regexp;

/// A line/column pair. Lines are 1-based, columns are 0-based byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 0 }
    }
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }

    /// Compute the position of byte `offset` in `input`.
    pub fn at(input: &str, offset: usize) -> Self {
        let offset = offset.min(input.len());
        let mut line = 1;
        let mut cur = 0;
        while let Some(next) = next_line_break(input, cur, offset) {
            line += 1;
            cur = next;
        }
        Position::new(line, to_u32(offset - cur))
    }
}

/// Start and end positions of a token or node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Offset just past the first line break in `input[from..end]`, if any.
/// `\r\n` counts as a single break.
pub(crate) fn next_line_break(input: &str, from: usize, end: usize) -> Option<usize> {
    let text = input.get(from..end)?;
    let (idx, ch) = text.char_indices().find(|&(_, c)| is_new_line(c))?;
    let after = from + idx + ch.len_utf8();
    if ch == '\r' && input.as_bytes().get(after) == Some(&b'\n') && after < end {
        Some(after + 1)
    } else {
        Some(after)
    }
}

pub(crate) fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Token types for ECMAScript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Num,
    Regexp,
    String,
    Name,
    PrivateId,
    Eof,

    // Punctuation
    BracketL,
    BracketR,
    BraceL,
    BraceR,
    ParenL,
    ParenR,
    Comma,
    Semi,
    Colon,
    Dot,
    Question,
    QuestionDot,
    Arrow,
    Template,
    InvalidTemplate,
    Ellipsis,
    BackQuote,
    DollarBraceL,

    // Assignment operators
    Eq,                 // =
    PlusEq,             // +=
    MinusEq,            // -=
    StarEq,             // *=
    SlashEq,            // /=
    PercentEq,          // %=
    StarStarEq,         // **=
    LtLtEq,             // <<=
    GtGtEq,             // >>=
    GtGtGtEq,           // >>>=
    PipeEq,             // |=
    CaretEq,            // ^=
    AmpEq,              // &=
    PipePipeEq,         // ||=
    AmpAmpEq,           // &&=
    QuestionQuestionEq, // ??=

    // Other operators
    PlusPlus,         // ++
    MinusMinus,       // --
    Bang,             // !
    Tilde,            // ~
    PipePipe,         // ||
    AmpAmp,           // &&
    Pipe,             // |
    Caret,            // ^
    Amp,              // &
    EqEq,             // ==
    NotEq,            // !=
    EqEqEq,           // ===
    NotEqEq,          // !==
    Lt,               // <
    Gt,               // >
    LtEq,             // <=
    GtEq,             // >=
    LtLt,             // <<
    GtGt,             // >>
    GtGtGt,           // >>>
    Plus,             // +
    Minus,            // -
    Percent,          // %
    Star,             // *
    Slash,            // /
    StarStar,         // **
    QuestionQuestion, // ??

    // Keywords
    Break,
    Case,
    Catch,
    Continue,
    Debugger,
    Default,
    Do,
    Else,
    Finally,
    For,
    Function,
    If,
    Return,
    Switch,
    Throw,
    Try,
    Var,
    Const,
    While,
    With,
    New,
    This,
    Super,
    Class,
    Extends,
    Export,
    Import,
    Null,
    True,
    False,
    In,
    Instanceof,
    Typeof,
    Void,
    Delete,

    /// Token produced by a [`TokenReaderExtension`]
    Custom(u16),
}

impl TokenKind {
    pub fn label(self) -> &'static str {
        use TokenKind::*;
        if let Some(word) = self.keyword() {
            return word;
        }
        match self {
            Num => "num",
            Regexp => "regexp",
            String => "string",
            Name => "name",
            PrivateId => "privateId",
            Eof => "eof",
            BracketL => "[",
            BracketR => "]",
            BraceL => "{",
            BraceR => "}",
            ParenL => "(",
            ParenR => ")",
            Comma => ",",
            Semi => ";",
            Colon => ":",
            Dot => ".",
            Question => "?",
            QuestionDot => "?.",
            Arrow => "=>",
            Template => "template",
            InvalidTemplate => "invalidTemplate",
            Ellipsis => "...",
            BackQuote => "`",
            DollarBraceL => "${",
            Eq => "=",
            PlusEq => "+=",
            MinusEq => "-=",
            StarEq => "*=",
            SlashEq => "/=",
            PercentEq => "%=",
            StarStarEq => "**=",
            LtLtEq => "<<=",
            GtGtEq => ">>=",
            GtGtGtEq => ">>>=",
            PipeEq => "|=",
            CaretEq => "^=",
            AmpEq => "&=",
            PipePipeEq => "||=",
            AmpAmpEq => "&&=",
            QuestionQuestionEq => "??=",
            PlusPlus => "++",
            MinusMinus => "--",
            Bang => "!",
            Tilde => "~",
            PipePipe => "||",
            AmpAmp => "&&",
            Pipe => "|",
            Caret => "^",
            Amp => "&",
            EqEq => "==",
            NotEq => "!=",
            EqEqEq => "===",
            NotEqEq => "!==",
            Lt => "<",
            Gt => ">",
            LtEq => "<=",
            GtEq => ">=",
            LtLt => "<<",
            GtGt => ">>",
            GtGtGt => ">>>",
            Plus => "+",
            Minus => "-",
            Percent => "%",
            Star => "*",
            Slash => "/",
            StarStar => "**",
            QuestionQuestion => "??",
            Custom(_) => "custom",
            _ => "",
        }
    }

    pub fn keyword(self) -> Option<&'static str> {
        use TokenKind::*;
        Some(match self {
            Break => "break",
            Case => "case",
            Catch => "catch",
            Continue => "continue",
            Debugger => "debugger",
            Default => "default",
            Do => "do",
            Else => "else",
            Finally => "finally",
            For => "for",
            Function => "function",
            If => "if",
            Return => "return",
            Switch => "switch",
            Throw => "throw",
            Try => "try",
            Var => "var",
            Const => "const",
            While => "while",
            With => "with",
            New => "new",
            This => "this",
            Super => "super",
            Class => "class",
            Extends => "extends",
            Export => "export",
            Import => "import",
            Null => "null",
            True => "true",
            False => "false",
            In => "in",
            Instanceof => "instanceof",
            Typeof => "typeof",
            Void => "void",
            Delete => "delete",
            _ => return None,
        })
    }

    pub fn from_keyword(word: &str) -> Option<TokenKind> {
        use TokenKind::*;
        Some(match word {
            "break" => Break,
            "case" => Case,
            "catch" => Catch,
            "continue" => Continue,
            "debugger" => Debugger,
            "default" => Default,
            "do" => Do,
            "else" => Else,
            "finally" => Finally,
            "for" => For,
            "function" => Function,
            "if" => If,
            "return" => Return,
            "switch" => Switch,
            "throw" => Throw,
            "try" => Try,
            "var" => Var,
            "const" => Const,
            "while" => While,
            "with" => With,
            "new" => New,
            "this" => This,
            "super" => Super,
            "class" => Class,
            "extends" => Extends,
            "export" => Export,
            "import" => Import,
            "null" => Null,
            "true" => True,
            "false" => False,
            "in" => In,
            "instanceof" => Instanceof,
            "typeof" => Typeof,
            "void" => Void,
            "delete" => Delete,
            _ => return None,
        })
    }

    /// Can an expression follow this token? Drives the regexp/divide decision.
    pub fn before_expr(self) -> bool {
        use TokenKind::*;
        self.is_assign()
            || self.binop().is_some()
            || matches!(
                self,
                BracketL
                    | BraceL
                    | ParenL
                    | Comma
                    | Semi
                    | Colon
                    | Question
                    | Arrow
                    | Ellipsis
                    | DollarBraceL
                    | Bang
                    | Tilde
                    | StarStar
                    | Case
                    | Default
                    | Do
                    | Else
                    | Return
                    | Throw
                    | New
                    | Typeof
                    | Void
                    | Delete
                    | Extends
            )
    }

    /// Can this token start an expression?
    pub fn starts_expr(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            BracketL
                | BraceL
                | ParenL
                | BackQuote
                | DollarBraceL
                | Num
                | String
                | Regexp
                | Name
                | PrivateId
                | PlusPlus
                | MinusMinus
                | Bang
                | Tilde
                | Plus
                | Minus
                | Function
                | Class
                | New
                | This
                | Super
                | Null
                | True
                | False
                | Typeof
                | Void
                | Delete
                | Import
        )
    }

    pub fn is_assign(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Eq | PlusEq
                | MinusEq
                | StarEq
                | SlashEq
                | PercentEq
                | StarStarEq
                | LtLtEq
                | GtGtEq
                | GtGtGtEq
                | PipeEq
                | CaretEq
                | AmpEq
                | PipePipeEq
                | AmpAmpEq
                | QuestionQuestionEq
        )
    }

    pub fn is_prefix(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Bang | Tilde | Plus | Minus | PlusPlus | MinusMinus | Typeof | Void | Delete
        )
    }

    pub fn is_update(self) -> bool {
        matches!(self, TokenKind::PlusPlus | TokenKind::MinusMinus)
    }

    pub fn is_loop(self) -> bool {
        matches!(self, TokenKind::For | TokenKind::While | TokenKind::Do)
    }

    /// Binary operator precedence, 1 (loosest) to 10. `**` is handled
    /// separately because it is right-associative.
    pub fn binop(self) -> Option<u8> {
        use TokenKind::*;
        Some(match self {
            PipePipe | QuestionQuestion => 1,
            AmpAmp => 2,
            Pipe => 3,
            Caret => 4,
            Amp => 5,
            EqEq | NotEq | EqEqEq | NotEqEq => 6,
            Lt | Gt | LtEq | GtEq | In | Instanceof => 7,
            LtLt | GtGt | GtGtGt => 8,
            Plus | Minus => 9,
            Percent | Star | Slash => 10,
            _ => return None,
        })
    }
}

impl Serialize for TokenKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// The decoded value carried by a token
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TokenValue {
    None,
    /// Identifier, keyword or private name text, escapes decoded
    Name(String),
    /// Cooked string or template chunk
    String(String),
    Number(f64),
    /// BigInt digits without the `n` suffix or separators
    BigInt(String),
    RegExp {
        pattern: String,
        flags: String,
    },
}

impl TokenValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::Name(s) | TokenValue::String(s) | TokenValue::BigInt(s) => Some(s),
            _ => None,
        }
    }
}

/// A token as handed to `on_token` and returned from `tokenize`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub value: TokenValue,
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[usize; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommentKind {
    Line,
    Block,
}

/// A comment as handed to `on_comment`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    #[serde(rename = "type")]
    pub kind: CommentKind,
    pub value: String,
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[usize; 2]>,
}

/// Errors while reading escapes. Inside a template an invalid escape does
/// not abort lexing; the chunk is re-read as an invalid template token.
pub(crate) enum ReadError {
    Syntax(SyntaxError),
    InvalidTemplateEscape(SyntaxError),
}

impl From<SyntaxError> for ReadError {
    fn from(err: SyntaxError) -> Self {
        ReadError::Syntax(err)
    }
}

impl From<ReadError> for SyntaxError {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::Syntax(err) | ReadError::InvalidTemplateEscape(err) => err,
        }
    }
}

/// Builds a cooked string, pairing `😀`-style surrogate escapes.
/// Unpaired surrogates become U+FFFD.
#[derive(Default)]
struct Cooked {
    out: String,
    high: Option<u32>,
}

impl Cooked {
    fn push_str(&mut self, s: &str) {
        self.flush();
        self.out.push_str(s);
    }

    fn push_char(&mut self, c: char) {
        self.flush();
        self.out.push(c);
    }

    fn push_code(&mut self, code: u32) {
        match (self.high.take(), code) {
            (Some(high), 0xDC00..=0xDFFF) => {
                let c = 0x10000 + ((high - 0xD800) << 10) + (code - 0xDC00);
                self.out.push(char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            (prev, 0xD800..=0xDBFF) => {
                if prev.is_some() {
                    self.out.push(char::REPLACEMENT_CHARACTER);
                }
                self.high = Some(code);
            }
            (prev, _) => {
                if prev.is_some() {
                    self.out.push(char::REPLACEMENT_CHARACTER);
                }
                self.out
                    .push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }
    }

    fn flush(&mut self) {
        if self.high.take().is_some() {
            self.out.push(char::REPLACEMENT_CHARACTER);
        }
    }

    fn finish(mut self) -> String {
        self.flush();
        self.out
    }
}

/// Saved lexer position for lookahead
#[derive(Debug, Clone)]
pub struct LexerCheckpoint {
    pos: usize,
    line_start: usize,
    cur_line: u32,
    kind: TokenKind,
    value: TokenValue,
    start: usize,
    end: usize,
    start_loc: Position,
    end_loc: Position,
    last_tok_start: usize,
    last_tok_end: usize,
    last_tok_start_loc: Position,
    last_tok_end_loc: Position,
    context: Vec<TokContext>,
    expr_allowed: bool,
    contains_esc: bool,
}

/// The tokenizer state. The parser owns one and drives it token by token.
pub struct Lexer<'a> {
    pub(crate) input: &'a str,
    pub(crate) options: Options,
    pub(crate) ecma_version: u32,
    pub(crate) in_module: bool,
    /// Set by the parser while inside strict code
    pub strict: bool,

    pub pos: usize,
    pub(crate) line_start: usize,
    pub(crate) cur_line: u32,

    pub kind: TokenKind,
    pub value: TokenValue,
    pub start: usize,
    pub end: usize,
    pub start_loc: Position,
    pub end_loc: Position,

    pub last_tok_start: usize,
    pub last_tok_end: usize,
    pub last_tok_start_loc: Position,
    pub last_tok_end_loc: Position,

    pub(crate) context: Vec<TokContext>,
    /// Whether an expression may start at the current position
    pub expr_allowed: bool,
    /// Whether the current word token contained a `\u` escape
    pub contains_esc: bool,

    in_template_element: bool,
    pub(crate) reader: Option<Box<dyn TokenReaderExtension>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, options: Options) -> Self {
        Self::new_at(input, options, 0)
    }

    /// Create a lexer that starts reading at byte offset `start_pos`.
    pub fn new_at(input: &'a str, options: Options, start_pos: usize) -> Self {
        let ecma_version = options.ecma_version.resolve();
        let in_module = options.is_module();
        let start_pos = start_pos.min(input.len());
        let line_start = input
            .get(..start_pos)
            .and_then(|s| s.rfind(['\n', '\r', '\u{2028}', '\u{2029}']).map(|i| (s, i)))
            .map_or(0, |(s, i)| {
                i + s.get(i..).and_then(|t| t.chars().next()).map_or(1, char::len_utf8)
            });
        let start_loc = Position::at(input, start_pos);
        let mut lexer = Lexer {
            input,
            ecma_version,
            in_module,
            strict: in_module,
            pos: start_pos,
            line_start,
            cur_line: start_loc.line,
            kind: TokenKind::Eof,
            value: TokenValue::None,
            start: start_pos,
            end: start_pos,
            start_loc,
            end_loc: start_loc,
            last_tok_start: start_pos,
            last_tok_end: start_pos,
            last_tok_start_loc: start_loc,
            last_tok_end_loc: start_loc,
            context: vec![TokContext::BStat],
            expr_allowed: true,
            contains_esc: false,
            in_template_element: false,
            reader: None,
            options,
        };
        if lexer.pos == 0 && lexer.options.allow_hash_bang() && input.starts_with("#!") {
            lexer.skip_line_comment(2);
        }
        lexer
    }

    /// Install a token reader extension.
    pub fn set_reader(&mut self, reader: Box<dyn TokenReaderExtension>) {
        self.reader = Some(reader);
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn ecma_version(&self) -> u32 {
        self.ecma_version
    }

    pub fn in_module(&self) -> bool {
        self.in_module
    }

    pub(crate) fn slice(&self, start: usize, end: usize) -> &'a str {
        self.input.get(start..end).unwrap_or("")
    }

    pub(crate) fn byte_at(&self, pos: usize) -> u8 {
        self.input.as_bytes().get(pos).copied().unwrap_or(0)
    }

    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.input.get(pos..).and_then(|s| s.chars().next())
    }

    pub fn peek(&self) -> Option<char> {
        self.char_at(self.pos)
    }

    pub fn cur_position(&self) -> Position {
        Position::new(self.cur_line, to_u32(self.pos.saturating_sub(self.line_start)))
    }

    pub(crate) fn new_line(&mut self) {
        self.cur_line += 1;
        self.line_start = self.pos;
    }

    pub(crate) fn source_location(&self, start: Position, end: Position) -> Option<SourceLocation> {
        self.options.locations.then(|| SourceLocation {
            start,
            end,
            source: self.options.source_file.clone(),
        })
    }

    pub(crate) fn range(&self, start: usize, end: usize) -> Option<[usize; 2]> {
        self.options.ranges.then_some([start, end])
    }

    /// Snapshot of the current token
    pub fn current_token(&self) -> Token {
        Token {
            kind: self.kind,
            value: self.value.clone(),
            start: self.start,
            end: self.end,
            loc: self.source_location(self.start_loc, self.end_loc),
            range: self.range(self.start, self.end),
        }
    }

    pub fn checkpoint(&self) -> LexerCheckpoint {
        LexerCheckpoint {
            pos: self.pos,
            line_start: self.line_start,
            cur_line: self.cur_line,
            kind: self.kind,
            value: self.value.clone(),
            start: self.start,
            end: self.end,
            start_loc: self.start_loc,
            end_loc: self.end_loc,
            last_tok_start: self.last_tok_start,
            last_tok_end: self.last_tok_end,
            last_tok_start_loc: self.last_tok_start_loc,
            last_tok_end_loc: self.last_tok_end_loc,
            context: self.context.clone(),
            expr_allowed: self.expr_allowed,
            contains_esc: self.contains_esc,
        }
    }

    pub fn restore(&mut self, checkpoint: LexerCheckpoint) {
        self.pos = checkpoint.pos;
        self.line_start = checkpoint.line_start;
        self.cur_line = checkpoint.cur_line;
        self.kind = checkpoint.kind;
        self.value = checkpoint.value;
        self.start = checkpoint.start;
        self.end = checkpoint.end;
        self.start_loc = checkpoint.start_loc;
        self.end_loc = checkpoint.end_loc;
        self.last_tok_start = checkpoint.last_tok_start;
        self.last_tok_end = checkpoint.last_tok_end;
        self.last_tok_start_loc = checkpoint.last_tok_start_loc;
        self.last_tok_end_loc = checkpoint.last_tok_end_loc;
        self.context = checkpoint.context;
        self.expr_allowed = checkpoint.expr_allowed;
        self.contains_esc = checkpoint.contains_esc;
    }

    pub fn raise(&self, pos: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.input, pos, message, Severity::Fatal)
    }

    pub fn raise_recoverable(&self, pos: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.input, pos, message, Severity::Recoverable)
    }

    pub fn unexpected(&self, pos: Option<usize>) -> SyntaxError {
        self.raise(pos.unwrap_or(self.start), "Unexpected token")
    }

    // ============ TOKEN STREAM ============

    /// Move to the next token, reporting the current one to `on_token`.
    pub fn next_token(&mut self) -> PResult<()> {
        if let Some(on_token) = self.options.on_token.clone() {
            on_token.call(&self.current_token());
        }
        self.last_tok_end = self.end;
        self.last_tok_start = self.start;
        self.last_tok_end_loc = self.end_loc;
        self.last_tok_start_loc = self.start_loc;
        self.read_next_token()
    }

    /// Advance and return the new current token.
    pub fn get_token(&mut self) -> PResult<Token> {
        self.next_token()?;
        Ok(self.current_token())
    }

    /// Read every token of a fresh lexer, including the final `eof`.
    pub fn tokenize_all(&mut self) -> PResult<Vec<Token>> {
        self.read_next_token()?;
        let mut tokens = Vec::new();
        loop {
            let token = self.current_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
            self.next_token()?;
        }
    }

    /// Read the next token into the current-token fields.
    pub(crate) fn read_next_token(&mut self) -> PResult<()> {
        let context = self.cur_context();
        if !context.preserve_space() {
            self.skip_space()?;
        }
        self.start = self.pos;
        self.start_loc = self.cur_position();
        if self.pos >= self.input.len() {
            self.finish_token(TokenKind::Eof, TokenValue::None);
            return Ok(());
        }

        if let Some(mut reader) = self.reader.take() {
            let read = reader.read_token(self);
            self.reader = Some(reader);
            if let Some(result) = read {
                let (kind, value) = result?;
                self.finish_token(kind, value);
                return Ok(());
            }
        }

        if context == TokContext::QTmpl {
            return self.try_read_template_token();
        }
        match self.peek() {
            Some(ch) => self.read_token(ch),
            None => Err(self.raise(self.pos, "Invalid character position")),
        }
    }

    fn read_token(&mut self, ch: char) -> PResult<()> {
        if is_identifier_start(ch, self.ecma_version >= 6) || ch == '\\' {
            return self.read_word();
        }
        self.get_token_from_code(ch)
    }

    pub(crate) fn finish_token(&mut self, kind: TokenKind, value: TokenValue) {
        self.end = self.pos;
        self.end_loc = self.cur_position();
        let prev = self.kind;
        self.kind = kind;
        self.value = value;
        self.update_context(prev);
    }

    fn finish_op(&mut self, kind: TokenKind, size: usize) -> PResult<()> {
        self.pos += size;
        self.finish_token(kind, TokenValue::None);
        Ok(())
    }

    // ============ WHITESPACE AND COMMENTS ============

    fn skip_block_comment(&mut self) -> PResult<()> {
        let start_loc = self.cur_position();
        let start = self.pos;
        let Some(offset) = self.input.get(start + 2..).and_then(|s| s.find("*/")) else {
            return Err(self.raise(start, "Unterminated comment"));
        };
        let end = start + 2 + offset;
        self.pos = end + 2;
        let mut from = start;
        while let Some(next) = next_line_break(self.input, from, self.pos) {
            self.cur_line += 1;
            self.line_start = next;
            from = next;
        }
        if let Some(on_comment) = self.options.on_comment.clone() {
            let comment = Comment {
                kind: CommentKind::Block,
                value: self.slice(start + 2, end).to_string(),
                start,
                end: self.pos,
                loc: self.source_location(start_loc, self.cur_position()),
                range: self.range(start, self.pos),
            };
            on_comment.call(&comment);
        }
        Ok(())
    }

    pub(crate) fn skip_line_comment(&mut self, start_skip: usize) {
        let start = self.pos;
        let start_loc = self.cur_position();
        self.pos += start_skip;
        while let Some(ch) = self.peek() {
            if is_new_line(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        if let Some(on_comment) = self.options.on_comment.clone() {
            let comment = Comment {
                kind: CommentKind::Line,
                value: self.slice(start + start_skip, self.pos).to_string(),
                start,
                end: self.pos,
                loc: self.source_location(start_loc, self.cur_position()),
                range: self.range(start, self.pos),
            };
            on_comment.call(&comment);
        }
    }

    pub(crate) fn skip_space(&mut self) -> PResult<()> {
        while let Some(ch) = self.peek() {
            match ch {
                '\r' => {
                    self.pos += 1;
                    if self.byte_at(self.pos) == b'\n' {
                        self.pos += 1;
                    }
                    self.new_line();
                }
                '\n' | '\u{2028}' | '\u{2029}' => {
                    self.pos += ch.len_utf8();
                    self.new_line();
                }
                '/' => match self.byte_at(self.pos + 1) {
                    b'*' => self.skip_block_comment()?,
                    b'/' => self.skip_line_comment(2),
                    _ => break,
                },
                c if is_whitespace(c) => self.pos += c.len_utf8(),
                _ => break,
            }
        }
        Ok(())
    }

    // ============ PUNCTUATORS ============

    fn read_token_dot(&mut self) -> PResult<()> {
        let next = self.byte_at(self.pos + 1);
        if next.is_ascii_digit() {
            return self.read_number(true);
        }
        if self.ecma_version >= 6 && next == b'.' && self.byte_at(self.pos + 2) == b'.' {
            return self.finish_op(TokenKind::Ellipsis, 3);
        }
        self.finish_op(TokenKind::Dot, 1)
    }

    fn read_token_slash(&mut self) -> PResult<()> {
        if self.expr_allowed {
            self.pos += 1;
            return self.read_regexp();
        }
        if self.byte_at(self.pos + 1) == b'=' {
            return self.finish_op(TokenKind::SlashEq, 2);
        }
        self.finish_op(TokenKind::Slash, 1)
    }

    fn read_token_mult_modulo_exp(&mut self, code: u8) -> PResult<()> {
        let mut next = self.byte_at(self.pos + 1);
        let mut size = 1;
        let mut kind = if code == b'*' {
            TokenKind::Star
        } else {
            TokenKind::Percent
        };
        if self.ecma_version >= 7 && code == b'*' && next == b'*' {
            size += 1;
            kind = TokenKind::StarStar;
            next = self.byte_at(self.pos + 2);
        }
        if next == b'=' {
            let assign = match kind {
                TokenKind::Star => TokenKind::StarEq,
                TokenKind::StarStar => TokenKind::StarStarEq,
                _ => TokenKind::PercentEq,
            };
            return self.finish_op(assign, size + 1);
        }
        self.finish_op(kind, size)
    }

    fn read_token_pipe_amp(&mut self, code: u8) -> PResult<()> {
        let next = self.byte_at(self.pos + 1);
        let pipe = code == b'|';
        if next == code {
            if self.ecma_version >= 12 && self.byte_at(self.pos + 2) == b'=' {
                let kind = if pipe {
                    TokenKind::PipePipeEq
                } else {
                    TokenKind::AmpAmpEq
                };
                return self.finish_op(kind, 3);
            }
            let kind = if pipe {
                TokenKind::PipePipe
            } else {
                TokenKind::AmpAmp
            };
            return self.finish_op(kind, 2);
        }
        if next == b'=' {
            let kind = if pipe {
                TokenKind::PipeEq
            } else {
                TokenKind::AmpEq
            };
            return self.finish_op(kind, 2);
        }
        self.finish_op(if pipe { TokenKind::Pipe } else { TokenKind::Amp }, 1)
    }

    fn read_token_caret(&mut self) -> PResult<()> {
        if self.byte_at(self.pos + 1) == b'=' {
            return self.finish_op(TokenKind::CaretEq, 2);
        }
        self.finish_op(TokenKind::Caret, 1)
    }

    fn read_token_plus_min(&mut self, code: u8) -> PResult<()> {
        let next = self.byte_at(self.pos + 1);
        if next == code {
            if next == b'-'
                && !self.in_module
                && self.byte_at(self.pos + 2) == b'>'
                && (self.last_tok_end == 0
                    || has_line_break(self.slice(self.last_tok_end, self.pos)))
            {
                // `-->` at the start of a line is an HTML-style line comment
                self.skip_line_comment(3);
                self.skip_space()?;
                return self.read_next_token();
            }
            let kind = if code == b'+' {
                TokenKind::PlusPlus
            } else {
                TokenKind::MinusMinus
            };
            return self.finish_op(kind, 2);
        }
        if next == b'=' {
            let kind = if code == b'+' {
                TokenKind::PlusEq
            } else {
                TokenKind::MinusEq
            };
            return self.finish_op(kind, 2);
        }
        self.finish_op(if code == b'+' { TokenKind::Plus } else { TokenKind::Minus }, 1)
    }

    fn read_token_lt_gt(&mut self, code: u8) -> PResult<()> {
        let next = self.byte_at(self.pos + 1);
        if next == code {
            let size = if code == b'>' && self.byte_at(self.pos + 2) == b'>' {
                3
            } else {
                2
            };
            if self.byte_at(self.pos + size) == b'=' {
                let kind = match size {
                    3 => TokenKind::GtGtGtEq,
                    _ if code == b'>' => TokenKind::GtGtEq,
                    _ => TokenKind::LtLtEq,
                };
                return self.finish_op(kind, size + 1);
            }
            let kind = match size {
                3 => TokenKind::GtGtGt,
                _ if code == b'>' => TokenKind::GtGt,
                _ => TokenKind::LtLt,
            };
            return self.finish_op(kind, size);
        }
        if next == b'!'
            && code == b'<'
            && !self.in_module
            && self.byte_at(self.pos + 2) == b'-'
            && self.byte_at(self.pos + 3) == b'-'
        {
            // `<!--` is an HTML-style line comment
            self.skip_line_comment(4);
            self.skip_space()?;
            return self.read_next_token();
        }
        if next == b'=' {
            let kind = if code == b'<' {
                TokenKind::LtEq
            } else {
                TokenKind::GtEq
            };
            return self.finish_op(kind, 2);
        }
        self.finish_op(if code == b'<' { TokenKind::Lt } else { TokenKind::Gt }, 1)
    }

    fn read_token_eq_excl(&mut self, code: u8) -> PResult<()> {
        let next = self.byte_at(self.pos + 1);
        if next == b'=' {
            let strict = self.byte_at(self.pos + 2) == b'=';
            let kind = match (code, strict) {
                (b'=', true) => TokenKind::EqEqEq,
                (b'=', false) => TokenKind::EqEq,
                (_, true) => TokenKind::NotEqEq,
                (_, false) => TokenKind::NotEq,
            };
            return self.finish_op(kind, if strict { 3 } else { 2 });
        }
        if code == b'=' && next == b'>' && self.ecma_version >= 6 {
            return self.finish_op(TokenKind::Arrow, 2);
        }
        self.finish_op(if code == b'=' { TokenKind::Eq } else { TokenKind::Bang }, 1)
    }

    fn read_token_question(&mut self) -> PResult<()> {
        if self.ecma_version >= 11 {
            let next = self.byte_at(self.pos + 1);
            if next == b'.' && !self.byte_at(self.pos + 2).is_ascii_digit() {
                return self.finish_op(TokenKind::QuestionDot, 2);
            }
            if next == b'?' {
                if self.ecma_version >= 12 && self.byte_at(self.pos + 2) == b'=' {
                    return self.finish_op(TokenKind::QuestionQuestionEq, 3);
                }
                return self.finish_op(TokenKind::QuestionQuestion, 2);
            }
        }
        self.finish_op(TokenKind::Question, 1)
    }

    fn read_token_number_sign(&mut self) -> PResult<()> {
        let mut ch = '#';
        if self.ecma_version >= 13 {
            self.pos += 1;
            match self.peek() {
                Some(c) if is_identifier_start(c, true) || c == '\\' => {
                    let name = self.read_word1()?;
                    self.finish_token(TokenKind::PrivateId, TokenValue::Name(name));
                    return Ok(());
                }
                Some(c) => ch = c,
                None => {}
            }
        }
        Err(self.raise(self.pos, format!("Unexpected character '{ch}'")))
    }

    fn get_token_from_code(&mut self, ch: char) -> PResult<()> {
        let code = if ch.is_ascii() { ch as u8 } else { 0 };
        match code {
            b'.' => self.read_token_dot(),
            b'(' => self.finish_op(TokenKind::ParenL, 1),
            b')' => self.finish_op(TokenKind::ParenR, 1),
            b';' => self.finish_op(TokenKind::Semi, 1),
            b',' => self.finish_op(TokenKind::Comma, 1),
            b'[' => self.finish_op(TokenKind::BracketL, 1),
            b']' => self.finish_op(TokenKind::BracketR, 1),
            b'{' => self.finish_op(TokenKind::BraceL, 1),
            b'}' => self.finish_op(TokenKind::BraceR, 1),
            b':' => self.finish_op(TokenKind::Colon, 1),
            b'`' if self.ecma_version >= 6 => self.finish_op(TokenKind::BackQuote, 1),
            b'0' => {
                let next = self.byte_at(self.pos + 1);
                match next {
                    b'x' | b'X' => self.read_radix_number(16),
                    b'o' | b'O' if self.ecma_version >= 6 => self.read_radix_number(8),
                    b'b' | b'B' if self.ecma_version >= 6 => self.read_radix_number(2),
                    _ => self.read_number(false),
                }
            }
            b'1'..=b'9' => self.read_number(false),
            b'"' | b'\'' => self.read_string(ch),
            b'/' => self.read_token_slash(),
            b'%' | b'*' => self.read_token_mult_modulo_exp(code),
            b'|' | b'&' => self.read_token_pipe_amp(code),
            b'^' => self.read_token_caret(),
            b'+' | b'-' => self.read_token_plus_min(code),
            b'<' | b'>' => self.read_token_lt_gt(code),
            b'=' | b'!' => self.read_token_eq_excl(code),
            b'?' => self.read_token_question(),
            b'~' => self.finish_op(TokenKind::Tilde, 1),
            b'#' => self.read_token_number_sign(),
            _ => Err(self.raise(self.pos, format!("Unexpected character '{ch}'"))),
        }
    }

    // ============ REGULAR EXPRESSIONS ============

    /// Read a regular expression body and flags. `pos` must be just past
    /// the opening `/`. The parser calls this when it finds a `/` or `/=`
    /// token where an expression is expected.
    pub fn read_regexp(&mut self) -> PResult<()> {
        let start = self.pos;
        let mut escaped = false;
        let mut in_class = false;
        loop {
            let Some(ch) = self.peek() else {
                return Err(self.raise(start, "Unterminated regular expression"));
            };
            if is_new_line(ch) {
                return Err(self.raise(start, "Unterminated regular expression"));
            }
            if !escaped {
                match ch {
                    '[' => in_class = true,
                    ']' if in_class => in_class = false,
                    '/' if !in_class => break,
                    _ => {}
                }
                escaped = ch == '\\';
            } else {
                escaped = false;
            }
            self.pos += ch.len_utf8();
        }
        let pattern = self.slice(start, self.pos).to_string();
        self.pos += 1;
        let flags_start = self.pos;
        let flags = self.read_word1()?;
        if self.contains_esc {
            return Err(self.unexpected(Some(flags_start)));
        }
        tracing::trace!(%pattern, %flags, "validating regular expression");
        if let Err(err) = regexp::validate_literal(&pattern, &flags, self.ecma_version) {
            return Err(self.raise_recoverable(
                self.start,
                format!("Invalid regular expression: /{pattern}/: {}", err.message),
            ));
        }
        self.finish_token(TokenKind::Regexp, TokenValue::RegExp { pattern, flags });
        Ok(())
    }

    // ============ NUMBERS ============

    fn read_int(
        &mut self,
        radix: u32,
        len: Option<usize>,
        maybe_legacy_octal: bool,
    ) -> PResult<Option<f64>> {
        let allow_separators = self.ecma_version >= 12 && len.is_none();
        let is_legacy_octal = maybe_legacy_octal && self.byte_at(self.pos) == b'0';
        let start = self.pos;
        let limit = len.unwrap_or(usize::MAX);
        let mut total = 0.0;
        let mut last = 0u8;
        let mut i = 0;
        while i < limit {
            let code = self.byte_at(self.pos);
            if allow_separators && code == b'_' {
                if is_legacy_octal {
                    return Err(self.raise_recoverable(
                        self.pos,
                        "Numeric separator is not allowed in legacy octal numeric literals",
                    ));
                }
                if last == b'_' {
                    return Err(self.raise_recoverable(
                        self.pos,
                        "Numeric separator must be exactly one underscore",
                    ));
                }
                if i == 0 {
                    return Err(self.raise_recoverable(
                        self.pos,
                        "Numeric separator is not allowed at the first of digits",
                    ));
                }
                last = code;
                i += 1;
                self.pos += 1;
                continue;
            }
            let val = match code {
                b'a'..=b'z' => code - b'a' + 10,
                b'A'..=b'Z' => code - b'A' + 10,
                b'0'..=b'9' => code - b'0',
                _ => break,
            };
            if u32::from(val) >= radix {
                break;
            }
            last = code;
            total = total * f64::from(radix) + f64::from(val);
            i += 1;
            self.pos += 1;
        }
        if allow_separators && last == b'_' {
            return Err(self.raise_recoverable(
                self.pos - 1,
                "Numeric separator is not allowed at the last of digits",
            ));
        }
        if self.pos == start || len.is_some_and(|l| self.pos - start != l) {
            return Ok(None);
        }
        Ok(Some(total))
    }

    fn read_radix_number(&mut self, radix: u32) -> PResult<()> {
        let start = self.pos;
        self.pos += 2;
        let Some(val) = self.read_int(radix, None, false)? else {
            return Err(self.raise(self.start + 2, format!("Expected number in radix {radix}")));
        };
        if self.ecma_version >= 11 && self.byte_at(self.pos) == b'n' {
            let digits = self.slice(start, self.pos).replace('_', "");
            self.pos += 1;
            self.finish_token(TokenKind::Num, TokenValue::BigInt(digits));
            return Ok(());
        }
        self.check_no_identifier_after_number()?;
        self.finish_token(TokenKind::Num, TokenValue::Number(val));
        Ok(())
    }

    fn check_no_identifier_after_number(&self) -> PResult<()> {
        match self.peek() {
            Some(c) if is_identifier_start(c, self.ecma_version >= 6) => {
                Err(self.raise(self.pos, "Identifier directly after number"))
            }
            _ => Ok(()),
        }
    }

    fn read_number(&mut self, starts_with_dot: bool) -> PResult<()> {
        let start = self.pos;
        if !starts_with_dot && self.read_int(10, None, true)?.is_none() {
            return Err(self.raise(start, "Invalid number"));
        }
        let mut octal = self.pos - start >= 2 && self.byte_at(start) == b'0';
        if octal && self.strict {
            return Err(self.raise(start, "Invalid number"));
        }
        let mut next = self.byte_at(self.pos);
        if !octal && !starts_with_dot && self.ecma_version >= 11 && next == b'n' {
            let digits = self.slice(start, self.pos).replace('_', "");
            self.pos += 1;
            self.check_no_identifier_after_number()?;
            self.finish_token(TokenKind::Num, TokenValue::BigInt(digits));
            return Ok(());
        }
        if octal && self.slice(start, self.pos).contains(['8', '9']) {
            octal = false;
        }
        if next == b'.' && !octal {
            self.pos += 1;
            self.read_int(10, None, false)?;
            next = self.byte_at(self.pos);
        }
        if (next == b'e' || next == b'E') && !octal {
            self.pos += 1;
            if matches!(self.byte_at(self.pos), b'+' | b'-') {
                self.pos += 1;
            }
            if self.read_int(10, None, false)?.is_none() {
                return Err(self.raise(start, "Invalid number"));
            }
        }
        self.check_no_identifier_after_number()?;

        let text = self.slice(start, self.pos);
        let value = if octal {
            text.bytes()
                .fold(0.0, |acc, b| acc * 8.0 + f64::from(b.wrapping_sub(b'0')))
        } else {
            match text.replace('_', "").parse::<f64>() {
                Ok(v) => v,
                Err(_) => return Err(self.raise(start, "Invalid number")),
            }
        };
        self.finish_token(TokenKind::Num, TokenValue::Number(value));
        Ok(())
    }

    // ============ STRINGS AND TEMPLATES ============

    fn read_code_point(&mut self) -> Result<u32, ReadError> {
        if self.byte_at(self.pos) == b'{' {
            if self.ecma_version < 6 {
                return Err(self.unexpected(None).into());
            }
            self.pos += 1;
            let code_pos = self.pos;
            let Some(close) = self.input.get(self.pos..).and_then(|s| s.find('}')) else {
                return Err(self.invalid_string_token(code_pos, "Bad character escape sequence"));
            };
            let code = self.read_hex_char(close)?;
            self.pos += 1;
            if code > 0x10FFFF {
                return Err(self.invalid_string_token(code_pos, "Code point out of bounds"));
            }
            Ok(code)
        } else {
            self.read_hex_char(4)
        }
    }

    fn read_string(&mut self, quote: char) -> PResult<()> {
        let mut out = Cooked::default();
        self.pos += 1;
        let mut chunk_start = self.pos;
        loop {
            let Some(ch) = self.peek() else {
                return Err(self.raise(self.start, "Unterminated string constant"));
            };
            if ch == quote {
                break;
            }
            match ch {
                '\\' => {
                    out.push_str(self.slice(chunk_start, self.pos));
                    if let Some(code) = self.read_escaped_char(false)? {
                        out.push_code(code);
                    }
                    chunk_start = self.pos;
                }
                '\u{2028}' | '\u{2029}' => {
                    if self.ecma_version < 10 {
                        return Err(self.raise(self.start, "Unterminated string constant"));
                    }
                    self.pos += ch.len_utf8();
                    self.new_line();
                }
                c if is_new_line(c) => {
                    return Err(self.raise(self.start, "Unterminated string constant"));
                }
                c => self.pos += c.len_utf8(),
            }
        }
        out.push_str(self.slice(chunk_start, self.pos));
        self.pos += 1;
        self.finish_token(TokenKind::String, TokenValue::String(out.finish()));
        Ok(())
    }

    fn try_read_template_token(&mut self) -> PResult<()> {
        self.in_template_element = true;
        let result = match self.read_tmpl_token() {
            Ok(()) => Ok(()),
            Err(ReadError::InvalidTemplateEscape(_)) => self.read_invalid_template_token(),
            Err(ReadError::Syntax(err)) => Err(err),
        };
        self.in_template_element = false;
        result
    }

    fn invalid_string_token(&self, pos: usize, message: &str) -> ReadError {
        if self.in_template_element && self.ecma_version >= 9 {
            ReadError::InvalidTemplateEscape(self.raise(pos, message))
        } else {
            ReadError::Syntax(self.raise(pos, message))
        }
    }

    fn read_tmpl_token(&mut self) -> Result<(), ReadError> {
        let mut out = Cooked::default();
        let mut chunk_start = self.pos;
        loop {
            let Some(ch) = self.peek() else {
                return Err(self.raise(self.start, "Unterminated template").into());
            };
            if ch == '`' || (ch == '$' && self.byte_at(self.pos + 1) == b'{') {
                if self.pos == self.start
                    && matches!(self.kind, TokenKind::Template | TokenKind::InvalidTemplate)
                {
                    if ch == '$' {
                        self.pos += 2;
                        self.finish_token(TokenKind::DollarBraceL, TokenValue::None);
                    } else {
                        self.pos += 1;
                        self.finish_token(TokenKind::BackQuote, TokenValue::None);
                    }
                    return Ok(());
                }
                out.push_str(self.slice(chunk_start, self.pos));
                self.finish_token(TokenKind::Template, TokenValue::String(out.finish()));
                return Ok(());
            }
            if ch == '\\' {
                out.push_str(self.slice(chunk_start, self.pos));
                if let Some(code) = self.read_escaped_char(true)? {
                    out.push_code(code);
                }
                chunk_start = self.pos;
            } else if is_new_line(ch) {
                out.push_str(self.slice(chunk_start, self.pos));
                self.pos += ch.len_utf8();
                if ch == '\r' {
                    if self.byte_at(self.pos) == b'\n' {
                        self.pos += 1;
                    }
                    out.push_char('\n');
                } else {
                    out.push_char(ch);
                }
                self.new_line();
                chunk_start = self.pos;
            } else {
                self.pos += ch.len_utf8();
            }
        }
    }

    /// Skip to the end of a template chunk that holds an invalid escape.
    fn read_invalid_template_token(&mut self) -> PResult<()> {
        while let Some(ch) = self.peek() {
            match ch {
                '\\' => {
                    self.pos += 1;
                    if let Some(escaped) = self.peek() {
                        self.pos += escaped.len_utf8();
                    }
                    continue;
                }
                '$' if self.byte_at(self.pos + 1) == b'{' => {
                    self.finish_token(TokenKind::InvalidTemplate, TokenValue::None);
                    return Ok(());
                }
                '`' => {
                    self.finish_token(TokenKind::InvalidTemplate, TokenValue::None);
                    return Ok(());
                }
                '\r' => {
                    self.pos += 1;
                    if self.byte_at(self.pos) == b'\n' {
                        self.pos += 1;
                    }
                    self.new_line();
                    continue;
                }
                '\n' | '\u{2028}' | '\u{2029}' => {
                    self.pos += ch.len_utf8();
                    self.new_line();
                    continue;
                }
                _ => {}
            }
            self.pos += ch.len_utf8();
        }
        Err(self.raise(self.start, "Unterminated template"))
    }

    /// Decode the escape at `pos` (which points at the backslash).
    /// Returns `None` for line continuations.
    fn read_escaped_char(&mut self, in_template: bool) -> Result<Option<u32>, ReadError> {
        self.pos += 1;
        let Some(ch) = self.peek() else {
            return Err(self.raise(self.start, "Unterminated string constant").into());
        };
        self.pos += ch.len_utf8();
        match ch {
            'n' => Ok(Some(u32::from('\n'))),
            'r' => Ok(Some(u32::from('\r'))),
            'x' => self.read_hex_char(2).map(Some),
            'u' => self.read_code_point().map(Some),
            't' => Ok(Some(u32::from('\t'))),
            'b' => Ok(Some(0x08)),
            'v' => Ok(Some(0x0B)),
            'f' => Ok(Some(0x0C)),
            '\r' => {
                if self.byte_at(self.pos) == b'\n' {
                    self.pos += 1;
                }
                self.new_line();
                Ok(None)
            }
            '\n' => {
                self.new_line();
                Ok(None)
            }
            '8' | '9' => {
                if self.strict {
                    return Err(self.invalid_string_token(self.pos - 1, "Invalid escape sequence"));
                }
                if in_template {
                    return Err(self.invalid_string_token(
                        self.pos - 1,
                        "Invalid escape sequence in template string",
                    ));
                }
                Ok(Some(u32::from(ch)))
            }
            '0'..='7' => {
                let digits: String = self
                    .input
                    .as_bytes()
                    .get(self.pos - 1..)
                    .unwrap_or_default()
                    .iter()
                    .take(3)
                    .take_while(|b| matches!(b, b'0'..=b'7'))
                    .map(|&b| char::from(b))
                    .collect();
                let mut octal_str = digits.as_str();
                let mut octal = u32::from_str_radix(octal_str, 8).unwrap_or(0);
                if octal > 255 {
                    octal_str = octal_str.get(..octal_str.len() - 1).unwrap_or("");
                    octal = u32::from_str_radix(octal_str, 8).unwrap_or(0);
                }
                self.pos += octal_str.len() - 1;
                let next = self.byte_at(self.pos);
                let legacy = octal_str != "0" || next == b'8' || next == b'9';
                if legacy && (self.strict || in_template) {
                    let message = if in_template {
                        "Octal literal in template string"
                    } else {
                        "Octal literal in strict mode"
                    };
                    return Err(self.invalid_string_token(self.pos - 1 - octal_str.len(), message));
                }
                Ok(Some(octal))
            }
            c if is_new_line(c) => {
                self.new_line();
                Ok(None)
            }
            c => Ok(Some(u32::from(c))),
        }
    }

    fn read_hex_char(&mut self, len: usize) -> Result<u32, ReadError> {
        let code_pos = self.pos;
        match self.read_int(16, Some(len), false)? {
            Some(n) if n <= f64::from(u32::MAX) => Ok(n as u32),
            Some(_) => Ok(u32::MAX),
            None => Err(self.invalid_string_token(code_pos, "Bad character escape sequence")),
        }
    }

    // ============ IDENTIFIERS ============

    /// Read an identifier, decoding `\u` escapes. Sets `contains_esc`.
    pub(crate) fn read_word1(&mut self) -> PResult<String> {
        self.contains_esc = false;
        let mut word = String::new();
        let mut first = true;
        let mut chunk_start = self.pos;
        let astral = self.ecma_version >= 6;
        while let Some(ch) = self.peek() {
            if is_identifier_char(ch, astral) {
                self.pos += ch.len_utf8();
            } else if ch == '\\' {
                self.contains_esc = true;
                word.push_str(self.slice(chunk_start, self.pos));
                let esc_start = self.pos;
                self.pos += 1;
                if self.byte_at(self.pos) != b'u' {
                    return Err(self.raise(self.pos, "Expecting Unicode escape sequence \\uXXXX"));
                }
                self.pos += 1;
                let code = self.read_code_point()?;
                let valid = char::from_u32(code).filter(|&c| {
                    if first {
                        is_identifier_start(c, astral)
                    } else {
                        is_identifier_char(c, astral)
                    }
                });
                let Some(c) = valid else {
                    return Err(self.raise(esc_start, "Invalid Unicode escape"));
                };
                word.push(c);
                chunk_start = self.pos;
            } else {
                break;
            }
            first = false;
        }
        word.push_str(self.slice(chunk_start, self.pos));
        Ok(word)
    }

    fn read_word(&mut self) -> PResult<()> {
        let word = self.read_word1()?;
        let kind = if is_keyword(&word, self.ecma_version, self.in_module) {
            TokenKind::from_keyword(&word).unwrap_or(TokenKind::Name)
        } else {
            TokenKind::Name
        };
        self.finish_token(kind, TokenValue::Name(word));
        Ok(())
    }
}

/// Iterator over the tokens of a source text, ending with `eof`.
pub struct Tokenizer<'a> {
    lexer: Lexer<'a>,
    started: bool,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str, options: Options) -> Self {
        Tokenizer {
            lexer: Lexer::new(input, options),
            started: false,
            done: false,
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = PResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = if self.started {
            self.lexer.get_token()
        } else {
            self.started = true;
            self.lexer
                .read_next_token()
                .map(|()| self.lexer.current_token())
        };
        match &result {
            Ok(token) if token.kind != TokenKind::Eof => {}
            _ => self.done = true,
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<TokenKind> {
        Tokenizer::new(source, Options::default())
            .map(|t| t.unwrap().kind)
            .collect()
    }

    fn values(source: &str) -> Vec<TokenValue> {
        Tokenizer::new(source, Options::default())
            .map(|t| t.unwrap().value)
            .collect()
    }

    fn lex_err(source: &str) -> SyntaxError {
        Tokenizer::new(source, Options::default())
            .find_map(Result::err)
            .unwrap()
    }

    #[test]
    fn test_punctuators() {
        assert_eq!(
            lex("a >>>= b ?? c ?. d"),
            vec![
                TokenKind::Name,
                TokenKind::GtGtGtEq,
                TokenKind::Name,
                TokenKind::QuestionQuestion,
                TokenKind::Name,
                TokenKind::QuestionDot,
                TokenKind::Name,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_question_dot_before_digit() {
        assert_eq!(
            lex("a?.5:b"),
            vec![
                TokenKind::Name,
                TokenKind::Question,
                TokenKind::Num,
                TokenKind::Colon,
                TokenKind::Name,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_and_names() {
        assert_eq!(
            lex("let x = this"),
            vec![
                TokenKind::Name,
                TokenKind::Name,
                TokenKind::Eq,
                TokenKind::This,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            values("0x1F 1_000 .5 1e3 0b101"),
            vec![
                TokenValue::Number(31.0),
                TokenValue::Number(1000.0),
                TokenValue::Number(0.5),
                TokenValue::Number(1000.0),
                TokenValue::Number(5.0),
                TokenValue::None,
            ]
        );
    }

    #[test]
    fn test_legacy_octal() {
        assert_eq!(values("0123")[0], TokenValue::Number(83.0));
        assert_eq!(values("089")[0], TokenValue::Number(89.0));
    }

    #[test]
    fn test_bigint() {
        assert_eq!(values("12_3n")[0], TokenValue::BigInt("123".to_string()));
        assert_eq!(values("0xFFn")[0], TokenValue::BigInt("0xFF".to_string()));
    }

    #[test]
    fn test_identifier_after_number() {
        assert_eq!(lex_err("3in x").message, "Identifier directly after number");
    }

    #[test]
    fn test_separator_errors() {
        assert_eq!(
            lex_err("1__0").message,
            "Numeric separator must be exactly one underscore"
        );
        assert_eq!(
            lex_err("10_").message,
            "Numeric separator is not allowed at the last of digits"
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            values(r#"'a\nb' "\x41B\u{43}" '😀'"#),
            vec![
                TokenValue::String("a\nb".to_string()),
                TokenValue::String("ABC".to_string()),
                TokenValue::String("😀".to_string()),
                TokenValue::None,
            ]
        );
    }

    #[test]
    fn test_line_continuation() {
        assert_eq!(values("'a\\\nb'")[0], TokenValue::String("ab".to_string()));
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(lex_err("'abc").message, "Unterminated string constant");
        assert_eq!(lex_err("'ab\nc'").message, "Unterminated string constant");
    }

    #[test]
    fn test_regexp_vs_divide() {
        assert_eq!(
            lex("a / b / c"),
            vec![
                TokenKind::Name,
                TokenKind::Slash,
                TokenKind::Name,
                TokenKind::Slash,
                TokenKind::Name,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            lex("x = /ab+c/gi"),
            vec![
                TokenKind::Name,
                TokenKind::Eq,
                TokenKind::Regexp,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            values("x = /[/]/")[2],
            TokenValue::RegExp {
                pattern: "[/]".to_string(),
                flags: String::new()
            }
        );
    }

    #[test]
    fn test_regexp_after_paren_of_if() {
        assert_eq!(
            lex("if (a) /b/.test(c)")[4],
            TokenKind::Regexp,
            "a `/` after the condition of `if` starts a regexp"
        );
    }

    #[test]
    fn test_template_tokens() {
        assert_eq!(
            lex("`a${b}c`"),
            vec![
                TokenKind::BackQuote,
                TokenKind::Template,
                TokenKind::DollarBraceL,
                TokenKind::Name,
                TokenKind::BraceR,
                TokenKind::Template,
                TokenKind::BackQuote,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_invalid_template_escape() {
        assert_eq!(
            lex(r"`\unicode`"),
            vec![
                TokenKind::BackQuote,
                TokenKind::InvalidTemplate,
                TokenKind::BackQuote,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_html_comments() {
        assert_eq!(
            lex("x <!-- y\n--> z\nq"),
            vec![TokenKind::Name, TokenKind::Name, TokenKind::Eof]
        );
        let module = Tokenizer::new("x <!-- y", Options::module())
            .map(|t| t.unwrap().kind)
            .collect::<Vec<_>>();
        assert_eq!(module[1], TokenKind::Lt);
    }

    #[test]
    fn test_hashbang() {
        assert_eq!(lex("#!/usr/bin/env node\nx"), vec![TokenKind::Name, TokenKind::Eof]);
    }

    #[test]
    fn test_private_name() {
        let tokens: Vec<Token> = Tokenizer::new("#foo", Options::default())
            .map(Result::unwrap)
            .collect();
        assert_eq!(tokens[0].kind, TokenKind::PrivateId);
        assert_eq!(tokens[0].value, TokenValue::Name("foo".to_string()));
    }

    #[test]
    fn test_unicode_escape_in_identifier() {
        let tokens: Vec<Token> = Tokenizer::new("\\u0061b", Options::default())
            .map(Result::unwrap)
            .collect();
        assert_eq!(tokens[0].value, TokenValue::Name("ab".to_string()));
        assert_eq!(lex_err("\\u0031").message, "Invalid Unicode escape");
    }

    #[test]
    fn test_unterminated_comment() {
        assert_eq!(lex_err("/* abc").message, "Unterminated comment");
    }

    #[test]
    fn test_position_tracking() {
        let tokens: Vec<Token> = Tokenizer::new("a\n  b", Options::default().with_locations())
            .map(Result::unwrap)
            .collect();
        let loc = tokens[1].loc.clone().unwrap();
        assert_eq!(loc.start, Position::new(2, 2));
        assert_eq!(loc.end, Position::new(2, 3));
    }

    #[test]
    fn test_checkpoint_restore() {
        let mut lexer = Lexer::new("a + b", Options::default());
        lexer.next_token().unwrap();
        let checkpoint = lexer.checkpoint();
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        assert_eq!(lexer.kind, TokenKind::Name);
        lexer.restore(checkpoint);
        assert_eq!(lexer.kind, TokenKind::Name);
        assert_eq!(lexer.start, 0);
        lexer.next_token().unwrap();
        assert_eq!(lexer.kind, TokenKind::Plus);
    }
}
