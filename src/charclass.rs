//! Character classification and reserved-word tables

use unicode_xid::UnicodeXID;

/// Zero-width non-joiner, allowed inside identifiers
pub const ZWNJ: char = '\u{200C}';
/// Zero-width joiner, allowed inside identifiers
pub const ZWJ: char = '\u{200D}';

/// Can `ch` start an identifier?
///
/// `astral` is false for ES5 and below, where only BMP characters qualify.
pub fn is_identifier_start(ch: char, astral: bool) -> bool {
    match ch {
        'a'..='z' | 'A'..='Z' | '$' | '_' => true,
        c if c.is_ascii() => false,
        c if !astral && (c as u32) > 0xFFFF => false,
        c => c.is_xid_start(),
    }
}

/// Can `ch` continue an identifier?
pub fn is_identifier_char(ch: char, astral: bool) -> bool {
    match ch {
        'a'..='z' | 'A'..='Z' | '0'..='9' | '$' | '_' => true,
        c if c.is_ascii() => false,
        ZWNJ | ZWJ => true,
        c if !astral && (c as u32) > 0xFFFF => false,
        c => c.is_xid_continue(),
    }
}

/// ECMAScript LineTerminator
pub fn is_new_line(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Does `text` contain any line terminator?
pub fn has_line_break(text: &str) -> bool {
    text.chars().any(is_new_line)
}

/// ECMAScript WhiteSpace, excluding line terminators
pub fn is_whitespace(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\u{000B}' | '\u{000C}' | ' ' | '\u{00A0}' | '\u{FEFF}' | '\u{1680}'
            | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}

/// Byte offset of the first non-whitespace, non-comment character at or after `pos`.
///
/// Comments are skipped too, mirroring the lookahead the parser does for
/// contextual keywords like `let`, `async` and `using`.
pub fn skip_white_space(input: &str, mut pos: usize) -> usize {
    let bytes = input.as_bytes();
    loop {
        let Some(rest) = input.get(pos..) else {
            return pos;
        };
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) if is_whitespace(c) || is_new_line(c) => pos += c.len_utf8(),
            Some('/') if bytes.get(pos + 1) == Some(&b'/') => {
                pos += 2;
                while let Some(c) = input.get(pos..).and_then(|s| s.chars().next()) {
                    if is_new_line(c) {
                        break;
                    }
                    pos += c.len_utf8();
                }
            }
            Some('/') if bytes.get(pos + 1) == Some(&b'*') => {
                match input.get(pos + 2..).and_then(|s| s.find("*/")) {
                    Some(end) => pos += 2 + end + 2,
                    None => return input.len(),
                }
            }
            _ => return pos,
        }
    }
}

pub fn is_hex_digit(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

pub fn is_octal_digit(ch: char) -> bool {
    matches!(ch, '0'..='7')
}

pub fn is_decimal_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Is `word` a keyword in the given edition?
pub fn is_keyword(word: &str, ecma_version: u32, module: bool) -> bool {
    match word {
        "break" | "case" | "catch" | "continue" | "debugger" | "default" | "do" | "else"
        | "finally" | "for" | "function" | "if" | "return" | "switch" | "throw" | "try"
        | "var" | "while" | "with" | "null" | "true" | "false" | "instanceof" | "typeof"
        | "void" | "delete" | "new" | "in" | "this" => true,
        "export" | "import" => ecma_version >= 6 || module,
        "const" | "class" | "extends" | "super" => ecma_version >= 6,
        _ => false,
    }
}

/// Reserved-word sets in effect for one parse
#[derive(Debug, Clone, Copy)]
pub struct ReservedWords {
    ecma_version: u32,
    module: bool,
    allow_reserved: bool,
}

impl ReservedWords {
    pub fn new(ecma_version: u32, module: bool, allow_reserved: bool) -> Self {
        ReservedWords {
            ecma_version,
            module,
            allow_reserved,
        }
    }

    /// Words reserved in sloppy code
    pub fn is_reserved(&self, word: &str) -> bool {
        if self.allow_reserved {
            return false;
        }
        if self.module && word == "await" {
            return true;
        }
        match self.ecma_version {
            v if v >= 6 => word == "enum",
            5 => matches!(
                word,
                "class" | "enum" | "extends" | "super" | "const" | "export" | "import"
            ),
            _ => is_es3_reserved(word),
        }
    }

    /// Words reserved in strict code
    pub fn is_reserved_strict(&self, word: &str) -> bool {
        self.is_reserved(word)
            || matches!(
                word,
                "implements"
                    | "interface"
                    | "let"
                    | "package"
                    | "private"
                    | "protected"
                    | "public"
                    | "static"
                    | "yield"
            )
    }

    /// Words that may not be bound in strict code
    pub fn is_reserved_strict_bind(&self, word: &str) -> bool {
        self.is_reserved_strict(word) || matches!(word, "eval" | "arguments")
    }
}

fn is_es3_reserved(word: &str) -> bool {
    matches!(
        word,
        "abstract"
            | "boolean"
            | "byte"
            | "char"
            | "class"
            | "double"
            | "enum"
            | "export"
            | "extends"
            | "final"
            | "float"
            | "goto"
            | "implements"
            | "import"
            | "int"
            | "interface"
            | "long"
            | "native"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "short"
            | "static"
            | "super"
            | "synchronized"
            | "throws"
            | "transient"
            | "volatile"
    )
}
