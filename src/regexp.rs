//! Regular expression literal validation
//!
//! A recursive-descent parser over the body of a regexp literal, run once
//! per literal when the lexer reads it. It only validates; no pattern
//! representation is built.
//!
//! ```
//! use ecmaparse::regexp::validate;
//!
//! assert!(validate("(?<n>a)|(?<n>b)", "").is_ok());
//! assert!(validate("(?<n>a)(?<n>b)", "").is_err());
//! assert!(validate("[\\q{abc}--\\q{a}]", "v").is_ok());
//! ```

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::charclass::{is_identifier_char, is_identifier_start};
use crate::limits::{MAX_REGEXP_NESTING_DEPTH, ensure_stack};
use crate::options::LATEST_ECMA_VERSION;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RegExpError {
    pub message: String,
}

type VResult<T> = Result<T, RegExpError>;

/// Validate a pattern and flags against the latest grammar.
pub fn validate(pattern: &str, flags: &str) -> Result<(), RegExpError> {
    validate_literal(pattern, flags, LATEST_ECMA_VERSION)
}

/// Validate a pattern and flags against the grammar of `ecma_version`.
pub fn validate_literal(pattern: &str, flags: &str, ecma_version: u32) -> Result<(), RegExpError> {
    let mut validator = RegExpValidator::new(pattern, flags, ecma_version);
    validator.validate_flags()?;
    validator.validate_pattern()
}

/// What a character-class construct can match. Negated classes must not
/// contain constructs that match multi-character strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharSet {
    /// Nothing was parsed
    None,
    /// Matches single characters only
    Ok,
    /// May match strings (`\q{abc}`, `\p{RGI_Emoji}`)
    String,
}

impl CharSet {
    fn parsed(self) -> bool {
        self != CharSet::None
    }
}

/// A node in the alternation tree. Two nodes with the same `base` are
/// alternatives of the same disjunction.
#[derive(Debug, Clone, Copy)]
struct Branch {
    parent: Option<usize>,
    base: usize,
}

pub struct RegExpValidator {
    ecma_version: u32,
    source: Vec<u16>,
    flags: String,
    valid_flags: String,
    switch_u: bool,
    switch_v: bool,
    switch_n: bool,
    pos: usize,
    /// Value of the last code point or number eaten; `None` after a
    /// class escape such as `\d` that stands for a set.
    last_int_value: Option<u64>,
    last_string_value: String,
    last_assertion_is_quantifiable: bool,
    num_capturing_parens: u64,
    max_back_reference: u64,
    group_names: FxHashMap<String, Vec<usize>>,
    back_reference_names: Vec<String>,
    branches: Vec<Branch>,
    branch_id: Option<usize>,
    depth: u32,
}

impl RegExpValidator {
    pub fn new(pattern: &str, flags: &str, ecma_version: u32) -> Self {
        let mut valid_flags = String::from("gim");
        if ecma_version >= 6 {
            valid_flags.push_str("uy");
        }
        if ecma_version >= 9 {
            valid_flags.push('s');
        }
        if ecma_version >= 13 {
            valid_flags.push('d');
        }
        if ecma_version >= 15 {
            valid_flags.push('v');
        }
        let unicode_sets = flags.contains('v');
        let unicode = flags.contains('u');
        let (switch_u, switch_v, switch_n) = if unicode_sets && ecma_version >= 15 {
            (true, true, true)
        } else {
            (unicode && ecma_version >= 6, false, unicode && ecma_version >= 9)
        };
        RegExpValidator {
            ecma_version,
            source: pattern.encode_utf16().collect(),
            flags: flags.to_string(),
            valid_flags,
            switch_u,
            switch_v,
            switch_n,
            pos: 0,
            last_int_value: Some(0),
            last_string_value: String::new(),
            last_assertion_is_quantifiable: false,
            num_capturing_parens: 0,
            max_back_reference: 0,
            group_names: FxHashMap::default(),
            back_reference_names: Vec::new(),
            branches: Vec::new(),
            branch_id: None,
            depth: 0,
        }
    }

    fn raise<T>(&self, message: &str) -> VResult<T> {
        Err(RegExpError {
            message: message.to_string(),
        })
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> VResult<T>) -> VResult<T> {
        if self.depth >= MAX_REGEXP_NESTING_DEPTH {
            return self.raise("Too deeply nested");
        }
        self.depth += 1;
        let result = ensure_stack(|| f(self));
        self.depth -= 1;
        result
    }

    // ============ CURSOR ============

    /// Code point (with `u`/`v` or `force_u`) or code unit at `i`.
    fn at(&self, i: usize, force_u: bool) -> Option<u32> {
        let c = u32::from(*self.source.get(i)?);
        if !(force_u || self.switch_u) || !(0xD800..=0xDBFF).contains(&c) {
            return Some(c);
        }
        match self.source.get(i + 1).map(|&n| u32::from(n)) {
            Some(next @ 0xDC00..=0xDFFF) => Some(0x10000 + ((c - 0xD800) << 10) + (next - 0xDC00)),
            _ => Some(c),
        }
    }

    fn next_index(&self, i: usize, force_u: bool) -> usize {
        match self.at(i, force_u) {
            None => i,
            Some(c) if c > 0xFFFF => i + 2,
            Some(_) => i + 1,
        }
    }

    fn current(&self) -> Option<u32> {
        self.at(self.pos, false)
    }

    fn current_u(&self, force_u: bool) -> Option<u32> {
        self.at(self.pos, force_u)
    }

    fn lookahead(&self) -> Option<u32> {
        self.at(self.next_index(self.pos, false), false)
    }

    fn advance(&mut self) {
        self.pos = self.next_index(self.pos, false);
    }

    fn advance_u(&mut self, force_u: bool) {
        self.pos = self.next_index(self.pos, force_u);
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.current() == Some(u32::from(ch)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_chars(&mut self, chars: &[char]) -> bool {
        let mut pos = self.pos;
        for &ch in chars {
            if self.at(pos, false) != Some(u32::from(ch)) {
                return false;
            }
            pos = self.next_index(pos, false);
        }
        self.pos = pos;
        true
    }

    fn last_int(&self) -> u64 {
        self.last_int_value.unwrap_or(0)
    }

    // ============ PATTERN ============

    pub fn validate_flags(&self) -> VResult<()> {
        let mut u = false;
        let mut v = false;
        for (i, flag) in self.flags.char_indices() {
            if !self.valid_flags.contains(flag) {
                return self.raise("Invalid regular expression flag");
            }
            if self.flags.get(i + flag.len_utf8()..).is_some_and(|rest| rest.contains(flag)) {
                return self.raise("Duplicate regular expression flag");
            }
            u |= flag == 'u';
            v |= flag == 'v';
        }
        if self.ecma_version >= 15 && u && v {
            return self.raise("Invalid regular expression flag");
        }
        Ok(())
    }

    /// Parse the pattern. Without `u`/`v`, a pattern that turns out to
    /// contain named groups is parsed a second time with `\k` treated as a
    /// named back reference.
    pub fn validate_pattern(&mut self) -> VResult<()> {
        self.pattern()?;
        if !self.switch_n && self.ecma_version >= 9 && !self.group_names.is_empty() {
            self.switch_n = true;
            self.pattern()?;
        }
        Ok(())
    }

    fn pattern(&mut self) -> VResult<()> {
        self.pos = 0;
        self.last_int_value = Some(0);
        self.last_string_value.clear();
        self.last_assertion_is_quantifiable = false;
        self.num_capturing_parens = 0;
        self.max_back_reference = 0;
        self.group_names.clear();
        self.back_reference_names.clear();
        self.branches.clear();
        self.branch_id = None;

        self.disjunction()?;

        if self.pos != self.source.len() {
            if self.eat(')') {
                return self.raise("Unmatched ')'");
            }
            if self.eat(']') || self.eat('}') {
                return self.raise("Lone quantifier brackets");
            }
        }
        if self.max_back_reference > self.num_capturing_parens {
            return self.raise("Invalid escape");
        }
        for name in &self.back_reference_names {
            if !self.group_names.contains_key(name) {
                return self.raise("Invalid named capture referenced");
            }
        }
        Ok(())
    }

    fn new_branch(&mut self, parent: Option<usize>, base: Option<usize>) -> usize {
        let id = self.branches.len();
        self.branches.push(Branch {
            parent,
            base: base.unwrap_or(id),
        });
        id
    }

    fn branch(&self, id: usize) -> Option<Branch> {
        self.branches.get(id).copied()
    }

    /// Are branches `a` and `b` in different alternatives of some
    /// disjunction they share?
    fn separated_from(&self, a: usize, b: usize) -> bool {
        let mut this = Some(a);
        while let Some(x) = this {
            let Some(xb) = self.branch(x) else { break };
            let mut other = Some(b);
            while let Some(y) = other {
                let Some(yb) = self.branch(y) else { break };
                if xb.base == yb.base && x != y {
                    return true;
                }
                other = yb.parent;
            }
            this = xb.parent;
        }
        false
    }

    fn disjunction(&mut self) -> VResult<()> {
        self.nested(Self::disjunction_level)
    }

    fn disjunction_level(&mut self) -> VResult<()> {
        let track = self.ecma_version >= 16;
        if track {
            self.branch_id = Some(self.new_branch(self.branch_id, None));
        }
        self.alternative()?;
        while self.eat('|') {
            if track {
                if let Some(current) = self.branch_id.and_then(|id| self.branch(id)) {
                    self.branch_id = Some(self.new_branch(current.parent, Some(current.base)));
                }
            }
            self.alternative()?;
        }
        if track {
            self.branch_id = self.branch_id.and_then(|id| self.branch(id)).and_then(|b| b.parent);
        }

        if self.eat_quantifier(true)? {
            return self.raise("Nothing to repeat");
        }
        if self.eat('{') {
            return self.raise("Lone quantifier brackets");
        }
        Ok(())
    }

    fn alternative(&mut self) -> VResult<()> {
        while self.pos < self.source.len() && self.eat_term()? {}
        Ok(())
    }

    fn eat_term(&mut self) -> VResult<bool> {
        if self.eat_assertion()? {
            // Lookaheads are quantifiable outside unicode mode
            if self.last_assertion_is_quantifiable && self.eat_quantifier(false)? && self.switch_u {
                return self.raise("Invalid quantifier");
            }
            return Ok(true);
        }
        let atom = if self.switch_u {
            self.eat_atom()?
        } else {
            self.eat_extended_atom()?
        };
        if atom {
            self.eat_quantifier(false)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn eat_assertion(&mut self) -> VResult<bool> {
        let start = self.pos;
        self.last_assertion_is_quantifiable = false;

        if self.eat('^') || self.eat('$') {
            return Ok(true);
        }
        if self.eat('\\') {
            if self.eat('B') || self.eat('b') {
                return Ok(true);
            }
            self.pos = start;
        }
        if self.eat('(') && self.eat('?') {
            let lookbehind = self.ecma_version >= 9 && self.eat('<');
            if self.eat('=') || self.eat('!') {
                self.disjunction()?;
                if !self.eat(')') {
                    return self.raise("Unterminated group");
                }
                self.last_assertion_is_quantifiable = !lookbehind;
                return Ok(true);
            }
        }
        self.pos = start;
        Ok(false)
    }

    fn eat_quantifier(&mut self, no_error: bool) -> VResult<bool> {
        if self.eat_quantifier_prefix(no_error)? {
            self.eat('?');
            return Ok(true);
        }
        Ok(false)
    }

    fn eat_quantifier_prefix(&mut self, no_error: bool) -> VResult<bool> {
        if self.eat('*') || self.eat('+') || self.eat('?') {
            return Ok(true);
        }
        self.eat_braced_quantifier(no_error)
    }

    fn eat_braced_quantifier(&mut self, no_error: bool) -> VResult<bool> {
        let start = self.pos;
        if self.eat('{') {
            if self.eat_decimal_digits() {
                let min = self.last_int();
                let mut max = None;
                if self.eat(',') && self.eat_decimal_digits() {
                    max = Some(self.last_int());
                }
                if self.eat('}') {
                    if max.is_some_and(|max| max < min) && !no_error {
                        return self.raise("numbers out of order in {} quantifier");
                    }
                    return Ok(true);
                }
            }
            if self.switch_u && !no_error {
                return self.raise("Incomplete quantifier");
            }
            self.pos = start;
        }
        Ok(false)
    }

    fn eat_atom(&mut self) -> VResult<bool> {
        Ok(self.eat_pattern_characters()
            || self.eat('.')
            || self.eat_reverse_solidus_atom_escape()?
            || self.eat_character_class()?
            || self.eat_uncapturing_group()?
            || self.eat_capturing_group()?)
    }

    fn eat_reverse_solidus_atom_escape(&mut self) -> VResult<bool> {
        let start = self.pos;
        if self.eat('\\') {
            if self.eat_atom_escape()? {
                return Ok(true);
            }
            self.pos = start;
        }
        Ok(false)
    }

    fn eat_uncapturing_group(&mut self) -> VResult<bool> {
        let start = self.pos;
        if self.eat('(') {
            if self.eat('?') {
                if self.ecma_version >= 16 {
                    self.check_modifiers()?;
                }
                if self.eat(':') {
                    self.disjunction()?;
                    if self.eat(')') {
                        return Ok(true);
                    }
                    return self.raise("Unterminated group");
                }
            }
            self.pos = start;
        }
        Ok(false)
    }

    /// `(?ims-ims:...)` modifier groups
    fn check_modifiers(&mut self) -> VResult<()> {
        let add = self.eat_modifiers();
        let has_hyphen = self.eat('-');
        if add.is_empty() && !has_hyphen {
            return Ok(());
        }
        if has_duplicate(&add) {
            return self.raise("Duplicate regular expression modifiers");
        }
        if has_hyphen {
            let remove = self.eat_modifiers();
            if add.is_empty() && remove.is_empty() && self.current() == Some(u32::from(':')) {
                return self.raise("Invalid regular expression modifiers");
            }
            if has_duplicate(&remove) || remove.chars().any(|c| add.contains(c)) {
                return self.raise("Duplicate regular expression modifiers");
            }
        }
        Ok(())
    }

    fn eat_modifiers(&mut self) -> String {
        let mut modifiers = String::new();
        while let Some(c) = self.current().and_then(char::from_u32) {
            if !matches!(c, 'i' | 'm' | 's') {
                break;
            }
            modifiers.push(c);
            self.advance();
        }
        modifiers
    }

    fn eat_capturing_group(&mut self) -> VResult<bool> {
        if self.eat('(') {
            if self.ecma_version >= 9 {
                self.group_specifier()?;
            } else if self.current() == Some(u32::from('?')) {
                return self.raise("Invalid group");
            }
            self.disjunction()?;
            if self.eat(')') {
                self.num_capturing_parens += 1;
                return Ok(true);
            }
            return self.raise("Unterminated group");
        }
        Ok(false)
    }

    fn eat_extended_atom(&mut self) -> VResult<bool> {
        Ok(self.eat('.')
            || self.eat_reverse_solidus_atom_escape()?
            || self.eat_character_class()?
            || self.eat_uncapturing_group()?
            || self.eat_capturing_group()?
            || self.eat_invalid_braced_quantifier()?
            || self.eat_extended_pattern_character())
    }

    fn eat_invalid_braced_quantifier(&mut self) -> VResult<bool> {
        if self.eat_braced_quantifier(true)? {
            return self.raise("Nothing to repeat");
        }
        Ok(false)
    }

    fn eat_syntax_character(&mut self) -> bool {
        match self.current() {
            Some(ch) if is_syntax_character(ch) => {
                self.last_int_value = Some(u64::from(ch));
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn eat_pattern_characters(&mut self) -> bool {
        let start = self.pos;
        while let Some(ch) = self.current() {
            if is_syntax_character(ch) {
                break;
            }
            self.advance();
        }
        self.pos != start
    }

    fn eat_extended_pattern_character(&mut self) -> bool {
        match self.current().and_then(char::from_u32) {
            Some('$' | '(' | ')' | '*' | '+' | '.' | '?' | '[' | '^' | '|') | None => {
                // lone surrogates are valid pattern characters
                if self.current().is_some_and(|c| char::from_u32(c).is_none()) {
                    self.advance();
                    return true;
                }
                false
            }
            Some(_) => {
                self.advance();
                true
            }
        }
    }

    // ============ GROUP NAMES ============

    fn group_specifier(&mut self) -> VResult<()> {
        if self.eat('?') {
            if !self.eat_group_name()? {
                return self.raise("Invalid group");
            }
            let track = self.ecma_version >= 16;
            let name = self.last_string_value.clone();
            if let Some(known) = self.group_names.get(&name) {
                if !track {
                    return self.raise("Duplicate capture group name");
                }
                let current = self.branch_id;
                for &alt in known {
                    let separated = current.is_some_and(|cur| self.separated_from(alt, cur));
                    if !separated {
                        return self.raise("Duplicate capture group name");
                    }
                }
            }
            let entry = self.group_names.entry(name).or_default();
            if track {
                if let Some(id) = self.branch_id {
                    entry.push(id);
                }
            }
        }
        Ok(())
    }

    fn eat_group_name(&mut self) -> VResult<bool> {
        self.last_string_value.clear();
        if self.eat('<') {
            if self.eat_regexp_identifier_name()? && self.eat('>') {
                return Ok(true);
            }
            return self.raise("Invalid capture group name");
        }
        Ok(false)
    }

    fn eat_regexp_identifier_name(&mut self) -> VResult<bool> {
        self.last_string_value.clear();
        if self.eat_regexp_identifier(true)? {
            let mut name = String::new();
            push_code_point(&mut name, self.last_int());
            while self.eat_regexp_identifier(false)? {
                push_code_point(&mut name, self.last_int());
            }
            self.last_string_value = name;
            return Ok(true);
        }
        Ok(false)
    }

    fn eat_regexp_identifier(&mut self, start_char: bool) -> VResult<bool> {
        let start = self.pos;
        let force_u = self.ecma_version >= 11;
        let mut ch = self.current_u(force_u);
        self.advance_u(force_u);

        if ch == Some(u32::from('\\')) && self.eat_regexp_unicode_escape_sequence(force_u)? {
            ch = self.last_int_value.and_then(|v| u32::try_from(v).ok());
        }
        let valid = ch.and_then(char::from_u32).is_some_and(|c| {
            if start_char {
                is_identifier_start(c, true) || c == '$' || c == '_'
            } else {
                is_identifier_char(c, true) || c == '$' || c == '_'
            }
        });
        if let (true, Some(ch)) = (valid, ch) {
            self.last_int_value = Some(u64::from(ch));
            return Ok(true);
        }
        self.pos = start;
        Ok(false)
    }

    // ============ ESCAPES ============

    fn eat_atom_escape(&mut self) -> VResult<bool> {
        if self.eat_back_reference()
            || self.eat_character_class_escape()?.parsed()
            || self.eat_character_escape()?
            || (self.switch_n && self.eat_k_group_name()?)
        {
            return Ok(true);
        }
        if self.switch_u {
            if self.current() == Some(u32::from('c')) {
                return self.raise("Invalid unicode escape");
            }
            return self.raise("Invalid escape");
        }
        Ok(false)
    }

    fn eat_back_reference(&mut self) -> bool {
        let start = self.pos;
        if self.eat_decimal_escape() {
            let n = self.last_int();
            if self.switch_u {
                self.max_back_reference = self.max_back_reference.max(n);
                return true;
            }
            if n <= self.num_capturing_parens {
                return true;
            }
            self.pos = start;
        }
        false
    }

    fn eat_k_group_name(&mut self) -> VResult<bool> {
        if self.eat('k') {
            if self.eat_group_name()? {
                self.back_reference_names.push(self.last_string_value.clone());
                return Ok(true);
            }
            return self.raise("Invalid named reference");
        }
        Ok(false)
    }

    fn eat_character_escape(&mut self) -> VResult<bool> {
        Ok(self.eat_control_escape()
            || self.eat_c_control_letter()
            || self.eat_zero()
            || self.eat_hex_escape_sequence()?
            || self.eat_regexp_unicode_escape_sequence(false)?
            || (!self.switch_u && self.eat_legacy_octal_escape_sequence())
            || self.eat_identity_escape())
    }

    fn eat_c_control_letter(&mut self) -> bool {
        let start = self.pos;
        if self.eat('c') {
            if self.eat_control_letter() {
                return true;
            }
            self.pos = start;
        }
        false
    }

    fn eat_zero(&mut self) -> bool {
        if self.current() == Some(u32::from('0'))
            && !self.lookahead().is_some_and(is_decimal_digit)
        {
            self.last_int_value = Some(0);
            self.advance();
            return true;
        }
        false
    }

    fn eat_control_escape(&mut self) -> bool {
        let value = match self.current().and_then(char::from_u32) {
            Some('t') => 0x09,
            Some('n') => 0x0A,
            Some('v') => 0x0B,
            Some('f') => 0x0C,
            Some('r') => 0x0D,
            _ => return false,
        };
        self.last_int_value = Some(value);
        self.advance();
        true
    }

    fn eat_control_letter(&mut self) -> bool {
        match self.current() {
            Some(ch) if is_control_letter(ch) => {
                self.last_int_value = Some(u64::from(ch % 0x20));
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn eat_regexp_unicode_escape_sequence(&mut self, force_u: bool) -> VResult<bool> {
        let start = self.pos;
        let switch_u = force_u || self.switch_u;

        if self.eat('u') {
            if self.eat_fixed_hex_digits(4) {
                let lead = self.last_int();
                if switch_u && (0xD800..=0xDBFF).contains(&lead) {
                    let lead_end = self.pos;
                    if self.eat('\\') && self.eat('u') && self.eat_fixed_hex_digits(4) {
                        let trail = self.last_int();
                        if (0xDC00..=0xDFFF).contains(&trail) {
                            self.last_int_value =
                                Some((lead - 0xD800) * 0x400 + (trail - 0xDC00) + 0x10000);
                            return Ok(true);
                        }
                    }
                    self.pos = lead_end;
                    self.last_int_value = Some(lead);
                }
                return Ok(true);
            }
            if switch_u
                && self.eat('{')
                && self.eat_hex_digits()
                && self.eat('}')
                && self.last_int() <= 0x10FFFF
            {
                return Ok(true);
            }
            if switch_u {
                return self.raise("Invalid unicode escape");
            }
            self.pos = start;
        }
        Ok(false)
    }

    fn eat_identity_escape(&mut self) -> bool {
        if self.switch_u {
            if self.eat_syntax_character() {
                return true;
            }
            if self.eat('/') {
                self.last_int_value = Some(u64::from('/'));
                return true;
            }
            return false;
        }
        match self.current() {
            Some(ch) if ch != u32::from('c') && (!self.switch_n || ch != u32::from('k')) => {
                self.last_int_value = Some(u64::from(ch));
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn eat_decimal_escape(&mut self) -> bool {
        self.last_int_value = Some(0);
        match self.current() {
            Some(ch) if (u32::from('1')..=u32::from('9')).contains(&ch) => {
                let mut value: u64 = 0;
                while let Some(ch) = self.current().filter(|&c| is_decimal_digit(c)) {
                    value = value.saturating_mul(10).saturating_add(u64::from(ch - u32::from('0')));
                    self.advance();
                }
                self.last_int_value = Some(value);
                true
            }
            _ => false,
        }
    }

    // ============ CHARACTER CLASSES ============

    fn eat_character_class_escape(&mut self) -> VResult<CharSet> {
        let Some(ch) = self.current().and_then(char::from_u32) else {
            return Ok(CharSet::None);
        };
        if matches!(ch, 'd' | 'D' | 's' | 'S' | 'w' | 'W') {
            self.last_int_value = None;
            self.advance();
            return Ok(CharSet::Ok);
        }

        if self.switch_u && self.ecma_version >= 9 && matches!(ch, 'p' | 'P') {
            let negate = ch == 'P';
            self.last_int_value = None;
            self.advance();
            if self.eat('{') {
                let result = self.eat_unicode_property_value_expression()?;
                if result.parsed() && self.eat('}') {
                    if negate && result == CharSet::String {
                        return self.raise("Invalid property name");
                    }
                    return Ok(result);
                }
            }
            return self.raise("Invalid property name");
        }
        Ok(CharSet::None)
    }

    fn eat_unicode_property_value_expression(&mut self) -> VResult<CharSet> {
        let start = self.pos;

        if self.eat_unicode_property_name() && self.eat('=') {
            let name = self.last_string_value.clone();
            if self.eat_unicode_property_value() {
                let value = self.last_string_value.clone();
                self.validate_unicode_property_name_and_value(&name, &value)?;
                return Ok(CharSet::Ok);
            }
        }
        self.pos = start;

        if self.eat_unicode_property_value() {
            let name_or_value = self.last_string_value.clone();
            return self.validate_unicode_property_name_or_value(&name_or_value);
        }
        Ok(CharSet::None)
    }

    fn validate_unicode_property_name_and_value(&self, name: &str, value: &str) -> VResult<()> {
        let valid = match name {
            "General_Category" | "gc" => is_general_category_value(value),
            "Script" | "sc" | "Script_Extensions" | "scx" => {
                is_script_value(value, self.ecma_version)
            }
            _ => return self.raise("Invalid property name"),
        };
        if !valid {
            return self.raise("Invalid property value");
        }
        Ok(())
    }

    fn validate_unicode_property_name_or_value(&self, name_or_value: &str) -> VResult<CharSet> {
        if is_binary_property(name_or_value, self.ecma_version)
            || is_general_category_value(name_or_value)
        {
            return Ok(CharSet::Ok);
        }
        if self.switch_v && is_binary_property_of_strings(name_or_value) {
            return Ok(CharSet::String);
        }
        self.raise("Invalid property name")
    }

    fn eat_unicode_property_name(&mut self) -> bool {
        self.last_string_value.clear();
        while let Some(c) = self.current().and_then(char::from_u32) {
            if !(c.is_ascii_alphabetic() || c == '_') {
                break;
            }
            self.last_string_value.push(c);
            self.advance();
        }
        !self.last_string_value.is_empty()
    }

    fn eat_unicode_property_value(&mut self) -> bool {
        self.last_string_value.clear();
        while let Some(c) = self.current().and_then(char::from_u32) {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            self.last_string_value.push(c);
            self.advance();
        }
        !self.last_string_value.is_empty()
    }

    fn eat_character_class(&mut self) -> VResult<bool> {
        if self.eat('[') {
            let negate = self.eat('^');
            let result = self.class_contents()?;
            if !self.eat(']') {
                return self.raise("Unterminated character class");
            }
            if negate && result == CharSet::String {
                return self.raise("Negated character class may contain strings");
            }
            return Ok(true);
        }
        Ok(false)
    }

    fn class_contents(&mut self) -> VResult<CharSet> {
        if self.current() == Some(u32::from(']')) {
            return Ok(CharSet::Ok);
        }
        if self.switch_v {
            return self.class_set_expression();
        }
        self.non_empty_class_ranges()?;
        Ok(CharSet::Ok)
    }

    fn non_empty_class_ranges(&mut self) -> VResult<()> {
        while self.eat_class_atom()? {
            let left = self.last_int_value;
            if self.eat('-') && self.eat_class_atom()? {
                let right = self.last_int_value;
                if self.switch_u && (left.is_none() || right.is_none()) {
                    return self.raise("Invalid character class");
                }
                if let (Some(left), Some(right)) = (left, right) {
                    if left > right {
                        return self.raise("Range out of order in character class");
                    }
                }
            }
        }
        Ok(())
    }

    fn eat_class_atom(&mut self) -> VResult<bool> {
        let start = self.pos;

        if self.eat('\\') {
            if self.eat_class_escape()? {
                return Ok(true);
            }
            if self.switch_u {
                let ch = self.current();
                if ch == Some(u32::from('c')) || ch.is_some_and(is_octal_digit) {
                    return self.raise("Invalid class escape");
                }
                return self.raise("Invalid escape");
            }
            self.pos = start;
        }

        match self.current() {
            Some(ch) if ch != u32::from(']') => {
                self.last_int_value = Some(u64::from(ch));
                self.advance();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn eat_class_escape(&mut self) -> VResult<bool> {
        let start = self.pos;

        if self.eat('b') {
            self.last_int_value = Some(0x08);
            return Ok(true);
        }
        if self.switch_u && self.eat('-') {
            self.last_int_value = Some(u64::from('-'));
            return Ok(true);
        }
        if !self.switch_u && self.eat('c') {
            if self.eat_class_control_letter() {
                return Ok(true);
            }
            self.pos = start;
        }
        Ok(self.eat_character_class_escape()?.parsed() || self.eat_character_escape()?)
    }

    /// `v`-mode class contents: a union, an intersection (`&&`) or a
    /// subtraction (`--`) of operands.
    fn class_set_expression(&mut self) -> VResult<CharSet> {
        let mut result = CharSet::Ok;
        if self.eat_class_set_range()? {
            // union, handled below
        } else {
            let mut sub = self.eat_class_set_operand()?;
            if !sub.parsed() {
                return self.raise("Invalid character in character class");
            }
            if sub == CharSet::String {
                result = CharSet::String;
            }

            let start = self.pos;
            while self.eat_chars(&['&', '&']) {
                if self.current() != Some(u32::from('&')) {
                    sub = self.eat_class_set_operand()?;
                    if sub.parsed() {
                        if sub != CharSet::String {
                            result = CharSet::Ok;
                        }
                        continue;
                    }
                }
                return self.raise("Invalid character in character class");
            }
            if start != self.pos {
                return Ok(result);
            }

            while self.eat_chars(&['-', '-']) {
                if self.eat_class_set_operand()?.parsed() {
                    continue;
                }
                return self.raise("Invalid character in character class");
            }
            if start != self.pos {
                return Ok(result);
            }
        }

        loop {
            if self.eat_class_set_range()? {
                continue;
            }
            let sub = self.eat_class_set_operand()?;
            if !sub.parsed() {
                return Ok(result);
            }
            if sub == CharSet::String {
                result = CharSet::String;
            }
        }
    }

    fn eat_class_set_range(&mut self) -> VResult<bool> {
        let start = self.pos;
        if self.eat_class_set_character()? {
            let left = self.last_int_value;
            if self.eat('-') && self.eat_class_set_character()? {
                let right = self.last_int_value;
                if let (Some(left), Some(right)) = (left, right) {
                    if left > right {
                        return self.raise("Range out of order in character class");
                    }
                }
                return Ok(true);
            }
            self.pos = start;
        }
        Ok(false)
    }

    fn eat_class_set_operand(&mut self) -> VResult<CharSet> {
        if self.eat_class_set_character()? {
            return Ok(CharSet::Ok);
        }
        let result = self.eat_class_string_disjunction()?;
        if result.parsed() {
            return Ok(result);
        }
        self.eat_nested_class()
    }

    fn eat_nested_class(&mut self) -> VResult<CharSet> {
        self.nested(Self::nested_class_level)
    }

    fn nested_class_level(&mut self) -> VResult<CharSet> {
        let start = self.pos;
        if self.eat('[') {
            let negate = self.eat('^');
            let result = self.class_contents()?;
            if self.eat(']') {
                if negate && result == CharSet::String {
                    return self.raise("Negated character class may contain strings");
                }
                return Ok(result);
            }
            self.pos = start;
        }
        if self.eat('\\') {
            let result = self.eat_character_class_escape()?;
            if result.parsed() {
                return Ok(result);
            }
            self.pos = start;
        }
        Ok(CharSet::None)
    }

    fn eat_class_string_disjunction(&mut self) -> VResult<CharSet> {
        let start = self.pos;
        if self.eat_chars(&['\\', 'q']) {
            if !self.eat('{') {
                return self.raise("Invalid escape");
            }
            let result = self.class_string_disjunction_contents()?;
            if self.eat('}') {
                return Ok(result);
            }
            self.pos = start;
        }
        Ok(CharSet::None)
    }

    fn class_string_disjunction_contents(&mut self) -> VResult<CharSet> {
        let mut result = self.class_string()?;
        while self.eat('|') {
            if self.class_string()? == CharSet::String {
                result = CharSet::String;
            }
        }
        Ok(result)
    }

    fn class_string(&mut self) -> VResult<CharSet> {
        let mut count = 0;
        while self.eat_class_set_character()? {
            count += 1;
        }
        Ok(if count == 1 {
            CharSet::Ok
        } else {
            CharSet::String
        })
    }

    fn eat_class_set_character(&mut self) -> VResult<bool> {
        let start = self.pos;
        if self.eat('\\') {
            if self.eat_character_escape()? || self.eat_class_set_reserved_punctuator() {
                return Ok(true);
            }
            if self.eat('b') {
                self.last_int_value = Some(0x08);
                return Ok(true);
            }
            self.pos = start;
            return Ok(false);
        }
        let Some(ch) = self.current() else {
            return Ok(false);
        };
        if Some(ch) == self.lookahead() && is_class_set_reserved_double_punctuator(ch) {
            return Ok(false);
        }
        if is_class_set_syntax_character(ch) {
            return Ok(false);
        }
        self.advance();
        self.last_int_value = Some(u64::from(ch));
        Ok(true)
    }

    fn eat_class_set_reserved_punctuator(&mut self) -> bool {
        match self.current() {
            Some(ch) if is_class_set_reserved_punctuator(ch) => {
                self.last_int_value = Some(u64::from(ch));
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn eat_class_control_letter(&mut self) -> bool {
        match self.current() {
            Some(ch) if is_decimal_digit(ch) || ch == u32::from('_') => {
                self.last_int_value = Some(u64::from(ch % 0x20));
                self.advance();
                true
            }
            _ => false,
        }
    }

    // ============ NUMBERS ============

    fn eat_hex_escape_sequence(&mut self) -> VResult<bool> {
        let start = self.pos;
        if self.eat('x') {
            if self.eat_fixed_hex_digits(2) {
                return Ok(true);
            }
            if self.switch_u {
                return self.raise("Invalid escape");
            }
            self.pos = start;
        }
        Ok(false)
    }

    fn eat_decimal_digits(&mut self) -> bool {
        let start = self.pos;
        let mut value: u64 = 0;
        while let Some(ch) = self.current().filter(|&c| is_decimal_digit(c)) {
            value = value.saturating_mul(10).saturating_add(u64::from(ch - u32::from('0')));
            self.advance();
        }
        self.last_int_value = Some(value);
        self.pos != start
    }

    fn eat_hex_digits(&mut self) -> bool {
        let start = self.pos;
        let mut value: u64 = 0;
        while let Some(digit) = self.current().and_then(hex_value) {
            value = value.saturating_mul(16).saturating_add(u64::from(digit));
            self.advance();
        }
        self.last_int_value = Some(value);
        self.pos != start
    }

    fn eat_legacy_octal_escape_sequence(&mut self) -> bool {
        let Some(n1) = self.eat_octal_digit() else {
            return false;
        };
        let value = match self.eat_octal_digit() {
            Some(n2) => match (n1 <= 3).then(|| self.eat_octal_digit()).flatten() {
                Some(n3) => n1 * 64 + n2 * 8 + n3,
                None => n1 * 8 + n2,
            },
            None => n1,
        };
        self.last_int_value = Some(value);
        true
    }

    fn eat_octal_digit(&mut self) -> Option<u64> {
        match self.current() {
            Some(ch) if is_octal_digit(ch) => {
                self.advance();
                Some(u64::from(ch - u32::from('0')))
            }
            _ => None,
        }
    }

    fn eat_fixed_hex_digits(&mut self, length: usize) -> bool {
        let start = self.pos;
        let mut value: u64 = 0;
        for _ in 0..length {
            let Some(digit) = self.current().and_then(hex_value) else {
                self.pos = start;
                return false;
            };
            value = value * 16 + u64::from(digit);
            self.advance();
        }
        self.last_int_value = Some(value);
        true
    }
}

fn has_duplicate(modifiers: &str) -> bool {
    modifiers
        .char_indices()
        .any(|(i, c)| modifiers.get(i + 1..).is_some_and(|rest| rest.contains(c)))
}

fn push_code_point(out: &mut String, code: u64) {
    if let Some(c) = u32::try_from(code).ok().and_then(char::from_u32) {
        out.push(c);
    }
}

fn hex_value(ch: u32) -> Option<u32> {
    char::from_u32(ch).and_then(|c| c.to_digit(16))
}

fn is_decimal_digit(ch: u32) -> bool {
    (u32::from('0')..=u32::from('9')).contains(&ch)
}

fn is_octal_digit(ch: u32) -> bool {
    (u32::from('0')..=u32::from('7')).contains(&ch)
}

fn is_control_letter(ch: u32) -> bool {
    char::from_u32(ch).is_some_and(|c| c.is_ascii_alphabetic())
}

fn is_syntax_character(ch: u32) -> bool {
    matches!(
        char::from_u32(ch),
        Some('$' | '(' | ')' | '*' | '+' | '.' | '?' | '[' | '\\' | ']' | '^' | '{' | '|' | '}')
    )
}

fn is_class_set_reserved_double_punctuator(ch: u32) -> bool {
    matches!(
        char::from_u32(ch),
        Some(
            '!' | '#' | '$' | '%' | '&' | '*' | '+' | ',' | '.' | ':' | ';' | '<' | '=' | '>'
                | '?' | '@' | '^' | '`' | '~'
        )
    )
}

fn is_class_set_syntax_character(ch: u32) -> bool {
    matches!(
        char::from_u32(ch),
        Some('(' | ')' | '-' | '/' | '[' | '\\' | ']' | '{' | '|' | '}')
    )
}

fn is_class_set_reserved_punctuator(ch: u32) -> bool {
    matches!(
        char::from_u32(ch),
        Some('!' | '#' | '%' | '&' | ',' | '-' | ':' | ';' | '<' | '=' | '>' | '@' | '`' | '~')
    )
}

// ============ UNICODE PROPERTY TABLES ============

const BINARY_PROPERTIES: &[&str] = &[
    "ASCII", "ASCII_Hex_Digit", "AHex", "Alphabetic", "Alpha", "Any", "Assigned",
    "Bidi_Control", "Bidi_C", "Bidi_Mirrored", "Bidi_M", "Case_Ignorable", "CI", "Cased",
    "Changes_When_Casefolded", "CWCF", "Changes_When_Casemapped", "CWCM",
    "Changes_When_Lowercased", "CWL", "Changes_When_NFKC_Casefolded", "CWKCF",
    "Changes_When_Titlecased", "CWT", "Changes_When_Uppercased", "CWU", "Dash",
    "Default_Ignorable_Code_Point", "DI", "Deprecated", "Dep", "Diacritic", "Dia", "Emoji",
    "Emoji_Component", "Emoji_Modifier", "Emoji_Modifier_Base", "Emoji_Presentation",
    "Extender", "Ext", "Grapheme_Base", "Gr_Base", "Grapheme_Extend", "Gr_Ext", "Hex_Digit",
    "Hex", "IDS_Binary_Operator", "IDSB", "IDS_Trinary_Operator", "IDST", "ID_Continue", "IDC",
    "ID_Start", "IDS", "Ideographic", "Ideo", "Join_Control", "Join_C",
    "Logical_Order_Exception", "LOE", "Lowercase", "Lower", "Math", "Noncharacter_Code_Point",
    "NChar", "Pattern_Syntax", "Pat_Syn", "Pattern_White_Space", "Pat_WS", "Quotation_Mark",
    "QMark", "Radical", "Regional_Indicator", "RI", "Sentence_Terminal", "STerm",
    "Soft_Dotted", "SD", "Terminal_Punctuation", "Term", "Unified_Ideograph", "UIdeo",
    "Uppercase", "Upper", "Variation_Selector", "VS", "White_Space", "space", "XID_Continue",
    "XIDC", "XID_Start", "XIDS",
];

const BINARY_OF_STRINGS: &[&str] = &[
    "Basic_Emoji",
    "Emoji_Keycap_Sequence",
    "RGI_Emoji_Modifier_Sequence",
    "RGI_Emoji_Flag_Sequence",
    "RGI_Emoji_Tag_Sequence",
    "RGI_Emoji_ZWJ_Sequence",
    "RGI_Emoji",
];

const GENERAL_CATEGORY_VALUES: &[&str] = &[
    "Cased_Letter", "LC", "Close_Punctuation", "Pe", "Connector_Punctuation", "Pc", "Control",
    "Cc", "cntrl", "Currency_Symbol", "Sc", "Dash_Punctuation", "Pd", "Decimal_Number", "Nd",
    "digit", "Enclosing_Mark", "Me", "Final_Punctuation", "Pf", "Format", "Cf",
    "Initial_Punctuation", "Pi", "Letter", "L", "Letter_Number", "Nl", "Line_Separator", "Zl",
    "Lowercase_Letter", "Ll", "Mark", "M", "Combining_Mark", "Math_Symbol", "Sm",
    "Modifier_Letter", "Lm", "Modifier_Symbol", "Sk", "Nonspacing_Mark", "Mn", "Number", "N",
    "Open_Punctuation", "Ps", "Other", "C", "Other_Letter", "Lo", "Other_Number", "No",
    "Other_Punctuation", "Po", "Other_Symbol", "So", "Paragraph_Separator", "Zp",
    "Private_Use", "Co", "Punctuation", "P", "punct", "Separator", "Z", "Space_Separator",
    "Zs", "Spacing_Mark", "Mc", "Surrogate", "Cs", "Symbol", "S", "Titlecase_Letter", "Lt",
    "Unassigned", "Cn", "Uppercase_Letter", "Lu",
];

/// Script names with the edition that introduced them
const SCRIPT_VALUES: &[(u32, &[&str])] = &[
    (9, &[
        "Adlam", "Adlm", "Ahom", "Anatolian_Hieroglyphs", "Hluw", "Arabic", "Arab", "Armenian",
        "Armn", "Avestan", "Avst", "Balinese", "Bali", "Bamum", "Bamu", "Bassa_Vah", "Bass",
        "Batak", "Batk", "Bengali", "Beng", "Bhaiksuki", "Bhks", "Bopomofo", "Bopo", "Brahmi",
        "Brah", "Braille", "Brai", "Buginese", "Bugi", "Buhid", "Buhd", "Canadian_Aboriginal",
        "Cans", "Carian", "Cari", "Caucasian_Albanian", "Aghb", "Chakma", "Cakm", "Cham",
        "Cherokee", "Cher", "Common", "Zyyy", "Coptic", "Copt", "Qaac", "Cuneiform", "Xsux",
        "Cypriot", "Cprt", "Cyrillic", "Cyrl", "Deseret", "Dsrt", "Devanagari", "Deva",
        "Duployan", "Dupl", "Egyptian_Hieroglyphs", "Egyp", "Elbasan", "Elba", "Ethiopic",
        "Ethi", "Georgian", "Geor", "Glagolitic", "Glag", "Gothic", "Goth", "Grantha", "Gran",
        "Greek", "Grek", "Gujarati", "Gujr", "Gurmukhi", "Guru", "Han", "Hani", "Hangul",
        "Hang", "Hanunoo", "Hano", "Hatran", "Hatr", "Hebrew", "Hebr", "Hiragana", "Hira",
        "Imperial_Aramaic", "Armi", "Inherited", "Zinh", "Qaai", "Inscriptional_Pahlavi",
        "Phli", "Inscriptional_Parthian", "Prti", "Javanese", "Java", "Kaithi", "Kthi",
        "Kannada", "Knda", "Katakana", "Kana", "Kayah_Li", "Kali", "Kharoshthi", "Khar",
        "Khmer", "Khmr", "Khojki", "Khoj", "Khudawadi", "Sind", "Lao", "Laoo", "Latin", "Latn",
        "Lepcha", "Lepc", "Limbu", "Limb", "Linear_A", "Lina", "Linear_B", "Linb", "Lisu",
        "Lycian", "Lyci", "Lydian", "Lydi", "Mahajani", "Mahj", "Malayalam", "Mlym", "Mandaic",
        "Mand", "Manichaean", "Mani", "Marchen", "Marc", "Masaram_Gondi", "Gonm",
        "Meetei_Mayek", "Mtei", "Mende_Kikakui", "Mend", "Meroitic_Cursive", "Merc",
        "Meroitic_Hieroglyphs", "Mero", "Miao", "Plrd", "Modi", "Mongolian", "Mong", "Mro",
        "Mroo", "Multani", "Mult", "Myanmar", "Mymr", "Nabataean", "Nbat", "New_Tai_Lue",
        "Talu", "Newa", "Nko", "Nkoo", "Nushu", "Nshu", "Ogham", "Ogam", "Ol_Chiki", "Olck",
        "Old_Hungarian", "Hung", "Old_Italic", "Ital", "Old_North_Arabian", "Narb",
        "Old_Permic", "Perm", "Old_Persian", "Xpeo", "Old_South_Arabian", "Sarb", "Old_Turkic",
        "Orkh", "Oriya", "Orya", "Osage", "Osge", "Osmanya", "Osma", "Pahawh_Hmong", "Hmng",
        "Palmyrene", "Palm", "Pau_Cin_Hau", "Pauc", "Phags_Pa", "Phag", "Phoenician", "Phnx",
        "Psalter_Pahlavi", "Phlp", "Rejang", "Rjng", "Runic", "Runr", "Samaritan", "Samr",
        "Saurashtra", "Saur", "Sharada", "Shrd", "Shavian", "Shaw", "Siddham", "Sidd",
        "SignWriting", "Sgnw", "Sinhala", "Sinh", "Sora_Sompeng", "Sora", "Soyombo", "Soyo",
        "Sundanese", "Sund", "Syloti_Nagri", "Sylo", "Syriac", "Syrc", "Tagalog", "Tglg",
        "Tagbanwa", "Tagb", "Tai_Le", "Tale", "Tai_Tham", "Lana", "Tai_Viet", "Tavt", "Takri",
        "Takr", "Tamil", "Taml", "Tangut", "Tang", "Telugu", "Telu", "Thaana", "Thaa", "Thai",
        "Tibetan", "Tibt", "Tifinagh", "Tfng", "Tirhuta", "Tirh", "Ugaritic", "Ugar", "Vai",
        "Vaii", "Warang_Citi", "Wara", "Yi", "Yiii", "Zanabazar_Square", "Zanb",
    ]),
    (10, &[
        "Dogra", "Dogr", "Gunjala_Gondi", "Gong", "Hanifi_Rohingya", "Rohg", "Makasar", "Maka",
        "Medefaidrin", "Medf", "Old_Sogdian", "Sogo", "Sogdian", "Sogd",
    ]),
    (11, &[
        "Elymaic", "Elym", "Nandinagari", "Nand", "Nyiakeng_Puachue_Hmong", "Hmnp", "Wancho",
        "Wcho",
    ]),
    (12, &[
        "Chorasmian", "Chrs", "Diak", "Dives_Akuru", "Khitan_Small_Script", "Kits", "Yezi",
        "Yezidi",
    ]),
    (13, &[
        "Cypro_Minoan", "Cpmn", "Old_Uyghur", "Ougr", "Tangsa", "Tnsa", "Toto", "Vithkuqi",
        "Vith",
    ]),
    (14, &["Hrkt", "Katakana_Or_Hiragana", "Kawi", "Nag_Mundari", "Nagm", "Unknown", "Zzzz"]),
    (16, &[
        "Garay", "Gara", "Gurung_Khema", "Gukh", "Kirat_Rai", "Krai", "Ol_Onal", "Onao",
        "Sunuwar", "Sunu", "Todhri", "Todr", "Tulu_Tigalari", "Tutg",
    ]),
];

fn is_binary_property(name: &str, ecma_version: u32) -> bool {
    BINARY_PROPERTIES.contains(&name)
        || (ecma_version >= 10 && name == "Extended_Pictographic")
        || (ecma_version >= 11 && matches!(name, "EBase" | "EComp" | "EMod" | "EPres" | "ExtPict"))
}

fn is_binary_property_of_strings(name: &str) -> bool {
    BINARY_OF_STRINGS.contains(&name)
}

fn is_general_category_value(value: &str) -> bool {
    GENERAL_CATEGORY_VALUES.contains(&value)
}

fn is_script_value(value: &str, ecma_version: u32) -> bool {
    SCRIPT_VALUES
        .iter()
        .filter(|(since, _)| *since <= ecma_version.max(9))
        .any(|(_, names)| names.contains(&value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(pattern: &str, flags: &str) -> String {
        validate(pattern, flags).unwrap_err().message
    }

    #[test]
    fn test_flags() {
        assert!(validate("a", "gimsuyd").is_ok());
        assert_eq!(error("a", "gg"), "Duplicate regular expression flag");
        assert_eq!(error("a", "x"), "Invalid regular expression flag");
        assert_eq!(error("a", "uv"), "Invalid regular expression flag");
        assert!(validate_literal("a", "s", 8).is_err());
        assert!(validate_literal("a", "v", 14).is_err());
    }

    #[test]
    fn test_duplicate_named_groups() {
        assert!(validate("(?<n>a)|(?<n>b)", "").is_ok());
        assert_eq!(error("(?<n>a)(?<n>b)", ""), "Duplicate capture group name");
        assert!(validate("(?:(?<n>a)|(?<n>b))\\k<n>", "").is_ok());
        assert_eq!(error("(?:(?<n>a)|b)(?<n>c)", ""), "Duplicate capture group name");
        // before ES2025 duplicates are never allowed
        assert!(validate_literal("(?<n>a)|(?<n>b)", "", 15).is_err());
    }

    #[test]
    fn test_named_group_reparse() {
        // without named groups `\k` is an identity escape
        assert!(validate("\\k", "").is_ok());
        // once a named group exists, `\k` must name a group
        assert_eq!(error("\\k(?<a>x)", ""), "Invalid named reference");
        assert_eq!(error("(?<a>x)\\k<b>", ""), "Invalid named capture referenced");
        assert!(validate("(?<a>x)\\k<a>", "").is_ok());
    }

    #[test]
    fn test_quantifiers() {
        assert_eq!(error("*", ""), "Nothing to repeat");
        assert_eq!(error("a{2,1}", ""), "numbers out of order in {} quantifier");
        assert!(validate("a{", "").is_ok());
        assert_eq!(error("a{", "u"), "Incomplete quantifier");
        assert_eq!(error("a)", ""), "Unmatched ')'");
        assert_eq!(error("(?=a)*", "u"), "Invalid quantifier");
        assert!(validate("(?=a)*", "").is_ok());
    }

    #[test]
    fn test_unicode_mode_escapes() {
        assert!(validate("\\-", "").is_ok());
        assert_eq!(error("\\-", "u"), "Invalid escape");
        assert!(validate("\\u{1F600}", "u").is_ok());
        assert_eq!(error("\\u{110000}", "u"), "Invalid unicode escape");
        assert!(validate("\\1(a)", "").is_ok());
        assert_eq!(error("\\2(a)", "u"), "Invalid escape");
    }

    #[test]
    fn test_character_classes() {
        assert_eq!(error("[b-a]", ""), "Range out of order in character class");
        assert!(validate("[\\d-z]", "").is_ok());
        assert_eq!(error("[\\d-z]", "u"), "Invalid character class");
        assert_eq!(error("[a", ""), "Unterminated character class");
    }

    #[test]
    fn test_unicode_properties() {
        assert!(validate("\\p{L}", "u").is_ok());
        assert!(validate("\\p{Script=Greek}", "u").is_ok());
        assert!(validate("\\P{ASCII}", "u").is_ok());
        assert_eq!(error("\\p{Foo}", "u"), "Invalid property name");
        assert_eq!(error("\\p{Script=Foo}", "u"), "Invalid property value");
        assert!(validate("\\p{Foo}", "").is_ok());
    }

    #[test]
    fn test_unicode_sets() {
        assert!(validate("[\\p{L}--\\p{Ll}]", "v").is_ok());
        assert!(validate("[[a-z]&&[aeiou]]", "v").is_ok());
        assert!(validate("[\\q{abc|d}]", "v").is_ok());
        assert!(validate("\\p{RGI_Emoji}", "v").is_ok());
        assert_eq!(
            error("[^\\q{abc}]", "v"),
            "Negated character class may contain strings"
        );
        assert_eq!(error("\\P{RGI_Emoji}", "v"), "Invalid property name");
        assert!(validate("[^\\q{a}]", "v").is_ok());
        assert_eq!(error("[a&&&b]", "v"), "Invalid character in character class");
        assert_eq!(error("[(]", "v"), "Invalid character in character class");
    }

    #[test]
    fn test_modifiers() {
        assert!(validate("(?i:a)", "").is_ok());
        assert!(validate("(?i-m:a)", "").is_ok());
        assert_eq!(error("(?ii:a)", ""), "Duplicate regular expression modifiers");
        assert_eq!(error("(?i-i:a)", ""), "Duplicate regular expression modifiers");
        assert_eq!(error("(?-:a)", ""), "Invalid regular expression modifiers");
    }

    #[test]
    fn test_lone_surrogates_and_astral() {
        assert!(validate("😀{2}", "").is_ok());
        assert!(validate("[😀-😁]", "u").is_ok());
        assert_eq!(
            error("[😀-😁]", ""),
            "Range out of order in character class"
        );
    }

    #[test]
    fn test_branch_tree() {
        let mut v = RegExpValidator::new("", "", LATEST_ECMA_VERSION);
        let root = v.new_branch(None, None);
        let left = v.new_branch(Some(root), None);
        let right = v.new_branch(Some(root), Some(left));
        let nested = v.new_branch(Some(left), None);
        assert!(v.separated_from(left, right));
        assert!(v.separated_from(nested, right));
        assert!(!v.separated_from(nested, left));
        assert!(!v.separated_from(left, left));
    }
}
