//! Token context stack
//!
//! The lexer cannot tell from a `{` alone whether it opens a block or an
//! object literal, or whether a `/` after `)` divides or starts a regexp.
//! It keeps a stack of the syntactic contexts it is inside and updates it
//! after every token; `expr_allowed` is derived from the same rules.

use crate::charclass::has_line_break;
use crate::lexer::{Lexer, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokContext {
    /// Block statement braces
    BStat,
    /// Object literal braces
    BExpr,
    /// `${` inside a template
    BTmpl,
    /// Statement parens (`if (`, `for (`, ...)
    PStat,
    /// Expression parens
    PExpr,
    /// Inside a template literal
    QTmpl,
    FStat,
    FExpr,
    FExprGen,
    FGen,
    /// Context pushed by a token reader extension
    Custom(u16),
}

impl TokContext {
    pub fn token(self) -> &'static str {
        match self {
            TokContext::BStat | TokContext::BExpr => "{",
            TokContext::BTmpl => "${",
            TokContext::PStat | TokContext::PExpr => "(",
            TokContext::QTmpl => "`",
            TokContext::FStat | TokContext::FExpr | TokContext::FExprGen | TokContext::FGen => {
                "function"
            }
            TokContext::Custom(_) => "",
        }
    }

    pub fn is_expr(self) -> bool {
        matches!(
            self,
            TokContext::BExpr
                | TokContext::PExpr
                | TokContext::QTmpl
                | TokContext::FExpr
                | TokContext::FExprGen
        )
    }

    /// Template contents are read verbatim, without skipping whitespace.
    pub fn preserve_space(self) -> bool {
        self == TokContext::QTmpl
    }

    pub fn is_function(self) -> bool {
        self.token() == "function"
    }

    pub fn is_generator(self) -> bool {
        matches!(self, TokContext::FExprGen | TokContext::FGen)
    }
}

impl Lexer<'_> {
    pub fn cur_context(&self) -> TokContext {
        self.context.last().copied().unwrap_or(TokContext::BStat)
    }

    pub fn push_context(&mut self, context: TokContext) {
        self.context.push(context);
    }

    pub fn pop_context(&mut self) -> Option<TokContext> {
        self.context.pop()
    }

    /// Does a `{` following `prev` open a block statement?
    pub fn brace_is_block(&self, prev: TokenKind) -> bool {
        let parent = self.cur_context();
        if matches!(parent, TokContext::FExpr | TokContext::FStat) {
            return true;
        }
        if prev == TokenKind::Colon && matches!(parent, TokContext::BStat | TokContext::BExpr) {
            return !parent.is_expr();
        }

        // `return {` and `a\n{` depend on whether a newline intervenes
        // (ASI), so `x \n { }` starts a block
        if prev == TokenKind::Return || (prev == TokenKind::Name && self.expr_allowed) {
            return has_line_break(self.slice(self.last_tok_end, self.start));
        }
        if matches!(
            prev,
            TokenKind::Else
                | TokenKind::Semi
                | TokenKind::Eof
                | TokenKind::ParenR
                | TokenKind::Arrow
        ) {
            return true;
        }
        if prev == TokenKind::BraceL {
            return parent == TokContext::BStat;
        }
        if matches!(prev, TokenKind::Var | TokenKind::Const | TokenKind::Name) {
            return false;
        }
        !self.expr_allowed
    }

    /// Is the innermost function context a generator?
    pub fn in_generator_context(&self) -> bool {
        self.context
            .iter()
            .skip(1)
            .rev()
            .find(|c| c.is_function())
            .is_some_and(|c| c.is_generator())
    }

    /// Replace the top context, used when the parser knows better than the
    /// lexer what a brace or paren opened.
    pub fn override_context(&mut self, context: TokContext) {
        if let Some(top) = self.context.last_mut() {
            *top = context;
        }
    }

    /// Update the context stack and `expr_allowed` after `self.kind` was
    /// read. `prev` is the kind of the token before it.
    pub(crate) fn update_context(&mut self, prev: TokenKind) {
        if let Some(mut reader) = self.reader.take() {
            let handled = reader.update_context(self, prev);
            self.reader = Some(reader);
            if handled {
                return;
            }
        }

        let kind = self.kind;
        if kind.keyword().is_some() && prev == TokenKind::Dot {
            self.expr_allowed = false;
            return;
        }
        match kind {
            TokenKind::ParenR | TokenKind::BraceR => {
                if self.context.len() == 1 {
                    self.expr_allowed = true;
                    return;
                }
                let mut out = self.context.pop();
                if out == Some(TokContext::BStat) && self.cur_context().is_function() {
                    out = self.context.pop();
                }
                self.expr_allowed = !out.is_some_and(TokContext::is_expr);
            }
            TokenKind::BraceL => {
                let context = if self.brace_is_block(prev) {
                    TokContext::BStat
                } else {
                    TokContext::BExpr
                };
                self.context.push(context);
                self.expr_allowed = true;
            }
            TokenKind::DollarBraceL => {
                self.context.push(TokContext::BTmpl);
                self.expr_allowed = true;
            }
            TokenKind::ParenL => {
                let statement_parens = matches!(
                    prev,
                    TokenKind::If | TokenKind::For | TokenKind::With | TokenKind::While
                );
                self.context.push(if statement_parens {
                    TokContext::PStat
                } else {
                    TokContext::PExpr
                });
                self.expr_allowed = true;
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {}
            TokenKind::Function | TokenKind::Class => {
                let parent = self.cur_context();
                let is_expr = prev.before_expr()
                    && prev != TokenKind::Else
                    && !(prev == TokenKind::Semi && parent != TokContext::PStat)
                    && !(prev == TokenKind::Return
                        && has_line_break(self.slice(self.last_tok_end, self.start)))
                    && !(matches!(prev, TokenKind::Colon | TokenKind::BraceL)
                        && parent == TokContext::BStat);
                self.context.push(if is_expr {
                    TokContext::FExpr
                } else {
                    TokContext::FStat
                });
                self.expr_allowed = false;
            }
            TokenKind::Colon => {
                if self.cur_context().is_function() {
                    self.context.pop();
                }
                self.expr_allowed = true;
            }
            TokenKind::BackQuote => {
                if self.cur_context() == TokContext::QTmpl {
                    self.context.pop();
                } else {
                    self.context.push(TokContext::QTmpl);
                }
                self.expr_allowed = false;
            }
            TokenKind::Star => {
                if prev == TokenKind::Function {
                    let generator = if self.cur_context() == TokContext::FExpr {
                        TokContext::FExprGen
                    } else {
                        TokContext::FGen
                    };
                    self.override_context(generator);
                }
                self.expr_allowed = true;
            }
            TokenKind::Name => {
                let mut allowed = false;
                if self.ecma_version >= 6 && prev != TokenKind::Dot {
                    let word = self.value.as_str().unwrap_or_default();
                    if (word == "of" && !self.expr_allowed)
                        || (word == "yield" && self.in_generator_context())
                    {
                        allowed = true;
                    }
                }
                self.expr_allowed = allowed;
            }
            _ => self.expr_allowed = kind.before_expr(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::Tokenizer;
    use crate::options::Options;

    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Tokenizer::new(source, Options::default())
            .map(|t| t.unwrap().kind)
            .collect()
    }

    #[test]
    fn test_block_after_paren_allows_regexp() {
        let tokens = kinds("while (x) {} /re/g");
        assert!(tokens.contains(&TokenKind::Regexp));
    }

    #[test]
    fn test_object_literal_then_divide() {
        let tokens = kinds("x = {} / 2");
        assert_eq!(tokens[3], TokenKind::BraceR);
        assert_eq!(tokens[4], TokenKind::Slash);
    }

    #[test]
    fn test_function_expression_body_then_divide() {
        let tokens = kinds("x = function(){} / 2");
        assert!(tokens.contains(&TokenKind::Slash));
        assert!(!tokens.contains(&TokenKind::Regexp));
    }

    #[test]
    fn test_function_declaration_then_regexp() {
        let tokens = kinds("function f(){} /1/g");
        assert!(tokens.contains(&TokenKind::Regexp));
    }

    #[test]
    fn test_yield_in_generator_allows_regexp() {
        let tokens = kinds("function* g(){ yield /x/ }");
        assert!(tokens.contains(&TokenKind::Regexp));
        let tokens = kinds("function g(){ yield /x/ 1 }");
        assert!(!tokens.contains(&TokenKind::Regexp));
    }

    #[test]
    fn test_keyword_after_dot_is_not_expression_start() {
        let tokens = kinds("a.delete / 2");
        assert!(tokens.contains(&TokenKind::Slash));
    }

    #[test]
    fn test_return_newline_brace_is_block() {
        let mut lexer = Lexer::new("return\n{", Options::default());
        lexer.read_next_token().unwrap();
        lexer.next_token().unwrap();
        assert_eq!(lexer.cur_context(), TokContext::BStat);
        let mut lexer = Lexer::new("x = {", Options::default());
        lexer.read_next_token().unwrap();
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        assert_eq!(lexer.cur_context(), TokContext::BExpr);
    }
}
