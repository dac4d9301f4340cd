use std::sync::LazyLock;

use tracing::trace;

use crate::action::Action;
use crate::error::{ErrorSite, InvalidSql};
use crate::rule::Rule;
use crate::rules;
use crate::string_utils::find_string_end;
use crate::token::{Token, TokenKind};

static MAIN_RULES: LazyLock<Vec<Rule>> = LazyLock::new(rules::main_rules);

/// Turn raw SQL into tokens in source order.
///
/// Whitespace and comments are dropped; every other character ends up in a
/// token. An unterminated quoted literal fails with
/// [`InvalidSql::StringNotTerminated`], a character no rule recognizes with
/// [`InvalidSql::UnexpectedToken`].
pub fn tokenize(sql: &str) -> Result<Vec<Token>, InvalidSql> {
    Lexer::default().tokenize(sql)
}

/// The regex-rule lexer. Rules are tried in priority order at each scan
/// position and the first match wins.
pub struct Lexer {
    rules: &'static [Rule],
    tokens: Vec<Token>,
    pos: usize,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new(&MAIN_RULES)
    }
}

impl Lexer {
    pub fn new(rules: &'static [Rule]) -> Self {
        Self {
            rules,
            tokens: Vec::new(),
            pos: 0,
        }
    }

    pub fn tokenize(mut self, source: &str) -> Result<Vec<Token>, InvalidSql> {
        while self.pos < source.len() {
            self.lex_one(source)?;
        }
        Ok(self.tokens)
    }

    fn lex_one(&mut self, source: &str) -> Result<(), InvalidSql> {
        let remaining = &source[self.pos..];
        let trimmed = remaining.trim_start();
        self.pos += remaining.len() - trimmed.len();
        if trimmed.is_empty() {
            return Ok(());
        }

        // Phase 1: find the first matching rule
        let found = self
            .rules
            .iter()
            .find_map(|rule| rule.match_len(trimmed).map(|len| (rule.action, len)));

        // Phase 2: act on it
        match found {
            Some((action, len)) => self.execute_action(action, len, source),
            None => {
                let found = trimmed.chars().next().map(String::from).unwrap_or_default();
                trace!(position = self.pos, text = %found, "unrecognized character");
                Err(InvalidSql::UnexpectedToken(ErrorSite::new(self.pos, found)))
            }
        }
    }

    fn execute_action(
        &mut self,
        action: Action,
        match_len: usize,
        source: &str,
    ) -> Result<(), InvalidSql> {
        match action {
            Action::AddToken { kind } => {
                // `values.id` or `end.x`: a keyword followed by a dot is a name
                let bytes = source.as_bytes();
                if kind.is_keyword()
                    && bytes[self.pos + match_len - 1].is_ascii_alphabetic()
                    && bytes.get(self.pos + match_len) == Some(&b'.')
                {
                    return self.handle_word(source);
                }
                self.push(kind, source, match_len);
            }
            Action::HandleWord => {
                return self.handle_word(source);
            }
            Action::HandleString => {
                let bytes = source.as_bytes();
                match find_string_end(bytes, self.pos) {
                    Some(end) => self.push(TokenKind::Str, source, end - self.pos),
                    None => {
                        let quote = &source[self.pos..self.pos + 1];
                        return Err(InvalidSql::StringNotTerminated(ErrorSite::new(
                            self.pos, quote,
                        )));
                    }
                }
            }
            Action::Skip => {
                trace!(position = self.pos, len = match_len, "skipping comment");
                self.pos += match_len;
            }
        }
        Ok(())
    }

    /// Emit a bare word: FUNC when `(` follows directly, IDENTIFIER otherwise.
    fn handle_word(&mut self, source: &str) -> Result<(), InvalidSql> {
        let remaining = &source[self.pos..];
        let len = self
            .rules
            .iter()
            .filter(|rule| rule.action == Action::HandleWord)
            .find_map(|rule| rule.match_len(remaining))
            .ok_or_else(|| {
                InvalidSql::UnexpectedToken(ErrorSite::new(
                    self.pos,
                    remaining.chars().next().map(String::from).unwrap_or_default(),
                ))
            })?;
        let kind = if source.as_bytes().get(self.pos + len) == Some(&b'(') {
            TokenKind::Func
        } else {
            TokenKind::Identifier
        };
        self.push(kind, source, len);
        Ok(())
    }

    fn push(&mut self, kind: TokenKind, source: &str, len: usize) {
        let text = &source[self.pos..self.pos + len];
        self.tokens.push(Token::new(kind, text, self.pos));
        self.pos += len;
    }
}
