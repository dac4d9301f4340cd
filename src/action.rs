use crate::token::TokenKind;

/// What the lexer does when a rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Emit a token of the given kind for the matched text.
    AddToken { kind: TokenKind },

    /// Bare word: FUNC when immediately followed by `(`, otherwise IDENTIFIER.
    HandleWord,

    /// Opening quote: scan to the matching closing quote and emit a STR token.
    HandleString,

    /// Consume the match without emitting anything (comments).
    Skip,
}
