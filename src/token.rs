use compact_str::CompactString;

/// Position in source string (byte offset).
pub type Pos = usize;

/// All token kinds recognized by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    Offset,
    Insert,
    Values,
    Join,
    On,
    As,
    Asc,
    Desc,
    In,
    Is,
    Not,
    Null,
    /// AND / OR
    Link,
    /// `=`, `<>`, `<`, `>`, `!=`, `>=`, `<=` and the LIKE family.
    Compare,
    Between,
    /// ALL / ANY / SOME after a comparison.
    Quantifier,
    Case,
    When,
    Then,
    Else,
    End,
    Func,
    Identifier,
    Number,
    Str,
    Comma,
    ParenOpen,
    ParenClose,
    Semicolon,
    WithRollup,
    /// Arithmetic, bitwise and string operators: `-`, `+`, `/`, `%`, `||`, `::` ...
    Operator,
}

impl TokenKind {
    /// Kinds whose text is a keyword and is rendered uppercase.
    pub fn is_keyword(self) -> bool {
        !matches!(
            self,
            Self::Func
                | Self::Identifier
                | Self::Number
                | Self::Str
                | Self::Comma
                | Self::ParenOpen
                | Self::ParenClose
                | Self::Semicolon
                | Self::Operator
        )
    }

    /// Kinds that can stand alone as a value (column, operand, alias target).
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::Identifier | Self::Number | Self::Str | Self::Null
        )
    }
}

/// An immutable token produced by the lexer. `text` is the matched source
/// text, including the original case and spacing of keyword phrases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: CompactString,
    pub spos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str, spos: Pos) -> Self {
        Self {
            kind,
            text: CompactString::from(text),
            spos,
        }
    }

    /// Keyword text uppercased with internal whitespace runs collapsed,
    /// so `group \n  by` becomes `GROUP BY`. Non-keywords are returned as-is.
    pub fn normalized(&self) -> String {
        if self.kind.is_keyword() {
            self.text
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_uppercase()
        } else {
            self.text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_classification() {
        assert!(TokenKind::Link.is_keyword());
        assert!(TokenKind::Compare.is_keyword());
        assert!(!TokenKind::Identifier.is_keyword());
        assert!(!TokenKind::Func.is_keyword());
        assert!(!TokenKind::Operator.is_keyword());
    }

    #[test]
    fn test_normalized_keyword() {
        let tok = Token::new(TokenKind::Join, "Left \n  Outer join", 3);
        assert_eq!(tok.normalized(), "LEFT OUTER JOIN");
        assert_eq!(tok.spos, 3);
    }

    #[test]
    fn test_normalized_keeps_identifier_case() {
        let tok = Token::new(TokenKind::Func, "count", 0);
        assert_eq!(tok.normalized(), "count");
        let tok = Token::new(TokenKind::Str, "'Mixed Case'", 0);
        assert_eq!(tok.normalized(), "'Mixed Case'");
    }
}
