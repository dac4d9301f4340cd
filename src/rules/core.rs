/// Core lexing rules: everything that is not a keyword.
/// Priority ordering: lower numbers match first.
///
/// Rule categories and priority ranges:
///   100-101: Comments (skipped)
///   200:     Quoted strings
///   300:     Parameter placeholders
///   400-403: Punctuation
///   500:     Comparison operators
///   600:     Numbers
///   650:     Operators
///   5000:    Fallback name (identifier or function name)
use crate::action::Action;
use crate::rule::Rule;
use crate::token::TokenKind;

pub fn core_rules() -> Vec<Rule> {
    vec![
        Rule::new("line_comment", 100, r"--[^\n]*", Action::Skip),
        Rule::new("block_comment", 101, r"/\*.*?\*/", Action::Skip),
        // Only the opening quote; the lexer scans for the closing one so an
        // unterminated literal is reported instead of silently skipped.
        Rule::new("quoted_string", 200, r#"['"]"#, Action::HandleString),
        // %s, %(name)s, %%(name)s, {name}, ?, :name
        Rule::new(
            "placeholder",
            300,
            r"%%?(?:\(\w+\))?s\b|\{[^{}\s]*\}|\?|:\w+",
            Action::AddToken {
                kind: TokenKind::Identifier,
            },
        ),
        Rule::new(
            "comma",
            400,
            r",",
            Action::AddToken {
                kind: TokenKind::Comma,
            },
        ),
        Rule::new(
            "paren_open",
            401,
            r"\(",
            Action::AddToken {
                kind: TokenKind::ParenOpen,
            },
        ),
        Rule::new(
            "paren_close",
            402,
            r"\)",
            Action::AddToken {
                kind: TokenKind::ParenClose,
            },
        ),
        Rule::new(
            "semicolon",
            403,
            r";",
            Action::AddToken {
                kind: TokenKind::Semicolon,
            },
        ),
        // Two-character operators before their one-character prefixes
        Rule::new(
            "compare_operator",
            500,
            r"<>|!=|>=|<=|<|>|=",
            Action::AddToken {
                kind: TokenKind::Compare,
            },
        ),
        Rule::new(
            "number",
            600,
            r"[+-]?\d+(?:\.\d+)?\b",
            Action::AddToken {
                kind: TokenKind::Number,
            },
        ),
        // After numbers, so `-1` stays a signed literal; after comparisons,
        // so `!=` is not split.
        Rule::new(
            "operator",
            650,
            r"->>|->|\|\||::|[-+/%&|^~!]",
            Action::AddToken {
                kind: TokenKind::Operator,
            },
        ),
        // Dotted names with optional backtick quoting: a, t.a, `t`.`a`, t.*, *
        Rule::new(
            "name",
            5000,
            r"(?:`[^`]*`|[\w*$]+)(?:\.(?:`[^`]*`|[\w*$]+))*",
            Action::HandleWord,
        ),
    ]
}
