use std::fmt;

use thiserror::Error;

/// Where a lexing or parsing failure happened.
///
/// `position` is a byte offset into the source for lexing errors and a token
/// index for parsing errors. `found` is the offending text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSite {
    pub position: usize,
    pub found: String,
}

impl ErrorSite {
    pub fn new(position: usize, found: impl Into<String>) -> Self {
        Self {
            position,
            found: found.into(),
        }
    }

    /// Site for a parse that ran out of tokens.
    pub fn end_of_input(position: usize) -> Self {
        Self::new(position, "end of input")
    }
}

impl fmt::Display for ErrorSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` at {}", self.found, self.position)
    }
}

/// Invalid SQL. Every lexing, parsing and styling failure of the core
/// pipeline is one of these; there is no partial output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSql {
    #[error("invalid SQL: string not terminated: {0}")]
    StringNotTerminated(ErrorSite),

    #[error("invalid SQL: unexpected {0}")]
    UnexpectedToken(ErrorSite),

    #[error("invalid SQL: bad SELECT column {0}")]
    InvalidSelect(ErrorSite),

    #[error("invalid SQL: bad condition {0}")]
    InvalidCondition(ErrorSite),

    #[error("invalid SQL: bad GROUP BY value {0}")]
    InvalidGroupBy(ErrorSite),

    #[error("invalid SQL: bad function call {0}")]
    InvalidFunc(ErrorSite),

    #[error("invalid SQL: bad identifier {0}")]
    InvalidIdentifier(ErrorSite),

    #[error("invalid SQL: bad LIMIT {0}")]
    InvalidLimit(ErrorSite),

    #[error("invalid SQL: bad ORDER BY value {0}")]
    InvalidOrderBy(ErrorSite),

    #[error("invalid SQL: unbalanced parenthesis {0}")]
    UnbalancedParenthesis(ErrorSite),

    #[error("invalid SQL: nesting deeper than {limit} levels {site}")]
    NestingTooDeep { site: ErrorSite, limit: usize },
}

impl InvalidSql {
    pub fn site(&self) -> &ErrorSite {
        match self {
            Self::StringNotTerminated(site)
            | Self::UnexpectedToken(site)
            | Self::InvalidSelect(site)
            | Self::InvalidCondition(site)
            | Self::InvalidGroupBy(site)
            | Self::InvalidFunc(site)
            | Self::InvalidIdentifier(site)
            | Self::InvalidLimit(site)
            | Self::InvalidOrderBy(site)
            | Self::UnbalancedParenthesis(site)
            | Self::NestingTooDeep { site, .. } => site,
        }
    }

    /// The part of the statement that failed, for diagnostics.
    pub fn clause(&self) -> &'static str {
        match self {
            Self::StringNotTerminated(_) => "string literal",
            Self::UnexpectedToken(_) => "statement",
            Self::InvalidSelect(_) => "SELECT",
            Self::InvalidCondition(_) => "condition",
            Self::InvalidGroupBy(_) => "GROUP BY",
            Self::InvalidFunc(_) => "function call",
            Self::InvalidIdentifier(_) => "identifier",
            Self::InvalidLimit(_) => "LIMIT",
            Self::InvalidOrderBy(_) => "ORDER BY",
            Self::UnbalancedParenthesis(_) | Self::NestingTooDeep { .. } => "parenthesis",
        }
    }
}

/// User-facing errors of the file-level tool.
#[derive(Error, Debug)]
pub enum FormatSqlError {
    #[error(transparent)]
    Sql(#[from] InvalidSql),

    #[error("format-sql config error: {0}")]
    Config(String),

    #[error("format-sql stability error: {0}")]
    Unstable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, FormatSqlError>;
