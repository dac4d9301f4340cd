pub mod action;
pub mod api;
pub mod config;
pub mod embedded;
pub mod error;
pub mod lexer;
pub mod mode;
pub mod parser;
pub mod report;
pub mod rule;
pub mod rules;
pub mod statement;
pub mod styler;
pub mod token;

mod string_utils;

// Re-export the main public API
pub use api::{format_sql, format_sql_text, get_matching_paths, run};
pub use config::load_config;
pub use error::{FormatSqlError, InvalidSql};
pub use lexer::tokenize;
pub use mode::Mode;
pub use parser::parse;
pub use styler::style;
