//! SQL embedded in Python source: triple-quoted strings whose first word is
//! a query keyword are formatted in place.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::api::format_sql;
use crate::styler::INDENT_WIDTH;

static TRIPLE_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)"""(.*?)"""|'''(.*?)'''"#).expect("triple-quote pattern is valid")
});

static SQL_STARTERS: phf::Set<&'static str> = phf::phf_set! {
    "select",
    "insert",
};

/// Format every embedded query in `content`. Queries that fail to format are
/// logged and left as they are.
///
/// Unless `no_semicolon` is set, only queries ending with `;` are touched.
pub fn format_py_text(content: &str, no_semicolon: bool) -> String {
    TRIPLE_QUOTED
        .replace_all(content, |caps: &Captures| {
            let whole = &caps[0];
            let (quotes, body) = match (caps.get(1), caps.get(2)) {
                (Some(body), _) => ("\"\"\"", body),
                (None, Some(body)) => ("'''", body),
                (None, None) => return whole.to_string(),
            };
            let indent = line_indent(content, body.start()) + INDENT_WIDTH;
            match format_query(body.as_str(), no_semicolon, indent, body.start()) {
                Some(formatted) => format!("{quotes}{formatted}{quotes}"),
                None => whole.to_string(),
            }
        })
        .into_owned()
}

/// Number of leading spaces on the line containing byte offset `pos`.
fn line_indent(content: &str, pos: usize) -> usize {
    let line_start = content[..pos].rfind('\n').map_or(0, |i| i + 1);
    content[line_start..]
        .bytes()
        .take_while(|&b| b == b' ')
        .count()
}

fn is_query(query: &str, no_semicolon: bool) -> bool {
    let Some(first) = query.split(' ').next() else {
        return false;
    };
    SQL_STARTERS.contains(first.to_lowercase().as_str()) && (no_semicolon || query.ends_with(';'))
}

/// The replacement body: a newline, the formatted lines indented by
/// `indent` spaces (blank lines stay empty), and a trailing space.
fn format_query(body: &str, no_semicolon: bool, indent: usize, position: usize) -> Option<String> {
    let query = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if !is_query(&query, no_semicolon) {
        return None;
    }
    let formatted = match format_sql(&query) {
        Ok(formatted) => formatted,
        Err(e) => {
            warn!(position, clause = e.clause(), "skipping embedded query: {e}");
            return None;
        }
    };
    debug!(position, "formatted embedded query");

    let pad = " ".repeat(indent);
    let mut out = String::with_capacity(formatted.len() + 16);
    for line in formatted.lines() {
        out.push('\n');
        if !line.is_empty() {
            out.push_str(&pad);
            out.push_str(line);
        }
    }
    out.push(' ');
    Some(out)
}
