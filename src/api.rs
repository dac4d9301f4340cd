use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::embedded::format_py_text;
use crate::error::{FormatSqlError, InvalidSql, Result};
use crate::lexer::tokenize;
use crate::mode::Mode;
use crate::parser::parse;
use crate::report::{FileResult, FileStatus, Report};
use crate::styler::style;

/// Format SQL text: tokenize, parse and style, joined with newlines.
///
/// A trailing `;` stays attached to the last line. Statements separated by
/// `;` are separated by two blank lines in the output.
pub fn format_sql(sql: &str) -> std::result::Result<String, InvalidSql> {
    let tokens = tokenize(sql)?;
    let statements = parse(&tokens)?;
    Ok(style(&statements)?.join("\n"))
}

/// Format the content of a `.sql` file. The result ends with a newline;
/// text without any statement is returned unchanged.
pub fn format_sql_text(text: &str) -> std::result::Result<String, InvalidSql> {
    let formatted = format_sql(text)?;
    if formatted.is_empty() {
        return Ok(text.to_string());
    }
    Ok(formatted + "\n")
}

/// Format file content according to its extension.
pub fn format_content(path: &Path, content: &str, mode: &Mode) -> Result<String> {
    if is_sql_file(path) {
        Ok(format_sql_text(content)?)
    } else {
        Ok(format_py_text(content, mode.no_semicolon))
    }
}

fn is_sql_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
}

/// Run the formatter on a collection of files and directories.
pub fn run(paths: &[PathBuf], mode: &Mode) -> Report {
    let mut report = Report::new();
    for path in get_matching_paths(paths, mode) {
        report.add(format_file(&path, mode));
    }
    report
}

/// Format a single file in place, or print its diff in a dry run.
pub fn format_file(path: &Path, mode: &Mode) -> FileResult {
    debug!(path = %path.display(), "formatting file");
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => return FileResult::error(path, format!("read error: {e}")),
    };

    let formatted = match format_checked(path, &source, mode) {
        Ok(formatted) => formatted,
        Err(e) => return FileResult::error(path, e.to_string()),
    };

    if source == formatted {
        return FileResult::new(path, FileStatus::Unchanged);
    }

    if mode.dry_run {
        print_diff(path, &source, &formatted);
        return FileResult::new(path, FileStatus::Changed);
    }

    match std::fs::write(path, &formatted) {
        Ok(()) => {
            debug!(path = %path.display(), "reformatted");
            FileResult::new(path, FileStatus::Changed)
        }
        Err(e) => FileResult::error(path, format!("write error: {e}")),
    }
}

fn format_checked(path: &Path, source: &str, mode: &Mode) -> Result<String> {
    let formatted = format_content(path, source, mode)?;
    if mode.should_stability_check() {
        stability_check(path, &formatted, mode)?;
    }
    Ok(formatted)
}

/// Formatting the output again must not change it.
fn stability_check(path: &Path, formatted: &str, mode: &Mode) -> Result<()> {
    let again = format_content(path, formatted, mode)?;
    if again == formatted {
        return Ok(());
    }
    let first_difference = formatted
        .lines()
        .zip(again.lines())
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| formatted.lines().count().min(again.lines().count()));
    Err(FormatSqlError::Unstable(format!(
        "second pass changes {} at line {}",
        path.display(),
        first_difference + 1
    )))
}

/// Files to format: named files whose extension is in `mode.types`, plus
/// matching files inside named directories (direct children, or all
/// descendants with `mode.recursive`). Hidden and excluded entries are
/// skipped. Sorted, without duplicates.
pub fn get_matching_paths(paths: &[PathBuf], mode: &Mode) -> Vec<PathBuf> {
    let exclude: Vec<glob::Pattern> = mode
        .exclude
        .iter()
        .filter_map(|pattern| glob::Pattern::new(pattern).ok())
        .collect();
    let mut result = BTreeSet::new();

    for path in paths {
        if path.is_file() {
            if mode.matches_type(path) {
                result.insert(path.clone());
            }
        } else if path.is_dir() {
            collect_files(path, mode, &exclude, &mut result);
        }
    }

    result.into_iter().collect()
}

fn collect_files(dir: &Path, mode: &Mode, exclude: &[glob::Pattern], result: &mut BTreeSet<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), "cannot read directory: {e}");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();

        if name.starts_with('.') {
            continue;
        }
        if exclude
            .iter()
            .any(|pattern| pattern.matches(&name) || pattern.matches_path(&path))
        {
            continue;
        }

        if path.is_dir() {
            if mode.recursive {
                collect_files(&path, mode, exclude, result);
            }
        } else if mode.matches_type(&path) {
            result.insert(path);
        }
    }
}

/// Print a unified-style diff between original and formatted content.
fn print_diff(path: &Path, original: &str, formatted: &str) {
    use similar::{ChangeTag, TextDiff};

    eprintln!("--- {}", path.display());
    eprintln!("+++ {}", path.display());

    let diff = TextDiff::from_lines(original, formatted);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        eprint!("{}{}", sign, change);
        if change.missing_newline() {
            eprintln!();
        }
    }
}
