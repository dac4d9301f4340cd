use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{FormatSqlError, Result};
use crate::mode::Mode;

const PYPROJECT: &str = "pyproject.toml";
const CONFIG_FILE: &str = "format-sql.toml";

/// Keys accepted in `[tool.format-sql]` or `format-sql.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    types: Option<Vec<String>>,
    recursive: Option<bool>,
    #[serde(alias = "no-semicolon")]
    no_semicolon: Option<bool>,
    exclude: Option<Vec<String>>,
}

/// Load configuration for the given paths. With no explicit file, the
/// directories of `paths` and their ancestors are searched, nearest first.
pub fn load_config(paths: &[PathBuf], config_path: Option<&Path>) -> Result<Mode> {
    let mut mode = Mode::default();

    let config_file = match config_path {
        Some(path) if path.exists() => Some(path.to_path_buf()),
        Some(path) => {
            return Err(FormatSqlError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        None => find_config_file(paths),
    };

    if let Some(path) = config_file {
        tracing::debug!(path = %path.display(), "loading config");
        apply_config(&mut mode, load_config_from_path(&path)?);
    }

    Ok(mode)
}

fn find_config_file(paths: &[PathBuf]) -> Option<PathBuf> {
    for parent in get_common_parents(paths) {
        for name in [PYPROJECT, CONFIG_FILE] {
            let candidate = parent.join(name);
            if candidate.is_file() && has_section(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

/// A pyproject.toml without a `[tool.format-sql]` table does not stop the search.
fn has_section(path: &Path) -> bool {
    if path.file_name().is_some_and(|n| n == CONFIG_FILE) {
        return true;
    }
    std::fs::read_to_string(path)
        .ok()
        .and_then(|content| toml::from_str::<toml::Table>(&content).ok())
        .is_some_and(|table| table.get("tool").and_then(|t| t.get("format-sql")).is_some())
}

/// Directories of the given paths and all their ancestors, most specific first.
fn get_common_parents(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut parents: Vec<PathBuf> = Vec::new();
    for path in paths {
        let start = if path.is_dir() {
            path.clone()
        } else {
            match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            }
        };
        let start = start.canonicalize().unwrap_or(start);
        for dir in start.ancestors() {
            if !parents.iter().any(|p| p == dir) {
                parents.push(dir.to_path_buf());
            }
        }
    }
    parents
}

fn load_config_from_path(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)?;
    let parsed: toml::Table = toml::from_str(&content)?;

    let section = if path.file_name().is_some_and(|n| n == CONFIG_FILE) {
        Some(toml::Value::Table(parsed))
    } else {
        parsed
            .get("tool")
            .and_then(|tool| tool.get("format-sql"))
            .cloned()
    };

    match section {
        Some(value) => value.try_into().map_err(|e| {
            FormatSqlError::Config(format!("{}: {}", path.display(), e))
        }),
        None => Ok(FileConfig::default()),
    }
}

fn apply_config(mode: &mut Mode, config: FileConfig) {
    if let Some(types) = config.types {
        mode.types = types;
    }
    if let Some(recursive) = config.recursive {
        mode.recursive = recursive;
    }
    if let Some(no_semicolon) = config.no_semicolon {
        mode.no_semicolon = no_semicolon;
    }
    if let Some(exclude) = config.exclude {
        mode.exclude = exclude;
    }
}
