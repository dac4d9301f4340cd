use std::path::Path;

use serde::Deserialize;

/// Mode holds the run configuration of format-sql.
#[derive(Debug, Clone, Deserialize)]
pub struct Mode {
    /// File extensions to process, without the leading dot.
    #[serde(default = "default_types")]
    pub types: Vec<String>,

    /// Descend into subdirectories.
    #[serde(default)]
    pub recursive: bool,

    /// Print a diff instead of writing files.
    #[serde(default)]
    pub dry_run: bool,

    /// Also pick up embedded queries that do not end with `;`.
    #[serde(default)]
    pub no_semicolon: bool,

    /// Skip the stability check.
    #[serde(default)]
    pub fast: bool,

    /// Glob patterns to exclude.
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub quiet: bool,
}

fn default_types() -> Vec<String> {
    vec!["py".to_string()]
}

impl Default for Mode {
    fn default() -> Self {
        Self {
            types: default_types(),
            recursive: false,
            dry_run: false,
            no_semicolon: false,
            fast: false,
            exclude: Vec::new(),
            verbose: false,
            quiet: false,
        }
    }
}

impl Mode {
    /// Whether every result is formatted a second time to prove it is stable.
    pub fn should_stability_check(&self) -> bool {
        !self.fast && !self.dry_run
    }

    /// Whether the file's extension is one of `types` (case-insensitive,
    /// a leading dot in `types` is ignored).
    pub fn matches_type(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().map(|e| e.to_string_lossy().to_lowercase()) else {
            return false;
        };
        self.types
            .iter()
            .any(|t| t.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode() {
        let mode = Mode::default();
        assert_eq!(mode.types, vec!["py"]);
        assert!(!mode.recursive);
        assert!(!mode.dry_run);
        assert!(!mode.no_semicolon);
    }

    #[test]
    fn test_stability_check() {
        let mut mode = Mode::default();
        assert!(mode.should_stability_check());

        mode.fast = true;
        assert!(!mode.should_stability_check());

        mode.fast = false;
        mode.dry_run = true;
        assert!(!mode.should_stability_check());
    }

    #[test]
    fn test_matches_type() {
        let mode = Mode {
            types: vec!["py".into(), ".SQL".into()],
            ..Mode::default()
        };
        assert!(mode.matches_type(Path::new("a/b.py")));
        assert!(mode.matches_type(Path::new("query.sql")));
        assert!(mode.matches_type(Path::new("QUERY.Sql")));
        assert!(!mode.matches_type(Path::new("notes.txt")));
        assert!(!mode.matches_type(Path::new("Makefile")));
    }
}
