use std::path::{Path, PathBuf};

/// Outcome for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Already formatted.
    Unchanged,
    /// Rewritten, or would be rewritten in a dry run.
    Changed,
    /// Reading, formatting, checking or writing failed.
    Error(String),
}

#[derive(Debug, Clone)]
pub struct FileResult {
    pub path: PathBuf,
    pub status: FileStatus,
}

impl FileResult {
    pub fn new(path: &Path, status: FileStatus) -> Self {
        Self {
            path: path.to_path_buf(),
            status,
        }
    }

    pub fn error(path: &Path, message: impl Into<String>) -> Self {
        Self::new(path, FileStatus::Error(message.into()))
    }
}

/// Results of one run, in processing order.
#[derive(Debug, Default)]
pub struct Report {
    pub results: Vec<FileResult>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: FileResult) {
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.status)).count()
    }

    pub fn unchanged(&self) -> usize {
        self.count(|s| *s == FileStatus::Unchanged)
    }

    pub fn changed(&self) -> usize {
        self.count(|s| *s == FileStatus::Changed)
    }

    pub fn errors(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Error(_)))
    }

    pub fn has_errors(&self) -> bool {
        self.errors() > 0
    }

    pub fn has_changes(&self) -> bool {
        self.changed() > 0
    }

    /// 2 on any error, 1 when a dry run found changes, 0 otherwise.
    pub fn exit_code(&self, dry_run: bool) -> i32 {
        if self.has_errors() {
            2
        } else if dry_run && self.has_changes() {
            1
        } else {
            0
        }
    }

    pub fn summary(&self, dry_run: bool) -> String {
        let mut parts = vec![format!("{} file(s) processed", self.total())];
        if self.changed() > 0 {
            let verb = if dry_run { "would be reformatted" } else { "reformatted" };
            parts.push(format!("{} {}", self.changed(), verb));
        }
        if self.unchanged() > 0 {
            parts.push(format!("{} unchanged", self.unchanged()));
        }
        if self.errors() > 0 {
            parts.push(format!("{} error(s)", self.errors()));
        }
        parts.join(", ")
    }

    pub fn print_errors(&self) {
        for result in &self.results {
            if let FileStatus::Error(message) = &result.status {
                eprintln!("error: {}: {}", result.path.display(), message);
            }
        }
    }
}
