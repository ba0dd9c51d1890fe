//! File name patterns used by asset rules and copy operations.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

// Names compare case-insensitively.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A glob matched against file *names* (never against directories).
///
/// Supports the forms used by the rule tables: `*.iwi`, `*_mp`, `mod.arena`, `*`.
#[derive(Debug, Clone)]
pub struct FilePattern {
    pattern: Pattern,
}

impl FilePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Pattern::new(pattern)?,
        })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.matches_with(file_name, MATCH_OPTIONS)
    }

    /// Recursively collect all files below `dir` whose name matches.
    ///
    /// Results are ordered by a depth-first walk sorted by file name so archive
    /// and copy order is stable between runs.
    pub fn find_files(&self, dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = Utf8Path::from_path(entry.path())
                .ok_or_else(|| Error::NonUtf8Path(entry.path().to_path_buf()))?;

            if path.file_name().is_some_and(|name| self.matches(name)) {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }
}
