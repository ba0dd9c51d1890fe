//! Tree copies into the tools' staging directories.

use crate::error::{Error, Result};
use crate::manifest::{merge_file, LineFilter};
use crate::pattern::FilePattern;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// What to do when a copied file already exists at the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyMode {
    /// Replace the target file.
    Overwrite,
    /// Leave the target untouched.
    KeepExisting,
    /// Treat both files as manifests and merge the source into the target.
    Merge(LineFilter),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: usize,
    pub skipped: usize,
    pub merged: usize,
    /// Manifest lines dropped by a [`CopyMode::Merge`] filter.
    pub filtered_lines: usize,
}

impl CopyReport {
    pub fn absorb(&mut self, other: CopyReport) {
        self.copied += other.copied;
        self.skipped += other.skipped;
        self.merged += other.merged;
        self.filtered_lines += other.filtered_lines;
    }

    pub fn files_touched(&self) -> usize {
        self.copied + self.merged
    }
}

/// Copy every file below `source_dir` whose name matches `pattern` into
/// `target_dir`, keeping paths relative to `source_dir`.
///
/// Several source roots may be copied into the same target; later copies win
/// under [`CopyMode::Overwrite`] and accumulate under [`CopyMode::Merge`].
pub fn copy_tree(
    source_dir: &Utf8Path,
    target_dir: &Utf8Path,
    pattern: &str,
    mode: &CopyMode,
) -> Result<CopyReport> {
    if !source_dir.is_dir() {
        return Err(Error::SourceDirNotFound(source_dir.to_path_buf()));
    }

    let files = FilePattern::new(pattern)?.find_files(source_dir)?;
    let mut report = CopyReport::default();

    for file in &files {
        let relative = file
            .strip_prefix(source_dir)
            .map_err(|_| Error::SourceDirNotFound(source_dir.to_path_buf()))?;
        let target_path = target_dir.join(relative);

        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)?;
        }

        match mode {
            CopyMode::Overwrite => {
                fs::copy(file, &target_path)?;
                report.copied += 1;
            }
            CopyMode::KeepExisting => {
                if target_path.exists() {
                    report.skipped += 1;
                } else {
                    fs::copy(file, &target_path)?;
                    report.copied += 1;
                }
            }
            CopyMode::Merge(filter) => {
                let merged = merge_file(file, &target_path, filter)?;
                report.merged += 1;
                report.filtered_lines += merged.filtered;
            }
        }
    }

    tracing::debug!(
        "Copied ({}) files from {} to {}",
        report.files_touched(),
        source_dir,
        target_dir
    );

    Ok(report)
}

/// Copy `pack_dir/subdir` into `target_root/target_subdir` (defaults to `subdir`).
///
/// Returns `None` without touching anything when the source directory is
/// missing.
pub fn copy_asset_dir(
    pack_dir: &Utf8Path,
    subdir: &str,
    target_root: &Utf8Path,
    target_subdir: Option<&str>,
) -> Result<Option<CopyReport>> {
    let source = pack_dir.join(subdir);
    if !source.is_dir() {
        return Ok(None);
    }

    let target: Utf8PathBuf = target_root.join(target_subdir.unwrap_or(subdir));
    copy_tree(&source, &target, "*", &CopyMode::Overwrite).map(Some)
}
