//! `.iwd` archive packing.
//!
//! An archive is built by applying an ordered list of [`AssetRule`]s against a
//! single accumulating zip file. Each rule contributes the files below
//! `source_root/subdir` whose names match its pattern; the entry name is the
//! rule's subdirectory joined with the file's relative path, always using `/`.
//!
//! Adding a file whose entry name already exists replaces the old entry. The zip
//! format has no in-place delete, so every rule rewrites the archive through a
//! sibling temporary file, raw-copying the entries it keeps.

use crate::error::{Error, Result};
use crate::pattern::FilePattern;
use crate::rules::AssetRule;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Summary of one [`build_archive`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// The archive that was written.
    pub archive_path: Utf8PathBuf,
    /// Files added across all rules (replacements included).
    pub entries_added: usize,
    /// Rules whose source directory existed.
    pub rules_applied: usize,
}

/// Release file name for an archive base name, e.g. `main` -> `z_ow_main.iwd`.
pub fn archive_file_name(name: &str) -> String {
    format!("z_ow_{}.iwd", name)
}

/// Archive-internal name for a file found below a rule's subdirectory.
pub fn entry_name(subdir: &str, relative_path: &Utf8Path) -> String {
    let relative = relative_path.as_str().replace('\\', "/");
    let subdir = subdir.replace('\\', "/");
    let subdir = subdir.trim_matches('/');

    if subdir.is_empty() {
        relative
    } else {
        format!("{}/{}", subdir, relative)
    }
}

/// Build an archive from scratch by applying `rules` in order.
///
/// Any existing file at `archive_path` is deleted first. `source_root` must
/// exist; individual rule directories below it are optional.
pub fn build_archive(
    archive_path: &Utf8Path,
    source_root: &Utf8Path,
    rules: &[AssetRule],
) -> Result<ArchiveReport> {
    if !source_root.is_dir() {
        return Err(Error::SourceDirNotFound(source_root.to_path_buf()));
    }

    if archive_path.exists() {
        fs::remove_file(archive_path)?;
    }

    let mut entries_added = 0;
    let mut rules_applied = 0;

    for rule in rules {
        if let Some(added) = add_files(archive_path, source_root, rule)? {
            entries_added += added;
            rules_applied += 1;
        }
    }

    tracing::info!(
        "Archive {} built: {} entries from {} rule(s)",
        archive_path,
        entries_added,
        rules_applied
    );

    Ok(ArchiveReport {
        archive_path: archive_path.to_path_buf(),
        entries_added,
        rules_applied,
    })
}

/// Add every file selected by `rule` to the archive, creating it if needed.
///
/// Returns `None` when `source_root/subdir` does not exist; packages are not
/// required to provide every asset category.
pub fn add_files(
    archive_path: &Utf8Path,
    source_root: &Utf8Path,
    rule: &AssetRule,
) -> Result<Option<usize>> {
    let files_dir = rule.source_dir(source_root);
    if !files_dir.is_dir() {
        tracing::debug!("Skipping rule {:?}: {} does not exist", rule, files_dir);
        return Ok(None);
    }

    let pattern = FilePattern::new(rule.pattern)?;
    let mut entries = Vec::new();
    for file in pattern.find_files(&files_dir)? {
        let relative = file
            .strip_prefix(&files_dir)
            .map_err(|_| Error::SourceDirNotFound(files_dir.clone()))?;
        entries.push((entry_name(rule.subdir, relative), file.clone()));
    }

    write_entries(archive_path, &entries)?;

    tracing::debug!(
        "Packed {} file(s) from '{}' matching '{}'",
        entries.len(),
        rule.subdir,
        rule.pattern
    );

    Ok(Some(entries.len()))
}

/// Rewrite the archive with `entries` added, dropping old entries of the same name.
///
/// On failure the archive is left as it was and the temporary file is removed.
fn write_entries(archive_path: &Utf8Path, entries: &[(String, Utf8PathBuf)]) -> Result<()> {
    let tmp_path = Utf8PathBuf::from(format!("{}.tmp", archive_path));

    if let Some(parent) = archive_path.parent() {
        if !parent.as_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    if let Err(e) = write_rewritten(archive_path, &tmp_path, entries) {
        if let Err(remove_err) = fs::remove_file(&tmp_path) {
            tracing::debug!("Could not remove {}: {}", tmp_path, remove_err);
        }
        return Err(e);
    }

    fs::rename(&tmp_path, archive_path)?;
    Ok(())
}

fn write_rewritten(
    archive_path: &Utf8Path,
    tmp_path: &Utf8Path,
    entries: &[(String, Utf8PathBuf)],
) -> Result<()> {
    let replaced: HashSet<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    let mut writer = ZipWriter::new(BufWriter::new(File::create(tmp_path)?));

    if archive_path.exists() {
        let mut existing = ZipArchive::new(BufReader::new(File::open(archive_path)?))?;
        for i in 0..existing.len() {
            let file = existing.by_index_raw(i)?;
            if replaced.contains(file.name()) {
                tracing::debug!("Replacing archive entry {}", file.name());
                continue;
            }
            writer.raw_copy_file(file)?;
        }
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, path) in entries {
        writer.start_file(name.as_str(), options)?;
        let mut file = File::open(path)?;
        std::io::copy(&mut file, &mut writer)?;
    }

    let mut inner = writer.finish()?;
    inner.flush()?;
    Ok(())
}
