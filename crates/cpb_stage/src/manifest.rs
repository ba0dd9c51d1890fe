//! Merging of line-oriented asset manifests (`mod.csv`, `mod_ignore.csv`).
//!
//! The base content and every package contribute their own manifest. They are
//! merged one scope at a time into the same destination file, so the result
//! accumulates every contribution with each line kept once, in order of first
//! appearance.
//!
//! Lines are compared and written back as raw bytes. Manifests edited in
//! legacy code pages are not valid UTF-8, and their asset names must reach the
//! linker unchanged.
//!
//! When the destination already existed, a separator comment naming the merged
//! source is appended before the new lines. The separator is not checked
//! against earlier lines, so merging the same source twice leaves one extra
//! separator behind.

use crate::error::Result;
use camino::Utf8Path;
use std::collections::HashSet;
use std::fs;
use std::io;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Drops manifest lines that end with one of a set of suffixes.
///
/// Matching ignores ASCII case and trailing whitespace, so `scripts/foo.GSC  `
/// is excluded by the suffix `gsc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineFilter {
    excluded_suffixes: Vec<Vec<u8>>,
}

impl LineFilter {
    /// A filter that keeps every line.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn excluding<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            excluded_suffixes: suffixes
                .into_iter()
                .map(|s| s.as_ref().as_bytes().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.excluded_suffixes.is_empty()
    }

    pub fn accepts(&self, line: &str) -> bool {
        self.accepts_bytes(line.as_bytes())
    }

    pub fn accepts_bytes(&self, line: &[u8]) -> bool {
        if self.excluded_suffixes.is_empty() {
            return true;
        }

        let normalized = line.trim_ascii_end().to_ascii_lowercase();
        !self
            .excluded_suffixes
            .iter()
            .any(|suffix| normalized.ends_with(suffix))
    }
}

/// Result of merging one source into existing manifest content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedLines {
    /// Full destination content, one entry per line, without terminators.
    pub lines: Vec<Vec<u8>>,
    /// Source lines that were new.
    pub added: usize,
    /// Source lines dropped by the filter.
    pub filtered: usize,
}

impl MergedLines {
    /// The merged content with every line `\n` terminated.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut content = Vec::new();
        for line in &self.lines {
            content.extend_from_slice(line);
            content.push(b'\n');
        }
        content
    }
}

/// Summary of one [`merge_file`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub added: usize,
    pub filtered: usize,
    pub destination_existed: bool,
}

/// The comment line written between existing content and a merged source.
pub fn separator_line(source_label: &str) -> String {
    format!("# -- merged from \"{}\" -- #", source_label)
}

/// Lines of `content` as `str::lines` splits them: `\n` or `\r\n` terminated,
/// no trailing empty line.
fn split_lines(content: &[u8]) -> impl Iterator<Item = &[u8]> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    let empty = content.is_empty();
    let content = content.strip_suffix(b"\n").unwrap_or(content);

    content
        .split(|&b| b == b'\n')
        .filter(move |_| !empty)
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

/// Merge `source` into `existing` manifest content.
///
/// `existing` is `None` when the destination does not exist yet; in that case
/// no separator is emitted.
pub fn merge_bytes(
    existing: Option<&[u8]>,
    source_label: &str,
    source: &[u8],
    filter: &LineFilter,
) -> MergedLines {
    let mut seen: HashSet<&[u8]> = HashSet::new();
    let mut lines = Vec::new();

    if let Some(existing) = existing {
        for line in split_lines(existing) {
            if seen.insert(line) {
                lines.push(line.to_vec());
            }
        }
        lines.push(separator_line(source_label).into_bytes());
    }

    let mut added = 0;
    let mut filtered = 0;
    for line in split_lines(source) {
        if !filter.accepts_bytes(line) {
            filtered += 1;
            continue;
        }
        if seen.insert(line) {
            lines.push(line.to_vec());
            added += 1;
        }
    }

    MergedLines {
        lines,
        added,
        filtered,
    }
}

/// [`merge_bytes`] over text content.
pub fn merge_text(
    existing: Option<&str>,
    source_label: &str,
    source: &str,
    filter: &LineFilter,
) -> MergedLines {
    merge_bytes(
        existing.map(str::as_bytes),
        source_label,
        source.as_bytes(),
        filter,
    )
}

/// Merge the manifest at `source` into the file at `destination`, rewriting it.
pub fn merge_file(
    source: &Utf8Path,
    destination: &Utf8Path,
    filter: &LineFilter,
) -> Result<MergeReport> {
    let source_content = fs::read(source)?;
    let existing = match fs::read(destination) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    let merged = merge_bytes(
        existing.as_deref(),
        source.as_str(),
        &source_content,
        filter,
    );

    if let Some(parent) = destination.parent() {
        if !parent.as_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(destination, merged.to_bytes())?;

    if merged.filtered > 0 {
        tracing::info!("Skipped ({}) assets from {}", merged.filtered, source);
    }
    tracing::debug!(
        "Merged {} into {}: {} new line(s)",
        source,
        destination,
        merged.added
    );

    Ok(MergeReport {
        added: merged.added,
        filtered: merged.filtered,
        destination_existed: existing.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::tempdir;

    fn lines(expected: &[&str]) -> Vec<Vec<u8>> {
        expected.iter().map(|l| l.as_bytes().to_vec()).collect()
    }

    #[test]
    fn test_merge_into_missing_destination() {
        let merged = merge_text(None, "a/mod.csv", "x\ny\nx\nz\n", &LineFilter::none());

        assert_eq!(merged.lines, lines(&["x", "y", "z"]));
        assert_eq!(merged.added, 3);
    }

    #[test]
    fn test_merge_order_and_separator() {
        let merged = merge_text(
            Some("a\nb\na\n"),
            "pkg/mod.csv",
            "c\nb\nd\n",
            &LineFilter::none(),
        );

        let separator = separator_line("pkg/mod.csv");
        assert_eq!(merged.lines, lines(&["a", "b", separator.as_str(), "c", "d"]));
        assert_eq!(merged.added, 2);
    }

    #[test]
    fn test_split_lines_like_str_lines() {
        let split: Vec<&[u8]> = split_lines(b"\xEF\xBB\xBFa\r\n\nb").collect();
        assert_eq!(split, vec![&b"a"[..], &b""[..], &b"b"[..]]);
        assert_eq!(split_lines(b"").count(), 0);
        assert_eq!(split_lines(b"\n").count(), 1);
    }

    #[test]
    fn test_exclusion_filter() {
        let filter = LineFilter::excluding(["gsc", "gsx"]);
        let merged = merge_text(
            None,
            "mod.csv",
            "scripts/foo.gsc\nimages/bar.iwi\nscripts/baz.GSX  \n",
            &filter,
        );

        assert_eq!(merged.lines, lines(&["images/bar.iwi"]));
        assert_eq!(merged.filtered, 2);
    }

    #[test]
    fn test_filter_keeps_everything_when_empty() {
        let filter = LineFilter::none();
        assert!(filter.is_empty());
        assert!(filter.accepts("rawfile,maps/mp/gametypes/_hud.gsc"));
    }

    #[test]
    fn test_merge_twice_adds_only_a_separator() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let source = root.join("mod.csv");
        let destination = root.join("zone_source").join("mod.csv");

        fs::create_dir_all(destination.parent().unwrap()).unwrap();
        fs::write(&destination, "material,base\n").unwrap();
        fs::write(&source, "material,base\nxmodel,gun\n").unwrap();

        merge_file(&source, &destination, &LineFilter::none()).unwrap();
        let once = fs::read_to_string(&destination).unwrap();

        let report = merge_file(&source, &destination, &LineFilter::none()).unwrap();
        let twice = fs::read_to_string(&destination).unwrap();

        assert_eq!(report.added, 0);
        assert!(report.destination_existed);
        assert_eq!(twice, format!("{}{}\n", once, separator_line(source.as_str())));
    }

    #[test]
    fn test_merge_file_creates_destination_dirs() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let source = root.join("mod_ignore.csv");
        let destination = root.join("English/assetlist/mod_ignore.csv");
        fs::write(&source, "\u{feff}localize,ui\n").unwrap();

        let report = merge_file(&source, &destination, &LineFilter::none()).unwrap();

        assert!(!report.destination_existed);
        assert_eq!(fs::read_to_string(&destination).unwrap(), "localize,ui\n");
    }

    #[test]
    fn test_merge_file_keeps_legacy_encoded_lines() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let base = root.join("base.csv");
        let package = root.join("package.csv");
        let destination = root.join("mod.csv");

        // Latin-1 "café" and cp1251 "Зомби"
        fs::write(&base, b"material,caf\xe9\r\nxmodel,gun\n").unwrap();
        fs::write(
            &package,
            b"material,caf\xe9\nmaterial,\xc7\xee\xec\xe1\xe8\nrawfile,scripts/z.gsc\n",
        )
        .unwrap();

        merge_file(&base, &destination, &LineFilter::none()).unwrap();
        let report =
            merge_file(&package, &destination, &LineFilter::excluding(["gsc"])).unwrap();

        assert_eq!(report.added, 1);
        assert_eq!(report.filtered, 1);

        let mut expected = b"material,caf\xe9\nxmodel,gun\n".to_vec();
        expected.extend_from_slice(separator_line(package.as_str()).as_bytes());
        expected.extend_from_slice(b"\nmaterial,\xc7\xee\xec\xe1\xe8\n");
        assert_eq!(fs::read(&destination).unwrap(), expected);
    }
}
