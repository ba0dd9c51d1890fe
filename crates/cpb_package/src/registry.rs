//! Loading of the package list and per-package configs.

use crate::error::{Error, Result};
use crate::manifest::PackageManifest;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fs;

/// Control file in the work directory listing package ids, one per line.
pub const PACKAGES_LIST_FILE_NAME: &str = "packages.txt";
/// Config file inside every package directory.
pub const PACKAGE_CONFIG_FILE_NAME: &str = "package.txt";
/// Package directories are named `_Package.<id>`.
pub const PACKAGE_DIR_PREFIX: &str = "_Package.";

pub const KEY_NAME: &str = "name";
pub const KEY_ARCHIVE: &str = "iwd";
pub const KEY_SCRIPT: &str = "gsc";
pub const KEY_CONFIG: &str = "cfg";
pub const KEY_SCRIPT_PACKING: &str = "packgsc";

/// Archive names taken by the base mod (`z_ow_main.iwd`, `z_ow_sounds.iwd`).
pub const BASE_MAIN_ARCHIVE: &str = "main";
pub const BASE_SOUND_ARCHIVE: &str = "sounds";
pub const BASE_ARCHIVE_NAMES: [&str; 2] = [BASE_MAIN_ARCHIVE, BASE_SOUND_ARCHIVE];

const COMMENT_MARKER: &str = "//";

/// Read a text file, replacing invalid UTF-8 sequences.
///
/// Package files are often saved in a legacy code page by Windows editors.
fn read_text_lossy(path: &Utf8Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Fail if `package` would overwrite another archive of the same build.
///
/// Archive names compare case-insensitively; listing the same package twice is
/// not a conflict.
fn check_archive_name(package: &PackageManifest, earlier: &[PackageManifest]) -> Result<()> {
    let name = &package.archive_name;
    if BASE_ARCHIVE_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
    {
        return Err(Error::ArchiveNameConflict {
            name: name.clone(),
            package: package.name.clone(),
            other: "the base mod".to_string(),
        });
    }

    if let Some(other) = earlier.iter().find(|other| {
        other.directory != package.directory && other.archive_name.eq_ignore_ascii_case(name)
    }) {
        return Err(Error::ArchiveNameConflict {
            name: name.clone(),
            package: package.name.clone(),
            other: format!("package '{}'", other.name),
        });
    }
    Ok(())
}

/// Directory of the package with the given id.
pub fn package_dir(work_dir: &Utf8Path, id: &str) -> Utf8PathBuf {
    work_dir.join(format!("{}{}", PACKAGE_DIR_PREFIX, id))
}

/// Package ids from a `packages.txt`, in file order.
///
/// `//` comment lines and blank lines are skipped.
pub fn parse_package_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_MARKER))
        .map(str::to_string)
        .collect()
}

/// Parse `true`/`false` (any case). Anything else is `None`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// `key=value` pairs of a `package.txt`.
///
/// Keys match case-insensitively and the first occurrence wins. The value is
/// everything after the first `=`.
#[derive(Debug, Clone, Default)]
pub struct PackageConfig {
    entries: Vec<(String, String)>,
}

impl PackageConfig {
    pub fn parse(text: &str) -> Self {
        let entries = text
            .trim_start_matches('\u{feff}')
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect();

        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Like [`get`](Self::get), treating an empty value as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

/// Build a manifest from a parsed config.
///
/// `config_path` is only used for error reporting.
pub fn manifest_from_config(
    directory: &Utf8Path,
    config: &PackageConfig,
    config_path: &Utf8Path,
) -> Result<PackageManifest> {
    let required = |key: &'static str| {
        config
            .get_non_empty(key)
            .map(str::to_string)
            .ok_or_else(|| Error::PackageConfigMalformed {
                path: config_path.to_path_buf(),
                key,
            })
    };

    let name = required(KEY_NAME)?;
    let archive_name = required(KEY_ARCHIVE)?;

    let script_packing = match config.get(KEY_SCRIPT_PACKING) {
        Some(value) => parse_bool(value).unwrap_or_else(|| {
            tracing::warn!(
                "Package '{}': ignoring unparsable {}={}",
                name,
                KEY_SCRIPT_PACKING,
                value
            );
            true
        }),
        None => true,
    };

    Ok(PackageManifest {
        name,
        directory: directory.to_path_buf(),
        archive_name,
        script_entry_point: config.get_non_empty(KEY_SCRIPT).map(str::to_string),
        config_name: config.get_non_empty(KEY_CONFIG).map(str::to_string),
        script_packing,
    })
}

/// Load the package `id` from `<work_dir>/_Package.<id>`.
pub fn load_package(work_dir: &Utf8Path, id: &str) -> Result<PackageManifest> {
    let directory = package_dir(work_dir, id);
    if !directory.is_dir() {
        return Err(Error::PackageDirNotFound {
            id: id.to_string(),
            path: directory,
        });
    }

    let config_path = directory.join(PACKAGE_CONFIG_FILE_NAME);
    if !config_path.is_file() {
        return Err(Error::PackageConfigNotFound(config_path));
    }

    let config = PackageConfig::parse(&read_text_lossy(&config_path)?);
    manifest_from_config(&directory, &config, &config_path)
}

/// Load every package listed in `control_file`, in order.
///
/// The first failing package aborts the whole load; no partial list is ever
/// returned. Two packages sharing an archive name, or a package using one of
/// [`BASE_ARCHIVE_NAMES`], is an error.
pub fn load_packages(control_file: &Utf8Path, work_dir: &Utf8Path) -> Result<Vec<PackageManifest>> {
    if !control_file.is_file() {
        return Err(Error::PackagesListNotFound(control_file.to_path_buf()));
    }

    let ids = parse_package_list(&read_text_lossy(control_file)?);
    let mut seen = HashSet::new();
    let mut packages = Vec::with_capacity(ids.len());

    for id in &ids {
        if !seen.insert(id.as_str()) {
            tracing::warn!("Package '{}' is listed more than once", id);
        }

        tracing::info!("Loading package: \"{}\"", id);
        let package = load_package(work_dir, id)?;
        check_archive_name(&package, &packages)?;
        tracing::debug!(
            "Package '{}' (dir={}, iwd={}, gsc={:?}, cfg={:?}, packgsc={})",
            package.name,
            package.directory,
            package.archive_name,
            package.script_entry_point,
            package.config_name,
            package.script_packing
        );
        packages.push(package);
    }

    tracing::info!("Loaded {} packages", packages.len());
    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn setup() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, root)
    }

    fn create_package(work_dir: &Utf8Path, id: &str, config: &str) {
        let dir = package_dir(work_dir, id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PACKAGE_CONFIG_FILE_NAME), config).unwrap();
    }

    #[test]
    fn test_parse_package_list_skips_comments() {
        let ids = parse_package_list("zombies\n// disabled\n\nhardpoints\r\n");
        assert_eq!(ids, vec!["zombies", "hardpoints"]);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("True"), Some(true));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn test_config_first_match_wins_case_insensitive() {
        let config = PackageConfig::parse("NAME=First\nname=Second\ncomment\niwd=a=b\n");
        assert_eq!(config.get("name"), Some("First"));
        assert_eq!(config.get("IWD"), Some("a=b"));
        assert_eq!(config.get("gsc"), None);
    }

    #[test]
    fn test_manifest_defaults() {
        let config = PackageConfig::parse("name=Zombies\niwd=zombies\ngsc=\nunknown=1\n");
        let manifest = manifest_from_config(
            Utf8Path::new("_Package.zombies"),
            &config,
            Utf8Path::new("_Package.zombies/package.txt"),
        )
        .unwrap();

        assert_eq!(manifest.name, "Zombies");
        assert_eq!(manifest.archive_name, "zombies");
        assert_eq!(manifest.script_entry_point, None);
        assert_eq!(manifest.config_name, None);
        assert!(manifest.script_packing);
    }

    #[test]
    fn test_manifest_script_packing_override() {
        let config = PackageConfig::parse("name=A\niwd=a\npackgsc=FALSE\n");
        let manifest =
            manifest_from_config(Utf8Path::new("a"), &config, Utf8Path::new("a/package.txt"))
                .unwrap();

        assert!(!manifest.script_packing);
        assert!(!manifest.effective_script_packing(true));

        let config = PackageConfig::parse("name=A\niwd=a\npackgsc=maybe\n");
        let manifest =
            manifest_from_config(Utf8Path::new("a"), &config, Utf8Path::new("a/package.txt"))
                .unwrap();
        assert!(manifest.script_packing);
        assert!(!manifest.effective_script_packing(false));
    }

    #[test]
    fn test_missing_required_key() {
        let config = PackageConfig::parse("name=A\n");
        let result =
            manifest_from_config(Utf8Path::new("a"), &config, Utf8Path::new("a/package.txt"));
        assert!(matches!(
            result,
            Err(Error::PackageConfigMalformed { key: KEY_ARCHIVE, .. })
        ));

        let config = PackageConfig::parse("name=\niwd=a\n");
        let result =
            manifest_from_config(Utf8Path::new("a"), &config, Utf8Path::new("a/package.txt"));
        assert!(matches!(
            result,
            Err(Error::PackageConfigMalformed { key: KEY_NAME, .. })
        ));
    }

    #[test]
    fn test_load_packages_in_order() {
        let (_dir, root) = setup();
        create_package(&root, "b", "name=Bravo\niwd=bravo\ngsc=_bravo\n");
        create_package(&root, "a", "name=Alpha\niwd=alpha\ncfg=alpha\n");
        fs::write(root.join(PACKAGES_LIST_FILE_NAME), "b\n//c\na\n").unwrap();

        let packages = load_packages(&root.join(PACKAGES_LIST_FILE_NAME), &root).unwrap();

        let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bravo", "Alpha"]);
        assert_eq!(packages[0].directory, root.join("_Package.b"));
        assert_eq!(packages[0].script_entry_point.as_deref(), Some("_bravo"));
        assert_eq!(packages[1].config_name.as_deref(), Some("alpha"));
    }

    #[test]
    fn test_load_packages_fails_on_missing_dir() {
        let (_dir, root) = setup();
        create_package(&root, "a", "name=Alpha\niwd=alpha\n");
        create_package(&root, "c", "name=Charlie\niwd=charlie\n");
        fs::write(root.join(PACKAGES_LIST_FILE_NAME), "a\nb\nc\n").unwrap();

        let result = load_packages(&root.join(PACKAGES_LIST_FILE_NAME), &root);

        match result {
            Err(Error::PackageDirNotFound { id, path }) => {
                assert_eq!(id, "b");
                assert_eq!(path, root.join("_Package.b"));
            }
            other => panic!("expected PackageDirNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_package_with_legacy_encoded_config() {
        let (_dir, root) = setup();
        let dir = package_dir(&root, "z");
        fs::create_dir_all(&dir).unwrap();
        // cp1251 "Зомби"
        fs::write(
            dir.join(PACKAGE_CONFIG_FILE_NAME),
            b"name=\xc7\xee\xec\xe1\xe8\r\niwd=zombies\r\ngsc=_zombies\r\n",
        )
        .unwrap();
        fs::write(root.join(PACKAGES_LIST_FILE_NAME), b"// \xc7\xee\xec\xe1\xe8\nz\n").unwrap();

        let packages = load_packages(&root.join(PACKAGES_LIST_FILE_NAME), &root).unwrap();

        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "\u{FFFD}".repeat(5));
        assert_eq!(packages[0].archive_name, "zombies");
        assert_eq!(packages[0].script_entry_point.as_deref(), Some("_zombies"));
    }

    #[test]
    fn test_duplicate_archive_names_are_rejected() {
        let (_dir, root) = setup();
        create_package(&root, "a", "name=Alpha\niwd=shared\n");
        create_package(&root, "b", "name=Bravo\niwd=SHARED\n");
        let list = root.join(PACKAGES_LIST_FILE_NAME);
        fs::write(&list, "a\nb\n").unwrap();

        match load_packages(&list, &root) {
            Err(Error::ArchiveNameConflict {
                name,
                package,
                other,
            }) => {
                assert_eq!(name, "SHARED");
                assert_eq!(package, "Bravo");
                assert_eq!(other, "package 'Alpha'");
            }
            other => panic!("expected ArchiveNameConflict, got {:?}", other),
        }

        // The same package listed twice keeps its archive.
        fs::write(&list, "a\na\n").unwrap();
        assert_eq!(load_packages(&list, &root).unwrap().len(), 2);
    }

    #[test]
    fn test_base_archive_names_are_reserved() {
        let (_dir, root) = setup();
        create_package(&root, "s", "name=Sounds\niwd=Sounds\n");
        let list = root.join(PACKAGES_LIST_FILE_NAME);
        fs::write(&list, "s\n").unwrap();

        assert!(matches!(
            load_packages(&list, &root),
            Err(Error::ArchiveNameConflict { .. })
        ));
    }

    #[test]
    fn test_load_packages_missing_list_and_config() {
        let (_dir, root) = setup();
        let list = root.join(PACKAGES_LIST_FILE_NAME);

        assert!(matches!(
            load_packages(&list, &root),
            Err(Error::PackagesListNotFound(_))
        ));

        fs::create_dir_all(package_dir(&root, "empty")).unwrap();
        fs::write(&list, "empty\n").unwrap();
        assert!(matches!(
            load_packages(&list, &root),
            Err(Error::PackageConfigNotFound(_))
        ));
    }
}
