//! Error types for package loading.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading packages or writing the init script.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `packages.txt` does not exist in the work directory.
    #[error("Package list not found: {0}")]
    PackagesListNotFound(Utf8PathBuf),

    /// A package listed in `packages.txt` has no `_Package.<id>` directory.
    #[error("Package directory not found for '{id}': {path}")]
    PackageDirNotFound { id: String, path: Utf8PathBuf },

    /// The package directory has no `package.txt`.
    #[error("Package config not found: {0}")]
    PackageConfigNotFound(Utf8PathBuf),

    /// A required key is missing or empty in `package.txt`.
    #[error("Package config {path} is missing required key '{key}'")]
    PackageConfigMalformed { path: Utf8PathBuf, key: &'static str },

    /// A package's `iwd` would overwrite an archive already produced by the build.
    #[error("Package '{package}' uses archive name '{name}', already used by {other}")]
    ArchiveNameConflict {
        name: String,
        package: String,
        other: String,
    },
}
