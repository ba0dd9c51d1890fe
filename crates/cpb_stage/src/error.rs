//! Error types for staging operations.

use camino::Utf8PathBuf;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while packing or staging assets.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed (reading sources, writing archives or manifests).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip library rejected an archive read or write.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Walking a source tree failed.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A file pattern from an asset rule is not a valid glob.
    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A file below a source tree has a name that is not valid UTF-8.
    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// A directory that must exist for the operation is missing.
    #[error("Source directory not found: {0}")]
    SourceDirNotFound(Utf8PathBuf),
}
