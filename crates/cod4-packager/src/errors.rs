use camino::Utf8PathBuf;
use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

/// Process exit codes. Every fatal condition has its own code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BuildResult {
    Successful = 0,
    WorkDirNotFound = 1,
    BaseDirNotFound = 2,
    ToolsDirNotFound = 3,
    ArchiveSourceDirNotFound = 4,
    LinkerFailed = 5,
    PackagesListNotFound = 6,
    PackageDirNotFound = 7,
    PackageConfigNotFound = 8,
    PackageConfigWrongFormat = 9,
    IoFailure = 10,
}

impl BuildResult {
    pub fn exit_code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Working directory not found: {path}")]
    #[diagnostic(
        code(env::work_dir_not_found),
        help("Run the builder from the mod directory or pass -workdir <path>")
    )]
    WorkDirNotFound { path: Utf8PathBuf },

    #[error("Mod tools directory not found: {path}")]
    #[diagnostic(
        code(env::tools_dir_not_found),
        help("Pass -toolsdir <path> pointing at the CoD4 mod tools root (the folder containing bin/, raw/ and zone_source/)")
    )]
    ToolsDirNotFound { path: Utf8PathBuf },

    #[error("Base mod directory not found: {path}")]
    #[diagnostic(
        code(env::base_dir_not_found),
        help("The working directory must contain a _Base folder with the base mod content")
    )]
    BaseDirNotFound { path: Utf8PathBuf },

    #[error("Archive source directory not found: {path}")]
    #[diagnostic(code(archive::source_dir_not_found))]
    ArchiveSourceDirNotFound { path: Utf8PathBuf },

    #[error("Linker failed with exit code {}", .exit_code.map(|c| c.to_string()).unwrap_or_else(|| "<none>".to_string()))]
    #[diagnostic(
        code(linker::failed),
        help("Check the linker output above for missing or broken assets")
    )]
    LinkerFailed { exit_code: Option<i32> },

    #[error("Failed to start linker: {path}")]
    #[diagnostic(
        code(linker::spawn_failed),
        help("Make sure the linker executable exists in the tools bin/ folder")
    )]
    LinkerSpawnFailed {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Linker did not produce a bundle at {path}")]
    #[diagnostic(code(linker::bundle_missing))]
    BundleMissing { path: Utf8PathBuf },

    #[error("Package list not found: {path}")]
    #[diagnostic(
        code(package::list_not_found),
        help("Create packages.txt in the working directory with one package id per line")
    )]
    PackagesListNotFound { path: Utf8PathBuf },

    #[error("Package directory not found for '{id}': {path}")]
    #[diagnostic(
        code(package::dir_not_found),
        help("Every id in packages.txt needs a matching _Package.<id> folder, or comment the line out with //")
    )]
    PackageDirNotFound { id: String, path: Utf8PathBuf },

    #[error("Package config not found: {path}")]
    #[diagnostic(
        code(package::config_not_found),
        help("Add a package.txt with at least name=<name> and iwd=<archive name>")
    )]
    PackageConfigNotFound { path: Utf8PathBuf },

    #[error("Package config {path} is missing '{key}'")]
    #[diagnostic(
        code(package::config_malformed),
        help("package.txt must define non-empty name=<name> and iwd=<archive name> entries")
    )]
    PackageConfigMalformed { path: Utf8PathBuf, key: &'static str },

    #[error("Package '{package}' uses archive name '{name}', already used by {other}")]
    #[diagnostic(
        code(package::archive_name_conflict),
        help("Give every package its own 'iwd' value; 'main' and 'sounds' belong to the base mod")
    )]
    ArchiveNameConflict {
        name: String,
        package: String,
        other: String,
    },

    #[error("Path is not valid UTF-8: {path}")]
    #[diagnostic(code(fs::non_utf8_path))]
    NonUtf8Path { path: String },

    #[error("Prompt failed")]
    #[diagnostic(code(io::prompt_failed))]
    Prompt {
        #[source]
        source: inquire::InquireError,
    },

    #[error("Staging failed")]
    #[diagnostic(code(io::staging_failed))]
    Staging {
        #[source]
        source: cpb_stage::Error,
    },

    #[error("IO operation failed")]
    #[diagnostic(code(io::operation_failed))]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn build_result(&self) -> BuildResult {
        match self {
            CliError::WorkDirNotFound { .. } => BuildResult::WorkDirNotFound,
            CliError::ToolsDirNotFound { .. } => BuildResult::ToolsDirNotFound,
            CliError::BaseDirNotFound { .. } => BuildResult::BaseDirNotFound,
            CliError::ArchiveSourceDirNotFound { .. } => BuildResult::ArchiveSourceDirNotFound,
            CliError::LinkerFailed { .. }
            | CliError::LinkerSpawnFailed { .. }
            | CliError::BundleMissing { .. } => BuildResult::LinkerFailed,
            CliError::PackagesListNotFound { .. } => BuildResult::PackagesListNotFound,
            CliError::PackageDirNotFound { .. } => BuildResult::PackageDirNotFound,
            CliError::PackageConfigNotFound { .. } => BuildResult::PackageConfigNotFound,
            CliError::PackageConfigMalformed { .. } | CliError::ArchiveNameConflict { .. } => {
                BuildResult::PackageConfigWrongFormat
            }
            CliError::NonUtf8Path { .. }
            | CliError::Prompt { .. }
            | CliError::Staging { .. }
            | CliError::IoError { .. } => BuildResult::IoFailure,
        }
    }
}

impl From<cpb_package::Error> for CliError {
    fn from(err: cpb_package::Error) -> Self {
        use cpb_package::Error;

        match err {
            Error::Io(source) => CliError::IoError { source },
            Error::PackagesListNotFound(path) => CliError::PackagesListNotFound { path },
            Error::PackageDirNotFound { id, path } => CliError::PackageDirNotFound { id, path },
            Error::PackageConfigNotFound(path) => CliError::PackageConfigNotFound { path },
            Error::PackageConfigMalformed { path, key } => {
                CliError::PackageConfigMalformed { path, key }
            }
            Error::ArchiveNameConflict {
                name,
                package,
                other,
            } => CliError::ArchiveNameConflict {
                name,
                package,
                other,
            },
        }
    }
}

impl From<cpb_stage::Error> for CliError {
    fn from(err: cpb_stage::Error) -> Self {
        match err {
            cpb_stage::Error::SourceDirNotFound(path) => CliError::ArchiveSourceDirNotFound { path },
            source => CliError::Staging { source },
        }
    }
}
