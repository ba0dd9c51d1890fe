//! Settings resolution: command line, then `cod4-packager.toml`, then defaults.

use crate::cli::Args;
use crate::errors::CliError;
use camino::{Utf8Path, Utf8PathBuf};
use cpb_package::parse_bool;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

pub const CONFIG_FILE_NAME: &str = "cod4-packager.toml";
pub const DEFAULT_LINKER: &str = "linker_pc.exe";

/// Optional defaults stored in `cod4-packager.toml` next to the executable.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub work_dir: Option<Utf8PathBuf>,
    pub tools_dir: Option<Utf8PathBuf>,
    pub pack_scripts: Option<bool>,
    pub linker: Option<String>,
}

/// Returns the directory where the current executable resides.
pub fn install_dir() -> Option<Utf8PathBuf> {
    let exe = env::current_exe().ok()?;
    let parent = exe.parent()?;
    Utf8PathBuf::from_path_buf(parent.to_path_buf()).ok()
}

pub fn config_path() -> Option<Utf8PathBuf> {
    install_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Loads the configuration file, falling back to defaults when it is missing
/// or unreadable.
pub fn load_config() -> AppConfig {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => AppConfig::default(),
    }
}

pub fn load_config_from(path: &Utf8Path) -> AppConfig {
    if !path.is_file() {
        return AppConfig::default();
    }

    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| toml::from_str(&content).map_err(|e| e.to_string()));

    match parsed {
        Ok(config) => {
            tracing::debug!("Loaded config from {}", path);
            config
        }
        Err(e) => {
            tracing::warn!("Ignoring config file {}: {}", path, e);
            AppConfig::default()
        }
    }
}

/// Effective settings of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub work_dir: Utf8PathBuf,
    pub tools_dir: Utf8PathBuf,
    pub pack_scripts: bool,
    pub linker: String,
}

impl Settings {
    /// Relative paths are resolved against `cwd`. The tools directory defaults
    /// to two levels above the work directory (`<tools>/mods/<mod>`).
    pub fn resolve(args: &Args, config: &AppConfig, cwd: &Utf8Path) -> Self {
        let work_dir = args
            .work_dir
            .as_ref()
            .or(config.work_dir.as_ref())
            .map(|dir| cwd.join(dir))
            .unwrap_or_else(|| cwd.to_path_buf());

        let tools_dir = args
            .tools_dir
            .as_ref()
            .or(config.tools_dir.as_ref())
            .map(|dir| cwd.join(dir))
            .unwrap_or_else(|| work_dir.join("..").join(".."));

        let pack_scripts = args
            .packgsc
            .as_deref()
            .and_then(|value| {
                let parsed = parse_bool(value);
                if parsed.is_none() {
                    tracing::warn!("Ignoring unparsable -packgsc value '{}'", value);
                }
                parsed
            })
            .or(config.pack_scripts)
            .unwrap_or(true);

        let linker = config
            .linker
            .clone()
            .filter(|linker| !linker.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LINKER.to_string());

        Self {
            work_dir,
            tools_dir,
            pack_scripts,
            linker,
        }
    }

    /// Both roots must exist before anything else happens.
    pub fn validate(&self) -> Result<(), CliError> {
        if !self.work_dir.is_dir() {
            return Err(CliError::WorkDirNotFound {
                path: self.work_dir.clone(),
            });
        }
        if !self.tools_dir.is_dir() {
            return Err(CliError::ToolsDirNotFound {
                path: self.tools_dir.clone(),
            });
        }
        Ok(())
    }
}

/// Current directory as a UTF-8 path.
pub fn current_dir() -> Result<Utf8PathBuf, CliError> {
    let cwd = env::current_dir()?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|path| CliError::NonUtf8Path {
        path: path.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(
            &Args::default(),
            &AppConfig::default(),
            Utf8Path::new("/cod4/mods/ow"),
        );

        assert_eq!(settings.work_dir, Utf8PathBuf::from("/cod4/mods/ow"));
        assert_eq!(settings.tools_dir, Utf8PathBuf::from("/cod4/mods/ow/../.."));
        assert!(settings.pack_scripts);
        assert_eq!(settings.linker, DEFAULT_LINKER);
    }

    #[test]
    fn test_command_line_wins_over_config() {
        let args = Args {
            work_dir: Some(Utf8PathBuf::from("ow")),
            packgsc: Some("False".to_string()),
            ..Args::default()
        };
        let config = AppConfig {
            work_dir: Some(Utf8PathBuf::from("/elsewhere")),
            tools_dir: Some(Utf8PathBuf::from("/cod4")),
            pack_scripts: Some(true),
            linker: Some("linker_test.exe".to_string()),
        };

        let settings = Settings::resolve(&args, &config, Utf8Path::new("/mods"));

        assert_eq!(settings.work_dir, Utf8PathBuf::from("/mods/ow"));
        assert_eq!(settings.tools_dir, Utf8PathBuf::from("/cod4"));
        assert!(!settings.pack_scripts);
        assert_eq!(settings.linker, "linker_test.exe");
    }

    #[test]
    fn test_unparsable_packgsc_keeps_default() {
        let args = Args {
            packgsc: Some("nope".to_string()),
            ..Args::default()
        };
        let config = AppConfig {
            pack_scripts: Some(false),
            ..AppConfig::default()
        };

        let settings = Settings::resolve(&args, &config, Utf8Path::new("/mods"));
        assert!(!settings.pack_scripts);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let path = root.join(CONFIG_FILE_NAME);

        assert_eq!(load_config_from(&path), AppConfig::default());

        fs::write(&path, "tools_dir = \"C:/cod4\"\npack_scripts = false\n").unwrap();
        let config = load_config_from(&path);
        assert_eq!(config.tools_dir, Some(Utf8PathBuf::from("C:/cod4")));
        assert_eq!(config.pack_scripts, Some(false));

        fs::write(&path, "pack_scripts = \"definitely\"").unwrap();
        assert_eq!(load_config_from(&path), AppConfig::default());
    }

    #[test]
    fn test_validate_reports_missing_roots() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        let mut settings = Settings {
            work_dir: root.join("missing"),
            tools_dir: root.clone(),
            pack_scripts: true,
            linker: DEFAULT_LINKER.to_string(),
        };
        assert!(matches!(
            settings.validate(),
            Err(CliError::WorkDirNotFound { .. })
        ));

        settings.work_dir = root.clone();
        settings.tools_dir = root.join("missing");
        assert!(matches!(
            settings.validate(),
            Err(CliError::ToolsDirNotFound { .. })
        ));

        settings.tools_dir = root;
        assert!(settings.validate().is_ok());
    }
}
