//! Build mode, target language and the resolved paths of one build run.

use crate::config::Settings;
use camino::Utf8PathBuf;
use cpb_stage::StagingLayout;
use std::fmt;

pub const BASE_DIR_NAME: &str = "_Base";
pub const RELEASE_DIR_NAME: &str = "Release";
/// Bundle name passed to the linker; the output file is `<name>.ff`.
pub const BUNDLE_NAME: &str = "mod";
pub const BUNDLE_FILE_NAME: &str = "mod.ff";

/// What a build produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Base and package archives plus the bundle.
    All,
    /// Base archives and the bundle.
    BaseOnly,
    BaseArchive,
    BaseBundle,
    /// Package archives and the bundle.
    PackagesOnly,
    PackagesArchive,
    PackagesBundle,
}

impl BuildMode {
    pub const ALL: [BuildMode; 7] = [
        BuildMode::All,
        BuildMode::BaseOnly,
        BuildMode::BaseArchive,
        BuildMode::BaseBundle,
        BuildMode::PackagesOnly,
        BuildMode::PackagesArchive,
        BuildMode::PackagesBundle,
    ];

    /// Menu number of the mode (1-based).
    pub fn choice(self) -> u8 {
        match self {
            BuildMode::All => 1,
            BuildMode::BaseOnly => 2,
            BuildMode::BaseArchive => 3,
            BuildMode::BaseBundle => 4,
            BuildMode::PackagesOnly => 5,
            BuildMode::PackagesArchive => 6,
            BuildMode::PackagesBundle => 7,
        }
    }

    pub fn from_choice(choice: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.choice() == choice)
    }

    pub fn description(self) -> &'static str {
        match self {
            BuildMode::All => "All (base and packages .iwd and .ff files)",
            BuildMode::BaseOnly => "Base only (base .iwd and .ff files)",
            BuildMode::BaseArchive => "Base IWD (base .iwd files)",
            BuildMode::BaseBundle => "Base FF (base .ff file)",
            BuildMode::PackagesOnly => "Packages only (packages .iwd and .ff files)",
            BuildMode::PackagesArchive => "Packages IWD (packages .iwd files)",
            BuildMode::PackagesBundle => "Packages FF (packages .ff file)",
        }
    }
}

/// Languages the mod tools can compile for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    French,
    German,
    Italian,
    Portuguese,
    Russian,
    Spanish,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::English,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
        Language::Russian,
        Language::Spanish,
    ];

    pub fn choice(self) -> u8 {
        match self {
            Language::English => 1,
            Language::French => 2,
            Language::German => 3,
            Language::Italian => 4,
            Language::Portuguese => 5,
            Language::Russian => 6,
            Language::Spanish => 7,
        }
    }

    pub fn from_choice(choice: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.choice() == choice)
    }

    /// Name used in tool paths and the linker's `-language` argument.
    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::French => "French",
            Language::German => "German",
            Language::Italian => "Italian",
            Language::Portuguese => "Portuguese",
            Language::Russian => "Russian",
            Language::Spanish => "Spanish",
        }
    }

    /// Accepts a language name (any case) or its menu number.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(choice) = value.parse::<u8>() {
            return Self::from_choice(choice);
        }
        Self::ALL
            .into_iter()
            .find(|lang| lang.name().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a build run needs, resolved once before the first step.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub mode: BuildMode,
    pub language: Language,
    pub work_dir: Utf8PathBuf,
    pub tools_dir: Utf8PathBuf,
    /// `<work dir>/_Base`
    pub base_dir: Utf8PathBuf,
    /// `<work dir>/Release`
    pub release_dir: Utf8PathBuf,
    /// `<tools>/bin`, also the linker's working directory
    pub bin_dir: Utf8PathBuf,
    /// `<tools>/zone`
    pub zone_dir: Utf8PathBuf,
    pub layout: StagingLayout,
    /// Global script packing toggle
    pub pack_scripts: bool,
    /// Linker executable file name inside `bin_dir`
    pub linker: String,
}

impl BuildContext {
    pub fn new(settings: &Settings, mode: BuildMode, language: Language) -> Self {
        let work_dir = settings.work_dir.clone();
        let tools_dir = settings.tools_dir.clone();
        let release_dir = work_dir.join(RELEASE_DIR_NAME);

        Self {
            mode,
            language,
            base_dir: work_dir.join(BASE_DIR_NAME),
            layout: StagingLayout::new(&tools_dir, &release_dir, language.name()),
            release_dir,
            bin_dir: tools_dir.join("bin"),
            zone_dir: tools_dir.join("zone"),
            pack_scripts: settings.pack_scripts,
            linker: settings.linker.clone(),
            work_dir,
            tools_dir,
        }
    }

    pub fn packages_list_path(&self) -> Utf8PathBuf {
        self.work_dir
            .join(cpb_package::registry::PACKAGES_LIST_FILE_NAME)
    }

    pub fn linker_path(&self) -> Utf8PathBuf {
        self.bin_dir.join(&self.linker)
    }

    /// Where the linker writes the compiled bundle.
    pub fn linked_bundle_path(&self) -> Utf8PathBuf {
        self.zone_dir.join(self.language.name()).join(BUNDLE_FILE_NAME)
    }

    pub fn release_path(&self, file_name: &str) -> Utf8PathBuf {
        self.release_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_choices_round_trip() {
        for mode in BuildMode::ALL {
            assert_eq!(BuildMode::from_choice(mode.choice()), Some(mode));
        }
        assert_eq!(BuildMode::from_choice(0), None);
        assert_eq!(BuildMode::from_choice(8), None);
    }

    #[test]
    fn test_language_parse() {
        assert_eq!(Language::parse("russian"), Some(Language::Russian));
        assert_eq!(Language::parse("2"), Some(Language::French));
        assert_eq!(Language::parse("0"), None);
        assert_eq!(Language::parse("klingon"), None);
    }

    #[test]
    fn test_context_paths() {
        let settings = Settings {
            work_dir: Utf8PathBuf::from("/mods/ow"),
            tools_dir: Utf8PathBuf::from("/cod4"),
            pack_scripts: true,
            linker: "linker_pc.exe".to_string(),
        };
        let ctx = BuildContext::new(&settings, BuildMode::All, Language::German);

        assert_eq!(ctx.base_dir, Utf8PathBuf::from("/mods/ow/_Base"));
        assert_eq!(ctx.release_dir, Utf8PathBuf::from("/mods/ow/Release"));
        assert_eq!(ctx.linker_path(), Utf8PathBuf::from("/cod4/bin/linker_pc.exe"));
        assert_eq!(
            ctx.linked_bundle_path(),
            Utf8PathBuf::from("/cod4/zone/German/mod.ff")
        );
        assert_eq!(
            ctx.layout.ignored_asset_list_path(),
            Utf8PathBuf::from("/cod4/zone_source/German/assetlist/mod_ignore.csv")
        );
        assert_eq!(
            ctx.packages_list_path(),
            Utf8PathBuf::from("/mods/ow/packages.txt")
        );
    }
}
