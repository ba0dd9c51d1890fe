//! Fixed asset rule tables for the base mod and content packages.

use camino::{Utf8Path, Utf8PathBuf};

/// A `(subdirectory, file pattern)` pair selecting files for an archive.
///
/// An empty `subdir` means the source root itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetRule {
    pub subdir: &'static str,
    pub pattern: &'static str,
}

impl AssetRule {
    pub const fn new(subdir: &'static str, pattern: &'static str) -> Self {
        Self { subdir, pattern }
    }

    /// Directory the rule enumerates for a given source root.
    pub fn source_dir(&self, source_root: &Utf8Path) -> Utf8PathBuf {
        if self.subdir.is_empty() {
            source_root.to_path_buf()
        } else {
            source_root.join(self.subdir)
        }
    }
}

/// Rules for the base `z_ow_main.iwd` archive.
pub const BASE_MAIN_ASSETS: &[AssetRule] = &[
    AssetRule::new("images", "*.iwi"),
    AssetRule::new("weapons/mp", "*_mp"),
    AssetRule::new("", "mod.arena"),
    AssetRule::new("rulesets/openwarfare", "*.gsc"),
    AssetRule::new("rulesets", "leagues.gsc"),
];

/// Rules for the base `z_ow_sounds.iwd` archive.
pub const BASE_SOUND_ASSETS: &[AssetRule] = &[
    AssetRule::new("sound", "*.mp3"),
    AssetRule::new("sound", "*.wav"),
];

/// Rules for every package archive. Packages ship their sounds in the same archive.
pub const PACKAGE_ASSETS: &[AssetRule] = &[
    AssetRule::new("images", "*.iwi"),
    AssetRule::new("weapons/mp", "*_mp"),
    AssetRule::new("rulesets/openwarfare", "*.gsc"),
    AssetRule::new("rulesets", "leagues.gsc"),
    AssetRule::new("sound", "*.mp3"),
    AssetRule::new("sound", "*.wav"),
];

/// Manifest line suffixes that reference script assets.
pub const SCRIPT_ASSET_SUFFIXES: &[&str] = &["gsc", "gsx"];

/// Asset directories copied into the tools' `raw/` tree under the same name.
pub const RAW_ASSET_DIRS: &[&str] = &[
    "shock",
    "sound",
    "soundaliases",
    "ui_mp",
    "xmodel",
    "xmodelparts",
    "xmodelsurfs",
    "fx",
    "materials",
    "vision",
    "xanim",
    "mp",
];

/// Script directories; compiled into the bundle or shipped loose depending on
/// script packing.
pub const SCRIPT_DIRS: &[&str] = &["maps", "openwarfare", "scripts"];

/// Script data always ships loose next to the release archives.
pub const SCRIPT_DATA_DIR: &str = "scriptdata";

/// Localized strings live in `locals/<Language>`.
pub const LOCALS_DIR: &str = "locals";
