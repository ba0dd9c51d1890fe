//! Staging of one content scope (the base mod or a package) for the linker.
//!
//! The linker reads loose assets from the tools' `raw/` tree and its asset
//! lists from `zone_source/`. Staging copies a scope's asset directories into
//! `raw/`, ships script data (and, without script packing, the scripts
//! themselves) straight to the release directory, and merges the scope's
//! manifests into the shared `mod.csv` / `mod_ignore.csv`.

use crate::copy::{copy_asset_dir, copy_tree, CopyMode, CopyReport};
use crate::error::Result;
use crate::manifest::LineFilter;
use crate::rules::{
    LOCALS_DIR, RAW_ASSET_DIRS, SCRIPT_ASSET_SUFFIXES, SCRIPT_DATA_DIR, SCRIPT_DIRS,
};
use camino::{Utf8Path, Utf8PathBuf};

/// File name of the "valid assets" manifest.
pub const ASSET_LIST_FILE_NAME: &str = "mod.csv";
/// File name of the "ignored assets" manifest.
pub const IGNORED_ASSET_LIST_FILE_NAME: &str = "mod_ignore.csv";

/// Destination directories for one build, resolved for a target language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLayout {
    pub raw_dir: Utf8PathBuf,
    pub zone_source_dir: Utf8PathBuf,
    /// `zone_source/<Language>/assetlist`
    pub assetlist_dir: Utf8PathBuf,
    pub release_dir: Utf8PathBuf,
    pub language: String,
}

impl StagingLayout {
    pub fn new(tools_dir: &Utf8Path, release_dir: &Utf8Path, language: &str) -> Self {
        let zone_source_dir = tools_dir.join("zone_source");
        Self {
            raw_dir: tools_dir.join("raw"),
            assetlist_dir: zone_source_dir.join(language).join("assetlist"),
            zone_source_dir,
            release_dir: release_dir.to_path_buf(),
            language: language.to_string(),
        }
    }

    pub fn asset_list_path(&self) -> Utf8PathBuf {
        self.zone_source_dir.join(ASSET_LIST_FILE_NAME)
    }

    pub fn ignored_asset_list_path(&self) -> Utf8PathBuf {
        self.assetlist_dir.join(IGNORED_ASSET_LIST_FILE_NAME)
    }
}

/// A content scope to stage.
#[derive(Debug, Clone, Copy)]
pub struct BundleSource<'a> {
    /// Label used for logging (`Base` or the package name).
    pub name: &'a str,
    pub dir: &'a Utf8Path,
    /// Effective script packing for this scope.
    pub script_packing: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageReport {
    pub assets: CopyReport,
    pub manifests: CopyReport,
}

/// Stage `source` into `layout`.
pub fn stage_bundle_sources(source: &BundleSource<'_>, layout: &StagingLayout) -> Result<StageReport> {
    tracing::info!(
        "Staging \"{}\" assets (script packing: {})",
        source.name,
        source.script_packing
    );

    let mut assets = CopyReport::default();
    let mut absorb = |copied: Option<CopyReport>| {
        if let Some(copied) = copied {
            assets.absorb(copied);
        }
    };

    for dir in RAW_ASSET_DIRS {
        absorb(copy_asset_dir(source.dir, dir, &layout.raw_dir, None)?);
    }

    let locals = format!("{}/{}", LOCALS_DIR, layout.language);
    absorb(copy_asset_dir(
        source.dir,
        &locals,
        &layout.raw_dir,
        Some(layout.language.as_str()),
    )?);

    absorb(copy_asset_dir(
        source.dir,
        SCRIPT_DATA_DIR,
        &layout.release_dir,
        None,
    )?);

    let scripts_target = if source.script_packing {
        &layout.raw_dir
    } else {
        &layout.release_dir
    };
    for dir in SCRIPT_DIRS {
        absorb(copy_asset_dir(source.dir, dir, scripts_target, None)?);
    }

    let filter = if source.script_packing {
        LineFilter::none()
    } else {
        LineFilter::excluding(SCRIPT_ASSET_SUFFIXES)
    };
    let mode = CopyMode::Merge(filter);

    let mut manifests = copy_tree(
        source.dir,
        &layout.zone_source_dir,
        ASSET_LIST_FILE_NAME,
        &mode,
    )?;
    manifests.absorb(copy_tree(
        source.dir,
        &layout.assetlist_dir,
        IGNORED_ASSET_LIST_FILE_NAME,
        &mode,
    )?);

    tracing::info!(
        "Staged \"{}\": {} asset file(s), {} manifest(s), {} script line(s) skipped",
        source.name,
        assets.files_touched(),
        manifests.merged,
        manifests.filtered_lines
    );

    Ok(StageReport { assets, manifests })
}
