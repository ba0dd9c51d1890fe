//! Asset staging for Call of Duty 4 mod builds.
//!
//! This crate holds the file plumbing of a mod build:
//!
//! - **Archives**: pack loose assets into `.iwd` (zip) archives, rule by rule,
//!   replacing entries that already exist ([`archive`])
//! - **Copying**: mirror directory trees into the mod tools' staging directories
//!   ([`copy`])
//! - **Manifests**: merge `mod.csv` style asset lists with de-duplication and
//!   optional script filtering ([`manifest`])
//! - **Bundle staging**: move everything the linker needs for one content scope
//!   (base or package) into place ([`staging`])
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use cpb_stage::{archive, rules};
//!
//! # fn main() -> cpb_stage::Result<()> {
//! let report = archive::build_archive(
//!     Utf8Path::new("Release/z_ow_main.iwd"),
//!     Utf8Path::new("_Base"),
//!     rules::BASE_MAIN_ASSETS,
//! )?;
//! println!("packed {} files", report.entries_added);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod copy;
pub mod error;
pub mod manifest;
pub mod pattern;
pub mod rules;
pub mod staging;

pub use archive::{archive_file_name, build_archive, ArchiveReport};
pub use copy::{copy_asset_dir, copy_tree, CopyMode, CopyReport};
pub use error::{Error, Result};
pub use manifest::{merge_bytes, merge_file, merge_text, LineFilter, MergeReport, MergedLines};
pub use pattern::FilePattern;
pub use rules::AssetRule;
pub use staging::{stage_bundle_sources, BundleSource, StageReport, StagingLayout};
