//! Content packages for Call of Duty 4 mod builds.
//!
//! A package is an independently authored directory `_Package.<id>` next to the
//! base mod, described by a small `package.txt`:
//!
//! ```text
//! name=Zombies
//! iwd=zombies
//! gsc=_zombies
//! cfg=zombies
//! packgsc=false
//! ```
//!
//! The work directory's `packages.txt` lists which packages take part in a
//! build, and in which order. [`load_packages`] resolves that list into
//! [`PackageManifest`]s, and [`init_script`] generates the script that calls
//! every package's `init()` from the base mod.

pub mod error;
pub mod init_script;
mod manifest;
pub mod registry;

pub use error::{Error, Result};
pub use manifest::PackageManifest;
pub use registry::{load_packages, parse_bool};
