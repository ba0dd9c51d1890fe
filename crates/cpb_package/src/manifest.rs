use camino::Utf8PathBuf;

/// A loaded content package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    /// Package name from the `name` key, used for logging.
    pub name: String,

    /// Absolute package directory, `<work dir>/_Package.<id>`.
    pub directory: Utf8PathBuf,

    /// Archive base name from the `iwd` key. The release archive is
    /// `z_ow_<archive_name>.iwd`.
    pub archive_name: String,

    /// Script module exposing `init()` (`gsc` key), threaded from the generated
    /// init script.
    pub script_entry_point: Option<String>,

    /// Config file name without `.cfg` (`cfg` key), looked up in `configs/`.
    pub config_name: Option<String>,

    /// Whether this package's scripts are compiled into the bundle (`packgsc`
    /// key, default `true`). Combined with the global toggle through
    /// [`effective_script_packing`](Self::effective_script_packing).
    pub script_packing: bool,
}

impl PackageManifest {
    pub fn effective_script_packing(&self, global: bool) -> bool {
        global && self.script_packing
    }
}
