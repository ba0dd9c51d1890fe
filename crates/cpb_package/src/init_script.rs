//! Generation of `_packagesinit.gsc`.
//!
//! The base mod calls `init()` of this generated script on startup; it in turn
//! threads the `init()` of every package that declares a script entry point, in
//! package list order.

use crate::error::Result;
use crate::manifest::PackageManifest;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

pub const INIT_SCRIPT_FILE_NAME: &str = "_packagesinit.gsc";
pub const INIT_SCRIPT_HEADER: &str = "//_packagesinit generated. Do not touch!!";

/// Location of the init script inside the base mod directory.
pub fn init_script_path(base_dir: &Utf8Path) -> Utf8PathBuf {
    base_dir.join("openwarfare").join(INIT_SCRIPT_FILE_NAME)
}

pub fn render(packages: &[PackageManifest]) -> String {
    let mut script = String::new();
    script.push_str(INIT_SCRIPT_HEADER);
    script.push('\n');
    script.push_str("init()\n");
    script.push_str("{\n");

    for entry_point in packages
        .iter()
        .filter_map(|p| p.script_entry_point.as_deref())
    {
        script.push_str(&format!("\tthread scripts\\{}::init();\n", entry_point));
    }

    script.push_str("}\n");
    script
}

/// Render and write the init script, replacing any existing file.
///
/// The script compiler does not accept a byte order mark, so the file is plain
/// UTF-8.
pub fn write(packages: &[PackageManifest], output_path: &Utf8Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(output_path, render(packages))?;

    tracing::info!(
        "Generated {} with {} package init call(s)",
        output_path,
        packages
            .iter()
            .filter(|p| p.script_entry_point.is_some())
            .count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn package(name: &str, script: Option<&str>) -> PackageManifest {
        PackageManifest {
            name: name.to_string(),
            directory: Utf8PathBuf::from(format!("_Package.{}", name)),
            archive_name: name.to_lowercase(),
            script_entry_point: script.map(str::to_string),
            config_name: None,
            script_packing: true,
        }
    }

    #[test]
    fn test_render_threads_entry_points_in_order() {
        let packages = vec![
            package("A", Some("sA")),
            package("B", None),
            package("C", Some("sC")),
        ];

        let script = render(&packages);
        let threads: Vec<&str> = script
            .lines()
            .filter(|l| l.trim_start().starts_with("thread"))
            .collect();

        assert_eq!(
            threads,
            vec!["\tthread scripts\\sA::init();", "\tthread scripts\\sC::init();"]
        );
        assert!(script.starts_with(INIT_SCRIPT_HEADER));
    }

    #[test]
    fn test_render_without_packages() {
        assert_eq!(
            render(&[]),
            format!("{}\ninit()\n{{\n}}\n", INIT_SCRIPT_HEADER)
        );
    }

    #[test]
    fn test_write_overwrites_without_bom() {
        let dir = tempdir().unwrap();
        let base = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let path = init_script_path(&base);

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale content that is longer than the new script........").unwrap();

        write(&[package("A", Some("sA"))], &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(!bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            render(&[package("A", Some("sA"))])
        );
    }
}
