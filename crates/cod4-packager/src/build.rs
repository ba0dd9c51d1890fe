//! The build pipeline: mode-specific steps over one [`BuildContext`].

use crate::context::{BuildContext, BuildMode, BUNDLE_FILE_NAME};
use crate::errors::CliError;
use crate::linker::Linker;
use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use cpb_package::registry::{BASE_MAIN_ARCHIVE, BASE_SOUND_ARCHIVE};
use cpb_package::{init_script, load_packages, PackageManifest};
use cpb_stage::{
    archive_file_name, build_archive, copy_tree, rules, stage_bundle_sources, ArchiveReport,
    BundleSource, CopyMode,
};
use std::fs::{self, OpenOptions};
use std::io::Write;

/// Config shipped by the base mod, `_Base/configs/openwarfare.cfg`.
pub const BASE_CONFIG_NAME: &str = "openwarfare";
pub const CONFIGS_DIR: &str = "configs";
pub const AUTOEXEC_FILE_NAME: &str = "autoexec.cfg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    LoadPackages,
    BaseArchives,
    PackageArchives,
    StageBase,
    StagePackages,
    LinkBundle,
    WriteConfigs,
}

impl BuildStep {
    pub fn title(self) -> &'static str {
        match self {
            BuildStep::LoadPackages => "Loading packages",
            BuildStep::BaseArchives => "Building base IWD files",
            BuildStep::PackageArchives => "Building package IWD files",
            BuildStep::StageBase => "Preparing base assets",
            BuildStep::StagePackages => "Preparing package assets",
            BuildStep::LinkBundle => "Building mod.ff",
            BuildStep::WriteConfigs => "Writing configs",
        }
    }
}

/// Steps of each build mode, in execution order.
pub fn build_steps(mode: BuildMode) -> &'static [BuildStep] {
    use BuildStep::*;

    match mode {
        BuildMode::All => &[
            LoadPackages,
            BaseArchives,
            PackageArchives,
            StageBase,
            StagePackages,
            LinkBundle,
            WriteConfigs,
        ],
        BuildMode::BaseOnly => &[BaseArchives, StageBase, LinkBundle, WriteConfigs],
        BuildMode::BaseArchive => &[BaseArchives, WriteConfigs],
        BuildMode::BaseBundle => &[StageBase, LinkBundle, WriteConfigs],
        BuildMode::PackagesOnly => &[
            LoadPackages,
            PackageArchives,
            StageBase,
            StagePackages,
            LinkBundle,
            WriteConfigs,
        ],
        BuildMode::PackagesArchive => &[LoadPackages, PackageArchives, WriteConfigs],
        BuildMode::PackagesBundle => &[
            LoadPackages,
            StageBase,
            StagePackages,
            LinkBundle,
            WriteConfigs,
        ],
    }
}

/// What a finished build produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub packages: Vec<String>,
    pub archives: Vec<ArchiveReport>,
    /// Config names referenced from `autoexec.cfg`.
    pub configs: Vec<String>,
    pub staged_files: usize,
    pub bundle: Option<Utf8PathBuf>,
}

/// Runs the steps of `ctx.mode` against one linker.
pub struct Builder<'a, L: Linker> {
    ctx: &'a BuildContext,
    linker: &'a L,
    packages: Vec<PackageManifest>,
    summary: BuildSummary,
}

impl<'a, L: Linker> Builder<'a, L> {
    pub fn new(ctx: &'a BuildContext, linker: &'a L) -> Self {
        Self {
            ctx,
            linker,
            packages: Vec::new(),
            summary: BuildSummary::default(),
        }
    }

    pub fn run(mut self) -> Result<BuildSummary, CliError> {
        tracing::info!(
            "Building {:?} for {} (work dir {}, tools dir {})",
            self.ctx.mode,
            self.ctx.language.name(),
            self.ctx.work_dir,
            self.ctx.tools_dir
        );

        self.prepare()?;
        for step in build_steps(self.ctx.mode) {
            println!(
                "{} {}",
                "==>".bright_blue().bold(),
                step.title().bright_white().bold()
            );
            self.run_step(*step)?;
        }

        Ok(self.summary)
    }

    fn run_step(&mut self, step: BuildStep) -> Result<(), CliError> {
        match step {
            BuildStep::LoadPackages => self.load_packages(),
            BuildStep::BaseArchives => self.build_base_archives(),
            BuildStep::PackageArchives => self.build_package_archives(),
            BuildStep::StageBase => self.stage_base(),
            BuildStep::StagePackages => self.stage_packages(),
            BuildStep::LinkBundle => self.link_bundle(),
            BuildStep::WriteConfigs => self.write_configs(),
        }
    }

    /// Start from a clean release directory and fresh asset lists.
    fn prepare(&self) -> Result<(), CliError> {
        let ctx = self.ctx;
        if !ctx.base_dir.is_dir() {
            return Err(CliError::BaseDirNotFound {
                path: ctx.base_dir.clone(),
            });
        }

        for manifest in [
            ctx.layout.asset_list_path(),
            ctx.layout.ignored_asset_list_path(),
        ] {
            if manifest.is_file() {
                tracing::debug!("Removing stale {}", manifest);
                fs::remove_file(&manifest)?;
            }
        }

        if ctx.release_dir.exists() {
            fs::remove_dir_all(&ctx.release_dir)?;
        }
        fs::create_dir_all(&ctx.release_dir)?;
        Ok(())
    }

    fn load_packages(&mut self) -> Result<(), CliError> {
        self.packages = load_packages(&self.ctx.packages_list_path(), &self.ctx.work_dir)?;
        for package in &self.packages {
            println!("    Loaded package: \"{}\"", package.name.bright_cyan());
        }

        init_script::write(
            &self.packages,
            &init_script::init_script_path(&self.ctx.base_dir),
        )?;

        self.summary.packages = self.packages.iter().map(|p| p.name.clone()).collect();
        Ok(())
    }

    fn build_base_archives(&mut self) -> Result<(), CliError> {
        let base_dir = self.ctx.base_dir.clone();
        self.build_archive(BASE_MAIN_ARCHIVE, &base_dir, rules::BASE_MAIN_ASSETS)?;
        self.build_archive(BASE_SOUND_ARCHIVE, &base_dir, rules::BASE_SOUND_ASSETS)
    }

    fn build_package_archives(&mut self) -> Result<(), CliError> {
        let targets: Vec<(String, Utf8PathBuf)> = self
            .packages
            .iter()
            .map(|p| (p.archive_name.clone(), p.directory.clone()))
            .collect();

        for (name, dir) in targets {
            self.build_archive(&name, &dir, rules::PACKAGE_ASSETS)?;
        }
        Ok(())
    }

    fn build_archive(
        &mut self,
        name: &str,
        source_root: &Utf8Path,
        rules: &[rules::AssetRule],
    ) -> Result<(), CliError> {
        let path = self.ctx.release_path(&archive_file_name(name));
        let report = build_archive(&path, source_root, rules)?;
        println!(
            "    {} {} ({} files)",
            "Created".bright_green(),
            path.file_name().unwrap_or(name),
            report.entries_added
        );
        self.summary.archives.push(report);
        Ok(())
    }

    fn stage_base(&mut self) -> Result<(), CliError> {
        let source = BundleSource {
            name: "Base",
            dir: &self.ctx.base_dir,
            script_packing: self.ctx.pack_scripts,
        };
        let report = stage_bundle_sources(&source, &self.ctx.layout)?;
        self.summary.staged_files += report.assets.files_touched();
        Ok(())
    }

    fn stage_packages(&mut self) -> Result<(), CliError> {
        for package in &self.packages {
            let source = BundleSource {
                name: &package.name,
                dir: &package.directory,
                script_packing: package.effective_script_packing(self.ctx.pack_scripts),
            };
            let report = stage_bundle_sources(&source, &self.ctx.layout)?;
            if report.manifests.filtered_lines > 0 {
                println!(
                    "    Skipped ({}) assets of \"{}\"",
                    report.manifests.filtered_lines, package.name
                );
            }
            self.summary.staged_files += report.assets.files_touched();
        }
        Ok(())
    }

    fn link_bundle(&mut self) -> Result<(), CliError> {
        let output = self.linker.link(self.ctx)?;
        for line in output.stdout.lines() {
            println!("{}", line);
        }

        if !output.success() {
            return Err(CliError::LinkerFailed {
                exit_code: output.status_code,
            });
        }

        let linked = self.ctx.linked_bundle_path();
        if !linked.is_file() {
            return Err(CliError::BundleMissing { path: linked });
        }

        let target = self.ctx.release_path(BUNDLE_FILE_NAME);
        fs::copy(&linked, &target)?;
        tracing::info!("Copied {} to {}", linked, target);

        self.summary.bundle = Some(target);
        Ok(())
    }

    fn write_configs(&mut self) -> Result<(), CliError> {
        let mut sources = vec![(BASE_CONFIG_NAME.to_string(), self.ctx.base_dir.clone())];
        sources.extend(self.packages.iter().filter_map(|p| {
            p.config_name
                .as_ref()
                .map(|cfg| (cfg.clone(), p.directory.clone()))
        }));

        for (config_name, dir) in sources {
            if self.write_config(&config_name, &dir)? {
                self.summary.configs.push(config_name);
            }
        }
        Ok(())
    }

    /// Ship `dir/configs` and reference `config_name` from `autoexec.cfg`.
    ///
    /// Returns `false` when the config file does not exist.
    fn write_config(&self, config_name: &str, dir: &Utf8Path) -> Result<bool, CliError> {
        let configs_dir = dir.join(CONFIGS_DIR);
        let config_file = configs_dir.join(format!("{}.cfg", config_name));
        if !config_file.is_file() {
            println!(
                "    {} config file not found: {}",
                "Warning:".bright_yellow().bold(),
                config_file
            );
            tracing::warn!("Skipping missing config {}", config_file);
            return Ok(false);
        }

        copy_tree(
            &configs_dir,
            &self.ctx.release_path(CONFIGS_DIR),
            "*",
            &CopyMode::Overwrite,
        )?;

        let mut autoexec = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.ctx.release_path(AUTOEXEC_FILE_NAME))?;
        writeln!(autoexec, "exec {}\\{}.cfg", CONFIGS_DIR, config_name)?;

        tracing::info!("Referenced {} from {}", config_file, AUTOEXEC_FILE_NAME);
        Ok(true)
    }
}
