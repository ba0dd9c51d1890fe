use build::{BuildSummary, Builder};
use colored::Colorize;
use config::Settings;
use context::BuildContext;
use errors::{BuildResult, CliError};
use linker::ProcessLinker;
use menu::{InquireMenu, LineMenu, MenuInput};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

mod build;
mod cli;
mod config;
mod context;
mod errors;
mod linker;
mod menu;
mod utils;

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

fn print_banner(settings: &Settings) {
    println!("{}", utils::rule_line());
    println!(
        " {} {}",
        "Working directory:".bright_white(),
        settings.work_dir
    );
    println!(" {} {}", "Tools directory:".bright_white(), settings.tools_dir);
    println!(
        " {} {}",
        "Pack scripts:".bright_white(),
        settings.pack_scripts
    );
    println!("{}", utils::rule_line());
}

fn run(args: cli::Args) -> Result<Option<BuildSummary>, CliError> {
    let cwd = config::current_dir()?;
    let app_config = config::load_config();
    let settings = Settings::resolve(&args, &app_config, &cwd);

    print_banner(&settings);
    settings.validate()?;

    let mut input: Box<dyn MenuInput> = if io::stdin().is_terminal() {
        Box::new(InquireMenu)
    } else {
        Box::new(LineMenu::new(io::stdin().lock(), io::stdout()))
    };

    let Some((mode, language)) = menu::select(input.as_mut(), args.mode, args.lang)? else {
        return Ok(None);
    };

    println!(
        "{} {} ({})",
        "📦 Building:".bright_blue().bold(),
        mode.description().bright_cyan().bold(),
        language.name()
    );

    let ctx = BuildContext::new(&settings, mode, language);
    Builder::new(&ctx, &ProcessLinker).run().map(Some)
}

fn print_summary(summary: &BuildSummary) {
    let mut lines = Vec::new();
    if !summary.packages.is_empty() {
        lines.push(format!(
            "{} {}",
            "Packages:".bright_white(),
            summary.packages.join(", ")
        ));
    }
    for archive in &summary.archives {
        lines.push(format!(
            "{} {} ({} files)",
            "Archive:".bright_white(),
            archive.archive_path,
            archive.entries_added
        ));
    }
    if summary.staged_files > 0 {
        lines.push(format!(
            "{} {}",
            "Staged files:".bright_white(),
            summary.staged_files
        ));
    }
    if let Some(bundle) = &summary.bundle {
        lines.push(format!("{} {}", "Bundle:".bright_white(), bundle));
    }
    if !summary.configs.is_empty() {
        lines.push(format!(
            "{} {}",
            "Configs:".bright_white(),
            summary.configs.join(", ")
        ));
    }

    if !lines.is_empty() {
        utils::print_ansi_boxed_lines(&lines);
    }
}

fn finish(result: BuildResult) -> ExitCode {
    println!("{}", utils::rule_line());
    let label = format!("\"{}\"", result);
    let label = if result == BuildResult::Successful {
        label.bright_green().bold()
    } else {
        label.bright_red().bold()
    };
    println!(" Building finished with result: {}.", label);
    ExitCode::from(result.exit_code())
}

fn main() -> ExitCode {
    let normalized =
        cli::normalize_args(std::env::args_os().map(|a| a.to_string_lossy().into_owned()));
    let args = cli::parse_args(normalized.args);

    init_logging(args.verbose);
    for ignored in &normalized.ignored {
        tracing::warn!("Ignoring unknown argument '{}'", ignored);
    }

    match run(args) {
        Ok(Some(summary)) => {
            print_summary(&summary);
            finish(BuildResult::Successful)
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(err) => {
            let result = err.build_result();
            eprintln!("{:?}", miette::Report::new(err));
            finish(result)
        }
    }
}
