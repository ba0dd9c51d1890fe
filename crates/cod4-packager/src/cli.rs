//! Command line parsing.
//!
//! The builder has always been started as `builder.exe -workdir <path>
//! -toolsdir <path> -packgsc false`. Those single-dash spellings are rewritten
//! into clap long flags before parsing, and anything unknown is dropped so that
//! old launch scripts keep working.

use crate::context::{BuildMode, Language};
use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::{ColorChoice, CommandFactory, FromArgMatches, Parser};

#[derive(Parser, Debug, Default, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Mod directory containing _Base, packages.txt and the _Package.<id> folders
    #[arg(long = "workdir", value_name = "PATH")]
    pub work_dir: Option<Utf8PathBuf>,

    /// CoD4 mod tools root (defaults to two levels above the work directory)
    #[arg(long = "toolsdir", value_name = "PATH")]
    pub tools_dir: Option<Utf8PathBuf>,

    /// Compile scripts into mod.ff (true) or ship them loose (false)
    #[arg(long = "packgsc", value_name = "BOOL")]
    pub packgsc: Option<String>,

    /// Build mode (1-7), skips the mode prompt
    #[arg(long, value_parser = parse_build_mode)]
    pub mode: Option<BuildMode>,

    /// Target language name or number (1-7), skips the language prompt
    #[arg(long, value_parser = parse_language)]
    pub lang: Option<Language>,

    /// Log every build step
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_build_mode(value: &str) -> Result<BuildMode, String> {
    value
        .trim()
        .parse::<u8>()
        .ok()
        .and_then(BuildMode::from_choice)
        .ok_or_else(|| format!("'{}' is not a build mode (expected 1-7)", value))
}

fn parse_language(value: &str) -> Result<Language, String> {
    Language::parse(value).ok_or_else(|| {
        let names: Vec<&str> = Language::ALL.iter().map(|l| l.name()).collect();
        format!(
            "'{}' is not a language (expected 1-7 or one of {})",
            value,
            names.join(", ")
        )
    })
}

/// Raw arguments rewritten for clap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedArgs {
    pub args: Vec<String>,
    /// Arguments that were dropped, reported once logging is up.
    pub ignored: Vec<String>,
}

struct KnownFlag {
    long: String,
    short: Option<char>,
    takes_value: bool,
}

fn known_flags() -> Vec<KnownFlag> {
    let mut flags: Vec<KnownFlag> = Args::command()
        .get_arguments()
        .filter_map(|arg| {
            arg.get_long().map(|long| KnownFlag {
                long: long.to_string(),
                short: arg.get_short(),
                takes_value: arg.get_action().takes_values(),
            })
        })
        .collect();

    for (long, short) in [("help", 'h'), ("version", 'V')] {
        flags.push(KnownFlag {
            long: long.to_string(),
            short: Some(short),
            takes_value: false,
        });
    }
    flags
}

/// Rewrite `raw` (program name first) into arguments clap accepts.
///
/// Long flags match case-insensitively with one or two dashes and an optional
/// `=value`. Values are always attached with `=` so that values starting with
/// a dash survive.
pub fn normalize_args<I>(raw: I) -> NormalizedArgs
where
    I: IntoIterator<Item = String>,
{
    let flags = known_flags();
    let mut raw = raw.into_iter();
    let mut normalized = NormalizedArgs::default();

    if let Some(program) = raw.next() {
        normalized.args.push(program);
    }

    while let Some(arg) = raw.next() {
        let Some(stripped) = arg.strip_prefix('-') else {
            normalized.ignored.push(arg);
            continue;
        };

        // Short flags are case-sensitive (-v vs -V).
        if stripped.chars().count() == 1 {
            let short = stripped.chars().next();
            if let Some(flag) = flags.iter().find(|f| f.short.is_some() && f.short == short) {
                if !flag.takes_value {
                    normalized.args.push(arg);
                    continue;
                }
            }
        }

        let stripped = stripped.strip_prefix('-').unwrap_or(stripped);
        let (name, inline_value) = match stripped.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (stripped, None),
        };

        let Some(flag) = flags.iter().find(|f| f.long.eq_ignore_ascii_case(name)) else {
            normalized.ignored.push(arg);
            continue;
        };

        if !flag.takes_value {
            normalized.args.push(format!("--{}", flag.long));
            continue;
        }

        match inline_value.or_else(|| raw.next()) {
            Some(value) => normalized.args.push(format!("--{}={}", flag.long, value)),
            None => normalized.ignored.push(arg),
        }
    }

    normalized
}

/// Parse normalized arguments, exiting with clap's usage error on bad values.
pub fn parse_args(args: Vec<String>) -> Args {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches_from(args);

    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}
