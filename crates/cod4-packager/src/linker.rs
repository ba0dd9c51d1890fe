//! Invocation of the mod tools' fastfile linker.

use crate::context::{BuildContext, Language, BUNDLE_NAME};
use crate::errors::CliError;
use std::process::{Command, Stdio};

/// Captured result of one linker run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub status_code: Option<i32>,
    pub stdout: String,
}

impl LinkOutput {
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }
}

/// Compiles the staged assets into `zone/<Language>/mod.ff`.
pub trait Linker {
    fn link(&self, ctx: &BuildContext) -> Result<LinkOutput, CliError>;
}

pub fn linker_args(language: Language) -> Vec<String> {
    vec![
        "-language".to_string(),
        language.name().to_string(),
        "-compress".to_string(),
        "-cleanup".to_string(),
        BUNDLE_NAME.to_string(),
    ]
}

/// Runs the real linker executable from `<tools>/bin`.
#[derive(Debug, Default)]
pub struct ProcessLinker;

impl Linker for ProcessLinker {
    fn link(&self, ctx: &BuildContext) -> Result<LinkOutput, CliError> {
        let path = ctx.linker_path();
        let args = linker_args(ctx.language);
        tracing::info!("Running {} {}", path, args.join(" "));

        // `output` drains stdout before waiting on the child.
        let output = Command::new(&path)
            .args(&args)
            .current_dir(&ctx.bin_dir)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| CliError::LinkerSpawnFailed {
                path: path.clone(),
                source,
            })?;

        let status_code = output.status.code();
        tracing::info!("Linker exited with {:?}", status_code);

        Ok(LinkOutput {
            status_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}
