//! Interactive selection of build mode and language.

use crate::context::{BuildMode, Language};
use crate::errors::CliError;
use colored::Colorize;
use inquire::{InquireError, Text};
use std::io::{BufRead, Write};

pub const INVALID_CHOICE_MESSAGE: &str = "Please enter valid value.";

/// Source of menu answers.
pub trait MenuInput {
    /// Ask for one answer. `Ok(None)` means input was closed or cancelled.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>, CliError>;

    fn notify(&mut self, message: &str);
}

/// Terminal prompts through `inquire`.
#[derive(Debug, Default)]
pub struct InquireMenu;

impl MenuInput for InquireMenu {
    fn ask(&mut self, prompt: &str) -> Result<Option<String>, CliError> {
        match Text::new(prompt).prompt() {
            Ok(answer) => Ok(Some(answer)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
            Err(source) => Err(CliError::Prompt { source }),
        }
    }

    fn notify(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Plain line-based prompts, used when stdin is not a terminal.
pub struct LineMenu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineMenu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> MenuInput for LineMenu<R, W> {
    fn ask(&mut self, prompt: &str) -> Result<Option<String>, CliError> {
        write!(self.output, "{} ", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn notify(&mut self, message: &str) {
        let _ = writeln!(self.output, "{}", message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuState {
    SelectMode,
    SelectLanguage(BuildMode),
    Build(BuildMode, Language),
    Shutdown,
}

enum Choice {
    Exit,
    Selected(u8),
    Invalid,
}

fn parse_choice(answer: &str, max: u8) -> Choice {
    match answer.trim().parse::<u8>() {
        Ok(0) => Choice::Exit,
        Ok(n) if n <= max => Choice::Selected(n),
        _ => Choice::Invalid,
    }
}

fn mode_menu() -> String {
    let mut text = format!("{}\n", "Select build mode:".bright_white().bold());
    for mode in BuildMode::ALL {
        text.push_str(&format!("  {}. {}\n", mode.choice(), mode.description()));
    }
    text.push_str("  0. Exit");
    text
}

fn language_menu() -> String {
    let mut text = format!("{}\n", "Select language:".bright_white().bold());
    for language in Language::ALL {
        text.push_str(&format!("  {}. {}\n", language.choice(), language.name()));
    }
    text.push_str("  0. Back");
    text
}

/// Run the menu until a mode and language are chosen.
///
/// Preselected values skip their prompt once; choosing "back" from the
/// language prompt always shows the mode prompt. Returns `None` when the user
/// exits.
pub fn select(
    input: &mut dyn MenuInput,
    mut preset_mode: Option<BuildMode>,
    mut preset_language: Option<Language>,
) -> Result<Option<(BuildMode, Language)>, CliError> {
    let mut state = MenuState::SelectMode;

    loop {
        state = match state {
            MenuState::SelectMode => match preset_mode.take() {
                Some(mode) => MenuState::SelectLanguage(mode),
                None => {
                    input.notify(&mode_menu());
                    match input.ask("Build mode:")? {
                        None => MenuState::Shutdown,
                        Some(answer) => match parse_choice(&answer, BuildMode::ALL.len() as u8) {
                            Choice::Exit => MenuState::Shutdown,
                            Choice::Selected(n) => BuildMode::from_choice(n)
                                .map(MenuState::SelectLanguage)
                                .unwrap_or(MenuState::SelectMode),
                            Choice::Invalid => {
                                input.notify(INVALID_CHOICE_MESSAGE);
                                MenuState::SelectMode
                            }
                        },
                    }
                }
            },
            MenuState::SelectLanguage(mode) => match preset_language.take() {
                Some(language) => MenuState::Build(mode, language),
                None => {
                    input.notify(&language_menu());
                    match input.ask("Language:")? {
                        None => MenuState::Shutdown,
                        Some(answer) => match parse_choice(&answer, Language::ALL.len() as u8) {
                            Choice::Exit => MenuState::SelectMode,
                            Choice::Selected(n) => Language::from_choice(n)
                                .map(|language| MenuState::Build(mode, language))
                                .unwrap_or(MenuState::SelectLanguage(mode)),
                            Choice::Invalid => {
                                input.notify(INVALID_CHOICE_MESSAGE);
                                MenuState::SelectLanguage(mode)
                            }
                        },
                    }
                }
            },
            MenuState::Build(mode, language) => return Ok(Some((mode, language))),
            MenuState::Shutdown => return Ok(None),
        };
    }
}
