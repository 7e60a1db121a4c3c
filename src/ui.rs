// UI layer: every prompt, notice and spinner goes through the `Console`
// trait. `TerminalConsole` implements it with `dialoguer` prompts and an
// `indicatif` spinner; tests drive the same code with scripted answers.
//
// Backing out of a prompt (Esc / q) surfaces as `Error::Cancelled`, which
// callers propagate with `?` until someone decides what cancelling means.

use std::io::{self, IsTerminal};
use std::time::Duration;

use crossterm::style::Stylize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warn,
    Error,
}

pub trait Console {
    /// Whether prompts can be shown at all (a terminal is attached).
    fn is_interactive(&self) -> bool;

    /// Pick one item; returns its index.
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize>;

    /// Pick any number of items; returns their indices in display order.
    fn multi_select(&mut self, prompt: &str, items: &[String]) -> Result<Vec<usize>>;

    /// Free text. May return an empty string.
    fn text(&mut self, prompt: &str, hint: &str) -> Result<String>;

    /// Hidden input, for tokens.
    fn secret(&mut self, prompt: &str) -> Result<String>;

    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    fn notify(&mut self, level: Level, message: &str);

    fn start_progress(&mut self, message: &str);

    fn finish_progress(&mut self, message: &str);
}

/// Real terminal console.
pub struct TerminalConsole {
    theme: ColorfulTheme,
    spinner: Option<ProgressBar>,
}

impl Default for TerminalConsole {
    fn default() -> Self {
        TerminalConsole {
            theme: ColorfulTheme::default(),
            spinner: None,
        }
    }
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self::default()
    }
}

/// `None` from an `interact_opt` call means the user backed out.
fn answered<T>(value: io::Result<Option<T>>) -> Result<T> {
    value?.ok_or(Error::Cancelled)
}

/// Ctrl-C while reading text shows up as an interrupted read.
fn typed(value: io::Result<String>) -> Result<String> {
    match value {
        Ok(text) => Ok(text.trim().to_string()),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(Error::Cancelled),
        Err(e) => Err(e.into()),
    }
}

impl Console for TerminalConsole {
    fn is_interactive(&self) -> bool {
        io::stdin().is_terminal() && io::stdout().is_terminal()
    }

    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize> {
        // `Select` shows a keyboard-navigable list in the terminal.
        answered(
            Select::with_theme(&self.theme)
                .with_prompt(prompt)
                .items(items)
                .default(0)
                .interact_opt(),
        )
    }

    fn multi_select(&mut self, prompt: &str, items: &[String]) -> Result<Vec<usize>> {
        answered(
            MultiSelect::with_theme(&self.theme)
                .with_prompt(format!("{prompt} (space to toggle, enter to confirm)"))
                .items(items)
                .interact_opt(),
        )
    }

    fn text(&mut self, prompt: &str, hint: &str) -> Result<String> {
        let prompt = if hint.is_empty() {
            prompt.to_string()
        } else {
            format!("{prompt} {}", format!("({hint})").dim())
        };
        typed(
            Input::<String>::with_theme(&self.theme)
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text(),
        )
    }

    fn secret(&mut self, prompt: &str) -> Result<String> {
        // `Password` hides input in terminal.
        typed(
            Password::with_theme(&self.theme)
                .with_prompt(prompt)
                .allow_empty_password(true)
                .interact(),
        )
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        answered(
            Confirm::with_theme(&self.theme)
                .with_prompt(prompt)
                .default(true)
                .interact_opt(),
        )
    }

    fn notify(&mut self, level: Level, message: &str) {
        match level {
            Level::Info => println!("{} {}", "●".cyan(), message),
            Level::Success => println!("{} {}", "✔".green(), message),
            Level::Warn => eprintln!("{} {}", "▲".yellow(), message.yellow()),
            Level::Error => eprintln!("{} {}", "■".red(), message.red()),
        }
    }

    fn start_progress(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    fn finish_progress(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        if !message.is_empty() {
            println!("{}", message);
        }
    }
}
