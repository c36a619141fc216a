use colored::*;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::error::{Result, ShellError};

/// Every question the shell asks goes through here, so sessions can be
/// driven by a script or run unattended. Ctrl-C while a question is open
/// aborts the invocation with `Cancelled`.
pub trait Prompter: Send {
    /// Yes/no question. Empty input takes `default`.
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;

    /// Pick one of `choices`. Empty input takes `default`.
    fn choose(&mut self, question: &str, choices: &[&str], default: &str) -> Result<String>;

    /// Free text. Returns the trimmed answer, possibly empty.
    fn ask(&mut self, question: &str) -> Result<String>;
}

fn interrupted() -> ShellError {
    ShellError::Cancelled("Interrupted.".to_string())
}

/// Reads answers from the terminal.
pub struct ConsolePrompter;

impl ConsolePrompter {
    /// `None` on EOF.
    fn read_answer(prompt: &str) -> Result<Option<String>> {
        let mut editor = DefaultEditor::new()
            .map_err(|e| ShellError::io("Failed to open the terminal", std::io::Error::other(e)))?;
        match editor.readline(prompt) {
            Ok(line) => Ok(Some(line.trim().to_string())),
            Err(ReadlineError::Interrupted) => Err(interrupted()),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(ShellError::io("Failed to read answer", std::io::Error::other(e))),
        }
    }
}

impl Prompter for ConsolePrompter {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        let prompt = format!("{} {} ", question.yellow(), format!("[{}]", hint).dimmed());
        loop {
            let Some(answer) = Self::read_answer(&prompt)? else {
                return Ok(default);
            };
            match answer.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => println!("Please answer 'y' or 'n'."),
            }
        }
    }

    fn choose(&mut self, question: &str, choices: &[&str], default: &str) -> Result<String> {
        let listing = format!("[{}] ({})", choices.join("/"), default);
        let prompt = format!("{} {} ", question.yellow(), listing.dimmed());
        loop {
            let Some(answer) = Self::read_answer(&prompt)? else {
                return Ok(default.to_string());
            };
            if answer.is_empty() {
                return Ok(default.to_string());
            }
            if let Some(c) = choices.iter().find(|c| c.eq_ignore_ascii_case(&answer)) {
                return Ok(c.to_string());
            }
            println!("Please select one of the available options");
        }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        Ok(Self::read_answer(&format!("{}: ", question.yellow()))?.unwrap_or_default())
    }
}

/// Non-interactive answers for `--yes` and one-shot runs.
pub struct AssumePrompter {
    pub yes: bool,
}

impl Prompter for AssumePrompter {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let answer = if self.yes { true } else { default };
        log::debug!("Assumed '{}' for: {}", if answer { "yes" } else { "no" }, question);
        Ok(answer)
    }

    fn choose(&mut self, _question: &str, _choices: &[&str], default: &str) -> Result<String> {
        Ok(default.to_string())
    }

    fn ask(&mut self, _question: &str) -> Result<String> {
        Ok(String::new())
    }
}

#[cfg(test)]
pub use scripted::ScriptedPrompter;
