use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::shell::registry::CommandRegistry;

/// Tab completion: command names for the first word, directory entries after.
pub struct ShellHelper {
    names: Vec<String>,
    cwd: Arc<RwLock<PathBuf>>,
}

impl ShellHelper {
    /// `cwd` is shared with the read loop, which updates it after `cd`.
    pub fn new(registry: &CommandRegistry, cwd: Arc<RwLock<PathBuf>>) -> Self {
        Self { names: registry.names().map(str::to_string).collect(), cwd }
    }
}

/// Start offset of the word under the cursor and its candidates.
pub fn complete_line(line: &str, pos: usize, names: &[String], cwd: &Path) -> (usize, Vec<String>) {
    let before = &line[..pos];
    let start = before.rfind(char::is_whitespace).map(|i| i + 1).unwrap_or(0);
    let word = &before[start..];

    if before[..start].trim().is_empty() {
        let commands = names.iter().filter(|n| n.starts_with(word)).cloned().collect();
        return (start, commands);
    }

    let split = word.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    let (dir_part, prefix) = word.split_at(split);
    let dir = if dir_part.is_empty() { cwd.to_path_buf() } else { cwd.join(dir_part) };

    let mut entries: Vec<String> = fs::read_dir(&dir)
        .into_iter()
        .flatten()
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(prefix) {
                return None;
            }
            let suffix = if entry.path().is_dir() { "/" } else { "" };
            Some(format!("{}{}{}", dir_part, name, suffix))
        })
        .collect();
    entries.sort();
    (start, entries)
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let cwd = self
            .cwd
            .read()
            .map(|p| p.clone())
            .unwrap_or_else(|_| PathBuf::from("."));
        let (start, candidates) = complete_line(line, pos, &self.names, &cwd);
        let pairs = candidates
            .into_iter()
            .map(|c| Pair { display: c.clone(), replacement: c })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}
