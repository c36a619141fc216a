use chrono::{DateTime, Local};
use std::path::PathBuf;

/// A command line that reverses a completed command, plus what to tell the
/// user once it has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inverse {
    pub command: String,
    pub message: String,
}

impl Inverse {
    /// Tokens are quoted so paths with spaces survive the trip back through
    /// the lexer.
    pub fn new<I, S>(tokens: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { command: shell_words::join(tokens), message: message.into() }
    }
}

#[derive(Debug, Clone)]
pub struct UndoEntry {
    pub original: String,
    pub inverse: Inverse,
    /// Backup the inverse reads from, if any.
    pub backup: Option<PathBuf>,
    pub recorded_at: DateTime<Local>,
}

impl UndoEntry {
    pub fn new(original: impl Into<String>, inverse: Inverse, backup: Option<PathBuf>) -> Self {
        Self { original: original.into(), inverse, backup, recorded_at: Local::now() }
    }
}

/// Session-scoped LIFO of completed, reversible commands.
#[derive(Debug, Default)]
pub struct UndoLedger {
    entries: Vec<UndoEntry>,
}

impl UndoLedger {
    pub fn push(&mut self, entry: UndoEntry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<&UndoEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &UndoEntry> {
        self.entries.iter().rev()
    }

    /// Empties the ledger, handing back the backups it referenced.
    pub fn drain_backups(&mut self) -> Vec<PathBuf> {
        self.entries.drain(..).filter_map(|e| e.backup).collect()
    }
}
