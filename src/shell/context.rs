use chrono::{DateTime, Local};
use log::{debug, warn};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{BackupRetention, ShellSettings};
use crate::services::assistant::{Assistant, OfflineAssistant};
use crate::services::users::UserRegistry;
use crate::shell::commands::Invocation;
use crate::shell::inverse::{PreparedInverse, remove_artifact};
use crate::shell::prompter::Prompter;
use crate::shell::registry::CommandRegistry;
use crate::shell::undo::{UndoEntry, UndoLedger};

/// Lines typed this session, oldest first, capped at the configured limit.
#[derive(Debug, Default)]
pub struct SessionHistory {
    lines: VecDeque<(DateTime<Local>, String)>,
    limit: usize,
}

impl SessionHistory {
    pub fn new(limit: usize) -> Self {
        Self { lines: VecDeque::new(), limit }
    }

    pub fn push(&mut self, line: &str) {
        if self.limit == 0 {
            return;
        }
        if self.lines.len() == self.limit {
            self.lines.pop_front();
        }
        self.lines.push_back((Local::now(), line.to_string()));
    }

    pub fn entries(&self) -> impl Iterator<Item = &(DateTime<Local>, String)> {
        self.lines.iter()
    }

    /// The last `n` lines, oldest first.
    pub fn recent(&self, n: usize) -> Vec<String> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).map(|(_, l)| l.clone()).collect()
    }
}

pub struct ShellContext {
    pub cwd: PathBuf,
    pub env: HashMap<String, String>,
    pub exit_code: i32,
    pub exit_requested: bool,
    pub registry: Arc<CommandRegistry>,
    pub ledger: UndoLedger,
    pub history: SessionHistory,
    pub settings: ShellSettings,
    pub prompter: Box<dyn Prompter>,
    pub assistant: Box<dyn Assistant>,
    pub users: Option<Box<dyn UserRegistry>>,
}

impl ShellContext {
    pub fn new(settings: ShellSettings, prompter: Box<dyn Prompter>) -> Self {
        let env: HashMap<String, String> = std::env::vars().collect();
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            cwd,
            env,
            exit_code: 0,
            exit_requested: false,
            registry: Arc::new(CommandRegistry::standard()),
            ledger: UndoLedger::default(),
            history: SessionHistory::new(settings.history_limit),
            settings,
            prompter,
            assistant: Box::new(OfflineAssistant),
            users: None,
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn with_env(mut self, vars: &HashMap<String, String>) -> Self {
        self.env.extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn with_assistant(mut self, assistant: Box<dyn Assistant>) -> Self {
        self.assistant = assistant;
        self
    }

    pub fn with_users(mut self, users: Box<dyn UserRegistry>) -> Self {
        self.users = Some(users);
        self
    }

    /// Push the inverse of a completed command. Replayed inverses are never
    /// recorded.
    pub fn record(&mut self, inv: &Invocation, prepared: PreparedInverse) {
        if inv.replay {
            prepared.discard();
            return;
        }
        debug!("Recorded '{}' -> '{}'", inv.line, prepared.inverse.command);
        self.ledger
            .push(UndoEntry::new(inv.line.clone(), prepared.inverse, prepared.backup));
    }

    /// A backup has been consumed by undo.
    pub fn release_backup(&self, backup: &Path) {
        if self.settings.backup_retention != BackupRetention::Session {
            return;
        }
        match remove_artifact(backup) {
            Ok(()) => debug!("Removed backup {}", backup.display()),
            Err(e) => warn!("Could not remove backup {}: {}", backup.display(), e),
        }
    }

    /// Delete every backup still referenced by the ledger. Called on exit;
    /// the ledger is empty afterwards.
    pub fn purge_backups(&mut self) {
        if self.settings.backup_retention != BackupRetention::Session {
            return;
        }
        for backup in self.ledger.drain_backups() {
            self.release_backup(&backup);
        }
    }
}
