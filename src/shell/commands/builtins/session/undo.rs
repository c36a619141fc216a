// Undo command

use colored::*;
use log::info;

use crate::error::{Result, ShellError};
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;
use crate::shell::dispatcher::execute_line;

/// Pops the newest ledger entry and replays its inverse through the normal
/// dispatch path. A failed inverse is reported and not pushed back.
pub struct UndoCommand;
impl Executable for UndoCommand {
    fn execute(&self, _inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        let Some(entry) = ctx.ledger.pop() else {
            println!("{} Nothing to undo", "⚠".yellow());
            return Ok(0);
        };

        println!("{} Undoing: {}", "🔄".cyan(), entry.original.bold());
        info!("Undo '{}' via '{}'", entry.original, entry.inverse.command);

        let reason = match execute_line(&entry.inverse.command, ctx, true) {
            Ok(0) => None,
            Ok(code) => Some(format!("'{}' exited with code {}", entry.inverse.command, code)),
            Err(e) => Some(e.to_string()),
        };
        if let Some(reason) = reason {
            return Err(ShellError::Undo { original: entry.original, reason });
        }

        println!("{} {}", "✅".green(), entry.inverse.message);
        if let Some(backup) = &entry.backup {
            ctx.release_backup(backup);
        }
        Ok(0)
    }
}
