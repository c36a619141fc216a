// Rm command

use colored::*;
use std::fs;

use crate::error::{Result, ShellError};
use crate::shell::commands::builtins::common::{display, require_operand, resolve_path};
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;
use crate::shell::inverse;

/// `rm` and `del`.
pub struct RmCommand;
impl Executable for RmCommand {
    fn execute(&self, inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        let name = require_operand(inv, ctx, 0, "Please enter the filename to delete")?;
        let p = resolve_path(ctx, &name);

        if !p.exists() {
            if inv.flag("-f") {
                println!("{} Nothing to delete: {}", "ℹ".cyan(), name);
                return Ok(0);
            }
            return Err(ShellError::Precondition(format!("File '{}' not found.", name)));
        }
        if p.is_dir() {
            return Err(ShellError::Precondition(format!("'{}' is a directory (use rmdir)", name)));
        }

        if !inv.replay && !inv.flag("/q") {
            let question = format!("Are you sure you want to delete '{}'?", name);
            if !ctx.prompter.confirm(&question, false)? {
                return Err(ShellError::Cancelled("Deletion canceled.".to_string()));
            }
        }

        let prepared = if inv.replay {
            None
        } else {
            let backup = inverse::backup_removed_file(&p)?;
            Some(inverse::restore_file(&p, backup))
        };

        if let Err(e) = fs::remove_file(&p) {
            if let Some(prepared) = prepared {
                prepared.discard();
            }
            return Err(ShellError::io(format!("Failed to remove file: {}", name), e));
        }

        println!("{} Deleted file: {}", "✅".green(), display(&p));
        if let Some(prepared) = prepared {
            ctx.record(inv, prepared);
        }
        Ok(0)
    }
}
