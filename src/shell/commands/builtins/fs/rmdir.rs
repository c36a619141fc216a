// Rmdir command

use colored::*;
use std::fs;

use crate::error::{Result, ShellError};
use crate::shell::commands::builtins::common::{display, require_operand, resolve_path};
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;
use crate::shell::inverse;

pub struct RmdirCommand;
impl Executable for RmdirCommand {
    fn execute(&self, inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        let name = require_operand(inv, ctx, 0, "Please enter the directory name to delete")?;
        let p = resolve_path(ctx, &name);
        if !p.is_dir() {
            return Err(ShellError::Precondition(format!("Directory '{}' not found.", name)));
        }

        if !inv.replay && !inv.flag("/q") {
            let question = format!("Are you sure you want to delete the directory '{}' and its contents?", name);
            if !ctx.prompter.confirm(&question, false)? {
                return Err(ShellError::Cancelled("Deletion canceled.".to_string()));
            }
        }

        let prepared = if inv.replay {
            None
        } else {
            let backup = inverse::backup_dir(&p)?;
            println!("{} Backup created: {}", "📂".cyan(), display(&backup));
            Some(inverse::restore_dir(&p, backup))
        };

        if let Err(e) = fs::remove_dir_all(&p) {
            if let Some(prepared) = prepared {
                prepared.discard();
            }
            return Err(ShellError::io(format!("Failed to remove directory: {}", name), e));
        }

        println!("{} Deleted directory: {}", "✅".green(), display(&p));
        if let Some(prepared) = prepared {
            ctx.record(inv, prepared);
        }
        Ok(0)
    }
}
