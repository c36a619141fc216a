// Append command

use colored::*;
use std::fs::OpenOptions;
use std::io::Write;

use crate::error::{Result, ShellError};
use crate::shell::commands::builtins::common::{display, resolve_path, usage};
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;
use crate::shell::inverse;

pub struct AppendCommand;
impl Executable for AppendCommand {
    fn execute(&self, inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        let Some((file, words)) = inv.operands.split_first() else {
            return Err(usage(inv, ctx));
        };
        if words.is_empty() {
            return Err(usage(inv, ctx));
        }
        let text = words.join(" ");
        let path = resolve_path(ctx, file);
        if !path.is_file() {
            return Err(ShellError::Precondition(format!("File '{}' not found.", file)));
        }

        let prepared = if inv.replay {
            None
        } else {
            let backup = inverse::backup_appended_file(&path)?;
            Some(inverse::restore_appended(&path, backup))
        };

        let written = OpenOptions::new()
            .append(true)
            .open(&path)
            .and_then(|mut f| writeln!(f, "{}", text));
        if let Err(e) = written {
            if let Some(prepared) = prepared {
                prepared.discard();
            }
            return Err(ShellError::io(format!("Failed to append to {}", file), e));
        }

        println!("{} Appended to file: {}", "✅".green(), display(&path));
        if let Some(prepared) = prepared {
            ctx.record(inv, prepared);
        }
        Ok(0)
    }
}
