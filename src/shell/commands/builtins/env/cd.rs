// Cd command

use colored::*;

use crate::error::{Result, ShellError};
use crate::shell::commands::builtins::common::{display, resolve_path};
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;
use crate::shell::inverse;

pub struct CdCommand;
impl Executable for CdCommand {
    fn execute(&self, inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        let home = ctx
            .env
            .get("HOME")
            .or_else(|| ctx.env.get("USERPROFILE"))
            .cloned()
            .unwrap_or_else(|| "/".to_string());
        let path_str = inv.operands.first().cloned().unwrap_or(home);

        let new_path = resolve_path(ctx, &path_str);
        if !new_path.is_dir() {
            return Err(ShellError::Precondition(format!("cd: no such file or directory: {}", path_str)));
        }

        let previous = std::mem::replace(&mut ctx.cwd, new_path);
        if !inv.replay {
            println!("{} Current directory: {}", "📂".cyan(), display(&ctx.cwd));
        }
        ctx.record(inv, inverse::change_dir(&previous));
        Ok(0)
    }
}
