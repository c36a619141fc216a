// Rename command

use colored::*;
use std::fs;

use crate::error::{IoContext, Result};
use crate::shell::commands::builtins::common::{display, resolve_path, usage};
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;
use crate::shell::inverse;

use super::{ensure_exists, ensure_free};

pub struct RenameCommand;
impl Executable for RenameCommand {
    fn execute(&self, inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        let [old, new] = inv.operands.as_slice() else {
            return Err(usage(inv, ctx));
        };
        let old_path = resolve_path(ctx, old);
        let new_path = resolve_path(ctx, new);

        ensure_exists(&old_path, "File or directory")?;
        ensure_free(&new_path, inv.replay)?;

        fs::rename(&old_path, &new_path)
            .with_io_context(|| format!("Failed to rename {} to {}", old, new))?;

        println!("{} Renamed: {} -> {}", "✅".green(), display(&old_path), display(&new_path));
        ctx.record(inv, inverse::rename_back(&new_path, &old_path));
        Ok(0)
    }
}
