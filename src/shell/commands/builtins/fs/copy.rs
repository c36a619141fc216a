// Copy command

use colored::*;
use std::fs;

use crate::error::{IoContext, Result, ShellError};
use crate::shell::commands::builtins::common::{display, resolve_path, usage};
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;
use crate::shell::inverse;

use super::{ensure_exists, ensure_free};

pub struct CopyCommand;
impl Executable for CopyCommand {
    fn execute(&self, inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        let [src, dst] = inv.operands.as_slice() else {
            return Err(usage(inv, ctx));
        };
        let src_path = resolve_path(ctx, src);
        let dst_path = resolve_path(ctx, dst);

        ensure_exists(&src_path, "Source file")?;
        if src_path.is_dir() {
            return Err(ShellError::Precondition(format!(
                "Omitting directory '{}' (copy works on files)",
                src
            )));
        }

        // Replayed inverses name the exact target
        let target = if inv.replay {
            dst_path
        } else {
            inverse::landing_path(&src_path, &dst_path)
        };
        ensure_free(&target, inv.replay)?;

        fs::copy(&src_path, &target)
            .with_io_context(|| format!("Failed to copy {} to {}", src, display(&target)))?;

        println!("{} Copied '{}' to '{}'", "✅".green(), display(&src_path), display(&target));
        ctx.record(inv, inverse::remove_file(&target));
        Ok(0)
    }
}
