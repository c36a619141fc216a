// Move command

use colored::*;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{IoContext, Result, ShellError};
use crate::shell::commands::builtins::common::{copy_dir_recursive, display, resolve_path, usage};
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;
use crate::shell::inverse;

use super::{ensure_exists, ensure_free};

pub struct MoveCommand;
impl Executable for MoveCommand {
    fn execute(&self, inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        let [src, dst] = inv.operands.as_slice() else {
            return Err(usage(inv, ctx));
        };
        let src_path = resolve_path(ctx, src);
        let dst_path = resolve_path(ctx, dst);

        ensure_exists(&src_path, "Source")?;

        // Replayed inverses name the exact target
        let target = if inv.replay {
            dst_path
        } else {
            inverse::landing_path(&src_path, &dst_path)
        };
        ensure_free(&target, inv.replay)?;
        if target.starts_with(&src_path) {
            return Err(ShellError::Precondition(format!(
                "Cannot move '{}' into itself.",
                display(&src_path)
            )));
        }

        relocate(&src_path, &target)
            .with_io_context(|| format!("Failed to move {} to {}", src, display(&target)))?;

        println!("{} Moved '{}' to '{}'", "✅".green(), display(&src_path), display(&target));
        ctx.record(inv, inverse::move_back(&target, &src_path));
        Ok(0)
    }
}

/// Rename, falling back to copy-and-delete across filesystems.
fn relocate(src: &Path, target: &Path) -> io::Result<()> {
    match fs::rename(src, target) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => copy_across(src, target),
        other => other,
    }
}

/// A failed copy, or a file source that cannot be removed, leaves no trace
/// at `target`.
fn copy_across(src: &Path, target: &Path) -> io::Result<()> {
    if src.is_dir() {
        if let Err(e) = copy_dir_recursive(src, target) {
            inverse::remove_artifact(target).ok();
            return Err(e);
        }
        return fs::remove_dir_all(src);
    }

    fs::copy(src, target)
        .map(|_| ())
        .and_then(|()| fs::remove_file(src))
        .inspect_err(|_| {
            fs::remove_file(target).ok();
        })
}
