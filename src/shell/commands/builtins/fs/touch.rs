// Touch command

use colored::*;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::error::{IoContext, Result, ShellError};
use crate::shell::commands::builtins::common::{display, require_operand, resolve_path};
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;
use crate::shell::inverse;

pub struct TouchCommand;
impl Executable for TouchCommand {
    fn execute(&self, inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        let name = require_operand(inv, ctx, 0, "Please enter the filename to create")?;
        let mut path = resolve_path(ctx, &name);

        if path.exists() {
            if inv.replay {
                return Err(ShellError::Precondition(format!("File '{}' already exists.", display(&path))));
            }
            let choice = ctx.prompter.choose(
                &format!("File '{}' already exists. What do you want to do?", name),
                &["cancel", "new"],
                "cancel",
            )?;
            if choice != "new" {
                return Err(ShellError::Cancelled("Operation canceled.".to_string()));
            }
            path = next_free_name(&path);
            println!("{} Creating new file as '{}' instead.", "📄".cyan(), display(&path));
        }

        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_io_context(|| format!("Failed to create file: {}", display(&path)))?;

        println!("{} Created file: {}", "✅".green(), display(&path));
        ctx.record(inv, inverse::remove_file(&path));
        Ok(0)
    }
}

/// `name_1.ext`, `name_2.ext`, … next to `path`.
fn next_free_name(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (1..)
        .map(|i| path.with_file_name(format!("{}_{}{}", stem, i, ext)))
        .find(|p| !p.exists())
        .unwrap_or_else(|| path.to_path_buf())
}
