// Ls command

use colored::*;
use std::fs;

use crate::error::{IoContext, Result, ShellError};
use crate::shell::commands::builtins::common::resolve_path;
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;

pub struct LsCommand;
impl Executable for LsCommand {
    fn execute(&self, inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        let path_str = inv.operands.first().map(String::as_str).unwrap_or(".");

        let path = resolve_path(ctx, path_str);
        if !path.is_dir() {
            return Err(ShellError::Precondition(format!("{}: {}: No such directory", inv.name, path_str)));
        }
        let entries = fs::read_dir(&path)
            .with_io_context(|| format!("Failed to read directory: {}", path_str))?;

        let mut listing: Vec<(String, bool)> = Vec::new();
        for entry in entries {
            let entry = entry.with_io_context(|| format!("Failed to read directory: {}", path_str))?;
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            listing.push((entry.file_name().to_string_lossy().into_owned(), is_dir));
        }
        listing.sort();

        println!("{}", "📁 Files & Directories:".bold());
        for (name, is_dir) in listing {
            if is_dir {
                println!("  - {}", format!("{}/", name).blue().bold());
            } else {
                println!("  - {}", name);
            }
        }
        Ok(0)
    }
}
