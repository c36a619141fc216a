// Mkdir command

use colored::*;
use std::fs;

use crate::error::{IoContext, Result, ShellError};
use crate::shell::commands::builtins::common::{display, require_operand, resolve_path, usage};
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;
use crate::shell::inverse;

pub struct MkdirCommand;
impl Executable for MkdirCommand {
    fn execute(&self, inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        if inv.operands.len() > 1 {
            return Err(usage(inv, ctx));
        }
        let parents = inv.flag("-p");
        let name = require_operand(inv, ctx, 0, "Please enter the directory name to create")?;

        let p = resolve_path(ctx, &name);
        if p.exists() {
            return Err(ShellError::Precondition(format!("Directory '{}' already exists.", name)));
        }
        let created = inverse::topmost_missing(&p);

        if parents {
            fs::create_dir_all(&p)
                .with_io_context(|| format!("Failed to create directory (with parents): {}", name))?;
        } else {
            fs::create_dir(&p).with_io_context(|| format!("Failed to create directory: {}", name))?;
        }

        println!("{} Created directory: {}", "✅".green(), display(&p));
        ctx.record(inv, inverse::remove_dir(&created));
        Ok(0)
    }
}
