// Help command

use colored::*;
use std::sync::Arc;

use crate::error::{Result, ShellError};
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;

pub struct HelpCommand;
impl Executable for HelpCommand {
    fn execute(&self, inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        let registry = Arc::clone(&ctx.registry);

        if let Some(name) = inv.operands.first() {
            return match registry.lookup(name) {
                Some(desc) => {
                    desc.print_help();
                    Ok(0)
                }
                None => Err(ShellError::Precondition(format!("No help available for '{}'", name))),
            };
        }

        let max_len = registry.names().map(str::len).max().unwrap_or(0);
        println!("{}", "Available commands:".bold());
        for desc in registry.descriptors() {
            let padding = " ".repeat(max_len - desc.name.len() + 2);
            println!("  {}{}{}", desc.name.green(), padding, desc.help.dimmed());
        }
        println!("\nType '<command> --help' for details on a command.");
        Ok(0)
    }
}
