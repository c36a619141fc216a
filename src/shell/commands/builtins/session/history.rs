// History command

use colored::*;

use crate::error::Result;
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;

pub struct HistoryCommand;
impl Executable for HistoryCommand {
    fn execute(&self, _inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        println!("{}", "🕘 Recent commands:".bold());
        for (i, (at, line)) in ctx.history.entries().enumerate() {
            println!("  {:>3}  {}  {}", i + 1, at.format("%H:%M:%S").to_string().dimmed(), line);
        }

        if ctx.ledger.is_empty() {
            println!("\n{}", "Undo stack is empty.".dimmed());
        } else {
            println!("\n{}", "↩ Undo stack (newest first):".bold());
            for entry in ctx.ledger.iter() {
                println!(
                    "  {}  {}  {} {}",
                    entry.recorded_at.format("%H:%M:%S").to_string().dimmed(),
                    entry.original,
                    "⇢".cyan(),
                    entry.inverse.command.dimmed()
                );
            }
        }
        Ok(0)
    }
}
