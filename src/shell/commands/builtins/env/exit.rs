// Exit command

use colored::*;

use crate::error::Result;
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;

/// Ends the session. The read loop stops once `exit_requested` is set.
pub struct ExitCommand;
impl Executable for ExitCommand {
    fn execute(&self, _inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        ctx.purge_backups();
        ctx.exit_requested = true;
        println!("{}", "👋 Goodbye!".cyan());
        Ok(0)
    }
}
