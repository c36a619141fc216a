// Ask command

use colored::*;
use log::warn;
use std::sync::Arc;

use crate::error::{Result, ShellError};
use crate::services::assistant::offline_help;
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;

/// Recent lines handed to the assistant as context.
const CONTEXT_LINES: usize = 10;

pub struct AskCommand;
impl Executable for AskCommand {
    fn execute(&self, inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        let mut question = inv.operands.join(" ");
        if question.trim().is_empty() {
            question = ctx.prompter.ask("What would you like to know?")?;
        }
        if question.trim().is_empty() {
            return Err(ShellError::Precondition("ask: no question given".to_string()));
        }

        let recent = ctx.history.recent(CONTEXT_LINES);
        let cwd = ctx.cwd.clone();
        let registry = Arc::clone(&ctx.registry);

        match ctx.assistant.ask(&question, &recent, &cwd) {
            Ok(answer) => println!("{} {}", "🤖".cyan(), answer),
            Err(e) => {
                warn!("Assistant unavailable: {}", e);
                println!("{} {}. Using offline fallback.", "⚠".yellow(), e);
                println!("{}", offline_help(&question, &registry));
            }
        }
        Ok(0)
    }
}
