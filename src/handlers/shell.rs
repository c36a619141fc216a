use anyhow::Result;
use colored::*;
use log::{error, warn};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::sync::{Arc, RwLock};

use super::{SessionOptions, build_session};
use crate::config::PowerConfig;
use crate::shell::completer::ShellHelper;
use crate::shell::run_command_line;

pub fn handle_shell(config: &PowerConfig, options: SessionOptions) -> Result<()> {
    let mut ctx = build_session(config, options)?;

    // Ctrl-C goes to the foreground child; the shell itself stays alive.
    if let Err(e) = ctrlc::set_handler(|| {}) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }

    let shared_cwd = Arc::new(RwLock::new(ctx.cwd.clone()));
    let mut editor: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
    editor.set_helper(Some(ShellHelper::new(&ctx.registry, Arc::clone(&shared_cwd))));

    println!("{}", "🚀 Welcome to PowerCLI! Type 'help' to see available commands.".cyan().bold());

    loop {
        let prompt = format!("✨ {} > ", ctx.cwd.display());
        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line).ok();
                ctx.history.push(line);

                if let Err(e) = run_command_line(line, &mut ctx) {
                    e.report();
                }

                if let Ok(mut cwd) = shared_cwd.write() {
                    *cwd = ctx.cwd.clone();
                }
                if ctx.exit_requested {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "⚠ Use 'exit' to quit".yellow());
            }
            Err(ReadlineError::Eof) => {
                // EOF behaves like `exit`
                if let Err(e) = run_command_line("exit", &mut ctx) {
                    e.report();
                }
                break;
            }
            Err(e) => {
                error!("Failed to read input: {}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}
