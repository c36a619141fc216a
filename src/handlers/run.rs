use anyhow::Result;

use super::{SessionOptions, build_session};
use crate::config::PowerConfig;
use crate::error::ShellError;
use crate::shell::run_command_line;

/// Dispatch one line outside the interactive loop. Returns the exit status.
pub fn handle_run(line: &[String], config: &PowerConfig, options: SessionOptions) -> Result<i32> {
    let mut ctx = build_session(config, options)?;
    let line = shell_words::join(line);
    ctx.history.push(&line);

    let code = match run_command_line(&line, &mut ctx) {
        Ok(code) => code,
        Err(e) => {
            e.report();
            match e {
                ShellError::ExitStatus { code, .. } => code,
                _ => 1,
            }
        }
    };
    ctx.purge_backups();
    Ok(code)
}
