// System command
use colored::*;
use log::{debug, error};
use std::sync::Arc;

use crate::error::{Result, ShellError};
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;
use crate::shell::inverse;
use crate::shell::invoker::{self, ProcessRequest};

/// Anything that is not a builtin: registered system tools and whatever else
/// is on PATH.
pub struct SystemCommand;

impl Executable for SystemCommand {
    fn execute(&self, inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        let registry = Arc::clone(&ctx.registry);
        if let Some(warning) = registry.lookup(&inv.name).and_then(|d| d.caution) {
            if !inv.replay && !ctx.prompter.confirm(warning, false)? {
                return Err(ShellError::Cancelled("Aborted.".to_string()));
            }
        }

        let prepared = if inv.replay {
            None
        } else {
            inverse::for_external(&inv.name, &inv.args, &ctx.cwd)?
        };

        let request = ProcessRequest {
            program: &inv.name,
            args: &inv.args,
            cwd: &ctx.cwd,
            env: &ctx.env,
            timeout: ctx.settings.command_timeout,
            capture: false,
        };
        let outcome = match invoker::invoke(&request) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Failed to start '{}': {}", inv.name, e);
                if let Some(p) = prepared {
                    p.discard();
                }
                return Err(e);
            }
        };

        let failure = if outcome.timed_out {
            Some(ShellError::Timeout {
                program: inv.name.clone(),
                secs: ctx.settings.command_timeout.map(|d| d.as_secs()).unwrap_or(0),
            })
        } else {
            match outcome.code {
                Some(0) => None,
                Some(code) => Some(ShellError::ExitStatus { program: inv.name.clone(), code }),
                None => Some(ShellError::Terminated(inv.name.clone())),
            }
        };

        if let Some(err) = failure {
            if let Some(p) = prepared {
                p.discard();
            }
            return Err(err);
        }

        match prepared {
            Some(p) => ctx.record(inv, p),
            None => debug!("'{}' is not undoable", inv.line),
        }
        if !inv.replay {
            println!("{} Command succeeded: {}", "✅".green(), inv.line);
        }
        Ok(0)
    }
}
