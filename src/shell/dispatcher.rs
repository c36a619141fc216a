use colored::*;
use log::info;
use std::sync::Arc;

use crate::config::UnknownCommandPolicy;
use crate::error::{Result, ShellError};
use crate::shell::commands::system::SystemCommand;
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;
use crate::shell::registry::{CommandKind, CommandRegistry};
use crate::shell::{corrector, flags, invoker};

/// Run one line typed by the user.
pub fn run_command_line(line: &str, ctx: &mut ShellContext) -> Result<i32> {
    execute_line(line, ctx, false)
}

/// Lex, resolve, validate and run a line. With `replay` set (undo replaying
/// an inverse) nothing is corrected, asked or recorded.
pub(crate) fn execute_line(line: &str, ctx: &mut ShellContext, replay: bool) -> Result<i32> {
    let tokens = shell_words::split(line)
        .map_err(|e| ShellError::Parse(format!("Failed to parse command line: {}", e)))?;
    let Some((head, rest)) = tokens.split_first() else {
        return Ok(0);
    };

    let registry = Arc::clone(&ctx.registry);
    let name = resolve_name(head, &registry, ctx, replay)?;
    let descriptor = registry.lookup(&name);

    let mut args = rest.to_vec();
    if let Some(desc) = descriptor {
        let short_help = !desc.valid_flags().any(|f| f == "-h");
        if !replay && args.iter().any(|a| a == "--help" || (short_help && a == "-h")) {
            desc.print_help();
            return Ok(0);
        }
        args = flags::validate(desc, args, ctx, replay)?;
    }

    let recorded_line = if name == *head && args.as_slice() == rest {
        line.trim().to_string()
    } else {
        shell_words::join(std::iter::once(name.as_str()).chain(args.iter().map(String::as_str)))
    };
    let inv = Invocation::new(
        recorded_line,
        name.clone(),
        args,
        descriptor.map(|d| d.flags).unwrap_or(&[]),
        &ctx.cwd,
        replay,
    );

    let result = match (descriptor.map(|d| d.kind), registry.handler(&name)) {
        (Some(CommandKind::Builtin), Some(handler)) => handler.execute(&inv, ctx),
        _ => SystemCommand.execute(&inv, ctx),
    };

    ctx.exit_code = match &result {
        Ok(code) => *code,
        Err(ShellError::ExitStatus { code, .. }) => *code,
        Err(_) => 1,
    };
    result
}

fn resolve_name(head: &str, registry: &CommandRegistry, ctx: &mut ShellContext, replay: bool) -> Result<String> {
    if registry.lookup(head).is_some() || replay {
        return Ok(head.to_string());
    }

    let policy = ctx.settings.unknown_command;
    let threshold = ctx.settings.correction_threshold;
    if let Some(candidate) = corrector::best_match(head, registry.names(), threshold) {
        let question = format!("Unknown command '{}'. Did you mean '{}'?", head, candidate);
        if ctx.prompter.confirm(&question, true)? {
            println!("{} Auto-correcting '{}' to '{}'", "✅".green(), head, candidate.bold());
            info!("Corrected '{}' to '{}'", head, candidate);
            return Ok(candidate.to_string());
        }
        return match policy {
            UnknownCommandPolicy::Strict => Err(ShellError::UnknownCommand(head.to_string())),
            UnknownCommandPolicy::Loose => Ok(head.to_string()),
        };
    }

    match policy {
        UnknownCommandPolicy::Strict if !invoker::is_resolvable(head, &ctx.cwd, &ctx.env) => {
            Err(ShellError::UnknownCommand(head.to_string()))
        }
        _ => Ok(head.to_string()),
    }
}
