use colored::*;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{Result, ShellError};
use crate::shell::context::ShellContext;
use crate::shell::corrector;
use crate::shell::registry::CommandDescriptor;

static FLAG_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(--?|/)[A-Za-z0-9]+$").expect("flag shape pattern is valid"));

/// Whether a token is a flag rather than an operand.
///
/// `-x` style tokens always are. A `/x` token is an operand when it names an
/// existing path or contains another separator, so absolute POSIX paths are
/// never mistaken for Windows-style switches.
pub fn is_flag_token(token: &str, cwd: &Path) -> bool {
    if let Some(rest) = token.strip_prefix('-') {
        return !rest.is_empty();
    }
    if let Some(rest) = token.strip_prefix('/') {
        if rest.is_empty() || rest.contains(['/', '\\']) {
            return false;
        }
        return !cwd.join(token).exists();
    }
    false
}

/// `/` switches compare case-insensitively, `-` flags exactly.
pub fn flag_eq(a: &str, b: &str) -> bool {
    if a.starts_with('/') && b.starts_with('/') {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

fn normalized(flag: &str) -> String {
    if flag.starts_with('/') {
        flag.to_lowercase()
    } else {
        flag.to_string()
    }
}

/// Check `args` against the command's flag set, repairing unknown flags
/// interactively. Returns the tokens to run with.
///
/// A malformed flag aborts the whole invocation before any question is asked.
/// During replay unknown flags are kept as-is.
pub fn validate(
    desc: &CommandDescriptor,
    args: Vec<String>,
    ctx: &mut ShellContext,
    replay: bool,
) -> Result<Vec<String>> {
    if !desc.has_flag_set() {
        return Ok(args);
    }

    let cwd = ctx.cwd.clone();
    if let Some(bad) = args
        .iter()
        .find(|a| is_flag_token(a, &cwd) && !FLAG_SHAPE.is_match(a))
    {
        return Err(ShellError::Parse(format!("Malformed flag '{}' for '{}'", bad, desc.name)));
    }

    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        if !is_flag_token(&arg, &cwd) || desc.valid_flags().any(|f| flag_eq(&arg, f)) || replay {
            out.push(arg);
            continue;
        }
        if let Some(repaired) = repair(desc, &arg, ctx)? {
            out.push(repaired);
        }
    }
    Ok(out)
}

fn repair(desc: &CommandDescriptor, flag: &str, ctx: &mut ShellContext) -> Result<Option<String>> {
    let wanted = normalized(flag);
    let threshold = ctx.settings.correction_threshold;
    let suggestion = corrector::best_match_by(desc.valid_flags(), threshold, |c| {
        corrector::similarity(&wanted, &normalized(c))
    });

    if let Some(s) = suggestion {
        let question = format!("'{}' is not a valid flag for '{}'. Did you mean '{}'?", flag, desc.name, s);
        if ctx.prompter.confirm(&question, true)? {
            println!("{} Auto-corrected flag '{}' to '{}'", "✅".green(), flag, s);
            return Ok(Some(s.to_string()));
        }
    } else {
        println!("{} '{}' is not a valid flag for '{}'", "⚠".yellow(), flag, desc.name);
    }

    let action = ctx.prompter.choose(
        &format!("What should be done with '{}'?", flag),
        &["replace", "drop", "keep"],
        "keep",
    )?;
    match action.as_str() {
        "replace" => {
            let valid: Vec<&str> = desc.valid_flags().collect();
            let pick = ctx.prompter.choose("Choose a valid flag", &valid, valid[0])?;
            Ok(Some(pick))
        }
        "drop" => {
            log::info!("Dropped flag '{}' from '{}'", flag, desc.name);
            Ok(None)
        }
        _ => Ok(Some(flag.to_string())),
    }
}
