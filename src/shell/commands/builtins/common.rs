use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, ShellError};
use crate::shell::commands::Invocation;
use crate::shell::context::ShellContext;

pub fn resolve_path(ctx: &ShellContext, path: &str) -> PathBuf {
    resolve_in(&ctx.cwd, path)
}

/// Absolute, lexically normalised form of `path` relative to `cwd`.
pub fn resolve_in(cwd: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        normalize(p)
    } else {
        normalize(&cwd.join(p))
    }
}

/// Drop `.` and fold `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

pub fn display(path: &Path) -> String {
    path.display().to_string()
}

pub fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst)?;
    }

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let ty = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// The operand at `index`, or an answer to `question` when it was left out.
/// An empty answer aborts.
pub fn require_operand(inv: &Invocation, ctx: &mut ShellContext, index: usize, question: &str) -> Result<String> {
    if let Some(value) = inv.operands.get(index) {
        return Ok(value.clone());
    }
    if inv.replay {
        return Err(ShellError::Precondition(format!("{}: missing operand", inv.name)));
    }
    let answer = ctx.prompter.ask(question)?;
    if answer.is_empty() {
        return Err(ShellError::Precondition(format!("{}: no value given", inv.name)));
    }
    Ok(answer)
}

pub fn usage(inv: &Invocation, ctx: &ShellContext) -> ShellError {
    let text = ctx
        .registry
        .lookup(&inv.name)
        .map(|d| d.usage)
        .unwrap_or(inv.name.as_str());
    ShellError::Precondition(format!("Usage: {}", text))
}
