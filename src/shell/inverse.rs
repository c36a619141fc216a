//! How each reversible command is undone, and the backups that makes
//! necessary.

use log::{debug, warn};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{IoContext, Result, ShellError};
use crate::shell::commands::builtins::common::{copy_dir_recursive, display, resolve_in};
use crate::shell::undo::Inverse;

/// An inverse computed before a command runs, with the backup it depends on.
#[derive(Debug)]
pub struct PreparedInverse {
    pub inverse: Inverse,
    pub backup: Option<PathBuf>,
}

impl PreparedInverse {
    fn new(inverse: Inverse) -> Self {
        Self { inverse, backup: None }
    }

    fn with_backup(inverse: Inverse, backup: PathBuf) -> Self {
        Self { inverse, backup: Some(backup) }
    }

    /// Drop the inverse after the forward command failed, removing its backup.
    pub fn discard(self) {
        if let Some(backup) = self.backup {
            if let Err(e) = remove_artifact(&backup) {
                warn!("Could not remove backup {}: {}", backup.display(), e);
            }
        }
    }
}

/// Remove a backup file or directory. A missing artifact is not an error.
pub fn remove_artifact(path: &Path) -> io::Result<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// First of `path`, `path.1`, `path.2`, … that does not exist yet.
pub fn unique_path(path: PathBuf) -> PathBuf {
    if !path.exists() {
        return path;
    }
    (1..)
        .map(|i| {
            let mut name: OsString = path.as_os_str().to_owned();
            name.push(format!(".{}", i));
            PathBuf::from(name)
        })
        .find(|p| !p.exists())
        .unwrap_or(path)
}

fn sibling(path: &Path, name: impl FnOnce(&str) -> String) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(name(&file_name))
}

/// `<file>.bak`, used by rm/del.
pub fn backup_removed_file(path: &Path) -> Result<PathBuf> {
    let backup = unique_path(sibling(path, |n| format!("{}.bak", n)));
    fs::copy(path, &backup)
        .with_io_context(|| format!("Failed to back up '{}'", display(path)))?;
    debug!("Backed up {} to {}", path.display(), backup.display());
    Ok(backup)
}

/// `backup_<file>`, used by append.
pub fn backup_appended_file(path: &Path) -> Result<PathBuf> {
    let backup = unique_path(sibling(path, |n| format!("backup_{}", n)));
    fs::copy(path, &backup)
        .with_io_context(|| format!("Failed to back up '{}'", display(path)))?;
    debug!("Backed up {} to {}", path.display(), backup.display());
    Ok(backup)
}

/// `<dir>_backup`, a full copy of the tree, used by rmdir.
pub fn backup_dir(path: &Path) -> Result<PathBuf> {
    let backup = unique_path(sibling(path, |n| format!("{}_backup", n)));
    if let Err(e) = copy_dir_recursive(path, &backup) {
        remove_artifact(&backup).ok();
        return Err(ShellError::io(format!("Failed to back up '{}'", display(path)), e));
    }
    debug!("Backed up {} to {}", path.display(), backup.display());
    Ok(backup)
}

fn text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// mkdir
pub fn remove_dir(created: &Path) -> PreparedInverse {
    PreparedInverse::new(Inverse::new(
        ["rmdir", "/s", "/q", &text(created)],
        format!("Directory removed: {}", display(created)),
    ))
}

// rmdir
pub fn restore_dir(dir: &Path, backup: PathBuf) -> PreparedInverse {
    let inverse = Inverse::new(
        ["move", &text(&backup), &text(dir)],
        format!("Restored directory: {}", display(dir)),
    );
    PreparedInverse::with_backup(inverse, backup)
}

// rm / del
pub fn restore_file(file: &Path, backup: PathBuf) -> PreparedInverse {
    let inverse = Inverse::new(
        ["copy", &text(&backup), &text(file)],
        format!("Restored file: {}", display(file)),
    );
    PreparedInverse::with_backup(inverse, backup)
}

// append
pub fn restore_appended(file: &Path, backup: PathBuf) -> PreparedInverse {
    let inverse = Inverse::new(
        ["copy", &text(&backup), &text(file)],
        format!("Restored previous version of \"{}\" before append operation.", display(file)),
    );
    PreparedInverse::with_backup(inverse, backup)
}

// touch / copy
pub fn remove_file(file: &Path) -> PreparedInverse {
    PreparedInverse::new(Inverse::new(
        ["rm", "/q", &text(file)],
        format!("Deleted file \"{}\"", display(file)),
    ))
}

// move
pub fn move_back(dst: &Path, src: &Path) -> PreparedInverse {
    PreparedInverse::new(Inverse::new(
        ["move", &text(dst), &text(src)],
        format!("Restored \"{}\" back to its original location.", display(src)),
    ))
}

// rename
pub fn rename_back(new: &Path, old: &Path) -> PreparedInverse {
    PreparedInverse::new(Inverse::new(
        ["rename", &text(new), &text(old)],
        format!("Renamed \"{}\" to \"{}\"", display(new), display(old)),
    ))
}

// cd
pub fn change_dir(previous: &Path) -> PreparedInverse {
    PreparedInverse::new(Inverse::new(
        ["cd", &text(previous)],
        format!("Returned to the previous directory: \"{}\".", display(previous)),
    ))
}

/// Topmost directory `mkdir -p` would have to create for `target`.
pub fn topmost_missing(target: &Path) -> PathBuf {
    let mut top = target.to_path_buf();
    while let Some(parent) = top.parent() {
        if parent.as_os_str().is_empty() || parent.exists() {
            break;
        }
        top = parent.to_path_buf();
    }
    top
}

/// Where a copy/move of `src` to `dst` lands.
pub fn landing_path(src: &Path, dst: &Path) -> PathBuf {
    match src.file_name() {
        Some(name) if dst.is_dir() => dst.join(name),
        _ => dst.to_path_buf(),
    }
}

fn looks_like_flag(arg: &str, cwd: &Path) -> bool {
    crate::shell::flags::is_flag_token(arg, cwd)
}

/// Inverse for an external program that has a builtin counterpart.
///
/// Any backup is taken here, before the program runs; the caller discards
/// the result when the program fails. Unrecognised programs and shapes yield
/// `None` and are simply not undoable.
pub fn for_external(program: &str, args: &[String], cwd: &Path) -> Result<Option<PreparedInverse>> {
    let name = Path::new(program)
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let operands: Vec<PathBuf> = args
        .iter()
        .filter(|a| !looks_like_flag(a, cwd))
        .map(|a| resolve_in(cwd, a))
        .collect();

    let prepared = match (name.as_str(), operands.as_slice()) {
        ("mkdir" | "md", [target]) if !target.exists() => Some(remove_dir(&topmost_missing(target))),
        ("rmdir" | "rd", [target]) if target.is_dir() => {
            let backup = backup_dir(target)?;
            Some(restore_dir(target, backup))
        }
        ("rm" | "del" | "erase", [target]) if target.is_file() => {
            let backup = backup_removed_file(target)?;
            Some(restore_file(target, backup))
        }
        ("touch", [target]) if !target.exists() => Some(remove_file(target)),
        ("cp" | "copy", [src, dst]) if src.is_file() => {
            let landed = landing_path(src, dst);
            (!landed.exists()).then(|| remove_file(&landed))
        }
        ("mv" | "move", [src, dst]) if src.exists() => {
            let landed = landing_path(src, dst);
            (!landed.exists()).then(|| move_back(&landed, src))
        }
        ("rename" | "ren", [old, new]) if old.exists() && !new.exists() => Some(rename_back(new, old)),
        _ => None,
    };

    if prepared.is_none() {
        debug!("No inverse for external '{}'", program);
    }
    Ok(prepared)
}
