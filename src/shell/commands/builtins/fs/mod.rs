use std::path::Path;

use crate::error::{Result, ShellError};
use crate::shell::commands::builtins::common::display;

pub mod append;
pub mod copy;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod rename;
pub mod rm;
pub mod rmdir;
pub mod touch;

/// Destination must be free, otherwise the command could not be undone.
/// Replayed inverses are allowed to overwrite.
pub fn ensure_free(target: &Path, replay: bool) -> Result<()> {
    if target.exists() && !replay {
        return Err(ShellError::Precondition(format!(
            "Destination '{}' already exists.",
            display(target)
        )));
    }
    Ok(())
}

pub fn ensure_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        return Err(ShellError::Precondition(format!("{} '{}' not found.", what, display(path))));
    }
    Ok(())
}
