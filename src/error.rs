use colored::*;
use std::io;
use thiserror::Error;

/// Everything that can abort a single invocation.
///
/// None of these terminate the shell; the read loop reports them and prompts
/// again.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{0}")]
    Parse(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Precondition(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' failed (code {code})")]
    ExitStatus { program: String, code: i32 },

    #[error("'{0}' was terminated by a signal")]
    Terminated(String),

    #[error("'{program}' timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("Undo failed for '{original}': {reason}")]
    Undo { original: String, reason: String },

    #[error("{0}")]
    Cancelled(String),

    #[error("{0}")]
    Service(String),
}

/// Coarse classification used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Resolution,
    Precondition,
    Execution,
    Undo,
    Cancelled,
    Service,
}

pub type Result<T> = std::result::Result<T, ShellError>;

impl ShellError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        ShellError::Io { context: context.into(), source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ShellError::Parse(_) => ErrorKind::Parse,
            ShellError::UnknownCommand(_) | ShellError::NotFound(_) => ErrorKind::Resolution,
            ShellError::Precondition(_) => ErrorKind::Precondition,
            ShellError::Io { .. }
            | ShellError::ExitStatus { .. }
            | ShellError::Terminated(_)
            | ShellError::Timeout { .. } => ErrorKind::Execution,
            ShellError::Undo { .. } => ErrorKind::Undo,
            ShellError::Cancelled(_) => ErrorKind::Cancelled,
            ShellError::Service(_) => ErrorKind::Service,
        }
    }

    /// Print the error the way the shell shows it at the prompt.
    pub fn report(&self) {
        match self.kind() {
            ErrorKind::Cancelled => println!("{} {}", "❎".cyan(), self.to_string().cyan()),
            ErrorKind::Resolution => eprintln!("{} {}", "❓".yellow(), self.to_string().yellow().bold()),
            _ => eprintln!("{} {}", "❌".red(), self.to_string().red().bold()),
        }
    }
}

/// Attach a human context to I/O errors, like `anyhow::Context` does.
pub trait IoContext<T> {
    fn with_io_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn with_io_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| ShellError::io(f(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ShellError::Parse("x".into()).kind(), ErrorKind::Parse);
        assert_eq!(ShellError::NotFound("x".into()).kind(), ErrorKind::Resolution);
        assert_eq!(
            ShellError::ExitStatus { program: "ping".into(), code: 1 }.kind(),
            ErrorKind::Execution
        );
    }

    #[test]
    fn test_exit_status_message_carries_code() {
        let err = ShellError::ExitStatus { program: "ping".into(), code: 68 };
        assert_eq!(err.to_string(), "'ping' failed (code 68)");
    }

    #[test]
    fn test_io_context() {
        let res: io::Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = res.with_io_context(|| "Failed to read a.txt".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to read a.txt: gone");
        assert_eq!(err.kind(), ErrorKind::Execution);
    }
}
