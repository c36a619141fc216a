pub mod builtins;
pub mod system;

use std::path::Path;

use crate::error::Result;
use crate::shell::context::ShellContext;
use crate::shell::flags::{flag_eq, is_flag_token};
use crate::shell::registry::FlagSpec;

pub trait Executable: Send + Sync {
    fn execute(&self, inv: &Invocation, ctx: &mut ShellContext) -> Result<i32>;
}

/// One resolved command, ready to run.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Line as it will appear in the undo ledger.
    pub line: String,
    pub name: String,
    /// Every token after the name, in order.
    pub args: Vec<String>,
    /// Tokens recognised as flags of `name`.
    pub flags: Vec<String>,
    pub operands: Vec<String>,
    /// Set when an inverse is being replayed by `undo`.
    pub replay: bool,
}

impl Invocation {
    /// Split `args` into flags and operands. A token spelled like a known
    /// flag is still an operand when it names an existing path.
    pub fn new(
        line: String,
        name: String,
        args: Vec<String>,
        known: &[FlagSpec],
        cwd: &Path,
        replay: bool,
    ) -> Self {
        let (flags, operands): (Vec<String>, Vec<String>) = args
            .iter()
            .cloned()
            .partition(|a| is_flag_token(a, cwd) && known.iter().any(|(f, _)| flag_eq(a, f)));
        Self { line, name, args, flags, operands, replay }
    }

    pub fn flag(&self, name: &str) -> bool {
        self.flags.iter().any(|f| flag_eq(f, name))
    }
}
