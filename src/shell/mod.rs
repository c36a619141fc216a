pub mod commands;
pub mod completer;
pub mod context;
pub mod corrector;
pub mod dispatcher;
pub mod flags;
pub mod inverse;
pub mod invoker;
pub mod prompter;
pub mod registry;
pub mod undo;

#[cfg(test)]
mod tests;

pub use context::ShellContext;
pub use dispatcher::run_command_line;
