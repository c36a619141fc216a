use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pcli", version, about = "PowerCLI: an interactive shell with typo correction and undo")]
pub struct Cli {
    /// Use this config file instead of ./powercli.toml or ~/.powercli.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Run unknown commands as external programs even after a declined correction
    #[arg(long, global = true)]
    pub loose: bool,

    /// Answer yes to every confirmation
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive shell (default)
    Shell,

    /// Run a single command line and exit with its status
    Run {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        line: Vec<String>,
    },

    /// List users in the user registry
    ListUsers,

    /// Add a user to the user registry
    AddUser { name: String, email: String },
}
