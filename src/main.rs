mod cli;
mod config;
mod error;
mod handlers;
mod services;
mod shell;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::load_config;
use handlers::{SessionOptions, run, users};
use std::env;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let current_dir = env::current_dir()?;
    let config = load_config(cli.config.as_deref(), &current_dir)?;
    let options = SessionOptions { loose: cli.loose, assume_yes: cli.yes };

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => handlers::shell::handle_shell(&config, options),
        Commands::Run { line } => {
            let code = run::handle_run(&line, &config, options)?;
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Commands::ListUsers => users::handle_list_users(&config),
        Commands::AddUser { name, email } => users::handle_add_user(&config, &name, &email),
    }
}
