pub mod run;
pub mod shell;
pub mod users;

use anyhow::Result;
use colored::*;
use log::warn;

use crate::config::{PowerConfig, ShellSettings, UnknownCommandPolicy};
use crate::services::assistant::RemoteAssistant;
use crate::services::users::SupabaseUsers;
use crate::shell::ShellContext;
use crate::shell::prompter::{AssumePrompter, ConsolePrompter, Prompter};

/// Flags shared by every entry point.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub loose: bool,
    pub assume_yes: bool,
}

/// Build a session from the loaded configuration.
pub fn build_session(config: &PowerConfig, options: SessionOptions) -> Result<ShellContext> {
    let mut settings = ShellSettings::from(config.shell.clone());
    if options.loose {
        settings.unknown_command = UnknownCommandPolicy::Loose;
    }

    let prompter: Box<dyn Prompter> = if options.assume_yes {
        Box::new(AssumePrompter { yes: true })
    } else {
        Box::new(ConsolePrompter)
    };

    let mut ctx = ShellContext::new(settings, prompter).with_env(&config.env);

    let assistant = RemoteAssistant::from_config(config, &ctx.registry);
    match assistant {
        Some(Ok(assistant)) => ctx = ctx.with_assistant(Box::new(assistant)),
        Some(Err(e)) => warn!("Assistant disabled: {:#}", e),
        None => eprintln!(
            "{} No {} found, 'ask' will use offline help.",
            "⚠".yellow(),
            config.assistant.api_key_env.bold()
        ),
    }

    match SupabaseUsers::from_config(config) {
        Some(Ok(users)) => ctx = ctx.with_users(Box::new(users)),
        Some(Err(e)) => warn!("User registry disabled: {:#}", e),
        None => log::debug!("User registry not configured"),
    }

    Ok(ctx)
}
