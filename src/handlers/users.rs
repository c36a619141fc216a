use anyhow::{Context, Result, anyhow};
use colored::*;

use crate::config::PowerConfig;
use crate::services::users::{SupabaseUsers, UserRegistry, print_users, validate_email};

fn connect(config: &PowerConfig) -> Result<SupabaseUsers> {
    SupabaseUsers::from_config(config).unwrap_or_else(|| {
        Err(anyhow!(
            "❌ User registry is not configured: set {} and {}",
            config.users.url_env,
            config.users.key_env
        ))
    })
}

pub fn handle_list_users(config: &PowerConfig) -> Result<()> {
    let mut users = connect(config)?;
    let list = users.list_users().context("Failed to list users")?;
    print_users(&list);
    Ok(())
}

pub fn handle_add_user(config: &PowerConfig, name: &str, email: &str) -> Result<()> {
    validate_email(email)?;
    let mut users = connect(config)?;
    users.add_user(name, email).context("Failed to add user")?;
    println!("{} Successfully added user: {} ({})", "✅".green(), name, email);
    Ok(())
}
