use colored::*;
use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

use crate::config::PowerConfig;
use crate::error::{Result, ShellError};

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct User {
    /// Integer or UUID depending on the table definition.
    pub id: Value,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn id_label(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

pub trait UserRegistry: Send {
    fn list_users(&mut self) -> Result<Vec<User>>;
    fn add_user(&mut self, name: &str, email: &str) -> Result<()>;
}

/// The `users` table behind a Supabase REST endpoint.
pub struct SupabaseUsers {
    client: Client,
    base_url: String,
    key: String,
}

impl SupabaseUsers {
    pub fn new(url: &str, key: String) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self { client, base_url: url.trim_end_matches('/').to_string(), key })
    }

    /// `None` unless both the URL and key variables are set.
    pub fn from_config(config: &PowerConfig) -> Option<anyhow::Result<Self>> {
        let url = config.secret(&config.users.url_env)?;
        let key = config.secret(&config.users.key_env)?;
        Some(Self::new(&url, key))
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/users", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.key).bearer_auth(&self.key)
    }
}

fn service_error(action: &str, e: impl std::fmt::Display) -> ShellError {
    ShellError::Service(format!("Failed to {}: {}", action, e))
}

impl UserRegistry for SupabaseUsers {
    fn list_users(&mut self) -> Result<Vec<User>> {
        let url = format!("{}?select=*", self.table_url());
        debug!("GET {}", url);
        let response = self
            .authorized(self.client.get(&url))
            .send()
            .map_err(|e| service_error("fetch users", e))?;
        let status = response.status();
        let body = response.text().map_err(|e| service_error("fetch users", e))?;
        if !status.is_success() {
            return Err(service_error("fetch users", format!("HTTP {}: {}", status, body.trim())));
        }
        parse_users(&body)
    }

    fn add_user(&mut self, name: &str, email: &str) -> Result<()> {
        debug!("POST {}", self.table_url());
        let response = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "return=minimal")
            .json(&json!({ "name": name, "email": email }))
            .send()
            .map_err(|e| service_error("add user", e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(service_error("add user", format!("HTTP {}: {}", status, body.trim())));
        }
        Ok(())
    }
}

pub fn parse_users(body: &str) -> Result<Vec<User>> {
    serde_json::from_str(body).map_err(|e| service_error("read users", e))
}

/// Cheap sanity check before a round trip.
pub fn validate_email(email: &str) -> Result<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ShellError::Precondition(format!("'{}' is not a valid email address", email))),
    }
}

pub fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("{}", "No users found.".yellow());
        return;
    }

    let ids: Vec<String> = users.iter().map(User::id_label).collect();
    let id_w = ids.iter().map(String::len).chain([2]).max().unwrap_or(2);
    let name_w = users.iter().map(|u| u.name.len()).chain([4]).max().unwrap_or(4);

    println!("{}", "👥 Users".bold());
    println!(
        "  {:<id_w$}  {:<name_w$}  {}",
        "ID".bold(),
        "Name".bold(),
        "Email".bold(),
        id_w = id_w,
        name_w = name_w
    );
    for (user, id) in users.iter().zip(&ids) {
        println!(
            "  {:<id_w$}  {:<name_w$}  {}",
            id.cyan(),
            user.name.green(),
            user.email,
            id_w = id_w,
            name_w = name_w
        );
    }
}
