use anyhow::{Context, Result, bail};
use colored::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "powercli.toml";
const HOME_CONFIG_FILE: &str = ".powercli.toml";

#[derive(Debug, Deserialize, Default)]
pub struct PowerConfig {
    #[serde(default)]
    pub shell: ShellSection,
    #[serde(default)]
    pub assistant: AssistantSection,
    #[serde(default)]
    pub users: UsersSection,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownCommandPolicy {
    /// Declined corrections are rejected as unknown commands.
    #[default]
    Strict,
    /// Declined corrections fall through to external execution.
    Loose,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BackupRetention {
    /// Backups are deleted once consumed by undo and purged on exit.
    #[default]
    Session,
    Keep,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ShellSection {
    pub unknown_command: UnknownCommandPolicy,
    pub correction_threshold: f64,
    /// Seconds; 0 disables the timeout.
    pub command_timeout: u64,
    pub backup_retention: BackupRetention,
    pub history_limit: usize,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            unknown_command: UnknownCommandPolicy::Strict,
            correction_threshold: 0.7,
            command_timeout: 0,
            backup_retention: BackupRetention::Session,
            history_limit: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AssistantSection {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub max_tokens: u32,
}

impl Default for AssistantSection {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 400,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UsersSection {
    pub url_env: String,
    pub key_env: String,
}

impl Default for UsersSection {
    fn default() -> Self {
        Self {
            url_env: "SUPABASE_URL".to_string(),
            key_env: "SUPABASE_KEY".to_string(),
        }
    }
}

/// Runtime knobs the dispatcher reads, resolved from `[shell]`.
#[derive(Debug, Clone)]
pub struct ShellSettings {
    pub unknown_command: UnknownCommandPolicy,
    pub correction_threshold: f64,
    pub command_timeout: Option<Duration>,
    pub backup_retention: BackupRetention,
    pub history_limit: usize,
}

impl Default for ShellSettings {
    fn default() -> Self {
        ShellSection::default().into()
    }
}

impl From<ShellSection> for ShellSettings {
    fn from(s: ShellSection) -> Self {
        Self {
            unknown_command: s.unknown_command,
            correction_threshold: s.correction_threshold,
            command_timeout: match s.command_timeout {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            backup_retention: s.backup_retention,
            history_limit: s.history_limit,
        }
    }
}

impl PowerConfig {
    pub fn parse(content: &str) -> Result<Self> {
        let config: PowerConfig = toml::from_str(content).context("Failed to parse powercli.toml")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let t = self.shell.correction_threshold;
        if !(t > 0.0 && t <= 1.0) {
            bail!("❌ Configuration Error: shell.correction_threshold must be in (0, 1], got {}", t);
        }
        Ok(())
    }

    /// Look a secret up in the merged `[env]`/.env layer first, then the process environment.
    pub fn secret(&self, key: &str) -> Option<String> {
        self.env
            .get(key)
            .cloned()
            .or_else(|| env::var(key).ok())
            .filter(|v| !v.trim().is_empty())
    }
}

fn find_config(explicit: Option<&Path>, dir: &Path) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("❌ Critical: config file {:?} not found.", path);
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = dir.join(CONFIG_FILE);
    if local.exists() {
        return Ok(Some(local));
    }

    let home = env::var_os("HOME").or_else(|| env::var_os("USERPROFILE"));
    Ok(home
        .map(|h| PathBuf::from(h).join(HOME_CONFIG_FILE))
        .filter(|p| p.exists()))
}

pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<PowerConfig> {
    // 1. powercli.toml (Base Layer), defaults when absent
    let mut config = match find_config(explicit, dir)? {
        Some(path) => {
            log::debug!("Loading configuration from {}", path.display());
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            PowerConfig::parse(&content)?
        }
        None => PowerConfig::default(),
    };

    // 2. Load .env using dotenvy (Override Layer)
    // Determines filename: .env or .env.prod based on POWERCLI_ENV
    let env_filename = env::var("POWERCLI_ENV")
        .map(|v| format!(".env.{}", v))
        .unwrap_or_else(|_| ".env".to_string());

    let env_path = dir.join(&env_filename);

    if env_path.exists() {
        eprintln!("{} Loading environment from: {}", "🌿".green(), env_filename.bold());

        // Kept as a map; only spawned programs and service clients see these values.
        for item in dotenvy::from_path_iter(&env_path)? {
            let (key, val) = item?;
            config.env.insert(key, val);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let config = PowerConfig::parse("").unwrap();
        assert_eq!(config.shell.unknown_command, UnknownCommandPolicy::Strict);
        assert_eq!(config.shell.correction_threshold, 0.7);
        assert_eq!(config.assistant.api_key_env, "OPENAI_API_KEY");

        let settings: ShellSettings = config.shell.into();
        assert!(settings.command_timeout.is_none());
        assert_eq!(settings.backup_retention, BackupRetention::Session);
    }

    #[test]
    fn test_parse_sections() {
        let config = PowerConfig::parse(
            r#"
            [shell]
            unknown_command = "loose"
            correction_threshold = 0.6
            command_timeout = 30
            backup_retention = "keep"

            [assistant]
            model = "mistralai/mistral-7b-instruct"
            base_url = "https://openrouter.ai/api/v1"
            api_key_env = "OPENROUTER_API_KEY"

            [env]
            GREETING = "hi"
            "#,
        )
        .unwrap();

        assert_eq!(config.shell.unknown_command, UnknownCommandPolicy::Loose);
        assert_eq!(config.assistant.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.env.get("GREETING").map(String::as_str), Some("hi"));

        let settings: ShellSettings = config.shell.into();
        assert_eq!(settings.command_timeout, Some(Duration::from_secs(30)));
        assert_eq!(settings.backup_retention, BackupRetention::Keep);
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let err = PowerConfig::parse("[shell]\ncorrection_threshold = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("correction_threshold"));
    }

    #[test]
    fn test_explicit_missing_config_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn test_local_config_and_dotenv() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[env]\nA = \"toml\"\nB = \"toml\"\n").unwrap();
        fs::write(dir.path().join(".env"), "B=dotenv\n").unwrap();

        let config = load_config(None, dir.path()).unwrap();
        assert_eq!(config.env.get("A").map(String::as_str), Some("toml"));
        assert_eq!(config.env.get("B").map(String::as_str), Some("dotenv"));
        assert_eq!(config.secret("B").as_deref(), Some("dotenv"));
    }
}
