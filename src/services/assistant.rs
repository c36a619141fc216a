use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::config::{AssistantSection, PowerConfig};
use crate::error::{Result, ShellError};
use crate::shell::corrector;
use crate::shell::registry::CommandRegistry;

/// Conversation turns kept between questions.
const MEMORY: usize = 10;

pub trait Assistant: Send {
    /// Answer a free-form question. `recent` is the session's latest command
    /// lines, oldest first.
    fn ask(&mut self, question: &str, recent: &[String], cwd: &Path) -> Result<String>;
}

/// Used when no API key is configured; every question falls back to
/// [`offline_help`].
pub struct OfflineAssistant;

impl Assistant for OfflineAssistant {
    fn ask(&mut self, _question: &str, _recent: &[String], _cwd: &Path) -> Result<String> {
        Err(ShellError::Service("No API key found".to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self { role: role.to_string(), content: content.into() }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// OpenAI-compatible chat-completions client with a short conversation memory.
pub struct RemoteAssistant {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    reference: String,
    conversation: Vec<ChatMessage>,
}

impl RemoteAssistant {
    pub fn new(section: &AssistantSection, api_key: String, registry: &CommandRegistry) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        let reference = registry
            .descriptors()
            .map(|d| format!("• {}: {}", d.name, d.help))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", section.base_url.trim_end_matches('/')),
            model: section.model.clone(),
            api_key,
            max_tokens: section.max_tokens,
            reference,
            conversation: Vec::new(),
        })
    }

    /// `None` when the configured key variable is unset or empty.
    pub fn from_config(config: &PowerConfig, registry: &CommandRegistry) -> Option<anyhow::Result<Self>> {
        let key = config.secret(&config.assistant.api_key_env)?;
        Some(Self::new(&config.assistant, key, registry))
    }

    fn system_message(&self, recent: &[String], cwd: &Path) -> String {
        let history = if recent.is_empty() {
            "(none)".to_string()
        } else {
            recent.join("\n")
        };
        format!(
            "You are an expert command-line assistant for an interactive shell.\n\
             Answer questions about commands, their syntax and flags, file system operations, \
             networking and system administration. Give clear examples, keep answers concise, \
             and say so when unsure.\n\n\
             Commands available in this shell:\n{}\n\n\
             Recent commands:\n{}\n\n\
             Current directory: {}",
            self.reference,
            history,
            cwd.display()
        )
    }

    fn remember(&mut self, message: ChatMessage) {
        self.conversation.push(message);
        if self.conversation.len() > MEMORY {
            let excess = self.conversation.len() - MEMORY;
            self.conversation.drain(..excess);
        }
    }

    fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: 0.3,
            max_tokens: self.max_tokens,
        };
        debug!("POST {} ({} messages)", self.endpoint, request.messages.len());
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| ShellError::Service(format!("Assistant unreachable: {}", e)))?;

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                return Err(ShellError::Service("Invalid or missing API key.".to_string()));
            }
            StatusCode::PAYMENT_REQUIRED | StatusCode::TOO_MANY_REQUESTS => {
                return Err(ShellError::Service("API quota exhausted.".to_string()));
            }
            status if !status.is_success() => {
                return Err(ShellError::Service(format!("Assistant returned HTTP {}", status)));
            }
            _ => {}
        }

        let body: ChatResponse = response
            .json()
            .map_err(|e| ShellError::Service(format!("Malformed assistant response: {}", e)))?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ShellError::Service("Assistant returned no answer".to_string()))
    }
}

impl Assistant for RemoteAssistant {
    fn ask(&mut self, question: &str, recent: &[String], cwd: &Path) -> Result<String> {
        let mut messages = vec![ChatMessage::new("system", self.system_message(recent, cwd))];
        messages.extend(self.conversation.iter().cloned());
        messages.push(ChatMessage::new("user", question));

        match self.complete(messages) {
            Ok(answer) => {
                self.remember(ChatMessage::new("user", question));
                self.remember(ChatMessage::new("assistant", answer.clone()));
                Ok(answer)
            }
            Err(e) => {
                warn!("Assistant request failed: {}", e);
                Err(e)
            }
        }
    }
}

/// Deterministic answer built from the command table alone.
///
/// Commands named in the question are described directly; otherwise words
/// close to a command name are used; otherwise the full command list is
/// offered.
pub fn offline_help(question: &str, registry: &CommandRegistry) -> String {
    let lowered = question.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|w| !w.is_empty())
        .collect();

    let mut matched: Vec<&str> = registry
        .names()
        .filter(|name| words.contains(name))
        .collect();

    if matched.is_empty() {
        for word in &words {
            for name in corrector::close_matches(word, registry.names(), 1, 0.6) {
                if !matched.contains(&name) {
                    matched.push(name);
                }
            }
        }
        matched.truncate(3);
    }

    if matched.is_empty() {
        let all: Vec<&str> = registry.names().collect();
        return format!(
            "🤖 I can help with command-line questions, but detailed answers need API access.\n\
             Available offline commands: {}\n\
             Try 'help <command>' or ask about one of these commands.",
            all.join(", ")
        );
    }

    let mut out = String::from("🤖 Offline Help (limited to known commands):\n");
    for name in matched {
        if let Some(d) = registry.lookup(name) {
            out.push_str(&format!("\n● {}: {}\n  Usage: {}", d.name, d.help, d.usage));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_help_names_command() {
        let registry = CommandRegistry::standard();
        let answer = offline_help("How do I use mkdir?", &registry);
        assert!(answer.contains("● mkdir:"));
        assert!(!answer.contains("● rmdir:"));
    }

    #[test]
    fn test_offline_help_close_word() {
        let registry = CommandRegistry::standard();
        let answer = offline_help("what does ipconfg show", &registry);
        assert!(answer.contains("● ipconfig:"));
    }

    #[test]
    fn test_offline_help_fallback_lists_commands() {
        let registry = CommandRegistry::standard();
        let answer = offline_help("zzz qqq", &registry);
        assert!(answer.contains("Available offline commands"));
        assert!(answer.contains("undo"));
    }

    #[test]
    fn test_offline_assistant_always_fails() {
        let mut assistant = OfflineAssistant;
        let err = assistant.ask("hi", &[], Path::new(".")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Service);
    }

    #[test]
    fn test_memory_is_bounded() {
        let registry = CommandRegistry::standard();
        let mut assistant =
            RemoteAssistant::new(&AssistantSection::default(), "k".into(), &registry).unwrap();
        for i in 0..15 {
            assistant.remember(ChatMessage::new("user", format!("q{}", i)));
        }
        assert_eq!(assistant.conversation.len(), MEMORY);
        assert_eq!(assistant.conversation[0].content, "q5");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  Use mkdir.  "}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.trim(), "Use mkdir.");
    }
}
