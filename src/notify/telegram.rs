//! Telegram delivery of reports and advisories.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Telegram rejects messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Messaging credentials missing: {0}")]
    MissingCredentials(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Send rejected: {status_code} - {description}")]
    Rejected { status_code: u16, description: String },
}

/// Destination for the final report.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_url: String,
    pub bot_token: String,
    pub chat_id: String,
    pub parse_mode: Option<String>,
    pub timeout: Duration,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    disable_web_page_preview: bool,
}

pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    chat_id: String,
    parse_mode: Option<String>,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self, NotifyError> {
        if config.bot_token.is_empty() || config.chat_id.is_empty() {
            return Err(NotifyError::MissingCredentials(
                "TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                config.api_url.trim_end_matches('/'),
                config.bot_token
            ),
            chat_id: config.chat_id,
            parse_mode: config.parse_mode.filter(|m| !m.is_empty()),
        })
    }

    async fn send_chunk(&self, text: &str) -> Result<(), NotifyError> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: self.parse_mode.as_deref(),
            disable_web_page_preview: true,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let ok = body.get("ok").and_then(|v| v.as_bool()).unwrap_or(false);

        if !(200..300).contains(&status) || !ok {
            let description = body
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or("no description")
                .to_string();
            return Err(NotifyError::Rejected {
                status_code: status,
                description,
            });
        }

        debug!(chars = text.chars().count(), "Telegram message delivered");
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let chunks = split_message(text, MAX_MESSAGE_CHARS);
        for chunk in &chunks {
            self.send_chunk(chunk).await?;
        }
        info!(chunks = chunks.len(), "Telegram report sent");
        Ok(())
    }
}

/// Split on line boundaries so each chunk fits in `max_chars`.
/// A single line longer than the limit is hard-split.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let mut rest: Vec<char> = line.chars().collect();

        while !rest.is_empty() {
            let room = max_chars - current_len;
            if rest.len() <= room {
                current.extend(rest.iter());
                current_len += rest.len();
                break;
            }
            if current_len > 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            let tail = rest.split_off(max_chars);
            chunks.push(rest.into_iter().collect());
            rest = tail;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_single_chunk() {
        assert_eq!(split_message("hello\nworld\n", 4096), vec!["hello\nworld\n"]);
    }

    #[test]
    fn test_split_on_lines() {
        let chunks = split_message("aaa\nbbb\nccc\n", 8);
        assert_eq!(chunks, vec!["aaa\nbbb\n", "ccc\n"]);
    }

    #[test]
    fn test_hard_split_long_line() {
        let chunks = split_message("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(split_message("", 10).is_empty());
    }

    #[test]
    fn test_missing_credentials() {
        let result = TelegramNotifier::new(TelegramConfig {
            api_url: DEFAULT_API_URL.to_string(),
            bot_token: String::new(),
            chat_id: "42".to_string(),
            parse_mode: None,
            timeout: Duration::from_secs(30),
        });
        assert!(matches!(result, Err(NotifyError::MissingCredentials(_))));
    }
}
