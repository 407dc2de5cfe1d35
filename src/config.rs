use std::env;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Photos arrive base64-encoded inside the JSON body.
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let max_body_bytes = env::var("MAX_BODY_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);
        AppConfig { host, port, max_body_bytes }
    }
}

/// How a pressed order button is reflected in the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallbackStrategy {
    /// Drop the keyboard and post the status as a new message.
    #[default]
    StatusMessage,
    /// Rewrite the original message with the status appended.
    EditText,
}

impl CallbackStrategy {
    fn from_env_value(value: Option<String>) -> Self {
        match value.as_deref().map(str::trim) {
            Some("edit") | Some("edit_text") => CallbackStrategy::EditText,
            _ => CallbackStrategy::StatusMessage,
        }
    }
}

/// Bot credentials and client settings. Credentials stay optional here so the
/// server can start without them; every gateway call checks them first.
#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: String,
    pub timeout: Duration,
    pub callback_strategy: CallbackStrategy,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("callback_strategy", &self.callback_strategy)
            .finish()
    }
}

impl TelegramConfig {
    pub fn from_env() -> Self {
        let timeout_secs = env::var("TELEGRAM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        TelegramConfig {
            bot_token: non_empty(env::var("TELEGRAM_BOT_TOKEN").ok()),
            chat_id: non_empty(env::var("TELEGRAM_CHAT_ID").ok()),
            api_base: non_empty(env::var("TELEGRAM_API_BASE").ok())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            callback_strategy: CallbackStrategy::from_env_value(env::var("TELEGRAM_CALLBACK_MODE").ok()),
        }
    }

    pub fn new(bot_token: Option<&str>, chat_id: Option<&str>, api_base: &str) -> Self {
        TelegramConfig {
            bot_token: non_empty(bot_token.map(str::to_string)),
            chat_id: non_empty(chat_id.map(str::to_string)),
            api_base: api_base.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            callback_strategy: CallbackStrategy::default(),
        }
    }

    pub fn credentials(&self) -> Result<(&str, &str), AppError> {
        match (self.bot_token.as_deref(), self.chat_id.as_deref()) {
            (Some(token), Some(chat_id)) => Ok((token, chat_id)),
            (None, _) => Err(AppError::Configuration("TELEGRAM_BOT_TOKEN is not set".into())),
            (_, None) => Err(AppError::Configuration("TELEGRAM_CHAT_ID is not set".into())),
        }
    }

    /// The webhook only replies into the chat the update came from, so it
    /// needs the token alone.
    pub fn token(&self) -> Result<&str, AppError> {
        self.bot_token
            .as_deref()
            .ok_or_else(|| AppError::Configuration("TELEGRAM_BOT_TOKEN is not set".into()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
