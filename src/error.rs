use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

/// Request-level failures. Each one ends the request with a 500.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bot token or chat id missing. Raised before any network call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Telegram refused (or never answered) the primary text message.
    #[error("upstream error: {0}")]
    Upstream(#[from] TelegramError),

    /// Inbound webhook body is not a Telegram update.
    #[error("parse error: {0}")]
    Parse(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string()
        }))
    }
}

/// Failure of a single Bot API call.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("request failed: {0}")]
    Http(reqwest::Error),

    #[error("Telegram API error {status}: {description}")]
    Api { status: u16, description: String },

    #[error("invalid photo #{index}: {reason}")]
    InvalidPhoto { index: usize, reason: String },
}

/// Request URLs carry the bot token in their path, so they are dropped
/// before the error can reach a log line.
impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        TelegramError::Http(e.without_url())
    }
}
