use reqwest::Client;

use crate::config::TelegramConfig;
use crate::error::AppError;
use crate::services::telegram::TelegramBot;

/// Read-only for the process lifetime; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    pub telegram: TelegramConfig,
    pub client: Client,
}

impl AppState {
    pub fn new(telegram: TelegramConfig) -> Result<Self, reqwest::Error> {
        let client = TelegramBot::http_client(&telegram)?;
        Ok(Self { telegram, client })
    }

    pub fn bot(&self) -> Result<TelegramBot, AppError> {
        TelegramBot::new(self.client.clone(), &self.telegram)
    }
}
