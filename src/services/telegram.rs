use base64::{engine::general_purpose, Engine as _};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Serialize;

use crate::config::TelegramConfig;
use crate::error::{AppError, TelegramError};
use crate::models::telegram::{
    AnswerCallbackQueryRequest,
    EditMessageReplyMarkupRequest,
    EditMessageTextRequest,
    InlineKeyboardMarkup,
    InputMediaPhoto,
    SendMessageRequest,
    TelegramResponse,
};

/// Photo decoded from a data URL, ready for a multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoUpload {
    pub index: usize,
    pub bytes: Vec<u8>,
    pub mime: String,
    pub file_name: String,
}

impl PhotoUpload {
    /// Accepts `data:<mime>;base64,<payload>`. `index` is the position in
    /// the submission and only used for naming and error reports.
    pub fn from_data_url(index: usize, url: &str) -> Result<Self, TelegramError> {
        let invalid = |reason: &str| TelegramError::InvalidPhoto {
            index,
            reason: reason.to_string(),
        };

        let rest = url.strip_prefix("data:").ok_or_else(|| invalid("not a data URL"))?;
        let (header, payload) = rest.split_once(',').ok_or_else(|| invalid("missing payload"))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| invalid("payload is not base64"))?;
        // drop parameters such as `;name=a.png`
        let mime = mime.split(';').next().unwrap_or_default().trim();
        let mime = if mime.is_empty() { "image/jpeg" } else { mime };

        let bytes = general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| invalid(&e.to_string()))?;
        if bytes.is_empty() {
            return Err(invalid("empty image"));
        }

        let ext = mime.rsplit('/').next().unwrap_or("jpg");
        Ok(PhotoUpload {
            index,
            bytes,
            mime: mime.to_string(),
            file_name: format!("photo_{}.{}", index + 1, ext),
        })
    }

    fn part(&self) -> Result<Part, TelegramError> {
        Ok(Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime)?)
    }
}

pub struct TelegramBot {
    client: Client,
    api_url: String,
}

impl TelegramBot {
    /// Shared client with the per-call timeout applied.
    pub fn http_client(config: &TelegramConfig) -> Result<Client, reqwest::Error> {
        Client::builder().timeout(config.timeout).build()
    }

    pub fn new(client: Client, config: &TelegramConfig) -> Result<Self, AppError> {
        let bot_token = config.token()?;
        let api_url = format!("{}/bot{}", config.api_base, bot_token);

        Ok(TelegramBot { client, api_url })
    }

    pub async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<Option<i64>, TelegramError> {
        let request = SendMessageRequest {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            parse_mode: Some("Markdown".to_string()),
            reply_markup,
        };

        let response = self.call("sendMessage", &request).await?;
        Ok(response.message_id())
    }

    pub async fn send_photo(&self, chat_id: &str, photo: &PhotoUpload) -> Result<(), TelegramError> {
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", photo.part()?);

        self.call_multipart("sendPhoto", form).await.map(|_| ())
    }

    /// Up to ten photos shown as one album.
    pub async fn send_media_group(
        &self,
        chat_id: &str,
        photos: &[PhotoUpload],
    ) -> Result<(), TelegramError> {
        let names: Vec<String> = photos.iter().map(|p| format!("photo{}", p.index)).collect();
        let media: Vec<InputMediaPhoto> = names.iter().map(|n| InputMediaPhoto::attached(n)).collect();
        let media_json = serde_json::to_string(&media).map_err(|e| TelegramError::Api {
            status: 0,
            description: format!("Failed to encode media group: {}", e),
        })?;

        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("media", media_json);
        for (name, photo) in names.into_iter().zip(photos) {
            form = form.part(name, photo.part()?);
        }

        self.call_multipart("sendMediaGroup", form).await.map(|_| ())
    }

    pub async fn edit_message_reply_markup(
        &self,
        chat_id: i64,
        message_id: i64,
        reply_markup: InlineKeyboardMarkup,
    ) -> Result<(), TelegramError> {
        let request = EditMessageReplyMarkupRequest {
            chat_id: chat_id.to_string(),
            message_id,
            reply_markup,
        };
        self.call("editMessageReplyMarkup", &request).await.map(|_| ())
    }

    /// Sends `text` as plain text. Callback messages arrive with their
    /// formatting already stripped, so re-parsing them as Markdown would
    /// fail on any stray `_` or `*` in user input.
    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        reply_markup: InlineKeyboardMarkup,
    ) -> Result<(), TelegramError> {
        let request = EditMessageTextRequest {
            chat_id: chat_id.to_string(),
            message_id,
            text: text.to_string(),
            parse_mode: None,
            reply_markup,
        };
        self.call("editMessageText", &request).await.map(|_| ())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TelegramError> {
        let request = AnswerCallbackQueryRequest {
            callback_query_id: callback_query_id.to_string(),
            text: None,
        };
        self.call("answerCallbackQuery", &request).await.map(|_| ())
    }

    async fn call<T: Serialize>(&self, method: &str, body: &T) -> Result<TelegramResponse, TelegramError> {
        let url = format!("{}/{}", self.api_url, method);
        let response = self.client.post(&url).json(body).send().await?;
        Self::read_response(response).await
    }

    async fn call_multipart(&self, method: &str, form: Form) -> Result<TelegramResponse, TelegramError> {
        let url = format!("{}/{}", self.api_url, method);
        let response = self.client.post(&url).multipart(form).send().await?;
        Self::read_response(response).await
    }

    /// The HTTP status decides success. A 2xx body that is not the usual
    /// `{ok, result}` envelope still counts as delivered.
    async fn read_response(response: reqwest::Response) -> Result<TelegramResponse, TelegramError> {
        let status = response.status();
        let response_text = response.text().await?;
        let parsed = serde_json::from_str::<TelegramResponse>(&response_text).ok();

        if status.is_success() {
            return Ok(parsed.unwrap_or_else(TelegramResponse::delivered));
        }

        let description = match parsed {
            Some(body) => body.description.unwrap_or_else(|| "unknown error".to_string()),
            None => format!("Failed to parse Telegram response: {}", response_text),
        };
        Err(TelegramError::Api {
            status: status.as_u16(),
            description,
        })
    }
}
