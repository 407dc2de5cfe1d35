use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const ORDER_CONFIRMED: &str = "order_confirmed";
pub const ORDER_REJECTED: &str = "order_rejected";

// ---- outbound ----

#[derive(Debug, Serialize)]
pub struct SendMessageRequest {
    pub chat_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineKeyboardMarkup {
    /// The two buttons every new measurement message carries.
    pub fn order_decision() -> Self {
        InlineKeyboardMarkup {
            inline_keyboard: vec![vec![
                InlineKeyboardButton {
                    text: "✅ Заказ полотна выполнен".to_string(),
                    callback_data: ORDER_CONFIRMED.to_string(),
                },
                InlineKeyboardButton {
                    text: "❌ Отказ от работ".to_string(),
                    callback_data: ORDER_REJECTED.to_string(),
                },
            ]],
        }
    }

    pub fn empty() -> Self {
        InlineKeyboardMarkup { inline_keyboard: Vec::new() }
    }
}

#[derive(Debug, Serialize)]
pub struct EditMessageReplyMarkupRequest {
    pub chat_id: String,
    pub message_id: i64,
    pub reply_markup: InlineKeyboardMarkup,
}

#[derive(Debug, Serialize)]
pub struct EditMessageTextRequest {
    pub chat_id: String,
    pub message_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    pub reply_markup: InlineKeyboardMarkup,
}

#[derive(Debug, Serialize)]
pub struct AnswerCallbackQueryRequest {
    pub callback_query_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InputMediaPhoto {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub media: String,
}

impl InputMediaPhoto {
    pub fn attached(name: &str) -> Self {
        InputMediaPhoto {
            kind: "photo",
            media: format!("attach://{}", name),
        }
    }
}

#[derive(Deserialize)]
pub struct TelegramResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub description: Option<String>,
}

impl TelegramResponse {
    /// Stand-in for a 2xx reply whose body could not be read.
    pub fn delivered() -> Self {
        TelegramResponse {
            ok: true,
            result: None,
            description: None,
        }
    }

    pub fn message_id(&self) -> Option<i64> {
        self.result
            .as_ref()
            .and_then(|r| r.get("message_id"))
            .and_then(|id| id.as_i64())
    }
}

// ---- inbound ----

#[derive(Deserialize)]
struct RawUpdate {
    #[serde(default)]
    callback_query: Option<RawCallbackQuery>,
}

#[derive(Deserialize)]
struct RawCallbackQuery {
    id: String,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    message: Option<RawMessage>,
}

#[derive(Deserialize)]
struct RawMessage {
    message_id: i64,
    chat: RawChat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct RawChat {
    id: i64,
}

/// The update kinds the webhook distinguishes. Everything except a button
/// press is `Ignored`.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    CallbackQuery(CallbackEvent),
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallbackEvent {
    pub callback_query_id: String,
    /// Missing for buttons on inline-mode messages.
    pub message: Option<MessageRef>,
    pub data: String,
    pub original_message_text: Option<String>,
}

impl Update {
    pub fn parse(body: &[u8]) -> Result<Update, AppError> {
        let raw: RawUpdate =
            serde_json::from_slice(body).map_err(|e| AppError::Parse(e.to_string()))?;

        Ok(match raw.callback_query {
            Some(q) => Update::CallbackQuery(CallbackEvent {
                callback_query_id: q.id,
                message: q.message.as_ref().map(|m| MessageRef {
                    chat_id: m.chat.id,
                    message_id: m.message_id,
                }),
                data: q.data.unwrap_or_default(),
                original_message_text: q.message.and_then(|m| m.text),
            }),
            None => Update::Ignored,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    OrderConfirmed,
    OrderRejected,
    Unknown(String),
}

impl CallbackAction {
    pub fn from_data(data: &str) -> Self {
        match data {
            ORDER_CONFIRMED => CallbackAction::OrderConfirmed,
            ORDER_REJECTED => CallbackAction::OrderRejected,
            other => CallbackAction::Unknown(other.to_string()),
        }
    }

    /// Empty for data the bot never put on a button.
    pub fn status_text(&self) -> &'static str {
        match self {
            CallbackAction::OrderConfirmed => "✅ *Заказ полотна выполнен*",
            CallbackAction::OrderRejected => "❌ *Отказ от работ*",
            CallbackAction::Unknown(_) => "",
        }
    }

    /// Same label without Markdown markers, for plain-text edits.
    pub fn plain_status_text(&self) -> &'static str {
        match self {
            CallbackAction::OrderConfirmed => "✅ Заказ полотна выполнен",
            CallbackAction::OrderRejected => "❌ Отказ от работ",
            CallbackAction::Unknown(_) => "",
        }
    }
}
