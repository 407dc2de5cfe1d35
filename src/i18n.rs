use actix_web::HttpRequest;

use crate::error::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Locale {
    En,
    Ru,
}

/// Query `lang=` wins over `Accept-Language`. The form itself is Russian,
/// so anything not explicitly English falls back to Russian.
pub fn detect_locale(req: &HttpRequest) -> Locale {
    if let Some(lang) = req.query_string().split('&').find_map(|kv| {
        let mut it = kv.splitn(2, '=');
        let k = it.next()?;
        let v = it.next()?;
        if k == "lang" {
            Some(v)
        } else {
            None
        }
    }) {
        return match lang.to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Locale::En,
            _ => Locale::Ru,
        };
    }

    if let Some(h) = req.headers().get("Accept-Language").and_then(|v| v.to_str().ok()) {
        let hl = h.to_ascii_lowercase();
        if hl.starts_with("en") {
            return Locale::En;
        }
    }

    Locale::Ru
}

/// Toast-level message shown by the form. No field detail on purpose.
pub fn send_error_message(locale: Locale, err: &AppError) -> &'static str {
    match (locale, err) {
        (Locale::Ru, AppError::Configuration(_)) => {
            "Telegram bot не настроен. Добавьте TELEGRAM_BOT_TOKEN и TELEGRAM_CHAT_ID в переменные окружения."
        }
        (Locale::En, AppError::Configuration(_)) => {
            "Telegram bot is not configured. Set TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID."
        }
        (Locale::Ru, _) => "Не удалось отправить сообщение",
        (Locale::En, _) => "Failed to send message",
    }
}
