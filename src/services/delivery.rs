//! Submission delivery and button-press handling on top of [`TelegramBot`].
//!
//! Only the primary text message can fail a submission. Photo uploads and
//! everything the webhook does are best-effort: their failures are collected
//! into the returned report and the caller decides what to log.

use futures_util::future::join_all;
use tracing::{info, warn};

use crate::config::CallbackStrategy;
use crate::error::{AppError, TelegramError};
use crate::models::{CallbackAction, CallbackEvent, InlineKeyboardMarkup};
use crate::services::telegram::{PhotoUpload, TelegramBot};

/// Telegram refuses albums with more than ten items.
pub const MEDIA_GROUP_LIMIT: usize = 10;

#[derive(Debug)]
pub struct PhotoFailure {
    /// Positions in the submitted photo list.
    pub photos: Vec<usize>,
    pub error: TelegramError,
}

#[derive(Debug)]
pub struct DeliveryReport {
    /// `None` when Telegram accepted the message without echoing it back.
    pub message_id: Option<i64>,
    pub photos_sent: usize,
    pub photo_failures: Vec<PhotoFailure>,
}

impl DeliveryReport {
    pub fn log_failures(&self) {
        for failure in &self.photo_failures {
            warn!(
                message_id = ?self.message_id,
                photos = ?failure.photos,
                error = %failure.error,
                "photo delivery failed"
            );
        }
    }
}

/// Posts the text with the order keyboard, then the photos as albums.
pub async fn deliver(
    bot: &TelegramBot,
    chat_id: &str,
    text: &str,
    photos: &[String],
) -> Result<DeliveryReport, AppError> {
    let message_id = bot
        .send_message(chat_id, text, Some(InlineKeyboardMarkup::order_decision()))
        .await?;
    info!(message_id = ?message_id, photos = photos.len(), "measurement message sent");

    let mut photo_failures = Vec::new();
    let mut uploads = Vec::with_capacity(photos.len());
    for (index, url) in photos.iter().enumerate() {
        match PhotoUpload::from_data_url(index, url) {
            Ok(upload) => uploads.push(upload),
            Err(error) => photo_failures.push(PhotoFailure { photos: vec![index], error }),
        }
    }

    let results = join_all(
        uploads
            .chunks(MEDIA_GROUP_LIMIT)
            .map(|chunk| send_chunk(bot, chat_id, chunk)),
    )
    .await;

    let mut photos_sent = 0;
    for (chunk, result) in uploads.chunks(MEDIA_GROUP_LIMIT).zip(results) {
        match result {
            Ok(()) => photos_sent += chunk.len(),
            Err(error) => photo_failures.push(PhotoFailure {
                photos: chunk.iter().map(|p| p.index).collect(),
                error,
            }),
        }
    }

    Ok(DeliveryReport {
        message_id,
        photos_sent,
        photo_failures,
    })
}

async fn send_chunk(bot: &TelegramBot, chat_id: &str, chunk: &[PhotoUpload]) -> Result<(), TelegramError> {
    match chunk {
        [single] => bot.send_photo(chat_id, single).await,
        group => bot.send_media_group(chat_id, group).await,
    }
}

#[derive(Debug)]
pub struct CallbackReport {
    pub action: CallbackAction,
    pub acknowledged: bool,
    pub failures: Vec<TelegramError>,
}

impl CallbackReport {
    pub fn log_failures(&self, callback_query_id: &str) {
        for error in &self.failures {
            warn!(callback_query_id, action = ?self.action, error = %error, "callback step failed");
        }
    }
}

/// Updates the pressed message and always answers the callback query, so the
/// button never keeps spinning on the client.
pub async fn handle_callback(
    bot: &TelegramBot,
    event: &CallbackEvent,
    strategy: CallbackStrategy,
) -> CallbackReport {
    let action = CallbackAction::from_data(&event.data);
    let status = action.status_text();
    let mut failures = Vec::new();

    if let Some(msg) = event.message {
        match strategy {
            CallbackStrategy::EditText if !status.is_empty() => {
                let plain = action.plain_status_text();
                let text = match event.original_message_text.as_deref() {
                    Some(original) if !original.trim().is_empty() => format!("{}\n\n{}", original, plain),
                    _ => plain.to_string(),
                };
                if let Err(e) = bot
                    .edit_message_text(msg.chat_id, msg.message_id, &text, InlineKeyboardMarkup::empty())
                    .await
                {
                    failures.push(e);
                    // the keyboard must still go
                    if let Err(e) = bot
                        .edit_message_reply_markup(msg.chat_id, msg.message_id, InlineKeyboardMarkup::empty())
                        .await
                    {
                        failures.push(e);
                    }
                }
            }
            _ => {
                if let Err(e) = bot
                    .edit_message_reply_markup(msg.chat_id, msg.message_id, InlineKeyboardMarkup::empty())
                    .await
                {
                    failures.push(e);
                }
                if !status.is_empty() {
                    if let Err(e) = bot.send_message(&msg.chat_id.to_string(), status, None).await {
                        failures.push(e);
                    }
                }
            }
        }
    }

    let acknowledged = match bot.answer_callback_query(&event.callback_query_id).await {
        Ok(()) => true,
        Err(e) => {
            failures.push(e);
            false
        }
    };

    info!(
        callback_query_id = %event.callback_query_id,
        action = ?action,
        acknowledged,
        "callback handled"
    );

    CallbackReport {
        action,
        acknowledged,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TelegramConfig;
    use crate::models::MessageRef;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PHOTO: &str = "data:image/jpeg;base64,/9j/AA==";

    fn bot(server: &MockServer) -> TelegramBot {
        let config = TelegramConfig::new(Some("TOKEN"), Some("100"), &server.uri());
        TelegramBot::new(TelegramBot::http_client(&config).unwrap(), &config).unwrap()
    }

    fn ok_message() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": { "message_id": 9 } }))
    }

    fn ok_true() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": true }))
    }

    fn rejected() -> ResponseTemplate {
        ResponseTemplate::new(400).set_body_json(json!({ "ok": false, "description": "Bad Request" }))
    }

    async fn mount(server: &MockServer, api_method: &str, response: ResponseTemplate, times: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/botTOKEN/{}", api_method)))
            .respond_with(response)
            .expect(times)
            .mount(server)
            .await;
    }

    fn event(data: &str) -> CallbackEvent {
        CallbackEvent {
            callback_query_id: "cbq".into(),
            message: Some(MessageRef { chat_id: -5, message_id: 9 }),
            data: data.into(),
            original_message_text: Some("📋 Новый замер".into()),
        }
    }

    #[tokio::test]
    async fn text_only_submission_is_one_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .and(body_partial_json(json!({
                "chat_id": "100",
                "reply_markup": { "inline_keyboard": [[
                    { "callback_data": "order_confirmed" },
                    { "callback_data": "order_rejected" }
                ]] }
            })))
            .respond_with(ok_message())
            .expect(1)
            .mount(&server)
            .await;

        let report = deliver(&bot(&server), "100", "text", &[]).await.unwrap();
        assert_eq!(report.message_id, Some(9));
        assert_eq!(report.photos_sent, 0);
        assert!(report.photo_failures.is_empty());
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_text_message_skips_photos() {
        let server = MockServer::start().await;
        mount(&server, "sendMessage", rejected(), 1).await;
        mount(&server, "sendMediaGroup", ok_true(), 0).await;
        mount(&server, "sendPhoto", ok_true(), 0).await;

        let err = deliver(&bot(&server), "100", "text", &[PHOTO.to_string(), PHOTO.to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream(TelegramError::Api { status: 400, .. })));
    }

    #[tokio::test]
    async fn photo_failures_do_not_fail_delivery() {
        let server = MockServer::start().await;
        mount(&server, "sendMessage", ok_message(), 1).await;
        mount(&server, "sendMediaGroup", rejected(), 2).await;
        mount(&server, "sendPhoto", rejected(), 1).await;

        let photos = vec![PHOTO.to_string(); 21];
        let report = deliver(&bot(&server), "100", "text", &photos).await.unwrap();

        assert_eq!(report.photos_sent, 0);
        assert_eq!(report.photo_failures.len(), 3);
        let failed: usize = report.photo_failures.iter().map(|f| f.photos.len()).sum();
        assert_eq!(failed, 21);
    }

    #[tokio::test]
    async fn photos_are_chunked_into_albums() {
        let server = MockServer::start().await;
        mount(&server, "sendMessage", ok_message(), 1).await;
        mount(&server, "sendMediaGroup", ok_true(), 2).await;
        mount(&server, "sendPhoto", ok_true(), 0).await;

        let photos = vec![PHOTO.to_string(); 12];
        let report = deliver(&bot(&server), "100", "text", &photos).await.unwrap();
        assert_eq!(report.photos_sent, 12);
        assert!(report.photo_failures.is_empty());
    }

    #[tokio::test]
    async fn undecodable_photo_is_reported_and_the_rest_still_go_out() {
        let server = MockServer::start().await;
        mount(&server, "sendMessage", ok_message(), 1).await;
        mount(&server, "sendPhoto", ok_true(), 1).await;

        let photos = vec!["not-a-photo".to_string(), PHOTO.to_string()];
        let report = deliver(&bot(&server), "100", "text", &photos).await.unwrap();

        assert_eq!(report.photos_sent, 1);
        assert_eq!(report.photo_failures.len(), 1);
        assert_eq!(report.photo_failures[0].photos, vec![0]);
        assert!(matches!(report.photo_failures[0].error, TelegramError::InvalidPhoto { index: 0, .. }));
    }

    #[tokio::test]
    async fn confirmed_removes_keyboard_posts_status_and_answers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/editMessageReplyMarkup"))
            .and(body_partial_json(json!({
                "chat_id": "-5",
                "message_id": 9,
                "reply_markup": { "inline_keyboard": [] }
            })))
            .respond_with(ok_true())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .and(body_partial_json(json!({ "chat_id": "-5", "text": "✅ *Заказ полотна выполнен*" })))
            .respond_with(ok_message())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/answerCallbackQuery"))
            .and(body_partial_json(json!({ "callback_query_id": "cbq" })))
            .respond_with(ok_true())
            .expect(1)
            .mount(&server)
            .await;

        let report = handle_callback(&bot(&server), &event("order_confirmed"), CallbackStrategy::StatusMessage).await;
        assert_eq!(report.action, CallbackAction::OrderConfirmed);
        assert!(report.acknowledged);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn rejected_posts_rejection_status() {
        let server = MockServer::start().await;
        mount(&server, "editMessageReplyMarkup", ok_true(), 1).await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .and(body_partial_json(json!({ "text": "❌ *Отказ от работ*" })))
            .respond_with(ok_message())
            .expect(1)
            .mount(&server)
            .await;
        mount(&server, "answerCallbackQuery", ok_true(), 1).await;

        let report = handle_callback(&bot(&server), &event("order_rejected"), CallbackStrategy::StatusMessage).await;
        assert_eq!(report.action, CallbackAction::OrderRejected);
        assert!(report.acknowledged);
    }

    #[tokio::test]
    async fn unknown_data_is_still_acknowledged() {
        let server = MockServer::start().await;
        mount(&server, "editMessageReplyMarkup", ok_true(), 1).await;
        mount(&server, "sendMessage", ok_message(), 0).await;
        mount(&server, "answerCallbackQuery", ok_true(), 1).await;

        let report = handle_callback(&bot(&server), &event("something_else"), CallbackStrategy::StatusMessage).await;
        assert_eq!(report.action, CallbackAction::Unknown("something_else".into()));
        assert!(report.acknowledged);
    }

    #[tokio::test]
    async fn edit_failures_are_collected_and_answer_still_happens() {
        let server = MockServer::start().await;
        mount(&server, "editMessageReplyMarkup", rejected(), 1).await;
        mount(&server, "sendMessage", rejected(), 1).await;
        mount(&server, "answerCallbackQuery", ok_true(), 1).await;

        let report = handle_callback(&bot(&server), &event("order_confirmed"), CallbackStrategy::StatusMessage).await;
        assert!(report.acknowledged);
        assert_eq!(report.failures.len(), 2);
    }

    #[tokio::test]
    async fn edit_text_strategy_appends_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/editMessageText"))
            .and(body_partial_json(json!({
                "chat_id": "-5",
                "message_id": 9,
                "text": "📋 Новый замер\n\n❌ Отказ от работ",
                "reply_markup": { "inline_keyboard": [] }
            })))
            .respond_with(ok_true())
            .expect(1)
            .mount(&server)
            .await;
        mount(&server, "editMessageReplyMarkup", ok_true(), 0).await;
        mount(&server, "sendMessage", ok_message(), 0).await;
        mount(&server, "answerCallbackQuery", ok_true(), 1).await;

        let report = handle_callback(&bot(&server), &event("order_rejected"), CallbackStrategy::EditText).await;
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn failed_text_edit_still_removes_the_keyboard() {
        let server = MockServer::start().await;
        mount(
            &server,
            "editMessageText",
            ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "description": "Bad Request: can't parse entities"
            })),
            1,
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/editMessageReplyMarkup"))
            .and(body_partial_json(json!({
                "chat_id": "-5",
                "message_id": 9,
                "reply_markup": { "inline_keyboard": [] }
            })))
            .respond_with(ok_true())
            .expect(1)
            .mount(&server)
            .await;
        mount(&server, "sendMessage", ok_message(), 0).await;
        mount(&server, "answerCallbackQuery", ok_true(), 1).await;

        let mut ev = event("order_rejected");
        ev.original_message_text = Some("📋 Новый замер\n🏠 Адрес: ул. 1_я".into());
        let report = handle_callback(&bot(&server), &ev, CallbackStrategy::EditText).await;
        assert!(report.acknowledged);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0], TelegramError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn text_message_without_envelope_still_counts_as_sent() {
        let server = MockServer::start().await;
        mount(&server, "sendMessage", ResponseTemplate::new(200).set_body_string("OK"), 1).await;
        mount(&server, "sendPhoto", ok_true(), 1).await;

        let report = deliver(&bot(&server), "100", "text", &[PHOTO.to_string()]).await.unwrap();
        assert_eq!(report.message_id, None);
        assert_eq!(report.photos_sent, 1);
    }

    #[tokio::test]
    async fn unreachable_api_error_hides_the_token() {
        let config = TelegramConfig::new(Some("123:SECRET"), Some("100"), "http://127.0.0.1:1");
        let bot = TelegramBot::new(TelegramBot::http_client(&config).unwrap(), &config).unwrap();

        let err = deliver(&bot, "100", "text", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(TelegramError::Http(_))));
        assert!(!err.to_string().contains("SECRET"));
    }

    #[tokio::test]
    async fn inline_message_only_gets_answered() {
        let server = MockServer::start().await;
        mount(&server, "editMessageReplyMarkup", ok_true(), 0).await;
        mount(&server, "answerCallbackQuery", ok_true(), 1).await;

        let mut ev = event("order_confirmed");
        ev.message = None;
        let report = handle_callback(&bot(&server), &ev, CallbackStrategy::StatusMessage).await;
        assert!(report.acknowledged);
    }
}
