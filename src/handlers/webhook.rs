use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{debug, error};

use crate::models::Update;
use crate::services::delivery;
use crate::state::AppState;

// POST /api/telegram-webhook
//
// Anything past parsing is best-effort: Telegram only needs a 200 so it
// stops redelivering the update.
pub async fn telegram_webhook(body: web::Bytes, state: web::Data<AppState>) -> HttpResponse {
    let update = match Update::parse(&body) {
        Ok(update) => update,
        Err(e) => {
            error!(error = %e, "Error handling webhook");
            return webhook_error();
        }
    };

    let event = match update {
        Update::CallbackQuery(event) => event,
        Update::Ignored => {
            debug!("ignoring non-callback update");
            return HttpResponse::Ok().json(json!({ "success": true }));
        }
    };

    let bot = match state.bot() {
        Ok(bot) => bot,
        Err(e) => {
            error!(error = %e, "Error handling webhook");
            return webhook_error();
        }
    };

    let report = delivery::handle_callback(&bot, &event, state.telegram.callback_strategy).await;
    report.log_failures(&event.callback_query_id);

    HttpResponse::Ok().json(json!({ "success": true }))
}

fn webhook_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({ "error": "Webhook error" }))
}
