use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::error;

use crate::error::AppError;
use crate::i18n;
use crate::models::SendTelegramRequest;
use crate::services::delivery::{self, DeliveryReport};
use crate::state::AppState;

// POST /api/send-telegram
pub async fn send_telegram(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> HttpResponse {
    let locale = i18n::detect_locale(&req);

    match relay(&state, &body).await {
        Ok(report) => {
            report.log_failures();
            HttpResponse::Ok().json(json!({ "success": true }))
        }
        Err(e) => {
            error!(error = %e, "failed to send measurement to Telegram");
            HttpResponse::InternalServerError().json(json!({
                "error": i18n::send_error_message(locale, &e)
            }))
        }
    }
}

async fn relay(state: &AppState, body: &[u8]) -> Result<DeliveryReport, AppError> {
    // Credentials first: a misconfigured server must not touch the network.
    let (_, chat_id) = state.telegram.credentials()?;
    let bot = state.bot()?;

    let request: SendTelegramRequest =
        serde_json::from_slice(body).map_err(|e| AppError::Parse(e.to_string()))?;

    delivery::deliver(&bot, chat_id, &request.message, &request.photos).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TelegramConfig;
    use actix_web::{test, App};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_state(token: Option<&str>, chat_id: Option<&str>, api_base: &str) -> web::Data<AppState> {
        web::Data::new(AppState::new(TelegramConfig::new(token, chat_id, api_base)).unwrap())
    }

    #[actix_web::test]
    async fn reference_submission_sends_one_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": { "message_id": 1 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = test::init_service(
            App::new()
                .app_data(app_state(Some("TOKEN"), Some("7"), &server.uri()))
                .route("/api/send-telegram", web::post().to(send_telegram)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/send-telegram")
            .set_json(serde_json::json!({ "message": "📋 *Новый замер*", "photos": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, serde_json::json!({ "success": true }));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn missing_configuration_makes_no_calls() {
        let server = MockServer::start().await;

        let app = test::init_service(
            App::new()
                .app_data(app_state(None, Some("7"), &server.uri()))
                .route("/api/send-telegram", web::post().to(send_telegram)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/send-telegram?lang=en")
            .set_json(serde_json::json!({ "message": "hi", "photos": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 500);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("not configured"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn missing_chat_id_makes_no_calls() {
        let server = MockServer::start().await;

        let app = test::init_service(
            App::new()
                .app_data(app_state(Some("TOKEN"), None, &server.uri()))
                .route("/api/send-telegram", web::post().to(send_telegram)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/send-telegram")
            .set_json(serde_json::json!({ "message": "hi", "photos": ["data:image/png;base64,aGVsbG8="] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 500);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("TELEGRAM_CHAT_ID"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn upstream_rejection_is_a_500() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "ok": false,
                "description": "Forbidden: bot was kicked"
            })))
            .mount(&server)
            .await;

        let app = test::init_service(
            App::new()
                .app_data(app_state(Some("TOKEN"), Some("7"), &server.uri()))
                .route("/api/send-telegram", web::post().to(send_telegram)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/send-telegram")
            .set_json(serde_json::json!({ "message": "hi", "photos": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 500);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Не удалось отправить сообщение");
    }

    #[actix_web::test]
    async fn malformed_body_is_a_500() {
        let server = MockServer::start().await;

        let app = test::init_service(
            App::new()
                .app_data(app_state(Some("TOKEN"), Some("7"), &server.uri()))
                .route("/api/send-telegram", web::post().to(send_telegram)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/send-telegram")
            .insert_header(("content-type", "application/json"))
            .set_payload("{ nope")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 500);
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
