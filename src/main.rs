use actix_cors::Cors;
use actix_web::middleware::NormalizePath;
use actix_web::{web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zamerschik::config::{AppConfig, TelegramConfig};
use zamerschik::handlers;
use zamerschik::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let app_config = AppConfig::from_env();
    let telegram_config = TelegramConfig::from_env();
    if let Err(e) = telegram_config.credentials() {
        warn!(error = %e, "Telegram credentials missing, submissions will be rejected");
    }
    info!(config = ?telegram_config, "starting measurement intake");

    let app_state = AppState::new(telegram_config)
        .map(web::Data::new)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let max_body_bytes = app_config.max_body_bytes;
    HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::trim())
            .wrap(Cors::permissive())
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(max_body_bytes))
            .route("/health", web::get().to(handlers::health_check))
            .route("/api/send-telegram", web::post().to(handlers::send::send_telegram))
            .route("/api/telegram-webhook", web::post().to(handlers::webhook::telegram_webhook))
    })
    .bind((app_config.host.as_str(), app_config.port))?
    .run()
    .await
}
