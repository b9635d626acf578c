//! # Summer API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::cors::cors_policy;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Summer API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await?;
    let data = web::Data::new(state.clone());
    let upload_dir = state.uploads.dir.clone();
    let allowed_origins = config.cors_allowed_origins.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(cors_policy(&allowed_origins))
            .wrap(TracingLogger::default())
            .app_data(data.clone())
            .app_data(handlers::json_config())
            .app_data(handlers::query_config())
            .configure(handlers::configure_routes)
            .service(handlers::uploads_service(&upload_dir))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    state.shutdown().await;
    Ok(())
}
