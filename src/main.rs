use std::env;
use std::sync::Arc;

mod app;
mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod plants;
mod response;
mod views;

use app::{AppState, build_router};
use auth::provider::TwitterProvider;
use auth::session::SessionManager;
use config::Config;
use db::repositories::UserRepository;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Defaults used when RUST_LOG is not set
        tracing_subscriber::EnvFilter::new(
            "info,plant_tracker=debug,hyper_util=warn,tower_http=info",
        )
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// ----------------- Main -----------------

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    setup_logging();
    tracing::info!("Starting plant-tracker...");

    let config = Config::from_env()?;

    let database = db::connection::connect(&config.database_url).await?;
    let users = Arc::new(UserRepository::new(&database));
    let identity = Arc::new(TwitterProvider::new(&config.twitter)?);
    let sessions = SessionManager::new(
        &config.session_secret,
        config.session_ttl_hours,
        config.is_production(),
    );

    let app = build_router(AppState::new(sessions, users, identity));

    if env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
        tracing::info!("Running in Lambda mode");
        lambda_http::run(app).await
    } else {
        tracing::info!("Running in local HTTP server mode");
        let addr = format!("{}:{}", config.server_host, config.server_port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("🚀 Server running at http://{}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
