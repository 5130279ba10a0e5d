mod app;
mod attendees;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod events;
mod extract;
mod state;
#[cfg(test)]
mod testing;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "eventhub=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set; signing tokens with the built-in default secret");
    }
    let addr = config.socket_addr()?;

    let app_state = AppState::init(config).await?;
    let app = app::build_app(app_state);

    app::serve(app, addr).await
}
