//! # RainCheck API Server
//!
//! This is the main API server for RainCheck, a personal to-do application
//! with AI-suggested completion times and push-notification reminders.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Task CRUD endpoints scoped to the authenticated user
//! - Authentication (register, login, token refresh)
//! - Push device token registration
//! - AI completion-time suggestions and a chat assistant
//! - A cron-triggered reminder scan
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p raincheck-api
//! ```

use raincheck_api::{
    app::{build_router, AppState},
    config::Config,
};
use raincheck_shared::{
    db::{migrations, pool},
    push::{FcmClient, ServiceAccount},
    suggest::GeminiClient,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "raincheck_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "RainCheck API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    // Connect to the database and bring the schema up to date
    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    // Credential problems in either external service fail startup here
    let service_account = ServiceAccount::from_json(&config.push.service_account_json)?;
    let push = Arc::new(FcmClient::new(service_account)?);

    // One Gemini client serves both the suggestion and assistant flows
    let gemini = Arc::new(GeminiClient::new(config.suggest.api_key.clone()));

    let bind_address = config.bind_address();
    let state = AppState::new(db, config, push, gemini.clone(), gemini);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting...");
        })
        .await?;

    Ok(())
}
