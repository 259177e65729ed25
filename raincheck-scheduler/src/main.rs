//! # RainCheck Scheduler
//!
//! Standalone reminder scanner for deployments without an external cron
//! service hitting the API's trigger endpoint. It shares the scan logic and
//! push gateway with the API server.
//!
//! ## Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `FCM_SERVICE_ACCOUNT`: Service-account key JSON for push delivery (required)
//! - `SCAN_INTERVAL_SECS`: Seconds between scans (default: 60)
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p raincheck-scheduler
//! ```

use raincheck_scheduler::scheduler::{ReminderScheduler, SchedulerConfig};
use raincheck_shared::{
    db::pool,
    push::{FcmClient, ServiceAccount},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "raincheck_scheduler=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "RainCheck Scheduler v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

    let service_account_json = std::env::var("FCM_SERVICE_ACCOUNT")
        .map_err(|_| anyhow::anyhow!("FCM_SERVICE_ACCOUNT environment variable is required"))?;

    let interval_secs = std::env::var("SCAN_INTERVAL_SECS")
        .unwrap_or_else(|_| "60".to_string())
        .parse::<u64>()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: database_url,
        ..Default::default()
    })
    .await?;

    let service_account = ServiceAccount::from_json(&service_account_json)?;
    let push = Arc::new(FcmClient::new(service_account)?);

    let scheduler = ReminderScheduler::with_config(db, push, SchedulerConfig { interval_secs });
    let shutdown_token = scheduler.shutdown_token();

    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutdown signal received, exiting...");
        shutdown_token.cancel();
    });

    scheduler.run().await?;

    Ok(())
}
