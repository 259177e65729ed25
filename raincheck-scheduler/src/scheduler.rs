/// Reminder scheduler
///
/// This module implements the periodic scan loop. Each iteration runs one
/// reminder scan against the database and dispatches due notifications
/// through the push gateway.
///
/// # Architecture
///
/// ```text
/// ReminderScheduler
///   ├─> reminders::find_candidates: Pull eligible tasks
///   ├─> reminders::select_due: Evaluate the window
///   ├─> PushGateway: Dispatch notifications
///   └─> Task::mark_notified: Stamp dispatched tasks
/// ```
///
/// A failed iteration is logged and the loop keeps going; only shutdown
/// stops it. The scan interval should not exceed the reminder window, or
/// tasks can slip through unscanned.
///
/// # Example
///
/// ```no_run
/// use raincheck_scheduler::scheduler::ReminderScheduler;
/// use raincheck_shared::push::MockPushGateway;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example(pool: PgPool) -> anyhow::Result<()> {
/// let gateway = Arc::new(MockPushGateway::new());
/// let scheduler = ReminderScheduler::new(pool, gateway);
///
/// scheduler.run().await?;
/// # Ok(())
/// # }
/// ```

use chrono::Utc;
use raincheck_shared::push::PushGateway;
use raincheck_shared::reminders;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

/// Reminder scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Seconds between scan iterations
    pub interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig { interval_secs: 60 }
    }
}

/// Periodic reminder scanner
pub struct ReminderScheduler {
    /// Database connection pool
    db: PgPool,

    /// Push notification gateway
    push: Arc<dyn PushGateway>,

    /// Configuration
    config: SchedulerConfig,

    /// Shutdown token
    shutdown_token: CancellationToken,
}

impl ReminderScheduler {
    /// Creates a scheduler with the default interval
    pub fn new(db: PgPool, push: Arc<dyn PushGateway>) -> Self {
        Self::with_config(db, push, SchedulerConfig::default())
    }

    /// Creates a scheduler with custom configuration
    pub fn with_config(db: PgPool, push: Arc<dyn PushGateway>, config: SchedulerConfig) -> Self {
        ReminderScheduler {
            db,
            push,
            config,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Gets shutdown token
    ///
    /// Used to signal graceful shutdown from external handlers.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Runs the scan loop until shutdown
    ///
    /// Scan failures do not stop the loop; they are logged and the next
    /// iteration runs on schedule.
    pub async fn run(&self) -> anyhow::Result<()> {
        tracing::info!(
            interval_secs = self.config.interval_secs,
            "Reminder scheduler starting"
        );

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    tracing::info!("Shutdown requested, reminder scheduler stopping");
                    break;
                }
                _ = sleep(Duration::from_secs(self.config.interval_secs)) => {
                    self.scan_once().await;
                }
            }
        }

        Ok(())
    }

    /// Runs a single scan iteration, absorbing errors
    async fn scan_once(&self) {
        match reminders::run_scan(&self.db, self.push.as_ref(), Utc::now()).await {
            Ok(outcome) => {
                if outcome.due > 0 {
                    tracing::info!(
                        due = outcome.due,
                        attempted = outcome.attempted,
                        delivered = outcome.delivered,
                        failed = outcome.failed,
                        "Scan iteration dispatched reminders"
                    );
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Scan iteration failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.interval_secs, 60);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancellation() {
        let db = PgPool::connect_lazy("postgresql://localhost/unused").unwrap();
        let push = Arc::new(raincheck_shared::push::MockPushGateway::new());
        let scheduler = ReminderScheduler::with_config(
            db,
            push,
            SchedulerConfig { interval_secs: 3600 },
        );

        let token = scheduler.shutdown_token();
        token.cancel();

        // Returns promptly because the token is already cancelled
        scheduler.run().await.unwrap();
    }
}
