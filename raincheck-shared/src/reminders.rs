/// Reminder scanning and dispatch
///
/// Finds incomplete tasks whose suggested completion time falls inside the
/// reminder window (now through five minutes from now, inclusive) and pushes
/// a notification to every device token registered by the task's owner.
///
/// Suggested times are free text produced by the model, so candidates are
/// pulled from the database with a coarse SQL filter and the window check
/// happens here after parsing. Tasks that cannot be parsed as a timestamp
/// are skipped silently.
///
/// A dispatched task is stamped with `last_notified_at` so overlapping scan
/// runs do not notify it twice.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use sqlx::postgres::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::task::Task;
use crate::push::{PushError, PushGateway, PushMessage};

/// Width of the reminder window in minutes
pub const REMINDER_WINDOW_MINUTES: i64 = 5;

/// Notification title for every reminder
pub const REMINDER_TITLE: &str = "Task Reminder";

/// Link opened when a reminder notification is tapped
pub const REMINDER_LINK: &str = "/";

/// Error type for reminder scanning
#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    /// Database error during candidate lookup or stamping
    #[error("Reminder database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Gateway-level push failure
    #[error("Reminder push error: {0}")]
    Push(#[from] PushError),
}

/// A task eligible for reminder evaluation, joined with its owner's tokens
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReminderCandidate {
    /// Task ID
    pub task_id: Uuid,

    /// Task title, interpolated into the notification body
    pub title: String,

    /// Raw suggested completion time text
    pub suggested_time: String,

    /// Device tokens registered by the task's owner
    pub fcm_tokens: Vec<String>,
}

/// Counts from one scan run
///
/// `attempted` is the number of notifications handed to the gateway and is
/// what the cron trigger reports as `sent`; per-token rejections lower
/// `delivered`, never `attempted`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Candidates examined
    pub examined: usize,

    /// Tasks whose suggested time fell inside the window
    pub due: usize,

    /// Notifications handed to the gateway
    pub attempted: usize,

    /// Notifications accepted by the gateway
    pub delivered: usize,

    /// Notifications rejected per-token
    pub failed: usize,
}

impl ScanOutcome {
    /// Combines the pre-dispatch counts with the gateway's batch summary
    pub fn from_dispatch(
        examined: usize,
        due: usize,
        attempted: usize,
        summary: &crate::push::BatchSummary,
    ) -> Self {
        Self {
            examined,
            due,
            attempted,
            delivered: summary.success_count,
            failed: summary.failure_count,
        }
    }
}

/// Parses a free-text suggested time into a UTC timestamp
///
/// Accepts RFC 3339, RFC 2822, and common naive forms (`2024-06-01 18:00`,
/// with or without seconds, space or `T` separator). Naive timestamps are
/// interpreted as UTC. Returns `None` for anything else.
pub fn parse_suggested_time(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t.with_timezone(&Utc));
    }

    if let Ok(t) = DateTime::parse_from_rfc2822(text) {
        return Some(t.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    None
}

/// Returns true when `suggested` falls inside the reminder window
///
/// The window is inclusive on both ends: a task due exactly now or exactly
/// five minutes from now is due.
pub fn is_due(suggested: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let window_end = now + Duration::minutes(REMINDER_WINDOW_MINUTES);
    suggested >= now && suggested <= window_end
}

/// Builds the notification fan-out for one due task
///
/// One message per registered device token.
pub fn build_notifications(candidate: &ReminderCandidate) -> Vec<PushMessage> {
    let body = format!("Your task \"{}\" is due soon.", candidate.title);

    candidate
        .fcm_tokens
        .iter()
        .map(|token| PushMessage {
            token: token.clone(),
            title: REMINDER_TITLE.to_string(),
            body: body.clone(),
            link: REMINDER_LINK.to_string(),
        })
        .collect()
}

/// Filters candidates down to those due at `now`
///
/// Unparseable suggested times are dropped here; they stay in the table and
/// are re-examined on the next scan.
pub fn select_due(candidates: Vec<ReminderCandidate>, now: DateTime<Utc>) -> Vec<ReminderCandidate> {
    candidates
        .into_iter()
        .filter(|candidate| match parse_suggested_time(&candidate.suggested_time) {
            Some(t) => is_due(t, now),
            None => {
                debug!(
                    task_id = %candidate.task_id,
                    "Skipping task with unparseable suggested time"
                );
                false
            }
        })
        .collect()
}

/// Fetches tasks eligible for reminder evaluation
///
/// Coarse filter only: incomplete, has a suggested time, not already
/// notified within the window, owner has at least one registered token.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn find_candidates(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<Vec<ReminderCandidate>, sqlx::Error> {
    let notified_cutoff = now - Duration::minutes(REMINDER_WINDOW_MINUTES);

    sqlx::query_as::<_, ReminderCandidate>(
        r#"
        SELECT t.id AS task_id, t.title, t.suggested_time, u.fcm_tokens
        FROM tasks t
        JOIN users u ON u.id = t.owner_id
        WHERE t.completed = FALSE
          AND t.suggested_time IS NOT NULL
          AND (t.last_notified_at IS NULL OR t.last_notified_at < $1)
          AND array_length(u.fcm_tokens, 1) > 0
        "#,
    )
    .bind(notified_cutoff)
    .fetch_all(pool)
    .await
}

/// Runs one reminder scan at the given instant
///
/// Fetches candidates, evaluates the window, dispatches notifications for
/// due tasks, and stamps them as notified. Returns counts for logging and
/// the cron trigger's response.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the push gateway
/// fails at the gateway level. Per-token push failures are counted, not
/// propagated.
pub async fn run_scan(
    pool: &PgPool,
    gateway: &dyn PushGateway,
    now: DateTime<Utc>,
) -> Result<ScanOutcome, ReminderError> {
    let candidates = find_candidates(pool, now).await?;
    let examined = candidates.len();

    let due = select_due(candidates, now);

    if due.is_empty() {
        debug!(examined, "Reminder scan found nothing due");
        return Ok(ScanOutcome {
            examined,
            due: 0,
            ..Default::default()
        });
    }

    let messages: Vec<PushMessage> = due.iter().flat_map(build_notifications).collect();
    let summary = gateway.send_each(&messages).await?;

    let outcome = ScanOutcome::from_dispatch(examined, due.len(), messages.len(), &summary);

    if summary.failure_count > 0 {
        warn!(
            failed = summary.failure_count,
            "Some reminder notifications were rejected"
        );
    }

    let notified_ids: Vec<Uuid> = due.iter().map(|c| c.task_id).collect();
    Task::mark_notified(pool, &notified_ids, now).await?;

    info!(
        examined = outcome.examined,
        due = outcome.due,
        attempted = outcome.attempted,
        delivered = outcome.delivered,
        failed = outcome.failed,
        "Reminder scan complete"
    );

    Ok(outcome)
}
