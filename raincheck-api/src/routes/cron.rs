/// Reminder scan trigger
///
/// An external scheduler calls this endpoint periodically. It is not a user
/// endpoint: the caller authenticates with the shared cron secret as a
/// Bearer credential, and the check happens before any database access.
///
/// # Endpoint
///
/// ```text
/// GET /api/cron/send-reminders
/// Authorization: Bearer <cron secret>
/// ```
///
/// # Response
///
/// ```json
/// {
///   "message": "Reminders checked",
///   "sent": 3
/// }
/// ```

use crate::{app::AppState, error::{ApiError, ApiResult}};
use axum::{extract::State, http::HeaderMap, Json};
use chrono::Utc;
use raincheck_shared::{auth::middleware::bearer_token, reminders};
use serde::Serialize;

/// Cron trigger response
#[derive(Debug, Serialize)]
pub struct SendRemindersResponse {
    /// Confirmation message
    pub message: String,

    /// Number of notifications attempted this scan; per-token delivery
    /// failures do not lower it
    pub sent: usize,
}

/// Runs one reminder scan
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or wrong cron secret
/// - `503 Service Unavailable`: Push gateway unreachable
pub async fn send_reminders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<SendRemindersResponse>> {
    let secret = bearer_token(&headers)?;

    if secret != state.cron_secret() {
        return Err(ApiError::Unauthorized("Invalid cron secret".to_string()));
    }

    let outcome = reminders::run_scan(&state.db, state.push.as_ref(), Utc::now()).await?;

    Ok(Json(SendRemindersResponse {
        message: "Reminders checked".to_string(),
        sent: outcome.attempted,
    }))
}
