/// AI completion-time suggestion endpoint
///
/// Forwards the task details plus the current wall-clock time to the
/// configured suggestion service and returns its answer verbatim. Upstream
/// failures never leak provider details to the client; they surface as a
/// generic 503.
///
/// # Endpoint
///
/// ```text
/// POST /api/suggest
/// Authorization: Bearer <access token>
/// Content-Type: application/json
///
/// {
///   "taskTitle": "Water plants",
///   "taskDescription": "The ferns on the balcony"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "suggestedCompletionTime": "Today at 6:00 PM",
///   "reasoning": "Watering in the evening avoids midday heat."
/// }
/// ```

use crate::{
    app::AppState,
    error::{decode_body, validation_details, ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use chrono::Utc;
use raincheck_shared::{
    auth::middleware::AuthContext,
    suggest::{Suggestion, SuggestionInput},
};
use serde::Deserialize;
use validator::Validate;

/// Suggestion request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SuggestRequest {
    /// Title of the task to schedule
    #[validate(length(min = 1, max = 255, message = "Task title must be 1-255 characters"))]
    pub task_title: String,

    /// Optional description
    pub task_description: Option<String>,
}

/// Requests a completion-time suggestion for a task
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or unknown field present
/// - `401 Unauthorized`: Missing or invalid access token
/// - `503 Service Unavailable`: Suggestion service failed
pub async fn suggest_time(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<Json<Suggestion>> {
    let req: SuggestRequest = decode_body(body)?;

    req.validate()
        .map_err(|e| ApiError::ValidationError(validation_details(&e)))?;

    let input = SuggestionInput {
        task_title: req.task_title,
        task_description: req.task_description.unwrap_or_default(),
        current_time: Utc::now()
            .format("%A, %B %-d, %Y at %-I:%M %p")
            .to_string(),
    };

    let suggestion = state.suggest.suggest(&input).await.map_err(|e| {
        tracing::error!("Suggestion service failed: {}", e);
        ApiError::ServiceUnavailable("Could not get a suggestion".to_string())
    })?;

    Ok(Json(suggestion))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_suggest_request_uses_camel_case() {
        let req: SuggestRequest = serde_json::from_value(json!({
            "taskTitle": "Water plants",
            "taskDescription": "The ferns"
        }))
        .unwrap();
        assert_eq!(req.task_title, "Water plants");
        assert_eq!(req.task_description.as_deref(), Some("The ferns"));
    }

    #[test]
    fn test_suggest_request_rejects_unknown_fields() {
        let result = serde_json::from_value::<SuggestRequest>(json!({
            "taskTitle": "x",
            "model": "something-else"
        }));
        assert!(result.is_err());
    }
}
