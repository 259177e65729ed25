/// Task CRUD endpoints
///
/// All handlers here run behind the JWT layer and scope every database
/// operation to the authenticated user. A task belonging to someone else is
/// indistinguishable from a task that does not exist: both produce 404.
///
/// Request bodies are strict schemas: unknown fields are rejected with 400.
/// Create never accepts a `completed` field; new tasks always start
/// incomplete.
///
/// # Endpoints
///
/// - `GET    /api/tasks` - List the caller's tasks, newest first
/// - `POST   /api/tasks` - Create a task
/// - `PUT    /api/tasks/:id` - Partially update a task
/// - `DELETE /api/tasks/:id` - Delete a task

use crate::{
    app::AppState,
    error::{decode_body, validation_details, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use raincheck_shared::{
    auth::middleware::AuthContext,
    models::task::{CreateTask, Task, UpdateTask},
};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional suggested completion time (free text)
    pub suggested_time: Option<String>,

    /// Optional reasoning for the suggested time
    pub reasoning: Option<String>,
}

/// Update task request
///
/// Absent fields are left unchanged; explicit `null` clears a nullable
/// field. The two are told apart with a double-`Option`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New description (null clears)
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    /// New completion state
    pub completed: Option<bool>,

    /// New suggested time (null clears)
    #[serde(default, deserialize_with = "double_option")]
    pub suggested_time: Option<Option<String>>,

    /// New reasoning (null clears)
    #[serde(default, deserialize_with = "double_option")]
    pub reasoning: Option<Option<String>>,
}

/// Deserializes a field that distinguishes "absent" from "null"
///
/// serde only calls this when the key is present, so presence becomes the
/// outer `Some` and the JSON value (possibly null) becomes the inner option.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Lists all tasks owned by the caller, newest first
///
/// # Endpoint
///
/// ```text
/// GET /api/tasks
/// Authorization: Bearer <access token>
/// ```
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list_for_owner(&state.db, auth.user_id).await?;
    Ok(Json(tasks))
}

/// Creates a new task for the caller
///
/// The owner is always the authenticated user; it cannot be set from the
/// body. The created task starts incomplete.
///
/// # Endpoint
///
/// ```text
/// POST /api/tasks
/// Authorization: Bearer <access token>
/// Content-Type: application/json
///
/// {
///   "title": "Water plants",
///   "description": "The ferns on the balcony",
///   "suggestedTime": "2024-06-01T18:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or unknown field present
/// - `401 Unauthorized`: Missing or invalid access token
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let req: CreateTaskRequest = decode_body(body)?;

    req.validate()
        .map_err(|e| ApiError::ValidationError(validation_details(&e)))?;

    let task = Task::create(
        &state.db,
        CreateTask {
            owner_id: auth.user_id,
            title: req.title,
            description: req.description,
            suggested_time: req.suggested_time,
            reasoning: req.reasoning,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Partially updates a task owned by the caller
///
/// # Endpoint
///
/// ```text
/// PUT /api/tasks/:id
/// Authorization: Bearer <access token>
/// Content-Type: application/json
///
/// { "completed": true }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or unknown field present
/// - `401 Unauthorized`: Missing or invalid access token
/// - `404 Not Found`: Task absent or owned by another user
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<Json<Task>> {
    let req: UpdateTaskRequest = decode_body(body)?;

    req.validate()
        .map_err(|e| ApiError::ValidationError(validation_details(&e)))?;

    let task = Task::update_for_owner(
        &state.db,
        id,
        auth.user_id,
        UpdateTask {
            title: req.title,
            description: req.description,
            completed: req.completed,
            suggested_time: req.suggested_time,
            reasoning: req.reasoning,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Delete response
#[derive(Debug, serde::Serialize)]
pub struct DeleteTaskResponse {
    /// Confirmation message
    pub message: String,
}

/// Deletes a task owned by the caller
///
/// Hard delete; there is no soft-delete or tombstone.
///
/// # Endpoint
///
/// ```text
/// DELETE /api/tasks/:id
/// Authorization: Bearer <access token>
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid access token
/// - `404 Not Found`: Task absent or owned by another user
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    let deleted = Task::delete_for_owner(&state.db, id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(Json(DeleteTaskResponse {
        message: "Task deleted".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_request_distinguishes_absent_from_null() {
        let req: UpdateTaskRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.description.is_none());

        let req: UpdateTaskRequest =
            serde_json::from_value(json!({ "description": null })).unwrap();
        assert_eq!(req.description, Some(None));

        let req: UpdateTaskRequest =
            serde_json::from_value(json!({ "description": "groceries" })).unwrap();
        assert_eq!(req.description, Some(Some("groceries".to_string())));
    }

    #[test]
    fn test_create_request_rejects_completed_field() {
        let result = serde_json::from_value::<CreateTaskRequest>(json!({
            "title": "Water plants",
            "completed": true
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_request_uses_camel_case() {
        let req: CreateTaskRequest = serde_json::from_value(json!({
            "title": "Water plants",
            "suggestedTime": "2024-06-01T18:00:00Z"
        }))
        .unwrap();
        assert_eq!(req.suggested_time.as_deref(), Some("2024-06-01T18:00:00Z"));
    }

    #[test]
    fn test_update_request_rejects_unknown_fields() {
        let result =
            serde_json::from_value::<UpdateTaskRequest>(json!({ "ownerId": "someone-else" }));
        assert!(result.is_err());
    }
}
