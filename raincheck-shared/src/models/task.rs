/// Task model and database operations
///
/// This module provides the Task model representing a user-owned to-do item.
/// Tasks are the core entity of RainCheck.
///
/// Every read and write here is scoped by `owner_id`: a task is visible and
/// mutable only through queries that carry the owner's id. Handlers must use
/// the `*_for_owner` operations for any task-scoped request.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     suggested_time TEXT,
///     reasoning TEXT,
///     last_notified_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use raincheck_shared::models::task::{CreateTask, Task};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     owner_id,
///     title: "Pay rent".to_string(),
///     description: None,
///     suggested_time: None,
///     reasoning: None,
/// }).await?;
///
/// assert!(!task.completed);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, owner_id, title, description, completed, \
     suggested_time, reasoning, last_notified_at, created_at, updated_at";

/// Task model representing a user-owned to-do item
///
/// Serialized with camelCase field names; those names are the API contract
/// (`suggestedTime`, `ownerId`, ...), the column names are the storage layout.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// User who owns this task
    ///
    /// Exactly one owner, always. No task-scoped query runs without it.
    pub owner_id: Uuid,

    /// Task title (non-empty, bounded at 255 characters)
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Whether the task has been completed
    pub completed: bool,

    /// Suggested completion time as free text
    ///
    /// Usually AI-produced. Stored verbatim; only the reminder scanner
    /// attempts to parse it into a timestamp.
    pub suggested_time: Option<String>,

    /// Explanation of the suggested time (AI-produced)
    pub reasoning: Option<String>,

    /// When a reminder was last dispatched for this task
    ///
    /// Keeps overlapping reminder scans from re-notifying inside one window.
    pub last_notified_at: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
///
/// `completed` is not an input: new tasks always start incomplete.
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owning user (taken from the authenticated session, never the body)
    pub owner_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional suggested completion time (free text)
    pub suggested_time: Option<String>,

    /// Optional reasoning for the suggested time
    pub reasoning: Option<String>,
}

/// Input for partially updating a task
///
/// Outer `None` means "leave unchanged"; for nullable columns the inner
/// option distinguishes "set to value" from "clear".
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description (use Some(None) to clear)
    pub description: Option<Option<String>>,

    /// Toggle completion state
    pub completed: Option<bool>,

    /// New suggested time (use Some(None) to clear)
    pub suggested_time: Option<Option<String>>,

    /// New reasoning (use Some(None) to clear)
    pub reasoning: Option<Option<String>>,
}

impl Task {
    /// Creates a new task in the incomplete state
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (owner_id, title, description, suggested_time, reasoning) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {TASK_COLUMNS}"
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(data.owner_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.suggested_time)
            .bind(data.reasoning)
            .fetch_one(pool)
            .await?;

        Ok(task)
    }

    /// Finds a task by ID, scoped to its owner
    ///
    /// Returns `None` both when the task does not exist and when it belongs
    /// to a different user; callers cannot distinguish the two cases.
    pub async fn find_by_id_for_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2"
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Lists all tasks owned by a user, newest first
    pub async fn list_for_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE owner_id = $1 \
             ORDER BY created_at DESC"
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Applies a partial update to a task, scoped to its owner
    ///
    /// The owner predicate is part of the UPDATE statement itself, so the
    /// ownership check and the mutation are a single atomic operation.
    ///
    /// # Returns
    ///
    /// The updated task, or `None` when the task is absent or not owned by
    /// `owner_id`.
    pub async fn update_for_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.completed.is_some() {
            bind_count += 1;
            query.push_str(&format!(", completed = ${}", bind_count));
        }
        if data.suggested_time.is_some() {
            bind_count += 1;
            query.push_str(&format!(", suggested_time = ${}", bind_count));
        }
        if data.reasoning.is_some() {
            bind_count += 1;
            query.push_str(&format!(", reasoning = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND owner_id = $2 RETURNING {TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(owner_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }
        if let Some(suggested_time) = data.suggested_time {
            q = q.bind(suggested_time);
        }
        if let Some(reasoning) = data.reasoning {
            q = q.bind(reasoning);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Permanently deletes a task, scoped to its owner
    ///
    /// No soft delete, no tombstone.
    ///
    /// # Returns
    ///
    /// True if a row was deleted, false when the task is absent or not owned
    /// by `owner_id`.
    pub async fn delete_for_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamps `last_notified_at` on a batch of tasks
    ///
    /// Called by the reminder scanner after a dispatch so that a task sitting
    /// inside the window across consecutive scans is notified once.
    pub async fn mark_notified(
        pool: &PgPool,
        ids: &[Uuid],
        at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("UPDATE tasks SET last_notified_at = $2 WHERE id = ANY($1)")
            .bind(ids)
            .bind(at)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
