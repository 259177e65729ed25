/// Liveness endpoint
///
/// Unauthenticated probe for uptime monitors and the deploy pipeline. The
/// reminder path is only useful when the task store is reachable, so the
/// probe reports Postgres connectivity alongside the process itself: a
/// running server with a dead pool answers `degraded`, not `healthy`.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use raincheck_shared::db::pool;
use serde::{Deserialize, Serialize};

/// Probe response body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` when the task store answers, `degraded` otherwise
    pub status: String,

    /// API server version
    pub version: String,

    /// `connected` or `disconnected`
    pub database: String,
}

/// Reports process liveness and task-store connectivity
///
/// Always answers 200; a broken database shows up in the body, so monitors
/// can distinguish "API down" from "API up, store unreachable".
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let store_reachable = pool::health_check(&state.db).await.is_ok();

    let (status, database) = if store_reachable {
        ("healthy", "connected")
    } else {
        ("degraded", "disconnected")
    };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    }))
}
