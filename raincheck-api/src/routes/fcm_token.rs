/// Push device token registration
///
/// Associates a push-notification device token with the authenticated user.
/// Registration is idempotent: submitting the same token twice leaves a
/// single copy.
///
/// # Endpoint
///
/// ```text
/// POST /api/fcm-token
/// Authorization: Bearer <access token>
/// Content-Type: application/json
///
/// { "token": "device-token" }
/// ```

use crate::{
    app::AppState,
    error::{decode_body, ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Extension, Json};
use raincheck_shared::{auth::middleware::AuthContext, models::user::User};
use serde::{Deserialize, Serialize};

/// Token registration request
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterTokenRequest {
    /// Device token to register
    pub token: Option<String>,
}

/// Token registration response
#[derive(Debug, Serialize)]
pub struct RegisterTokenResponse {
    /// Confirmation message
    pub message: String,
}

/// Registers a device token for the caller
///
/// # Errors
///
/// - `400 Bad Request`: Token missing or empty
/// - `401 Unauthorized`: Missing or invalid access token
pub async fn register_token(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<Json<RegisterTokenResponse>> {
    let req: RegisterTokenRequest = decode_body(body)?;

    let token = match req.token.as_deref() {
        Some(token) if !token.is_empty() => token,
        _ => {
            return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "token".to_string(),
                message: "Token is required".to_string(),
            }]));
        }
    };

    User::add_fcm_token(&state.db, auth.user_id, token).await?;

    Ok(Json(RegisterTokenResponse {
        message: "Token saved".to_string(),
    }))
}
