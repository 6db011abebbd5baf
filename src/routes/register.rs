use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_USERNAME_LEN, MIN_PASSWORD_LEN};
use crate::db::users;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub ok: bool,
    pub user_id: i64,
}

/// Create a new account
///
/// The password is stored as a salted digest only. Returns 409 Conflict
/// when the username is already taken.
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>> {
    let username = payload.username.trim();
    if !User::validate_username(username) {
        tracing::warn!("Invalid username at registration: {}", username);
        return Err(AppError::InvalidInput(format!(
            "Username must be 1-{} characters: letters, digits and @.+-_ only",
            MAX_USERNAME_LEN
        )));
    }

    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let user = users::create_user(&state.pool, username, &payload.password).await?;

    tracing::info!("New user registered: {}", user.username);

    Ok(Json(RegisterResponse {
        ok: true,
        user_id: user.id,
    }))
}
