//! Login endpoint: email + password in, access token out.

use argon2::password_hash::PasswordHash;
use argon2::{Argon2, PasswordVerifier};
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/v1/auth/login`
///
/// Verifies credentials and returns `{token, user}`. Failures are
/// deliberately uniform: a wrong email and a wrong password produce the
/// same response.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let rejection = || ApiError::unauthenticated("Invalid credentials");

    let user = state
        .db
        .users()
        .get_by_email(&request.email)
        .await?
        .ok_or_else(rejection)?;

    let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|_| rejection())?;
    Argon2::default()
        .verify_password(request.password.as_bytes(), &parsed_hash)
        .map_err(|_| rejection())?;

    let token = state.jwt.issue_token(&user.id, user.role)?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(json!({
        "success": true,
        "token": token,
        "user": user,
    })))
}
