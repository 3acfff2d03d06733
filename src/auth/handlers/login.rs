/**
 * Login Handler
 *
 * This module implements the authentication handler for POST /auth/login.
 *
 * # Authentication Process
 *
 * 1. Look up the user by username
 * 2. Verify the password using bcrypt
 * 3. Issue a token pair and persist the refresh token
 *
 * # Security
 *
 * - Unknown user and wrong password both return 401 so usernames cannot
 *   be enumerated
 * - Passwords are never logged or returned in responses
 */
use axum::{extract::State, response::Json};

use crate::auth::handlers::types::{LoginRequest, TokenPairResponse};
use crate::auth::passwords::verify_password;
use crate::auth::refresh::store_refresh_token;
use crate::auth::tokens::create_token_pair;
use crate::auth::users::get_user_by_username;
use crate::error::ApiError;
use crate::server::state::AppState;

/// Login handler.
///
/// Verifies the username and password and returns a fresh token pair.
///
/// # Errors
///
/// * `401 Unauthorized` - unknown user or wrong password
/// * `503 Service Unavailable` - database not configured
/// * `500 Internal Server Error` - verification or token generation failure
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let pool = state.require_db()?;
    tracing::info!("Login request for: {}", request.username);

    let user = get_user_by_username(pool, &request.username)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Login failed, user not found: {}", request.username);
            ApiError::unauthorized("invalid username or password")
        })?;

    let valid = verify_password(&request.password, &user.password_hash)
        .map_err(|e| ApiError::internal(format!("password verification error: {e}")))?;

    if !valid {
        tracing::warn!("Login failed, wrong password for: {}", request.username);
        return Err(ApiError::unauthorized("invalid username or password"));
    }

    let pair = create_token_pair(&state.config.jwt, &user.username)
        .map_err(|e| ApiError::internal(format!("failed to create tokens: {e}")))?;

    store_refresh_token(pool, &pair.refresh_token, &user.username, pair.refresh_expires_at)
        .await?;

    tracing::info!("User logged in: {}", user.username);

    Ok(Json(pair.into()))
}
