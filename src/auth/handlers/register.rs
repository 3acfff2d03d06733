/**
 * Registration Handler
 *
 * This module implements the user registration handler for POST /auth/register.
 *
 * # Registration Process
 *
 * 1. Validate username format and password length
 * 2. Check the username is free
 * 3. Hash the password using bcrypt
 * 4. Create the user
 * 5. Issue a token pair and persist the refresh token
 *
 * # Validation
 *
 * - Username: 3-30 chars, starts with a letter, alphanumeric + underscore
 * - Password: at least 8 characters
 * - Username must be unique (duplicate registration returns 400)
 *
 * # Security
 *
 * - Passwords are hashed with bcrypt at DEFAULT_COST
 * - Passwords are never logged or returned in responses
 */
use axum::{extract::State, response::Json};

use crate::auth::handlers::types::{RegisterRequest, TokenPairResponse};
use crate::auth::passwords::hash_password;
use crate::auth::refresh::store_refresh_token;
use crate::auth::tokens::create_token_pair;
use crate::auth::users::{create_user, get_user_by_username};
use crate::error::ApiError;
use crate::server::state::AppState;

/// Validate username format.
///
/// Usernames must be:
/// - 3-30 characters long
/// - Contain only alphanumeric characters and underscores
/// - Start with a letter
fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();

    // First character must be a letter
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }

    // Rest can be alphanumeric or underscore
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Registration handler.
///
/// Creates a new user and returns a token pair so the client is logged in
/// immediately.
///
/// # Errors
///
/// * `400 Bad Request` - invalid username/password, or username taken
/// * `503 Service Unavailable` - database not configured
/// * `500 Internal Server Error` - hashing or token generation failure
///
/// # Example Request
///
/// ```http
/// POST /auth/register HTTP/1.1
/// Content-Type: application/json
///
/// {"username": "alice", "password": "strongpassword123"}
/// ```
///
/// # Example Response
///
/// ```json
/// {"access_token": "eyJ...", "refresh_token": "eyJ...", "token_type": "bearer"}
/// ```
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    if !is_valid_username(&request.username) {
        return Err(ApiError::bad_request(
            "username must be 3-30 characters, start with a letter, \
             and contain only letters, digits and underscores",
        ));
    }
    if request.password.len() < 8 {
        return Err(ApiError::bad_request(
            "password must be at least 8 characters",
        ));
    }

    let pool = state.require_db()?;
    tracing::info!("Registration request for: {}", request.username);

    if get_user_by_username(pool, &request.username).await?.is_some() {
        return Err(ApiError::bad_request("username already exists"));
    }

    let password_hash = hash_password(&request.password)
        .map_err(|e| ApiError::internal(format!("failed to hash password: {e}")))?;

    let user = match create_user(pool, &request.username, &password_hash).await {
        Ok(user) => user,
        // Two concurrent registrations can both pass the lookup above
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::bad_request("username already exists"));
        }
        Err(e) => return Err(e.into()),
    };

    let pair = create_token_pair(&state.config.jwt, &user.username)
        .map_err(|e| ApiError::internal(format!("failed to create tokens: {e}")))?;

    store_refresh_token(pool, &pair.refresh_token, &user.username, pair.refresh_expires_at)
        .await?;

    tracing::info!("User registered: {}", user.username);

    Ok(Json(pair.into()))
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("bob_42"));
        assert!(is_valid_username("Abc"));
    }

    #[test]
    fn test_invalid_usernames() {
        assert!(!is_valid_username("ab")); // too short
        assert!(!is_valid_username(&"a".repeat(31))); // too long
        assert!(!is_valid_username("1alice")); // starts with a digit
        assert!(!is_valid_username("_alice")); // starts with underscore
        assert!(!is_valid_username("al ice")); // whitespace
        assert!(!is_valid_username("ali-ce")); // dash
        assert!(!is_valid_username("")); // empty
    }
}
