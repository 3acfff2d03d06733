/**
 * Authentication Extractor
 *
 * This module provides the `CurrentUser` extractor used by protected
 * routes. It:
 *
 * 1. Extracts the JWT from the `Authorization: Bearer <token>` header
 * 2. Verifies the signature, expiry and access kind
 * 3. Confirms the subject still exists in the database
 *
 * Returns 401 Unauthorized when any step fails, and 503 when the
 * database is not configured (a valid token cannot be checked against
 * anything).
 */
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::auth::tokens::{verify_token_of_kind, TokenKind};
use crate::auth::users::{get_user_by_username, User};
use crate::error::ApiError;
use crate::server::state::AppState;

/// Authenticated user extracted from the bearer token.
///
/// Use as a handler parameter to protect a route:
///
/// ```rust,ignore
/// async fn handler(CurrentUser(user): CurrentUser) -> Json<Value> {
///     // user.username is verified against the database
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                tracing::warn!("Missing Authorization header");
                ApiError::unauthorized("could not validate credentials")
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            tracing::warn!("Invalid Authorization header format");
            ApiError::unauthorized("could not validate credentials")
        })?;

        let claims = verify_token_of_kind(&state.config.jwt, token, TokenKind::Access)
            .ok_or_else(|| ApiError::unauthorized("could not validate credentials"))?;

        // The user must still exist; a deleted account keeps a valid
        // signature until the token expires
        let pool = state.require_db()?;
        let user = get_user_by_username(pool, &claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Token subject no longer exists: {}", claims.sub);
                ApiError::unauthorized("could not validate credentials")
            })?;

        Ok(CurrentUser(user))
    }
}
