/**
 * Token Refresh Handler
 *
 * This module implements POST /auth/refresh: exchanging a refresh token
 * for a new access/refresh pair.
 *
 * # Rotation
 *
 * Refresh tokens are single-use. The presented token must verify as a
 * refresh-kind JWT AND match a persisted row; the row is deleted in the
 * same statement that looks it up, so a replayed token always fails.
 */
use axum::{extract::State, response::Json};

use crate::auth::handlers::types::{RefreshRequest, TokenPairResponse};
use crate::auth::refresh::{consume_refresh_token, store_refresh_token};
use crate::auth::tokens::{create_token_pair, verify_token_of_kind, TokenKind};
use crate::error::ApiError;
use crate::server::state::AppState;

/// Refresh handler.
///
/// # Errors
///
/// * `401 Unauthorized` - token invalid, expired, wrong kind, or already used
/// * `503 Service Unavailable` - database not configured
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let claims = verify_token_of_kind(&state.config.jwt, &request.refresh_token, TokenKind::Refresh)
        .ok_or_else(|| ApiError::unauthorized("invalid or expired refresh token"))?;

    let pool = state.require_db()?;

    let username = consume_refresh_token(pool, &request.refresh_token)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Refresh token not found or already used for: {}", claims.sub);
            ApiError::unauthorized("invalid or expired refresh token")
        })?;

    // The signed subject and the stored owner must agree
    if username != claims.sub {
        tracing::error!(
            "refresh token owner mismatch: claims say {}, store says {}",
            claims.sub,
            username
        );
        return Err(ApiError::unauthorized("invalid or expired refresh token"));
    }

    let pair = create_token_pair(&state.config.jwt, &username)
        .map_err(|e| ApiError::internal(format!("failed to create tokens: {e}")))?;

    store_refresh_token(pool, &pair.refresh_token, &username, pair.refresh_expires_at).await?;

    tracing::info!("Token pair refreshed for: {}", username);

    Ok(Json(pair.into()))
}
