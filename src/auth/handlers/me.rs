//! GET /auth/me - the bearer-protected profile endpoint.

use axum::response::Json;

use crate::auth::handlers::types::ProfileResponse;
use crate::middleware::auth::CurrentUser;

/// Return the authenticated user's profile.
pub async fn me(CurrentUser(user): CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        username: user.username,
        avatar_url: user.avatar_url,
    })
}
