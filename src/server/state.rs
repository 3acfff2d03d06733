/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the `FromRef` traits for Axum state extraction.
 *
 * # Thread Safety
 *
 * `AppState` is cloned per request; every field is cheap to clone:
 * - `PgPool` is internally reference counted
 * - `ObjectStorage` is behind an `Arc`
 * - `Broadcaster` clones share one broadcast channel
 *
 * # Optional Services
 *
 * The database pool and object storage are `Option<T>`: the server runs
 * without them (e.g. in local development or HTTP-level tests) and the
 * affected endpoints answer 503 via `require_db` / `require_storage`.
 */
use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::ApiError;
use crate::media::storage::ObjectStorage;
use crate::realtime::broadcast::Broadcaster;

/// Central state container for the Axum application.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration (JWT settings, service endpoints).
    pub config: Arc<Config>,

    /// Database connection pool.
    ///
    /// `None` if the database is not configured (e.g. `DATABASE_URL` is
    /// unset). Handlers go through [`AppState::require_db`].
    pub db_pool: Option<PgPool>,

    /// Object storage client, `None` when S3 settings are absent.
    pub storage: Option<Arc<ObjectStorage>>,

    /// Broadcast hub feeding the WebSocket endpoints.
    pub broadcaster: Broadcaster,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        db_pool: Option<PgPool>,
        storage: Option<Arc<ObjectStorage>>,
    ) -> Self {
        AppState {
            config,
            db_pool,
            storage,
            broadcaster: Broadcaster::new(),
        }
    }

    /// The database pool, or 503 when the database is not configured.
    pub fn require_db(&self) -> Result<&PgPool, ApiError> {
        self.db_pool
            .as_ref()
            .ok_or_else(|| ApiError::unavailable("database not configured"))
    }

    /// The object storage client, or 503 when storage is not configured.
    pub fn require_storage(&self) -> Result<&ObjectStorage, ApiError> {
        self.storage
            .as_deref()
            .ok_or_else(|| ApiError::unavailable("object storage not configured"))
    }
}

impl FromRef<AppState> for Option<PgPool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for Broadcaster {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.broadcaster.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;

    fn bare_state() -> AppState {
        let config = Config {
            database_url: None,
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                access_ttl_minutes: 30,
                refresh_ttl_days: 7,
            },
            storage: None,
            port: 0,
        };
        AppState::new(config.into_shared(), None, None)
    }

    #[test]
    fn test_require_db_without_pool() {
        let state = bare_state();
        let err = state.require_db().unwrap_err();
        assert_eq!(
            err.status_code(),
            axum::http::StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_require_storage_without_client() {
        let state = bare_state();
        let err = state.require_storage().unwrap_err();
        assert_eq!(
            err.status_code(),
            axum::http::StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
