//! Common test utilities and helpers
//!
//! Provides shared fixtures for the integration tests:
//! - An app builder with no external services (database/storage absent)
//! - An app builder bound to a real test database
//! - Token helpers for exercising protected routes

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use bazaar::config::{Config, JwtConfig, StorageConfig};
use bazaar::routes::create_router;
use bazaar::server::state::AppState;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Configuration used by every test server.
pub fn test_config() -> Config {
    Config {
        database_url: None,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_ttl_minutes: 30,
            refresh_ttl_days: 7,
        },
        storage: None,
        port: 0,
    }
}

fn shared_config() -> Arc<Config> {
    test_config().into_shared()
}

/// An app with neither database nor object storage configured.
///
/// Useful for exercising routing, validation and the 503 degradation
/// paths without any infrastructure.
pub fn app_without_services() -> Router {
    create_router(AppState::new(shared_config(), None, None))
}

/// An app bound to a real database pool (storage still absent).
pub fn app_with_db(pool: PgPool) -> Router {
    create_router(AppState::new(shared_config(), Some(pool), None))
}

/// Connect to the test database named by `TEST_DATABASE_URL` and run
/// migrations. Returns `None` when the variable is unset so DB-backed
/// tests can skip themselves on machines without Postgres.
pub async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;

    let pool = PgPool::connect(&url)
        .await
        .expect("failed to connect to TEST_DATABASE_URL");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("failed to run migrations on the test database");

    Some(pool)
}

/// A signed access token for `username` (the user need not exist).
pub fn access_token_for(username: &str) -> String {
    bazaar::auth::tokens::create_token_pair(&test_config().jwt, username)
        .expect("failed to create test token")
        .access_token
}

/// A signed refresh token for `username`.
pub fn refresh_token_for(username: &str) -> String {
    bazaar::auth::tokens::create_token_pair(&test_config().jwt, username)
        .expect("failed to create test token")
        .refresh_token
}

/// A unique username so tests sharing one database never collide.
pub fn unique_username(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &suffix[..12])
}

/// Storage settings pointing at nothing in particular; only used to
/// exercise URL construction, never to perform a real upload.
pub fn dummy_storage_config() -> StorageConfig {
    StorageConfig {
        endpoint_url: "http://localhost:9000".to_string(),
        access_key: "minioadmin".to_string(),
        secret_key: "minioadmin".to_string(),
        bucket: "test-bucket".to_string(),
        public_url: None,
        region: "us-east-1".to_string(),
    }
}
