/**
 * Server Initialization
 *
 * This module wires configuration, optional services and routes into a
 * ready-to-serve Axum application.
 *
 * # Initialization Process
 *
 * 1. Connect the database pool and run migrations (if configured)
 * 2. Build the object storage client (if configured)
 * 3. Create the shared state and broadcast hub
 * 4. Assemble the router
 * 5. Spawn the periodic refresh-token cleanup task
 *
 * # Error Handling
 *
 * Startup is resilient: a missing or unreachable database, or missing
 * object storage settings, disable the corresponding endpoints instead
 * of aborting the process.
 */
use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use crate::config::Config;
use crate::media::storage::ObjectStorage;
use crate::routes::router::create_router;
use crate::server::state::AppState;

/// How often expired refresh tokens are purged.
const TOKEN_CLEANUP_INTERVAL_SECS: u64 = 3600;

/// Create and configure the Axum application.
pub async fn create_app(config: Config) -> Router {
    tracing::info!("Initializing bazaar backend server");

    let config = config.into_shared();

    let db_pool = load_database(&config).await;

    let storage = config
        .storage
        .as_ref()
        .map(|storage_config| Arc::new(ObjectStorage::new(storage_config)));
    if storage.is_none() {
        tracing::warn!("S3 settings not set, media endpoints disabled");
    }

    let app_state = AppState::new(config, db_pool, storage);

    // Expired refresh tokens are unusable either way; this keeps the
    // table from growing without bound.
    if let Some(pool) = app_state.db_pool.clone() {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(
                TOKEN_CLEANUP_INTERVAL_SECS,
            ));
            loop {
                interval.tick().await;
                match crate::auth::refresh::purge_expired_tokens(&pool).await {
                    Ok(purged) if purged > 0 => {
                        tracing::info!("purged {purged} expired refresh tokens")
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("refresh token cleanup failed: {e}"),
                }
            }
        });
    }

    create_router(app_state)
}

/// Connect the database pool and run migrations.
///
/// Returns `None` when `DATABASE_URL` is unset or the connection fails,
/// leaving database-backed endpoints disabled.
async fn load_database(config: &Config) -> Option<PgPool> {
    let database_url = match &config.database_url {
        Some(url) => url,
        None => {
            tracing::warn!("DATABASE_URL not set. Database features will be disabled.");
            return None;
        }
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {e}");
            tracing::warn!("Database features will be disabled.");
            return None;
        }
    };

    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            // Migrations might have already been applied by another instance
            tracing::error!("Failed to run database migrations: {e}");
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}
