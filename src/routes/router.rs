/**
 * Router Configuration
 *
 * This module combines every route into a single Axum router.
 *
 * # Routes
 *
 * ## Authentication
 * - `POST /auth/register` - user registration
 * - `POST /auth/login` - user login
 * - `POST /auth/refresh` - exchange a refresh token for a new pair
 * - `GET /auth/me` - current user profile (bearer)
 *
 * ## Products (bearer)
 * - `GET /products` / `POST /products`
 * - `GET|PUT|DELETE /products/{id}`
 *
 * ## Media
 * - `POST /media/upload` - standalone image upload
 * - `PATCH /users/me/avatar` - avatar upload (bearer)
 *
 * ## Realtime
 * - `GET /ws/chat` / `GET /ws/notifications` - WebSocket endpoints
 *
 * ## Compute (bearer)
 * - `POST /compute/factorial` / `POST /compute/sum`
 *
 * # Middleware
 *
 * Every response carries an `X-Process-Time` header; requests are
 * traced via tower-http and CORS is permissive (the API is consumed
 * from browsers during development).
 */
use axum::{
    http::StatusCode,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::handlers::{login, me, refresh, register};
use crate::compute::handlers::{start_factorial, start_sum};
use crate::media::handlers::{update_avatar, upload_media};
use crate::middleware::timing::process_time;
use crate::products::handlers::{
    create_product, delete_product, get_product, list_products, update_product,
};
use crate::realtime::ws;
use crate::server::state::AppState;

/// Create the Axum router with all routes configured.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        // Authentication
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
        // Products
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        // Media
        .route("/media/upload", post(upload_media))
        .route("/users/me/avatar", patch(update_avatar))
        // Realtime
        .route("/ws/chat", get(ws::chat))
        .route("/ws/notifications", get(ws::notifications))
        // Background computation
        .route("/compute/factorial", post(start_factorial))
        .route("/compute/sum", post(start_sum))
        .fallback(not_found)
        .layer(axum::middleware::from_fn(process_time))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// Health/landing endpoint.
async fn root() -> Json<Value> {
    Json(json!({"status": "API is running."}))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "not found", "status": 404})),
    )
}
