/**
 * Product Handlers
 *
 * Owner-scoped CRUD for the products resource. Every route requires a
 * bearer token; listing only ever returns the caller's own rows, and
 * by-id routes distinguish 404 (no such product) from 403 (someone
 * else's product).
 *
 * Creating a product also broadcasts a notification to WebSocket
 * subscribers as a background task, so a slow broadcast can never delay
 * the HTTP response.
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::auth::CurrentUser;
use crate::products::db;
use crate::products::db::Product;
use crate::server::state::AppState;

/// Body of `POST /products`.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
}

/// Body of `PUT /products/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub is_active: Option<bool>,
}

fn validate_product_input(name: &str, price: f64) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("name must not be empty"));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::bad_request("price must be a non-negative number"));
    }
    Ok(())
}

/// Fetch a product and enforce ownership: 404 when absent, 403 when it
/// belongs to someone else.
async fn fetch_owned(
    pool: &sqlx::PgPool,
    id: i64,
    username: &str,
) -> Result<Product, ApiError> {
    let product = db::fetch(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("product not found"))?;

    if product.owner_username != username {
        tracing::warn!(
            "{} attempted to access product {} owned by {}",
            username,
            id,
            product.owner_username
        );
        return Err(ApiError::forbidden("not your product"));
    }

    Ok(product)
}

/// `GET /products` - list the caller's products.
///
/// Returns an empty list (not 404) when the user owns nothing yet.
pub async fn list_products(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Product>>, ApiError> {
    let pool = state.require_db()?;
    let products = db::list_for_owner(pool, &user.username).await?;
    Ok(Json(products))
}

/// `POST /products` - create a product owned by the caller.
pub async fn create_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    validate_product_input(&request.name, request.price)?;

    let pool = state.require_db()?;
    let product = db::insert(
        pool,
        &user.username,
        request.name.trim(),
        request.description.as_deref().unwrap_or(""),
        request.price,
    )
    .await?;

    tracing::info!("product {} created by {}", product.id, user.username);

    // Notify WebSocket subscribers without delaying the response
    let hub = state.broadcaster.clone();
    let announcement = serde_json::to_string(&product)?;
    tokio::spawn(async move {
        hub.broadcast(format!("New product: {announcement}"));
    });

    Ok(Json(product))
}

/// `GET /products/{id}`.
pub async fn get_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    let pool = state.require_db()?;
    let product = fetch_owned(pool, id, &user.username).await?;
    Ok(Json(product))
}

/// `PUT /products/{id}`.
pub async fn update_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    validate_product_input(&request.name, request.price)?;

    let pool = state.require_db()?;
    fetch_owned(pool, id, &user.username).await?;

    let product = db::update(
        pool,
        id,
        request.name.trim(),
        request.description.as_deref(),
        request.price,
        request.is_active,
    )
    .await?;

    Ok(Json(product))
}

/// `DELETE /products/{id}`.
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let pool = state.require_db()?;
    fetch_owned(pool, id, &user.username).await?;

    db::delete(pool, id).await?;
    tracing::info!("product {} deleted by {}", id, user.username);

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_name() {
        assert!(validate_product_input("", 1.0).is_err());
        assert!(validate_product_input("   ", 1.0).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_price() {
        assert!(validate_product_input("ok", -1.0).is_err());
        assert!(validate_product_input("ok", f64::NAN).is_err());
        assert!(validate_product_input("ok", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_accepts_free_products() {
        assert!(validate_product_input("ok", 0.0).is_ok());
    }
}
