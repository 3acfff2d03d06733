/**
 * Product Model and Database Operations
 *
 * Products belong to exactly one user (`owner_username`); every query
 * here is either scoped by owner or feeds an ownership check in the
 * handler layer.
 */
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Product struct representing a row in the `products` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub is_active: bool,
    pub owner_username: String,
}

/// List every product owned by a user, oldest first.
pub async fn list_for_owner(pool: &PgPool, owner: &str) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, description, price, is_active, owner_username
        FROM products
        WHERE owner_username = $1
        ORDER BY id
        "#,
    )
    .bind(owner)
    .fetch_all(pool)
    .await
}

/// Insert a new product and return the created row.
pub async fn insert(
    pool: &PgPool,
    owner: &str,
    name: &str,
    description: &str,
    price: f64,
) -> Result<Product, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (name, description, price, owner_username)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, description, price, is_active, owner_username
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(owner)
    .fetch_one(pool)
    .await
}

/// Fetch a product by id regardless of owner.
///
/// The handler layer decides between 404 (absent) and 403 (foreign
/// owner) so the two cases stay distinguishable.
pub async fn fetch(pool: &PgPool, id: i64) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, description, price, is_active, owner_username
        FROM products
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Update a product. `description` and `is_active` keep their current
/// values when `None`.
pub async fn update(
    pool: &PgPool,
    id: i64,
    name: &str,
    description: Option<&str>,
    price: f64,
    is_active: Option<bool>,
) -> Result<Product, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET name = $1,
            description = COALESCE($2, description),
            price = $3,
            is_active = COALESCE($4, is_active)
        WHERE id = $5
        RETURNING id, name, description, price, is_active, owner_username
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(is_active)
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Delete a product by id.
pub async fn delete(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
