//! Bazaar - a small CRUD web backend
//!
//! Bazaar is an Axum-based HTTP backend providing:
//!
//! - User registration and login with JWT access/refresh token pairs
//! - An owner-scoped "products" resource
//! - Avatar/file upload to S3-compatible object storage
//! - WebSocket chat and notification broadcasting
//! - Background computation tasks (factorial, range sums)
//!
//! # Module Structure
//!
//! - **`config`** - Environment-based configuration loading
//! - **`error`** - The `ApiError` type and its HTTP response mapping
//! - **`server`** - Application state and startup wiring
//! - **`middleware`** - Request authentication and timing middleware
//! - **`auth`** - Passwords, JWT tokens, user and refresh-token storage
//! - **`products`** - Owner-scoped product CRUD
//! - **`media`** - Object storage uploads (avatars, media files)
//! - **`realtime`** - Broadcast hub and WebSocket endpoints
//! - **`compute`** - Background computation jobs with retry
//! - **`routes`** - Router assembly
//!
//! # Thread Safety
//!
//! All shared state lives in [`server::state::AppState`], which is cheap to
//! clone: the database pool, object storage client and broadcast hub are all
//! internally reference counted.

pub mod auth;
pub mod compute;
pub mod config;
pub mod error;
pub mod media;
pub mod middleware;
pub mod products;
pub mod realtime;
pub mod routes;
pub mod server;
