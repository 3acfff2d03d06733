//! In-memory broadcast hub and the WebSocket chat/notification endpoints.

pub mod broadcast;
pub mod ws;

pub use broadcast::Broadcaster;
