//! API error types and their HTTP response conversion.

pub mod conversion;
pub mod types;

pub use types::ApiError;
