//! HTTP handlers for the authentication endpoints.

pub mod login;
pub mod me;
pub mod refresh;
pub mod register;
pub mod types;

pub use login::login;
pub use me::me;
pub use refresh::refresh;
pub use register::register;
