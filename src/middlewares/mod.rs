pub mod auth;
pub mod cors;

pub use auth::{AuthMiddleware, current_tier};
pub use cors::create_cors;
