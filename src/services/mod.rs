pub mod admin_service;
pub mod draw_service;
pub mod prize_service;

pub use admin_service::*;
pub use draw_service::*;
pub use prize_service::*;
