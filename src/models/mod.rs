pub mod admin;
pub mod common;
pub mod draw;
pub mod pagination;
pub mod prize;

pub use admin::*;
pub use common::*;
pub use draw::*;
pub use pagination::*;
pub use prize::*;
