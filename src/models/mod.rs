pub mod auth;
pub mod common;
pub mod debt;
pub mod employee;
pub mod notification;
pub mod order;
pub mod pagination;
pub mod product;
pub mod role;
pub mod shift;
pub mod status;

pub use auth::*;
pub use common::*;
pub use debt::*;
pub use employee::*;
pub use notification::*;
pub use order::*;
pub use pagination::*;
pub use product::*;
pub use role::*;
pub use shift::*;
pub use status::*;
