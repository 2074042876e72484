pub mod auth;
pub mod cors;

pub use auth::{AuthMiddleware, CurrentEmployee, current_employee_id};
pub use cors::create_cors;
