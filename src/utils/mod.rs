pub mod jwt;
pub mod money;
pub mod password;

pub use jwt::*;
pub use money::format_cents;
pub use password::*;
