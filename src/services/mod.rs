pub mod auth_service;
pub mod debt_service;
pub mod employee_service;
pub mod notification_service;
pub mod order_service;
pub mod product_service;
pub mod production_service;
pub mod shift_service;
pub mod status_service;

pub use auth_service::AuthService;
pub use debt_service::DebtService;
pub use employee_service::EmployeeService;
pub use notification_service::NotificationService;
pub use order_service::OrderService;
pub use product_service::ProductService;
pub use production_service::ProductionService;
pub use shift_service::ShiftService;
pub use status_service::StatusService;
