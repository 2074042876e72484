pub mod cash_transactions;
pub mod employee_notifications;
pub mod employees;
pub mod order_items;
pub mod order_status_history;
pub mod order_statuses;
pub mod orders;
pub mod products;
pub mod roles;
pub mod shifts;

pub use cash_transactions as cash_transaction_entity;
pub use employee_notifications as notification_entity;
pub use employees as employee_entity;
pub use order_items as order_item_entity;
pub use order_status_history as status_history_entity;
pub use order_statuses as order_status_entity;
pub use orders as order_entity;
pub use products as product_entity;
pub use roles as role_entity;
pub use shifts as shift_entity;

pub use cash_transactions::TransactionKind;
pub use order_items::PreparationArea;
pub use orders::{DeliveryMethod, PaymentMethod};
