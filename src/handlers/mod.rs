pub mod auth;
pub mod debt;
pub mod employee;
pub mod notification;
pub mod order;
pub mod product;
pub mod public;
pub mod shift;
pub mod status;

pub use auth::auth_config;
pub use debt::debt_config;
pub use employee::employee_config;
pub use notification::notification_config;
pub use order::order_config;
pub use product::product_config;
pub use public::public_config;
pub use shift::shift_config;
pub use status::status_config;

use crate::error::AppResult;
use crate::models::ApiResponse;
use actix_web::{HttpResponse, ResponseError, Result};
use serde::Serialize;

/// Wraps a service result in the `{"success": true, "data": ...}` envelope,
/// or renders the error.
pub(crate) fn respond<T: Serialize>(result: AppResult<T>) -> Result<HttpResponse> {
    match result {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}
