use actix_web::{HttpRequest, HttpResponse, Result, web};

use super::respond;
use crate::middlewares::current_employee_id;
use crate::services::NotificationService;

/// Long-poll style inbox: everything unread is returned once and marked read.
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notification",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread notifications, oldest first", body = Vec<NotificationResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn poll_notifications(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        notification_service.poll(employee_id).await
    }
    .await;
    respond(result)
}

pub fn notification_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/notifications", web::get().to(poll_notifications));
}
