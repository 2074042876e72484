use actix_web::{HttpRequest, HttpResponse, Result, web};

use super::respond;
use crate::middlewares::current_employee_id;
use crate::models::*;
use crate::services::{EmployeeService, StatusService};

#[utoipa::path(
    get,
    path = "/statuses",
    tag = "status",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Order statuses in display order", body = Vec<StatusResponse>))
)]
pub async fn list_statuses(status_service: web::Data<StatusService>) -> Result<HttpResponse> {
    respond(status_service.list().await)
}

#[utoipa::path(
    post,
    path = "/statuses",
    tag = "status",
    request_body = StatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status created", body = StatusResponse),
        (status = 400, description = "Invalid status flags"),
        (status = 403, description = "Admins only")
    )
)]
pub async fn create_status(
    status_service: web::Data<StatusService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    body: web::Json<StatusRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        employee_service
            .require_capability(employee_id, Capability::Admin)
            .await?;
        status_service.create(body.into_inner()).await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    put,
    path = "/statuses/{id}",
    tag = "status",
    params(("id" = i64, Path, description = "Status id")),
    request_body = StatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status updated", body = StatusResponse),
        (status = 404, description = "Status not found")
    )
)]
pub async fn update_status(
    status_service: web::Data<StatusService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<StatusRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        employee_service
            .require_capability(employee_id, Capability::Admin)
            .await?;
        status_service
            .update(path.into_inner(), body.into_inner())
            .await
    }
    .await;
    respond(result)
}

pub fn status_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/statuses")
            .route("", web::get().to(list_statuses))
            .route("", web::post().to(create_status))
            .route("/{id}", web::put().to(update_status)),
    );
}
