use actix_web::{HttpRequest, HttpResponse, Result, web};

use super::respond;
use crate::middlewares::current_employee_id;
use crate::models::*;
use crate::services::EmployeeService;

#[utoipa::path(
    get,
    path = "/employees",
    tag = "employee",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All employees", body = Vec<EmployeeResponse>),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_employees(
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        employee_service
            .require_capability(employee_id, Capability::Admin)
            .await?;
        employee_service.list().await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    post,
    path = "/employees",
    tag = "employee",
    request_body = CreateEmployeeRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Employee created", body = EmployeeResponse),
        (status = 409, description = "Username taken")
    )
)]
pub async fn create_employee(
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    body: web::Json<CreateEmployeeRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        employee_service
            .require_capability(employee_id, Capability::Admin)
            .await?;
        employee_service.create(body.into_inner()).await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    get,
    path = "/employees/roles",
    tag = "employee",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Roles with their capabilities", body = Vec<RoleResponse>))
)]
pub async fn list_roles(employee_service: web::Data<EmployeeService>) -> Result<HttpResponse> {
    respond(employee_service.list_roles().await)
}

#[utoipa::path(
    put,
    path = "/employees/{id}/shift",
    tag = "employee",
    params(("id" = i64, Path, description = "Employee id")),
    request_body = SetOnShiftRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "On-shift flag updated", body = EmployeeResponse),
        (status = 403, description = "Only the employee or an admin")
    )
)]
pub async fn set_on_shift(
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<SetOnShiftRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        let target_id = path.into_inner();
        if target_id != employee_id {
            employee_service
                .require_capability(employee_id, Capability::Admin)
                .await?;
        }
        employee_service.set_on_shift(target_id, body.on_shift).await
    }
    .await;
    respond(result)
}

pub fn employee_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/employees")
            .route("", web::get().to(list_employees))
            .route("", web::post().to(create_employee))
            .route("/roles", web::get().to(list_roles))
            .route("/{id}/shift", web::put().to(set_on_shift)),
    );
}
