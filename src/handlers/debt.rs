use actix_web::{HttpRequest, HttpResponse, Result, web};

use super::respond;
use crate::middlewares::current_employee_id;
use crate::models::*;
use crate::services::{DebtService, EmployeeService};

#[utoipa::path(
    get,
    path = "/debts",
    tag = "debt",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Employees holding cash", body = Vec<DebtorResponse>))
)]
pub async fn list_debtors(
    debt_service: web::Data<DebtService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        employee_service
            .require_capability(employee_id, Capability::Cashier)
            .await?;
        debt_service.list_debtors().await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    get,
    path = "/debts/{employee_id}/orders",
    tag = "debt",
    params(("employee_id" = i64, Path, description = "Cash holder")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Cash orders not handed over yet", body = Vec<OrderResponse>))
)]
pub async fn outstanding_orders(
    debt_service: web::Data<DebtService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        let holder_id = path.into_inner();
        // staff may look at their own debt
        if holder_id != employee_id {
            employee_service
                .require_capability(employee_id, Capability::Cashier)
                .await?;
        }
        debt_service.outstanding_orders(holder_id).await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    post,
    path = "/debts/handover",
    tag = "debt",
    request_body = HandoverRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cash collected", body = HandoverResponse),
        (status = 409, description = "No open shift or nothing to hand over")
    )
)]
pub async fn handover(
    debt_service: web::Data<DebtService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    body: web::Json<HandoverRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let cashier_id = current_employee_id(&req)?;
        employee_service
            .require_capability(cashier_id, Capability::Cashier)
            .await?;
        debt_service.handover(cashier_id, body.into_inner()).await
    }
    .await;
    respond(result)
}

pub fn debt_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/debts")
            .route("", web::get().to(list_debtors))
            .route("/handover", web::post().to(handover))
            .route("/{employee_id}/orders", web::get().to(outstanding_orders)),
    );
}
