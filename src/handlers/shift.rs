use actix_web::{HttpRequest, HttpResponse, Result, web};

use super::respond;
use crate::error::AppResult;
use crate::middlewares::current_employee_id;
use crate::models::*;
use crate::services::{EmployeeService, ShiftService};

async fn cashier_id(employee_service: &EmployeeService, req: &HttpRequest) -> AppResult<i64> {
    let employee_id = current_employee_id(req)?;
    employee_service
        .require_capability(employee_id, Capability::Cashier)
        .await?;
    Ok(employee_id)
}

#[utoipa::path(
    post,
    path = "/shifts/open",
    tag = "shift",
    request_body = OpenShiftRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Shift opened", body = ShiftResponse),
        (status = 409, description = "Another shift is open")
    )
)]
pub async fn open_shift(
    shift_service: web::Data<ShiftService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    body: web::Json<OpenShiftRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = cashier_id(&employee_service, &req).await?;
        shift_service.open(employee_id, body.into_inner()).await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    get,
    path = "/shifts/current",
    tag = "shift",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "X-report of the open shift, null when none is open", body = ShiftReport)
    )
)]
pub async fn current_shift(
    shift_service: web::Data<ShiftService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let result = async {
        cashier_id(&employee_service, &req).await?;
        shift_service.current().await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    get,
    path = "/shifts",
    tag = "shift",
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Page size")
    ),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Shifts, newest first"))
)]
pub async fn list_shifts(
    shift_service: web::Data<ShiftService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    query: web::Query<ShiftQuery>,
) -> Result<HttpResponse> {
    let result = async {
        cashier_id(&employee_service, &req).await?;
        shift_service.list_shifts(&query).await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    get,
    path = "/shifts/{id}/report",
    tag = "shift",
    params(("id" = i64, Path, description = "Shift id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "X-report (open) or Z-report (closed)", body = ShiftReport),
        (status = 404, description = "Shift not found")
    )
)]
pub async fn shift_report(
    shift_service: web::Data<ShiftService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let result = async {
        cashier_id(&employee_service, &req).await?;
        shift_service.statistics(path.into_inner()).await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    post,
    path = "/shifts/{id}/close",
    tag = "shift",
    params(("id" = i64, Path, description = "Shift id")),
    request_body = CloseShiftRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Z-report", body = CloseShiftResponse),
        (status = 409, description = "Shift already closed")
    )
)]
pub async fn close_shift(
    shift_service: web::Data<ShiftService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<CloseShiftRequest>,
) -> Result<HttpResponse> {
    let result = async {
        cashier_id(&employee_service, &req).await?;
        shift_service
            .close(path.into_inner(), body.into_inner())
            .await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    post,
    path = "/shifts/{id}/transactions",
    tag = "shift",
    params(("id" = i64, Path, description = "Shift id")),
    request_body = CashTransactionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Transaction recorded", body = CashTransactionResponse),
        (status = 409, description = "Shift closed")
    )
)]
pub async fn add_transaction(
    shift_service: web::Data<ShiftService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<CashTransactionRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = cashier_id(&employee_service, &req).await?;
        shift_service
            .add_transaction(path.into_inner(), employee_id, body.into_inner())
            .await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    get,
    path = "/shifts/{id}/transactions",
    tag = "shift",
    params(("id" = i64, Path, description = "Shift id")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Transactions of the shift", body = Vec<CashTransactionResponse>))
)]
pub async fn list_transactions(
    shift_service: web::Data<ShiftService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let result = async {
        cashier_id(&employee_service, &req).await?;
        shift_service.list_transactions(path.into_inner()).await
    }
    .await;
    respond(result)
}

pub fn shift_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/shifts")
            .route("", web::get().to(list_shifts))
            .route("/open", web::post().to(open_shift))
            .route("/current", web::get().to(current_shift))
            .route("/{id}/report", web::get().to(shift_report))
            .route("/{id}/close", web::post().to(close_shift))
            .route("/{id}/transactions", web::get().to(list_transactions))
            .route("/{id}/transactions", web::post().to(add_transaction)),
    );
}
