use actix_web::{HttpRequest, HttpResponse, Result, web};

use super::respond;
use crate::entities::PreparationArea;
use crate::middlewares::current_employee_id;
use crate::models::*;
use crate::services::{EmployeeService, OrderService, ProductionService};

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Page size"),
        ("status_id" = Option<i64>, Query, description = "Only this status")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Orders visible to the caller"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        order_service.list_for_employee(employee_id, &query).await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "order",
    params(("id" = i64, Path, description = "Order id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order with items", body = OrderResponse),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    order_service: web::Data<OrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    respond(order_service.get(path.into_inner()).await)
}

#[utoipa::path(
    post,
    path = "/orders/{id}/status",
    tag = "order",
    params(("id" = i64, Path, description = "Order id")),
    request_body = ChangeStatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status changed", body = OrderResponse),
        (status = 409, description = "Order is completed or cancelled")
    )
)]
pub async fn change_status(
    order_service: web::Data<OrderService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<ChangeStatusRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        employee_service
            .require_any_capability(
                employee_id,
                &[
                    Capability::Operator,
                    Capability::Cashier,
                    Capability::Courier,
                    Capability::Waiter,
                ],
            )
            .await?;
        order_service
            .change_status(path.into_inner(), body.status_id, employee_id)
            .await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    put,
    path = "/orders/{id}/courier",
    tag = "order",
    params(("id" = i64, Path, description = "Order id")),
    request_body = AssignCourierRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Courier updated", body = OrderResponse),
        (status = 409, description = "Order is completed or cancelled")
    )
)]
pub async fn assign_courier(
    order_service: web::Data<OrderService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<AssignCourierRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        employee_service
            .require_capability(employee_id, Capability::Operator)
            .await?;
        order_service
            .assign_courier(path.into_inner(), body.courier_id, employee_id)
            .await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    post,
    path = "/orders/{id}/accept",
    tag = "order",
    params(("id" = i64, Path, description = "Order id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Waiter attached", body = OrderResponse),
        (status = 409, description = "Already served by another waiter")
    )
)]
pub async fn accept_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        order_service
            .accept_by_waiter(path.into_inner(), employee_id)
            .await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    post,
    path = "/orders/{id}/items",
    tag = "order",
    params(("id" = i64, Path, description = "Order id")),
    request_body = AddItemRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Item added", body = OrderResponse),
        (status = 409, description = "Order is completed or cancelled")
    )
)]
pub async fn add_item(
    order_service: web::Data<OrderService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<AddItemRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        employee_service
            .require_any_capability(employee_id, &[Capability::Operator, Capability::Waiter])
            .await?;
        order_service
            .add_item(path.into_inner(), body.into_inner())
            .await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    put,
    path = "/orders/{id}/items/{item_id}",
    tag = "order",
    params(
        ("id" = i64, Path, description = "Order id"),
        ("item_id" = i64, Path, description = "Line id")
    ),
    request_body = UpdateItemRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Quantity changed", body = OrderResponse),
        (status = 409, description = "Order is completed or cancelled")
    )
)]
pub async fn update_item(
    order_service: web::Data<OrderService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    body: web::Json<UpdateItemRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        employee_service
            .require_any_capability(employee_id, &[Capability::Operator, Capability::Waiter])
            .await?;
        let (order_id, item_id) = path.into_inner();
        order_service
            .update_item_quantity(order_id, item_id, body.quantity)
            .await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    get,
    path = "/orders/{id}/history",
    tag = "order",
    params(("id" = i64, Path, description = "Order id")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Status changes, newest first", body = Vec<StatusHistoryResponse>))
)]
pub async fn order_history(
    order_service: web::Data<OrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    respond(order_service.history(path.into_inner()).await)
}

#[utoipa::path(
    post,
    path = "/orders/{id}/production/{area}/done",
    tag = "order",
    params(
        ("id" = i64, Path, description = "Order id"),
        ("area" = PreparationArea, Path, description = "kitchen or bar")
    ),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Area finished", body = ProductionState))
)]
pub async fn mark_area_done(
    production_service: web::Data<ProductionService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    path: web::Path<(i64, PreparationArea)>,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        let (order_id, area) = path.into_inner();
        employee_service
            .require_capability(employee_id, Capability::for_area(area))
            .await?;
        production_service.mark_area_done(order_id, area).await
    }
    .await;
    respond(result)
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(get_orders))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}/status", web::post().to(change_status))
            .route("/{id}/courier", web::put().to(assign_courier))
            .route("/{id}/accept", web::post().to(accept_order))
            .route("/{id}/items", web::post().to(add_item))
            .route("/{id}/items/{item_id}", web::put().to(update_item))
            .route("/{id}/history", web::get().to(order_history))
            .route(
                "/{id}/production/{area}/done",
                web::post().to(mark_area_done),
            ),
    );
}
