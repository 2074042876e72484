//! Customer-facing endpoints. No authentication; the middleware lets
//! everything under `/api/v1/public/` through.

use actix_web::{HttpResponse, Result, web};

use super::respond;
use crate::models::*;
use crate::services::{OrderService, ProductService};

#[utoipa::path(
    get,
    path = "/public/menu",
    tag = "public",
    responses((status = 200, description = "Available products", body = Vec<ProductResponse>))
)]
pub async fn get_menu(product_service: web::Data<ProductService>) -> Result<HttpResponse> {
    respond(product_service.menu().await)
}

#[utoipa::path(
    post,
    path = "/public/orders",
    tag = "public",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Invalid cart or contact details")
    )
)]
pub async fn checkout(
    order_service: web::Data<OrderService>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse> {
    respond(order_service.checkout(body.into_inner()).await)
}

#[utoipa::path(
    get,
    path = "/public/orders/{id}",
    tag = "public",
    params(
        ("id" = i64, Path, description = "Order id"),
        ("phone" = String, Query, description = "Phone given at checkout")
    ),
    responses(
        (status = 200, description = "Order status", body = PublicOrderResponse),
        (status = 404, description = "Unknown order or phone mismatch")
    )
)]
pub async fn track_order(
    order_service: web::Data<OrderService>,
    path: web::Path<i64>,
    query: web::Query<PublicOrderQuery>,
) -> Result<HttpResponse> {
    respond(order_service.get_public(path.into_inner(), &query.phone).await)
}

pub fn public_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/public")
            .route("/menu", web::get().to(get_menu))
            .route("/orders", web::post().to(checkout))
            .route("/orders/{id}", web::get().to(track_order)),
    );
}
