use actix_web::{HttpRequest, HttpResponse, Result, web};

use super::respond;
use crate::middlewares::current_employee_id;
use crate::models::*;
use crate::services::{EmployeeService, ProductService};

#[utoipa::path(
    get,
    path = "/products",
    tag = "product",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All products, hidden ones included", body = Vec<ProductResponse>))
)]
pub async fn list_products(product_service: web::Data<ProductService>) -> Result<HttpResponse> {
    respond(product_service.list().await)
}

#[utoipa::path(
    post,
    path = "/products",
    tag = "product",
    request_body = CreateProductRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid name or price")
    )
)]
pub async fn create_product(
    product_service: web::Data<ProductService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        employee_service
            .require_capability(employee_id, Capability::Admin)
            .await?;
        product_service.create(body.into_inner()).await
    }
    .await;
    respond(result)
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "product",
    params(("id" = i64, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 404, description = "Product not found")
    )
)]
pub async fn update_product(
    product_service: web::Data<ProductService>,
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        employee_service
            .require_capability(employee_id, Capability::Admin)
            .await?;
        product_service
            .update(path.into_inner(), body.into_inner())
            .await
    }
    .await;
    respond(result)
}

pub fn product_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .route("", web::get().to(list_products))
            .route("", web::post().to(create_product))
            .route("/{id}", web::put().to(update_product)),
    );
}
