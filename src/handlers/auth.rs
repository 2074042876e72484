use actix_web::{HttpRequest, HttpResponse, Result, web};

use super::respond;
use crate::middlewares::current_employee_id;
use crate::models::*;
use crate::services::{AuthService, EmployeeService};

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Wrong username or password")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    respond(auth_service.login(request.into_inner()).await)
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = AuthResponse),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh(
    auth_service: web::Data<AuthService>,
    request: web::Json<RefreshRequest>,
) -> Result<HttpResponse> {
    respond(auth_service.refresh_token(&request.refresh_token).await)
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current employee", body = EmployeeResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn me(
    employee_service: web::Data<EmployeeService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let result = async {
        let employee_id = current_employee_id(&req)?;
        employee_service.get(employee_id).await
    }
    .await;
    respond(result)
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            .route("/me", web::get().to(me)),
    );
}
