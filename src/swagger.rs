use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{DeliveryMethod, PaymentMethod, PreparationArea, TransactionKind};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::me,
        handlers::shift::open_shift,
        handlers::shift::current_shift,
        handlers::shift::list_shifts,
        handlers::shift::shift_report,
        handlers::shift::close_shift,
        handlers::shift::add_transaction,
        handlers::shift::list_transactions,
        handlers::debt::list_debtors,
        handlers::debt::outstanding_orders,
        handlers::debt::handover,
        handlers::order::get_orders,
        handlers::order::get_order,
        handlers::order::change_status,
        handlers::order::assign_courier,
        handlers::order::accept_order,
        handlers::order::add_item,
        handlers::order::update_item,
        handlers::order::order_history,
        handlers::order::mark_area_done,
        handlers::status::list_statuses,
        handlers::status::create_status,
        handlers::status::update_status,
        handlers::employee::list_employees,
        handlers::employee::create_employee,
        handlers::employee::list_roles,
        handlers::employee::set_on_shift,
        handlers::notification::poll_notifications,
        handlers::product::list_products,
        handlers::product::create_product,
        handlers::product::update_product,
        handlers::public::get_menu,
        handlers::public::checkout,
        handlers::public::track_order,
    ),
    components(
        schemas(
            LoginRequest,
            RefreshRequest,
            AuthResponse,
            Capability,
            RoleResponse,
            EmployeeResponse,
            CreateEmployeeRequest,
            SetOnShiftRequest,
            OpenShiftRequest,
            CloseShiftRequest,
            CashTransactionRequest,
            ShiftQuery,
            ShiftResponse,
            CashTransactionResponse,
            ShiftReport,
            CloseShiftResponse,
            TransactionKind,
            HandoverRequest,
            HandoverResponse,
            DebtorResponse,
            StatusRequest,
            StatusResponse,
            StatusHistoryResponse,
            CheckoutItem,
            CheckoutRequest,
            ChangeStatusRequest,
            AssignCourierRequest,
            AddItemRequest,
            UpdateItemRequest,
            OrderQuery,
            OrderItemResponse,
            OrderResponse,
            PublicOrderQuery,
            PublicOrderResponse,
            ProductionState,
            PaymentMethod,
            DeliveryMethod,
            PreparationArea,
            CreateProductRequest,
            UpdateProductRequest,
            ProductResponse,
            NotificationResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Staff authentication"),
        (name = "shift", description = "Cash shifts and X/Z reports"),
        (name = "debt", description = "Cash held by couriers and waiters"),
        (name = "order", description = "Order processing"),
        (name = "status", description = "Order status catalogue"),
        (name = "employee", description = "Staff and roles"),
        (name = "notification", description = "In-app notifications"),
        (name = "product", description = "Menu management"),
        (name = "public", description = "Storefront for customers"),
    ),
    info(
        title = "Bistro Backend API",
        version = "1.0.0",
        description = "Back-office REST API: orders, production, cash shifts"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
