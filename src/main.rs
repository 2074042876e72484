use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use bistro_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{SharedChatSender, TelegramService},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config =
        Config::from_toml().map_err(|e| startup_error("Failed to load configuration", e))?;

    let pool = create_pool(&config.database)
        .await
        .map_err(|e| startup_error("Failed to create database connection pool", e))?;

    run_migrations(&pool)
        .await
        .map_err(|e| startup_error("Failed to run database migrations", e))?;

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    let telegram = TelegramService::new(config.telegram.clone())
        .map_err(|e| startup_error("Failed to build the Telegram client", e))?;
    if !telegram.is_enabled() {
        log::warn!("Telegram bot token is not set, chat notifications are disabled");
    }
    let chat: SharedChatSender = Arc::new(telegram);

    let notification_service = NotificationService::new(
        pool.clone(),
        chat,
        config.telegram.operator_chat_id,
        config.notifications.retain_per_employee,
    );
    let auth_service = AuthService::new(pool.clone(), jwt_service.clone());
    let employee_service = EmployeeService::new(pool.clone());
    let status_service = StatusService::new(pool.clone());
    let product_service = ProductService::new(pool.clone());
    let shift_service = ShiftService::new(pool.clone());
    let debt_service = DebtService::new(pool.clone());
    let order_service = OrderService::new(pool.clone(), notification_service.clone());
    let production_service = ProductionService::new(pool.clone(), notification_service.clone());

    if let Some(admin) = &config.bootstrap_admin {
        employee_service
            .bootstrap_admin(admin)
            .await
            .map_err(|e| startup_error("Failed to create the bootstrap administrator", e))?;
    }

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(employee_service.clone()))
            .app_data(web::Data::new(status_service.clone()))
            .app_data(web::Data::new(product_service.clone()))
            .app_data(web::Data::new(shift_service.clone()))
            .app_data(web::Data::new(debt_service.clone()))
            .app_data(web::Data::new(order_service.clone()))
            .app_data(web::Data::new(production_service.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::public_config)
                    .configure(handlers::shift_config)
                    .configure(handlers::debt_config)
                    .configure(handlers::order_config)
                    .configure(handlers::status_config)
                    .configure(handlers::employee_config)
                    .configure(handlers::notification_config)
                    .configure(handlers::product_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
