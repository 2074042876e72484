//! Shared helpers for service tests: an in-memory SQLite database built from
//! the entities, row seeders with sensible defaults and a recording chat sender.

use crate::entities::{
    DeliveryMethod, PaymentMethod, PreparationArea, cash_transaction_entity, employee_entity,
    notification_entity, order_entity, order_item_entity, order_status_entity, product_entity,
    role_entity, shift_entity, status_history_entity,
};
use crate::error::{AppError, AppResult};
use crate::external::{ChatSender, SharedChatSender};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, IntoActiveModel,
    Schema, Set,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// In-memory SQLite database with every table created from the entity definitions.
pub async fn setup_test_db() -> AppResult<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    db.execute(builder.build(&schema.create_table_from_entity(role_entity::Entity)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(employee_entity::Entity)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(order_status_entity::Entity)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(product_entity::Entity)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(shift_entity::Entity)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(order_entity::Entity)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(order_item_entity::Entity)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(status_history_entity::Entity)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(cash_transaction_entity::Entity)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(notification_entity::Entity)))
        .await?;

    Ok(db)
}

/// Status row with every flag off; tests switch on what they need.
pub fn status_model(id: i64, name: &str) -> order_status_entity::Model {
    order_status_entity::Model {
        id,
        name: name.to_string(),
        sort_order: id as i32,
        visible_to_operator: false,
        visible_to_courier: false,
        visible_to_waiter: false,
        visible_to_chef: false,
        visible_to_bartender: false,
        notify_customer: false,
        requires_kitchen_notify: false,
        is_completed_status: false,
        is_cancelled_status: false,
        customer_message: None,
        created_at: Utc::now(),
    }
}

/// Order row that was never stored; handy for the pure planners.
pub fn order_model(id: i64, payment_method: PaymentMethod, total: i64) -> order_entity::Model {
    let now = Utc::now();
    order_entity::Model {
        id,
        customer_name: "Guest".to_string(),
        customer_phone: None,
        customer_chat_id: None,
        delivery_method: DeliveryMethod::Pickup,
        address: None,
        table_label: None,
        payment_method,
        is_cash_turned_in: false,
        shift_id: None,
        courier_id: None,
        waiter_id: None,
        cash_holder_id: None,
        status_id: 1,
        total,
        kitchen_done: false,
        bar_done: false,
        comment: None,
        created_at: now,
        updated_at: now,
    }
}

pub async fn seed_status<C: ConnectionTrait>(
    db: &C,
    status: order_status_entity::Model,
) -> AppResult<order_status_entity::Model> {
    let mut am = status.into_active_model().reset_all();
    am.id = sea_orm::NotSet;
    Ok(am.insert(db).await?)
}

/// The default lifecycle, mirroring the seed migration.
pub struct DefaultStatuses {
    pub new: order_status_entity::Model,
    pub accepted: order_status_entity::Model,
    pub ready: order_status_entity::Model,
    pub on_the_way: order_status_entity::Model,
    pub completed: order_status_entity::Model,
    pub cancelled: order_status_entity::Model,
}

pub async fn seed_default_statuses(db: &DatabaseConnection) -> AppResult<DefaultStatuses> {
    let mut new = status_model(0, "New");
    new.visible_to_operator = true;

    let mut accepted = status_model(0, "Accepted");
    accepted.visible_to_operator = true;
    accepted.visible_to_chef = true;
    accepted.visible_to_bartender = true;
    accepted.requires_kitchen_notify = true;
    accepted.notify_customer = true;
    accepted.customer_message = Some("Your order is being prepared".to_string());

    let mut ready = status_model(0, "Ready");
    ready.visible_to_operator = true;
    ready.visible_to_courier = true;
    ready.visible_to_waiter = true;

    let mut on_the_way = status_model(0, "On the way");
    on_the_way.visible_to_courier = true;
    on_the_way.notify_customer = true;

    let mut completed = status_model(0, "Completed");
    completed.visible_to_operator = true;
    completed.is_completed_status = true;

    let mut cancelled = status_model(0, "Cancelled");
    cancelled.visible_to_operator = true;
    cancelled.is_cancelled_status = true;

    Ok(DefaultStatuses {
        new: seed_status(db, new).await?,
        accepted: seed_status(db, accepted).await?,
        ready: seed_status(db, ready).await?,
        on_the_way: seed_status(db, on_the_way).await?,
        completed: seed_status(db, completed).await?,
        cancelled: seed_status(db, cancelled).await?,
    })
}

pub async fn seed_role(
    db: &DatabaseConnection,
    name: &str,
    capabilities: &str,
) -> AppResult<role_entity::Model> {
    Ok(role_entity::ActiveModel {
        name: Set(name.to_string()),
        capabilities: Set(capabilities.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Active, on-shift employee with its own role carrying `capabilities`.
/// The chat id equals `1000 + employee id`.
pub async fn seed_staff(
    db: &DatabaseConnection,
    username: &str,
    capabilities: &str,
) -> AppResult<employee_entity::Model> {
    let role = seed_role(db, &format!("{username}-role"), capabilities).await?;
    let employee = employee_entity::ActiveModel {
        full_name: Set(format!("Staff {username}")),
        username: Set(username.to_string()),
        password_hash: Set("not-a-hash".to_string()),
        role_id: Set(role.id),
        chat_id: Set(None),
        is_on_shift: Set(true),
        cash_balance: Set(0),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let chat_id = 1000 + employee.id;
    let mut am = employee.into_active_model();
    am.chat_id = Set(Some(chat_id));
    Ok(am.update(db).await?)
}

pub async fn seed_product(
    db: &DatabaseConnection,
    name: &str,
    price: i64,
    area: PreparationArea,
) -> AppResult<product_entity::Model> {
    Ok(product_entity::ActiveModel {
        name: Set(name.to_string()),
        price: Set(price),
        preparation_area: Set(area),
        is_available: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Stores an order with the given lines; the total is their sum.
pub async fn seed_order(
    db: &DatabaseConnection,
    status_id: i64,
    payment_method: PaymentMethod,
    lines: &[(&str, i32, i64, PreparationArea)],
) -> AppResult<order_entity::Model> {
    let total = lines.iter().map(|(_, q, p, _)| *p * *q as i64).sum();
    let mut am = order_model(0, payment_method, total)
        .into_active_model()
        .reset_all();
    am.id = sea_orm::NotSet;
    am.status_id = Set(status_id);
    let order = am.insert(db).await?;

    for (name, quantity, price, area) in lines {
        order_item_entity::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(None),
            product_name: Set(name.to_string()),
            quantity: Set(*quantity),
            price: Set(*price),
            preparation_area: Set(*area),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(order)
}

pub async fn reload_order(db: &DatabaseConnection, id: i64) -> order_entity::Model {
    order_entity::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
}

pub async fn reload_employee(db: &DatabaseConnection, id: i64) -> employee_entity::Model {
    employee_entity::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
}

/// Chat sender that records every message and fails for selected chats.
#[derive(Default)]
pub struct RecordingChatSender {
    sent: Mutex<Vec<(i64, String)>>,
    failing: HashSet<i64>,
}

impl RecordingChatSender {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_for(chat_ids: &[i64]) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            failing: chat_ids.iter().copied().collect(),
        })
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn chats(&self) -> Vec<i64> {
        self.sent().into_iter().map(|(chat, _)| chat).collect()
    }

    pub fn shared(self: &Arc<Self>) -> SharedChatSender {
        self.clone()
    }
}

#[async_trait]
impl ChatSender for RecordingChatSender {
    async fn send_message(&self, chat_id: i64, text: &str) -> AppResult<()> {
        if self.failing.contains(&chat_id) {
            return Err(AppError::ExternalApiError(format!("chat {chat_id} unreachable")));
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}
