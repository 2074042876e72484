use crate::entities::order_status_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub id: i64,
    pub name: String,
    pub sort_order: i32,
    pub visible_to_operator: bool,
    pub visible_to_courier: bool,
    pub visible_to_waiter: bool,
    pub visible_to_chef: bool,
    pub visible_to_bartender: bool,
    pub notify_customer: bool,
    pub requires_kitchen_notify: bool,
    pub is_completed_status: bool,
    pub is_cancelled_status: bool,
    pub customer_message: Option<String>,
}

impl From<order_status_entity::Model> for StatusResponse {
    fn from(m: order_status_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            sort_order: m.sort_order,
            visible_to_operator: m.visible_to_operator,
            visible_to_courier: m.visible_to_courier,
            visible_to_waiter: m.visible_to_waiter,
            visible_to_chef: m.visible_to_chef,
            visible_to_bartender: m.visible_to_bartender,
            notify_customer: m.notify_customer,
            requires_kitchen_notify: m.requires_kitchen_notify,
            is_completed_status: m.is_completed_status,
            is_cancelled_status: m.is_cancelled_status,
            customer_message: m.customer_message,
        }
    }
}

/// Flags of a status; missing fields keep their current (or `false`) value.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct StatusRequest {
    #[schema(example = "Cooking")]
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub visible_to_operator: Option<bool>,
    pub visible_to_courier: Option<bool>,
    pub visible_to_waiter: Option<bool>,
    pub visible_to_chef: Option<bool>,
    pub visible_to_bartender: Option<bool>,
    pub notify_customer: Option<bool>,
    pub requires_kitchen_notify: Option<bool>,
    pub is_completed_status: Option<bool>,
    pub is_cancelled_status: Option<bool>,
    pub customer_message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusHistoryResponse {
    pub status_id: i64,
    pub status_name: String,
    pub actor: String,
    pub created_at: DateTime<Utc>,
}
