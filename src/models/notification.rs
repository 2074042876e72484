use crate::entities::notification_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub id: i64,
    pub order_id: Option<i64>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<notification_entity::Model> for NotificationResponse {
    fn from(m: notification_entity::Model) -> Self {
        Self {
            id: m.id,
            order_id: m.order_id,
            message: m.message,
            created_at: m.created_at,
        }
    }
}
