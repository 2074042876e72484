use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "order_statuses")]
pub struct Model {
    #[sea_orm(primary_key)]
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
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// Completed and cancelled statuses freeze the order.
    pub fn is_terminal(&self) -> bool {
        self.is_completed_status || self.is_cancelled_status
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
