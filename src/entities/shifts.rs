use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "shifts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub employee_id: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub start_cash: i64,
    pub end_cash_actual: Option<i64>,
    pub total_cash_sales: i64,
    pub cash_turned_in: i64,
    pub total_card_sales: i64,
    pub service_in: i64,
    pub service_out: i64,
    pub handover_total: i64,
    pub theoretical_cash: Option<i64>,
    pub closed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
