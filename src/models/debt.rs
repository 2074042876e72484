use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HandoverRequest {
    /// Employee handing the cash to the cashier.
    pub employee_id: i64,
    pub order_ids: Vec<i64>,
    /// Collecting shift; defaults to the currently open one.
    #[serde(default)]
    pub shift_id: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HandoverResponse {
    pub transaction_id: i64,
    pub shift_id: i64,
    pub employee_id: i64,
    pub order_ids: Vec<i64>,
    pub amount: i64,
    pub employee_balance: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DebtorResponse {
    pub employee_id: i64,
    pub full_name: String,
    pub cash_balance: i64,
    pub outstanding_orders: u64,
}

/// How the cash of a completed order was accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case", tag = "kind", content = "employee_id")]
pub enum CashSettlement {
    NotCash,
    CourierDebt(i64),
    WaiterDebt(i64),
    CollectedDirectly,
}
