use crate::entities::{TransactionKind, cash_transaction_entity, shift_entity};
use crate::utils::format_cents;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OpenShiftRequest {
    /// Declared cash in the drawer, in cents.
    #[schema(example = 50000)]
    pub start_cash: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CloseShiftRequest {
    /// Counted cash in the drawer, in cents.
    #[schema(example = 84000)]
    pub end_cash_actual: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CashTransactionRequest {
    /// `in` or `out`; handovers go through the handover endpoint.
    pub kind: TransactionKind,
    #[schema(example = 2000)]
    pub amount: i64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShiftQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShiftResponse {
    pub id: i64,
    pub employee_id: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub start_cash: i64,
    pub end_cash_actual: Option<i64>,
    pub closed: bool,
}

impl From<shift_entity::Model> for ShiftResponse {
    fn from(m: shift_entity::Model) -> Self {
        Self {
            id: m.id,
            employee_id: m.employee_id,
            started_at: m.started_at,
            ended_at: m.ended_at,
            start_cash: m.start_cash,
            end_cash_actual: m.end_cash_actual,
            closed: m.closed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CashTransactionResponse {
    pub id: i64,
    pub shift_id: i64,
    pub amount: i64,
    pub kind: TransactionKind,
    pub comment: String,
    pub employee_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<cash_transaction_entity::Model> for CashTransactionResponse {
    fn from(m: cash_transaction_entity::Model) -> Self {
        Self {
            id: m.id,
            shift_id: m.shift_id,
            amount: m.amount,
            kind: m.kind,
            comment: m.comment,
            employee_id: m.employee_id,
            created_at: m.created_at,
        }
    }
}

/// X-report (open shift, live) or Z-report (closed shift, frozen values).
/// All amounts in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShiftReport {
    pub shift_id: i64,
    pub employee_id: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub closed: bool,
    pub start_cash: i64,
    /// All cash orders linked to the shift.
    pub cash_sales: i64,
    /// Cash orders whose money is already in the drawer.
    pub cash_turned_in: i64,
    /// Cash still held by couriers/waiters.
    pub cash_outstanding: i64,
    pub card_sales: i64,
    pub total_sales: i64,
    pub service_in: i64,
    pub service_out: i64,
    /// Informational; already contained in `cash_turned_in`.
    pub handover_total: i64,
    pub theoretical_cash: i64,
    pub end_cash_actual: Option<i64>,
    /// `end_cash_actual - theoretical_cash`, only once counted.
    pub discrepancy: Option<i64>,
}

impl ShiftReport {
    /// `"-10.00"` style rendering of the discrepancy for operator messages.
    pub fn discrepancy_display(&self) -> Option<String> {
        self.discrepancy.map(format_cents)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CloseShiftResponse {
    pub report: ShiftReport,
    pub discrepancy_display: String,
}
