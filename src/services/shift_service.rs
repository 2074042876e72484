use crate::entities::{
    PaymentMethod, TransactionKind, cash_transaction_entity as transactions,
    order_entity as orders, shift_entity as shifts,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CashTransactionRequest, CashTransactionResponse, CloseShiftRequest, CloseShiftResponse,
    OpenShiftRequest, PaginatedResponse, PaginationParams, ShiftQuery, ShiftReport, ShiftResponse,
};
use crate::utils::format_cents;
use chrono::Utc;
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

#[derive(Debug, FromQueryResult)]
struct SalesRow {
    payment_method: PaymentMethod,
    is_cash_turned_in: bool,
    total: Option<i64>,
}

#[derive(Debug, FromQueryResult)]
struct TransactionSumRow {
    kind: TransactionKind,
    total: Option<i64>,
}

#[derive(Clone)]
pub struct ShiftService {
    pool: DatabaseConnection,
}

impl ShiftService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Opens the single cash shift. Only one shift may be open at a time.
    pub async fn open(&self, employee_id: i64, req: OpenShiftRequest) -> AppResult<ShiftResponse> {
        if req.start_cash < 0 {
            return Err(AppError::ValidationError(
                "Starting cash cannot be negative".into(),
            ));
        }

        let txn = self.pool.begin().await?;

        if let Some(open) = find_open_shift(&txn).await? {
            return Err(if open.employee_id == employee_id {
                AppError::Conflict(format!("You already have an open shift #{}", open.id))
            } else {
                AppError::Conflict(format!(
                    "Shift #{} opened by employee #{} is still open",
                    open.id, open.employee_id
                ))
            });
        }

        let shift = shifts::ActiveModel {
            employee_id: Set(employee_id),
            started_at: Set(Utc::now()),
            ended_at: Set(None),
            start_cash: Set(req.start_cash),
            end_cash_actual: Set(None),
            total_cash_sales: Set(0),
            cash_turned_in: Set(0),
            total_card_sales: Set(0),
            service_in: Set(0),
            service_out: Set(0),
            handover_total: Set(0),
            theoretical_cash: Set(None),
            closed: Set(false),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        log::info!(
            "Shift #{} opened by employee #{employee_id} with {}",
            shift.id,
            format_cents(shift.start_cash)
        );
        Ok(shift.into())
    }

    /// X-report of the open shift, if any.
    pub async fn current(&self) -> AppResult<Option<ShiftReport>> {
        match find_open_shift(&self.pool).await? {
            Some(shift) => Ok(Some(live_report(&self.pool, &shift).await?)),
            None => Ok(None),
        }
    }

    /// Live figures for an open shift, frozen figures for a closed one.
    pub async fn statistics(&self, shift_id: i64) -> AppResult<ShiftReport> {
        let shift = find_shift(&self.pool, shift_id).await?;
        if shift.closed {
            Ok(frozen_report(&shift))
        } else {
            live_report(&self.pool, &shift).await
        }
    }

    /// Z-report: freezes the totals and records the counted cash.
    pub async fn close(&self, shift_id: i64, req: CloseShiftRequest) -> AppResult<CloseShiftResponse> {
        if req.end_cash_actual < 0 {
            return Err(AppError::ValidationError(
                "Counted cash cannot be negative".into(),
            ));
        }

        let txn = self.pool.begin().await?;
        let shift = find_shift(&txn, shift_id).await?;
        ensure_open(&shift)?;

        let live = live_report(&txn, &shift).await?;

        let mut am = shift.into_active_model();
        am.ended_at = Set(Some(Utc::now()));
        am.end_cash_actual = Set(Some(req.end_cash_actual));
        am.total_cash_sales = Set(live.cash_sales);
        am.cash_turned_in = Set(live.cash_turned_in);
        am.total_card_sales = Set(live.card_sales);
        am.service_in = Set(live.service_in);
        am.service_out = Set(live.service_out);
        am.handover_total = Set(live.handover_total);
        am.theoretical_cash = Set(Some(live.theoretical_cash));
        am.closed = Set(true);
        let closed = am.update(&txn).await?;

        txn.commit().await?;

        let report = frozen_report(&closed);
        let discrepancy_display = report.discrepancy_display().unwrap_or_default();
        if report.discrepancy.unwrap_or(0) != 0 {
            log::warn!(
                "Shift #{} closed with discrepancy {discrepancy_display}",
                closed.id
            );
        } else {
            log::info!("Shift #{} closed, cash matches", closed.id);
        }
        if live.cash_outstanding > 0 {
            log::warn!(
                "Shift #{} closed with {} still held by staff",
                closed.id,
                format_cents(live.cash_outstanding)
            );
        }

        Ok(CloseShiftResponse {
            report,
            discrepancy_display,
        })
    }

    /// Manual cash movement (`in`/`out`) on an open shift.
    pub async fn add_transaction(
        &self,
        shift_id: i64,
        employee_id: i64,
        req: CashTransactionRequest,
    ) -> AppResult<CashTransactionResponse> {
        if req.kind == TransactionKind::Handover {
            return Err(AppError::ValidationError(
                "Handovers are recorded through the handover operation".into(),
            ));
        }
        if req.amount <= 0 {
            return Err(AppError::ValidationError("Amount must be positive".into()));
        }

        let txn = self.pool.begin().await?;
        let shift = find_shift(&txn, shift_id).await?;
        ensure_open(&shift)?;

        let record = transactions::ActiveModel {
            shift_id: Set(shift.id),
            amount: Set(req.amount),
            kind: Set(req.kind),
            comment: Set(req.comment.trim().to_string()),
            employee_id: Set(Some(employee_id)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        log::info!(
            "Cash {} of {} on shift #{shift_id} by employee #{employee_id}",
            record.kind,
            format_cents(record.amount)
        );
        Ok(record.into())
    }

    pub async fn list_shifts(&self, query: &ShiftQuery) -> AppResult<PaginatedResponse<ShiftResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let base_query = shifts::Entity::find();
        let total = base_query.clone().count(&self.pool).await?;

        let items = base_query
            .order_by_desc(shifts::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            items.into_iter().map(Into::into).collect(),
            &params,
            total,
        ))
    }

    pub async fn list_transactions(&self, shift_id: i64) -> AppResult<Vec<CashTransactionResponse>> {
        find_shift(&self.pool, shift_id).await?;
        let list = transactions::Entity::find()
            .filter(transactions::Column::ShiftId.eq(shift_id))
            .order_by_asc(transactions::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }
}

pub async fn find_shift<C: ConnectionTrait>(db: &C, shift_id: i64) -> AppResult<shifts::Model> {
    shifts::Entity::find_by_id(shift_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Shift #{shift_id} not found")))
}

/// The open shift, looked up on every call.
pub async fn find_open_shift<C: ConnectionTrait>(db: &C) -> AppResult<Option<shifts::Model>> {
    Ok(shifts::Entity::find()
        .filter(shifts::Column::Closed.eq(false))
        .order_by_asc(shifts::Column::Id)
        .one(db)
        .await?)
}

/// Open shift of `employee_id`, falling back to whichever shift is open.
pub async fn find_open_shift_for<C: ConnectionTrait>(
    db: &C,
    employee_id: Option<i64>,
) -> AppResult<Option<shifts::Model>> {
    if let Some(employee_id) = employee_id {
        let own = shifts::Entity::find()
            .filter(shifts::Column::Closed.eq(false))
            .filter(shifts::Column::EmployeeId.eq(employee_id))
            .one(db)
            .await?;
        if own.is_some() {
            return Ok(own);
        }
    }
    find_open_shift(db).await
}

pub fn ensure_open(shift: &shifts::Model) -> AppResult<()> {
    if shift.closed {
        return Err(AppError::Conflict(format!("Shift #{} is already closed", shift.id)));
    }
    Ok(())
}

/// Attaches the order to an open shift unless it already has one. Without an
/// open shift the order stays unlinked and is left out of reporting.
pub async fn link_order_to_shift<C: ConnectionTrait>(
    db: &C,
    order: orders::Model,
    actor_id: Option<i64>,
) -> AppResult<orders::Model> {
    if order.shift_id.is_some() {
        return Ok(order);
    }

    let Some(shift) = find_open_shift_for(db, actor_id).await? else {
        log::warn!(
            "No open shift, order #{} stays unlinked and is excluded from reports",
            order.id
        );
        return Ok(order);
    };

    let mut am = order.into_active_model();
    am.shift_id = Set(Some(shift.id));
    let order = am.update(db).await?;
    log::debug!("Order #{} linked to shift #{}", order.id, shift.id);
    Ok(order)
}

/// Recomputes a shift's figures from its linked orders and transactions.
pub async fn live_report<C: ConnectionTrait>(db: &C, shift: &shifts::Model) -> AppResult<ShiftReport> {
    let sales = orders::Entity::find()
        .select_only()
        .column(orders::Column::PaymentMethod)
        .column(orders::Column::IsCashTurnedIn)
        .column_as(
            Expr::col(orders::Column::Total)
                .sum()
                .cast_as(Alias::new("BIGINT")),
            "total",
        )
        .filter(orders::Column::ShiftId.eq(shift.id))
        .group_by(orders::Column::PaymentMethod)
        .group_by(orders::Column::IsCashTurnedIn)
        .into_model::<SalesRow>()
        .all(db)
        .await?;

    let movements = transactions::Entity::find()
        .select_only()
        .column(transactions::Column::Kind)
        .column_as(
            Expr::col(transactions::Column::Amount)
                .sum()
                .cast_as(Alias::new("BIGINT")),
            "total",
        )
        .filter(transactions::Column::ShiftId.eq(shift.id))
        .group_by(transactions::Column::Kind)
        .into_model::<TransactionSumRow>()
        .all(db)
        .await?;

    let mut report = empty_report(shift);
    for row in sales {
        let total = row.total.unwrap_or(0);
        match row.payment_method {
            PaymentMethod::Cash => {
                report.cash_sales += total;
                if row.is_cash_turned_in {
                    report.cash_turned_in += total;
                }
            }
            PaymentMethod::Card => report.card_sales += total,
        }
    }
    for row in movements {
        let total = row.total.unwrap_or(0);
        match row.kind {
            TransactionKind::In => report.service_in += total,
            TransactionKind::Out => report.service_out += total,
            TransactionKind::Handover => report.handover_total += total,
        }
    }

    report.cash_outstanding = report.cash_sales - report.cash_turned_in;
    report.total_sales = report.cash_sales + report.card_sales;
    // handovers are already counted through the turned-in orders
    report.theoretical_cash =
        shift.start_cash + report.cash_turned_in + report.service_in - report.service_out;
    Ok(report)
}

/// Report of a closed shift, read back from the values frozen at close.
pub fn frozen_report(shift: &shifts::Model) -> ShiftReport {
    let theoretical_cash = shift.theoretical_cash.unwrap_or(
        shift.start_cash + shift.cash_turned_in + shift.service_in - shift.service_out,
    );
    ShiftReport {
        cash_sales: shift.total_cash_sales,
        cash_turned_in: shift.cash_turned_in,
        cash_outstanding: shift.total_cash_sales - shift.cash_turned_in,
        card_sales: shift.total_card_sales,
        total_sales: shift.total_cash_sales + shift.total_card_sales,
        service_in: shift.service_in,
        service_out: shift.service_out,
        handover_total: shift.handover_total,
        theoretical_cash,
        discrepancy: shift.end_cash_actual.map(|actual| actual - theoretical_cash),
        ..empty_report(shift)
    }
}

fn empty_report(shift: &shifts::Model) -> ShiftReport {
    ShiftReport {
        shift_id: shift.id,
        employee_id: shift.employee_id,
        started_at: shift.started_at,
        ended_at: shift.ended_at,
        closed: shift.closed,
        start_cash: shift.start_cash,
        cash_sales: 0,
        cash_turned_in: 0,
        cash_outstanding: 0,
        card_sales: 0,
        total_sales: 0,
        service_in: 0,
        service_out: 0,
        handover_total: 0,
        theoretical_cash: shift.start_cash,
        end_cash_actual: shift.end_cash_actual,
        discrepancy: None,
    }
}
