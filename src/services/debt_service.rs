use crate::entities::{
    PaymentMethod, TransactionKind, cash_transaction_entity as transactions,
    employee_entity as employees, order_entity as orders,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CashSettlement, DebtorResponse, HandoverRequest, HandoverResponse, OrderResponse,
};
use crate::services::order_service::build_order_responses;
use crate::services::shift_service::{ensure_open, find_open_shift_for, find_shift};
use crate::utils::format_cents;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

/// Cash orders held by `employee_id` that were not handed over yet.
fn outstanding_for(employee_id: i64) -> sea_orm::Select<orders::Entity> {
    orders::Entity::find()
        .filter(orders::Column::PaymentMethod.eq(PaymentMethod::Cash))
        .filter(orders::Column::IsCashTurnedIn.eq(false))
        .filter(orders::Column::CashHolderId.eq(employee_id))
}

async fn find_employee<C: ConnectionTrait>(db: &C, employee_id: i64) -> AppResult<employees::Model> {
    employees::Entity::find_by_id(employee_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee #{employee_id} not found")))
}

/// Books the order's cash as owed by `employee_id`. Card orders are left alone.
pub async fn register_employee_debt<C: ConnectionTrait>(
    db: &C,
    order: orders::Model,
    employee_id: i64,
) -> AppResult<orders::Model> {
    if order.payment_method != PaymentMethod::Cash {
        return Ok(order);
    }

    let employee = find_employee(db, employee_id).await?;
    let balance = employee.cash_balance + order.total;
    let mut am = employee.into_active_model();
    am.cash_balance = Set(balance);
    am.update(db).await?;

    let total = order.total;
    let mut am = order.into_active_model();
    am.is_cash_turned_in = Set(false);
    am.cash_holder_id = Set(Some(employee_id));
    am.updated_at = Set(Utc::now());
    let order = am.update(db).await?;

    log::info!(
        "Employee #{employee_id} now holds {} for order #{} (balance {})",
        format_cents(total),
        order.id,
        format_cents(balance)
    );
    Ok(order)
}

/// Decides who is accountable for a completed order's cash: the courier,
/// else the waiter, else the money is already in the drawer.
pub async fn settle_completed_order<C: ConnectionTrait>(
    db: &C,
    order: orders::Model,
) -> AppResult<(orders::Model, CashSettlement)> {
    if order.payment_method != PaymentMethod::Cash {
        return Ok((order, CashSettlement::NotCash));
    }

    if let Some(courier_id) = order.courier_id {
        let order = register_employee_debt(db, order, courier_id).await?;
        return Ok((order, CashSettlement::CourierDebt(courier_id)));
    }
    if let Some(waiter_id) = order.waiter_id {
        let order = register_employee_debt(db, order, waiter_id).await?;
        return Ok((order, CashSettlement::WaiterDebt(waiter_id)));
    }

    let mut am = order.into_active_model();
    am.is_cash_turned_in = Set(true);
    am.updated_at = Set(Utc::now());
    let order = am.update(db).await?;
    log::debug!("Order #{} cash collected directly", order.id);
    Ok((order, CashSettlement::CollectedDirectly))
}

#[derive(Clone)]
pub struct DebtService {
    pool: DatabaseConnection,
}

impl DebtService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Cashier collects cash from `req.employee_id` for the listed orders.
    /// Orders already handed over or held by someone else are skipped; if
    /// nothing remains the whole handover is rejected.
    pub async fn handover(&self, cashier_id: i64, req: HandoverRequest) -> AppResult<HandoverResponse> {
        if req.order_ids.is_empty() {
            return Err(AppError::ValidationError("No orders to hand over".into()));
        }

        let txn = self.pool.begin().await?;

        let shift = match req.shift_id {
            Some(id) => find_shift(&txn, id).await?,
            None => find_open_shift_for(&txn, Some(cashier_id))
                .await?
                .ok_or_else(|| AppError::Conflict("No open shift to collect cash into".into()))?,
        };
        ensure_open(&shift)?;

        let employee = find_employee(&txn, req.employee_id).await?;

        let eligible = outstanding_for(employee.id)
            .filter(orders::Column::Id.is_in(req.order_ids.iter().copied()))
            .order_by_asc(orders::Column::Id)
            .all(&txn)
            .await?;
        if eligible.is_empty() {
            return Err(AppError::Conflict(format!(
                "None of the orders are outstanding for employee #{}",
                employee.id
            )));
        }

        let now = Utc::now();
        let mut amount = 0;
        let mut order_ids = Vec::with_capacity(eligible.len());
        for order in eligible {
            amount += order.total;
            order_ids.push(order.id);
            let backfill = order.shift_id.is_none();
            let mut am = order.into_active_model();
            am.is_cash_turned_in = Set(true);
            if backfill {
                am.shift_id = Set(Some(shift.id));
            }
            am.updated_at = Set(now);
            am.update(&txn).await?;
        }

        // TODO: decide with the owners whether an amount above the balance should be rejected
        let balance = employee.cash_balance - amount;
        if balance < 0 {
            log::warn!(
                "Handover of {} exceeds balance {} of employee #{}, clamping to zero",
                format_cents(amount),
                format_cents(employee.cash_balance),
                employee.id
            );
        }
        let employee_name = employee.full_name.clone();
        let mut am = employee.into_active_model();
        am.cash_balance = Set(balance.max(0));
        let employee = am.update(&txn).await?;

        let listed = order_ids
            .iter()
            .map(|id| format!("#{id}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut comment = format!("Handover from {employee_name}: {listed}");
        if let Some(extra) = req.comment.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            comment.push_str(" (");
            comment.push_str(extra);
            comment.push(')');
        }

        let record = transactions::ActiveModel {
            shift_id: Set(shift.id),
            amount: Set(amount),
            kind: Set(TransactionKind::Handover),
            comment: Set(comment),
            employee_id: Set(Some(cashier_id)),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        log::info!(
            "Cashier #{cashier_id} collected {} from employee #{} on shift #{}",
            format_cents(amount),
            employee.id,
            shift.id
        );

        Ok(HandoverResponse {
            transaction_id: record.id,
            shift_id: shift.id,
            employee_id: employee.id,
            order_ids,
            amount,
            employee_balance: employee.cash_balance,
        })
    }

    /// Employees currently holding cash.
    pub async fn list_debtors(&self) -> AppResult<Vec<DebtorResponse>> {
        let holders = employees::Entity::find()
            .filter(employees::Column::CashBalance.gt(0))
            .order_by_desc(employees::Column::CashBalance)
            .all(&self.pool)
            .await?;

        let mut debtors = Vec::with_capacity(holders.len());
        for employee in holders {
            let outstanding_orders = outstanding_for(employee.id).count(&self.pool).await?;
            debtors.push(DebtorResponse {
                employee_id: employee.id,
                full_name: employee.full_name,
                cash_balance: employee.cash_balance,
                outstanding_orders,
            });
        }
        Ok(debtors)
    }

    pub async fn outstanding_orders(&self, employee_id: i64) -> AppResult<Vec<OrderResponse>> {
        find_employee(&self.pool, employee_id).await?;
        let list = outstanding_for(employee_id)
            .order_by_asc(orders::Column::Id)
            .all(&self.pool)
            .await?;
        build_order_responses(&self.pool, list).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PreparationArea;
    use crate::test_utils::{
        reload_employee, reload_order, seed_order, seed_staff, seed_status, setup_test_db,
        status_model,
    };

    #[tokio::test]
    async fn test_exactly_one_settlement_per_cash_order() {
        let db = setup_test_db().await.unwrap();
        let courier = seed_staff(&db, "runner", "courier").await.unwrap();
        let waiter = seed_staff(&db, "tables", "waiter").await.unwrap();
        let status = seed_status(&db, status_model(0, "Completed")).await.unwrap();
        let line = [("Pizza", 1, 150, PreparationArea::Kitchen)];

        let mut both = seed_order(&db, status.id, PaymentMethod::Cash, &line).await.unwrap();
        both.courier_id = Some(courier.id);
        both.waiter_id = Some(waiter.id);
        let (both, settlement) = settle_completed_order(&db, both).await.unwrap();
        assert_eq!(settlement, CashSettlement::CourierDebt(courier.id));
        assert!(!both.is_cash_turned_in);
        assert_eq!(both.cash_holder_id, Some(courier.id));

        let mut served = seed_order(&db, status.id, PaymentMethod::Cash, &line).await.unwrap();
        served.waiter_id = Some(waiter.id);
        let (_, settlement) = settle_completed_order(&db, served).await.unwrap();
        assert_eq!(settlement, CashSettlement::WaiterDebt(waiter.id));

        let counter = seed_order(&db, status.id, PaymentMethod::Cash, &line).await.unwrap();
        let (counter, settlement) = settle_completed_order(&db, counter).await.unwrap();
        assert_eq!(settlement, CashSettlement::CollectedDirectly);
        assert!(counter.is_cash_turned_in);
        assert_eq!(counter.cash_holder_id, None);

        let mut card = seed_order(&db, status.id, PaymentMethod::Card, &line).await.unwrap();
        card.courier_id = Some(courier.id);
        let (_, settlement) = settle_completed_order(&db, card).await.unwrap();
        assert_eq!(settlement, CashSettlement::NotCash);

        assert_eq!(reload_employee(&db, courier.id).await.cash_balance, 150);
        assert_eq!(reload_employee(&db, waiter.id).await.cash_balance, 150);
    }

    #[tokio::test]
    async fn test_handover_is_idempotent_and_backfills_shift() {
        let db = setup_test_db().await.unwrap();
        let cashier = seed_staff(&db, "anna", "cashier").await.unwrap();
        let courier = seed_staff(&db, "runner", "courier").await.unwrap();
        let status = seed_status(&db, status_model(0, "Completed")).await.unwrap();
        let shift = crate::services::ShiftService::new(db.clone())
            .open(cashier.id, crate::models::OpenShiftRequest { start_cash: 0 })
            .await
            .unwrap();

        let order = seed_order(&db, status.id, PaymentMethod::Cash, &[("Pizza", 2, 75, PreparationArea::Kitchen)])
            .await
            .unwrap();
        let order = register_employee_debt(&db, order, courier.id).await.unwrap();
        assert_eq!(order.shift_id, None);

        let service = DebtService::new(db.clone());
        let debtors = service.list_debtors().await.unwrap();
        assert_eq!(debtors.len(), 1);
        assert_eq!(debtors[0].outstanding_orders, 1);

        let req = || HandoverRequest {
            employee_id: courier.id,
            order_ids: vec![order.id],
            shift_id: None,
            comment: None,
        };
        let done = service.handover(cashier.id, req()).await.unwrap();
        assert_eq!(done.amount, 150);
        assert_eq!(done.employee_balance, 0);
        assert_eq!(done.shift_id, shift.id);

        let order = reload_order(&db, order.id).await;
        assert!(order.is_cash_turned_in);
        assert_eq!(order.shift_id, Some(shift.id));

        assert!(matches!(
            service.handover(cashier.id, req()).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(reload_employee(&db, courier.id).await.cash_balance, 0);

        let handovers = transactions::Entity::find()
            .filter(transactions::Column::Kind.eq(TransactionKind::Handover))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(handovers.len(), 1);
        assert!(service.list_debtors().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handover_balance_never_negative() {
        let db = setup_test_db().await.unwrap();
        let cashier = seed_staff(&db, "anna", "cashier").await.unwrap();
        let courier = seed_staff(&db, "runner", "courier").await.unwrap();
        let status = seed_status(&db, status_model(0, "Completed")).await.unwrap();
        crate::services::ShiftService::new(db.clone())
            .open(cashier.id, crate::models::OpenShiftRequest { start_cash: 0 })
            .await
            .unwrap();

        let order = seed_order(&db, status.id, PaymentMethod::Cash, &[("Cake", 1, 400, PreparationArea::Kitchen)])
            .await
            .unwrap();
        register_employee_debt(&db, order.clone(), courier.id).await.unwrap();

        // balance drifted below the order total
        let mut am = reload_employee(&db, courier.id).await.into_active_model();
        am.cash_balance = Set(100);
        am.update(&db).await.unwrap();

        let done = DebtService::new(db.clone())
            .handover(
                cashier.id,
                HandoverRequest {
                    employee_id: courier.id,
                    order_ids: vec![order.id],
                    shift_id: None,
                    comment: Some("late evening".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(done.amount, 400);
        assert_eq!(done.employee_balance, 0);
    }

    #[tokio::test]
    async fn test_handover_requires_open_shift_and_employee() {
        let db = setup_test_db().await.unwrap();
        let cashier = seed_staff(&db, "anna", "cashier").await.unwrap();
        let service = DebtService::new(db.clone());

        let no_shift = service
            .handover(
                cashier.id,
                HandoverRequest {
                    employee_id: cashier.id,
                    order_ids: vec![1],
                    shift_id: None,
                    comment: None,
                },
            )
            .await;
        assert!(matches!(no_shift, Err(AppError::Conflict(_))));

        crate::services::ShiftService::new(db.clone())
            .open(cashier.id, crate::models::OpenShiftRequest { start_cash: 0 })
            .await
            .unwrap();
        let missing = service
            .handover(
                cashier.id,
                HandoverRequest {
                    employee_id: 4242,
                    order_ids: vec![1],
                    shift_id: None,
                    comment: None,
                },
            )
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_handover_skips_orders_not_held_by_employee() {
        let db = setup_test_db().await.unwrap();
        let cashier = seed_staff(&db, "anna", "cashier").await.unwrap();
        let first = seed_staff(&db, "runner", "courier").await.unwrap();
        let second = seed_staff(&db, "rider", "courier").await.unwrap();
        let status = seed_status(&db, status_model(0, "Completed")).await.unwrap();
        crate::services::ShiftService::new(db.clone())
            .open(cashier.id, crate::models::OpenShiftRequest { start_cash: 0 })
            .await
            .unwrap();

        let line = [("Soup", 1, 100, PreparationArea::Kitchen)];
        let own = seed_order(&db, status.id, PaymentMethod::Cash, &line).await.unwrap();
        let own = register_employee_debt(&db, own, first.id).await.unwrap();
        let foreign = seed_order(&db, status.id, PaymentMethod::Cash, &line).await.unwrap();
        let foreign = register_employee_debt(&db, foreign, second.id).await.unwrap();

        let done = DebtService::new(db.clone())
            .handover(
                cashier.id,
                HandoverRequest {
                    employee_id: first.id,
                    order_ids: vec![own.id, foreign.id, 9999],
                    shift_id: None,
                    comment: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(done.amount, 100);
        assert_eq!(done.order_ids, vec![own.id]);
        assert_eq!(reload_employee(&db, first.id).await.cash_balance, 0);

        assert_eq!(reload_employee(&db, second.id).await.cash_balance, 100);
        let foreign = reload_order(&db, foreign.id).await;
        assert!(!foreign.is_cash_turned_in);
        assert_eq!(foreign.cash_holder_id, Some(second.id));
    }

    #[tokio::test]
    async fn test_handover_rejects_closed_or_unknown_shift() {
        let db = setup_test_db().await.unwrap();
        let cashier = seed_staff(&db, "anna", "cashier").await.unwrap();
        let courier = seed_staff(&db, "runner", "courier").await.unwrap();
        let status = seed_status(&db, status_model(0, "Completed")).await.unwrap();
        let shifts = crate::services::ShiftService::new(db.clone());
        let shift = shifts
            .open(cashier.id, crate::models::OpenShiftRequest { start_cash: 0 })
            .await
            .unwrap();
        shifts
            .close(shift.id, crate::models::CloseShiftRequest { end_cash_actual: 0 })
            .await
            .unwrap();

        let order = seed_order(&db, status.id, PaymentMethod::Cash, &[("Tea", 1, 100, PreparationArea::Bar)])
            .await
            .unwrap();
        let order = register_employee_debt(&db, order, courier.id).await.unwrap();

        let service = DebtService::new(db.clone());
        let request = |shift_id| HandoverRequest {
            employee_id: courier.id,
            order_ids: vec![order.id],
            shift_id: Some(shift_id),
            comment: None,
        };

        let closed = service.handover(cashier.id, request(shift.id)).await;
        assert!(matches!(closed, Err(AppError::Conflict(_))));
        let unknown = service.handover(cashier.id, request(4242)).await;
        assert!(matches!(unknown, Err(AppError::NotFound(_))));

        assert_eq!(reload_employee(&db, courier.id).await.cash_balance, 100);
        assert!(!reload_order(&db, order.id).await.is_cash_turned_in);
        let handovers = transactions::Entity::find()
            .filter(transactions::Column::Kind.eq(TransactionKind::Handover))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(handovers, 0);
    }
}
