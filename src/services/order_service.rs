use crate::entities::{
    DeliveryMethod, order_entity as orders, order_item_entity as order_items,
    order_status_entity as statuses, product_entity as products,
    status_history_entity as history,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AddItemRequest, Capability, CheckoutRequest, OrderQuery, OrderResponse, PaginatedResponse,
    PaginationParams, PublicOrderResponse, StaffMember, StatusHistoryResponse,
};
use crate::services::debt_service::settle_completed_order;
use crate::services::employee_service::{describe_actor, find_staff_member, load_staff};
use crate::services::notification_service::{
    NotificationService, Outbox, plan_status_change, write_in_app,
};
use crate::services::production_service::distribute;
use crate::services::shift_service::link_order_to_shift;
use crate::services::status_service::{ensure_mutable, find_status, initial_status};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use std::collections::HashMap;

const MAX_LINE_QUANTITY: i32 = 99;

#[derive(Clone)]
pub struct OrderService {
    pool: DatabaseConnection,
    notifications: NotificationService,
}

impl OrderService {
    pub fn new(pool: DatabaseConnection, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    /// Creates an order in the initial status. Product names and prices are
    /// copied onto the lines.
    pub async fn checkout(&self, req: CheckoutRequest) -> AppResult<OrderResponse> {
        let customer_name = req.customer_name.trim().to_string();
        if customer_name.is_empty() {
            return Err(AppError::ValidationError("Customer name is required".into()));
        }
        if req.items.is_empty() {
            return Err(AppError::ValidationError("Order has no items".into()));
        }
        for item in &req.items {
            validate_quantity(item.quantity)?;
        }
        match req.delivery_method {
            DeliveryMethod::Delivery
                if req.address.as_deref().is_none_or(|a| a.trim().is_empty()) =>
            {
                return Err(AppError::ValidationError(
                    "Delivery orders need an address".into(),
                ));
            }
            DeliveryMethod::DineIn
                if req.table_label.as_deref().is_none_or(|t| t.trim().is_empty()) =>
            {
                return Err(AppError::ValidationError(
                    "Dine-in orders need a table".into(),
                ));
            }
            _ => {}
        }

        let txn = self.pool.begin().await?;

        let ids: Vec<i64> = req.items.iter().map(|i| i.product_id).collect();
        let catalog: HashMap<i64, products::Model> = products::Entity::find()
            .filter(products::Column::Id.is_in(ids))
            .all(&txn)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut lines = Vec::with_capacity(req.items.len());
        for item in &req.items {
            let product = catalog
                .get(&item.product_id)
                .filter(|p| p.is_available)
                .ok_or_else(|| {
                    AppError::ValidationError(format!(
                        "Product #{} is not available",
                        item.product_id
                    ))
                })?;
            lines.push((product, item.quantity));
        }
        let total: i64 = lines.iter().map(|(p, q)| p.price * *q as i64).sum();

        let status = initial_status(&txn).await?;
        let now = Utc::now();
        let order = orders::ActiveModel {
            customer_name: Set(customer_name),
            customer_phone: Set(req.customer_phone),
            customer_chat_id: Set(req.customer_chat_id),
            delivery_method: Set(req.delivery_method),
            address: Set(req.address),
            table_label: Set(req.table_label),
            payment_method: Set(req.payment_method),
            is_cash_turned_in: Set(false),
            shift_id: Set(None),
            courier_id: Set(None),
            waiter_id: Set(None),
            cash_holder_id: Set(None),
            status_id: Set(status.id),
            total: Set(total),
            kitchen_done: Set(false),
            bar_done: Set(false),
            comment: Set(req.comment),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for (product, quantity) in lines {
            order_items::ActiveModel {
                order_id: Set(order.id),
                product_id: Set(Some(product.id)),
                product_name: Set(product.name.clone()),
                quantity: Set(quantity),
                price: Set(product.price),
                preparation_area: Set(product.preparation_area),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        append_history(&txn, order.id, status.id, "customer").await?;
        let staff = load_staff(&txn).await?;
        let (order, outbox) = self
            .enter_status(&txn, order, &status, None, &staff)
            .await?;
        write_in_app(&txn, &outbox).await?;

        txn.commit().await?;
        log::info!(
            "Order #{} placed ({}, {})",
            order.id,
            order.payment_method,
            order.delivery_method
        );

        self.notifications.send_chats(&outbox).await;
        self.get(order.id).await
    }

    pub async fn get(&self, order_id: i64) -> AppResult<OrderResponse> {
        let order = find_order(&self.pool, order_id).await?;
        let mut list = build_order_responses(&self.pool, vec![order]).await?;
        list.pop()
            .ok_or_else(|| AppError::NotFound(format!("Order #{order_id} not found")))
    }

    /// Customer lookup; the phone number has to match the order.
    pub async fn get_public(&self, order_id: i64, phone: &str) -> AppResult<PublicOrderResponse> {
        let order = find_order(&self.pool, order_id).await?;
        let matches = order
            .customer_phone
            .as_deref()
            .is_some_and(|p| normalize_phone(p) == normalize_phone(phone));
        if !matches {
            return Err(AppError::NotFound(format!("Order #{order_id} not found")));
        }
        let view = self.get(order_id).await?;
        Ok(PublicOrderResponse {
            id: view.id,
            status_name: view.status_name,
            total: view.total,
            items: view.items,
        })
    }

    /// Orders the employee may see: statuses visible to one of their
    /// capabilities, plus anything assigned to them.
    pub async fn list_for_employee(
        &self,
        employee_id: i64,
        query: &OrderQuery,
    ) -> AppResult<PaginatedResponse<OrderResponse>> {
        let member = find_staff_member(&self.pool, employee_id).await?;
        let params = PaginationParams::new(query.page, query.per_page);

        let visible: Vec<i64> = statuses::Entity::find()
            .all(&self.pool)
            .await?
            .into_iter()
            .filter(|s| member.capabilities.can_see(s))
            .map(|s| s.id)
            .collect();

        let mut base_query = orders::Entity::find().filter(
            Condition::any()
                .add(orders::Column::StatusId.is_in(visible))
                .add(orders::Column::CourierId.eq(employee_id))
                .add(orders::Column::WaiterId.eq(employee_id)),
        );
        if let Some(status_id) = query.status_id {
            base_query = base_query.filter(orders::Column::StatusId.eq(status_id));
        }

        let total = base_query.clone().count(&self.pool).await?;
        let list = base_query
            .order_by_desc(orders::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            build_order_responses(&self.pool, list).await?,
            &params,
            total,
        ))
    }

    /// Moves the order to `status_id` and runs the status side effects.
    pub async fn change_status(
        &self,
        order_id: i64,
        status_id: i64,
        actor_id: i64,
    ) -> AppResult<OrderResponse> {
        let txn = self.pool.begin().await?;

        let order = find_order(&txn, order_id).await?;
        let current = find_status(&txn, order.status_id).await?;
        ensure_mutable(order.id, &current)?;
        let next = find_status(&txn, status_id).await?;
        let actor = find_staff_member(&txn, actor_id).await?;

        let mut am = order.into_active_model();
        am.status_id = Set(next.id);
        am.updated_at = Set(Utc::now());
        let order = am.update(&txn).await?;
        append_history(&txn, order.id, next.id, &describe_actor(&actor)).await?;

        let staff = load_staff(&txn).await?;
        let (order, outbox) = self
            .enter_status(&txn, order, &next, Some(actor_id), &staff)
            .await?;
        write_in_app(&txn, &outbox).await?;

        txn.commit().await?;
        log::info!(
            "Order #{} moved from \"{}\" to \"{}\" by employee #{actor_id}",
            order.id,
            current.name,
            next.name
        );

        self.notifications.send_chats(&outbox).await;
        self.get(order.id).await
    }

    /// Sets or clears the courier.
    pub async fn assign_courier(
        &self,
        order_id: i64,
        courier_id: Option<i64>,
        actor_id: i64,
    ) -> AppResult<OrderResponse> {
        let txn = self.pool.begin().await?;

        let order = find_order(&txn, order_id).await?;
        ensure_mutable(order.id, &find_status(&txn, order.status_id).await?)?;

        let courier = match courier_id {
            Some(id) => Some(require_member(&txn, id, Capability::Courier).await?),
            None => None,
        };

        let mut am = order.into_active_model();
        am.courier_id = Set(courier_id);
        am.updated_at = Set(Utc::now());
        let order = am.update(&txn).await?;

        let mut outbox = Outbox::default();
        if let Some(member) = courier.as_ref().filter(|m| m.id != actor_id) {
            outbox.to_employee(
                member,
                Some(order.id),
                &format!("You have been assigned order #{}", order.id),
            );
        }
        write_in_app(&txn, &outbox).await?;
        txn.commit().await?;

        match &courier {
            Some(member) => log::info!("Order #{} assigned to courier #{}", order.id, member.id),
            None => log::info!("Order #{} courier removed", order.id),
        }

        self.notifications.send_chats(&outbox).await;
        self.get(order.id).await
    }

    /// A waiter takes the table. A different waiter cannot take it over.
    pub async fn accept_by_waiter(&self, order_id: i64, waiter_id: i64) -> AppResult<OrderResponse> {
        let txn = self.pool.begin().await?;

        let order = find_order(&txn, order_id).await?;
        ensure_mutable(order.id, &find_status(&txn, order.status_id).await?)?;
        require_member(&txn, waiter_id, Capability::Waiter).await?;

        match order.waiter_id {
            Some(current) if current == waiter_id => {
                txn.commit().await?;
                return self.get(order_id).await;
            }
            Some(current) => {
                return Err(AppError::Conflict(format!(
                    "Order #{order_id} is already served by waiter #{current}"
                )));
            }
            None => {}
        }

        let mut am = order.into_active_model();
        am.waiter_id = Set(Some(waiter_id));
        am.updated_at = Set(Utc::now());
        am.update(&txn).await?;
        txn.commit().await?;

        log::info!("Order #{order_id} accepted by waiter #{waiter_id}");
        self.get(order_id).await
    }

    pub async fn add_item(&self, order_id: i64, req: AddItemRequest) -> AppResult<OrderResponse> {
        validate_quantity(req.quantity)?;
        let txn = self.pool.begin().await?;

        let order = find_order(&txn, order_id).await?;
        ensure_mutable(order.id, &find_status(&txn, order.status_id).await?)?;

        let product = products::Entity::find_by_id(req.product_id)
            .one(&txn)
            .await?
            .filter(|p| p.is_available)
            .ok_or_else(|| {
                AppError::ValidationError(format!("Product #{} is not available", req.product_id))
            })?;

        order_items::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(Some(product.id)),
            product_name: Set(product.name),
            quantity: Set(req.quantity),
            price: Set(product.price),
            preparation_area: Set(product.preparation_area),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        recalculate_total(&txn, order).await?;
        txn.commit().await?;
        self.get(order_id).await
    }

    /// Changes a line's quantity; `0` removes the line.
    pub async fn update_item_quantity(
        &self,
        order_id: i64,
        item_id: i64,
        quantity: i32,
    ) -> AppResult<OrderResponse> {
        if quantity != 0 {
            validate_quantity(quantity)?;
        }
        let txn = self.pool.begin().await?;

        let order = find_order(&txn, order_id).await?;
        ensure_mutable(order.id, &find_status(&txn, order.status_id).await?)?;

        let item = order_items::Entity::find_by_id(item_id)
            .filter(order_items::Column::OrderId.eq(order.id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Item #{item_id} not found in order #{order_id}"))
            })?;

        if quantity == 0 {
            item.delete(&txn).await?;
        } else {
            let mut am = item.into_active_model();
            am.quantity = Set(quantity);
            am.update(&txn).await?;
        }

        recalculate_total(&txn, order).await?;
        txn.commit().await?;
        self.get(order_id).await
    }

    /// Status history, newest first.
    pub async fn history(&self, order_id: i64) -> AppResult<Vec<StatusHistoryResponse>> {
        find_order(&self.pool, order_id).await?;
        let names: HashMap<i64, String> = statuses::Entity::find()
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        let entries = history::Entity::find()
            .filter(history::Column::OrderId.eq(order_id))
            .order_by_desc(history::Column::Id)
            .all(&self.pool)
            .await?;

        Ok(entries
            .into_iter()
            .map(|h| StatusHistoryResponse {
                status_name: names
                    .get(&h.status_id)
                    .cloned()
                    .unwrap_or_else(|| format!("#{}", h.status_id)),
                status_id: h.status_id,
                actor: h.actor,
                created_at: h.created_at,
            })
            .collect())
    }

    /// Side effects of entering `status`: production, then shift linkage and
    /// cash settlement on completion, then the fan-out plan.
    async fn enter_status<C: ConnectionTrait>(
        &self,
        db: &C,
        mut order: orders::Model,
        status: &statuses::Model,
        actor_id: Option<i64>,
        staff: &[StaffMember],
    ) -> AppResult<(orders::Model, Outbox)> {
        let operator_chat_id = self.notifications.operator_chat_id();
        let mut outbox = Outbox::default();

        if status.requires_kitchen_notify {
            let (distributed, tickets) = distribute(db, order, staff, operator_chat_id).await?;
            order = distributed;
            outbox.merge(tickets);
        }

        if status.is_completed_status {
            order = link_order_to_shift(db, order, actor_id).await?;
            let (settled, settlement) = settle_completed_order(db, order).await?;
            order = settled;
            log::info!("Order #{} completed, cash: {settlement:?}", order.id);
        }

        let mut plan = plan_status_change(&order, status, staff, actor_id, operator_chat_id);
        plan.merge(outbox);
        Ok((order, plan))
    }
}

fn validate_quantity(quantity: i32) -> AppResult<()> {
    if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
        return Err(AppError::ValidationError(format!(
            "Quantity must be between 1 and {MAX_LINE_QUANTITY}"
        )));
    }
    Ok(())
}

fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

async fn require_member<C: ConnectionTrait>(
    db: &C,
    employee_id: i64,
    capability: Capability,
) -> AppResult<StaffMember> {
    let member = find_staff_member(db, employee_id).await?;
    if !member.has(capability) {
        return Err(AppError::ValidationError(format!(
            "Employee #{employee_id} is not a {capability}"
        )));
    }
    Ok(member)
}

pub async fn find_order<C: ConnectionTrait>(db: &C, order_id: i64) -> AppResult<orders::Model> {
    orders::Entity::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order #{order_id} not found")))
}

async fn append_history<C: ConnectionTrait>(
    db: &C,
    order_id: i64,
    status_id: i64,
    actor: &str,
) -> AppResult<()> {
    history::ActiveModel {
        order_id: Set(order_id),
        status_id: Set(status_id),
        actor: Set(actor.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

async fn recalculate_total<C: ConnectionTrait>(db: &C, order: orders::Model) -> AppResult<orders::Model> {
    let items = order_items::Entity::find()
        .filter(order_items::Column::OrderId.eq(order.id))
        .all(db)
        .await?;
    let total = items.iter().map(order_items::Model::line_total).sum();

    let mut am = order.into_active_model();
    am.total = Set(total);
    am.updated_at = Set(Utc::now());
    Ok(am.update(db).await?)
}

/// Joins orders with their status and items.
pub async fn build_order_responses<C: ConnectionTrait>(
    db: &C,
    list: Vec<orders::Model>,
) -> AppResult<Vec<OrderResponse>> {
    if list.is_empty() {
        return Ok(Vec::new());
    }

    let status_map: HashMap<i64, statuses::Model> = statuses::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let ids: Vec<i64> = list.iter().map(|o| o.id).collect();
    let mut items_by_order: HashMap<i64, Vec<order_items::Model>> = HashMap::new();
    for item in order_items::Entity::find()
        .filter(order_items::Column::OrderId.is_in(ids))
        .order_by_asc(order_items::Column::Id)
        .all(db)
        .await?
    {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    list.into_iter()
        .map(|order| {
            let status = status_map.get(&order.status_id).ok_or_else(|| {
                AppError::InternalError(format!(
                    "Order #{} points to missing status #{}",
                    order.id, order.status_id
                ))
            })?;
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            Ok(OrderResponse::build(order, status, items))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{PaymentMethod, PreparationArea, TransactionKind};
    use crate::models::{
        CheckoutItem, CloseShiftRequest, HandoverRequest, OpenShiftRequest,
    };
    use crate::services::{DebtService, ShiftService};
    use crate::test_utils::{
        DefaultStatuses, RecordingChatSender, reload_employee, reload_order, seed_default_statuses,
        seed_product, seed_staff, setup_test_db,
    };
    use std::sync::Arc;

    struct Fixture {
        db: DatabaseConnection,
        statuses: DefaultStatuses,
        sender: Arc<RecordingChatSender>,
        orders: OrderService,
        shifts: ShiftService,
        debts: DebtService,
    }

    async fn fixture() -> Fixture {
        let db = setup_test_db().await.unwrap();
        let statuses = seed_default_statuses(&db).await.unwrap();
        let sender = RecordingChatSender::new();
        let notifications = NotificationService::new(db.clone(), sender.shared(), None, 50);
        Fixture {
            orders: OrderService::new(db.clone(), notifications),
            shifts: ShiftService::new(db.clone()),
            debts: DebtService::new(db.clone()),
            db,
            statuses,
            sender,
        }
    }

    fn checkout(product_id: i64, quantity: i32, payment_method: PaymentMethod) -> CheckoutRequest {
        CheckoutRequest {
            customer_name: "Anna".into(),
            customer_phone: Some("+7 900 111-22-33".into()),
            customer_chat_id: Some(777),
            delivery_method: DeliveryMethod::Pickup,
            address: None,
            table_label: None,
            payment_method,
            comment: None,
            items: vec![CheckoutItem {
                product_id,
                quantity,
            }],
        }
    }

    #[tokio::test]
    async fn test_cash_shift_lifecycle() {
        let f = fixture().await;
        let cashier = seed_staff(&f.db, "anna", "cashier,operator").await.unwrap();
        let courier = seed_staff(&f.db, "runner", "courier").await.unwrap();
        let pizza = seed_product(&f.db, "Pizza", 20000, PreparationArea::Kitchen)
            .await
            .unwrap();
        let salad = seed_product(&f.db, "Salad", 15000, PreparationArea::Kitchen)
            .await
            .unwrap();

        let shift = f
            .shifts
            .open(cashier.id, OpenShiftRequest { start_cash: 50000 })
            .await
            .unwrap();

        // cash order with no intermediary goes straight into the drawer
        let first = f
            .orders
            .checkout(checkout(pizza.id, 1, PaymentMethod::Cash))
            .await
            .unwrap();
        assert_eq!(first.status_id, f.statuses.new.id);
        f.orders
            .change_status(first.id, f.statuses.completed.id, cashier.id)
            .await
            .unwrap();
        let x = f.shifts.statistics(shift.id).await.unwrap();
        assert_eq!(x.theoretical_cash, 70000);

        // courier delivery: courier owes the money until handover
        let second = f
            .orders
            .checkout(checkout(salad.id, 1, PaymentMethod::Cash))
            .await
            .unwrap();
        f.orders
            .assign_courier(second.id, Some(courier.id), cashier.id)
            .await
            .unwrap();
        f.orders
            .change_status(second.id, f.statuses.completed.id, courier.id)
            .await
            .unwrap();
        assert_eq!(reload_employee(&f.db, courier.id).await.cash_balance, 15000);
        let stored = reload_order(&f.db, second.id).await;
        assert!(!stored.is_cash_turned_in);
        assert_eq!(stored.shift_id, Some(shift.id));
        assert_eq!(f.shifts.statistics(shift.id).await.unwrap().theoretical_cash, 70000);

        f.debts
            .handover(
                cashier.id,
                HandoverRequest {
                    employee_id: courier.id,
                    order_ids: vec![second.id],
                    shift_id: Some(shift.id),
                    comment: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(reload_employee(&f.db, courier.id).await.cash_balance, 0);
        assert!(reload_order(&f.db, second.id).await.is_cash_turned_in);
        let x = f.shifts.statistics(shift.id).await.unwrap();
        assert_eq!(x.theoretical_cash, 85000);
        assert_eq!(x.handover_total, 15000);

        let z = f
            .shifts
            .close(shift.id, CloseShiftRequest { end_cash_actual: 84000 })
            .await
            .unwrap();
        assert_eq!(z.report.discrepancy, Some(-1000));
        assert_eq!(z.discrepancy_display, "-10.00");
        assert!(z.report.closed);

        let late = f
            .shifts
            .add_transaction(
                shift.id,
                cashier.id,
                crate::models::CashTransactionRequest {
                    kind: TransactionKind::In,
                    amount: 100,
                    comment: String::new(),
                },
            )
            .await;
        assert!(matches!(late, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_cancelled_order_is_frozen() {
        let f = fixture().await;
        let operator = seed_staff(&f.db, "op", "operator").await.unwrap();
        let courier = seed_staff(&f.db, "runner", "courier").await.unwrap();
        let soup = seed_product(&f.db, "Soup", 500, PreparationArea::Kitchen)
            .await
            .unwrap();

        let order = f
            .orders
            .checkout(checkout(soup.id, 2, PaymentMethod::Card))
            .await
            .unwrap();
        f.orders
            .change_status(order.id, f.statuses.cancelled.id, operator.id)
            .await
            .unwrap();
        let before = f.orders.history(order.id).await.unwrap();
        assert_eq!(before.len(), 2);
        assert_eq!(before[0].status_name, "Cancelled");

        let rejected = f
            .orders
            .change_status(order.id, f.statuses.accepted.id, operator.id)
            .await;
        assert!(matches!(rejected, Err(AppError::Conflict(_))));
        assert_eq!(f.orders.history(order.id).await.unwrap().len(), 2);

        assert!(matches!(
            f.orders.assign_courier(order.id, Some(courier.id), operator.id).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            f.orders
                .add_item(order.id, AddItemRequest { product_id: soup.id, quantity: 1 })
                .await,
            Err(AppError::Conflict(_))
        ));
        let item_id = order.items[0].id;
        assert!(matches!(
            f.orders.update_item_quantity(order.id, item_id, 0).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(reload_order(&f.db, order.id).await.total, 1000);
    }

    #[tokio::test]
    async fn test_accept_triggers_production_and_customer_message() {
        let f = fixture().await;
        let operator = seed_staff(&f.db, "op", "operator").await.unwrap();
        let cook = seed_staff(&f.db, "chef", "cook").await.unwrap();
        let bartender = seed_staff(&f.db, "bar", "bartender").await.unwrap();
        let steak = seed_product(&f.db, "Steak", 1500, PreparationArea::Kitchen)
            .await
            .unwrap();

        let order = f
            .orders
            .checkout(checkout(steak.id, 1, PaymentMethod::Card))
            .await
            .unwrap();
        // "New" is visible to operators
        assert_eq!(f.sender.chats(), vec![operator.chat_id.unwrap()]);

        let accepted = f
            .orders
            .change_status(order.id, f.statuses.accepted.id, operator.id)
            .await
            .unwrap();
        assert!(!accepted.kitchen_done);
        assert!(accepted.bar_done);

        let chats = f.sender.chats();
        assert!(chats.contains(&cook.chat_id.unwrap()));
        assert!(!chats.contains(&bartender.chat_id.unwrap()));
        assert!(chats.contains(&777));
        // the operator made the change and is not told about it again
        assert_eq!(
            chats.iter().filter(|c| **c == operator.chat_id.unwrap()).count(),
            1
        );
    }

    #[tokio::test]
    async fn test_item_edits_recalculate_total() {
        let f = fixture().await;
        let tea = seed_product(&f.db, "Tea", 150, PreparationArea::Bar).await.unwrap();
        let cake = seed_product(&f.db, "Cake", 400, PreparationArea::Kitchen)
            .await
            .unwrap();

        let order = f
            .orders
            .checkout(checkout(tea.id, 2, PaymentMethod::Card))
            .await
            .unwrap();
        assert_eq!(order.total, 300);

        let order = f
            .orders
            .add_item(order.id, AddItemRequest { product_id: cake.id, quantity: 1 })
            .await
            .unwrap();
        assert_eq!(order.total, 700);

        let tea_line = order.items[0].id;
        let order = f.orders.update_item_quantity(order.id, tea_line, 0).await.unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total, 400);

        // price change in the catalog does not touch the snapshot
        let mut am = cake.into_active_model();
        am.price = Set(999);
        am.update(&f.db).await.unwrap();
        assert_eq!(f.orders.get(order.id).await.unwrap().items[0].price, 400);
    }

    #[tokio::test]
    async fn test_checkout_validation() {
        let f = fixture().await;
        let tea = seed_product(&f.db, "Tea", 150, PreparationArea::Bar).await.unwrap();

        let mut delivery = checkout(tea.id, 1, PaymentMethod::Cash);
        delivery.delivery_method = DeliveryMethod::Delivery;
        assert!(matches!(
            f.orders.checkout(delivery).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            f.orders.checkout(checkout(4242, 1, PaymentMethod::Cash)).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            f.orders.checkout(checkout(tea.id, 0, PaymentMethod::Cash)).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_visibility_and_waiter_acceptance() {
        let f = fixture().await;
        let chef = seed_staff(&f.db, "chef", "cook").await.unwrap();
        let waiter = seed_staff(&f.db, "w1", "waiter").await.unwrap();
        let other_waiter = seed_staff(&f.db, "w2", "waiter").await.unwrap();
        let tea = seed_product(&f.db, "Tea", 150, PreparationArea::Bar).await.unwrap();

        let order = f
            .orders
            .checkout(checkout(tea.id, 1, PaymentMethod::Cash))
            .await
            .unwrap();

        let page = f
            .orders
            .list_for_employee(chef.id, &OrderQuery { page: None, per_page: None, status_id: None })
            .await
            .unwrap();
        assert_eq!(page.total, 0);

        f.orders.accept_by_waiter(order.id, waiter.id).await.unwrap();
        assert!(matches!(
            f.orders.accept_by_waiter(order.id, other_waiter.id).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            f.orders.accept_by_waiter(order.id, chef.id).await,
            Err(AppError::ValidationError(_))
        ));

        let page = f
            .orders
            .list_for_employee(waiter.id, &OrderQuery { page: None, per_page: None, status_id: None })
            .await
            .unwrap();
        assert_eq!(page.total, 1);

        // waiter holds the cash after completion
        f.orders
            .change_status(order.id, f.statuses.completed.id, waiter.id)
            .await
            .unwrap();
        assert_eq!(reload_employee(&f.db, waiter.id).await.cash_balance, 150);

        let public = f.orders.get_public(order.id, "79001112233").await.unwrap();
        assert_eq!(public.status_name, "Completed");
        assert!(f.orders.get_public(order.id, "000").await.is_err());
    }

    #[tokio::test]
    async fn test_assigned_courier_gets_notified_once() {
        let f = fixture().await;
        let operator = seed_staff(&f.db, "op", "operator").await.unwrap();
        let courier = seed_staff(&f.db, "runner", "courier").await.unwrap();
        let soup = seed_product(&f.db, "Soup", 500, PreparationArea::Kitchen)
            .await
            .unwrap();
        let order = f
            .orders
            .checkout(checkout(soup.id, 1, PaymentMethod::Card))
            .await
            .unwrap();
        let chats_before = f.sender.chats().len();

        let assigned = f
            .orders
            .assign_courier(order.id, Some(courier.id), operator.id)
            .await
            .unwrap();
        assert_eq!(assigned.courier_id, Some(courier.id));

        let inbox = crate::entities::notification_entity::Entity::find()
            .filter(crate::entities::notification_entity::Column::EmployeeId.eq(courier.id))
            .filter(crate::entities::notification_entity::Column::Message.contains("assigned"))
            .all(&f.db)
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].order_id, Some(order.id));
        assert_eq!(f.sender.chats()[chats_before..], [courier.chat_id.unwrap()]);
    }
}
