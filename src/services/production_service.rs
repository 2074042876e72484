use crate::entities::{PreparationArea, order_entity as orders, order_item_entity as order_items};
use crate::error::{AppError, AppResult};
use crate::models::{Capability, ProductionState, StaffMember};
use crate::services::employee_service::load_staff;
use crate::services::notification_service::{NotificationService, Outbox, plan_ready, write_in_app};
use crate::services::status_service::{ensure_mutable, find_status};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};

/// Items split by where they are prepared, plus who gets told about them.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Distribution {
    pub kitchen_done: bool,
    pub bar_done: bool,
    pub outbox: Outbox,
}

fn ticket(order_id: i64, area: PreparationArea, items: &[&order_items::Model]) -> String {
    let lines = items
        .iter()
        .map(|i| format!("{} x{}", i.product_name, i.quantity))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Order #{order_id} ({area}):\n{lines}")
}

/// Routes kitchen items to cooks and bar items to bartenders on shift. An area
/// with nothing to prepare starts out done.
pub fn plan_distribution(
    order: &orders::Model,
    items: &[order_items::Model],
    staff: &[StaffMember],
    operator_chat_id: Option<i64>,
) -> Distribution {
    let mut distribution = Distribution {
        kitchen_done: true,
        bar_done: true,
        outbox: Outbox::default(),
    };

    for area in [PreparationArea::Kitchen, PreparationArea::Bar] {
        let area_items: Vec<&order_items::Model> =
            items.iter().filter(|i| i.preparation_area == area).collect();
        if area_items.is_empty() {
            continue;
        }

        match area {
            PreparationArea::Kitchen => distribution.kitchen_done = false,
            PreparationArea::Bar => distribution.bar_done = false,
        }

        let capability = Capability::for_area(area);
        let text = ticket(order.id, area, &area_items);
        let mut reached = 0;
        for member in staff.iter().filter(|m| m.is_on_shift && m.has(capability)) {
            distribution.outbox.to_employee(member, Some(order.id), &text);
            reached += 1;
        }
        if reached == 0 {
            log::warn!("Order #{}: nobody with {capability} is on shift", order.id);
        }
    }

    if distribution.kitchen_done && distribution.bar_done {
        distribution
            .outbox
            .merge(plan_ready(order, staff, operator_chat_id));
    }

    distribution
}

/// Stores the per-area flags and queues the tickets. Runs in the caller's
/// transaction; chats are left in the returned outbox.
pub async fn distribute<C: ConnectionTrait>(
    db: &C,
    order: orders::Model,
    staff: &[StaffMember],
    operator_chat_id: Option<i64>,
) -> AppResult<(orders::Model, Outbox)> {
    let items = order_items::Entity::find()
        .filter(order_items::Column::OrderId.eq(order.id))
        .order_by_asc(order_items::Column::Id)
        .all(db)
        .await?;

    let Distribution {
        kitchen_done,
        bar_done,
        outbox,
    } = plan_distribution(&order, &items, staff, operator_chat_id);

    let mut am = order.into_active_model();
    am.kitchen_done = Set(kitchen_done);
    am.bar_done = Set(bar_done);
    am.updated_at = Set(Utc::now());
    let order = am.update(db).await?;

    log::info!(
        "Order #{} sent to production (kitchen done: {kitchen_done}, bar done: {bar_done})",
        order.id
    );
    Ok((order, outbox))
}

#[derive(Clone)]
pub struct ProductionService {
    pool: DatabaseConnection,
    notifications: NotificationService,
}

impl ProductionService {
    pub fn new(pool: DatabaseConnection, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    /// Marks one area finished. When the other area is finished too the order's
    /// handler is told it is ready; repeating the call changes nothing.
    /// Completed and cancelled orders are rejected.
    pub async fn mark_area_done(&self, order_id: i64, area: PreparationArea) -> AppResult<ProductionState> {
        let txn = self.pool.begin().await?;

        let order = orders::Entity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order #{order_id} not found")))?;
        ensure_mutable(order.id, &find_status(&txn, order.status_id).await?)?;

        let already_done = match area {
            PreparationArea::Kitchen => order.kitchen_done,
            PreparationArea::Bar => order.bar_done,
        };
        if already_done {
            txn.commit().await?;
            return Ok(ProductionState {
                order_id,
                kitchen_done: order.kitchen_done,
                bar_done: order.bar_done,
                ready: order.kitchen_done && order.bar_done,
            });
        }

        let mut am = order.into_active_model();
        match area {
            PreparationArea::Kitchen => am.kitchen_done = Set(true),
            PreparationArea::Bar => am.bar_done = Set(true),
        }
        am.updated_at = Set(Utc::now());
        let order = am.update(&txn).await?;

        let ready = order.kitchen_done && order.bar_done;
        let mut outbox = Outbox::default();
        if ready {
            let staff = load_staff(&txn).await?;
            outbox = plan_ready(&order, &staff, self.notifications.operator_chat_id());
            write_in_app(&txn, &outbox).await?;
        }

        txn.commit().await?;
        log::info!("Order #{order_id}: {area} finished");

        if !outbox.is_empty() {
            self.notifications.send_chats(&outbox).await;
        }

        Ok(ProductionState {
            order_id,
            kitchen_done: order.kitchen_done,
            bar_done: order.bar_done,
            ready,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PaymentMethod;
    use crate::models::CapabilitySet;
    use crate::test_utils::{
        RecordingChatSender, order_model, reload_order, seed_order, seed_staff, seed_status,
        setup_test_db, status_model,
    };
    use std::collections::BTreeSet;

    fn item(id: i64, name: &str, area: PreparationArea) -> order_items::Model {
        order_items::Model {
            id,
            order_id: 1,
            product_id: None,
            product_name: name.into(),
            quantity: 1,
            price: 100,
            preparation_area: area,
        }
    }

    fn staff() -> Vec<StaffMember> {
        let member = |id, cap| StaffMember {
            id,
            full_name: format!("Staff {id}"),
            chat_id: None,
            is_on_shift: true,
            capabilities: CapabilitySet::new([cap]),
        };
        vec![
            member(1, Capability::Cook),
            member(2, Capability::Bartender),
            member(3, Capability::Operator),
        ]
    }

    #[test]
    fn test_items_routed_by_area() {
        let order = order_model(1, PaymentMethod::Card, 300);
        let items = vec![
            item(1, "Burger", PreparationArea::Kitchen),
            item(2, "Fries", PreparationArea::Kitchen),
            item(3, "Mojito", PreparationArea::Bar),
        ];

        let plan = plan_distribution(&order, &items, &staff(), None);
        assert!(!plan.kitchen_done);
        assert!(!plan.bar_done);
        assert_eq!(plan.outbox.employee_ids(), BTreeSet::from([1, 2]));
        let kitchen = &plan.outbox.in_app[0];
        assert_eq!(kitchen.employee_id, 1);
        assert!(kitchen.message.contains("Burger x1"));
        assert!(!kitchen.message.contains("Mojito"));
    }

    #[test]
    fn test_area_without_items_starts_done() {
        let order = order_model(1, PaymentMethod::Card, 100);
        let plan = plan_distribution(&order, &[item(1, "Cola", PreparationArea::Bar)], &staff(), None);
        assert!(plan.kitchen_done);
        assert!(!plan.bar_done);
        assert_eq!(plan.outbox.employee_ids(), BTreeSet::from([2]));
    }

    #[tokio::test]
    async fn test_ready_alert_after_both_areas() {
        let db = setup_test_db().await.unwrap();
        let waiter = seed_staff(&db, "tables", "waiter").await.unwrap();
        let status = seed_status(&db, status_model(0, "Accepted")).await.unwrap();
        let mut order = seed_order(
            &db,
            status.id,
            PaymentMethod::Card,
            &[
                ("Steak", 1, 900, PreparationArea::Kitchen),
                ("Wine", 1, 400, PreparationArea::Bar),
            ],
        )
        .await
        .unwrap();
        let mut am = order.into_active_model();
        am.waiter_id = Set(Some(waiter.id));
        order = am.update(&db).await.unwrap();

        let (order, outbox) = distribute(&db, order, &[], None).await.unwrap();
        assert!(outbox.is_empty());
        assert!(!order.kitchen_done && !order.bar_done);

        let sender = RecordingChatSender::new();
        let notifications = NotificationService::new(db.clone(), sender.shared(), None, 50);
        let service = ProductionService::new(db.clone(), notifications);

        let state = service
            .mark_area_done(order.id, PreparationArea::Kitchen)
            .await
            .unwrap();
        assert!(!state.ready);
        assert!(sender.sent().is_empty());

        let state = service.mark_area_done(order.id, PreparationArea::Bar).await.unwrap();
        assert!(state.ready);
        assert_eq!(sender.chats(), vec![waiter.chat_id.unwrap()]);

        // repeated call does not alert twice
        service.mark_area_done(order.id, PreparationArea::Bar).await.unwrap();
        assert_eq!(sender.sent().len(), 1);
        assert!(reload_order(&db, order.id).await.bar_done);
    }

    #[tokio::test]
    async fn test_cancelled_order_is_never_ready() {
        let db = setup_test_db().await.unwrap();
        let waiter = seed_staff(&db, "tables", "waiter").await.unwrap();
        let mut cancelled = status_model(0, "Cancelled");
        cancelled.is_cancelled_status = true;
        let status = seed_status(&db, cancelled).await.unwrap();
        let order = seed_order(
            &db,
            status.id,
            PaymentMethod::Card,
            &[("Steak", 1, 900, PreparationArea::Kitchen)],
        )
        .await
        .unwrap();
        let mut am = order.into_active_model();
        am.waiter_id = Set(Some(waiter.id));
        am.bar_done = Set(true);
        let order = am.update(&db).await.unwrap();

        let sender = RecordingChatSender::new();
        let notifications = NotificationService::new(db.clone(), sender.shared(), None, 50);
        let service = ProductionService::new(db.clone(), notifications);

        let result = service.mark_area_done(order.id, PreparationArea::Kitchen).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert!(sender.sent().is_empty());
        assert!(!reload_order(&db, order.id).await.kitchen_done);
    }
}
