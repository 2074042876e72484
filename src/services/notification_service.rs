//! Who hears about an order event, and how.
//!
//! Planning is pure: [`plan_status_change`] and friends turn an order, a status
//! and the current staff list into an [`Outbox`]. In-app records are written
//! inside the caller's transaction; chat messages go out after commit and a
//! failed delivery is logged and skipped.

use crate::entities::{notification_entity as notifications, order_entity, order_status_entity};
use crate::error::AppResult;
use crate::external::SharedChatSender;
use crate::models::{Capability, NotificationResponse, StaffMember};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::sea_query::Expr;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InAppMessage {
    pub employee_id: i64,
    pub order_id: Option<i64>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub chat_id: i64,
    pub text: String,
}

/// Pending deliveries for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outbox {
    pub in_app: Vec<InAppMessage>,
    pub chats: Vec<ChatMessage>,
}

impl Outbox {
    pub fn is_empty(&self) -> bool {
        self.in_app.is_empty() && self.chats.is_empty()
    }

    /// Queues both channels for a staff member; chat only when they have one.
    pub fn to_employee(&mut self, member: &StaffMember, order_id: Option<i64>, message: &str) {
        self.in_app.push(InAppMessage {
            employee_id: member.id,
            order_id,
            message: message.to_string(),
        });
        if let Some(chat_id) = member.chat_id {
            self.to_chat(chat_id, message);
        }
    }

    pub fn to_chat(&mut self, chat_id: i64, text: &str) {
        if self.chats.iter().any(|c| c.chat_id == chat_id && c.text == text) {
            return;
        }
        self.chats.push(ChatMessage {
            chat_id,
            text: text.to_string(),
        });
    }

    pub fn merge(&mut self, other: Outbox) {
        self.in_app.extend(other.in_app);
        for chat in other.chats {
            self.to_chat(chat.chat_id, &chat.text);
        }
    }

    pub fn employee_ids(&self) -> BTreeSet<i64> {
        self.in_app.iter().map(|m| m.employee_id).collect()
    }
}

/// Staff group reachable for an order: the assigned person when there is one,
/// otherwise everybody on shift with the capability.
fn assigned_or_on_shift<'a>(
    staff: &'a [StaffMember],
    assigned: Option<i64>,
    capability: Capability,
) -> Vec<&'a StaffMember> {
    match assigned {
        Some(id) => staff.iter().filter(|m| m.id == id).collect(),
        None => staff
            .iter()
            .filter(|m| m.is_on_shift && m.has(capability))
            .collect(),
    }
}

fn on_shift_with<'a>(staff: &'a [StaffMember], capability: Capability) -> Vec<&'a StaffMember> {
    staff
        .iter()
        .filter(|m| m.is_on_shift && m.has(capability))
        .collect()
}

pub fn status_message(order: &order_entity::Model, status: &order_status_entity::Model) -> String {
    format!("Order #{}: status changed to \"{}\"", order.id, status.name)
}

pub fn customer_message(order: &order_entity::Model, status: &order_status_entity::Model) -> String {
    match status.customer_message.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => format!("Order #{}: {text}", order.id),
        _ => format!("Your order #{} is now: {}", order.id, status.name),
    }
}

/// Recipients of a status change. The acting employee is left out.
pub fn plan_status_change(
    order: &order_entity::Model,
    status: &order_status_entity::Model,
    staff: &[StaffMember],
    actor_id: Option<i64>,
    operator_chat_id: Option<i64>,
) -> Outbox {
    let mut recipients: Vec<&StaffMember> = Vec::new();

    if status.visible_to_operator {
        recipients.extend(on_shift_with(staff, Capability::Operator));
    }
    if status.visible_to_courier {
        recipients.extend(assigned_or_on_shift(staff, order.courier_id, Capability::Courier));
    }
    if status.visible_to_waiter {
        recipients.extend(assigned_or_on_shift(staff, order.waiter_id, Capability::Waiter));
    }

    let message = status_message(order, status);
    let mut outbox = Outbox::default();
    let mut seen = BTreeSet::new();
    for member in recipients {
        if Some(member.id) == actor_id || !seen.insert(member.id) {
            continue;
        }
        outbox.to_employee(member, Some(order.id), &message);
    }

    if status.visible_to_operator
        && let Some(chat_id) = operator_chat_id
    {
        outbox.to_chat(chat_id, &message);
    }

    if status.notify_customer {
        match order.customer_chat_id {
            Some(chat_id) => outbox.to_chat(chat_id, &customer_message(order, status)),
            None => log::debug!("Order #{} has no customer chat, skipping", order.id),
        }
    }

    outbox
}

/// Order is fully prepared: tell the waiter, else the courier, else the
/// operators on shift.
pub fn plan_ready(
    order: &order_entity::Model,
    staff: &[StaffMember],
    operator_chat_id: Option<i64>,
) -> Outbox {
    let message = format!("Order #{} is ready", order.id);
    let mut outbox = Outbox::default();

    let handler = order
        .waiter_id
        .or(order.courier_id)
        .and_then(|id| staff.iter().find(|m| m.id == id));

    match handler {
        Some(member) => outbox.to_employee(member, Some(order.id), &message),
        None => {
            for member in on_shift_with(staff, Capability::Operator) {
                outbox.to_employee(member, Some(order.id), &message);
            }
            if let Some(chat_id) = operator_chat_id {
                outbox.to_chat(chat_id, &message);
            }
        }
    }

    outbox
}

/// Persists the in-app part of an outbox.
pub async fn write_in_app<C: ConnectionTrait>(db: &C, outbox: &Outbox) -> AppResult<()> {
    let now = Utc::now();
    for item in &outbox.in_app {
        notifications::ActiveModel {
            employee_id: Set(item.employee_id),
            order_id: Set(item.order_id),
            message: Set(item.message.clone()),
            is_read: Set(false),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct NotificationService {
    pool: DatabaseConnection,
    chat: SharedChatSender,
    operator_chat_id: Option<i64>,
    retain_per_employee: u64,
}

impl NotificationService {
    pub fn new(
        pool: DatabaseConnection,
        chat: SharedChatSender,
        operator_chat_id: Option<i64>,
        retain_per_employee: u64,
    ) -> Self {
        Self {
            pool,
            chat,
            operator_chat_id,
            retain_per_employee,
        }
    }

    pub fn operator_chat_id(&self) -> Option<i64> {
        self.operator_chat_id
    }

    /// Sends the chat part. Returns how many messages went through.
    pub async fn send_chats(&self, outbox: &Outbox) -> usize {
        let mut delivered = 0;
        for chat in &outbox.chats {
            match self.chat.send_message(chat.chat_id, &chat.text).await {
                Ok(()) => delivered += 1,
                Err(e) => log::warn!("Chat delivery to {} failed: {e}", chat.chat_id),
            }
        }
        delivered
    }

    /// Returns unread notifications oldest first, marks them read and prunes
    /// read ones beyond the retention limit.
    pub async fn poll(&self, employee_id: i64) -> AppResult<Vec<NotificationResponse>> {
        let txn = self.pool.begin().await?;

        let unread = notifications::Entity::find()
            .filter(notifications::Column::EmployeeId.eq(employee_id))
            .filter(notifications::Column::IsRead.eq(false))
            .order_by_asc(notifications::Column::Id)
            .all(&txn)
            .await?;

        if !unread.is_empty() {
            let ids: Vec<i64> = unread.iter().map(|n| n.id).collect();
            notifications::Entity::update_many()
                .col_expr(notifications::Column::IsRead, Expr::value(true))
                .filter(notifications::Column::Id.is_in(ids))
                .exec(&txn)
                .await?;
        }

        let read: Vec<i64> = notifications::Entity::find()
            .select_only()
            .column(notifications::Column::Id)
            .filter(notifications::Column::EmployeeId.eq(employee_id))
            .filter(notifications::Column::IsRead.eq(true))
            .order_by_desc(notifications::Column::Id)
            .into_tuple()
            .all(&txn)
            .await?;
        let stale: Vec<i64> = read
            .into_iter()
            .skip(self.retain_per_employee as usize)
            .collect();

        if !stale.is_empty() {
            let pruned = notifications::Entity::delete_many()
                .filter(notifications::Column::Id.is_in(stale))
                .exec(&txn)
                .await?;
            log::debug!(
                "Pruned {} old notifications of employee #{employee_id}",
                pruned.rows_affected
            );
        }

        txn.commit().await?;
        Ok(unread.into_iter().map(Into::into).collect())
    }
}
