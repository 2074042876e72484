use crate::entities::order_status_entity as statuses;
use crate::error::{AppError, AppResult};
use crate::models::{StatusRequest, StatusResponse};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryOrder, Set,
};

#[derive(Clone)]
pub struct StatusService {
    pool: DatabaseConnection,
}

impl StatusService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Statuses in display order.
    pub async fn list(&self) -> AppResult<Vec<StatusResponse>> {
        let list = statuses::Entity::find()
            .order_by_asc(statuses::Column::SortOrder)
            .order_by_asc(statuses::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn create(&self, req: StatusRequest) -> AppResult<StatusResponse> {
        let name = req
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::ValidationError("Status name is required".into()))?
            .to_string();

        let completed = req.is_completed_status.unwrap_or(false);
        let cancelled = req.is_cancelled_status.unwrap_or(false);
        if completed && cancelled {
            return Err(AppError::ValidationError(
                "A status cannot be both completed and cancelled".into(),
            ));
        }

        let model = statuses::ActiveModel {
            name: Set(name),
            sort_order: Set(req.sort_order.unwrap_or(0)),
            visible_to_operator: Set(req.visible_to_operator.unwrap_or(false)),
            visible_to_courier: Set(req.visible_to_courier.unwrap_or(false)),
            visible_to_waiter: Set(req.visible_to_waiter.unwrap_or(false)),
            visible_to_chef: Set(req.visible_to_chef.unwrap_or(false)),
            visible_to_bartender: Set(req.visible_to_bartender.unwrap_or(false)),
            notify_customer: Set(req.notify_customer.unwrap_or(false)),
            requires_kitchen_notify: Set(req.requires_kitchen_notify.unwrap_or(false)),
            is_completed_status: Set(completed),
            is_cancelled_status: Set(cancelled),
            customer_message: Set(req.customer_message),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Order status created: {} (#{})", model.name, model.id);
        Ok(model.into())
    }

    /// Updates only the flags present in the request.
    pub async fn update(&self, id: i64, req: StatusRequest) -> AppResult<StatusResponse> {
        let current = find_status(&self.pool, id).await?;

        let completed = req
            .is_completed_status
            .unwrap_or(current.is_completed_status);
        let cancelled = req
            .is_cancelled_status
            .unwrap_or(current.is_cancelled_status);
        if completed && cancelled {
            return Err(AppError::ValidationError(
                "A status cannot be both completed and cancelled".into(),
            ));
        }

        let mut am = current.into_active_model();
        if let Some(name) = req.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::ValidationError("Status name is required".into()));
            }
            am.name = Set(name);
        }
        if let Some(v) = req.sort_order {
            am.sort_order = Set(v);
        }
        if let Some(v) = req.visible_to_operator {
            am.visible_to_operator = Set(v);
        }
        if let Some(v) = req.visible_to_courier {
            am.visible_to_courier = Set(v);
        }
        if let Some(v) = req.visible_to_waiter {
            am.visible_to_waiter = Set(v);
        }
        if let Some(v) = req.visible_to_chef {
            am.visible_to_chef = Set(v);
        }
        if let Some(v) = req.visible_to_bartender {
            am.visible_to_bartender = Set(v);
        }
        if let Some(v) = req.notify_customer {
            am.notify_customer = Set(v);
        }
        if let Some(v) = req.requires_kitchen_notify {
            am.requires_kitchen_notify = Set(v);
        }
        am.is_completed_status = Set(completed);
        am.is_cancelled_status = Set(cancelled);
        if req.customer_message.is_some() {
            am.customer_message = Set(req.customer_message);
        }

        let updated = am.update(&self.pool).await?;
        Ok(updated.into())
    }
}

pub async fn find_status<C: ConnectionTrait>(db: &C, id: i64) -> AppResult<statuses::Model> {
    statuses::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order status #{id} not found")))
}

/// The first status ever created is where new orders start.
pub async fn initial_status<C: ConnectionTrait>(db: &C) -> AppResult<statuses::Model> {
    statuses::Entity::find()
        .order_by_asc(statuses::Column::Id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Conflict("No order statuses are configured".into()))
}

/// Orders sitting in a completed or cancelled status are frozen: no status
/// change, courier assignment or item edit may touch them.
pub fn ensure_mutable(order_id: i64, current: &statuses::Model) -> AppResult<()> {
    if current.is_terminal() {
        return Err(AppError::Conflict(format!(
            "Order #{order_id} is {} and can no longer be changed",
            current.name
        )));
    }
    Ok(())
}
