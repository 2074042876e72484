use crate::entities::{
    DeliveryMethod, PaymentMethod, PreparationArea, order_entity, order_item_entity,
    order_status_entity,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutItem {
    pub product_id: i64,
    #[schema(example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[schema(example = "Anna")]
    pub customer_name: String,
    pub customer_phone: Option<String>,
    /// Chat identity used for customer status messages.
    pub customer_chat_id: Option<i64>,
    pub delivery_method: DeliveryMethod,
    pub address: Option<String>,
    pub table_label: Option<String>,
    pub payment_method: PaymentMethod,
    pub comment: Option<String>,
    pub items: Vec<CheckoutItem>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChangeStatusRequest {
    pub status_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignCourierRequest {
    /// `null` removes the courier.
    pub courier_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddItemRequest {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    /// `0` removes the line.
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub price: i64,
    pub preparation_area: PreparationArea,
}

impl From<order_item_entity::Model> for OrderItemResponse {
    fn from(m: order_item_entity::Model) -> Self {
        Self {
            id: m.id,
            product_name: m.product_name,
            quantity: m.quantity,
            price: m.price,
            preparation_area: m.preparation_area,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub delivery_method: DeliveryMethod,
    pub address: Option<String>,
    pub table_label: Option<String>,
    pub payment_method: PaymentMethod,
    pub is_cash_turned_in: bool,
    pub shift_id: Option<i64>,
    pub courier_id: Option<i64>,
    pub waiter_id: Option<i64>,
    pub status_id: i64,
    pub status_name: String,
    pub is_terminal: bool,
    pub total: i64,
    pub kitchen_done: bool,
    pub bar_done: bool,
    pub comment: Option<String>,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
}

impl OrderResponse {
    pub fn build(
        order: order_entity::Model,
        status: &order_status_entity::Model,
        items: Vec<order_item_entity::Model>,
    ) -> Self {
        Self {
            id: order.id,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            delivery_method: order.delivery_method,
            address: order.address,
            table_label: order.table_label,
            payment_method: order.payment_method,
            is_cash_turned_in: order.is_cash_turned_in,
            shift_id: order.shift_id,
            courier_id: order.courier_id,
            waiter_id: order.waiter_id,
            status_id: status.id,
            status_name: status.name.clone(),
            is_terminal: status.is_terminal(),
            total: order.total,
            kitchen_done: order.kitchen_done,
            bar_done: order.bar_done,
            comment: order.comment,
            items: items.into_iter().map(OrderItemResponse::from).collect(),
            created_at: order.created_at,
        }
    }
}

/// The customer proves ownership of an order with the phone used at checkout.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicOrderQuery {
    pub phone: String,
}

/// What the customer-facing lookup exposes.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicOrderResponse {
    pub id: i64,
    pub status_name: String,
    pub total: i64,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductionState {
    pub order_id: i64,
    pub kitchen_done: bool,
    pub bar_done: bool,
    /// Both areas finished.
    pub ready: bool,
}
