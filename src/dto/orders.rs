use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::customers::CustomerContact;
use crate::models::{Order, OrderStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer: CustomerContact,
    pub product_id: Uuid,
    pub quantity: i32,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    /// Timeline actor; defaults to the caller's actor label.
    pub actor: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
