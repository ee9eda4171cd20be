use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Return, ReturnStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReturnRequest {
    pub order_id: Uuid,
    pub reason: String,
    pub returned_quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReturnStatusRequest {
    pub status: ReturnStatus,
    pub note: Option<String>,
    /// History actor; defaults to the caller's actor label.
    pub actor: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReturnList {
    pub items: Vec<Return>,
}
