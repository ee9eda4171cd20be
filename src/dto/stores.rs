use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Store;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStoreRequest {
    pub name: String,
    pub currency: Option<String>,
    pub is_demo: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreList {
    pub items: Vec<Store>,
}
