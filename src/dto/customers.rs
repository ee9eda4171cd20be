use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Customer;

/// Loosely-structured contact bundle as it arrives on inbound orders.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CustomerContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Primary name/email are the identity key and are not editable here;
/// a replaced primary phone/address is kept as an alternate.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCustomerRequest {
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerList {
    pub items: Vec<Customer>,
}
