//! Request and response bodies of the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    #[serde(rename = "gitHubUsername")]
    pub github_username: String,
    pub full_name: String,
    pub email: String,
    pub date_of_birth: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: Uuid,
    #[serde(rename = "gitHubUsername")]
    pub github_username: String,
    pub full_name: String,
    pub email: String,
    pub date_of_birth: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomersResponse {
    pub customers: Vec<CustomerResponse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBatchRequest {
    pub action: ActionType,
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    #[serde(rename = "gitHubUsername", default)]
    pub github_username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    pub date_of_birth: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrderRequest {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub shipping_address: Option<AddressRequest>,
    #[serde(default)]
    pub billing_address: Option<AddressRequest>,
    #[serde(default)]
    pub order_details: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub price: f64,
}
