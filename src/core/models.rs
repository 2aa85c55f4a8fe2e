use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer as the service layer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub github_username: String,
    pub date_of_birth: DateTime<Utc>,
}

/// Customer row as stored in the customers table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerDto {
    pub id: Uuid,
    pub email: String,
    #[serde(rename = "GitHubUsername", default)]
    pub github_username: String,
    pub full_name: String,
    #[serde(default)]
    pub date_of_birth: DateTime<Utc>,
    #[serde(with = "timestamp", default)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderDto {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub order_total: f64,
    pub shipping_address: AddressDto,
    pub billing_address: AddressDto,
    pub order_details: Vec<OrderItemDto>,
}

impl OrderDto {
    /// Builds an order whose total is the sum of its item prices.
    pub fn new(
        order_id: Uuid,
        customer_id: Uuid,
        shipping_address: AddressDto,
        billing_address: AddressDto,
        order_details: Vec<OrderItemDto>,
    ) -> Self {
        let order_total = order_details.iter().map(|item| item.price).sum();
        Self {
            order_id,
            customer_id,
            order_date: Utc::now(),
            order_total,
            shipping_address,
            billing_address,
            order_details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderItemDto {
    pub product_id: Uuid,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddressDto {
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Fixed-width UTC timestamps (`2024-02-17T17:40:17.000000Z`).
///
/// Conditional writes compare `UpdatedAt` as a string, so every stored value
/// must sort lexically in time order.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

    pub fn format(value: &DateTime<Utc>) -> String {
        value.format(FORMAT).to_string()
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        NaiveDateTime::parse_from_str(raw, FORMAT)
            .map(|naive| naive.and_utc())
            .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)))
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}
