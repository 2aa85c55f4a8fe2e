use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CustomerBatch, CustomerRepository};
use crate::core::models::{CustomerDto, OrderDto, timestamp};
use crate::errors::CustomerError;

#[derive(Debug, Default)]
struct Tables {
    customers: HashMap<Uuid, CustomerDto>,
    orders: HashMap<Uuid, OrderDto>,
}

/// Repository backed by process memory, honouring the same conditional-write
/// rules as the DynamoDB implementation.
#[derive(Debug, Default)]
pub struct InMemoryCustomerRepository {
    tables: RwLock<Tables>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `customer` as-is, keeping its `updated_at`.
    pub async fn seed(&self, customer: CustomerDto) {
        self.tables
            .write()
            .await
            .customers
            .insert(customer.id, customer);
    }

    pub async fn order(&self, order_id: Uuid) -> Option<OrderDto> {
        self.tables.read().await.orders.get(&order_id).cloned()
    }

    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn create(&self, mut customer: CustomerDto) -> Result<bool, CustomerError> {
        let mut tables = self.tables.write().await;
        if tables.customers.contains_key(&customer.id) {
            return Err(CustomerError::Conflict(format!(
                "customer {} already exists",
                customer.id
            )));
        }
        customer.updated_at = Utc::now();
        tables.customers.insert(customer.id, customer);
        Ok(true)
    }

    async fn get(&self, id: Uuid) -> Result<Option<CustomerDto>, CustomerError> {
        Ok(self.tables.read().await.customers.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<CustomerDto>, CustomerError> {
        Ok(self
            .tables
            .read()
            .await
            .customers
            .values()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn get_all(&self) -> Result<Vec<CustomerDto>, CustomerError> {
        Ok(self.tables.read().await.customers.values().cloned().collect())
    }

    async fn update(
        &self,
        mut customer: CustomerDto,
        request_started: DateTime<Utc>,
    ) -> Result<bool, CustomerError> {
        let mut tables = self.tables.write().await;
        // A missing row fails the condition just like a newer one. Compared as
        // stored strings, matching the DynamoDB condition expression.
        let started = timestamp::format(&request_started);
        let accepted = tables
            .customers
            .get(&customer.id)
            .is_some_and(|stored| timestamp::format(&stored.updated_at) < started);
        if !accepted {
            return Err(CustomerError::Conflict(format!(
                "customer {} was modified after the request started",
                customer.id
            )));
        }
        customer.updated_at = Utc::now();
        tables.customers.insert(customer.id, customer);
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CustomerError> {
        Ok(self.tables.write().await.customers.remove(&id).is_some())
    }

    async fn process_batch(&self, batch: CustomerBatch) -> Result<bool, CustomerError> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        for mut customer in batch.create.into_iter().chain(batch.update) {
            customer.updated_at = now;
            tables.customers.insert(customer.id, customer);
        }
        for customer in batch.delete {
            tables.customers.remove(&customer.id);
        }
        Ok(true)
    }

    async fn create_order(
        &self,
        mut customer: CustomerDto,
        order: OrderDto,
    ) -> Result<bool, CustomerError> {
        let mut tables = self.tables.write().await;
        if tables.customers.contains_key(&customer.id) || tables.orders.contains_key(&order.order_id)
        {
            return Err(CustomerError::Conflict(format!(
                "order {} was rejected by the transaction",
                order.order_id
            )));
        }
        customer.updated_at = Utc::now();
        tables.customers.insert(customer.id, customer);
        tables.orders.insert(order.order_id, order);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn row(updated_at: DateTime<Utc>) -> CustomerDto {
        CustomerDto {
            id: Uuid::new_v4(),
            email: "mona@example.com".to_string(),
            github_username: "octocat".to_string(),
            full_name: "Mona Lisa".to_string(),
            date_of_birth: Utc.with_ymd_and_hms(1990, 1, 2, 0, 0, 0).unwrap(),
            updated_at,
        }
    }

    #[tokio::test]
    async fn test_update_within_same_microsecond_conflicts() {
        let base = Utc.with_ymd_and_hms(2024, 2, 17, 17, 40, 17).unwrap();
        let stored = row(base + chrono::Duration::nanoseconds(100));
        let repository = InMemoryCustomerRepository::new();
        repository.seed(stored.clone()).await;

        let request_started = base + chrono::Duration::nanoseconds(900);
        let err = repository.update(stored, request_started).await.unwrap_err();
        assert!(matches!(err, CustomerError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_in_a_later_microsecond_is_accepted() {
        let base = Utc.with_ymd_and_hms(2024, 2, 17, 17, 40, 17).unwrap();
        let stored = row(base);
        let repository = InMemoryCustomerRepository::new();
        repository.seed(stored.clone()).await;

        let request_started = base + chrono::Duration::microseconds(1);
        assert!(repository.update(stored, request_started).await.unwrap());
    }
}
