//! Customer persistence.

pub mod attributes;
pub mod dynamo;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::models::{CustomerDto, OrderDto};
use crate::errors::CustomerError;

pub use dynamo::DynamoCustomerRepository;
pub use memory::InMemoryCustomerRepository;

/// Rows to write in one batch, grouped by action.
#[derive(Debug, Clone, Default)]
pub struct CustomerBatch {
    pub create: Vec<CustomerDto>,
    pub update: Vec<CustomerDto>,
    pub delete: Vec<CustomerDto>,
}

impl CustomerBatch {
    pub fn len(&self) -> usize {
        self.create.len() + self.update.len() + self.delete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Inserts a new row. An existing row with the same key is a `Conflict`.
    async fn create(&self, customer: CustomerDto) -> Result<bool, CustomerError>;

    async fn get(&self, id: Uuid) -> Result<Option<CustomerDto>, CustomerError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<CustomerDto>, CustomerError>;

    async fn get_all(&self) -> Result<Vec<CustomerDto>, CustomerError>;

    /// Replaces the row only if it was last written before `request_started`;
    /// otherwise returns `Conflict`.
    async fn update(
        &self,
        customer: CustomerDto,
        request_started: DateTime<Utc>,
    ) -> Result<bool, CustomerError>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, id: Uuid) -> Result<bool, CustomerError>;

    /// Non-transactional: each row succeeds or fails on its own. Returns
    /// `false` if any row could not be written.
    async fn process_batch(&self, batch: CustomerBatch) -> Result<bool, CustomerError>;

    /// Writes the customer and the order atomically.
    async fn create_order(
        &self,
        customer: CustomerDto,
        order: OrderDto,
    ) -> Result<bool, CustomerError>;
}
