//! Customer use cases: validation against external state, persistence and
//! event publication.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::api::contracts::{ActionType, CustomerBatchRequest, CustomerOrderRequest};
use crate::clients::GitHubService;
use crate::core::mapping;
use crate::core::messages::CustomerMessage;
use crate::core::models::Customer;
use crate::errors::CustomerError;
use crate::messaging::Messenger;
use crate::repository::{CustomerBatch, CustomerRepository};

pub struct CustomerService {
    repository: Arc<dyn CustomerRepository>,
    github: Arc<dyn GitHubService>,
    messenger: Option<Arc<dyn Messenger>>,
}

impl CustomerService {
    pub fn new(repository: Arc<dyn CustomerRepository>, github: Arc<dyn GitHubService>) -> Self {
        Self {
            repository,
            github,
            messenger: None,
        }
    }

    /// Publishes an event after every successful create, update and delete.
    #[must_use]
    pub fn with_messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    async fn publish(&self, message: CustomerMessage) -> Result<(), CustomerError> {
        if let Some(messenger) = &self.messenger {
            let message_id = messenger.publish(&message).await?;
            info!(
                message_type = %message.message_type(),
                customer_id = %message.customer_id(),
                message_id = %message_id,
                "Published customer event"
            );
        }
        Ok(())
    }

    async fn ensure_github_user(&self, username: &str) -> Result<(), CustomerError> {
        if self.github.is_valid_github_user(username).await? {
            return Ok(());
        }
        Err(CustomerError::validation(
            "GitHubUsername",
            format!("There is no GitHub user with username {username}"),
        ))
    }

    /// # Errors
    ///
    /// `Validation` when the id is taken or the GitHub user does not exist.
    #[instrument(skip(self, customer), fields(customer_id = %customer.id))]
    pub async fn create(&self, customer: &Customer) -> Result<bool, CustomerError> {
        if self.repository.get(customer.id).await?.is_some() {
            return Err(CustomerError::validation(
                "Customer",
                format!("A user with id {} already exists", customer.id),
            ));
        }
        self.ensure_github_user(&customer.github_username).await?;

        let created = self
            .repository
            .create(mapping::customer_to_dto(customer))
            .await?;
        if created {
            self.publish(mapping::customer_created(customer)).await?;
        }
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Customer>, CustomerError> {
        Ok(self.repository.get(id).await?.map(mapping::dto_to_customer))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Customer>, CustomerError> {
        Ok(self
            .repository
            .get_by_email(email)
            .await?
            .map(mapping::dto_to_customer))
    }

    pub async fn get_all(&self) -> Result<Vec<Customer>, CustomerError> {
        Ok(self
            .repository
            .get_all()
            .await?
            .into_iter()
            .map(mapping::dto_to_customer)
            .collect())
    }

    /// Rejected with `Conflict` when the stored row changed after
    /// `request_started`.
    #[instrument(skip(self, customer), fields(customer_id = %customer.id))]
    pub async fn update(
        &self,
        customer: &Customer,
        request_started: DateTime<Utc>,
    ) -> Result<bool, CustomerError> {
        self.ensure_github_user(&customer.github_username).await?;

        let updated = self
            .repository
            .update(mapping::customer_to_dto(customer), request_started)
            .await?;
        if updated {
            self.publish(mapping::customer_updated(customer)).await?;
        }
        Ok(updated)
    }

    /// Returns `false` when there was no such customer.
    pub async fn delete(&self, id: Uuid) -> Result<bool, CustomerError> {
        let deleted = self.repository.delete(id).await?;
        if deleted {
            self.publish(mapping::customer_deleted(id)).await?;
        }
        Ok(deleted)
    }

    pub async fn process_batch(
        &self,
        batch: &[CustomerBatchRequest],
    ) -> Result<bool, CustomerError> {
        let batch = CustomerBatch {
            create: mapping::batch_to_dtos(batch, ActionType::Create),
            update: mapping::batch_to_dtos(batch, ActionType::Update),
            delete: mapping::batch_to_dtos(batch, ActionType::Delete),
        };
        info!(
            create = batch.create.len(),
            update = batch.update.len(),
            delete = batch.delete.len(),
            "Processing customer batch"
        );
        self.repository.process_batch(batch).await
    }

    /// Creates a new customer and their order in one transaction.
    pub async fn create_order(&self, request: &CustomerOrderRequest) -> Result<bool, CustomerError> {
        let customer = mapping::order_request_to_customer_dto(request);
        let Some(order) = mapping::order_request_to_order_dto(request, customer.id) else {
            return Err(CustomerError::validation(
                "ShippingAddress",
                "Both shipping and billing addresses are required",
            ));
        };
        self.repository.create_order(customer, order).await
    }
}
