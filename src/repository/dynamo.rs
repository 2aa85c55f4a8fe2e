use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_dynamodb::types::{
    AttributeValue, DeleteRequest, Put, PutRequest, ReturnValue, TransactWriteItem, WriteRequest,
};
use chrono::{DateTime, Utc};
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, warn};
use uuid::Uuid;

use super::attributes::{Item, from_item, string_key, to_item};
use super::{CustomerBatch, CustomerRepository};
use crate::core::models::{CustomerDto, OrderDto, timestamp};
use crate::errors::CustomerError;

/// BatchWriteItem accepts at most 25 write requests per call.
const BATCH_CHUNK_SIZE: usize = 25;
const MAX_BATCH_ATTEMPTS: usize = 3;

pub struct DynamoCustomerRepository {
    client: DynamoClient,
    customers_table: String,
    orders_table: String,
    email_index: String,
}

impl DynamoCustomerRepository {
    pub fn new(
        client: DynamoClient,
        customers_table: impl Into<String>,
        orders_table: impl Into<String>,
        email_index: impl Into<String>,
    ) -> Self {
        Self {
            client,
            customers_table: customers_table.into(),
            orders_table: orders_table.into(),
            email_index: email_index.into(),
        }
    }
}

/// Customers are keyed by their id in both `pk` and `sk`.
fn customer_key(id: Uuid) -> Item {
    Item::from([
        ("pk".to_string(), string_key(id.to_string())),
        ("sk".to_string(), string_key(id.to_string())),
    ])
}

pub fn customer_item(customer: &CustomerDto) -> Result<Item, CustomerError> {
    let mut item = to_item(customer)?;
    item.extend(customer_key(customer.id));
    Ok(item)
}

/// Orders are keyed by order id, with the owning customer as sort key.
pub fn order_item(order: &OrderDto) -> Result<Item, CustomerError> {
    let mut item = to_item(order)?;
    item.insert("pk".to_string(), string_key(order.order_id.to_string()));
    item.insert("sk".to_string(), string_key(order.customer_id.to_string()));
    Ok(item)
}

#[async_trait]
impl CustomerRepository for DynamoCustomerRepository {
    async fn create(&self, mut customer: CustomerDto) -> Result<bool, CustomerError> {
        customer.updated_at = Utc::now();
        let item = customer_item(&customer)?;

        let result = self
            .client
            .put_item()
            .table_name(&self.customers_table)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(pk) and attribute_not_exists(sk)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                Err(CustomerError::Conflict(format!(
                    "customer {} already exists",
                    customer.id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<CustomerDto>, CustomerError> {
        let response = self
            .client
            .get_item()
            .table_name(&self.customers_table)
            .set_key(Some(customer_key(id)))
            .send()
            .await?;

        match response.item() {
            Some(item) if !item.is_empty() => Ok(Some(from_item(item)?)),
            _ => Ok(None),
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<CustomerDto>, CustomerError> {
        let response = self
            .client
            .query()
            .table_name(&self.customers_table)
            .index_name(&self.email_index)
            .key_condition_expression("Email = :v_Email")
            .expression_attribute_values(":v_Email", AttributeValue::S(email.to_string()))
            .limit(1)
            .send()
            .await?;

        response
            .items()
            .first()
            .map(from_item::<CustomerDto>)
            .transpose()
    }

    async fn get_all(&self) -> Result<Vec<CustomerDto>, CustomerError> {
        let mut customers = Vec::new();
        let mut start_key: Option<Item> = None;
        loop {
            let response = self
                .client
                .scan()
                .table_name(&self.customers_table)
                .set_exclusive_start_key(start_key)
                .send()
                .await?;

            for item in response.items() {
                customers.push(from_item(item)?);
            }

            start_key = response.last_evaluated_key().cloned();
            if start_key.is_none() {
                break;
            }
        }
        Ok(customers)
    }

    async fn update(
        &self,
        mut customer: CustomerDto,
        request_started: DateTime<Utc>,
    ) -> Result<bool, CustomerError> {
        customer.updated_at = Utc::now();
        let item = customer_item(&customer)?;

        let result = self
            .client
            .put_item()
            .table_name(&self.customers_table)
            .set_item(Some(item))
            .condition_expression("UpdatedAt < :requestStarted")
            .expression_attribute_values(
                ":requestStarted",
                AttributeValue::S(timestamp::format(&request_started)),
            )
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                Err(CustomerError::Conflict(format!(
                    "customer {} was modified after the request started",
                    customer.id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CustomerError> {
        let response = self
            .client
            .delete_item()
            .table_name(&self.customers_table)
            .set_key(Some(customer_key(id)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await?;

        Ok(response.attributes().is_some_and(|a| !a.is_empty()))
    }

    async fn process_batch(&self, batch: CustomerBatch) -> Result<bool, CustomerError> {
        let now = Utc::now();
        let mut requests = Vec::with_capacity(batch.len());
        for mut customer in batch.create.into_iter().chain(batch.update) {
            customer.updated_at = now;
            let put = PutRequest::builder()
                .set_item(Some(customer_item(&customer)?))
                .build()?;
            requests.push(WriteRequest::builder().put_request(put).build());
        }
        for customer in batch.delete {
            let delete = DeleteRequest::builder()
                .set_key(Some(customer_key(customer.id)))
                .build()?;
            requests.push(WriteRequest::builder().delete_request(delete).build());
        }

        let mut all_written = true;
        for chunk in requests.chunks(BATCH_CHUNK_SIZE) {
            let mut pending = chunk.to_vec();
            let mut delays = ExponentialBackoff::from_millis(50)
                .map(jitter)
                .take(MAX_BATCH_ATTEMPTS - 1);

            loop {
                let response = self
                    .client
                    .batch_write_item()
                    .request_items(&self.customers_table, pending)
                    .send()
                    .await?;

                pending = response
                    .unprocessed_items()
                    .and_then(|items| items.get(&self.customers_table))
                    .cloned()
                    .unwrap_or_default();
                if pending.is_empty() {
                    break;
                }

                match delays.next() {
                    Some(delay) => {
                        warn!(unprocessed = pending.len(), "Retrying unprocessed batch writes");
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        warn!(unprocessed = pending.len(), "Giving up on unprocessed batch writes");
                        all_written = false;
                        break;
                    }
                }
            }
        }

        info!(requests = requests.len(), all_written, "Processed customer batch");
        Ok(all_written)
    }

    async fn create_order(
        &self,
        mut customer: CustomerDto,
        order: OrderDto,
    ) -> Result<bool, CustomerError> {
        customer.updated_at = Utc::now();

        let put_customer = Put::builder()
            .table_name(&self.customers_table)
            .set_item(Some(customer_item(&customer)?))
            .condition_expression("attribute_not_exists(pk)")
            .build()?;
        let put_order = Put::builder()
            .table_name(&self.orders_table)
            .set_item(Some(order_item(&order)?))
            .condition_expression("attribute_not_exists(pk)")
            .build()?;

        let result = self
            .client
            .transact_write_items()
            .transact_items(TransactWriteItem::builder().put(put_customer).build())
            .transact_items(TransactWriteItem::builder().put(put_order).build())
            .send()
            .await;

        match result {
            Ok(_) => {
                info!(order_id = %order.order_id, customer_id = %customer.id, "Order created");
                Ok(true)
            }
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_transaction_canceled_exception()) =>
            {
                Err(CustomerError::Conflict(format!(
                    "order {} was rejected by the transaction",
                    order.order_id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }
}
