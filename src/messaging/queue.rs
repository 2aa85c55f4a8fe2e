use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_sqs::Client as SqsClient;
use aws_sdk_sqs::types::{MessageAttributeValue, MessageSystemAttributeName};

use crate::core::messages::MESSAGE_TYPE_ATTRIBUTE;
use crate::errors::CustomerError;

/// A message as handed out by a queue receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
    /// String-valued message attributes.
    pub attributes: HashMap<String, String>,
}

/// Point-to-point queue operations used by the publisher and the consumer.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    async fn queue_url(&self, queue_name: &str) -> Result<String, CustomerError>;

    async fn receive(
        &self,
        queue_url: &str,
        max_messages: i32,
    ) -> Result<Vec<ReceivedMessage>, CustomerError>;

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), CustomerError>;

    /// Sends `body` tagged with `message_type`; returns the message id.
    async fn send(
        &self,
        queue_url: &str,
        body: String,
        message_type: &str,
    ) -> Result<String, CustomerError>;
}

pub struct SqsQueue {
    client: SqsClient,
}

impl SqsQueue {
    pub fn new(client: SqsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageQueue for SqsQueue {
    async fn queue_url(&self, queue_name: &str) -> Result<String, CustomerError> {
        let response = self
            .client
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await?;
        response
            .queue_url()
            .map(str::to_string)
            .ok_or_else(|| CustomerError::NotFound(format!("queue {queue_name}")))
    }

    async fn receive(
        &self,
        queue_url: &str,
        max_messages: i32,
    ) -> Result<Vec<ReceivedMessage>, CustomerError> {
        let response = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max_messages)
            .message_system_attribute_names(MessageSystemAttributeName::All)
            .message_attribute_names("All")
            .send()
            .await?;

        let messages = response
            .messages()
            .iter()
            .map(|m| ReceivedMessage {
                message_id: m.message_id().unwrap_or_default().to_string(),
                receipt_handle: m.receipt_handle().unwrap_or_default().to_string(),
                body: m.body().unwrap_or_default().to_string(),
                attributes: m
                    .message_attributes()
                    .map(|attrs| {
                        attrs
                            .iter()
                            .filter_map(|(k, v)| {
                                v.string_value().map(|s| (k.clone(), s.to_string()))
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect();
        Ok(messages)
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), CustomerError> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await?;
        Ok(())
    }

    async fn send(
        &self,
        queue_url: &str,
        body: String,
        message_type: &str,
    ) -> Result<String, CustomerError> {
        let attribute = MessageAttributeValue::builder()
            .data_type("String")
            .string_value(message_type)
            .build()?;

        let response = self
            .client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .message_attributes(MESSAGE_TYPE_ATTRIBUTE, attribute)
            .send()
            .await?;
        Ok(response.message_id().unwrap_or_default().to_string())
    }
}
