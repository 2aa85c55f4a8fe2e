use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::info;

use super::Messenger;
use super::queue::MessageQueue;
use crate::core::messages::CustomerMessage;
use crate::errors::CustomerError;

/// Publishes customer messages to a named queue.
///
/// The queue URL is resolved on first use and cached for the lifetime of
/// the messenger; it is never re-resolved.
pub struct SqsMessenger {
    queue: Arc<dyn MessageQueue>,
    queue_name: String,
    queue_url: OnceCell<String>,
}

impl SqsMessenger {
    pub fn new(queue: Arc<dyn MessageQueue>, queue_name: impl Into<String>) -> Self {
        Self {
            queue,
            queue_name: queue_name.into(),
            queue_url: OnceCell::new(),
        }
    }

    async fn queue_url(&self) -> Result<&str, CustomerError> {
        let url = self
            .queue_url
            .get_or_try_init(|| self.queue.queue_url(&self.queue_name))
            .await?;
        Ok(url.as_str())
    }
}

#[async_trait]
impl Messenger for SqsMessenger {
    async fn publish(&self, message: &CustomerMessage) -> Result<String, CustomerError> {
        let queue_url = self.queue_url().await?;
        let body = message.to_body()?;
        let message_type = message.message_type();

        let message_id = self
            .queue
            .send(queue_url, body, message_type.as_str())
            .await?;
        info!(
            message_id = %message_id,
            message_type = %message_type,
            customer_id = %message.customer_id(),
            "Sent message to SQS"
        );
        Ok(message_id)
    }
}
