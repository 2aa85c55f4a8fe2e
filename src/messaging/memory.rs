use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::queue::{MessageQueue, ReceivedMessage};
use crate::core::messages::MESSAGE_TYPE_ATTRIBUTE;
use crate::errors::CustomerError;

#[derive(Debug, Clone)]
struct StoredMessage {
    message_id: String,
    body: String,
    attributes: HashMap<String, String>,
}

#[derive(Debug, Default)]
struct QueueState {
    visible: VecDeque<StoredMessage>,
    in_flight: HashMap<String, StoredMessage>,
}

/// Process-local queue with SQS-like receive/delete semantics.
///
/// Received messages stay invisible until they are deleted or
/// [`InMemoryQueue::release_unacked`] simulates the visibility timeout expiring.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    queues: Mutex<HashMap<String, QueueState>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url_for(queue_name: &str) -> String {
        format!("memory://{queue_name}")
    }

    /// Enqueues a raw message, bypassing any messenger. `message_type` of
    /// `None` leaves the type attribute off.
    pub async fn push_raw(&self, queue_url: &str, body: &str, message_type: Option<&str>) {
        let mut attributes = HashMap::new();
        if let Some(t) = message_type {
            attributes.insert(MESSAGE_TYPE_ATTRIBUTE.to_string(), t.to_string());
        }
        let mut queues = self.queues.lock().await;
        queues
            .entry(queue_url.to_string())
            .or_default()
            .visible
            .push_back(StoredMessage {
                message_id: Uuid::new_v4().to_string(),
                body: body.to_string(),
                attributes,
            });
    }

    /// Makes every received-but-undeleted message visible again.
    pub async fn release_unacked(&self, queue_url: &str) {
        let mut queues = self.queues.lock().await;
        if let Some(state) = queues.get_mut(queue_url) {
            let released: Vec<StoredMessage> = state.in_flight.drain().map(|(_, m)| m).collect();
            state.visible.extend(released);
        }
    }

    /// Messages still owned by the queue, visible or in flight.
    pub async fn pending(&self, queue_url: &str) -> usize {
        let queues = self.queues.lock().await;
        queues
            .get(queue_url)
            .map_or(0, |s| s.visible.len() + s.in_flight.len())
    }

    pub async fn visible(&self, queue_url: &str) -> usize {
        let queues = self.queues.lock().await;
        queues.get(queue_url).map_or(0, |s| s.visible.len())
    }
}

#[async_trait]
impl MessageQueue for InMemoryQueue {
    async fn queue_url(&self, queue_name: &str) -> Result<String, CustomerError> {
        let url = Self::url_for(queue_name);
        self.queues.lock().await.entry(url.clone()).or_default();
        Ok(url)
    }

    async fn receive(
        &self,
        queue_url: &str,
        max_messages: i32,
    ) -> Result<Vec<ReceivedMessage>, CustomerError> {
        let mut queues = self.queues.lock().await;
        let state = queues
            .get_mut(queue_url)
            .ok_or_else(|| CustomerError::NotFound(format!("queue {queue_url}")))?;

        let take = usize::try_from(max_messages.max(0)).unwrap_or(0);
        let mut received = Vec::with_capacity(take);
        while received.len() < take {
            let Some(message) = state.visible.pop_front() else {
                break;
            };
            let receipt_handle = Uuid::new_v4().to_string();
            received.push(ReceivedMessage {
                message_id: message.message_id.clone(),
                receipt_handle: receipt_handle.clone(),
                body: message.body.clone(),
                attributes: message.attributes.clone(),
            });
            state.in_flight.insert(receipt_handle, message);
        }
        Ok(received)
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), CustomerError> {
        let mut queues = self.queues.lock().await;
        let removed = queues
            .get_mut(queue_url)
            .and_then(|s| s.in_flight.remove(receipt_handle));
        match removed {
            Some(_) => Ok(()),
            None => Err(CustomerError::AwsError(format!(
                "ReceiptHandleIsInvalid: {receipt_handle}"
            ))),
        }
    }

    async fn send(
        &self,
        queue_url: &str,
        body: String,
        message_type: &str,
    ) -> Result<String, CustomerError> {
        let message_id = Uuid::new_v4().to_string();
        let mut queues = self.queues.lock().await;
        let state = queues
            .get_mut(queue_url)
            .ok_or_else(|| CustomerError::NotFound(format!("queue {queue_url}")))?;
        state.visible.push_back(StoredMessage {
            message_id: message_id.clone(),
            body,
            attributes: HashMap::from([(
                MESSAGE_TYPE_ATTRIBUTE.to_string(),
                message_type.to_string(),
            )]),
        });
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_received_messages_stay_hidden_until_released() {
        let queue = InMemoryQueue::new();
        let url = queue.queue_url("customers").await.unwrap();
        queue.push_raw(&url, "{}", Some("CustomerDeleted")).await;

        let first = queue.receive(&url, 3).await.unwrap();
        assert_eq!(first.len(), 1);
        assert!(queue.receive(&url, 3).await.unwrap().is_empty());
        assert_eq!(queue.pending(&url).await, 1);

        queue.release_unacked(&url).await;
        let again = queue.receive(&url, 3).await.unwrap();
        assert_eq!(again[0].message_id, first[0].message_id);
        assert_ne!(again[0].receipt_handle, first[0].receipt_handle);
    }

    #[tokio::test]
    async fn test_delete_requires_a_live_receipt_handle() {
        let queue = InMemoryQueue::new();
        let url = queue.queue_url("customers").await.unwrap();
        queue.send(&url, "{}".into(), "CustomerDeleted").await.unwrap();

        let received = queue.receive(&url, 1).await.unwrap();
        queue.delete(&url, &received[0].receipt_handle).await.unwrap();
        assert_eq!(queue.pending(&url).await, 0);
        assert!(queue.delete(&url, &received[0].receipt_handle).await.is_err());
    }

    #[tokio::test]
    async fn test_receive_respects_batch_size() {
        let queue = InMemoryQueue::new();
        let url = queue.queue_url("customers").await.unwrap();
        for _ in 0..5 {
            queue.push_raw(&url, "{}", None).await;
        }
        assert_eq!(queue.receive(&url, 3).await.unwrap().len(), 3);
        assert_eq!(queue.visible(&url).await, 2);
    }
}
