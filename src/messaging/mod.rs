//! Message transport: queue access, producers and an in-memory queue.

pub mod memory;
pub mod queue;
pub mod sns;
pub mod sqs;

use async_trait::async_trait;

use crate::core::messages::CustomerMessage;
use crate::errors::CustomerError;

pub use memory::InMemoryQueue;
pub use queue::{MessageQueue, ReceivedMessage, SqsQueue};
pub use sns::SnsMessenger;
pub use sqs::SqsMessenger;

/// Producer side: serializes a message, tags it and hands it to the transport.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Returns the transport-assigned message id.
    async fn publish(&self, message: &CustomerMessage) -> Result<String, CustomerError>;
}
