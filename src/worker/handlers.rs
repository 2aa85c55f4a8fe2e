use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::core::messages::{CustomerMessage, MessageType};
use crate::errors::CustomerError;

#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(
        &self,
        message: &CustomerMessage,
        cancel: &CancellationToken,
    ) -> Result<(), CustomerError>;
}

/// Explicit `MessageType -> handler` dispatch table.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<MessageType, Arc<dyn MessageHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the logging handler for every customer message type.
    pub fn logging() -> Self {
        Self::new()
            .register(MessageType::CustomerCreated, Arc::new(CustomerCreatedHandler))
            .register(MessageType::CustomerUpdated, Arc::new(CustomerUpdatedHandler))
            .register(MessageType::CustomerDeleted, Arc::new(CustomerDeletedHandler))
    }

    #[must_use]
    pub fn register(mut self, message_type: MessageType, handler: Arc<dyn MessageHandler>) -> Self {
        self.handlers.insert(message_type, handler);
        self
    }

    pub fn handler_for(&self, message_type: MessageType) -> Option<&Arc<dyn MessageHandler>> {
        self.handlers.get(&message_type)
    }

    pub fn is_registered(&self, message_type: MessageType) -> bool {
        self.handlers.contains_key(&message_type)
    }
}

pub struct CustomerCreatedHandler;

#[async_trait]
impl MessageHandler for CustomerCreatedHandler {
    async fn handle(
        &self,
        message: &CustomerMessage,
        _cancel: &CancellationToken,
    ) -> Result<(), CustomerError> {
        let CustomerMessage::Created(created) = message else {
            return Err(unexpected(MessageType::CustomerCreated, message));
        };
        info!(customer_id = %created.id, "CustomerCreated: {}", created.full_name);
        Ok(())
    }
}

pub struct CustomerUpdatedHandler;

#[async_trait]
impl MessageHandler for CustomerUpdatedHandler {
    async fn handle(
        &self,
        message: &CustomerMessage,
        _cancel: &CancellationToken,
    ) -> Result<(), CustomerError> {
        let CustomerMessage::Updated(updated) = message else {
            return Err(unexpected(MessageType::CustomerUpdated, message));
        };
        info!(customer_id = %updated.id, "CustomerUpdated: {}", updated.github_username);
        Ok(())
    }
}

pub struct CustomerDeletedHandler;

#[async_trait]
impl MessageHandler for CustomerDeletedHandler {
    async fn handle(
        &self,
        message: &CustomerMessage,
        _cancel: &CancellationToken,
    ) -> Result<(), CustomerError> {
        let CustomerMessage::Deleted(deleted) = message else {
            return Err(unexpected(MessageType::CustomerDeleted, message));
        };
        info!("CustomerDeleted: {}", deleted.id);
        Ok(())
    }
}

fn unexpected(expected: MessageType, got: &CustomerMessage) -> CustomerError {
    CustomerError::HandlerError(format!(
        "{expected} handler received {}",
        got.message_type()
    ))
}
