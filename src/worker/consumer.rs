use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::OnceCell;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::handlers::HandlerRegistry;
use crate::core::messages::{CustomerMessage, MESSAGE_TYPE_ATTRIBUTE, MessageType};
use crate::errors::CustomerError;
use crate::messaging::{MessageQueue, ReceivedMessage};

/// Shortest period the loop will tick at; smaller settings are raised to it.
pub const MIN_POLLING_PERIOD: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ConsumerSettings {
    pub queue_name: String,
    pub polling_period: Duration,
    pub max_messages: i32,
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        Self {
            queue_name: "customers".to_string(),
            polling_period: Duration::from_secs(3),
            max_messages: 3,
        }
    }
}

/// What happened to one received message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Handled and deleted.
    Handled,
    /// Missing or unrecognized type tag; left on the queue.
    Skipped,
    /// Decode, handler or delete failure; left on the queue.
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub received: usize,
    pub handled: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl PollSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Handled => self.handled += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
        }
    }
}

/// Polls a queue on a fixed period and dispatches each message by its type tag.
///
/// Delivery is at-least-once: only successfully handled messages are deleted,
/// everything else is left for the queue's visibility timeout and redrive policy.
pub struct QueueConsumer {
    queue: Arc<dyn MessageQueue>,
    registry: HandlerRegistry,
    settings: ConsumerSettings,
    queue_url: OnceCell<String>,
}

impl QueueConsumer {
    pub fn new(
        queue: Arc<dyn MessageQueue>,
        registry: HandlerRegistry,
        settings: ConsumerSettings,
    ) -> Self {
        Self {
            queue,
            registry,
            settings,
            queue_url: OnceCell::new(),
        }
    }

    /// Runs until `cancel` fires. A tick in progress always completes.
    pub async fn run(&self, cancel: CancellationToken) {
        let period = self.settings.polling_period.max(MIN_POLLING_PERIOD);
        let mut timer = tokio::time::interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            queue = %self.settings.queue_name,
            period_ms = period.as_millis() as u64,
            "Queue consumer started"
        );

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = timer.tick() => {}
            }

            match self.poll_once(&cancel).await {
                Ok(summary) => debug!(?summary, "Poll tick finished"),
                Err(e) => error!("Failed to poll queue {}: {}", self.settings.queue_name, e),
            }
        }

        info!(queue = %self.settings.queue_name, "Queue consumer stopped");
    }

    /// Receives one batch and processes its messages in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue URL cannot be resolved or the receive fails.
    /// Per-message failures are logged and reported in the summary instead.
    pub async fn poll_once(&self, cancel: &CancellationToken) -> Result<PollSummary, CustomerError> {
        let queue_url = self
            .queue_url
            .get_or_try_init(|| self.queue.queue_url(&self.settings.queue_name))
            .await?;

        let messages = self
            .queue
            .receive(queue_url, self.settings.max_messages)
            .await?;
        info!("Total received messages: {}", messages.len());

        let mut summary = PollSummary {
            received: messages.len(),
            ..PollSummary::default()
        };
        for message in &messages {
            let outcome = self.process_message(queue_url, message, cancel).await;
            summary.record(outcome);
        }
        Ok(summary)
    }

    async fn process_message(
        &self,
        queue_url: &str,
        message: &ReceivedMessage,
        cancel: &CancellationToken,
    ) -> Outcome {
        let Some((tag, body)) = resolve_type_and_body(message) else {
            warn!(message_id = %message.message_id, "Unknown message type: <missing>");
            return Outcome::Skipped;
        };

        let message_type = match tag.parse::<MessageType>() {
            Ok(t) if self.registry.is_registered(t) => t,
            _ => {
                warn!(message_id = %message.message_id, "Unknown message type: {}", tag);
                return Outcome::Skipped;
            }
        };

        let decoded = match CustomerMessage::decode(message_type, &body) {
            Ok(m) => m,
            Err(e) => {
                error!(message_id = %message.message_id, "Message failed to deserialize: {}", e);
                return Outcome::Failed;
            }
        };

        let Some(handler) = self.registry.handler_for(message_type) else {
            return Outcome::Skipped;
        };
        if let Err(e) = handler.handle(&decoded, cancel).await {
            error!(message_id = %message.message_id, "Message failed during processing: {}", e);
            return Outcome::Failed;
        }

        match self.queue.delete(queue_url, &message.receipt_handle).await {
            Ok(()) => Outcome::Handled,
            Err(e) => {
                error!(message_id = %message.message_id, "Failed to delete handled message: {}", e);
                Outcome::Failed
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SnsEnvelope {
    #[serde(rename = "Type")]
    kind: String,
    message: String,
    #[serde(default)]
    message_attributes: HashMap<String, SnsAttribute>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SnsAttribute {
    value: String,
}

/// Reads the type tag from the SQS attribute or, for messages fanned out by
/// SNS without raw delivery, from the notification envelope.
pub fn resolve_type_and_body(message: &ReceivedMessage) -> Option<(String, String)> {
    if let Some(tag) = message
        .attributes
        .get(MESSAGE_TYPE_ATTRIBUTE)
        .filter(|t| !t.is_empty())
    {
        return Some((tag.clone(), message.body.clone()));
    }

    let envelope: SnsEnvelope = serde_json::from_str(&message.body).ok()?;
    if envelope.kind != "Notification" {
        return None;
    }
    let tag = envelope
        .message_attributes
        .get(MESSAGE_TYPE_ATTRIBUTE)
        .map(|a| a.value.clone())
        .filter(|t| !t.is_empty())?;
    Some((tag, envelope.message))
}
