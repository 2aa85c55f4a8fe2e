//! Queue consumer: polls, dispatches by type tag, acknowledges on success

pub mod consumer;
pub mod handlers;

// Re-export the main types for convenience
pub use consumer::{ConsumerSettings, MIN_POLLING_PERIOD, Outcome, PollSummary, QueueConsumer};
pub use handlers::{HandlerRegistry, MessageHandler};
