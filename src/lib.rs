/// Customers - AWS-backed customer services.
///
/// This crate bundles the pieces of a small customer platform:
/// 1. A REST API that validates customers, stores them in DynamoDB and
///    publishes an event per change to SQS or SNS
/// 2. A queue consumer that polls SQS and dispatches each message to a handler
///    chosen by its `MessageType` attribute
/// 3. Lambda functions: a greeter and an S3 image resizer
///
/// # Architecture
///
/// The system uses:
/// - axum and tower-http for the HTTP surface
/// - the AWS SDK for SQS, SNS, DynamoDB, S3 and Secrets Manager
/// - `lambda_runtime` for the Lambda handlers
/// - Tokio for async runtime
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use customers::messaging::{MessageQueue, SqsQueue};
/// use customers::worker::{ConsumerSettings, HandlerRegistry, QueueConsumer};
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     customers::setup_logging();
///
///     let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
///     let queue: Arc<dyn MessageQueue> = Arc::new(SqsQueue::new(aws_sdk_sqs::Client::new(&aws)));
///     let consumer = QueueConsumer::new(queue, HandlerRegistry::logging(), ConsumerSettings::default());
///
///     consumer.run(CancellationToken::new()).await;
///     Ok(())
/// }
/// ```
pub mod api;
pub mod clients;
pub mod core;
pub mod errors;
pub mod lambda;
pub mod messaging;
pub mod repository;
pub mod secrets;
pub mod service;
pub mod storage;
pub mod worker;

/// Configure structured logging with JSON format.
///
/// Installs tracing-subscriber with a JSON formatter suitable for `CloudWatch`
/// Logs and an `EnvFilter` read from `RUST_LOG` (default `info`). Calling it
/// again once a subscriber is installed is a no-op.
///
/// # Example
///
/// ```
/// customers::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
