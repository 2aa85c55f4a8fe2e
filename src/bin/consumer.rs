use std::sync::Arc;

use aws_config::BehaviorVersion;
use customers::core::config::AppConfig;
use customers::messaging::SqsQueue;
use customers::worker::{ConsumerSettings, HandlerRegistry, QueueConsumer};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    customers::setup_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        anyhow::Error::msg(e)
    })?;
    let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let queue = Arc::new(SqsQueue::new(aws_sdk_sqs::Client::new(&aws)));

    let consumer = QueueConsumer::new(
        queue,
        HandlerRegistry::logging(),
        ConsumerSettings {
            queue_name: config.queue_name.clone(),
            polling_period: config.polling_period,
            max_messages: config.max_messages,
        },
    );

    let cancel = CancellationToken::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
        signal.cancel();
    });

    consumer.run(cancel).await;
    Ok(())
}
