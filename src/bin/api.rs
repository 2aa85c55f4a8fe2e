use std::sync::Arc;

use aws_config::BehaviorVersion;
use customers::api::{self, AppState};
use customers::clients::GitHubClient;
use customers::core::config::AppConfig;
use customers::messaging::{Messenger, SnsMessenger, SqsMessenger, SqsQueue};
use customers::repository::DynamoCustomerRepository;
use customers::secrets::{SecretStore, SecretsConfig};
use customers::service::CustomerService;
use customers::storage::S3ImageStore;
use tokio::net::TcpListener;
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
    let shutdown = CancellationToken::new();

    let mut github = GitHubClient::new(&config.github_api_base_url)?;
    if config.secrets_enabled {
        let store = SecretStore::new(aws_sdk_secretsmanager::Client::new(&aws));
        let prefix = config.secrets_prefix();
        let secrets = SecretsConfig::load(&store, &prefix).await?;
        info!(count = secrets.len(), prefix = %prefix, "Loaded configuration secrets");
        secrets.spawn_refresh(
            store,
            prefix,
            config.secrets_polling_interval,
            shutdown.child_token(),
        );
        github = github.with_secrets(secrets);
    }

    let messenger: Arc<dyn Messenger> = match &config.topic_name {
        Some(topic) => {
            info!(topic = %topic, "Publishing customer events to SNS");
            Arc::new(SnsMessenger::new(aws_sdk_sns::Client::new(&aws), topic))
        }
        None => {
            info!(queue = %config.queue_name, "Publishing customer events to SQS");
            let queue = Arc::new(SqsQueue::new(aws_sdk_sqs::Client::new(&aws)));
            Arc::new(SqsMessenger::new(queue, &config.queue_name))
        }
    };

    let repository = DynamoCustomerRepository::new(
        aws_sdk_dynamodb::Client::new(&aws),
        &config.customers_table,
        &config.orders_table,
        &config.email_index,
    );
    let service = CustomerService::new(Arc::new(repository), Arc::new(github))
        .with_messenger(messenger);
    let images = S3ImageStore::new(aws_sdk_s3::Client::new(&aws), &config.images_bucket);

    let router = api::build_router(AppState {
        customers: Arc::new(service),
        images: Arc::new(images),
    });
    let listener = TcpListener::bind(&config.bind_addr).await?;

    let signal = shutdown.clone();
    api::serve(listener, router, async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
        signal.cancel();
    })
    .await
}
