use aws_config::BehaviorVersion;
use customers::lambda::ImageResizer;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde_json::Value;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let resizer = ImageResizer::new(aws_sdk_s3::Client::new(&aws));
    let resizer = &resizer;

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        resizer.handle(event).await
    }))
    .await
}
