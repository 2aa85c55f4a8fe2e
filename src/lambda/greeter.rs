use lambda_runtime::{Error, LambdaEvent};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GreetingRequest {
    pub name: String,
}

pub fn greeting(name: &str) -> String {
    format!("Hello, {name}!")
}

pub async fn greet(event: LambdaEvent<GreetingRequest>) -> Result<String, Error> {
    info!(
        request_id = %event.context.request_id,
        name = %event.payload.name,
        "Greeting request received"
    );
    Ok(greeting(&event.payload.name))
}
