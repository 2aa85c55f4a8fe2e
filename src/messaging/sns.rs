use async_trait::async_trait;
use aws_sdk_sns::Client as SnsClient;
use aws_sdk_sns::types::MessageAttributeValue;
use tokio::sync::OnceCell;
use tracing::info;

use super::Messenger;
use crate::core::messages::{CustomerMessage, MESSAGE_TYPE_ATTRIBUTE};
use crate::errors::CustomerError;

/// Publishes customer messages to an SNS topic for fan-out.
pub struct SnsMessenger {
    client: SnsClient,
    topic_name: String,
    topic_arn: OnceCell<String>,
}

impl SnsMessenger {
    pub fn new(client: SnsClient, topic_name: impl Into<String>) -> Self {
        Self {
            client,
            topic_name: topic_name.into(),
            topic_arn: OnceCell::new(),
        }
    }

    async fn topic_arn(&self) -> Result<&str, CustomerError> {
        let arn = self
            .topic_arn
            .get_or_try_init(|| self.find_topic())
            .await?;
        Ok(arn.as_str())
    }

    async fn find_topic(&self) -> Result<String, CustomerError> {
        let mut next_token: Option<String> = None;
        loop {
            let response = self
                .client
                .list_topics()
                .set_next_token(next_token)
                .send()
                .await?;

            let found = response
                .topics()
                .iter()
                .filter_map(|t| t.topic_arn())
                .find(|arn| topic_name_from_arn(arn) == Some(self.topic_name.as_str()));
            if let Some(arn) = found {
                return Ok(arn.to_string());
            }

            next_token = response.next_token().map(str::to_string);
            if next_token.is_none() {
                return Err(CustomerError::NotFound(format!("topic {}", self.topic_name)));
            }
        }
    }
}

/// `arn:aws:sns:us-east-1:123456789012:customers` -> `customers`
pub fn topic_name_from_arn(arn: &str) -> Option<&str> {
    let mut parts = arn.splitn(6, ':');
    if parts.next()? != "arn" {
        return None;
    }
    parts.nth(4).filter(|name| !name.is_empty())
}

#[async_trait]
impl Messenger for SnsMessenger {
    async fn publish(&self, message: &CustomerMessage) -> Result<String, CustomerError> {
        let topic_arn = self.topic_arn().await?;
        let message_type = message.message_type();
        let attribute = MessageAttributeValue::builder()
            .data_type("String")
            .string_value(message_type.as_str())
            .build()?;

        let response = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .message(message.to_body()?)
            .message_attributes(MESSAGE_TYPE_ATTRIBUTE, attribute)
            .send()
            .await?;

        let message_id = response.message_id().unwrap_or_default().to_string();
        info!(
            message_id = %message_id,
            message_type = %message_type,
            topic = %self.topic_name,
            "Published message to SNS"
        );
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_name_from_arn() {
        assert_eq!(
            topic_name_from_arn("arn:aws:sns:us-east-1:123456789012:customers"),
            Some("customers")
        );
        assert_eq!(topic_name_from_arn("arn:aws:sns:us-east-1:123456789012:"), None);
        assert_eq!(topic_name_from_arn("customers"), None);
    }
}
