use serde::Serialize;
use thiserror::Error;

/// A single field-level validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub property: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CustomerError {
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        failures: Vec<ValidationFailure>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conditional write rejected: {0}")]
    Conflict(String),

    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    #[error("Failed to serialize or deserialize payload: {0}")]
    Serialization(String),

    #[error("Failed to interact with AWS services: {0}")]
    AwsError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Message handler failed: {0}")]
    HandlerError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl CustomerError {
    /// Builds a validation error carrying a single failure for `property`.
    pub fn validation(property: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        CustomerError::Validation {
            failures: vec![ValidationFailure::new(property, message.clone())],
            message,
        }
    }
}

impl From<reqwest::Error> for CustomerError {
    fn from(error: reqwest::Error) -> Self {
        CustomerError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for CustomerError {
    fn from(error: serde_json::Error) -> Self {
        CustomerError::Serialization(error.to_string())
    }
}

impl From<anyhow::Error> for CustomerError {
    fn from(error: anyhow::Error) -> Self {
        CustomerError::HandlerError(error.to_string())
    }
}

// Every AWS SDK crate re-exports the same smithy `SdkError`, so one impl
// covers SQS, SNS, DynamoDB, S3 and Secrets Manager.
impl<E, R> From<aws_sdk_sqs::error::SdkError<E, R>> for CustomerError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    fn from(error: aws_sdk_sqs::error::SdkError<E, R>) -> Self {
        CustomerError::AwsError(aws_sdk_sqs::error::DisplayErrorContext(&error).to_string())
    }
}

impl From<aws_sdk_sqs::error::BuildError> for CustomerError {
    fn from(error: aws_sdk_sqs::error::BuildError) -> Self {
        CustomerError::AwsError(format!("request build failed: {error}"))
    }
}
