use std::collections::HashMap;

use aws_sdk_secretsmanager::Client as SecretsClient;
use aws_sdk_secretsmanager::primitives::DateTimeFormat;
use tracing::info;

use crate::errors::CustomerError;

pub const CURRENT_STAGE: &str = "AWSCURRENT";
pub const PREVIOUS_STAGE: &str = "AWSPREVIOUS";

/// Which version of a secret to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretVersion {
    Stage(String),
    Id(String),
}

impl SecretVersion {
    pub fn current() -> Self {
        SecretVersion::Stage(CURRENT_STAGE.to_string())
    }

    pub fn previous() -> Self {
        SecretVersion::Stage(PREVIOUS_STAGE.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SecretDescription {
    pub name: String,
    pub arn: Option<String>,
    pub description: Option<String>,
    /// Version id -> staging labels.
    pub versions: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct SecretSummary {
    pub name: String,
    pub versions: HashMap<String, Vec<String>>,
}

/// Thin wrapper over the Secrets Manager operations the service uses.
#[derive(Clone)]
pub struct SecretStore {
    client: SecretsClient,
}

impl SecretStore {
    pub fn new(client: SecretsClient) -> Self {
        Self { client }
    }

    /// Returns the ARN of the new secret.
    pub async fn create(
        &self,
        name: &str,
        value: &str,
        description: &str,
    ) -> Result<String, CustomerError> {
        let response = self
            .client
            .create_secret()
            .name(name)
            .secret_string(value)
            .description(description)
            .send()
            .await?;
        let arn = response.arn().unwrap_or_default().to_string();
        info!(secret = name, arn = %arn, "Secret created");
        Ok(arn)
    }

    /// Stores a new value; the previous one moves to `AWSPREVIOUS`.
    pub async fn update(
        &self,
        name: &str,
        value: &str,
        description: &str,
    ) -> Result<String, CustomerError> {
        let response = self
            .client
            .update_secret()
            .secret_id(name)
            .secret_string(value)
            .description(description)
            .send()
            .await?;
        let arn = response.arn().unwrap_or_default().to_string();
        info!(secret = name, arn = %arn, "Secret updated");
        Ok(arn)
    }

    pub async fn describe(&self, name: &str) -> Result<SecretDescription, CustomerError> {
        let response = self.client.describe_secret().secret_id(name).send().await?;
        Ok(SecretDescription {
            name: response.name().unwrap_or(name).to_string(),
            arn: response.arn().map(str::to_string),
            description: response.description().map(str::to_string),
            versions: response.version_ids_to_stages().cloned().unwrap_or_default(),
        })
    }

    /// Returns `None` when the secret has no string value.
    pub async fn get_value(
        &self,
        name: &str,
        version: &SecretVersion,
    ) -> Result<Option<String>, CustomerError> {
        let request = self.client.get_secret_value().secret_id(name);
        let request = match version {
            SecretVersion::Stage(stage) => request.version_stage(stage),
            SecretVersion::Id(id) => request.version_id(id),
        };
        let response = request.send().await?;
        Ok(response.secret_string().map(str::to_string))
    }

    /// Lists at most `max_results` secrets.
    pub async fn list(&self, max_results: i32) -> Result<Vec<SecretSummary>, CustomerError> {
        let response = self
            .client
            .list_secrets()
            .max_results(max_results)
            .send()
            .await?;
        Ok(response.secret_list().iter().map(summary).collect())
    }

    /// Lists every secret whose name starts with `prefix`, following pagination.
    pub async fn list_with_prefix(&self, prefix: &str) -> Result<Vec<SecretSummary>, CustomerError> {
        let mut secrets = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let response = self
                .client
                .list_secrets()
                .set_next_token(next_token)
                .send()
                .await?;
            secrets.extend(
                response
                    .secret_list()
                    .iter()
                    .map(summary)
                    .filter(|s| s.name.starts_with(prefix)),
            );
            next_token = response.next_token().map(str::to_string);
            if next_token.is_none() {
                return Ok(secrets);
            }
        }
    }

    /// Deletes immediately, without a recovery window. Returns the deletion date.
    pub async fn delete(&self, name: &str) -> Result<Option<String>, CustomerError> {
        let response = self
            .client
            .delete_secret()
            .secret_id(name)
            .force_delete_without_recovery(true)
            .send()
            .await?;
        let deleted_at = response
            .deletion_date()
            .and_then(|d| d.fmt(DateTimeFormat::DateTime).ok());
        info!(secret = name, deleted_at = ?deleted_at, "Secret deleted");
        Ok(deleted_at)
    }
}

fn summary(entry: &aws_sdk_secretsmanager::types::SecretListEntry) -> SecretSummary {
    SecretSummary {
        name: entry.name().unwrap_or_default().to_string(),
        versions: entry.secret_versions_to_stages().cloned().unwrap_or_default(),
    }
}
