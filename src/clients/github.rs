//! GitHub identity lookups used to validate customer usernames.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use tokio_retry::strategy::jitter;
use tokio_retry::{Retry, strategy::ExponentialBackoff};
use tracing::{debug, warn};

use crate::errors::CustomerError;
use crate::secrets::SecretsConfig;

/// Config key of the optional API token, as produced by the secrets provider.
pub const GITHUB_TOKEN_KEY: &str = "GitHub:ApiToken";

#[async_trait]
pub trait GitHubService: Send + Sync {
    async fn is_valid_github_user(&self, username: &str) -> Result<bool, CustomerError>;
}

pub struct GitHubClient {
    http: Client,
    base_url: String,
    secrets: Option<SecretsConfig>,
}

impl GitHubClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, CustomerError> {
        let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "local".to_string());
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(format!("Customers-{host}"))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            secrets: None,
        })
    }

    /// Sends `GitHub:ApiToken` from `secrets`, read per request so a rotated
    /// token is picked up without a restart.
    #[must_use]
    pub fn with_secrets(mut self, secrets: SecretsConfig) -> Self {
        self.secrets = Some(secrets);
        self
    }

    async fn with_retry<F, Fut, T>(&self, operation: F) -> Result<T, CustomerError>
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = Result<T, CustomerError>> + Send,
        T: Send,
    {
        let strategy = ExponentialBackoff::from_millis(100).map(jitter).take(3);

        Retry::spawn(strategy, operation).await
    }
}

#[async_trait]
impl GitHubService for GitHubClient {
    async fn is_valid_github_user(&self, username: &str) -> Result<bool, CustomerError> {
        let url = format!("{}/users/{username}", self.base_url);
        let token = self.secrets.as_ref().and_then(|s| s.get(GITHUB_TOKEN_KEY));

        let response = self
            .with_retry(|| async {
                let mut request = self.http.get(&url);
                if let Some(token) = &token {
                    request = request.bearer_auth(token);
                }
                Ok(request.send().await?)
            })
            .await?;

        let status = response.status();
        debug!(username, %status, "GitHub user lookup");
        if status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            warn!("GitHub API rejected the lookup: {}", body);
            return Err(CustomerError::HttpError(format!(
                "GitHub API returned 403: {body}"
            )));
        }
        Ok(status == StatusCode::OK)
    }
}
