//! Exposes Secrets Manager entries as flat configuration keys.
//!
//! A secret named `{env}_{app}_GitHub__ApiToken` becomes the key
//! `GitHub:ApiToken`. Secrets holding a JSON object are flattened one level,
//! so `{env}_{app}_Database` with `{"Password":"x"}` yields `Database:Password`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::store::{SecretStore, SecretVersion};
use crate::errors::CustomerError;

/// Shortest interval between reloads; smaller settings are raised to it.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Cheaply cloneable view of the current secret values.
#[derive(Clone, Default)]
pub struct SecretsConfig {
    values: Arc<ArcSwap<HashMap<String, String>>>,
}

impl SecretsConfig {
    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self {
            values: Arc::new(ArcSwap::from_pointee(values)),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.load().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.values.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.load().is_empty()
    }

    fn replace(&self, values: HashMap<String, String>) {
        self.values.store(Arc::new(values));
    }

    /// Loads every secret starting with `{prefix}_`.
    pub async fn load(store: &SecretStore, prefix: &str) -> Result<Self, CustomerError> {
        let config = Self::default();
        config.replace(fetch(store, prefix).await?);
        Ok(config)
    }

    /// Reloads the values every `interval` until `cancel` fires. A failed
    /// reload keeps the previous values.
    pub fn spawn_refresh(
        &self,
        store: SecretStore,
        prefix: String,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let config = self.clone();
        let interval = interval.max(MIN_REFRESH_INTERVAL);
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                match fetch(&store, &prefix).await {
                    Ok(values) => {
                        debug!(count = values.len(), "Refreshed secrets");
                        config.replace(values);
                    }
                    Err(e) => error!("Failed to refresh secrets: {}", e),
                }
            }
            info!("Secrets refresh stopped");
        })
    }
}

impl std::fmt::Debug for SecretsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Values are secret; keys are enough for diagnostics.
        let values = self.values.load();
        let mut keys: Vec<&String> = values.keys().collect();
        keys.sort();
        f.debug_struct("SecretsConfig").field("keys", &keys).finish()
    }
}

async fn fetch(store: &SecretStore, prefix: &str) -> Result<HashMap<String, String>, CustomerError> {
    let name_prefix = format!("{prefix}_");
    let mut values = HashMap::new();
    for secret in store.list_with_prefix(&name_prefix).await? {
        let Some(key) = config_key(&secret.name, prefix) else {
            continue;
        };
        if let Some(value) = store
            .get_value(&secret.name, &SecretVersion::current())
            .await?
        {
            values.extend(flatten(&key, &value));
        }
    }
    Ok(values)
}

/// Maps a secret name to its configuration key, or `None` when the name does
/// not belong to this environment and application.
pub fn config_key(secret_name: &str, prefix: &str) -> Option<String> {
    let rest = secret_name.strip_prefix(prefix)?.strip_prefix('_')?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.replace("__", ":"))
}

/// Expands a JSON object value into `key:field` entries; any other value is
/// stored under `key` unchanged.
pub fn flatten(key: &str, value: &str) -> Vec<(String, String)> {
    match serde_json::from_str::<serde_json::Value>(value) {
        Ok(serde_json::Value::Object(fields)) => fields
            .into_iter()
            .map(|(field, v)| {
                let v = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (format!("{key}:{field}"), v)
            })
            .collect(),
        _ => vec![(key.to_string(), value.to_string())],
    }
}
