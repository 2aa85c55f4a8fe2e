//! Walks a secret through its lifecycle: create, rotate, inspect, delete.

use aws_config::BehaviorVersion;
use customers::secrets::{SecretStore, SecretVersion};
use tracing::info;

const DEFAULT_SECRET_NAME: &str = "NP_SECRET";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let name = std::env::var("SECRET_NAME").unwrap_or_else(|_| DEFAULT_SECRET_NAME.to_string());
    let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let store = SecretStore::new(aws_sdk_secretsmanager::Client::new(&aws));

    store
        .create(
            &name,
            r#"{"username":"admin","password":"supersecret"}"#,
            "Created by secrets-demo",
        )
        .await?;
    store
        .update(
            &name,
            r#"{"username":"admin","password":"newsupersecret"}"#,
            "Updated by secrets-demo",
        )
        .await?;

    let description = store.describe(&name).await?;
    info!(
        description = ?description.description,
        versions = ?description.versions,
        "Described secret"
    );

    let previous = store.get_value(&name, &SecretVersion::previous()).await?;
    let current = store.get_value(&name, &SecretVersion::current()).await?;
    info!(previous = ?previous, current = ?current, "Read previous and current values");

    for secret in store.list(10).await? {
        let stages: Vec<&String> = secret.versions.keys().collect();
        info!(secret = %secret.name, versions = ?stages, "Listed secret");
    }

    if let Some(version_id) = description.versions.keys().next() {
        let value = store
            .get_value(&name, &SecretVersion::Id(version_id.clone()))
            .await?;
        info!(version_id = %version_id, value = ?value, "Read secret by version id");
    }

    store.delete(&name).await?;
    Ok(())
}
