pub mod provider;
pub mod store;

pub use provider::SecretsConfig;
pub use store::{SecretDescription, SecretStore, SecretSummary, SecretVersion};
