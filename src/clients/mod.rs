//! Client modules for external API interactions

pub mod github;

pub use github::{GitHubClient, GitHubService};
