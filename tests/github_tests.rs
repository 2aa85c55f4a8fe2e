use std::collections::HashMap;

use customers::clients::github::GITHUB_TOKEN_KEY;
use customers::clients::{GitHubClient, GitHubService};
use customers::errors::CustomerError;
use customers::secrets::SecretsConfig;
use httpmock::prelude::*;

#[tokio::test]
async fn test_existing_user_is_valid() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/users/octocat")
                .header("accept", "application/vnd.github.v3+json")
                .header_exists("user-agent");
            then.status(200)
                .json_body(serde_json::json!({ "login": "octocat" }));
        })
        .await;

    let client = GitHubClient::new(&server.base_url()).unwrap();
    assert!(client.is_valid_github_user("octocat").await.unwrap());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_user_is_invalid() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/ghost");
            then.status(404);
        })
        .await;

    let client = GitHubClient::new(&server.base_url()).unwrap();
    assert!(!client.is_valid_github_user("ghost").await.unwrap());
}

#[tokio::test]
async fn test_rate_limit_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/octocat");
            then.status(403).body("API rate limit exceeded");
        })
        .await;

    let client = GitHubClient::new(&server.base_url()).unwrap();
    match client.is_valid_github_user("octocat").await {
        Err(CustomerError::HttpError(message)) => {
            assert!(message.contains("rate limit"));
        }
        other => panic!("expected HttpError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_token_from_secrets_is_sent() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/users/octocat")
                .header("authorization", "Bearer ghp_test");
            then.status(200);
        })
        .await;

    let secrets = SecretsConfig::from_map(HashMap::from([(
        GITHUB_TOKEN_KEY.to_string(),
        "ghp_test".to_string(),
    )]));
    let client = GitHubClient::new(&format!("{}/", server.base_url()))
        .unwrap()
        .with_secrets(secrets);

    assert!(client.is_valid_github_user("octocat").await.unwrap());
    mock.assert_async().await;
}
