//! Contract tests for the default `PlatformClient` methods, driven through
//! the in-memory hub.

use hub_client::fakes::StaticClient;
use hub_client::{HubError, ModelInfo, PlatformClient, RepoKind};

#[tokio::test]
async fn test_readme_falls_back_through_candidates() {
    let client = StaticClient::new().with_file(
        RepoKind::Model,
        "acme/tiny",
        "readme.md",
        "# tiny\nlowercase readme",
    );

    let readme = client.readme("acme/tiny", RepoKind::Model).await.unwrap();
    assert_eq!(readme.as_deref(), Some("# tiny\nlowercase readme"));
}

#[tokio::test]
async fn test_readme_absent_is_none() {
    let client = StaticClient::new();
    let readme = client.readme("acme/none", RepoKind::Model).await.unwrap();
    assert!(readme.is_none());
}

#[tokio::test]
async fn test_dataset_readme_is_namespaced() {
    let client = StaticClient::new().with_file(
        RepoKind::Dataset,
        "acme/corpus",
        "README.md",
        "dataset card",
    );

    assert!(client
        .readme("acme/corpus", RepoKind::Model)
        .await
        .unwrap()
        .is_none());
    assert!(client
        .readme("acme/corpus", RepoKind::Dataset)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_model_config_skips_unparseable_files() {
    let client = StaticClient::new()
        .with_file(RepoKind::Model, "acme/tiny", "config.json", r#"{"hidden_size": 64}"#)
        .with_file(RepoKind::Model, "acme/tiny", "tokenizer.json", "not json at all");

    let config = client.model_config("acme/tiny").await.unwrap().unwrap();
    assert_eq!(config.len(), 1);
    assert_eq!(config["config.json"]["hidden_size"], 64);
}

#[tokio::test]
async fn test_model_config_none_when_nothing_parses() {
    let client = StaticClient::new();
    assert!(client.model_config("acme/tiny").await.unwrap().is_none());
}

#[tokio::test]
async fn test_unreachable_hub_propagates_transport_errors() {
    let client = StaticClient::unreachable();
    assert!(matches!(
        client.readme("acme/tiny", RepoKind::Model).await,
        Err(HubError::Http(_))
    ));
    assert!(matches!(
        client.model_config("acme/tiny").await,
        Err(HubError::Http(_))
    ));
}

#[tokio::test]
async fn test_model_info_lookup() {
    let client = StaticClient::new().with_model(ModelInfo {
        id: "acme/tiny".to_string(),
        downloads: 5,
        ..ModelInfo::default()
    });

    assert_eq!(client.model_info("acme/tiny").await.unwrap().downloads, 5);
    assert!(matches!(
        client.model_info("acme/other").await,
        Err(HubError::NotFound(_))
    ));
}
