//! HuggingFace Hub client
//!
//! Talks to the public REST API (`/api/models`, `/api/datasets`) and the
//! `resolve/main` raw-file endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::PlatformClient;
use crate::error::HubError;
use crate::model::{DatasetInfo, DatasetInfoWire, ModelInfo, ModelInfoWire, RepoKind};
use crate::Result;

/// Hub client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Hub base URL
    pub base_url: String,
    /// Access token (optional for public repositories)
    pub token: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        HubConfig {
            base_url: std::env::var("HF_ENDPOINT")
                .unwrap_or_else(|_| "https://huggingface.co".to_string()),
            token: std::env::var("HF_TOKEN").ok().filter(|t| !t.is_empty()),
            timeout_secs: 30,
        }
    }
}

impl HubConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific hub endpoint
    pub fn new(base_url: &str) -> Self {
        HubConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            timeout_secs: 30,
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}

/// HuggingFace Hub client
pub struct HuggingFaceClient {
    config: HubConfig,
    http_client: reqwest::Client,
}

impl HuggingFaceClient {
    /// Create a new hub client
    pub fn new(config: HubConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("trustgate-hub-client/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HubError::InvalidConfig(e.to_string()))?;

        Ok(HuggingFaceClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(HubConfig::from_env())
    }

    fn api_url(&self, kind: RepoKind, repo_id: &str) -> String {
        let segment = match kind {
            RepoKind::Model => "models",
            RepoKind::Dataset => "datasets",
        };
        format!("{}/api/{}/{}", self.config.base_url, segment, repo_id)
    }

    fn file_url(&self, kind: RepoKind, repo_id: &str, filename: &str) -> String {
        match kind {
            RepoKind::Model => format!(
                "{}/{}/resolve/main/{}",
                self.config.base_url, repo_id, filename
            ),
            RepoKind::Dataset => format!(
                "{}/datasets/{}/resolve/main/{}",
                self.config.base_url, repo_id, filename
            ),
        }
    }

    async fn get(&self, url: &str) -> Result<Option<reqwest::Response>> {
        let mut request = self.http_client.get(url);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(url, "hub returned 404");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(HubError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(Some(response))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .get(url)
            .await?
            .ok_or_else(|| HubError::NotFound(url.to_string()))?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl PlatformClient for HuggingFaceClient {
    async fn model_info(&self, repo_id: &str) -> Result<ModelInfo> {
        let wire: ModelInfoWire = self.get_json(&self.api_url(RepoKind::Model, repo_id)).await?;
        Ok(wire.into())
    }

    async fn dataset_info(&self, repo_id: &str) -> Result<DatasetInfo> {
        let wire: DatasetInfoWire = self
            .get_json(&self.api_url(RepoKind::Dataset, repo_id))
            .await?;
        Ok(wire.into())
    }

    async fn fetch_file(
        &self,
        repo_id: &str,
        kind: RepoKind,
        filename: &str,
    ) -> Result<Option<String>> {
        let url = self.file_url(kind, repo_id, filename);
        match self.get(&url).await? {
            Some(response) => Ok(Some(response.text().await?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_for_models_and_datasets() {
        let client = HuggingFaceClient::new(HubConfig::new("https://hub.example/")).unwrap();
        assert_eq!(
            client.api_url(RepoKind::Model, "google/gemma-2b"),
            "https://hub.example/api/models/google/gemma-2b"
        );
        assert_eq!(
            client.api_url(RepoKind::Dataset, "squad"),
            "https://hub.example/api/datasets/squad"
        );
        assert_eq!(
            client.file_url(RepoKind::Dataset, "rajpurkar/squad", "README.md"),
            "https://hub.example/datasets/rajpurkar/squad/resolve/main/README.md"
        );
    }

    #[test]
    fn test_config_with_token() {
        let config = HubConfig::new("https://hub.example").with_token("hf_abc");
        assert_eq!(config.token.as_deref(), Some("hf_abc"));
        assert_eq!(config.timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_unreachable_hub_is_an_error() {
        let mut config = HubConfig::new("http://127.0.0.1:9");
        config.timeout_secs = 2;
        let client = HuggingFaceClient::new(config).unwrap();
        let err = client.model_info("nobody/nothing").await.unwrap_err();
        assert!(matches!(err, HubError::Http(_)), "got {err:?}");
    }
}
