//! In-memory hub (testing only)
//!
//! `StaticClient` serves canned metadata and files so enrichment and metrics
//! can be exercised without network access.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::client::PlatformClient;
use crate::error::HubError;
use crate::model::{DatasetInfo, ModelInfo, RepoKind};
use crate::Result;

/// Canned hub contents keyed by repository id.
#[derive(Debug, Default, Clone)]
pub struct StaticClient {
    models: HashMap<String, ModelInfo>,
    datasets: HashMap<String, DatasetInfo>,
    files: HashMap<(RepoKind, String, String), String>,
    unreachable: bool,
}

impl StaticClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A hub where every request fails at the transport level.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn with_model(mut self, info: ModelInfo) -> Self {
        self.models.insert(info.id.clone(), info);
        self
    }

    pub fn with_dataset(mut self, info: DatasetInfo) -> Self {
        self.datasets.insert(info.id.clone(), info);
        self
    }

    pub fn with_file(
        mut self,
        kind: RepoKind,
        repo_id: &str,
        filename: &str,
        content: impl Into<String>,
    ) -> Self {
        self.files.insert(
            (kind, repo_id.to_string(), filename.to_string()),
            content.into(),
        );
        self
    }

    /// Shorthand for a model `README.md`.
    pub fn with_readme(self, repo_id: &str, content: impl Into<String>) -> Self {
        self.with_file(RepoKind::Model, repo_id, "README.md", content)
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable {
            return Err(HubError::Http("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PlatformClient for StaticClient {
    async fn model_info(&self, repo_id: &str) -> Result<ModelInfo> {
        self.check_reachable()?;
        self.models
            .get(repo_id)
            .cloned()
            .ok_or_else(|| HubError::NotFound(repo_id.to_string()))
    }

    async fn dataset_info(&self, repo_id: &str) -> Result<DatasetInfo> {
        self.check_reachable()?;
        self.datasets
            .get(repo_id)
            .cloned()
            .ok_or_else(|| HubError::NotFound(repo_id.to_string()))
    }

    async fn fetch_file(
        &self,
        repo_id: &str,
        kind: RepoKind,
        filename: &str,
    ) -> Result<Option<String>> {
        self.check_reachable()?;
        Ok(self
            .files
            .get(&(kind, repo_id.to_string(), filename.to_string()))
            .cloned())
    }
}
