//! The metadata client contract consumed by context enrichment and metrics.

use async_trait::async_trait;
use tracing::debug;

use crate::error::HubError;
use crate::model::{ConfigFiles, DatasetInfo, ModelInfo, RepoKind};
use crate::Result;

/// README file names tried in order.
pub const README_CANDIDATES: [&str; 4] = ["README.md", "readme.md", "README.txt", "readme.txt"];

/// Structured configuration files collected for a model.
pub const CONFIG_FILES: [&str; 3] = ["config.json", "model_index.json", "tokenizer.json"];

/// Read access to a model hub. Every call may fail independently.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Fetch model metadata for `repo_id` (`owner/name` or bare `name`).
    async fn model_info(&self, repo_id: &str) -> Result<ModelInfo>;

    /// Fetch dataset metadata for `repo_id`.
    async fn dataset_info(&self, repo_id: &str) -> Result<DatasetInfo>;

    /// Fetch a raw text file from the repository head.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    async fn fetch_file(&self, repo_id: &str, kind: RepoKind, filename: &str)
        -> Result<Option<String>>;

    /// First README found among [`README_CANDIDATES`].
    async fn readme(&self, repo_id: &str, kind: RepoKind) -> Result<Option<String>> {
        for candidate in README_CANDIDATES {
            match self.fetch_file(repo_id, kind, candidate).await {
                Ok(Some(content)) if !content.trim().is_empty() => return Ok(Some(content)),
                Ok(_) | Err(HubError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Parsed [`CONFIG_FILES`] keyed by file name; `None` when none parse.
    async fn model_config(&self, repo_id: &str) -> Result<Option<ConfigFiles>> {
        let mut files = ConfigFiles::new();
        for name in CONFIG_FILES {
            let content = match self.fetch_file(repo_id, RepoKind::Model, name).await {
                Ok(Some(content)) => content,
                Ok(None) | Err(HubError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            match serde_json::from_str(&content) {
                Ok(value) => {
                    files.insert(name.to_string(), value);
                }
                Err(e) => debug!(repo_id, file = name, error = %e, "config file is not JSON"),
            }
        }
        Ok(if files.is_empty() { None } else { Some(files) })
    }
}
