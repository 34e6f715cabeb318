//! Per-evaluation scratch state populated by enrichment and read by metrics.

use hub_client::{ConfigFiles, ModelInfo};
use serde::{Deserialize, Serialize};

use super::artifact::ArtifactReference;

/// Everything the metrics know about one artifact.
///
/// Populated once by enrichment, then shared read-only (behind an `Arc`)
/// with every metric task of the same evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationContext {
    pub artifact: ArtifactReference,
    pub related_datasets: Vec<ArtifactReference>,
    pub related_code_repos: Vec<ArtifactReference>,
    pub platform_metadata: Option<ModelInfo>,
    pub documentation: Option<String>,
    pub config_data: Option<ConfigFiles>,
}

impl EvaluationContext {
    pub fn new(artifact: ArtifactReference) -> Self {
        Self {
            artifact,
            related_datasets: Vec::new(),
            related_code_repos: Vec::new(),
            platform_metadata: None,
            documentation: None,
            config_data: None,
        }
    }

    pub fn with_datasets(mut self, datasets: Vec<ArtifactReference>) -> Self {
        self.related_datasets = datasets;
        self
    }

    pub fn with_code_repos(mut self, repos: Vec<ArtifactReference>) -> Self {
        self.related_code_repos = repos;
        self
    }

    pub fn with_documentation(mut self, text: impl Into<String>) -> Self {
        self.documentation = Some(text.into());
        self
    }

    pub fn with_platform_metadata(mut self, info: ModelInfo) -> Self {
        self.platform_metadata = Some(info);
        self
    }

    /// The code repository analysed by git-backed metrics (first linked).
    pub fn linked_code_repo(&self) -> Option<&ArtifactReference> {
        self.related_code_repos.first()
    }

    /// Identifier used in logs and auto-fixes (`owner/repo` when known).
    pub fn artifact_id(&self) -> String {
        self.artifact
            .repo_id()
            .unwrap_or_else(|| self.artifact.canonical_name.clone())
    }

    /// Documentation text, lowercased, or `None` when absent or blank.
    pub fn documentation_lower(&self) -> Option<String> {
        self.documentation
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(str::to_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linked_code_repo_is_first() {
        let ctx = EvaluationContext::new(ArtifactReference::huggingface_model("acme/tiny"))
            .with_code_repos(vec![
                ArtifactReference::github("acme", "tiny"),
                ArtifactReference::github("acme", "other"),
            ]);
        assert_eq!(ctx.linked_code_repo().unwrap().canonical_name, "acme/tiny");
        assert_eq!(ctx.artifact_id(), "acme/tiny");
    }

    #[test]
    fn test_blank_documentation_counts_as_absent() {
        let ctx = EvaluationContext::new(ArtifactReference::huggingface_model("acme/tiny"))
            .with_documentation("   \n");
        assert!(ctx.documentation_lower().is_none());
    }
}
