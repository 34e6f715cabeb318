//! Context enrichment: best-effort platform lookups before scoring.
//!
//! Every fetch is independent. A failure leaves its context field unset and
//! is logged; enrichment itself never fails an evaluation.

use std::sync::{Arc, OnceLock};

use hub_client::{PlatformClient, RepoKind};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::domain::{ArtifactReference, Category, EvaluationContext, Platform};

pub struct Enricher {
    client: Arc<dyn PlatformClient>,
}

impl Enricher {
    pub fn new(client: Arc<dyn PlatformClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> Arc<dyn PlatformClient> {
        Arc::clone(&self.client)
    }

    /// Populate metadata, documentation and config, then look for a linked
    /// code repository in the documentation.
    pub async fn enrich(&self, ctx: &mut EvaluationContext) {
        let artifact = ctx.artifact.clone();
        if artifact.platform == Platform::HuggingFace {
            if let Some(repo_id) = artifact.repo_id() {
                match artifact.category {
                    Category::Model => self.enrich_model(ctx, &repo_id).await,
                    _ => self.enrich_dataset(ctx, &repo_id).await,
                }
            }
        }

        if let Some(found) = ctx.documentation.as_deref().and_then(discover_code_repo) {
            let known = ctx
                .related_code_repos
                .iter()
                .any(|r| r.canonical_name.eq_ignore_ascii_case(&found.canonical_name));
            if !known {
                info!(
                    artifact = %artifact.canonical_name,
                    repo = %found.url,
                    "discovered linked code repository"
                );
                ctx.related_code_repos.push(found);
            }
        }
    }

    async fn enrich_model(&self, ctx: &mut EvaluationContext, repo_id: &str) {
        let (info, readme, config) = tokio::join!(
            self.client.model_info(repo_id),
            self.client.readme(repo_id, RepoKind::Model),
            self.client.model_config(repo_id),
        );

        match info {
            Ok(info) => ctx.platform_metadata = Some(info),
            Err(e) => warn!(repo_id, error = %e, "model info unavailable"),
        }
        match readme {
            Ok(Some(text)) => ctx.documentation = Some(text),
            Ok(None) => debug!(repo_id, "model has no README"),
            Err(e) => warn!(repo_id, error = %e, "README unavailable"),
        }
        match config {
            Ok(files) => ctx.config_data = files,
            Err(e) => warn!(repo_id, error = %e, "model config unavailable"),
        }
    }

    async fn enrich_dataset(&self, ctx: &mut EvaluationContext, repo_id: &str) {
        match self.client.readme(repo_id, RepoKind::Dataset).await {
            Ok(readme) => ctx.documentation = readme,
            Err(e) => warn!(repo_id, error = %e, "dataset card unavailable"),
        }
    }
}

fn github_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:https?://)?(?:www\.)?github\.com/([^/\s)\]>]+)/([^/\s)\]>#?]+)")
            .expect("github pattern must compile")
    })
}

/// First GitHub repository URL mentioned in `text`.
pub fn discover_code_repo(text: &str) -> Option<ArtifactReference> {
    let caps = github_pattern().captures(text)?;
    let owner = caps.get(1)?.as_str();
    let repo = caps
        .get(2)?
        .as_str()
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '\'' | '"' | '`'));
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some(ArtifactReference::github(owner, repo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_client::{ModelInfo, StaticClient};

    #[test]
    fn test_discover_strips_punctuation_and_git_suffix() {
        let found = discover_code_repo("Code: https://github.com/acme/tiny-model.git.").unwrap();
        assert_eq!(found.canonical_name, "acme/tiny-model");
        assert_eq!(found.url, "https://github.com/acme/tiny-model");

        let found = discover_code_repo("see [repo](github.com/acme/tiny), then").unwrap();
        assert_eq!(found.canonical_name, "acme/tiny");
    }

    #[test]
    fn test_discover_first_match_wins() {
        let text = "https://github.com/first/one and https://github.com/second/two";
        assert_eq!(discover_code_repo(text).unwrap().canonical_name, "first/one");
        assert!(discover_code_repo("no links").is_none());
    }

    #[tokio::test]
    async fn test_enrich_model() {
        let client = StaticClient::new()
            .with_model(ModelInfo {
                id: "acme/tiny".into(),
                downloads: 10,
                ..ModelInfo::default()
            })
            .with_readme("acme/tiny", "# Tiny\nCode at https://github.com/acme/tiny.")
            .with_file(RepoKind::Model, "acme/tiny", "config.json", "{\"hidden\": 8}");
        let enricher = Enricher::new(Arc::new(client));
        let mut ctx = EvaluationContext::new(ArtifactReference::huggingface_model("acme/tiny"));

        enricher.enrich(&mut ctx).await;

        assert_eq!(ctx.platform_metadata.as_ref().unwrap().downloads, 10);
        assert!(ctx.documentation.as_deref().unwrap().starts_with("# Tiny"));
        assert!(ctx.config_data.as_ref().unwrap().contains_key("config.json"));
        assert_eq!(ctx.related_code_repos.len(), 1);
        assert_eq!(ctx.related_code_repos[0].canonical_name, "acme/tiny");
    }

    #[tokio::test]
    async fn test_enrich_does_not_duplicate_known_repo() {
        let client = StaticClient::new().with_readme("acme/tiny", "https://github.com/ACME/tiny");
        let enricher = Enricher::new(Arc::new(client));
        let mut ctx = EvaluationContext::new(ArtifactReference::huggingface_model("acme/tiny"))
            .with_code_repos(vec![ArtifactReference::github("acme", "tiny")]);
        enricher.enrich(&mut ctx).await;
        assert_eq!(ctx.related_code_repos.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_platform_leaves_fields_unset() {
        let enricher = Enricher::new(Arc::new(StaticClient::unreachable()));
        let mut ctx = EvaluationContext::new(ArtifactReference::huggingface_model("acme/tiny"));
        enricher.enrich(&mut ctx).await;
        assert!(ctx.platform_metadata.is_none());
        assert!(ctx.documentation.is_none());
        assert!(ctx.config_data.is_none());
        assert!(ctx.related_code_repos.is_empty());
    }
}
