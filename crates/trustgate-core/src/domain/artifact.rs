//! Artifact references: parsing user-supplied URLs and linking related
//! datasets and code repositories to the models that follow them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use url::Url;

use super::context::EvaluationContext;
use super::error::{Result, TrustgateError};

/// What kind of artifact a URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Model,
    Dataset,
    Code,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Model => write!(f, "MODEL"),
            Category::Dataset => write!(f, "DATASET"),
            Category::Code => write!(f, "CODE"),
        }
    }
}

/// Hosting platform of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    HuggingFace,
    GitHub,
    Unknown,
}

/// Identifies the thing being scored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactReference {
    pub url: String,
    pub category: Category,
    /// `repo` for models, `owner/repo` for datasets and code.
    pub canonical_name: String,
    pub platform: Platform,
    pub owner: Option<String>,
    pub repo: Option<String>,
}

impl ArtifactReference {
    /// Hub repository id (`owner/repo`, or bare `repo`).
    pub fn repo_id(&self) -> Option<String> {
        let repo = self.repo.as_deref()?;
        Some(match self.owner.as_deref() {
            Some(owner) => format!("{owner}/{repo}"),
            None => repo.to_string(),
        })
    }

    /// A code repository on GitHub.
    pub fn github(owner: &str, repo: &str) -> Self {
        Self {
            url: format!("https://github.com/{owner}/{repo}"),
            category: Category::Code,
            canonical_name: format!("{owner}/{repo}"),
            platform: Platform::GitHub,
            owner: Some(owner.to_string()),
            repo: Some(repo.to_string()),
        }
    }

    /// A HuggingFace model (`owner/name` or bare `name`).
    pub fn huggingface_model(repo_id: &str) -> Self {
        let (owner, repo) = match repo_id.split_once('/') {
            Some((owner, repo)) => (Some(owner.to_string()), repo.to_string()),
            None => (None, repo_id.to_string()),
        };
        Self {
            url: format!("https://huggingface.co/{repo_id}"),
            category: Category::Model,
            canonical_name: repo.clone(),
            platform: Platform::HuggingFace,
            owner,
            repo: Some(repo),
        }
    }
}

/// Parse and categorize a user-supplied artifact URL.
///
/// HuggingFace `/datasets/owner/repo` is a dataset, any other HuggingFace
/// path a model, GitHub `owner/repo` is code, and anything else is treated
/// as a dataset on an unknown platform.
pub fn parse_url(raw: &str) -> Result<ArtifactReference> {
    let raw = raw.trim();
    let parsed = Url::parse(raw)
        .or_else(|_| Url::parse(&format!("https://{raw}")))
        .map_err(|e| TrustgateError::InvalidUrl(format!("{raw}: {e}")))?;

    let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    if host.ends_with("huggingface.co") {
        parse_huggingface(raw, &segments)
    } else if host.ends_with("github.com") {
        parse_github(raw, &segments)
    } else {
        let last = raw.trim_end_matches('/').rsplit('/').next().unwrap_or(raw);
        Ok(ArtifactReference {
            url: raw.to_string(),
            category: Category::Dataset,
            canonical_name: if last.is_empty() { raw } else { last }.to_string(),
            platform: Platform::Unknown,
            owner: None,
            repo: None,
        })
    }
}

fn parse_huggingface(raw: &str, segments: &[&str]) -> Result<ArtifactReference> {
    if segments.is_empty() {
        return Err(TrustgateError::InvalidUrl(format!(
            "{raw}: HuggingFace URL has no repository path"
        )));
    }

    let (category, owner, repo) = if segments.len() >= 2 && segments[0] == "datasets" {
        match segments.get(2) {
            Some(repo) => (Category::Dataset, Some(segments[1]), Some(*repo)),
            None => (Category::Dataset, None, Some(segments[1])),
        }
    } else {
        match segments.get(1) {
            Some(repo) => (Category::Model, Some(segments[0]), Some(*repo)),
            None => (Category::Model, None, Some(segments[0])),
        }
    };

    let canonical_name = match (category, owner, repo) {
        (Category::Dataset, Some(owner), Some(repo)) => format!("{owner}/{repo}"),
        (_, _, Some(repo)) => repo.to_string(),
        _ => raw.rsplit('/').next().unwrap_or(raw).to_string(),
    };

    Ok(ArtifactReference {
        url: raw.to_string(),
        category,
        canonical_name,
        platform: Platform::HuggingFace,
        owner: owner.map(str::to_string),
        repo: repo.map(str::to_string),
    })
}

fn parse_github(raw: &str, segments: &[&str]) -> Result<ArtifactReference> {
    if segments.len() < 2 {
        return Err(TrustgateError::InvalidUrl(format!(
            "{raw}: GitHub URL needs owner/repo"
        )));
    }
    let owner = segments[0];
    let repo = segments[1].trim_end_matches(".git");

    Ok(ArtifactReference {
        url: raw.to_string(),
        category: Category::Code,
        canonical_name: format!("{owner}/{repo}"),
        platform: Platform::GitHub,
        owner: Some(owner.to_string()),
        repo: Some(repo.to_string()),
    })
}

/// Build one evaluation context per model URL.
///
/// Datasets and code repositories are expected to appear before the models
/// they belong to. Each model is linked to the pending resources sharing a
/// name token or owner with it; failing that, to the most recent two.
/// Pending resources stay available to later models.
pub fn build_contexts<S: AsRef<str>>(urls: &[S]) -> Result<Vec<EvaluationContext>> {
    let mut contexts = Vec::new();
    let mut pending_datasets: Vec<ArtifactReference> = Vec::new();
    let mut pending_code: Vec<ArtifactReference> = Vec::new();

    for raw in urls {
        let reference = parse_url(raw.as_ref())?;
        match reference.category {
            Category::Dataset => pending_datasets.push(reference),
            Category::Code => pending_code.push(reference),
            Category::Model => {
                let datasets = relevant_resources(&reference, &pending_datasets);
                let code = relevant_resources(&reference, &pending_code);
                contexts.push(
                    EvaluationContext::new(reference)
                        .with_datasets(datasets)
                        .with_code_repos(code),
                );
            }
        }
    }

    Ok(contexts)
}

fn relevant_resources(
    model: &ArtifactReference,
    resources: &[ArtifactReference],
) -> Vec<ArtifactReference> {
    if resources.is_empty() {
        return Vec::new();
    }

    let model_parts = name_parts(&model.canonical_name);
    let relevant: Vec<ArtifactReference> = resources
        .iter()
        .filter(|r| {
            let shares_token = name_parts(&r.canonical_name)
                .intersection(&model_parts)
                .next()
                .is_some();
            let same_owner = model.owner.is_some() && model.owner == r.owner;
            shares_token || same_owner
        })
        .cloned()
        .collect();

    if relevant.is_empty() {
        let start = resources.len().saturating_sub(2);
        return resources[start..].to_vec();
    }
    relevant
}

/// Lowercased alphabetic name tokens longer than two characters.
fn name_parts(name: &str) -> HashSet<String> {
    name.to_lowercase()
        .split(|c: char| matches!(c, '/' | '_' | '-' | '.') || c.is_whitespace())
        .filter(|p| p.len() > 2 && p.chars().all(|c| c.is_ascii_alphabetic()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_huggingface_model() {
        let r = parse_url("https://huggingface.co/google/gemma-3-270m").unwrap();
        assert_eq!(r.category, Category::Model);
        assert_eq!(r.platform, Platform::HuggingFace);
        assert_eq!(r.canonical_name, "gemma-3-270m");
        assert_eq!(r.repo_id().as_deref(), Some("google/gemma-3-270m"));
    }

    #[test]
    fn test_parse_huggingface_model_with_tree_suffix() {
        let r = parse_url("https://huggingface.co/openai/whisper-tiny/tree/main").unwrap();
        assert_eq!(r.repo_id().as_deref(), Some("openai/whisper-tiny"));
    }

    #[test]
    fn test_parse_single_segment_model() {
        let r = parse_url("https://huggingface.co/gpt2").unwrap();
        assert_eq!(r.category, Category::Model);
        assert_eq!(r.owner, None);
        assert_eq!(r.repo_id().as_deref(), Some("gpt2"));
    }

    #[test]
    fn test_parse_huggingface_dataset() {
        let r = parse_url("https://huggingface.co/datasets/xlangai/AgentNet").unwrap();
        assert_eq!(r.category, Category::Dataset);
        assert_eq!(r.canonical_name, "xlangai/AgentNet");
    }

    #[test]
    fn test_parse_github_strips_dot_git() {
        let r = parse_url("https://github.com/SkyworkAI/Matrix-Game.git").unwrap();
        assert_eq!(r.category, Category::Code);
        assert_eq!(r.canonical_name, "SkyworkAI/Matrix-Game");
        assert_eq!(r.repo.as_deref(), Some("Matrix-Game"));
    }

    #[test]
    fn test_parse_rejects_incomplete_urls() {
        assert!(matches!(
            parse_url("https://github.com/only-owner"),
            Err(TrustgateError::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_url("https://huggingface.co/"),
            Err(TrustgateError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_unknown_platform_defaults_to_dataset() {
        let r = parse_url("https://example.org/data/corpus-v2").unwrap();
        assert_eq!(r.category, Category::Dataset);
        assert_eq!(r.platform, Platform::Unknown);
        assert_eq!(r.canonical_name, "corpus-v2");
    }

    #[test]
    fn test_scheme_less_url_is_accepted() {
        let r = parse_url("huggingface.co/google/bert-base-uncased").unwrap();
        assert_eq!(r.canonical_name, "bert-base-uncased");
    }

    #[test]
    fn test_name_parts_filters_short_and_numeric_tokens() {
        let parts = name_parts("sentiment-analysis-model-v2");
        assert!(parts.contains("sentiment"));
        assert!(parts.contains("analysis"));
        assert!(parts.contains("model"));
        assert!(!parts.contains("v2"));
    }

    #[test]
    fn test_build_contexts_links_preceding_resources() {
        let urls = [
            "https://github.com/google-research/bert",
            "https://huggingface.co/datasets/bookcorpus/bookcorpus",
            "https://huggingface.co/google-bert/bert-base-uncased",
        ];
        let contexts = build_contexts(&urls).unwrap();
        assert_eq!(contexts.len(), 1);
        let ctx = &contexts[0];
        assert_eq!(ctx.related_code_repos.len(), 1);
        assert_eq!(ctx.related_code_repos[0].canonical_name, "google-research/bert");
        // No shared token with the dataset: falls back to the most recent ones.
        assert_eq!(ctx.related_datasets.len(), 1);
    }

    #[test]
    fn test_build_contexts_keeps_pending_for_later_models() {
        let urls = [
            "https://huggingface.co/datasets/acme/speech-corpus",
            "https://huggingface.co/acme/speech-small",
            "https://huggingface.co/acme/speech-large",
        ];
        let contexts = build_contexts(&urls).unwrap();
        assert_eq!(contexts.len(), 2);
        assert!(contexts.iter().all(|c| c.related_datasets.len() == 1));
    }
}
