//! Documentation quality of the datasets a model was trained on.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use hub_client::{PlatformClient, RepoKind};
use tracing::debug;

use super::contains_any;
use crate::config::ScoringConfig;
use crate::domain::{EvaluationContext, MetricName, MetricOutcome, Platform};
use crate::metric::Metric;

const SIZE_HINTS: &[&str] = &[
    "size",
    "samples",
    "examples",
    "instances",
    "records",
    "entries",
    "rows",
    "datapoints",
    "mb",
    "gb",
    "kb",
    "million",
    "thousand",
];
const BENCHMARK_HINTS: &[&str] = &[
    "benchmark",
    "evaluation",
    "baseline",
    "performance",
    "accuracy",
    "f1",
    "bleu",
    "rouge",
    "glue",
    "squad",
    "results",
];

/// Quarter credit each for a description, size information, a license and
/// benchmark references.
pub fn checklist_score(readme: &str, tags: &[String]) -> f64 {
    let lower = readme.to_lowercase();
    let mut score = 0.0;
    if contains_any(&lower, &["description", "overview", "dataset"]) || readme.len() > 300 {
        score += 0.25;
    }
    if contains_any(&lower, SIZE_HINTS) {
        score += 0.25;
    }
    if lower.contains("license") || tags.iter().any(|t| t.starts_with("license:")) {
        score += 0.25;
    }
    if contains_any(&lower, BENCHMARK_HINTS) {
        score += 0.25;
    }
    score
}

pub struct DatasetQualityMetric {
    client: Arc<dyn PlatformClient>,
}

impl DatasetQualityMetric {
    pub fn new(client: Arc<dyn PlatformClient>) -> Self {
        Self { client }
    }

    /// `None` when the dataset card could not be fetched at all.
    async fn dataset_score(&self, repo_id: &str) -> Option<f64> {
        let readme = match self.client.readme(repo_id, RepoKind::Dataset).await {
            Ok(Some(readme)) => readme,
            Ok(None) => return Some(0.0),
            Err(e) => {
                debug!(dataset = %repo_id, error = %e, "dataset card unavailable");
                return None;
            }
        };
        let tags = match self.client.dataset_info(repo_id).await {
            Ok(info) => info.tags,
            Err(e) => {
                debug!(dataset = %repo_id, error = %e, "dataset info unavailable");
                Vec::new()
            }
        };
        Some(checklist_score(&readme, &tags))
    }

    fn fallback(ctx: &EvaluationContext) -> f64 {
        match ctx.documentation.as_deref() {
            Some(doc) if !doc.trim().is_empty() => checklist_score(doc, &[]),
            _ => 0.3,
        }
    }
}

#[async_trait]
impl Metric for DatasetQualityMetric {
    fn name(&self) -> MetricName {
        MetricName::DatasetQuality
    }

    async fn compute(
        &self,
        ctx: &EvaluationContext,
        _config: &ScoringConfig,
    ) -> anyhow::Result<MetricOutcome> {
        let started = Instant::now();
        let hf_datasets: Vec<String> = ctx
            .related_datasets
            .iter()
            .filter(|d| d.platform == Platform::HuggingFace)
            .filter_map(|d| d.repo_id())
            .collect();

        let scores: Vec<f64> = futures::future::join_all(
            hf_datasets.iter().map(|id| self.dataset_score(id)),
        )
        .await
        .into_iter()
        .flatten()
        .collect();

        let score = if scores.is_empty() {
            Self::fallback(ctx)
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };
        Ok(MetricOutcome::since(score, started))
    }
}
