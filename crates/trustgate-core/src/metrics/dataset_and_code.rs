//! Whether the model points at its training data and example code.

use std::time::Instant;

use async_trait::async_trait;

use super::contains_any;
use crate::config::ScoringConfig;
use crate::domain::{EvaluationContext, MetricName, MetricOutcome};
use crate::metric::Metric;

const DATASET_HINTS: &[&str] = &[
    "dataset:",
    "training data",
    "train on",
    "trained on",
    "huggingface.co/datasets/",
    "dataset link",
    "data source",
];
const CODE_HINTS: &[&str] = &[
    "training script",
    "train.py",
    "fine-tune",
    "finetune",
    "example code",
    "training code",
    "github.com/",
    "colab",
    "jupyter",
    "notebook",
    "script",
    "example:",
    "tutorial",
];

pub struct DatasetAndCodeMetric;

impl DatasetAndCodeMetric {
    fn has_dataset(ctx: &EvaluationContext, readme: Option<&str>) -> bool {
        !ctx.related_datasets.is_empty()
            || readme.is_some_and(|r| contains_any(r, DATASET_HINTS))
            || ctx
                .platform_metadata
                .as_ref()
                .is_some_and(|i| i.model_index.is_some())
    }

    fn has_code(ctx: &EvaluationContext, readme: Option<&str>) -> bool {
        !ctx.related_code_repos.is_empty()
            || readme.is_some_and(|r| contains_any(r, CODE_HINTS))
            || ctx.platform_metadata.as_ref().is_some_and(|i| {
                i.files.iter().any(|f| {
                    let f = f.to_lowercase();
                    f.ends_with(".py")
                        || f.ends_with(".ipynb")
                        || f.contains("train")
                        || f.contains("example")
                })
            })
    }

    pub fn score(ctx: &EvaluationContext) -> f64 {
        let readme = ctx.documentation_lower();
        match (
            Self::has_dataset(ctx, readme.as_deref()),
            Self::has_code(ctx, readme.as_deref()),
        ) {
            (true, true) => 1.0,
            (true, false) | (false, true) => 0.5,
            (false, false) => 0.1,
        }
    }
}

#[async_trait]
impl Metric for DatasetAndCodeMetric {
    fn name(&self) -> MetricName {
        MetricName::DatasetAndCodeScore
    }

    async fn compute(
        &self,
        ctx: &EvaluationContext,
        _config: &ScoringConfig,
    ) -> anyhow::Result<MetricOutcome> {
        let started = Instant::now();
        Ok(MetricOutcome::since(Self::score(ctx), started))
    }
}
