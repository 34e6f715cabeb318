//! How quickly a newcomer can get the model running from its README.

use std::time::Instant;

use async_trait::async_trait;

use super::contains_any;
use crate::config::ScoringConfig;
use crate::domain::{EvaluationContext, MetricName, MetricOutcome};
use crate::metric::Metric;

const INSTALL: &[&str] = &[
    "install",
    "setup",
    "getting started",
    "requirements",
    "dependencies",
];
const TRAINING: &[&str] = &[
    "train",
    "fine-tuning",
    "fine tuning",
    "finetune",
    "eval",
    "benchmark",
    "test",
    "validate",
];
const USAGE: &[&str] = &[
    "usage",
    "example",
    "how to use",
    "quickstart",
    "tutorial",
    "from transformers",
    "import",
    "model.",
    "pipeline",
    "```python",
    "```py",
    "api",
    "inference",
];

pub struct RampUpMetric;

impl RampUpMetric {
    /// Four quarter-credits (README, install, training, usage) plus 0.1 for
    /// example files in the repository listing.
    pub fn score(ctx: &EvaluationContext) -> f64 {
        let Some(readme) = ctx.documentation_lower() else {
            return 0.1;
        };
        let mut score: f64 = 0.25;
        for group in [INSTALL, TRAINING, USAGE] {
            if contains_any(&readme, group) {
                score += 0.25;
            }
        }

        let has_examples = ctx.platform_metadata.as_ref().is_some_and(|info| {
            info.files.iter().any(|f| {
                let f = f.to_lowercase();
                contains_any(&f, &["example", "tutorial", "notebook"]) || f.ends_with(".ipynb")
            })
        });
        if has_examples {
            score += 0.1;
        }
        score.min(1.0)
    }
}

#[async_trait]
impl Metric for RampUpMetric {
    fn name(&self) -> MetricName {
        MetricName::RampUpTime
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArtifactReference;
    use hub_client::ModelInfo;

    fn ctx() -> EvaluationContext {
        EvaluationContext::new(ArtifactReference::huggingface_model("acme/tiny"))
    }

    #[test]
    fn test_no_readme() {
        assert_eq!(RampUpMetric::score(&ctx()), 0.1);
    }

    #[test]
    fn test_readme_only() {
        assert_eq!(RampUpMetric::score(&ctx().with_documentation("A small classifier.")), 0.25);
    }

    #[test]
    fn test_full_readme_with_examples_caps_at_one() {
        let info = ModelInfo {
            files: vec!["notebooks/demo.ipynb".into()],
            ..ModelInfo::default()
        };
        let ctx = ctx()
            .with_documentation("## Installation\npip install x\n## Training\n## Usage")
            .with_platform_metadata(info);
        assert_eq!(RampUpMetric::score(&ctx), 1.0);
    }
}
