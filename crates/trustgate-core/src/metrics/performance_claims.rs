//! Whether performance claims are documented and backed by structured results.

use std::sync::OnceLock;
use std::time::Instant;

use async_trait::async_trait;
use regex::Regex;

use crate::config::ScoringConfig;
use crate::domain::{EvaluationContext, MetricName, MetricOutcome};
use crate::metric::Metric;

struct ClaimPatterns {
    sections: Vec<Regex>,
    metric_keyword: Regex,
}

fn patterns() -> &'static ClaimPatterns {
    static PATTERNS: OnceLock<ClaimPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let sections = [
            r"(?i)\b(eval(uation)? results?|metrics?)\b",
            r"(?i)\b(dataset|training data)\b",
            r"(?i)\b(method|approach|architecture)\b",
            r"(?i)\b(limitation|bias|risk)\b",
            r"(?i)\blicen[cs]e\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("section pattern must compile"))
        .collect();
        ClaimPatterns {
            sections,
            metric_keyword: Regex::new(
                r"(?i)\b(accuracy|f1|precision|recall|bleu|rouge|exact match|perplexity)\b",
            )
            .expect("metric keyword pattern must compile"),
        }
    })
}

pub struct PerformanceClaimsMetric;

impl PerformanceClaimsMetric {
    fn text_score(readme: &str) -> f64 {
        let p = patterns();
        let present = p.sections.iter().filter(|re| re.is_match(readme)).count();
        let keyword = if p.metric_keyword.is_match(readme) { 1.0 } else { 0.0 };
        (present as f64 / p.sections.len() as f64) * 0.8 + keyword * 0.2
    }

    pub fn score(ctx: &EvaluationContext) -> f64 {
        let text = ctx.documentation.as_deref().map(Self::text_score).unwrap_or(0.0);
        let structured = ctx
            .platform_metadata
            .as_ref()
            .and_then(|i| i.model_index.as_ref())
            .is_some_and(|v| !v.is_null() && v.as_array().map_or(true, |a| !a.is_empty()));
        let index = if structured { 1.0 } else { 0.0 };
        (0.7 * text + 0.3 * index).clamp(0.0, 1.0)
    }
}

#[async_trait]
impl Metric for PerformanceClaimsMetric {
    fn name(&self) -> MetricName {
        MetricName::PerformanceClaims
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
