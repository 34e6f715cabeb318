//! Parallel scorer: fan out one task per metric, fan back in, aggregate.
//!
//! Metrics share one read-only [`EvaluationContext`] behind an `Arc`. A
//! metric that errors or panics is scored 0 and logged; it never aborts the
//! other metrics. Wall-clock time is bounded by the slowest metric.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, Instrument};

use crate::config::{MetricWeights, ScoringConfig};
use crate::domain::outcome::elapsed_ms;
use crate::domain::{AggregatedAudit, EvaluationContext, MetricName, MetricOutcome};
use crate::metric::MetricRegistry;
use crate::metrics::size_breakdown;
use crate::obs;

/// Weighted mean over applicable outcomes.
///
/// The divisor is the total weight of the outcomes actually present, so
/// not-applicable metrics drop out of both sides. With zero total weight the
/// unweighted mean is used; with nothing applicable the result is 0. The
/// result is clamped to `[0, 1]`.
pub fn net_score(outcomes: &BTreeMap<MetricName, MetricOutcome>, weights: &MetricWeights) -> f64 {
    let applicable: Vec<(MetricName, f64)> = outcomes
        .iter()
        .filter(|(_, o)| o.is_applicable() && o.score.is_finite())
        .map(|(m, o)| (*m, o.score))
        .collect();
    if applicable.is_empty() {
        return 0.0;
    }

    let total_weight: f64 = applicable.iter().map(|(m, _)| weights.weight(*m)).sum();
    let score = if total_weight > 0.0 {
        applicable
            .iter()
            .map(|(m, s)| s * weights.weight(*m))
            .sum::<f64>()
            / total_weight
    } else {
        applicable.iter().map(|(_, s)| s).sum::<f64>() / applicable.len() as f64
    };

    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub struct ParallelScorer {
    registry: MetricRegistry,
    config: Arc<ScoringConfig>,
}

impl ParallelScorer {
    pub fn new(registry: MetricRegistry, config: Arc<ScoringConfig>) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Run every registered metric concurrently and build the audit.
    pub async fn score(&self, ctx: Arc<EvaluationContext>) -> AggregatedAudit {
        let started = Instant::now();
        let artifact = ctx.artifact.canonical_name.clone();

        let tasks: Vec<(MetricName, JoinHandle<anyhow::Result<MetricOutcome>>)> = self
            .registry
            .metrics()
            .iter()
            .map(|metric| {
                let metric = Arc::clone(metric);
                let ctx = Arc::clone(&ctx);
                let config = Arc::clone(&self.config);
                let name = metric.name();
                let task = tokio::spawn(
                    async move { metric.compute(&ctx, &config).await }.in_current_span(),
                );
                (name, task)
            })
            .collect();

        let (names, handles): (Vec<_>, Vec<_>) = tasks.into_iter().unzip();
        let results = join_all(handles).await;

        let mut outcomes = BTreeMap::new();
        for (name, result) in names.into_iter().zip(results) {
            let outcome = match result {
                Ok(Ok(outcome)) => {
                    let outcome = outcome.bounded();
                    obs::emit_metric_completed(&artifact, name.as_str(), outcome.score, outcome.latency_ms);
                    outcome
                }
                Ok(Err(e)) => {
                    obs::emit_metric_failed(&artifact, name.as_str(), &e);
                    MetricOutcome::zero()
                }
                Err(join_err) => {
                    obs::emit_metric_failed(&artifact, name.as_str(), &join_err);
                    MetricOutcome::zero()
                }
            };
            outcomes.insert(name, outcome);
        }

        let size = outcomes
            .contains_key(&MetricName::SizeScore)
            .then(|| size_breakdown(&ctx, &self.config.size_limits));
        let net = net_score(&outcomes, &self.config.weights);
        let latency = elapsed_ms(started);
        debug!(artifact = %artifact, net_score = net, latency_ms = latency, "audit aggregated");

        AggregatedAudit::new(
            artifact,
            ctx.artifact.category,
            outcomes,
            size,
            net,
            latency,
        )
    }
}
